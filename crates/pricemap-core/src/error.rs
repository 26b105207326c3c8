use thiserror::Error;

use crate::domain::currency::Currency;

/// Validation errors for operator-supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown currency code '{value}'")]
    UnknownCurrency { value: String },

    #[error("item cap must be at least 1")]
    ZeroItemCap,

    #[error("rate provider API key cannot be empty")]
    EmptyApiKey,
}

/// Failure taxonomy for the harvest run.
///
/// Price-text parse failures never appear here; they resolve locally to
/// [`Price::Unavailable`](crate::domain::price::Price). Likewise a region
/// reporting an item as not offered is recorded, not raised. The variants
/// below are either transient fetch failures that exhausted their bounded
/// retry (logged, never fatal) or startup rate-table failures (fatal, since
/// no conversion can proceed without rates).
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("rate service request failed: {message}")]
    RateFetch { message: String },

    #[error("rate service returned status {status}")]
    RateStatus { status: u16 },

    #[error("rate service response is missing a rate for {currency}")]
    MissingRate { currency: Currency },

    #[error("failed to persist rate snapshot to {path}: {source}")]
    SnapshotWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog listing for region '{region}' failed after {attempts} attempts: {message}")]
    CatalogFetch {
        region: &'static str,
        attempts: u32,
        message: String,
    },

    #[error("detail request for item {item_id} in region '{region}' failed after {attempts} attempts: {message}")]
    DetailFetch {
        item_id: String,
        region: &'static str,
        attempts: u32,
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("report output error: {0}")]
    Report(#[from] std::io::Error),

    #[error("report encoding error: {0}")]
    Csv(#[from] csv::Error),
}

impl HarvestError {
    /// Whether this failure must abort the run. Only missing rate data is
    /// fatal; per-item and per-region fetch failures are recoverable.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::RateFetch { .. }
                | Self::RateStatus { .. }
                | Self::MissingRate { .. }
                | Self::SnapshotWrite { .. }
        )
    }
}
