//! Two-pass harvest orchestration.
//!
//! Pass 1 enumerates every region's catalog listing; pass 2 repairs every
//! (item, currency) cell the listings left unpopulated. Requests are paced
//! by a shared minimum interval, execution is fully sequential, and only a
//! startup rate-table failure aborts the run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::catalog::CatalogEnumerator;
use crate::detail::DetailFetcher;
use crate::domain::currency::Currency;
use crate::domain::price::Price;
use crate::error::{HarvestError, ValidationError};
use crate::http::HttpClient;
use crate::matrix::PriceMatrix;
use crate::rates::{RateCache, RateTable};
use crate::retry::RetryPolicy;
use crate::throttle::RequestPacer;

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Maximum number of distinct items tracked in one run.
    pub item_cap: usize,
    /// Currency the report converts every price into.
    pub output_currency: Currency,
    /// Minimum interval between storefront requests.
    pub throttle: Duration,
    /// Cooldown-and-retry policy for transient fetch failures.
    pub retry: RetryPolicy,
    /// Where the daily rate snapshot lives.
    pub snapshot_path: PathBuf,
    /// Rate provider credential, resolved before the core runs.
    pub api_key: String,
}

impl HarvestConfig {
    pub fn new(output_currency: Currency, api_key: impl Into<String>) -> Self {
        Self {
            item_cap: 100,
            output_currency,
            throttle: Duration::from_millis(1500),
            retry: RetryPolicy::default(),
            snapshot_path: PathBuf::from("conversion_rates.json"),
            api_key: api_key.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.item_cap == 0 {
            return Err(ValidationError::ZeroItemCap);
        }
        if self.api_key.trim().is_empty() {
            return Err(ValidationError::EmptyApiKey);
        }
        Ok(())
    }
}

/// Result of a completed run: the full matrix plus the rate table it should
/// be read against, and the completeness bookkeeping for the summary line.
pub struct HarvestOutcome {
    pub matrix: PriceMatrix,
    pub rates: RateTable,
    pub output_currency: Currency,
    /// Cells populated by enumeration alone, before gap filling.
    pub enumerated_cells: usize,
    /// Cells repaired by the gap-filling pass.
    pub fixes: usize,
    /// Gap-fill fetches whose retries were exhausted and settled as
    /// unavailable.
    pub failed_fixes: usize,
}

impl HarvestOutcome {
    pub fn expected_cells(&self) -> usize {
        self.matrix.expected_cells()
    }
}

pub struct Harvester {
    config: HarvestConfig,
    rate_cache: RateCache,
    catalog: CatalogEnumerator,
    detail: DetailFetcher,
    pacer: RequestPacer,
}

impl Harvester {
    pub fn new(config: HarvestConfig, client: Arc<dyn HttpClient>) -> Result<Self, HarvestError> {
        config.validate()?;

        let rate_cache = RateCache::new(&config.snapshot_path, &config.api_key, client.clone());
        let catalog = CatalogEnumerator::new(client.clone(), config.retry.clone());
        let detail = DetailFetcher::new(client, config.retry.clone());
        let pacer = RequestPacer::new(config.throttle);

        Ok(Self {
            config,
            rate_cache,
            catalog,
            detail,
            pacer,
        })
    }

    /// Run the harvest to completion. Per-region and per-item failures are
    /// logged and worked around; only the startup rate fetch can fail the
    /// run.
    pub async fn run(mut self) -> Result<HarvestOutcome, HarvestError> {
        let rates = self.rate_cache.table().await?.clone();

        let mut matrix = PriceMatrix::new(self.config.item_cap);

        for currency in Currency::ALL {
            self.pacer.pace().await;
            info!(%currency, region = currency.region_code(), "obtaining listing prices");
            match self.catalog.enumerate(currency, &mut matrix).await {
                Ok(seen) => {
                    info!(%currency, listings = seen, tracked = matrix.len(), "listing pass done")
                }
                Err(error) => {
                    warn!(%currency, %error, "listing pass failed, leaving region to gap fill")
                }
            }
        }

        let expected = matrix.expected_cells();
        let enumerated_cells = matrix.populated_cells();
        info!(
            obtained = enumerated_cells,
            expected,
            percent = completeness_percent(enumerated_cells, expected),
            "enumeration completeness"
        );

        let missing = matrix.missing_cells();
        let gap_total = missing.len();
        let mut fixes = 0usize;
        let mut failed_fixes = 0usize;

        for (item_id, currency) in missing {
            self.pacer.pace().await;
            fixes += 1;
            info!(
                item = %item_id,
                %currency,
                fix = fixes,
                of = gap_total,
                percent = completeness_percent(fixes, gap_total),
                "filling missing price cell"
            );

            if let Err(error) = self.detail.fetch(&item_id, currency, &mut matrix).await {
                // Terminal after the bounded retry: settle the cell as
                // unavailable so the matrix still comes out complete.
                warn!(item = %item_id, %currency, %error, "gap fill exhausted, recording unavailable");
                matrix.record(&item_id, currency, Price::Unavailable);
                failed_fixes += 1;
            }
        }

        info!(
            fixes,
            failed_fixes,
            populated = matrix.populated_cells(),
            expected,
            "harvest complete"
        );

        Ok(HarvestOutcome {
            matrix,
            rates,
            output_currency: self.config.output_currency,
            enumerated_cells,
            fixes,
            failed_fixes,
        })
    }
}

fn completeness_percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 100.0;
    }
    (part as f64 / whole as f64 * 10_000.0).round() / 100.0
}
