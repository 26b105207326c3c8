//! Daily exchange-rate snapshot: load, validate, fetch, persist.
//!
//! One snapshot is valid per calendar day. A readable snapshot dated today
//! is reused with no network access; anything else (missing, corrupt,
//! stale, incomplete) forces a single fresh fetch for the whole run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

use crate::domain::currency::Currency;
use crate::error::HarvestError;
use crate::http::{HttpClient, HttpRequest};

const RATE_SERVICE_BASE: &str = "https://v6.exchangerate-api.com/v6";

/// On-disk field layout: `{"date_updated": "DD/MM/YYYY", "USD": 1.0, ...}`.
const SNAPSHOT_DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[day]/[month]/[year]");

/// Immutable conversion-rate table for one calendar day, USD base.
///
/// Invariant: covers exactly the supported [`Currency`] set, so lookups are
/// infallible.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    date: Date,
    rates: BTreeMap<Currency, f64>,
}

impl RateTable {
    pub fn new(date: Date, rates: BTreeMap<Currency, f64>) -> Result<Self, HarvestError> {
        for currency in Currency::ALL {
            if !rates.contains_key(&currency) {
                return Err(HarvestError::MissingRate { currency });
            }
        }
        Ok(Self { date, rates })
    }

    pub const fn date(&self) -> Date {
        self.date
    }

    /// Rate of `currency` relative to the USD base.
    pub fn rate(&self, currency: Currency) -> f64 {
        self.rates
            .get(&currency)
            .copied()
            .expect("rate table covers every supported currency")
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RateSnapshot {
    date_updated: String,
    #[serde(flatten)]
    rates: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct RateServiceResponse {
    conversion_rates: BTreeMap<String, f64>,
}

/// Owns the persisted snapshot and the at-most-one daily refresh.
pub struct RateCache {
    snapshot_path: PathBuf,
    api_key: String,
    client: Arc<dyn HttpClient>,
    table: Option<RateTable>,
}

impl RateCache {
    pub fn new(
        snapshot_path: impl Into<PathBuf>,
        api_key: impl Into<String>,
        client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            api_key: api_key.into(),
            client,
            table: None,
        }
    }

    /// Current table, loading or refreshing on first access.
    ///
    /// At most one network fetch happens per run; later calls return the
    /// same table without touching disk or network.
    pub async fn table(&mut self) -> Result<&RateTable, HarvestError> {
        if self.table.is_none() {
            let today = OffsetDateTime::now_utc().date();
            let table = match load_snapshot(&self.snapshot_path, today) {
                Some(table) => {
                    info!(date = %table.date(), "conversion rates already updated today");
                    table
                }
                None => self.refresh(today).await?,
            };
            self.table = Some(table);
        }

        Ok(self
            .table
            .as_ref()
            .expect("rate table populated by first access"))
    }

    /// Rate lookup on the loaded table. Valid only after [`Self::table`]
    /// has succeeded once this run.
    pub fn rate(&self, currency: Currency) -> Option<f64> {
        self.table.as_ref().map(|table| table.rate(currency))
    }

    async fn refresh(&self, today: Date) -> Result<RateTable, HarvestError> {
        let url = format!("{RATE_SERVICE_BASE}/{}/latest/USD", self.api_key);
        let response = self
            .client
            .execute(HttpRequest::get(url))
            .await
            .map_err(|e| HarvestError::RateFetch {
                message: e.message().to_owned(),
            })?;

        if !response.is_success() {
            return Err(HarvestError::RateStatus {
                status: response.status,
            });
        }

        let payload: RateServiceResponse = serde_json::from_str(&response.body)?;

        let mut rates = BTreeMap::new();
        for currency in Currency::ALL {
            let key = if currency.priced_in_usd() {
                Currency::BASE.as_str()
            } else {
                currency.as_str()
            };
            let rate = payload
                .conversion_rates
                .get(key)
                .copied()
                .ok_or(HarvestError::MissingRate { currency })?;
            rates.insert(currency, rate);
        }

        let table = RateTable::new(today, rates)?;
        persist_snapshot(&self.snapshot_path, &table)?;
        info!(date = %today, "conversion rates have been updated");
        Ok(table)
    }
}

fn format_snapshot_date(date: Date) -> String {
    format!(
        "{:02}/{:02}/{:04}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

/// A missing, unreadable, stale or incomplete snapshot all answer `None`;
/// the caller refreshes instead of failing the run.
fn load_snapshot(path: &Path, today: Date) -> Option<RateTable> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "rate snapshot unreadable, refetching");
            return None;
        }
    };

    let snapshot: RateSnapshot = match serde_json::from_str(&raw) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "rate snapshot corrupt, refetching");
            return None;
        }
    };

    let date = match Date::parse(&snapshot.date_updated, SNAPSHOT_DATE_FORMAT) {
        Ok(date) => date,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "rate snapshot date corrupt, refetching");
            return None;
        }
    };

    if date != today {
        info!(snapshot = %snapshot.date_updated, "rate snapshot is stale, refetching");
        return None;
    }

    let mut rates = BTreeMap::new();
    for currency in Currency::ALL {
        let rate = snapshot.rates.get(currency.as_str()).copied()?;
        rates.insert(currency, rate);
    }

    RateTable::new(date, rates).ok()
}

fn persist_snapshot(path: &Path, table: &RateTable) -> Result<(), HarvestError> {
    let snapshot = RateSnapshot {
        date_updated: format_snapshot_date(table.date()),
        rates: Currency::ALL
            .into_iter()
            .map(|currency| (currency.as_str().to_owned(), table.rate(currency)))
            .collect(),
    };

    let body = serde_json::to_string(&snapshot)?;
    std::fs::write(path, body).map_err(|source| HarvestError::SnapshotWrite {
        path: path.display().to_string(),
        source,
    })
}
