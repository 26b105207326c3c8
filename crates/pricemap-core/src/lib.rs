//! # Pricemap Core
//!
//! Harvesting engine for per-region storefront prices: enumerate the
//! catalog in every supported region, repair the gaps with authoritative
//! detail fetches, convert across currencies through a once-daily cached
//! rate table, and emit a complete price matrix as a CSV report.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Currency set and price values, including the price-text parser |
//! | [`rates`] | Daily exchange-rate snapshot cache |
//! | [`http`] | HTTP transport boundary (reqwest + scripted test client) |
//! | [`throttle`] | Minimum inter-request interval pacing |
//! | [`retry`] | Bounded cooldown-and-retry for transient failures |
//! | [`catalog`] | Per-region listing enumeration |
//! | [`detail`] | Per-(item, region) authoritative price fetch |
//! | [`matrix`] | Item registry and the price matrix |
//! | [`harvest`] | Two-pass orchestration |
//! | [`report`] | Cross-currency report rows and CSV export |
//! | [`error`] | Failure taxonomy |
//!
//! ## Failure philosophy
//!
//! Malformed price text resolves locally to [`Price::Unavailable`]; a
//! region not offering an item is data, not an error; transient fetch
//! failures wait out a cooldown under a bounded attempt budget; only a
//! failed startup rate fetch aborts a run.

pub mod catalog;
pub mod detail;
pub mod domain;
pub mod error;
pub mod harvest;
pub mod http;
pub mod matrix;
pub mod rates;
pub mod report;
pub mod retry;
pub mod throttle;

pub use catalog::CatalogEnumerator;
pub use detail::DetailFetcher;
pub use domain::{Currency, Price};
pub use error::{HarvestError, ValidationError};
pub use harvest::{HarvestConfig, HarvestOutcome, Harvester};
pub use http::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, ScriptedHttpClient};
pub use matrix::{Item, PriceMatrix};
pub use rates::{RateCache, RateTable};
pub use report::{PriceReport, ReportRow};
pub use retry::RetryPolicy;
pub use throttle::RequestPacer;
