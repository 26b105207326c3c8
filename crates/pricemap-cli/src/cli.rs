//! CLI argument definitions for pricemap.

use std::path::PathBuf;

use clap::Parser;

use pricemap_core::Currency;

/// Harvest per-region storefront prices into a complete CSV price matrix.
///
/// Enumerates the storefront catalog once per supported region, repairs
/// any missing (item, region) prices with detail fetches, converts every
/// price into the output currency through a once-daily cached rate table,
/// and writes one CSV row per item with its cheapest region.
#[derive(Debug, Parser)]
#[command(name = "pricemap", version, about = "Regional storefront price harvester")]
pub struct Cli {
    /// Currency every reported price is converted into (e.g. USD, PLN).
    pub output_currency: Currency,

    /// Maximum number of distinct items tracked in one run.
    #[arg(long, default_value_t = 100)]
    pub item_cap: usize,

    /// Exchange-rate provider API key.
    #[arg(long, env = "EXCHANGE_RATE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Daily rate snapshot location.
    #[arg(long, default_value = "conversion_rates.json")]
    pub rates_file: PathBuf,

    /// Where the CSV report is written.
    #[arg(long, default_value = "pricing_report.csv")]
    pub out: PathBuf,

    /// Minimum interval between storefront requests, in milliseconds.
    #[arg(long, default_value_t = 1500)]
    pub throttle_ms: u64,

    /// Cooldown before reissuing a transiently failed request, in seconds.
    #[arg(long, default_value_t = 60)]
    pub cooldown_secs: u64,

    /// Attempt budget per request, including the first try.
    #[arg(long, default_value_t = 5)]
    pub max_attempts: u32,
}
