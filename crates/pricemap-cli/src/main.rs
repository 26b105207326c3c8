mod cli;
mod error;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pricemap_core::{
    HarvestConfig, Harvester, PriceReport, ReqwestHttpClient, RetryPolicy,
};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = HarvestConfig::new(cli.output_currency, cli.api_key);
    config.item_cap = cli.item_cap;
    config.throttle = Duration::from_millis(cli.throttle_ms);
    config.retry = RetryPolicy::new(Duration::from_secs(cli.cooldown_secs), cli.max_attempts);
    config.snapshot_path = cli.rates_file;

    let client = Arc::new(ReqwestHttpClient::new());
    let harvester = Harvester::new(config, client)?;
    let outcome = harvester.run().await?;

    let report = PriceReport::from_outcome(&outcome);
    report.write_csv_file(&cli.out)?;

    println!(
        "Wrote {} items x {} currencies to {} ({} cells from listings, {} gap fills, {} settled unavailable).",
        outcome.matrix.len(),
        pricemap_core::Currency::ALL.len(),
        cli.out.display(),
        outcome.enumerated_cells,
        outcome.fixes,
        outcome.failed_fixes,
    );

    Ok(ExitCode::SUCCESS)
}
