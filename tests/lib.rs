//! Shared fixtures for the offline behavior tests.
//!
//! Everything runs against [`ScriptedHttpClient`]; no test touches the
//! network. The fixtures mirror the storefront's two endpoint shapes and
//! the rate service payload.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pricemap_core::{Currency, HarvestConfig, Harvester, RetryPolicy, ScriptedHttpClient};

pub const STOREFRONT_BASE: &str = "https://store.steampowered.com";

/// Rate-service payload: every supported currency at 1.0 except the
/// overrides. TRY and ARS are substituted from USD by the cache itself.
pub fn rates_body(overrides: &[(Currency, f64)]) -> String {
    let mut fields: Vec<String> = Vec::new();
    for currency in Currency::ALL {
        let rate = overrides
            .iter()
            .find(|(c, _)| *c == currency)
            .map_or(1.0, |&(_, r)| r);
        fields.push(format!("\"{}\":{rate}", currency.as_str()));
    }
    format!(
        "{{\"result\":\"success\",\"conversion_rates\":{{{}}}}}",
        fields.join(",")
    )
}

pub struct ListingItem {
    pub id: &'static str,
    pub name_slug: &'static str,
    pub inline_price: Option<&'static str>,
}

/// A listing document repeating the `…/app/<id>/<name>/` link shape, with
/// an optional inline discounted-price fragment per item.
pub fn listing_body(items: &[ListingItem]) -> String {
    let mut body = String::from("<html><body>");
    for item in items {
        body.push_str(&format!(
            "<a href=\"{STOREFRONT_BASE}/app/{}/{}/?snr=1_7\">",
            item.id, item.name_slug
        ));
        if let Some(price) = item.inline_price {
            body.push_str(&format!(
                "<div class=\"discount_final_price\">{price}</div>"
            ));
        }
        body.push_str("</a>");
    }
    body.push_str("</body></html>");
    body
}

pub fn detail_success_body(id: &str, cents: u64) -> String {
    format!(
        "{{\"{id}\":{{\"success\":true,\"data\":{{\"price_overview\":\
         {{\"price_in_cents_with_discount\":{cents}}}}}}}}}"
    )
}

pub fn detail_not_offered_body(id: &str) -> String {
    format!("{{\"{id}\":{{\"success\":false}}}}")
}

/// Harvest configuration with timings shrunk for tests.
pub fn quick_config(output: Currency, snapshot_path: &Path) -> HarvestConfig {
    let mut config = HarvestConfig::new(output, "test-key");
    config.throttle = Duration::from_millis(1);
    config.retry = RetryPolicy::new(Duration::from_millis(1), 2);
    config.snapshot_path = snapshot_path.to_path_buf();
    config
}

pub fn harvester(config: HarvestConfig, client: Arc<ScriptedHttpClient>) -> Harvester {
    Harvester::new(config, client).expect("valid test config")
}
