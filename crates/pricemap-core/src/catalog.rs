//! Per-region catalog enumeration.
//!
//! One paginated listing request per region, filtered to paid, non-bundle,
//! preference-ignoring results. The returned document repeats item links of
//! the shape `…/app/<identifier>/<name_with_underscores>/…`; near each link
//! an inline discounted-price fragment may appear, which is recorded
//! opportunistically so the gap-filling pass has less to do.

use std::sync::Arc;

use tracing::debug;

use crate::domain::currency::Currency;
use crate::domain::price::Price;
use crate::error::HarvestError;
use crate::http::{HttpClient, HttpRequest};
use crate::matrix::PriceMatrix;
use crate::retry::{fetch_with_retry, RetryPolicy};

pub const STOREFRONT_BASE: &str = "https://store.steampowered.com";

const APP_LINK_PREFIX: &str = "https://store.steampowered.com/app/";
const INLINE_PRICE_OPEN: &str = "<div class=\"discount_final_price\">";
const INLINE_PRICE_CLOSE: &str = "</div>";

pub struct CatalogEnumerator {
    client: Arc<dyn HttpClient>,
    retry: RetryPolicy,
}

impl CatalogEnumerator {
    pub fn new(client: Arc<dyn HttpClient>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Discover items for one region and record any inline prices into the
    /// matrix. Returns the number of listing links seen (including
    /// duplicates and over-cap drops).
    pub async fn enumerate(
        &self,
        currency: Currency,
        matrix: &mut PriceMatrix,
    ) -> Result<usize, HarvestError> {
        let url = listing_url(currency);
        let response = fetch_with_retry(self.client.as_ref(), &self.retry, HttpRequest::get(url))
            .await
            .map_err(|failure| HarvestError::CatalogFetch {
                region: currency.region_code(),
                attempts: failure.attempts,
                message: failure.message,
            })?;

        Ok(scan_listings(&response.body, currency, matrix))
    }
}

/// Query string chosen to ignore stored preferences and search paid,
/// non-bundle listings only; `cc` scopes pricing to the region.
fn listing_url(currency: Currency) -> String {
    format!(
        "{STOREFRONT_BASE}/search/?category1=998&hidef2p=1&ndl=1&ignore_preferences=1&cc={}",
        urlencoding::encode(currency.region_code())
    )
}

/// Walk every `…/app/<id>/<name>/` fragment in document order, tracking
/// items under the cap and reading the inline price fragment that sits
/// between a link and the next one.
fn scan_listings(document: &str, currency: Currency, matrix: &mut PriceMatrix) -> usize {
    let mut seen = 0usize;
    let mut cursor = 0usize;

    while let Some(hit) = document[cursor..].find(APP_LINK_PREFIX) {
        let id_start = cursor + hit + APP_LINK_PREFIX.len();
        let Some(id_len) = document[id_start..].find('/') else {
            break;
        };
        let name_start = id_start + id_len + 1;
        let Some(name_len) = document[name_start..].find('/') else {
            break;
        };

        let id = &document[id_start..id_start + id_len];
        let name = document[name_start..name_start + name_len].replace('_', " ");

        // Continue scanning past this link; the same item may be linked
        // more than once per page.
        cursor = id_start;
        seen += 1;

        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }

        if !matrix.track(id, &name) {
            debug!(id, region = currency.region_code(), "item cap reached, dropping identifier");
            continue;
        }

        // The inline price belongs to this listing only if it appears
        // before the next item link.
        let window_end = document[name_start + name_len..]
            .find(APP_LINK_PREFIX)
            .map_or(document.len(), |next| name_start + name_len + next);

        if let Some(fragment) = inline_price_fragment(&document[name_start + name_len..window_end])
        {
            matrix.record(id, currency, Price::parse(fragment));
        }
    }

    seen
}

fn inline_price_fragment(window: &str) -> Option<&str> {
    let open = window.find(INLINE_PRICE_OPEN)? + INLINE_PRICE_OPEN.len();
    let close = window[open..].find(INLINE_PRICE_CLOSE)?;
    Some(&window[open..open + close])
}
