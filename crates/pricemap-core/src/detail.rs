//! Authoritative per-(item, region) price fetch.
//!
//! The detail endpoint reports a success flag and, when the item is offered
//! in the region, a discounted price in minor units. A region that does not
//! offer the item is terminal and recorded as unavailable, never retried.

use std::sync::Arc;

use crate::domain::currency::Currency;
use crate::domain::price::{round_to_cents, Price};
use crate::error::HarvestError;
use crate::http::{HttpClient, HttpRequest};
use crate::matrix::PriceMatrix;
use crate::retry::{fetch_with_retry, RetryPolicy};

const DETAIL_ENDPOINT: &str = "https://store.steampowered.com/api/appdetails";
const SUCCESS_FALSE: &str = "\"success\":false";
const PRICE_FIELD: &str = "price_in_cents_with_discount\":";

pub struct DetailFetcher {
    client: Arc<dyn HttpClient>,
    retry: RetryPolicy,
}

impl DetailFetcher {
    pub fn new(client: Arc<dyn HttpClient>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Resolve exactly one (item, currency) cell.
    ///
    /// Transient failures wait out the policy cooldown and reissue the same
    /// request; once the attempt budget is exhausted the terminal error is
    /// returned and the cell is left for the caller to settle.
    pub async fn fetch(
        &self,
        item_id: &str,
        currency: Currency,
        matrix: &mut PriceMatrix,
    ) -> Result<(), HarvestError> {
        let url = detail_url(item_id, currency);
        let response = fetch_with_retry(self.client.as_ref(), &self.retry, HttpRequest::get(url))
            .await
            .map_err(|failure| HarvestError::DetailFetch {
                item_id: item_id.to_owned(),
                region: currency.region_code(),
                attempts: failure.attempts,
                message: failure.message,
            })?;

        if response.body.contains(SUCCESS_FALSE) {
            matrix.record(item_id, currency, Price::Unavailable);
            return Ok(());
        }

        matrix.record(item_id, currency, extract_minor_unit_price(&response.body));
        Ok(())
    }
}

fn detail_url(item_id: &str, currency: Currency) -> String {
    format!(
        "{DETAIL_ENDPOINT}?appids={}&cc={}",
        urlencoding::encode(item_id),
        urlencoding::encode(currency.region_code())
    )
}

/// Pull the minor-unit price field out of the markup-embedded payload and
/// convert it to major units at two decimal places. A missing or mangled
/// field resolves to the unavailable sentinel.
fn extract_minor_unit_price(body: &str) -> Price {
    let Some(field) = body.find(PRICE_FIELD) else {
        return Price::Unavailable;
    };
    let start = field + PRICE_FIELD.len();
    let Some(len) = body[start..].find('}') else {
        return Price::Unavailable;
    };

    match Price::parse(&body[start..start + len]) {
        Price::Amount(cents) => Price::Amount(round_to_cents(cents / 100.0)),
        Price::Unavailable => Price::Unavailable,
    }
}
