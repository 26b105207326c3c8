//! Rate cache behavior: one fetch per day, recovery from bad snapshots.

use std::sync::Arc;

use pricemap_core::{Currency, RateCache, ScriptedHttpClient};

use pricemap_tests::rates_body;

#[tokio::test]
async fn snapshot_written_today_is_reused_without_network_access() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = dir.path().join("conversion_rates.json");

    let online = Arc::new(ScriptedHttpClient::new());
    online.stub_body("exchangerate-api.com", rates_body(&[(Currency::PLN, 4.2)]));

    let mut cache = RateCache::new(&snapshot, "test-key", online.clone());
    let fetched = cache.table().await.expect("fresh fetch").clone();
    assert_eq!(fetched.rate(Currency::PLN), 4.2);
    assert_eq!(online.request_count_matching("exchangerate-api.com"), 1);

    // Same run: no further IO.
    let again = cache.table().await.expect("cached").clone();
    assert_eq!(again, fetched);
    assert_eq!(online.request_count_matching("exchangerate-api.com"), 1);

    // New run, same day: the persisted snapshot satisfies the load and the
    // network is never consulted.
    let offline = Arc::new(ScriptedHttpClient::new());
    let mut next_run = RateCache::new(&snapshot, "test-key", offline.clone());
    let reloaded = next_run.table().await.expect("snapshot reuse").clone();
    assert_eq!(reloaded, fetched);
    assert!(offline.requests().is_empty());
}

#[tokio::test]
async fn usd_priced_regions_inherit_the_base_rate() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = dir.path().join("conversion_rates.json");

    let client = Arc::new(ScriptedHttpClient::new());
    client.stub_body(
        "exchangerate-api.com",
        rates_body(&[(Currency::TRY, 41.0), (Currency::ARS, 1300.0)]),
    );

    let mut cache = RateCache::new(&snapshot, "test-key", client);
    let table = cache.table().await.expect("fresh fetch");

    // The provider's TRY/ARS rates are ignored; those storefronts price
    // in USD.
    assert_eq!(table.rate(Currency::TRY), 1.0);
    assert_eq!(table.rate(Currency::ARS), 1.0);
}

#[tokio::test]
async fn unreadable_snapshot_forces_a_refetch_instead_of_failing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = dir.path().join("conversion_rates.json");
    std::fs::write(&snapshot, "\"date_updated\": not even json").expect("seed corrupt file");

    let client = Arc::new(ScriptedHttpClient::new());
    client.stub_body("exchangerate-api.com", rates_body(&[]));

    let mut cache = RateCache::new(&snapshot, "test-key", client.clone());
    let table = cache.table().await.expect("refetched").clone();
    assert_eq!(table.rate(Currency::USD), 1.0);
    assert_eq!(client.request_count_matching("exchangerate-api.com"), 1);

    // The overwritten snapshot is usable by the next run.
    let offline = Arc::new(ScriptedHttpClient::new());
    let mut next_run = RateCache::new(&snapshot, "test-key", offline.clone());
    assert_eq!(next_run.table().await.expect("snapshot reuse").clone(), table);
    assert!(offline.requests().is_empty());
}

#[tokio::test]
async fn unreachable_rate_service_with_no_snapshot_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = dir.path().join("conversion_rates.json");

    let client = Arc::new(ScriptedHttpClient::new());
    client.stub(
        "exchangerate-api.com",
        Ok(pricemap_core::HttpResponse::status_only(403)),
    );

    let mut cache = RateCache::new(&snapshot, "bad-key", client);
    let err = cache.table().await.expect_err("startup failure");
    assert!(err.is_fatal());
    assert!(!snapshot.exists());
}
