//! End-to-end harvest behavior over a deterministic scripted storefront.

use std::sync::Arc;

use pricemap_core::{Currency, Price, PriceReport, ScriptedHttpClient};

use pricemap_tests::{
    detail_not_offered_body, detail_success_body, harvester, listing_body, quick_config,
    rates_body, ListingItem,
};

fn two_item_listing() -> String {
    listing_body(&[
        ListingItem {
            id: "620",
            name_slug: "Portal_2",
            inline_price: Some("$9.99"),
        },
        ListingItem {
            id: "440",
            name_slug: "Team_Fortress_2",
            inline_price: None,
        },
    ])
}

#[tokio::test]
async fn gap_filling_completes_the_matrix() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = dir.path().join("conversion_rates.json");

    let client = Arc::new(ScriptedHttpClient::new());
    client.stub_body("exchangerate-api.com", rates_body(&[(Currency::CAD, 1.35)]));
    client.stub_body("/search/", two_item_listing());
    // One region does not offer the second item; every other region does.
    client.stub_body("appids=440&cc=jp", detail_not_offered_body("440"));
    client.stub_body("appids=440", detail_success_body("440", 1999));

    let config = quick_config(Currency::USD, &snapshot);
    let outcome = harvester(config, client.clone())
        .run()
        .await
        .expect("harvest run");

    // Every region served the same listing, so the inline fast path filled
    // all of item 620; item 440 was repaired cell by cell.
    assert_eq!(outcome.matrix.len(), 2);
    assert_eq!(
        outcome.matrix.populated_cells(),
        outcome.matrix.expected_cells()
    );
    assert_eq!(outcome.enumerated_cells, Currency::ALL.len());
    assert_eq!(outcome.fixes, Currency::ALL.len());
    assert_eq!(outcome.failed_fixes, 0);

    let portal = outcome.matrix.get("620").expect("tracked");
    assert_eq!(portal.name(), "Portal 2");
    assert_eq!(portal.price(Currency::USD), Some(Price::Amount(9.99)));

    let tf2 = outcome.matrix.get("440").expect("tracked");
    assert_eq!(tf2.price(Currency::USD), Some(Price::Amount(19.99)));
    assert_eq!(tf2.price(Currency::JPY), Some(Price::Unavailable));

    // One rate fetch, one listing per region, one detail per missing cell.
    assert_eq!(client.request_count_matching("exchangerate-api.com"), 1);
    assert_eq!(
        client.request_count_matching("/search/"),
        Currency::ALL.len()
    );
    assert_eq!(
        client.request_count_matching("appdetails"),
        Currency::ALL.len()
    );
}

#[tokio::test]
async fn report_reflects_the_harvested_matrix() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = dir.path().join("conversion_rates.json");

    let client = Arc::new(ScriptedHttpClient::new());
    client.stub_body("exchangerate-api.com", rates_body(&[(Currency::CAD, 1.35)]));
    client.stub_body("/search/", two_item_listing());
    client.stub_body("appids=440", detail_success_body("440", 1999));

    let config = quick_config(Currency::CAD, &snapshot);
    let outcome = harvester(config, client).run().await.expect("harvest run");

    let report = PriceReport::from_outcome(&outcome);
    assert_eq!(report.rows.len(), 2);

    // Stored 9.99 USD converts into CAD through the USD base.
    let portal = &report.rows[0];
    let usd_column = portal.converted[0].amount().expect("converted amount");
    assert!((usd_column - 9.99 * 1.35).abs() < 1e-9);

    let mut rendered = Vec::new();
    report.write_csv(&mut rendered).expect("csv write");
    let rendered = String::from_utf8(rendered).expect("utf8 csv");
    assert!(rendered.starts_with("Items with Regional Prices in CAD"));
    assert_eq!(rendered.lines().count(), 3);
}

#[tokio::test]
async fn item_cap_holds_across_both_passes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = dir.path().join("conversion_rates.json");

    let client = Arc::new(ScriptedHttpClient::new());
    client.stub_body("exchangerate-api.com", rates_body(&[]));
    client.stub_body("/search/", two_item_listing());
    client.stub_body("appids=620", detail_success_body("620", 999));

    let mut config = quick_config(Currency::USD, &snapshot);
    config.item_cap = 1;
    let outcome = harvester(config, client.clone())
        .run()
        .await
        .expect("harvest run");

    // The second identifier was discovered in all 22 listing passes and
    // dropped every time.
    assert_eq!(outcome.matrix.len(), 1);
    assert!(outcome.matrix.contains("620"));
    assert!(!outcome.matrix.contains("440"));
    assert_eq!(client.request_count_matching("appids=440"), 0);
}

#[tokio::test]
async fn exhausted_detail_retries_settle_as_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = dir.path().join("conversion_rates.json");

    let client = Arc::new(ScriptedHttpClient::new());
    client.stub_body("exchangerate-api.com", rates_body(&[]));
    client.stub_body("/search/", two_item_listing());
    // One region's detail endpoint stays down for good.
    client.stub_status("appids=440&cc=ca", 500);
    client.stub_body("appids=440", detail_success_body("440", 1999));

    let config = quick_config(Currency::USD, &snapshot);
    let outcome = harvester(config, client.clone())
        .run()
        .await
        .expect("run survives the outage");

    assert_eq!(outcome.failed_fixes, 1);
    assert_eq!(
        outcome.matrix.populated_cells(),
        outcome.matrix.expected_cells()
    );
    let tf2 = outcome.matrix.get("440").expect("tracked");
    assert_eq!(tf2.price(Currency::CAD), Some(Price::Unavailable));
    assert_eq!(tf2.price(Currency::USD), Some(Price::Amount(19.99)));
    // Attempt budget is 2 in the quick config.
    assert_eq!(client.request_count_matching("appids=440&cc=ca"), 2);
}

#[tokio::test]
async fn listing_outage_is_repaired_by_the_gap_fill_pass() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = dir.path().join("conversion_rates.json");

    let client = Arc::new(ScriptedHttpClient::new());
    client.stub_body("exchangerate-api.com", rates_body(&[]));
    // The UA region's listing is down for the whole run; every other
    // region serves the fixture.
    client.stub_status("ignore_preferences=1&cc=ua", 503);
    client.stub_body("/search/", two_item_listing());
    client.stub_body("appids=620&cc=ua", detail_success_body("620", 899));
    client.stub_body("appids=440", detail_success_body("440", 1999));

    let config = quick_config(Currency::USD, &snapshot);
    let outcome = harvester(config, client).run().await.expect("harvest run");

    assert_eq!(
        outcome.matrix.populated_cells(),
        outcome.matrix.expected_cells()
    );
    let portal = outcome.matrix.get("620").expect("tracked");
    assert_eq!(portal.price(Currency::UAH), Some(Price::Amount(8.99)));
}
