//! Integration tests for `CatalogClient::fetch_listing`.
//!
//! Each test stands up a local `wiremock` server so no real network traffic
//! is made.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use repricer_scraper::{CatalogClient, CatalogClientSettings, ScraperError};

fn settings(server: &MockServer, max_retries: u32) -> CatalogClientSettings {
    CatalogClientSettings {
        url_template: format!("{}/rest/neo/pdp/{{mp_id}}/vendor-options", server.uri()),
        timeout_secs: 5,
        user_agent: "repricer-test/0.1".to_string(),
        max_retries,
        backoff_base_ms: 0,
    }
}

fn test_client(server: &MockServer) -> CatalogClient {
    CatalogClient::new(&settings(server, 0), &[]).expect("failed to build test CatalogClient")
}

fn listing_json() -> serde_json::Value {
    json!([
        {
            "vendorProductId": 1001,
            "vendorProductCode": "TRD-1",
            "vendorId": 17357,
            "vendorName": "Tradent Supply",
            "inStock": true,
            "standardShipping": 5.0,
            "freeShippingThreshold": 49,
            "inventory": 25,
            "priceBreaks": [
                {"minQty": 1, "unitPrice": 10.99},
                {"minQty": 6, "unitPrice": 10.49, "promoAddlDescr": "SHORT EXP"}
            ]
        },
        {
            "vendorId": "88",
            "vendorName": "Alpha Dental",
            "inStock": true,
            "priceBreaks": [{"minQty": 1, "unitPrice": 9.99}]
        }
    ])
}

#[tokio::test]
async fn fetch_listing_parses_vendor_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/neo/pdp/12345/vendor-options"))
        .and(header("user-agent", "repricer-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_json()))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client(&server)
        .fetch_listing("12345", None, 0)
        .await
        .expect("fetch should succeed")
        .expect("listing should be present");

    assert_eq!(response.offers.len(), 2);
    assert_eq!(response.offers[0].vendor_id, "17357");
    assert_eq!(response.offers[1].vendor_id, "88");
    assert_eq!(response.offers[0].price_breaks.len(), 2);
    assert_eq!(response.payload, listing_json());
}

#[tokio::test]
async fn fetch_listing_keeps_slashed_id_in_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/neo/pdp/12%2F..%2Fadmin%23x/vendor-options"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_json()))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client(&server)
        .fetch_listing("12/../admin#x", None, 0)
        .await
        .expect("fetch should succeed");

    assert!(response.is_some());
}

#[tokio::test]
async fn fetch_listing_returns_none_on_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/neo/pdp/404/vendor-options"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = test_client(&server).fetch_listing("404", None, 0).await;
    assert!(matches!(result, Ok(None)), "expected Ok(None), got: {result:?}");
}

#[tokio::test]
async fn fetch_listing_surfaces_rate_limit_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "17"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_listing("777", None, 0)
        .await
        .unwrap_err();
    match err {
        ScraperError::RateLimited {
            mp_id,
            retry_after_secs,
        } => {
            assert_eq!(mp_id, "777");
            assert_eq!(retry_after_secs, 17);
        }
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_listing_rejects_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_listing("1", None, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Deserialize { .. }), "got: {err:?}");
}

#[tokio::test]
async fn fetch_listing_does_not_retry_without_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_listing("1", None, 0)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::UnexpectedStatus { status: 503, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_listing_retries_server_error_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_json()))
        .mount(&server)
        .await;

    let client = CatalogClient::new(&settings(&server, 2), &[]).unwrap();
    let response = client.fetch_listing("1", None, 0).await.unwrap();
    assert!(response.is_some());
}

#[tokio::test]
async fn fetch_listing_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(&settings(&server, 3), &[]).unwrap();
    let err = client.fetch_listing("1", None, 0).await.unwrap_err();
    assert!(
        matches!(err, ScraperError::UnexpectedStatus { status: 403, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_listing_with_unknown_route_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_json()))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_listing("1", Some("residential"), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::UnknownProxyRoute(_)), "got: {err:?}");
}
