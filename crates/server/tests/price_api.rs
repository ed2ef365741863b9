//! Price check API tests against an in-process router.

mod common;

use axum::http::StatusCode;
use pricecheck_core::{estimate::PriceEstimate, TradeError};

use common::{fixtures, TestFixture};

#[tokio::test]
async fn test_health_reports_league() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["league"], fixtures::LEAGUE);
    assert_eq!(response.body["searcher"], "mock");
    assert_eq!(response.body["estimator"], true);
}

#[tokio::test]
async fn test_config_hides_session_id() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/config").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["trade"]["league"], fixtures::LEAGUE);
    assert_eq!(response.body["trade"]["session_id_configured"], true);
    assert!(!response.body.to_string().contains("test-session"));
}

#[tokio::test]
async fn test_parse_returns_classified_item() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_text("/api/v1/parse", fixtures::gloves_text())
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["rarity"], "rare");
    assert_eq!(response.body["base"], "Assassin's Mitts");
    assert_eq!(response.body["category"], "armour.gloves");
    assert_eq!(response.body["kind"]["kind"], "gloves");
}

#[tokio::test]
async fn test_parse_rejects_garbage() {
    let fixture = TestFixture::new().await;

    let response = fixture.post_text("/api/v1/parse", "hello").await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_base_is_unpriceable() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_text("/api/v1/price", fixtures::UNKNOWN_BASE)
        .await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    let error = response.body["error"].as_str().unwrap();
    assert!(error.starts_with("Unable to price"), "{}", error);
    assert!(fixture.searcher.recorded_searches().await.is_empty());
}

#[tokio::test]
async fn test_query_returns_search_document() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_text("/api/v1/query", fixtures::gloves_text())
        .await;

    assert_status!(response, StatusCode::OK);
    let query = &response.body["query"];
    assert_eq!(query["status"]["option"], "online");
    assert_eq!(
        query["filters"]["type_filters"]["filters"]["rarity"]["option"],
        "rare"
    );
    assert_eq!(
        query["stats"][0]["filters"].as_array().unwrap().len(),
        2
    );
    assert_eq!(response.body["sort"]["price"], "asc");
}

#[tokio::test]
async fn test_query_for_currency_is_exchange() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_text("/api/v1/query", fixtures::CHAOS_ORB)
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["exchange"]["want"][0], "chaos");
}

#[tokio::test]
async fn test_price_found() {
    let fixture = TestFixture::new().await;
    fixture
        .searcher
        .push_page(fixtures::search_page(&[Some(7.0), Some(9.0)]))
        .await;

    let response = fixture
        .post_text("/api/v1/price", fixtures::gloves_text())
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["outcome"]["status"], "found");
    assert_eq!(response.body["outcome"]["listings"][1]["price"]["amount"], 9.0);
    assert_eq!(response.body["dropped_filters"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_price_falls_back_to_estimate() {
    let fixture = TestFixture::new().await;
    fixture
        .estimator
        .set_estimate(PriceEstimate {
            min: 2.0,
            max: 4.0,
            currency: "chaos".to_string(),
            confidence: 80.0,
        })
        .await;

    let response = fixture
        .post_text("/api/v1/price", fixtures::gloves_text())
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["outcome"]["status"], "estimated");
    assert_eq!(response.body["outcome"]["max"], 4.0);
    let dropped = response.body["dropped_filters"].as_array().unwrap();
    assert_eq!(dropped.len(), 2);
    assert_eq!(dropped[0]["reason"], "no_results");
}

#[tokio::test]
async fn test_price_rate_limited() {
    let fixture = TestFixture::new().await;
    fixture
        .searcher
        .push_error(TradeError::RateLimited {
            endpoint: "search".to_string(),
            retry_after_ms: 4000,
        })
        .await;

    let response = fixture
        .post_text("/api/v1/price", fixtures::gloves_text())
        .await;

    assert_status!(response, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.body["retry_after_ms"], 4000);
}

#[tokio::test]
async fn test_price_trade_failure_is_bad_gateway() {
    let fixture = TestFixture::new().await;
    fixture
        .searcher
        .push_error(TradeError::ConnectionFailed("refused".to_string()))
        .await;

    let response = fixture
        .post_text("/api/v1/price", fixtures::gloves_text())
        .await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let (status, body) = fixture.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("pricecheck_http_requests_total"));
}
