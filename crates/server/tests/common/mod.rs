//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with a mock trade searcher and estimator injected, so the full HTTP
//! surface can be exercised without network access.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use pricecheck_core::{
    config::{Config, DataConfig, PricingConfig, ServerConfig, TradeConfig},
    testing::{MockEstimator, MockSearcher},
};
use pricecheck_server::state::AppState;

/// Re-export fixtures for test convenience
pub use pricecheck_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_price() {
///     let fixture = TestFixture::new().await;
///     fixture.searcher.push_page(fixtures::search_page(&[Some(1.0)])).await;
///
///     let response = fixture.post("/api/v1/price", json!({ "text": "..." })).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock searcher - script trade search results
    pub searcher: Arc<MockSearcher>,
    /// Mock estimator - configure fallback estimates
    pub estimator: Arc<MockEstimator>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub async fn new() -> Self {
        let searcher = Arc::new(MockSearcher::new());
        let estimator = Arc::new(MockEstimator::new());

        let mut trade = TradeConfig::new(fixtures::LEAGUE);
        trade.session_id = Some("test-session".to_string());

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            data: DataConfig::default(),
            trade,
            pricing: PricingConfig::default(),
            estimator: None,
        };

        let checker = fixtures::price_checker(searcher.clone())
            .with_exchange_ids(fixtures::exchange_ids())
            .with_estimator(estimator.clone());

        let state = Arc::new(AppState::new(config, Arc::new(checker)));
        let router = pricecheck_server::api::create_router(state);

        Self {
            router,
            searcher,
            estimator,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// POST `{"text": ...}` to a pricing endpoint.
    pub async fn post_text(&self, path: &str, text: &str) -> TestResponse {
        self.post(path, serde_json::json!({ "text": text })).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
