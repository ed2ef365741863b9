//! poeprices.info estimator client.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{EstimateError, PriceEstimate, PriceEstimator};
use crate::config::EstimatorConfig;
use crate::metrics;

/// Estimator backed by the poeprices.info prediction API.
pub struct PoePricesClient {
    client: Client,
    config: EstimatorConfig,
}

impl PoePricesClient {
    pub fn new(config: EstimatorConfig) -> Result<Self, EstimateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| EstimateError::ConnectionFailed(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn build_url(&self, league: &str, item_text: &str) -> String {
        format!(
            "{}?l={}&i={}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(league),
            urlencoding::encode(&STANDARD.encode(item_text))
        )
    }

    async fn request(&self, url: &str) -> Result<PoePricesResponse, EstimateError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                EstimateError::Timeout
            } else if e.is_connect() {
                EstimateError::ConnectionFailed(e.to_string())
            } else {
                EstimateError::ApiError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EstimateError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| EstimateError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl PriceEstimator for PoePricesClient {
    fn name(&self) -> &str {
        "poeprices"
    }

    async fn estimate(&self, league: &str, item_text: &str) -> Result<PriceEstimate, EstimateError> {
        let url = self.build_url(league, item_text);
        let start = Instant::now();
        let result = self.request(&url).await.and_then(PoePricesResponse::into_estimate);

        let status = if result.is_ok() { "success" } else { "error" };
        metrics::EXTERNAL_SERVICE_DURATION
            .with_label_values(&["poeprices", "estimate"])
            .observe(start.elapsed().as_secs_f64());
        metrics::EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["poeprices", "estimate", status])
            .inc();

        if let Ok(estimate) = &result {
            debug!(
                min = estimate.min,
                max = estimate.max,
                currency = %estimate.currency,
                confidence = estimate.confidence,
                "Price estimated"
            );
        }
        result
    }
}

#[derive(Debug, Deserialize)]
struct PoePricesResponse {
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    pred_confidence_score: Option<f64>,
    #[serde(default)]
    error: i64,
    #[serde(default)]
    error_msg: Option<String>,
}

impl PoePricesResponse {
    fn into_estimate(self) -> Result<PriceEstimate, EstimateError> {
        if self.error != 0 {
            return Err(EstimateError::ApiError(
                self.error_msg
                    .unwrap_or_else(|| format!("error code {}", self.error)),
            ));
        }
        match (self.min, self.max, self.currency) {
            (Some(min), Some(max), Some(currency)) => Ok(PriceEstimate {
                min,
                max,
                currency,
                confidence: self.pred_confidence_score.unwrap_or(0.0),
            }),
            _ => Err(EstimateError::InvalidResponse(
                "missing min, max or currency".to_string(),
            )),
        }
    }
}
