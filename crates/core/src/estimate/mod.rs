//! Fallback price estimation for items the trade search cannot price.

mod poeprices;

pub use poeprices::PoePricesClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Predicted price range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub min: f64,
    pub max: f64,
    pub currency: String,
    /// Confidence score in percent as reported by the service.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    #[error("Estimator connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Estimator request timeout")]
    Timeout,

    #[error("Estimator API error: {0}")]
    ApiError(String),

    #[error("Invalid estimator response: {0}")]
    InvalidResponse(String),
}

/// Trait for price estimation backends.
#[async_trait]
pub trait PriceEstimator: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Estimate the price of an item from its raw clipboard text.
    async fn estimate(&self, league: &str, item_text: &str) -> Result<PriceEstimate, EstimateError>;
}
