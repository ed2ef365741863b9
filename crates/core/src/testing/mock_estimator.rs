//! Mock price estimator for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::estimate::{EstimateError, PriceEstimate, PriceEstimator};

/// A recorded estimate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEstimate {
    pub league: String,
    pub item_text: String,
}

/// Mock implementation of the PriceEstimator trait.
///
/// Returns an error until a response is configured.
#[derive(Debug, Clone)]
pub struct MockEstimator {
    response: Arc<RwLock<Result<PriceEstimate, EstimateError>>>,
    calls: Arc<RwLock<Vec<RecordedEstimate>>>,
}

impl Default for MockEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEstimator {
    pub fn new() -> Self {
        Self {
            response: Arc::new(RwLock::new(Err(EstimateError::ApiError(
                "no estimate configured".to_string(),
            )))),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Return this estimate for every call.
    pub async fn set_estimate(&self, estimate: PriceEstimate) {
        *self.response.write().await = Ok(estimate);
    }

    /// Fail every call with this error.
    pub async fn set_error(&self, error: EstimateError) {
        *self.response.write().await = Err(error);
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedEstimate> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl PriceEstimator for MockEstimator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn estimate(&self, league: &str, item_text: &str) -> Result<PriceEstimate, EstimateError> {
        self.calls.write().await.push(RecordedEstimate {
            league: league.to_string(),
            item_text: item_text.to_string(),
        });
        self.response.read().await.clone()
    }
}
