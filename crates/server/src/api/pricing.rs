//! Price check API handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use pricecheck_core::{Item, PriceCheckError, PriceReport, QueryDocument, TradeError};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ItemTextRequest {
    /// Item text as copied from the game client.
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

/// Error wrapper mapping lookup failures to HTTP responses.
#[derive(Debug)]
pub struct ApiError(PriceCheckError);

impl From<PriceCheckError> for ApiError {
    fn from(e: PriceCheckError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, retry_after_ms) = match &self.0 {
            PriceCheckError::Parse(_) | PriceCheckError::Unpriceable(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, None)
            }
            PriceCheckError::Trade(TradeError::RateLimited { retry_after_ms, .. }) => {
                (StatusCode::TOO_MANY_REQUESTS, Some(*retry_after_ms))
            }
            PriceCheckError::Trade(_) => (StatusCode::BAD_GATEWAY, None),
        };
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                retry_after_ms,
            }),
        )
            .into_response()
    }
}

/// Log a failed lookup together with the text that caused it.
fn log_failure(e: &PriceCheckError, text: &str) {
    match e {
        PriceCheckError::Trade(_) => error!(error = %e, "Price lookup failed"),
        _ => warn!(error = %e, text = %text, "Item rejected"),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/parse
///
/// Parse and classify an item without searching.
pub async fn parse_item(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ItemTextRequest>,
) -> Result<Json<Item>, ApiError> {
    state.checker().parse(&body.text).map(Json).map_err(|e| {
        log_failure(&e, &body.text);
        e.into()
    })
}

/// POST /api/v1/query
///
/// Build the trade query an item would be searched with.
pub async fn build_query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ItemTextRequest>,
) -> Result<Json<QueryDocument>, ApiError> {
    state
        .checker()
        .prepare(&body.text)
        .map(|prepared| Json(prepared.query))
        .map_err(|e| {
            log_failure(&e, &body.text);
            e.into()
        })
}

/// POST /api/v1/price
///
/// Run the full lookup: search, refine and estimate.
pub async fn price_item(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ItemTextRequest>,
) -> Result<Json<PriceReport>, ApiError> {
    match state.checker().check(&body.text).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            log_failure(&e, &body.text);
            Err(e.into())
        }
    }
}
