//! Types for the trade search collaborator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::{ExchangeDocument, FilterDocument};

/// Asking price of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

/// A single listing returned by the trade API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    /// Seller account name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// When the listing was indexed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<DateTime<Utc>>,
    /// `None` when the seller did not set a price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
}

/// First page of a search: total hit count plus the fetched listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub query_id: String,
    pub total: u64,
    pub listings: Vec<Listing>,
}

impl SearchPage {
    /// Whether at least one listing carries a price.
    pub fn has_priced(&self) -> bool {
        self.listings.iter().any(|l| l.price.is_some())
    }
}

/// Errors from the trade API. Never retried by the core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TradeError {
    #[error("Trade API connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Trade API request timeout")]
    Timeout,

    #[error("Rate limited on {endpoint}, retry in {retry_after_ms}ms")]
    RateLimited {
        endpoint: String,
        retry_after_ms: u64,
    },

    #[error("Trade API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid trade API response: {0}")]
    InvalidResponse(String),
}

/// Trait for trade search backends.
#[async_trait]
pub trait TradeSearcher: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Run an item search and fetch the first listings.
    async fn search(&self, query: &FilterDocument) -> Result<SearchPage, TradeError>;

    /// Run a bulk exchange search and fetch the first listings.
    async fn exchange(&self, query: &ExchangeDocument) -> Result<SearchPage, TradeError>;
}
