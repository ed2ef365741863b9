//! HTTP client for the official trade API.
//!
//! A search is two requests: POST the query to `/search/{league}` (or
//! `/exchange/{league}`) to get a query id and result hashes, then GET
//! `/fetch/{hashes}?query={id}` for the first listings.
//!
//! Each request first waits for its endpoint's token bucket; a 429 from the
//! server is returned as [`TradeError::RateLimited`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::TradeConfig;
use crate::metrics;
use crate::query::{ExchangeDocument, FilterDocument};

use super::rate_limiter::RateLimiterPool;
use super::{Listing, Price, SearchPage, TradeError, TradeSearcher};

const SEARCH: &str = "search";
const EXCHANGE: &str = "exchange";
const FETCH: &str = "fetch";

const CLIENT_USER_AGENT: &str = concat!("pricecheck/", env!("CARGO_PKG_VERSION"));

/// Trade API backed [`TradeSearcher`].
pub struct TradeClient {
    client: Client,
    config: TradeConfig,
    rate_limiters: RateLimiterPool,
}

impl TradeClient {
    pub fn new(config: TradeConfig) -> Result<Self, TradeError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        if let Some(session) = config.session_id.as_deref().filter(|s| !s.is_empty()) {
            let cookie = HeaderValue::from_str(&format!("POESESSID={}", session))
                .map_err(|e| TradeError::ConnectionFailed(format!("Invalid session id: {}", e)))?;
            headers.insert(COOKIE, cookie);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .default_headers(headers)
            .build()
            .map_err(|e| TradeError::ConnectionFailed(e.to_string()))?;

        let rate_limiters = RateLimiterPool::new(&[
            (SEARCH, config.search_rpm),
            (EXCHANGE, config.search_rpm),
            (FETCH, config.fetch_rpm),
        ]);

        Ok(Self {
            client,
            config,
            rate_limiters,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint,
            urlencoding::encode(&self.config.league)
        )
    }

    /// POST a query document, returning the query id and result hashes.
    async fn post_query<T: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<QueryResponse, TradeError> {
        self.rate_limiters.acquire(endpoint).await?;

        let url = self.url(endpoint);
        debug!(endpoint, url = %url, "Submitting trade query");

        let start = Instant::now();
        let result = self.client.post(&url).json(body).send().await;
        let response = check_response(endpoint, result).await;
        record(endpoint, start, &response);

        response?
            .json::<QueryResponse>()
            .await
            .map_err(|e| TradeError::InvalidResponse(format!("Failed to parse query response: {}", e)))
    }

    /// Fetch the first `fetch_limit` listings of a query.
    async fn fetch(&self, query: &QueryResponse, exchange: bool) -> Result<Vec<Listing>, TradeError> {
        let hashes: Vec<&str> = query
            .result
            .iter()
            .take(self.config.fetch_limit)
            .map(String::as_str)
            .collect();
        if hashes.is_empty() {
            return Ok(Vec::new());
        }

        self.rate_limiters.acquire(FETCH).await?;

        let mut url = format!(
            "{}/{}/{}?query={}",
            self.config.base_url.trim_end_matches('/'),
            FETCH,
            hashes.join(","),
            urlencoding::encode(&query.id)
        );
        if exchange {
            url.push_str("&exchange");
        }

        let start = Instant::now();
        let result = self.client.get(&url).send().await;
        let response = check_response(FETCH, result).await;
        record(FETCH, start, &response);

        let body: FetchResponse = response?
            .json()
            .await
            .map_err(|e| TradeError::InvalidResponse(format!("Failed to parse fetch response: {}", e)))?;

        Ok(body
            .result
            .into_iter()
            .flatten()
            .map(FetchEntry::into_listing)
            .collect())
    }

    async fn run<T: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<SearchPage, TradeError> {
        let query = self.post_query(endpoint, body).await?;
        let listings = self.fetch(&query, endpoint == EXCHANGE).await?;

        debug!(
            endpoint,
            query_id = %query.id,
            total = query.total,
            fetched = listings.len(),
            "Trade search complete"
        );

        Ok(SearchPage {
            query_id: query.id,
            total: query.total,
            listings,
        })
    }
}

#[async_trait]
impl TradeSearcher for TradeClient {
    fn name(&self) -> &str {
        "trade"
    }

    async fn search(&self, query: &FilterDocument) -> Result<SearchPage, TradeError> {
        self.run(SEARCH, query).await
    }

    async fn exchange(&self, query: &ExchangeDocument) -> Result<SearchPage, TradeError> {
        self.run(EXCHANGE, query).await
    }
}

/// Map transport failures and non-success statuses to [`TradeError`].
async fn check_response(
    endpoint: &str,
    result: Result<Response, reqwest::Error>,
) -> Result<Response, TradeError> {
    let response = result.map_err(|e| {
        if e.is_timeout() {
            TradeError::Timeout
        } else if e.is_connect() {
            TradeError::ConnectionFailed(e.to_string())
        } else {
            TradeError::ApiError {
                status: 0,
                message: e.to_string(),
            }
        }
    })?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_ms = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000)
            .unwrap_or(60_000);
        warn!(endpoint, retry_after_ms, "Trade API rate limit hit");
        return Err(TradeError::RateLimited {
            endpoint: endpoint.to_string(),
            retry_after_ms,
        });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TradeError::ApiError {
            status: status.as_u16(),
            message: api_error_message(&body),
        });
    }

    Ok(response)
}

/// Pull `error.message` out of an error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}

fn record(endpoint: &str, start: Instant, response: &Result<Response, TradeError>) {
    let status = match response {
        Ok(_) => "success",
        Err(TradeError::RateLimited { .. }) => "rate_limited",
        Err(_) => "error",
    };
    metrics::EXTERNAL_SERVICE_DURATION
        .with_label_values(&["trade", endpoint])
        .observe(start.elapsed().as_secs_f64());
    metrics::EXTERNAL_SERVICE_REQUESTS
        .with_label_values(&["trade", endpoint, status])
        .inc();
}

// Trade API response types

#[derive(Debug, Deserialize)]
struct QueryResponse {
    id: String,
    #[serde(default)]
    result: Vec<String>,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct FetchResponse {
    #[serde(default)]
    result: Vec<Option<FetchEntry>>,
}

#[derive(Debug, Deserialize)]
struct FetchEntry {
    id: String,
    listing: FetchListing,
}

#[derive(Debug, Deserialize)]
struct FetchListing {
    #[serde(default)]
    indexed: Option<DateTime<Utc>>,
    #[serde(default)]
    account: Option<FetchAccount>,
    #[serde(default)]
    price: Option<FetchPrice>,
}

#[derive(Debug, Deserialize)]
struct FetchAccount {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FetchPrice {
    amount: Option<f64>,
    currency: Option<String>,
}

impl FetchEntry {
    fn into_listing(self) -> Listing {
        let price = self.listing.price.and_then(|p| {
            Some(Price {
                amount: p.amount?,
                currency: p.currency?,
            })
        });
        Listing {
            id: self.id,
            account: self.listing.account.map(|a| a.name),
            indexed: self.listing.indexed,
            price,
        }
    }
}
