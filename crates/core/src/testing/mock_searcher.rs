//! Mock trade searcher for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::query::{ExchangeDocument, FilterDocument};
use crate::trade::{SearchPage, TradeError, TradeSearcher};

type Scripted = Result<SearchPage, TradeError>;

/// Mock implementation of the TradeSearcher trait.
///
/// Provides controllable behavior for testing:
/// - Scripted responses, consumed one per call in order
/// - A fallback page once the script runs out (empty by default)
/// - Recorded queries for assertions
///
/// # Example
///
/// ```rust,ignore
/// use pricecheck_core::testing::{fixtures, MockSearcher};
///
/// let searcher = MockSearcher::new();
/// searcher.push_page(fixtures::search_page(&[None])).await;
/// searcher.push_page(fixtures::search_page(&[Some(5.0)])).await;
///
/// let result = refine(&searcher, query).await?;
/// assert_eq!(searcher.recorded_searches().await.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockSearcher {
    script: Arc<RwLock<VecDeque<Scripted>>>,
    fallback: Arc<RwLock<SearchPage>>,
    searches: Arc<RwLock<Vec<FilterDocument>>>,
    exchanges: Arc<RwLock<Vec<ExchangeDocument>>>,
}

impl MockSearcher {
    /// Create a mock searcher that returns empty pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page for the next call.
    pub async fn push_page(&self, page: SearchPage) {
        self.script.write().await.push_back(Ok(page));
    }

    /// Queue an error for the next call.
    pub async fn push_error(&self, error: TradeError) {
        self.script.write().await.push_back(Err(error));
    }

    /// Page returned once the script is exhausted.
    pub async fn set_fallback(&self, page: SearchPage) {
        *self.fallback.write().await = page;
    }

    /// Item searches made so far.
    pub async fn recorded_searches(&self) -> Vec<FilterDocument> {
        self.searches.read().await.clone()
    }

    /// Exchange searches made so far.
    pub async fn recorded_exchanges(&self) -> Vec<ExchangeDocument> {
        self.exchanges.read().await.clone()
    }

    async fn next(&self) -> Scripted {
        match self.script.write().await.pop_front() {
            Some(scripted) => scripted,
            None => Ok(self.fallback.read().await.clone()),
        }
    }
}

#[async_trait]
impl TradeSearcher for MockSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &FilterDocument) -> Result<SearchPage, TradeError> {
        self.searches.write().await.push(query.clone());
        self.next().await
    }

    async fn exchange(&self, query: &ExchangeDocument) -> Result<SearchPage, TradeError> {
        self.exchanges.write().await.push(query.clone());
        self.next().await
    }
}
