//! Price lookup orchestration.
//!
//! The PriceChecker composes the pipeline:
//! 1. Parse the clipboard text and classify the item
//! 2. Build the query document (exchange for bulk items, search otherwise)
//! 3. Fold pseudo totals and relax numeric bounds
//! 4. Run the exchange search or the refinement loop
//! 5. Fall back to the estimator for rares the trade site cannot price

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::base::BaseCategoryTable;
use crate::config::PricingConfig;
use crate::estimate::{PriceEstimate, PriceEstimator};
use crate::item::{ClassificationError, Item, ItemClassifier, ItemParser, ParseError, Rarity};
use crate::metrics;
use crate::modifier::{ModifierIndex, ModifierResolver};
use crate::query::{aggregate_pseudo, build_document, relax, ExchangeIds, QueryDocument};
use crate::trade::{refine, DroppedFilter, Listing, RefineOutcome, TradeError, TradeSearcher};

#[derive(Debug, Error)]
pub enum PriceCheckError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Unable to price: {0}")]
    Unpriceable(#[from] ClassificationError),

    #[error(transparent)]
    Trade(#[from] TradeError),
}

/// A classified item together with the query that prices it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedQuery {
    pub item: Item,
    pub query: QueryDocument,
}

/// Result of a lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PriceOutcome {
    Found { total: u64, listings: Vec<Listing> },
    Estimated(PriceEstimate),
    NotEnoughData,
}

impl PriceOutcome {
    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceOutcome::Found { .. } => "found",
            PriceOutcome::Estimated(_) => "estimated",
            PriceOutcome::NotEnoughData => "not_enough_data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceReport {
    pub item: Item,
    /// Query as last submitted; narrower than the prepared one when filters
    /// were dropped.
    pub query: QueryDocument,
    pub outcome: PriceOutcome,
    pub dropped_filters: Vec<DroppedFilter>,
}

pub struct PriceChecker {
    parser: ItemParser,
    classifier: ItemClassifier,
    searcher: Arc<dyn TradeSearcher>,
    estimator: Option<Arc<dyn PriceEstimator>>,
    exchange_ids: Option<Arc<ExchangeIds>>,
    options: PricingConfig,
    league: String,
}

impl PriceChecker {
    pub fn new(
        modifiers: Arc<ModifierIndex>,
        bases: Arc<BaseCategoryTable>,
        searcher: Arc<dyn TradeSearcher>,
        league: impl Into<String>,
    ) -> Self {
        let resolver = ModifierResolver::new(modifiers);
        Self {
            parser: ItemParser::with_resolver(resolver.clone()),
            classifier: ItemClassifier::new(bases, resolver),
            searcher,
            estimator: None,
            exchange_ids: None,
            options: PricingConfig::default(),
            league: league.into(),
        }
    }

    /// Add a fallback estimator for rares the trade search cannot price.
    pub fn with_estimator(mut self, estimator: Arc<dyn PriceEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    /// Enable exchange searches for currency and fragments.
    pub fn with_exchange_ids(mut self, ids: Arc<ExchangeIds>) -> Self {
        self.exchange_ids = Some(ids);
        self
    }

    pub fn with_options(mut self, options: PricingConfig) -> Self {
        self.options = options;
        self
    }

    pub fn league(&self) -> &str {
        &self.league
    }

    pub fn searcher_name(&self) -> &str {
        self.searcher.name()
    }

    pub fn has_estimator(&self) -> bool {
        self.estimator.is_some()
    }

    /// Parse and classify an item.
    pub fn parse(&self, text: &str) -> Result<Item, PriceCheckError> {
        let item = self.parser.parse(text)?;
        match self.classifier.try_classify(item) {
            Ok(item) => Ok(item),
            Err(e) => {
                tracing::error!(error = %e, "Unable to classify item");
                Err(e.into())
            }
        }
    }

    /// Parse, classify and build the query without touching the network.
    pub fn prepare(&self, text: &str) -> Result<PreparedQuery, PriceCheckError> {
        let item = self.parse(text)?;
        let query = match build_document(
            &item,
            self.exchange_ids.as_deref(),
            &self.options.exchange_have,
        ) {
            QueryDocument::Search(mut doc) => {
                if self.options.aggregate_pseudo {
                    doc = aggregate_pseudo(doc);
                }
                if self.options.relax_filters {
                    doc = relax(doc);
                }
                QueryDocument::Search(doc)
            }
            exchange => exchange,
        };
        Ok(PreparedQuery { item, query })
    }

    /// Price an item.
    ///
    /// Running out of filters is not an error: the report carries
    /// `NotEnoughData` (or an estimate for rares).
    pub async fn check(&self, text: &str) -> Result<PriceReport, PriceCheckError> {
        let start = Instant::now();
        let result = self.run(text).await;

        let outcome = match &result {
            Ok(report) => report.outcome.as_str(),
            Err(_) => "error",
        };
        metrics::LOOKUPS_TOTAL.with_label_values(&[outcome]).inc();
        metrics::LOOKUP_DURATION
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn run(&self, text: &str) -> Result<PriceReport, PriceCheckError> {
        let PreparedQuery { item, query } = self.prepare(text)?;
        debug!(
            rarity = %item.rarity,
            base = %item.base,
            kind = item.kind.name(),
            "Pricing item"
        );

        match query {
            QueryDocument::Exchange(doc) => {
                let page = self.searcher.exchange(&doc).await?;
                let outcome = if page.has_priced() {
                    PriceOutcome::Found {
                        total: page.total,
                        listings: page.listings,
                    }
                } else {
                    PriceOutcome::NotEnoughData
                };
                Ok(PriceReport {
                    item,
                    query: QueryDocument::Exchange(doc),
                    outcome,
                    dropped_filters: Vec::new(),
                })
            }
            QueryDocument::Search(doc) => {
                let refinement = refine(self.searcher.as_ref(), doc).await?;
                let outcome = match refinement.outcome {
                    RefineOutcome::Found(page) => PriceOutcome::Found {
                        total: page.total,
                        listings: page.listings,
                    },
                    RefineOutcome::Exhausted => self.fallback(&item, text).await,
                };
                Ok(PriceReport {
                    item,
                    query: QueryDocument::Search(refinement.query),
                    outcome,
                    dropped_filters: refinement.dropped,
                })
            }
        }
    }

    async fn fallback(&self, item: &Item, text: &str) -> PriceOutcome {
        let Some(estimator) = &self.estimator else {
            return PriceOutcome::NotEnoughData;
        };
        if item.rarity != Rarity::Rare {
            return PriceOutcome::NotEnoughData;
        }

        match estimator.estimate(&self.league, text).await {
            Ok(estimate) => {
                info!(
                    estimator = estimator.name(),
                    min = estimate.min,
                    max = estimate.max,
                    currency = %estimate.currency,
                    "Using estimated price"
                );
                PriceOutcome::Estimated(estimate)
            }
            Err(e) => {
                warn!(estimator = estimator.name(), error = %e, "Price estimate failed");
                PriceOutcome::NotEnoughData
            }
        }
    }
}

impl std::fmt::Debug for PriceChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceChecker")
            .field("searcher", &self.searcher.name())
            .field("estimator", &self.estimator.as_ref().map(|e| e.name().to_string()))
            .field("league", &self.league)
            .field("options", &self.options)
            .finish()
    }
}
