//! Search refinement: drop stat filters until something priced turns up.
//!
//! ```text
//! Searching ──priced──▶ Found
//!     │
//!     └─empty / unpriced──▶ Trimming ──filter dropped──▶ Searching
//!                              │
//!                              └─nothing left──▶ Exhausted
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use super::{SearchPage, TradeError, TradeSearcher};
use crate::metrics;
use crate::query::{is_pseudo_total, FilterDocument};

/// Why a filter was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimReason {
    NoResults,
    AllPricesNull,
}

impl TrimReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrimReason::NoResults => "no_results",
            TrimReason::AllPricesNull => "all_prices_null",
        }
    }
}

impl fmt::Display for TrimReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineState {
    Searching,
    Trimming(TrimReason),
    Found,
    Exhausted,
}

/// A stat filter removed during refinement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedFilter {
    pub id: String,
    pub reason: TrimReason,
}

/// Terminal result of a refinement run.
#[derive(Debug, Clone, PartialEq)]
pub enum RefineOutcome {
    Found(SearchPage),
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    pub outcome: RefineOutcome,
    /// Query as last submitted.
    pub query: FilterDocument,
    /// Filters dropped, in order.
    pub dropped: Vec<DroppedFilter>,
    pub searches: u32,
}

/// Index of the next filter to drop: the first non-pseudo filter, or the
/// first filter once only pseudo totals remain.
pub fn next_to_drop(doc: &FilterDocument) -> Option<usize> {
    let filters = doc.stat_filters();
    if filters.is_empty() {
        return None;
    }
    Some(
        filters
            .iter()
            .position(|f| !is_pseudo_total(&f.id))
            .unwrap_or(0),
    )
}

/// Run the refinement loop. Trade errors end the loop and are returned
/// unchanged.
pub async fn refine(
    searcher: &dyn TradeSearcher,
    mut query: FilterDocument,
) -> Result<Refinement, TradeError> {
    let mut state = RefineState::Searching;
    let mut dropped = Vec::new();
    let mut searches = 0u32;
    let mut found = None;

    loop {
        state = match state {
            RefineState::Searching => {
                let page = searcher.search(&query).await?;
                searches += 1;
                debug!(
                    searcher = searcher.name(),
                    total = page.total,
                    listings = page.listings.len(),
                    filters = query.stat_filters().len(),
                    "Refinement search"
                );
                if page.has_priced() {
                    found = Some(page);
                    RefineState::Found
                } else if page.listings.is_empty() {
                    RefineState::Trimming(TrimReason::NoResults)
                } else {
                    RefineState::Trimming(TrimReason::AllPricesNull)
                }
            }
            RefineState::Trimming(reason) => match next_to_drop(&query) {
                Some(index) => {
                    let filter = query.stat_filters_mut().remove(index);
                    info!(stat = %filter.id, reason = %reason, "Dropped stat filter");
                    metrics::FILTERS_TRIMMED
                        .with_label_values(&[reason.as_str()])
                        .inc();
                    dropped.push(DroppedFilter {
                        id: filter.id,
                        reason,
                    });
                    RefineState::Searching
                }
                None => RefineState::Exhausted,
            },
            RefineState::Found | RefineState::Exhausted => break,
        };
    }

    metrics::SEARCHES_PER_LOOKUP
        .with_label_values(&[])
        .observe(searches as f64);

    let outcome = match found {
        Some(page) => RefineOutcome::Found(page),
        None => {
            info!(searches, "Search exhausted without priced results");
            RefineOutcome::Exhausted
        }
    };

    Ok(Refinement {
        outcome,
        query,
        dropped,
        searches,
    })
}
