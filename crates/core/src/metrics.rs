//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Price lookups (outcome, duration)
//! - Parsing (unresolved modifier lines)
//! - Search refinement (dropped filters)
//! - External services (trade API, price estimator)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Lookup Metrics
// =============================================================================

/// Price lookups total by outcome.
pub static LOOKUPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pricecheck_lookups_total", "Total price lookups"),
        &["outcome"], // "found", "estimated", "not_enough_data", "error"
    )
    .unwrap()
});

/// Lookup duration in seconds.
pub static LOOKUP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "pricecheck_lookup_duration_seconds",
            "Duration of a full price lookup",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["outcome"],
    )
    .unwrap()
});

// =============================================================================
// Parsing Metrics
// =============================================================================

/// Modifier lines that matched no dictionary entry.
pub static UNRESOLVED_MODIFIERS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "pricecheck_unresolved_modifiers_total",
        "Total modifier lines that could not be resolved",
    )
    .unwrap()
});

/// Items parsed by rarity.
pub static ITEMS_PARSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pricecheck_items_parsed_total", "Total items parsed"),
        &["rarity"],
    )
    .unwrap()
});

// =============================================================================
// Refinement Metrics
// =============================================================================

/// Stat filters dropped by the refinement loop.
pub static FILTERS_TRIMMED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pricecheck_filters_trimmed_total",
            "Total stat filters dropped while refining a search",
        ),
        &["reason"], // "no_results", "all_prices_null"
    )
    .unwrap()
});

/// Searches needed per refinement run.
pub static SEARCHES_PER_LOOKUP: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "pricecheck_searches_per_lookup",
            "Number of trade searches issued per refinement run",
        )
        .buckets(vec![1.0, 2.0, 3.0, 5.0, 8.0, 12.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "pricecheck_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pricecheck_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error", "rate_limited"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Lookups
        Box::new(LOOKUPS_TOTAL.clone()),
        Box::new(LOOKUP_DURATION.clone()),
        // Parsing
        Box::new(UNRESOLVED_MODIFIERS.clone()),
        Box::new(ITEMS_PARSED.clone()),
        // Refinement
        Box::new(FILTERS_TRIMMED.clone()),
        Box::new(SEARCHES_PER_LOOKUP.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}
