//! Widen exact stat values into ±10% ranges.

use super::document::{FilterDocument, StatValue};

const RELAX_FACTOR: f64 = 0.1;

/// Stat id prefixes whose values are widened.
const RELAXED_PREFIXES: [&str; 2] = ["explicit", "pseudo"];

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Turn each relaxable filter's minimum `v` into `[v × 0.9, v × 1.1]`.
///
/// Filters without a minimum are left alone.
pub fn relax(mut doc: FilterDocument) -> FilterDocument {
    for filter in doc.stat_filters_mut().iter_mut() {
        if !RELAXED_PREFIXES.iter().any(|p| filter.id.starts_with(p)) {
            continue;
        }
        let Some(value) = filter.min() else {
            continue;
        };
        let low = round2(value * (1.0 - RELAX_FACTOR));
        let high = round2(value * (1.0 + RELAX_FACTOR));
        filter.value = Some(StatValue {
            min: Some(low.min(high)),
            max: Some(low.max(high)),
        });
    }
    doc
}
