//! Pseudo stat aggregation.
//!
//! The trade API cannot sum filters at query time, so resistance and life
//! lines are folded into the site's synthetic totals before searching.

use super::document::{FilterDocument, StatFilter};

pub const PSEUDO_TOTAL_ELEMENTAL_RESISTANCE: &str = "pseudo.pseudo_total_elemental_resistance";
pub const PSEUDO_TOTAL_CHAOS_RESISTANCE: &str = "pseudo.pseudo_total_chaos_resistance";
pub const PSEUDO_TOTAL_LIFE: &str = "pseudo.pseudo_total_life";

/// The synthetic ids produced here, in output order.
pub const PSEUDO_TOTALS: [&str; 3] = [
    PSEUDO_TOTAL_ELEMENTAL_RESISTANCE,
    PSEUDO_TOTAL_CHAOS_RESISTANCE,
    PSEUDO_TOTAL_LIFE,
];

/// Stat id prefixes whose values count towards a total.
const AGGREGATED_PREFIXES: [&str; 4] = ["explicit", "implicit", "crafted", "fractured"];

/// How much one point of a stat adds to each total.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Contribution {
    elemental: f64,
    chaos: f64,
    life: f64,
}

const fn contribution(elemental: f64, chaos: f64, life: f64) -> Contribution {
    Contribution {
        elemental,
        chaos,
        life,
    }
}

/// Numeric stat hash → contribution.
const CONTRIBUTIONS: &[(&str, Contribution)] = &[
    // fire, cold, lightning
    ("3372524247", contribution(1.0, 0.0, 0.0)),
    ("4220027924", contribution(1.0, 0.0, 0.0)),
    ("1671376347", contribution(1.0, 0.0, 0.0)),
    // fire and cold, fire and lightning, cold and lightning
    ("2915988346", contribution(2.0, 0.0, 0.0)),
    ("3441501978", contribution(2.0, 0.0, 0.0)),
    ("4277795662", contribution(2.0, 0.0, 0.0)),
    // all elemental
    ("2901986750", contribution(3.0, 0.0, 0.0)),
    // chaos
    ("2923486259", contribution(0.0, 1.0, 0.0)),
    // fire and chaos, cold and chaos, lightning and chaos
    ("378817135", contribution(1.0, 1.0, 0.0)),
    ("3393628375", contribution(1.0, 1.0, 0.0)),
    ("3465022881", contribution(1.0, 1.0, 0.0)),
    // maximum life
    ("3299347043", contribution(0.0, 0.0, 1.0)),
];

pub fn is_pseudo_total(id: &str) -> bool {
    PSEUDO_TOTALS.contains(&id)
}

fn contribution_for(id: &str) -> Option<Contribution> {
    let (prefix, rest) = id.split_once('.')?;
    if !AGGREGATED_PREFIXES.contains(&prefix) {
        return None;
    }
    let hash = rest.strip_prefix("stat_").unwrap_or(rest);
    CONTRIBUTIONS
        .iter()
        .find(|(h, _)| *h == hash)
        .map(|(_, c)| *c)
}

/// Replace resistance and life filters with their pseudo totals.
///
/// Consumed filters are removed; a total is only emitted when positive. If a
/// total filter is already present its minimum is increased instead.
pub fn aggregate_pseudo(mut doc: FilterDocument) -> FilterDocument {
    let mut totals = Contribution::default();
    let mut consumed = vec![false; doc.stat_filters().len()];

    for (i, filter) in doc.stat_filters().iter().enumerate() {
        let (Some(c), Some(value)) = (contribution_for(&filter.id), filter.min()) else {
            continue;
        };
        totals.elemental += value * c.elemental;
        totals.chaos += value * c.chaos;
        totals.life += value * c.life;
        consumed[i] = true;
    }

    let mut filters: Vec<StatFilter> = doc
        .stat_filters()
        .iter()
        .zip(&consumed)
        .filter(|(_, consumed)| !**consumed)
        .map(|(filter, _)| filter.clone())
        .collect();

    let sums = [
        (PSEUDO_TOTAL_ELEMENTAL_RESISTANCE, totals.elemental),
        (PSEUDO_TOTAL_CHAOS_RESISTANCE, totals.chaos),
        (PSEUDO_TOTAL_LIFE, totals.life),
    ];
    for (id, total) in sums {
        if total <= 0.0 {
            continue;
        }
        match filters.iter_mut().find(|f| f.id == id) {
            Some(existing) => {
                let min = existing.min().unwrap_or(0.0) + total;
                *existing = StatFilter::new(id, Some(min));
            }
            None => filters.push(StatFilter::new(id, Some(total))),
        }
    }

    *doc.stat_filters_mut() = filters;
    doc
}
