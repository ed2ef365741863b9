//! Trade query documents and the passes that shape them.

mod builder;
mod document;
mod exchange;
mod pseudo;
mod relax;

pub use builder::{
    build_document, build_query, MAP_FILTERS, MISC_FILTERS, SOCKET_FILTERS, TYPE_FILTERS,
};
pub use document::{
    ExchangeDocument, ExchangeQuery, FilterDocument, FilterGroup, FilterValue, OptionValue,
    Query, QueryDocument, Sort, StatFilter, StatGroup, StatValue,
};
pub use exchange::{build_exchange, ExchangeEntry, ExchangeIds};
pub use pseudo::{
    aggregate_pseudo, is_pseudo_total, PSEUDO_TOTALS, PSEUDO_TOTAL_CHAOS_RESISTANCE,
    PSEUDO_TOTAL_ELEMENTAL_RESISTANCE, PSEUDO_TOTAL_LIFE,
};
pub use relax::relax;
