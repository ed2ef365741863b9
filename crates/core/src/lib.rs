pub mod base;
pub mod config;
pub mod data;
pub mod estimate;
pub mod item;
pub mod metrics;
pub mod modifier;
pub mod pricer;
pub mod query;
pub mod testing;
pub mod trade;

pub use base::{BaseCategoryTable, BaseEntry};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use data::{load_bases, load_exchange_ids, load_modifiers, DataError};
pub use estimate::{EstimateError, PoePricesClient, PriceEstimate, PriceEstimator};
pub use item::{ClassificationError, Item, ItemClassifier, ItemKind, ItemParser, ParseError, Rarity};
pub use modifier::{ModifierIndex, ModifierKind, ModifierResolver};
pub use pricer::{PreparedQuery, PriceCheckError, PriceChecker, PriceOutcome, PriceReport};
pub use query::{build_query, ExchangeIds, FilterDocument, QueryDocument};
pub use trade::{refine, SearchPage, TradeClient, TradeError, TradeSearcher};
