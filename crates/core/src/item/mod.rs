//! Item model, clipboard parser and classifier.

mod classifier;
mod error;
mod parser;
mod types;

pub use classifier::{kind_for_category, trade_category, ItemClassifier};
pub use error::{ClassificationError, ParseError};
pub use parser::{split_sections, ItemParser, SECTION_DELIMITER};
pub use types::{
    link_count, GemData, Influence, Item, ItemKind, MapData, Rarity, Sockets,
};
