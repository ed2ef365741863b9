//! Error types for item parsing and classification.

use thiserror::Error;

/// Clipboard text that does not look like an item card.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Fewer than three sections after splitting on the delimiter.
    #[error("Not an item: expected at least 3 sections, found {found}")]
    TooFewSections { found: usize },

    /// Header section has no `Rarity:` line.
    #[error("Not an item: missing rarity line")]
    MissingRarity,

    /// Rarity line names a rarity we do not know.
    #[error("Not an item: unrecognized rarity: {0}")]
    UnrecognizedRarity(String),

    /// Header section has no name line.
    #[error("Not an item: missing name line")]
    MissingName,
}

/// Item that cannot be mapped to a searchable category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    /// No base table entry is contained in the item's base.
    #[error("Unknown base: {base}")]
    UnknownBase { base: String },

    /// The base table maps the base to a category with no item kind.
    #[error("Unsupported category {category} for base {base}")]
    UnsupportedCategory { base: String, category: String },
}
