//! Modifier records and the per-item instances that reference them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The closed set of modifier kinds known to the trade stat dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKind {
    Pseudo,
    Explicit,
    Implicit,
    Fractured,
    Enchant,
    Crafted,
    Veiled,
    Monster,
    Delve,
}

impl ModifierKind {
    pub const ALL: [ModifierKind; 9] = [
        ModifierKind::Pseudo,
        ModifierKind::Explicit,
        ModifierKind::Implicit,
        ModifierKind::Fractured,
        ModifierKind::Enchant,
        ModifierKind::Crafted,
        ModifierKind::Veiled,
        ModifierKind::Monster,
        ModifierKind::Delve,
    ];

    /// Lower-case tag as used by the dictionary's `type` field.
    pub fn as_tag(&self) -> &'static str {
        match self {
            ModifierKind::Pseudo => "pseudo",
            ModifierKind::Explicit => "explicit",
            ModifierKind::Implicit => "implicit",
            ModifierKind::Fractured => "fractured",
            ModifierKind::Enchant => "enchant",
            ModifierKind::Crafted => "crafted",
            ModifierKind::Veiled => "veiled",
            ModifierKind::Monster => "monster",
            ModifierKind::Delve => "delve",
        }
    }

    /// Parse a dictionary tag. Case-insensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|k| k.as_tag() == tag)
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A canonical modifier from the stat dictionary.
///
/// `text` keeps the dictionary's display form, with `#` standing in for
/// every rolled number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub id: String,
    pub text: String,
}

/// Raw dictionary entry as delivered by the bootstrap collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierEntry {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A modifier attached to a parsed item together with its rolled value(s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierInstance {
    pub modifier: Arc<Modifier>,
    /// Comma-joined values in source order, empty when the line had none.
    pub value: String,
}

impl ModifierInstance {
    pub fn new(modifier: Arc<Modifier>, value: impl Into<String>) -> Self {
        Self {
            modifier,
            value: value.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.modifier.id
    }

    pub fn kind(&self) -> ModifierKind {
        self.modifier.kind
    }

    /// Numeric components of the value string. Non-numeric parts
    /// (boss names, passive names) are skipped.
    pub fn numbers(&self) -> Vec<f64> {
        self.value
            .split(',')
            .filter_map(|v| v.trim().parse::<f64>().ok())
            .collect()
    }

    /// Mean of the numeric components, used as the search minimum.
    pub fn mean_value(&self) -> Option<f64> {
        let numbers = self.numbers();
        if numbers.is_empty() {
            return None;
        }
        Some(numbers.iter().sum::<f64>() / numbers.len() as f64)
    }
}
