//! Base type → item category table.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::trie::BaseTrie;

/// One row of the base table as delivered by the bootstrap collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseEntry {
    pub base: String,
    /// Category, either a trade category (`armour.gloves`) or a display
    /// name (`Gloves`).
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default)]
    pub influence: Option<String>,
    #[serde(default)]
    pub ilvl: Option<u32>,
}

impl BaseEntry {
    pub fn new(base: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            category: category.into(),
            influence: None,
            ilvl: None,
        }
    }
}

/// Immutable lookup from item base to category.
#[derive(Debug, Default)]
pub struct BaseCategoryTable {
    entries: Vec<BaseEntry>,
    trie: BaseTrie,
}

impl BaseCategoryTable {
    pub fn new(entries: impl IntoIterator<Item = BaseEntry>) -> Self {
        let entries: Vec<BaseEntry> = entries
            .into_iter()
            .filter(|e| !e.base.trim().is_empty())
            .collect();

        let mut trie = BaseTrie::new();
        for entry in &entries {
            trie.insert(&entry.base);
        }

        debug!(bases = entries.len(), "Base table built");
        Self { entries, trie }
    }

    /// Find the entry whose base is contained in `base`.
    ///
    /// Item bases can carry prefixes (`Synthesised Assassin's Mitts`), so the
    /// match is by containment. Table order decides: the first contained
    /// entry wins.
    pub fn lookup(&self, base: &str) -> Option<&BaseEntry> {
        self.entries
            .iter()
            .find(|entry| base.contains(entry.base.as_str()))
    }

    /// Extract the known base from a magic item's display name.
    pub fn magic_base<'a>(&self, name: &'a str) -> Option<&'a str> {
        self.trie.longest_match(name)
    }

    pub fn entries(&self) -> &[BaseEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
