//! In-memory stat dictionary keyed by `(kind, canonical text)`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::extract::canonical_text;
use super::types::{Modifier, ModifierEntry, ModifierKind};

/// Immutable lookup from modifier text to its canonical record.
///
/// Built once from the dictionary entries and shared read-only afterwards.
#[derive(Debug, Default)]
pub struct ModifierIndex {
    by_key: HashMap<(ModifierKind, String), Arc<Modifier>>,
    by_id: HashMap<String, Arc<Modifier>>,
}

impl ModifierIndex {
    /// Build the index from raw dictionary entries.
    ///
    /// Entries with an unknown `type` tag are skipped. When two entries share
    /// the same kind and canonical text the first one wins.
    pub fn new(entries: impl IntoIterator<Item = ModifierEntry>) -> Self {
        let mut index = Self::default();

        for entry in entries {
            let Some(kind) = ModifierKind::from_tag(&entry.kind) else {
                debug!(id = %entry.id, tag = %entry.kind, "Skipping modifier with unknown type");
                continue;
            };
            index.insert(Modifier {
                kind,
                id: entry.id,
                text: entry.text,
            });
        }

        debug!(modifiers = index.len(), "Modifier index built");
        index
    }

    /// Build the index from already-typed modifiers.
    pub fn from_modifiers(modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        let mut index = Self::default();
        for modifier in modifiers {
            index.insert(modifier);
        }
        index
    }

    fn insert(&mut self, modifier: Modifier) {
        let key = (modifier.kind, canonical_text(&modifier.text));
        if self.by_key.contains_key(&key) {
            debug!(id = %modifier.id, text = %modifier.text, "Duplicate modifier text, keeping first");
            return;
        }
        let modifier = Arc::new(modifier);
        self.by_id
            .entry(modifier.id.clone())
            .or_insert_with(|| Arc::clone(&modifier));
        self.by_key.insert(key, modifier);
    }

    /// Look up a modifier by kind and text. The text may carry signed
    /// placeholders; they are canonicalised before lookup.
    pub fn get(&self, kind: ModifierKind, text: &str) -> Option<Arc<Modifier>> {
        self.by_key.get(&(kind, canonical_text(text))).cloned()
    }

    /// Look up a modifier by its dictionary id.
    pub fn by_id(&self, id: &str) -> Option<Arc<Modifier>> {
        self.by_id.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
