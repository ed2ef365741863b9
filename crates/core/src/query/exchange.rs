//! Bulk exchange ids and the exchange document builder.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::document::ExchangeDocument;
use crate::item::{Item, ItemKind};

/// Static exchange entry: short trade id and the item's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeEntry {
    pub id: String,
    pub text: String,
}

/// Display name → exchange id.
#[derive(Debug, Default)]
pub struct ExchangeIds {
    by_text: HashMap<String, String>,
}

impl ExchangeIds {
    pub fn new(entries: impl IntoIterator<Item = ExchangeEntry>) -> Self {
        let mut by_text = HashMap::new();
        for entry in entries {
            by_text.entry(entry.text).or_insert(entry.id);
        }
        Self { by_text }
    }

    pub fn get(&self, text: &str) -> Option<&str> {
        self.by_text.get(text).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_text.is_empty()
    }
}

/// Build an exchange request for items priced in bulk.
///
/// Only currency and fragments with a known exchange id qualify.
pub fn build_exchange(item: &Item, ids: &ExchangeIds, have: &str) -> Option<ExchangeDocument> {
    if !matches!(item.kind, ItemKind::Currency | ItemKind::Fragment) {
        return None;
    }
    let want = ids.get(&item.name).or_else(|| ids.get(&item.base))?;
    Some(ExchangeDocument::new(have, want))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Rarity;

    fn ids() -> ExchangeIds {
        ExchangeIds::new(vec![
            ExchangeEntry {
                id: "exalted".to_string(),
                text: "Exalted Orb".to_string(),
            },
            ExchangeEntry {
                id: "sacrifice-at-dusk".to_string(),
                text: "Sacrifice at Dusk".to_string(),
            },
        ])
    }

    #[test]
    fn test_currency_exchange() {
        let mut item = Item::new(Rarity::Currency, "Exalted Orb");
        item.kind = ItemKind::Currency;
        let doc = build_exchange(&item, &ids(), "chaos").unwrap();
        assert_eq!(doc.exchange.want, vec!["exalted"]);
        assert_eq!(doc.exchange.have, vec!["chaos"]);
    }

    #[test]
    fn test_fragment_exchange() {
        let mut item = Item::new(Rarity::Normal, "Sacrifice at Dusk");
        item.kind = ItemKind::Fragment;
        assert!(build_exchange(&item, &ids(), "chaos").is_some());
    }

    #[test]
    fn test_unknown_or_gear_is_none() {
        let mut item = Item::new(Rarity::Currency, "Mystery Orb");
        item.kind = ItemKind::Currency;
        assert!(build_exchange(&item, &ids(), "chaos").is_none());

        let gear = Item::new(Rarity::Rare, "Exalted Orb");
        assert!(build_exchange(&gear, &ids(), "chaos").is_none());
    }
}
