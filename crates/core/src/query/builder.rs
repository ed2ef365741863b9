//! Item → trade search document.

use std::collections::HashSet;

use super::document::{FilterDocument, FilterValue, QueryDocument, StatFilter};
use super::exchange::{build_exchange, ExchangeIds};
use crate::item::{Item, ItemKind, Rarity};
use crate::modifier::{ModifierInstance, ModifierKind};

pub const SOCKET_FILTERS: &str = "socket_filters";
pub const MISC_FILTERS: &str = "misc_filters";
pub const TYPE_FILTERS: &str = "type_filters";
pub const MAP_FILTERS: &str = "map_filters";

const TRUE: &str = "true";

/// Build the search document for an item.
pub fn build_query(item: &Item) -> FilterDocument {
    let mut doc = FilterDocument::default();

    if matches!(item.rarity, Rarity::Unique | Rarity::DivinationCard) {
        doc.query.name = Some(item.name.clone());
    }
    doc.query.item_type = item_type(item);

    if let Some(category) = &item.category {
        doc.set_filter(TYPE_FILTERS, "category", FilterValue::option(category));
    }
    if item.rarity.is_searchable() {
        doc.set_filter(TYPE_FILTERS, "rarity", FilterValue::option(item.rarity.as_str()));
    }

    if item.sockets.count() == 6 {
        doc.set_filter(SOCKET_FILTERS, "sockets", FilterValue::min(6));
    }
    if item.links() >= 5 {
        doc.set_filter(SOCKET_FILTERS, "links", FilterValue::min(item.links() as i64));
    }

    let flags = [
        ("corrupted", item.corrupted),
        ("mirrored", item.mirrored),
        ("veiled", item.veiled),
        ("synthesised_item", item.synthesised),
    ];
    for (key, set) in flags {
        if set {
            doc.set_filter(MISC_FILTERS, key, FilterValue::option(TRUE));
        }
    }
    for influence in &item.influences {
        doc.set_filter(MISC_FILTERS, &influence.filter_key(), FilterValue::option(TRUE));
    }

    if item.kind.is_wearable() && item.rarity != Rarity::Unique && item.item_level > 0 {
        doc.set_filter(MISC_FILTERS, "ilvl", FilterValue::min(item.item_level as i64));
    }

    if let Some(gem) = item.gem_data() {
        doc.set_filter(MISC_FILTERS, "gem_level", FilterValue::min(gem.level as i64));
        if item.quality > 0 {
            doc.set_filter(MISC_FILTERS, "quality", FilterValue::min(item.quality as i64));
        }
    }

    if item.unidentified
        || (item.rarity.can_be_unidentified() && item.count_kind(ModifierKind::Explicit) == 0)
    {
        doc.set_filter(MISC_FILTERS, "identified", FilterValue::option("false"));
    }

    let modifiers: Vec<&ModifierInstance> = match item.map_data() {
        Some(map) => {
            let tier = map.tier as i64;
            if tier > 0 {
                doc.set_filter(MAP_FILTERS, "map_tier", FilterValue::range(tier, tier));
            }
            let minimums = [
                ("map_iiq", map.iiq),
                ("map_iir", map.iir),
                ("map_packsize", map.pack_size),
            ];
            for (key, value) in minimums {
                if value > 0 {
                    doc.set_filter(MAP_FILTERS, key, FilterValue::min(value as i64));
                }
            }
            if map.blighted {
                doc.set_filter(MAP_FILTERS, "map_blighted", FilterValue::option(TRUE));
            }
            item.modifiers
                .iter()
                .filter(|m| m.kind() == ModifierKind::Implicit)
                .collect()
        }
        None => item.modifiers.iter().collect(),
    };

    *doc.stat_filters_mut() = stat_filters(&modifiers);
    doc
}

/// Build the exchange document when the item trades in bulk, otherwise the
/// search document.
pub fn build_document(item: &Item, exchange_ids: Option<&ExchangeIds>, have: &str) -> QueryDocument {
    exchange_ids
        .and_then(|ids| build_exchange(item, ids, have))
        .map(QueryDocument::Exchange)
        .unwrap_or_else(|| QueryDocument::Search(build_query(item)))
}

/// Base type to search for, if the base identifies the item.
fn item_type(item: &Item) -> Option<String> {
    match (&item.kind, item.rarity) {
        (ItemKind::DivinationCard, _) => None,
        (_, Rarity::Rare) => None,
        // Unclassified magic names still carry their affixes.
        (_, Rarity::Magic) if item.base == item.name => None,
        _ => Some(item.base.clone()),
    }
}

/// One filter per distinct modifier id, in item order.
fn stat_filters(modifiers: &[&ModifierInstance]) -> Vec<StatFilter> {
    let mut seen = HashSet::new();
    modifiers
        .iter()
        .filter(|m| seen.insert(m.id().to_string()))
        .map(|m| StatFilter::new(m.id(), m.mean_value()))
        .collect()
}
