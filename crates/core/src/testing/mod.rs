//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service
//! traits plus a small modifier dictionary and base table, so the whole
//! lookup can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use pricecheck_core::testing::{fixtures, MockEstimator, MockSearcher};
//!
//! let searcher = MockSearcher::new();
//! let estimator = MockEstimator::new();
//!
//! // Configure mock responses
//! searcher.push_page(fixtures::search_page(&[Some(10.0)])).await;
//!
//! let checker = fixtures::price_checker(Arc::new(searcher));
//! ```

mod mock_estimator;
mod mock_searcher;

pub use mock_estimator::{MockEstimator, RecordedEstimate};
pub use mock_searcher::MockSearcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;

    use crate::base::{BaseCategoryTable, BaseEntry};
    use crate::modifier::{ModifierEntry, ModifierIndex};
    use crate::pricer::PriceChecker;
    use crate::query::{ExchangeEntry, ExchangeIds};
    use crate::trade::{Listing, Price, SearchPage, TradeSearcher};

    pub const LEAGUE: &str = "Standard";

    /// Rare gloves with a life roll and a crafted dual resistance.
    pub const RARE_GLOVES: &str = "Item Class: Gloves
Rarity: Rare
Doom Grip
Assassin's Mitts
--------
Quality: +20% (augmented)
Evasion Rating: 180 (augmented)
--------
Requirements:
Level: 58
Dex: 58
--------
Sockets: R-R-R-B
--------
Item Level: 80
--------
+94 to maximum Life
+19% to Fire and Cold Resistances (crafted)
--------
Shaper Item";

    pub fn gloves_text() -> &'static str {
        RARE_GLOVES
    }

    pub const UNIQUE_BELT: &str = "Item Class: Belts
Rarity: Unique
Headhunter
Leather Belt
--------
Requirements:
Level: 40
--------
Item Level: 86
--------
+40 to maximum Life (implicit)
--------
+55 to maximum Life
+30% to Cold Resistance";

    pub const CHAOS_ORB: &str = "Item Class: Stackable Currency
Rarity: Currency
Chaos Orb
--------
Stack Size: 7/10
--------
Reforges a rare item with new random modifiers";

    pub const UNKNOWN_BASE: &str = "Rarity: Rare
Strange Thing
Mysterious Relic
--------
Item Level: 70
--------
+10 to maximum Life";

    fn entry(id: &str, text: &str, kind: &str) -> ModifierEntry {
        ModifierEntry {
            id: id.to_string(),
            text: text.to_string(),
            kind: kind.to_string(),
        }
    }

    /// A slice of the stat dictionary covering the fixture items.
    pub fn modifier_entries() -> Vec<ModifierEntry> {
        vec![
            entry("pseudo.pseudo_total_life", "+# total maximum Life", "pseudo"),
            entry("explicit.stat_3299347043", "+# to maximum Life", "explicit"),
            entry("implicit.stat_3299347043", "+# to maximum Life", "implicit"),
            entry("crafted.stat_3299347043", "+# to maximum Life", "crafted"),
            entry("explicit.stat_4220027924", "+#% to Cold Resistance", "explicit"),
            entry("explicit.stat_3372524247", "+#% to Fire Resistance", "explicit"),
            entry("explicit.stat_2923486259", "+#% to Chaos Resistance", "explicit"),
            entry("explicit.stat_2915988346", "+#% to Fire and Cold Resistances", "explicit"),
            entry("crafted.stat_2915988346", "+#% to Fire and Cold Resistances", "crafted"),
            entry("explicit.stat_2250533757", "#% increased Movement Speed", "explicit"),
            entry("explicit.stat_681332047", "#% increased Attack Speed", "explicit"),
            entry("explicit.stat_210067635", "#% increased Attack Speed (Local)", "explicit"),
            entry("explicit.stat_2144192055", "+# to Evasion Rating", "explicit"),
            entry("explicit.stat_53045048", "+# to Evasion Rating (Local)", "explicit"),
            entry("implicit.stat_1792283443", "Area is influenced by #", "implicit"),
            entry("enchant.stat_2954116742", "Allocates #", "enchant"),
        ]
    }

    pub fn modifier_index() -> Arc<ModifierIndex> {
        Arc::new(ModifierIndex::new(modifier_entries()))
    }

    pub fn base_entries() -> Vec<BaseEntry> {
        vec![
            BaseEntry::new("Assassin's Mitts", "armour.gloves"),
            BaseEntry::new("Two-Toned Boots", "armour.boots"),
            BaseEntry::new("Vaal Regalia", "armour.chest"),
            BaseEntry::new("Hubris Circlet", "armour.helmet"),
            BaseEntry::new("Imperial Bow", "weapon.bow"),
            BaseEntry::new("Leather Belt", "accessory.belt"),
            BaseEntry::new("Onyx Amulet", "accessory.amulet"),
            BaseEntry::new("Iron Ring", "accessory.ring"),
            BaseEntry::new("Crimson Jewel", "jewel"),
        ]
    }

    pub fn base_table() -> Arc<BaseCategoryTable> {
        Arc::new(BaseCategoryTable::new(base_entries()))
    }

    pub fn exchange_ids() -> Arc<ExchangeIds> {
        Arc::new(ExchangeIds::new(vec![
            ExchangeEntry {
                id: "chaos".to_string(),
                text: "Chaos Orb".to_string(),
            },
            ExchangeEntry {
                id: "exalted".to_string(),
                text: "Exalted Orb".to_string(),
            },
        ]))
    }

    /// Price checker over the fixture dictionary and base table.
    pub fn price_checker(searcher: Arc<dyn TradeSearcher>) -> PriceChecker {
        PriceChecker::new(modifier_index(), base_table(), searcher, LEAGUE)
    }

    /// Create a listing, priced in chaos when `amount` is set.
    pub fn listing(id: &str, amount: Option<f64>) -> Listing {
        Listing {
            id: id.to_string(),
            account: Some("seller".to_string()),
            indexed: None,
            price: amount.map(|amount| Price {
                amount,
                currency: "chaos".to_string(),
            }),
        }
    }

    /// Create a search page holding one listing per price.
    pub fn search_page(prices: &[Option<f64>]) -> SearchPage {
        SearchPage {
            query_id: "mockquery".to_string(),
            total: prices.len() as u64,
            listings: prices
                .iter()
                .enumerate()
                .map(|(i, price)| listing(&format!("listing-{}", i), *price))
                .collect(),
        }
    }

    /// A page reporting hits but with nothing fetched.
    pub fn empty_page() -> SearchPage {
        SearchPage {
            query_id: "mockquery".to_string(),
            total: 0,
            listings: Vec::new(),
        }
    }
}
