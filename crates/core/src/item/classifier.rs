//! Generic item → slot-specific item, plus per-slot modifier fix-ups.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::{debug, error};

use super::error::ClassificationError;
use super::types::{Item, ItemKind, Rarity};
use crate::base::BaseCategoryTable;
use crate::modifier::{canonical_text, ModifierKind, ModifierResolver, LOCAL_SUFFIX};

/// Display names the base table may use instead of trade categories.
const CATEGORY_ALIASES: &[(&str, &str)] = &[
    ("bow", "weapon.bow"),
    ("claw", "weapon.claw"),
    ("dagger", "weapon.dagger"),
    ("rune dagger", "weapon.runedagger"),
    ("one hand axe", "weapon.oneaxe"),
    ("one hand mace", "weapon.onemace"),
    ("one hand sword", "weapon.onesword"),
    ("thrusting one hand sword", "weapon.onesword"),
    ("sceptre", "weapon.sceptre"),
    ("staff", "weapon.staff"),
    ("warstaff", "weapon.warstaff"),
    ("two hand axe", "weapon.twoaxe"),
    ("two hand mace", "weapon.twomace"),
    ("two hand sword", "weapon.twosword"),
    ("wand", "weapon.wand"),
    ("fishing rod", "weapon.rod"),
    ("helmet", "armour.helmet"),
    ("body armour", "armour.chest"),
    ("boots", "armour.boots"),
    ("gloves", "armour.gloves"),
    ("shield", "armour.shield"),
    ("quiver", "armour.quiver"),
    ("ring", "accessory.ring"),
    ("amulet", "accessory.amulet"),
    ("belt", "accessory.belt"),
    ("jewel", "jewel"),
    ("abyss jewel", "jewel.abyss"),
    ("cluster jewel", "jewel.cluster"),
];

static WEAPON_LOCAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:#% increased Attack Speed|Adds # to # \w+ Damage|# to Accuracy Rating|#% chance to Poison on Hit)$",
    )
    .expect("weapon local pattern is valid")
});

static ARMOUR_LOCAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:# to (?:Armour|Evasion Rating|maximum Energy Shield)|#% increased (?:Armour|Evasion Rating|Energy Shield|Armour and Evasion|Armour and Energy Shield|Evasion and Energy Shield|Armour, Evasion and Energy Shield))$",
    )
    .expect("armour local pattern is valid")
});

static SYNTHESISED_RING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#% chance to |^Adds # to # \w+ Damage to Attacks$")
        .expect("synthesised ring pattern is valid")
});

/// Normalise a base table category to a trade category.
pub fn trade_category(category: &str) -> String {
    let lower = category.trim().to_ascii_lowercase();
    CATEGORY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, trade)| trade.to_string())
        .unwrap_or(lower)
}

/// Item kind for a trade category, `None` for categories the classifier
/// does not handle.
pub fn kind_for_category(trade_category: &str) -> Option<ItemKind> {
    let kind = match trade_category {
        "armour.helmet" => ItemKind::Helmet,
        "armour.chest" => ItemKind::BodyArmour,
        "armour.boots" => ItemKind::Boots,
        "armour.gloves" => ItemKind::Gloves,
        "armour.shield" => ItemKind::Shield,
        "armour.quiver" => ItemKind::Quiver,
        "accessory.ring" => ItemKind::Ring,
        "accessory.amulet" => ItemKind::Amulet,
        "accessory.belt" => ItemKind::Belt,
        c if c == "weapon" || c.starts_with("weapon.") => ItemKind::Weapon,
        c if c == "jewel" || c.starts_with("jewel.") => ItemKind::Jewel,
        _ => return None,
    };
    Some(kind)
}

/// Maps parsed items onto concrete kinds using the base table.
#[derive(Debug, Clone)]
pub struct ItemClassifier {
    bases: Arc<BaseCategoryTable>,
    resolver: ModifierResolver,
}

impl ItemClassifier {
    pub fn new(bases: Arc<BaseCategoryTable>, resolver: ModifierResolver) -> Self {
        Self { bases, resolver }
    }

    /// Classify an item, logging and returning `None` when the base is
    /// unknown. Callers must treat `None` as unpriceable.
    pub fn classify(&self, item: Item) -> Option<Item> {
        match self.try_classify(item) {
            Ok(item) => Some(item),
            Err(e) => {
                error!(error = %e, "Unable to classify item");
                None
            }
        }
    }

    /// Like [`classify`](Self::classify) but returns the reason on failure.
    pub fn try_classify(&self, mut item: Item) -> Result<Item, ClassificationError> {
        if !item.kind.is_generic() {
            if matches!(item.kind, ItemKind::Map(_)) && item.rarity == Rarity::Magic {
                if let Some(base) = self.bases.magic_base(&item.name) {
                    item.base = base.to_string();
                }
            }
            return Ok(item);
        }

        let entry = self
            .bases
            .lookup(&item.base)
            .ok_or_else(|| ClassificationError::UnknownBase {
                base: item.base.clone(),
            })?;

        let category = trade_category(&entry.category);
        let kind =
            kind_for_category(&category).ok_or_else(|| ClassificationError::UnsupportedCategory {
                base: entry.base.clone(),
                category: entry.category.clone(),
            })?;

        debug!(base = %entry.base, category = %category, kind = kind.name(), "Classified item");

        item.base = entry.base.clone();
        item.category = Some(category);
        item.kind = kind;
        self.sanitize(&mut item);
        Ok(item)
    }

    /// Rewrite modifiers whose meaning depends on the item slot.
    ///
    /// Safe to call repeatedly; converted modifiers no longer match.
    pub fn sanitize(&self, item: &mut Item) {
        match item.kind {
            ItemKind::Weapon => self.localise(item, &WEAPON_LOCAL),
            _ if item.kind.is_armour() => self.localise(item, &ARMOUR_LOCAL),
            ItemKind::Ring if item.synthesised => {
                for instance in item.modifiers.iter_mut() {
                    if instance.kind() != ModifierKind::Enchant {
                        continue;
                    }
                    let text = canonical_text(&instance.modifier.text);
                    if !SYNTHESISED_RING.is_match(&text) {
                        continue;
                    }
                    if let Some(explicit) = self.resolver.lookup(ModifierKind::Explicit, &text) {
                        debug!(from = %instance.id(), to = %explicit.id, "Synthesised enchant is explicit");
                        instance.modifier = explicit;
                    }
                }
            }
            _ => {}
        }
    }

    fn localise(&self, item: &mut Item, pattern: &Regex) {
        for instance in item.modifiers.iter_mut() {
            let text = canonical_text(&instance.modifier.text);
            if !pattern.is_match(&text) {
                continue;
            }
            let local = format!("{}{}", text, LOCAL_SUFFIX);
            if let Some(modifier) = self.resolver.lookup(instance.kind(), &local) {
                debug!(from = %instance.id(), to = %modifier.id, "Converted to local modifier");
                instance.modifier = modifier;
            }
        }
    }
}
