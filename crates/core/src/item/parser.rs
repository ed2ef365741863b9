//! Clipboard item text → [`Item`].
//!
//! An item card is a list of sections separated by a fixed run of dashes.
//! The first section is the header (rarity, name, base); the rest mix
//! properties, requirements and modifier lines in an order that varies with
//! the item type, so everything past the header is scanned line by line.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::{debug, warn};

use super::error::ParseError;
use super::types::{GemData, Influence, Item, ItemKind, MapData, Rarity, Sockets};
use crate::metrics;
use crate::modifier::{
    strip_annotation, Modifier, ModifierIndex, ModifierInstance, ModifierKind, ModifierResolver,
    ResolveContext,
};

/// Literal section separator of the item card format.
pub const SECTION_DELIMITER: &str = "--------";

const PROPHECY_MARKER: &str = "Right-click to add this prophecy to your character.";
const ORGAN_MARKER: &str = "Combine this with four other different samples in Tane's Laboratory.";
const FLASK_MARKER: &str =
    "Right click to drink. Can only hold charges while in belt. Refills as you kill monsters.";
const MAP_MARKER: &str =
    "Travel to this Map by using it in a personal Map Device. Maps can only be used once.";
const FRAGMENT_MARKERS: [&str; 2] = [
    "Can be used in a personal Map Device.",
    "Can be used in the Eternal Laboratory or a personal Map Device.",
];

/// Property lines that never carry a modifier.
const PROPERTY_PREFIXES: &[&str] = &[
    "Requirements:",
    "Requires ",
    "Level:",
    "Str:",
    "Dex:",
    "Int:",
    "Quality",
    "Stack Size:",
    "Armour:",
    "Evasion Rating:",
    "Energy Shield:",
    "Ward:",
    "Chance to Block:",
    "Physical Damage:",
    "Elemental Damage:",
    "Chaos Damage:",
    "Critical Strike Chance:",
    "Attacks per Second:",
    "Weapon Range:",
    "Map Tier:",
    "Item Quantity:",
    "Item Rarity:",
    "Monster Pack Size:",
    "Atlas Region:",
    "Limited to:",
    "Radius:",
    "Experience:",
    "Lasts ",
    "Consumes ",
    "Currently has ",
    "Note:",
];

static SET_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<<set:[^>]*>>").expect("set marker pattern is valid"));

/// Parses item cards, resolving modifier lines as it goes.
#[derive(Debug, Clone)]
pub struct ItemParser {
    resolver: ModifierResolver,
}

impl ItemParser {
    pub fn new(index: Arc<ModifierIndex>) -> Self {
        Self {
            resolver: ModifierResolver::new(index),
        }
    }

    pub fn with_resolver(resolver: ModifierResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ModifierResolver {
        &self.resolver
    }

    /// Parse one clipboard dump into a generic (or special-cased) item.
    pub fn parse(&self, text: &str) -> Result<Item, ParseError> {
        let mut sections = split_sections(text);
        if sections.len() < 3 {
            return Err(ParseError::TooFewSections {
                found: sections.len(),
            });
        }

        let has_note = sections
            .last()
            .and_then(|s| s.first())
            .is_some_and(|line| line.starts_with("Note:"));
        if has_note {
            sections.pop();
        }

        let mut item = parse_header(&sections[0])?;
        item.quality = sections[1]
            .iter()
            .find_map(|line| parse_quality(line))
            .unwrap_or(0);

        match item.rarity {
            Rarity::Currency => return Ok(finish(item, ItemKind::Currency)),
            Rarity::DivinationCard => return Ok(finish(item, ItemKind::DivinationCard)),
            Rarity::Gem => {
                let level = sections[1]
                    .iter()
                    .find_map(|line| line.strip_prefix("Level:"))
                    .and_then(|v| parse_number(v.trim().trim_end_matches("(Max)")))
                    .unwrap_or(0);
                item.corrupted = sections
                    .last()
                    .is_some_and(|s| s.iter().any(|line| line == "Corrupted"));
                return Ok(finish(item, ItemKind::Gem(GemData { level })));
            }
            _ => {}
        }

        if let Some((index, kind)) = find_special_section(&sections) {
            sections.remove(index);
            item.category = kind.fixed_category().map(str::to_string);
            item.kind = kind;
        }

        let is_organ = matches!(item.kind, ItemKind::Organ);
        let mut organ_counts: Vec<(Arc<Modifier>, u32)> = Vec::new();

        for (index, section) in sections.iter().enumerate().skip(1) {
            for line in section {
                if apply_property(&mut item, line) || index < 2 {
                    continue;
                }
                self.resolve_line(&mut item, line, is_organ, &mut organ_counts);
            }
        }

        if is_organ {
            item.modifiers = organ_counts
                .into_iter()
                .map(|(modifier, count)| ModifierInstance::new(modifier, count.to_string()))
                .collect();
        }

        if let ItemKind::Map(data) = &mut item.kind {
            if let Some(base) = item.base.strip_prefix("Blighted ") {
                item.base = base.to_string();
                data.blighted = true;
            }
            // Magic map names carry affixes around the base
            if item.name.contains("Blighted ") {
                data.blighted = true;
            }
        }

        metrics::ITEMS_PARSED
            .with_label_values(&[item.rarity.as_str()])
            .inc();
        debug!(
            rarity = %item.rarity,
            name = %item.name,
            base = %item.base,
            modifiers = item.modifiers.len(),
            "Parsed item"
        );

        Ok(item)
    }

    fn resolve_line(
        &self,
        item: &mut Item,
        line: &str,
        is_organ: bool,
        organ_counts: &mut Vec<(Arc<Modifier>, u32)>,
    ) {
        if let Some(instance) = self.resolve_allocates(line) {
            item.modifiers.push(instance);
            return;
        }

        let context = ResolveContext { is_organ };
        let resolution = self.resolver.resolve(line, context);
        if !resolution.is_resolved() {
            warn!(line = %line, "Unresolved modifier");
            metrics::UNRESOLVED_MODIFIERS.inc();
            return;
        }

        if !is_organ {
            item.modifiers.extend(resolution.instances());
            return;
        }

        for instance in resolution.instances() {
            match organ_counts
                .iter_mut()
                .find(|(m, _)| m.id == instance.modifier.id)
            {
                Some((_, count)) => *count += 1,
                None => organ_counts.push((instance.modifier, 1)),
            }
        }
    }

    /// `Allocates <Passive>` enchant; the value is the passive name.
    fn resolve_allocates(&self, line: &str) -> Option<ModifierInstance> {
        let line = strip_annotation(line, "(enchant)").unwrap_or(line);
        let passive = line.strip_prefix("Allocates ")?;
        let modifier = self
            .resolver
            .lookup(ModifierKind::Enchant, line)
            .or_else(|| self.resolver.lookup(ModifierKind::Enchant, "Allocates #"))?;
        Some(ModifierInstance::new(modifier, passive.trim()))
    }
}

/// Split on the delimiter into trimmed, non-empty sections of trimmed lines.
pub fn split_sections(text: &str) -> Vec<Vec<String>> {
    text.replace("\r\n", "\n")
        .split(SECTION_DELIMITER)
        .map(|section| {
            section
                .trim()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|lines| !lines.is_empty())
        .collect()
}

fn parse_header(header: &[String]) -> Result<Item, ParseError> {
    let mut lines = header.iter().map(String::as_str).peekable();

    let item_class = lines
        .next_if(|line| line.starts_with("Item Class:"))
        .and_then(|line| line.strip_prefix("Item Class:"))
        .map(|class| class.trim().to_string());

    let label = lines
        .next()
        .and_then(|line| line.strip_prefix("Rarity:"))
        .ok_or(ParseError::MissingRarity)?
        .trim();
    let rarity =
        Rarity::from_label(label).ok_or_else(|| ParseError::UnrecognizedRarity(label.to_string()))?;

    let name = lines
        .next()
        .map(strip_set_markers)
        .filter(|name| !name.is_empty())
        .ok_or(ParseError::MissingName)?;

    let mut item = Item::new(rarity, name);
    item.item_class = item_class;
    if let Some(base) = lines.next() {
        item.base = base.trim().to_string();
    }
    if rarity == Rarity::Normal {
        if let Some(base) = item.base.strip_prefix("Superior ") {
            item.base = base.to_string();
        }
    }

    Ok(item)
}

fn finish(mut item: Item, kind: ItemKind) -> Item {
    item.category = kind.fixed_category().map(str::to_string);
    item.kind = kind;
    metrics::ITEMS_PARSED
        .with_label_values(&[item.rarity.as_str()])
        .inc();
    item
}

/// Scan from the last section backwards for a known marker line.
fn find_special_section(sections: &[Vec<String>]) -> Option<(usize, ItemKind)> {
    sections
        .iter()
        .enumerate()
        .skip(1)
        .rev()
        .find_map(|(index, section)| {
            let first = section.first()?.as_str();
            let kind = match first {
                PROPHECY_MARKER => ItemKind::Prophecy,
                ORGAN_MARKER => ItemKind::Organ,
                FLASK_MARKER => ItemKind::Flask,
                MAP_MARKER => ItemKind::Map(MapData::default()),
                other if FRAGMENT_MARKERS.contains(&other) => ItemKind::Fragment,
                _ => return None,
            };
            Some((index, kind))
        })
}

/// Apply a non-modifier line to the item. Returns `true` if the line was
/// consumed.
fn apply_property(item: &mut Item, line: &str) -> bool {
    if let Some(raw) = line.strip_prefix("Sockets:") {
        item.sockets = Sockets::parse(raw);
        return true;
    }
    if let Some(level) = line.strip_prefix("Item Level:") {
        item.item_level = parse_number(level).unwrap_or(0);
        return true;
    }

    match line {
        "Corrupted" => item.corrupted = true,
        "Mirrored" => item.mirrored = true,
        "Synthesised Item" => item.synthesised = true,
        "Unidentified" => item.unidentified = true,
        "Veiled Prefix" | "Veiled Suffix" => item.veiled = true,
        _ => {
            if let Some(influence) = Influence::from_item_line(line) {
                if !item.influences.contains(&influence) {
                    item.influences.push(influence);
                }
                return true;
            }
            if let ItemKind::Map(data) = &mut item.kind {
                if apply_map_property(data, line) {
                    return true;
                }
            }
            return PROPERTY_PREFIXES.iter().any(|p| line.starts_with(p));
        }
    }
    true
}

fn apply_map_property(data: &mut MapData, line: &str) -> bool {
    let fields: [(&str, &mut u32); 4] = [
        ("Map Tier:", &mut data.tier),
        ("Item Quantity:", &mut data.iiq),
        ("Item Rarity:", &mut data.iir),
        ("Monster Pack Size:", &mut data.pack_size),
    ];
    for (prefix, field) in fields {
        if let Some(value) = line.strip_prefix(prefix) {
            *field = parse_number(value).unwrap_or(0);
            return true;
        }
    }
    false
}

/// `Quality: +20% (augmented)` → 20.
fn parse_quality(line: &str) -> Option<u32> {
    if !line.starts_with("Quality") {
        return None;
    }
    let (_, value) = line.split_once(':')?;
    parse_number(value)
}

/// Parse a property value such as `+52% (augmented)` or `14`.
fn parse_number(value: &str) -> Option<u32> {
    let value = value.trim();
    let value = value.strip_suffix("(augmented)").unwrap_or(value).trim();
    let value = value.strip_suffix("(unmet)").unwrap_or(value).trim();
    value
        .trim_start_matches('+')
        .trim_end_matches('%')
        .trim()
        .parse()
        .ok()
}

fn strip_set_markers(name: &str) -> String {
    SET_MARKER.replace_all(name, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::ModifierEntry;

    fn entry(id: &str, text: &str, kind: &str) -> ModifierEntry {
        ModifierEntry {
            id: id.to_string(),
            text: text.to_string(),
            kind: kind.to_string(),
        }
    }

    fn parser() -> ItemParser {
        let index = ModifierIndex::new(vec![
            entry("explicit.stat_3299347043", "+# to maximum Life", "explicit"),
            entry("crafted.stat_2915988346", "+#% to Fire and Cold Resistances", "crafted"),
            entry("implicit.stat_1050105434", "+# to maximum Mana", "implicit"),
            entry("enchant.stat_2954116742", "Allocates #", "enchant"),
            entry("explicit.stat_1001", "Drops additional Currency Items", "explicit"),
            entry(
                "monster.stat_3397729665",
                "Drops additional Currency Items (×#)",
                "monster",
            ),
            entry("implicit.stat_1792283443", "Area is influenced by #", "implicit"),
        ]);
        ItemParser::new(Arc::new(index))
    }

    const GLOVES: &str = "Item Class: Gloves
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
Shaper Item
Corrupted
--------
Note: ~price 1 chaos";

    #[test]
    fn test_parse_rare_gloves() {
        let item = parser().parse(GLOVES).unwrap();
        assert_eq!(item.rarity, Rarity::Rare);
        assert_eq!(item.item_class.as_deref(), Some("Gloves"));
        assert_eq!(item.name, "Doom Grip");
        assert_eq!(item.base, "Assassin's Mitts");
        assert_eq!(item.quality, 20);
        assert_eq!(item.item_level, 80);
        assert_eq!(item.sockets.raw, "R-R-R-B");
        assert_eq!(item.links(), 4);
        assert!(item.corrupted);
        assert_eq!(item.influences, vec![Influence::Shaper]);
        assert!(item.kind.is_generic());

        assert_eq!(item.modifiers.len(), 2);
        assert_eq!(item.modifiers[0].kind(), ModifierKind::Explicit);
        assert_eq!(item.modifiers[0].value, "94");
        assert_eq!(item.modifiers[1].kind(), ModifierKind::Crafted);
        assert_eq!(item.modifiers[1].value, "19");
    }

    #[test]
    fn test_too_few_sections() {
        let err = parser().parse("Rarity: Rare\nFoo\n--------\nBar").unwrap_err();
        assert_eq!(err, ParseError::TooFewSections { found: 2 });
        assert!(matches!(
            parser().parse("just some chat text").unwrap_err(),
            ParseError::TooFewSections { .. }
        ));
    }

    #[test]
    fn test_unrecognized_rarity() {
        let err = parser()
            .parse("Rarity: Legendary\nFoo\n--------\nBar\n--------\nBaz")
            .unwrap_err();
        assert_eq!(err, ParseError::UnrecognizedRarity("Legendary".to_string()));
    }

    #[test]
    fn test_missing_rarity() {
        let err = parser()
            .parse("Something\nFoo\n--------\nBar\n--------\nBaz")
            .unwrap_err();
        assert_eq!(err, ParseError::MissingRarity);
    }

    #[test]
    fn test_currency_short_circuit() {
        let text = "Rarity: Currency
Chaos Orb
--------
Stack Size: 3/10
--------
Reforges a rare item with new random modifiers
--------
Right click this item then left click a rare item to apply it.";
        let item = parser().parse(text).unwrap();
        assert_eq!(item.kind, ItemKind::Currency);
        assert_eq!(item.category.as_deref(), Some("currency"));
        assert!(item.modifiers.is_empty());
    }

    #[test]
    fn test_gem_level_and_corruption() {
        let text = "Rarity: Gem
Cleave
--------
Attack, AoE, Melee
Level: 20 (Max)
Quality: +23% (augmented)
--------
Requirements:
Level: 70
--------
Corrupted";
        let item = parser().parse(text).unwrap();
        assert_eq!(item.gem_data(), Some(&GemData { level: 20 }));
        assert_eq!(item.quality, 23);
        assert!(item.corrupted);
        assert_eq!(item.category.as_deref(), Some("gem"));
    }

    #[test]
    fn test_map_properties_and_blight() {
        let text = "Rarity: Rare
Nightmare Trap
Blighted Atoll Map
--------
Map Tier: 14
Item Quantity: +52% (augmented)
Item Rarity: +30% (augmented)
Monster Pack Size: +20% (augmented)
--------
Item Level: 83
--------
Area is influenced by The Shaper (implicit)
--------
Travel to this Map by using it in a personal Map Device. Maps can only be used once.";
        let item = parser().parse(text).unwrap();
        let data = item.map_data().unwrap();
        assert_eq!(data.tier, 14);
        assert_eq!(data.iiq, 52);
        assert_eq!(data.iir, 30);
        assert_eq!(data.pack_size, 20);
        assert!(data.blighted);
        assert_eq!(item.base, "Atoll Map");
        assert_eq!(item.modifiers.len(), 1);
        assert_eq!(item.modifiers[0].value, "The Shaper");
    }

    #[test]
    fn test_organ_counts_duplicates() {
        let text = "Rarity: Unique
Vivid Heart
Metamorph Heart
--------
Item Level: 75
--------
Drops additional Currency Items
Drops additional Currency Items
--------
Combine this with four other different samples in Tane's Laboratory.";
        let item = parser().parse(text).unwrap();
        assert_eq!(item.kind, ItemKind::Organ);
        assert_eq!(item.modifiers.len(), 2);
        for instance in &item.modifiers {
            assert_eq!(instance.value, "2");
        }
        assert_eq!(item.modifiers[1].kind(), ModifierKind::Monster);
    }

    #[test]
    fn test_allocates_enchant() {
        let text = "Rarity: Rare
Bramble Coil
Leather Belt
--------
Item Level: 84
--------
Allocates Heartstopper (enchant)
--------
+60 to maximum Life";
        let item = parser().parse(text).unwrap();
        let enchant = &item.modifiers[0];
        assert_eq!(enchant.kind(), ModifierKind::Enchant);
        assert_eq!(enchant.value, "Heartstopper");
    }

    #[test]
    fn test_set_markers_stripped() {
        let text = "Rarity: Unique
<<set:MS>><<set:M>><<set:S>>Tabula Rasa
Simple Robe
--------
Sockets: W-W-W-W-W-W
--------
Item Level: 70";
        let item = parser().parse(text).unwrap();
        assert_eq!(item.name, "Tabula Rasa");
        assert_eq!(item.sockets.white, 6);
        assert_eq!(item.links(), 6);
    }

    #[test]
    fn test_flags_and_unresolved_lines_are_tolerated() {
        let text = "Rarity: Rare
Gale Hold
Iron Ring
--------
Item Level: 60
--------
+10 to maximum Mana (implicit)
--------
Some line nobody knows
Veiled Suffix
Synthesised Item
Mirrored";
        let item = parser().parse(text).unwrap();
        assert!(item.veiled && item.synthesised && item.mirrored);
        assert_eq!(item.modifiers.len(), 1);
        assert_eq!(item.modifiers[0].kind(), ModifierKind::Implicit);
    }

    #[test]
    fn test_normal_superior_prefix_removed() {
        let text = "Rarity: Normal
Superior Assassin's Mitts
--------
Quality: +8% (augmented)
--------
Item Level: 70";
        let item = parser().parse(text).unwrap();
        assert_eq!(item.base, "Assassin's Mitts");
        assert_eq!(item.quality, 8);
    }

    /// Parser whose dictionary also knows the marker lines, so a marker that
    /// reached the resolver would show up as a modifier.
    fn marker_parser() -> ItemParser {
        let mut entries = vec![entry(
            "explicit.stat_3885634897",
            "Immunity to Bleeding during Flask effect",
            "explicit",
        )];
        for (i, marker) in [PROPHECY_MARKER, FLASK_MARKER]
            .into_iter()
            .chain(FRAGMENT_MARKERS)
            .enumerate()
        {
            entries.push(entry(&format!("explicit.marker_{i}"), marker, "explicit"));
        }
        ItemParser::new(Arc::new(ModifierIndex::new(entries)))
    }

    fn assert_no_marker_modifiers(item: &Item) {
        assert!(item
            .modifiers
            .iter()
            .all(|m| !m.modifier.id.starts_with("explicit.marker_")));
    }

    #[test]
    fn test_prophecy_marker() {
        let text = "Rarity: Normal
The Queen's Sacrifice
--------
You will enter the Eternal Laboratory and perish.
--------
Seal Cost: 10x Silver Coin
--------
Right-click to add this prophecy to your character.";
        let item = marker_parser().parse(text).unwrap();
        assert_eq!(item.kind, ItemKind::Prophecy);
        assert_eq!(item.category.as_deref(), Some("prophecy"));
        assert!(item.modifiers.is_empty());
        assert_no_marker_modifiers(&item);
    }

    #[test]
    fn test_flask_marker() {
        let text = "Rarity: Magic
Seething Divine Life Flask of Staunching
--------
Recovers 2400 Life over 6.50 Seconds
Consumes 15 of 45 Charges on use
--------
Requirements:
Level: 60
--------
Item Level: 75
--------
Immunity to Bleeding during Flask effect
--------
Right click to drink. Can only hold charges while in belt. Refills as you kill monsters.";
        let item = marker_parser().parse(text).unwrap();
        assert_eq!(item.kind, ItemKind::Flask);
        assert_eq!(item.category.as_deref(), Some("flask"));
        assert_eq!(item.modifiers.len(), 1);
        assert_eq!(item.modifiers[0].modifier.id, "explicit.stat_3885634897");
        assert_no_marker_modifiers(&item);
    }

    #[test]
    fn test_fragment_markers() {
        let texts = [
            "Rarity: Normal
Sacrifice at Dusk
--------
Item Level: 70
--------
The sun sets on the sacrifice.
--------
Can be used in a personal Map Device.",
            "Rarity: Normal
Offering to the Goddess
--------
Item Level: 75
--------
Labyrinth trial offering
--------
Can be used in the Eternal Laboratory or a personal Map Device.",
        ];
        for text in texts {
            let item = marker_parser().parse(text).unwrap();
            assert_eq!(item.kind, ItemKind::Fragment, "{}", item.name);
            assert_eq!(item.category.as_deref(), Some("map.fragment"));
            assert_no_marker_modifiers(&item);
        }
    }

    #[test]
    fn test_unidentified_flag_reaches_query() {
        let text = "Rarity: Rare
Assassin's Mitts
--------
Evasion Rating: 180
--------
Item Level: 80
--------
Unidentified";
        let item = parser().parse(text).unwrap();
        assert!(item.unidentified);

        let doc = serde_json::to_value(crate::query::build_query(&item)).unwrap();
        assert_eq!(
            doc["query"]["filters"]["misc_filters"]["filters"]["identified"],
            serde_json::json!({"option": "false"})
        );
    }

    #[test]
    fn test_magic_blighted_map() {
        let text = "Item Class: Maps
Rarity: Magic
Fecund Blighted Atoll Map of Bameth
--------
Map Tier: 10
Item Quantity: +15% (augmented)
--------
Item Level: 79
--------
Travel to this Map by using it in a personal Map Device. Maps can only be used once.";
        let item = parser().parse(text).unwrap();
        assert!(item.map_data().unwrap().blighted);
        assert_eq!(item.map_data().unwrap().tier, 10);
        assert!(!item.base.starts_with("Blighted "));
    }
}
