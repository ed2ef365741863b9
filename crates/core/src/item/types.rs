//! Typed item model produced by the parser and refined by the classifier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::modifier::{ModifierInstance, ModifierKind};

/// Item rarity as printed on the first line of the item card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Normal,
    Magic,
    Rare,
    Unique,
    Gem,
    Currency,
    DivinationCard,
}

impl Rarity {
    /// Parse the lower-cased text after `Rarity: `.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Rarity::Normal),
            "magic" => Some(Rarity::Magic),
            "rare" => Some(Rarity::Rare),
            "unique" => Some(Rarity::Unique),
            "gem" | "skill gem" | "support gem" => Some(Rarity::Gem),
            "currency" => Some(Rarity::Currency),
            "divination card" => Some(Rarity::DivinationCard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Normal => "normal",
            Rarity::Magic => "magic",
            Rarity::Rare => "rare",
            Rarity::Unique => "unique",
            Rarity::Gem => "gem",
            Rarity::Currency => "currency",
            Rarity::DivinationCard => "divination card",
        }
    }

    /// Rarities the trade search accepts in its rarity filter.
    pub fn is_searchable(&self) -> bool {
        matches!(
            self,
            Rarity::Normal | Rarity::Magic | Rarity::Rare | Rarity::Unique
        )
    }

    /// Rarities that can be found unidentified.
    pub fn can_be_unidentified(&self) -> bool {
        matches!(self, Rarity::Magic | Rarity::Rare | Rarity::Unique)
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endgame influence tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Influence {
    Shaper,
    Elder,
    Crusader,
    Redeemer,
    Hunter,
    Warlord,
}

impl Influence {
    pub const ALL: [Influence; 6] = [
        Influence::Shaper,
        Influence::Elder,
        Influence::Crusader,
        Influence::Redeemer,
        Influence::Hunter,
        Influence::Warlord,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Influence::Shaper => "Shaper",
            Influence::Elder => "Elder",
            Influence::Crusader => "Crusader",
            Influence::Redeemer => "Redeemer",
            Influence::Hunter => "Hunter",
            Influence::Warlord => "Warlord",
        }
    }

    /// Recognise an `<Influence> Item` line.
    pub fn from_item_line(line: &str) -> Option<Self> {
        let word = line.trim().strip_suffix(" Item")?;
        Self::ALL.into_iter().find(|i| i.name() == word)
    }

    /// Key of the matching misc filter, e.g. `shaper_item`.
    pub fn filter_key(&self) -> String {
        format!("{}_item", self.name().to_ascii_lowercase())
    }
}

/// Socket layout. `raw` is kept verbatim, e.g. `R-R-B G`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sockets {
    pub raw: String,
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub white: u32,
    pub abyss: u32,
    pub links: u32,
}

impl Sockets {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let mut sockets = Sockets {
            raw: raw.to_string(),
            ..Default::default()
        };

        for c in raw.chars() {
            match c {
                'R' => sockets.red += 1,
                'G' => sockets.green += 1,
                'B' => sockets.blue += 1,
                'W' => sockets.white += 1,
                'A' => sockets.abyss += 1,
                _ => {}
            }
        }

        sockets.links = link_count(raw);
        sockets
    }

    pub fn count(&self) -> u32 {
        self.red + self.green + self.blue + self.white + self.abyss
    }
}

/// `dashes - spaces + 1`, floored at 1 when any socket exists and 0 for an
/// empty string.
pub fn link_count(raw: &str) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    let dashes = raw.matches('-').count() as i64;
    let spaces = raw.matches(' ').count() as i64;
    (dashes - spaces + 1).max(1) as u32
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub tier: u32,
    pub iiq: u32,
    pub iir: u32,
    pub pack_size: u32,
    pub blighted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GemData {
    pub level: u32,
}

/// Concrete item shape.
///
/// `Generic` is what the parser produces for gear; the classifier replaces
/// it with the slot-specific variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    Generic,
    Weapon,
    Helmet,
    BodyArmour,
    Boots,
    Gloves,
    Shield,
    Quiver,
    Ring,
    Amulet,
    Belt,
    Jewel,
    Map(MapData),
    Gem(GemData),
    Prophecy,
    Organ,
    Flask,
    Fragment,
    Currency,
    DivinationCard,
}

impl ItemKind {
    pub fn is_generic(&self) -> bool {
        matches!(self, ItemKind::Generic)
    }

    pub fn is_armour(&self) -> bool {
        matches!(
            self,
            ItemKind::Helmet
                | ItemKind::BodyArmour
                | ItemKind::Boots
                | ItemKind::Gloves
                | ItemKind::Shield
        )
    }

    /// Equipment that rolls item level dependent affixes.
    pub fn is_wearable(&self) -> bool {
        self.is_armour()
            || matches!(
                self,
                ItemKind::Weapon
                    | ItemKind::Quiver
                    | ItemKind::Ring
                    | ItemKind::Amulet
                    | ItemKind::Belt
                    | ItemKind::Jewel
            )
    }

    /// Trade category for kinds the parser recognises without the base table.
    pub fn fixed_category(&self) -> Option<&'static str> {
        match self {
            ItemKind::Map(_) => Some("map"),
            ItemKind::Gem(_) => Some("gem"),
            ItemKind::Prophecy => Some("prophecy"),
            ItemKind::Organ => Some("monster.sample"),
            ItemKind::Flask => Some("flask"),
            ItemKind::Fragment => Some("map.fragment"),
            ItemKind::Currency => Some("currency"),
            ItemKind::DivinationCard => Some("card"),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Generic => "generic",
            ItemKind::Weapon => "weapon",
            ItemKind::Helmet => "helmet",
            ItemKind::BodyArmour => "body_armour",
            ItemKind::Boots => "boots",
            ItemKind::Gloves => "gloves",
            ItemKind::Shield => "shield",
            ItemKind::Quiver => "quiver",
            ItemKind::Ring => "ring",
            ItemKind::Amulet => "amulet",
            ItemKind::Belt => "belt",
            ItemKind::Jewel => "jewel",
            ItemKind::Map(_) => "map",
            ItemKind::Gem(_) => "gem",
            ItemKind::Prophecy => "prophecy",
            ItemKind::Organ => "organ",
            ItemKind::Flask => "flask",
            ItemKind::Fragment => "fragment",
            ItemKind::Currency => "currency",
            ItemKind::DivinationCard => "divination_card",
        }
    }
}

/// A parsed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub rarity: Rarity,
    pub name: String,
    pub base: String,
    pub item_class: Option<String>,
    /// Trade category, e.g. `armour.gloves`. Filled by classification.
    pub category: Option<String>,
    pub kind: ItemKind,
    pub quality: u32,
    pub item_level: u32,
    pub sockets: Sockets,
    pub modifiers: Vec<ModifierInstance>,
    pub corrupted: bool,
    pub mirrored: bool,
    pub veiled: bool,
    pub synthesised: bool,
    pub unidentified: bool,
    pub influences: Vec<Influence>,
}

impl Item {
    pub fn new(rarity: Rarity, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            rarity,
            base: name.clone(),
            name,
            item_class: None,
            category: None,
            kind: ItemKind::Generic,
            quality: 0,
            item_level: 0,
            sockets: Sockets::default(),
            modifiers: Vec::new(),
            corrupted: false,
            mirrored: false,
            veiled: false,
            synthesised: false,
            unidentified: false,
            influences: Vec::new(),
        }
    }

    pub fn links(&self) -> u32 {
        self.sockets.links
    }

    pub fn count_kind(&self, kind: ModifierKind) -> usize {
        self.modifiers.iter().filter(|m| m.kind() == kind).count()
    }

    pub fn map_data(&self) -> Option<&MapData> {
        match &self.kind {
            ItemKind::Map(data) => Some(data),
            _ => None,
        }
    }

    pub fn gem_data(&self) -> Option<&GemData> {
        match &self.kind {
            ItemKind::Gem(data) => Some(data),
            _ => None,
        }
    }
}
