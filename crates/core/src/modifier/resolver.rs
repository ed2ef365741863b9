//! Resolution of raw modifier lines against the stat dictionary.
//!
//! The clipboard text does not say which kind a line belongs to unless it
//! carries an annotation, so unannotated lines walk a fixed chain of
//! lookups: enchant, explicit (raw line, then placeholder text), explicit
//! `(Local)`, and finally a reduced/increased sign flip.

use std::sync::Arc;

use super::extract::{extract_placeholders, negate_value, strip_annotation};
use super::index::ModifierIndex;
use super::types::{Modifier, ModifierInstance, ModifierKind};

/// Suffix under which local armour/weapon stats are stored.
pub const LOCAL_SUFFIX: &str = " (Local)";

/// Suffix under which organ (monster) modifiers are stored.
pub const MONSTER_SUFFIX: &str = " (×#)";

/// Annotations that pin a line to a single kind.
const ANNOTATIONS: [(&str, ModifierKind); 4] = [
    ("(implicit)", ModifierKind::Implicit),
    ("(crafted)", ModifierKind::Crafted),
    ("(enchant)", ModifierKind::Enchant),
    ("(fractured)", ModifierKind::Fractured),
];

/// Extra information about the item the line came from.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveContext {
    pub is_organ: bool,
}

impl ResolveContext {
    pub fn organ() -> Self {
        Self { is_organ: true }
    }
}

/// Outcome of resolving one line.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Primary interpretation (implicit/crafted/enchant/explicit...).
    pub modifier: Option<Arc<Modifier>>,
    /// Value string, negated when the match needed a sign flip.
    pub value: String,
    /// Independent monster interpretation, only looked up for organs.
    pub monster: Option<Arc<Modifier>>,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        self.modifier.is_some() || self.monster.is_some()
    }

    /// Instances for every interpretation found, primary first.
    pub fn instances(&self) -> Vec<ModifierInstance> {
        let mut out = Vec::new();
        if let Some(m) = &self.modifier {
            out.push(ModifierInstance::new(Arc::clone(m), self.value.clone()));
        }
        if let Some(m) = &self.monster {
            out.push(ModifierInstance::new(Arc::clone(m), self.value.clone()));
        }
        out
    }
}

/// Resolves modifier lines against a shared [`ModifierIndex`].
#[derive(Debug, Clone)]
pub struct ModifierResolver {
    index: Arc<ModifierIndex>,
}

impl ModifierResolver {
    pub fn new(index: Arc<ModifierIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &ModifierIndex {
        &self.index
    }

    /// Direct lookup of one kind and text, no heuristics.
    pub fn lookup(&self, kind: ModifierKind, text: &str) -> Option<Arc<Modifier>> {
        self.index.get(kind, text)
    }

    /// Resolve one raw modifier line.
    pub fn resolve(&self, line: &str, context: ResolveContext) -> Resolution {
        let line = line.trim();

        for (annotation, kind) in ANNOTATIONS {
            if let Some(stripped) = strip_annotation(line, annotation) {
                let extracted = extract_placeholders(stripped);
                return Resolution {
                    modifier: self.index.get(kind, &extracted.text),
                    value: extracted.value,
                    monster: None,
                };
            }
        }

        let extracted = extract_placeholders(line);
        let (modifier, value) = match self.resolve_unannotated(line, &extracted.text) {
            Some((modifier, flipped)) => {
                let value = if flipped {
                    negate_value(&extracted.value)
                } else {
                    extracted.value.clone()
                };
                (Some(modifier), value)
            }
            None => (None, extracted.value.clone()),
        };

        let monster = if context.is_organ {
            self.index.get(
                ModifierKind::Monster,
                &format!("{}{}", extracted.text, MONSTER_SUFFIX),
            )
        } else {
            None
        };

        Resolution {
            modifier,
            value,
            monster,
        }
    }

    /// Enchant → explicit → explicit (Local) → sign flip.
    ///
    /// Returns the match and whether the value must be negated.
    fn resolve_unannotated(&self, line: &str, text: &str) -> Option<(Arc<Modifier>, bool)> {
        let enchant_text = if text.contains(super::extract::PLACEHOLDER) {
            text.to_string()
        } else {
            format!("#% chance to {}", text)
        };
        if let Some(m) = self.index.get(ModifierKind::Enchant, &enchant_text) {
            return Some((m, false));
        }

        if let Some(m) = self.explicit_or_local(line, text) {
            return Some((m, false));
        }

        if text.contains("reduced") || text.contains("increased") {
            let flipped = flip_reduced_increased(text);
            if let Some(m) = self.explicit_or_local(&flipped, &flipped) {
                return Some((m, true));
            }
        }

        None
    }

    fn explicit_or_local(&self, raw: &str, text: &str) -> Option<Arc<Modifier>> {
        self.index
            .get(ModifierKind::Explicit, raw)
            .or_else(|| self.index.get(ModifierKind::Explicit, text))
            .or_else(|| {
                self.index
                    .get(ModifierKind::Explicit, &format!("{}{}", text, LOCAL_SUFFIX))
            })
    }
}

/// Swap every `reduced` with `increased` and vice versa.
pub fn flip_reduced_increased(text: &str) -> String {
    text.split(' ')
        .map(|word| match word {
            "reduced" => "increased",
            "increased" => "reduced",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(" ")
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

    fn resolver() -> ModifierResolver {
        let index = ModifierIndex::new(vec![
            entry("explicit.stat_3299347043", "+# to maximum Life", "explicit"),
            entry("crafted.stat_2915988346", "+#% to Fire and Cold Resistances", "crafted"),
            entry("implicit.stat_2901986750", "+#% to all Elemental Resistances", "implicit"),
            entry("explicit.stat_2250533757", "#% increased Movement Speed", "explicit"),
            entry("explicit.stat_3484657501", "+# to Armour (Local)", "explicit"),
            entry("explicit.stat_3885405204", "Bow Attacks fire 2 additional Arrows", "explicit"),
            entry("enchant.stat_2954116742", "Allocates #", "enchant"),
            entry("enchant.stat_3206652215", "#% chance to Avoid being Frozen", "enchant"),
            entry("explicit.stat_3206652215", "Avoid being Frozen", "explicit"),
            entry(
                "monster.stat_3397729665",
                "Drops additional Currency Items (×#)",
                "monster",
            ),
            entry(
                "explicit.stat_1001",
                "Drops additional Currency Items",
                "explicit",
            ),
        ]);
        ModifierResolver::new(Arc::new(index))
    }

    #[test]
    fn test_resolve_explicit() {
        let r = resolver().resolve("+94 to maximum Life", ResolveContext::default());
        let m = r.modifier.unwrap();
        assert_eq!(m.kind, ModifierKind::Explicit);
        assert_eq!(m.id, "explicit.stat_3299347043");
        assert_eq!(r.value, "94");
    }

    #[test]
    fn test_resolve_crafted_annotation() {
        let r = resolver().resolve(
            "+19% to Fire and Cold Resistances (crafted)",
            ResolveContext::default(),
        );
        let m = r.modifier.unwrap();
        assert_eq!(m.kind, ModifierKind::Crafted);
        assert_eq!(r.value, "19");
    }

    #[test]
    fn test_annotated_miss_has_no_fallback() {
        // Life exists as explicit only; an implicit annotation must not fall back.
        let r = resolver().resolve("+40 to maximum Life (implicit)", ResolveContext::default());
        assert!(r.modifier.is_none());
        assert_eq!(r.value, "40");
    }

    #[test]
    fn test_resolve_raw_line_first() {
        let r = resolver().resolve(
            "Bow Attacks fire 2 additional Arrows",
            ResolveContext::default(),
        );
        assert_eq!(r.modifier.unwrap().id, "explicit.stat_3885405204");
    }

    #[test]
    fn test_resolve_local_retry() {
        let r = resolver().resolve("+120 to Armour", ResolveContext::default());
        assert_eq!(r.modifier.unwrap().text, "+# to Armour (Local)");
        assert_eq!(r.value, "120");
    }

    #[test]
    fn test_resolve_sign_flip() {
        let r = resolver().resolve("10% reduced Movement Speed", ResolveContext::default());
        assert_eq!(r.modifier.unwrap().id, "explicit.stat_2250533757");
        assert_eq!(r.value, "-10");
    }

    #[test]
    fn test_resolve_enchant_chance_rewrite() {
        let r = resolver().resolve("Avoid being Frozen", ResolveContext::default());
        let m = r.modifier.unwrap();
        assert_eq!(m.kind, ModifierKind::Enchant);
        assert_eq!(m.id, "enchant.stat_3206652215");
    }

    #[test]
    fn test_resolve_organ_has_two_interpretations() {
        let r = resolver().resolve("Drops additional Currency Items", ResolveContext::organ());
        assert_eq!(r.modifier.as_ref().unwrap().kind, ModifierKind::Explicit);
        assert_eq!(r.monster.as_ref().unwrap().kind, ModifierKind::Monster);
        assert_eq!(r.instances().len(), 2);

        let plain = resolver().resolve(
            "Drops additional Currency Items",
            ResolveContext::default(),
        );
        assert!(plain.monster.is_none());
    }

    #[test]
    fn test_unresolved_keeps_value() {
        let r = resolver().resolve("+30 to Strength", ResolveContext::default());
        assert!(!r.is_resolved());
        assert_eq!(r.value, "30");
        assert!(r.instances().is_empty());
    }

    #[test]
    fn test_flip_reduced_increased() {
        assert_eq!(
            flip_reduced_increased("#% reduced Mana Cost and #% increased Damage"),
            "#% increased Mana Cost and #% reduced Damage"
        );
    }
}
