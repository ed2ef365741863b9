//! Stat dictionary and modifier line resolution.

mod extract;
mod index;
mod resolver;
mod types;

pub use extract::{
    canonical_text, count_value_tokens, extract_placeholders, negate_value, strip_annotation,
    Extracted, PLACEHOLDER,
};
pub use index::ModifierIndex;
pub use resolver::{
    flip_reduced_increased, ModifierResolver, Resolution, ResolveContext, LOCAL_SUFFIX,
    MONSTER_SUFFIX,
};
pub use types::{Modifier, ModifierEntry, ModifierInstance, ModifierKind};
