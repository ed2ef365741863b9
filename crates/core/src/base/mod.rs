//! Item base knowledge: base → category and magic name → base.

mod table;
mod trie;

pub use table::{BaseCategoryTable, BaseEntry};
pub use trie::BaseTrie;
