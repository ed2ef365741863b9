//! Bootstrap data loaders.
//!
//! The stat dictionary, base table and exchange ids are fetched by an
//! external collaborator and stored as JSON. They are read once at start-up
//! and turned into immutable lookup structures.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::base::{BaseCategoryTable, BaseEntry};
use crate::modifier::{ModifierEntry, ModifierIndex};
use crate::query::{ExchangeEntry, ExchangeIds};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to read data file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse data file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Either a flat list or the trade API's grouped `{"result": [{"entries": [...]}]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Flat(Vec<T>),
    Grouped { result: Vec<Group<T>> },
}

#[derive(Deserialize)]
struct Group<T> {
    #[serde(default = "Vec::new")]
    entries: Vec<T>,
}

impl<T> Listing<T> {
    fn into_entries(self) -> Vec<T> {
        match self {
            Listing::Flat(entries) => entries,
            Listing::Grouped { result } => result.into_iter().flat_map(|g| g.entries).collect(),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: display.clone(),
        source,
    })?;
    parse_json(&raw, &display)
}

fn parse_json<T: DeserializeOwned>(raw: &str, path: &str) -> Result<T, DataError> {
    serde_json::from_str(raw).map_err(|source| DataError::Parse {
        path: path.to_string(),
        source,
    })
}

/// Parse stat dictionary entries from a JSON string.
pub fn parse_modifier_entries(raw: &str) -> Result<Vec<ModifierEntry>, DataError> {
    parse_json::<Listing<ModifierEntry>>(raw, "<inline>").map(Listing::into_entries)
}

/// Load the stat dictionary into a [`ModifierIndex`].
pub fn load_modifiers(path: &Path) -> Result<ModifierIndex, DataError> {
    let entries = read_json::<Listing<ModifierEntry>>(path)?.into_entries();
    let index = ModifierIndex::new(entries);
    info!(path = %path.display(), modifiers = index.len(), "Loaded modifier dictionary");
    Ok(index)
}

/// Load the base table into a [`BaseCategoryTable`].
pub fn load_bases(path: &Path) -> Result<BaseCategoryTable, DataError> {
    let entries: Vec<BaseEntry> = read_json(path)?;
    let table = BaseCategoryTable::new(entries);
    info!(path = %path.display(), bases = table.len(), "Loaded base table");
    Ok(table)
}

/// Load static exchange ids.
pub fn load_exchange_ids(path: &Path) -> Result<ExchangeIds, DataError> {
    let entries = read_json::<Listing<ExchangeEntry>>(path)?.into_entries();
    let ids = ExchangeIds::new(entries);
    info!(path = %path.display(), ids = ids.len(), "Loaded exchange ids");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::ModifierKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_load_flat_modifiers() {
        let file = write(
            r#"[
                {"id": "explicit.stat_3299347043", "text": "+# to maximum Life", "type": "explicit"},
                {"id": "weird.stat_1", "text": "Something", "type": "weird"}
            ]"#,
        );
        let index = load_modifiers(file.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index
            .get(ModifierKind::Explicit, "# to maximum Life")
            .is_some());
    }

    #[test]
    fn test_load_grouped_modifiers() {
        let file = write(
            r#"{"result": [
                {"label": "Explicit", "entries": [
                    {"id": "explicit.stat_3299347043", "text": "+# to maximum Life", "type": "explicit"}
                ]},
                {"label": "Implicit", "entries": [
                    {"id": "implicit.stat_3299347043", "text": "+# to maximum Life", "type": "implicit"}
                ]}
            ]}"#,
        );
        let index = load_modifiers(file.path()).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_load_bases() {
        let file = write(
            r#"[
                {"base": "Assassin's Mitts", "type": "armour.gloves", "influence": null, "ilvl": 58},
                {"base": "Imperial Bow", "type": "weapon.bow"}
            ]"#,
        );
        let table = load_bases(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("Assassin's Mitts").unwrap().category, "armour.gloves");
    }

    #[test]
    fn test_load_exchange_ids() {
        let file = write(
            r#"{"result": [{"id": "Currency", "entries": [
                {"id": "chaos", "text": "Chaos Orb"},
                {"id": "exalted", "text": "Exalted Orb"}
            ]}]}"#,
        );
        let ids = load_exchange_ids(file.path()).unwrap();
        assert_eq!(ids.get("Exalted Orb"), Some("exalted"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_bases(Path::new("/nonexistent/bases.json")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let file = write("{not json");
        let err = load_modifiers(file.path()).unwrap_err();
        assert!(matches!(err, DataError::Parse { .. }));
    }

    #[test]
    fn test_parse_modifier_entries() {
        let entries = parse_modifier_entries(
            r#"[{"id": "crafted.stat_1", "text": "Foo", "type": "crafted"}]"#,
        )
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, "crafted");
    }
}
