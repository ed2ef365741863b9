//! Trade search request documents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `{"option": "..."}` wrapper used throughout the trade API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    pub option: String,
}

impl OptionValue {
    pub fn new(option: impl Into<String>) -> Self {
        Self {
            option: option.into(),
        }
    }
}

/// Value of one entry inside a filter group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Option {
        option: String,
    },
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
}

impl FilterValue {
    pub fn option(option: impl Into<String>) -> Self {
        FilterValue::Option {
            option: option.into(),
        }
    }

    pub fn min(min: i64) -> Self {
        FilterValue::Range {
            min: Some(min),
            max: None,
        }
    }

    pub fn range(min: i64, max: i64) -> Self {
        FilterValue::Range {
            min: Some(min),
            max: Some(max),
        }
    }
}

/// `{"filters": {...}}` group, e.g. `misc_filters`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub filters: BTreeMap<String, FilterValue>,
}

/// Numeric bounds of a stat filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatFilter {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<StatValue>,
}

impl StatFilter {
    pub fn new(id: impl Into<String>, min: Option<f64>) -> Self {
        Self {
            id: id.into(),
            value: min.map(|min| StatValue {
                min: Some(min),
                max: None,
            }),
        }
    }

    pub fn min(&self) -> Option<f64> {
        self.value.and_then(|v| v.min)
    }

    pub fn max(&self) -> Option<f64> {
        self.value.and_then(|v| v.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatGroup {
    #[serde(rename = "type")]
    pub group_type: String,
    pub filters: Vec<StatFilter>,
}

impl StatGroup {
    pub fn and(filters: Vec<StatFilter>) -> Self {
        Self {
            group_type: "and".to_string(),
            filters,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub status: OptionValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    pub stats: Vec<StatGroup>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, FilterGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub price: String,
}

/// Item search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDocument {
    pub query: Query,
    pub sort: Sort,
}

impl Default for FilterDocument {
    fn default() -> Self {
        Self {
            query: Query {
                status: OptionValue::new("online"),
                name: None,
                item_type: None,
                stats: vec![StatGroup::and(Vec::new())],
                filters: BTreeMap::new(),
            },
            sort: Sort {
                price: "asc".to_string(),
            },
        }
    }
}

impl FilterDocument {
    /// Filters of the leading `and` group.
    pub fn stat_filters(&self) -> &[StatFilter] {
        self.query
            .stats
            .first()
            .map(|g| g.filters.as_slice())
            .unwrap_or(&[])
    }

    pub fn stat_filters_mut(&mut self) -> &mut Vec<StatFilter> {
        if self.query.stats.is_empty() {
            self.query.stats.push(StatGroup::and(Vec::new()));
        }
        &mut self.query.stats[0].filters
    }

    pub fn stat(&self, id: &str) -> Option<&StatFilter> {
        self.stat_filters().iter().find(|f| f.id == id)
    }

    pub fn filter(&self, group: &str, key: &str) -> Option<&FilterValue> {
        self.query.filters.get(group)?.filters.get(key)
    }

    pub fn set_filter(&mut self, group: &str, key: &str, value: FilterValue) {
        self.query
            .filters
            .entry(group.to_string())
            .or_default()
            .filters
            .insert(key.to_string(), value);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeQuery {
    pub status: OptionValue,
    pub have: Vec<String>,
    pub want: Vec<String>,
}

/// Bulk currency exchange request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeDocument {
    pub exchange: ExchangeQuery,
}

impl ExchangeDocument {
    pub fn new(have: impl Into<String>, want: impl Into<String>) -> Self {
        Self {
            exchange: ExchangeQuery {
                status: OptionValue::new("online"),
                have: vec![have.into()],
                want: vec![want.into()],
            },
        }
    }
}

/// Either kind of trade request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryDocument {
    Search(FilterDocument),
    Exchange(ExchangeDocument),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_document_shape() {
        let doc = FilterDocument::default();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "query": {
                    "status": {"option": "online"},
                    "stats": [{"type": "and", "filters": []}]
                },
                "sort": {"price": "asc"}
            })
        );
    }

    #[test]
    fn test_filter_groups_serialize() {
        let mut doc = FilterDocument::default();
        doc.set_filter("socket_filters", "links", FilterValue::min(5));
        doc.set_filter("misc_filters", "corrupted", FilterValue::option("true"));
        doc.set_filter("map_filters", "map_tier", FilterValue::range(14, 14));
        let value = serde_json::to_value(&doc).unwrap();
        let filters = &value["query"]["filters"];
        assert_eq!(filters["socket_filters"]["filters"]["links"], json!({"min": 5}));
        assert_eq!(
            filters["misc_filters"]["filters"]["corrupted"],
            json!({"option": "true"})
        );
        assert_eq!(
            filters["map_filters"]["filters"]["map_tier"],
            json!({"min": 14, "max": 14})
        );
    }

    #[test]
    fn test_stat_filter_without_value() {
        let value = serde_json::to_value(StatFilter::new("explicit.stat_1", None)).unwrap();
        assert_eq!(value, json!({"id": "explicit.stat_1"}));
    }

    #[test]
    fn test_exchange_document_shape() {
        let value = serde_json::to_value(QueryDocument::Exchange(ExchangeDocument::new(
            "chaos", "exalted",
        )))
        .unwrap();
        assert_eq!(
            value,
            json!({"exchange": {"status": {"option": "online"}, "have": ["chaos"], "want": ["exalted"]}})
        );
    }
}
