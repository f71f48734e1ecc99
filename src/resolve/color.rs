use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::JobNode;

/// Color used when neither the mapping nor the node supplies one.
pub const DEFAULT_COLOR: &str = "#666";

/// Maps a node field value to a color, e.g. `status → {completed: green}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorMapping {
    pub key: String,
    #[serde(default)]
    pub map: IndexMap<String, String>,
}

impl Default for ColorMapping {
    fn default() -> Self {
        let map = [
            ("completed", "#4CAF50"),
            ("in_progress", "#FFA726"),
            ("pending", "#90CAF9"),
        ]
        .into_iter()
        .map(|(value, color)| (value.to_owned(), color.to_owned()))
        .collect();
        Self {
            key: "status".to_owned(),
            map,
        }
    }
}

impl ColorMapping {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            map: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_entry(mut self, value: impl Into<String>, color: impl Into<String>) -> Self {
        self.map.insert(value.into(), color.into());
        self
    }

    /// Color for `node[key]`, if the mapping covers its value.
    #[must_use]
    pub fn lookup(&self, node: &JobNode) -> Option<&str> {
        let value = node.field_text(&self.key)?;
        self.map.get(&value).map(String::as_str)
    }

    /// Mapping first, then the node's own color, then [`DEFAULT_COLOR`].
    #[must_use]
    pub fn resolve(&self, node: &JobNode) -> String {
        resolve_color(Some(self), node)
    }
}

#[must_use]
pub fn resolve_color(mapping: Option<&ColorMapping>, node: &JobNode) -> String {
    mapping
        .and_then(|mapping| mapping.lookup(node))
        .or(node.color.as_deref())
        .unwrap_or(DEFAULT_COLOR)
        .to_owned()
}
