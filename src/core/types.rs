use std::fmt;

use serde::{Deserialize, Serialize};

/// Job identifier as supplied by the caller: a string or an integer.
///
/// Expand state is keyed by [`NodeId::key`], so `7` and `"7"` address the
/// same row, mirroring how host UIs key objects by their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Number(i64),
    Text(String),
}

impl NodeId {
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}
