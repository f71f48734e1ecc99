use serde::{Deserialize, Serialize};

use crate::core::JobNode;

/// Ordered list of node fields shown in a row tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TooltipFields(pub Vec<String>);

impl Default for TooltipFields {
    fn default() -> Self {
        Self(vec!["name".to_owned(), "status".to_owned()])
    }
}

impl<S: Into<String>> FromIterator<S> for TooltipFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TooltipContent {
    pub entries: Vec<TooltipEntry>,
    text: String,
}

impl TooltipContent {
    /// `name: value` lines, or the node name when no fields are configured.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl TooltipFields {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Collects the configured fields present on `node`, in configured order.
    #[must_use]
    pub fn assemble(&self, node: &JobNode) -> TooltipContent {
        if self.0.is_empty() {
            return TooltipContent {
                entries: Vec::new(),
                text: node.name.clone(),
            };
        }

        let entries: Vec<TooltipEntry> = self
            .0
            .iter()
            .filter_map(|name| {
                node.field_text(name).map(|value| TooltipEntry {
                    name: name.clone(),
                    value,
                })
            })
            .collect();
        let text = entries
            .iter()
            .map(|entry| format!("{}: {}", entry.name, entry.value))
            .collect::<Vec<_>>()
            .join("\n");
        TooltipContent { entries, text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_skipped() {
        let fields: TooltipFields = ["name", "owner", "status"].into_iter().collect();
        let node = JobNode::new("a", "Load").with_status("pending");
        let tooltip = fields.assemble(&node);
        assert_eq!(tooltip.entries.len(), 2);
        assert_eq!(tooltip.text(), "name: Load\nstatus: pending");
    }

    #[test]
    fn empty_field_list_falls_back_to_name() {
        let tooltip = TooltipFields(Vec::new()).assemble(&JobNode::new("a", "Load"));
        assert!(tooltip.entries.is_empty());
        assert_eq!(tooltip.text(), "Load");
    }
}
