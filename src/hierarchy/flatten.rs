use std::collections::HashMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::NodeId;
use crate::error::{GanttError, GanttResult};
use crate::state::ExpandState;

use super::{JobTree, NodeIndex};

/// One visible row produced by flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRow {
    pub node: NodeIndex,
    pub depth: usize,
    pub has_children: bool,
    /// `true` only for parents whose children are currently shown.
    pub expanded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlattenFaultKind {
    /// The node repeats an id already on its ancestor path; its subtree is skipped.
    Cycle,
    /// The node repeats the id of an earlier visible row; the row is still shown.
    DuplicateId,
}

/// Structural problem found while flattening one subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenFault {
    pub kind: FlattenFaultKind,
    pub id: NodeId,
    pub node: NodeIndex,
    /// Visible row the fault is attached to, when the node produced one.
    pub row: Option<usize>,
}

impl FlattenFault {
    #[must_use]
    pub fn to_error(&self) -> GanttError {
        let reason = match self.kind {
            FlattenFaultKind::Cycle => "node repeats an ancestor id (cyclic hierarchy)",
            FlattenFaultKind::DuplicateId => {
                "id already used by another visible row; expand state is shared"
            }
        };
        GanttError::structural(&self.id, reason)
    }
}

/// Result of one flatten pass: the rows that could be produced plus the
/// structural faults of the subtrees that could not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenOutcome {
    pub rows: Vec<FlatRow>,
    pub faults: Vec<FlattenFault>,
}

impl FlattenOutcome {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    /// Fails on the first structural fault.
    pub fn into_strict(self) -> GanttResult<Vec<FlatRow>> {
        match self.faults.first() {
            Some(fault) => Err(fault.to_error()),
            None => Ok(self.rows),
        }
    }
}

enum Step {
    Enter(NodeIndex),
    Leave,
}

/// Produces the visible rows in pre-order.
///
/// Roots always appear. A node's children follow it only when its id is
/// expanded in `expand`. Missing children lists are leaves.
#[must_use]
pub fn flatten(tree: &JobTree, expand: &ExpandState) -> FlattenOutcome {
    let mut outcome = FlattenOutcome::default();
    let mut ancestor_path: IndexSet<String> = IndexSet::new();
    let mut first_row_by_id: HashMap<String, usize> = HashMap::new();
    let mut stack: Vec<Step> = tree.roots().iter().rev().map(|i| Step::Enter(*i)).collect();

    while let Some(step) = stack.pop() {
        let index = match step {
            Step::Leave => {
                ancestor_path.pop();
                continue;
            }
            Step::Enter(index) => index,
        };
        let Some(entry) = tree.entry(index) else {
            continue;
        };
        let key = entry.node.id.key();

        if ancestor_path.contains(&key) {
            warn!(id = %entry.node.id, "cyclic hierarchy: skipping subtree");
            outcome.faults.push(FlattenFault {
                kind: FlattenFaultKind::Cycle,
                id: entry.node.id.clone(),
                node: index,
                row: None,
            });
            continue;
        }

        let row_index = outcome.rows.len();
        if first_row_by_id.contains_key(&key) {
            warn!(id = %entry.node.id, row = row_index, "duplicate visible row id");
            outcome.faults.push(FlattenFault {
                kind: FlattenFaultKind::DuplicateId,
                id: entry.node.id.clone(),
                node: index,
                row: Some(row_index),
            });
        } else {
            first_row_by_id.insert(key.clone(), row_index);
        }

        let has_children = !entry.children.is_empty();
        let expanded = has_children && expand.is_expanded(&entry.node.id);
        outcome.rows.push(FlatRow {
            node: index,
            depth: entry.depth,
            has_children,
            expanded,
        });

        if expanded {
            ancestor_path.insert(key);
            stack.push(Step::Leave);
            stack.extend(entry.children.iter().rev().map(|child| Step::Enter(*child)));
        }
    }

    debug!(
        rows = outcome.rows.len(),
        faults = outcome.faults.len(),
        "flattened hierarchy"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::JobNode;
    use crate::state::ExpandedRowsData;

    fn tree() -> JobTree {
        JobTree::build(vec![
            JobNode::new("a", "A").with_children(vec![
                JobNode::new("a1", "A1").with_children(vec![JobNode::new("a1x", "A1x")]),
                JobNode::new("a2", "A2"),
            ]),
            JobNode::new("b", "B"),
        ])
    }

    fn names(tree: &JobTree, rows: &[FlatRow]) -> Vec<String> {
        rows.iter()
            .filter_map(|row| tree.node(row.node))
            .map(|node| node.name.clone())
            .collect()
    }

    fn expanded(ids: &[&str]) -> ExpandState {
        let data: ExpandedRowsData = ids.iter().map(|id| ((*id).to_owned(), true)).collect();
        ExpandState::from_rows_data(data, false)
    }

    #[test]
    fn collapsed_state_yields_roots_only() {
        let tree = tree();
        let outcome = flatten(&tree, &ExpandState::default());
        assert_eq!(names(&tree, &outcome.rows), ["A", "B"]);
        assert!(outcome.rows[0].has_children);
        assert!(!outcome.rows[0].expanded);
    }

    #[test]
    fn nested_children_need_their_own_expansion() {
        let tree = tree();
        let outcome = flatten(&tree, &expanded(&["a"]));
        assert_eq!(names(&tree, &outcome.rows), ["A", "A1", "A2", "B"]);
        assert_eq!(outcome.rows[1].depth, 1);

        let outcome = flatten(&tree, &expanded(&["a", "a1"]));
        assert_eq!(names(&tree, &outcome.rows), ["A", "A1", "A1x", "A2", "B"]);
        assert_eq!(outcome.rows[2].depth, 2);
    }

    #[test]
    fn expanding_a_hidden_descendant_changes_nothing() {
        let tree = tree();
        let outcome = flatten(&tree, &expanded(&["a1"]));
        assert_eq!(names(&tree, &outcome.rows), ["A", "B"]);
    }

    #[test]
    fn default_expanded_shows_everything() {
        let tree = tree();
        let outcome = flatten(&tree, &ExpandState::new(true));
        assert_eq!(outcome.rows.len(), 5);
    }

    #[test]
    fn ancestor_id_repeat_is_isolated_as_cycle() {
        let tree = JobTree::build(vec![
            JobNode::new("loop", "Loop").with_children(vec![
                JobNode::new("loop", "Loop again").with_children(vec![JobNode::new("deep", "D")]),
                JobNode::new("ok", "Ok"),
            ]),
            JobNode::new("sibling", "Sibling"),
        ]);
        let outcome = flatten(&tree, &ExpandState::new(true));

        assert_eq!(names(&tree, &outcome.rows), ["Loop", "Ok", "Sibling"]);
        assert_eq!(outcome.faults.len(), 1);
        assert_eq!(outcome.faults[0].kind, FlattenFaultKind::Cycle);
        assert!(matches!(
            outcome.into_strict(),
            Err(GanttError::Structural { id, .. }) if id == "loop"
        ));
    }

    #[test]
    fn duplicate_visible_ids_are_reported_but_rendered() {
        let tree = JobTree::build(vec![
            JobNode::new("x", "X").with_children(vec![JobNode::new("shared", "S1")]),
            JobNode::new("y", "Y").with_children(vec![JobNode::new("shared", "S2")]),
        ]);
        let outcome = flatten(&tree, &expanded(&["x", "y"]));
        assert_eq!(names(&tree, &outcome.rows), ["X", "S1", "Y", "S2"]);
        assert_eq!(outcome.faults.len(), 1);
        assert_eq!(outcome.faults[0].kind, FlattenFaultKind::DuplicateId);
        assert_eq!(outcome.faults[0].row, Some(3));
    }
}
