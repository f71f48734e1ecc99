use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{JobNode, NodeId};

/// Stable address of a node inside a [`JobTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIndex(usize);

impl NodeIndex {
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Arena slot: the node (children moved out) plus its tree links.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEntry {
    pub node: JobNode,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
    pub depth: usize,
}

/// Job hierarchy stored as a flat arena in pre-order.
///
/// Building is iterative so arbitrarily deep inputs cannot exhaust the stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobTree {
    entries: Vec<TreeEntry>,
    roots: Vec<NodeIndex>,
    by_id: IndexMap<String, SmallVec<[NodeIndex; 1]>>,
}

impl JobTree {
    #[must_use]
    pub fn build(nodes: Vec<JobNode>) -> Self {
        let mut tree = Self::default();
        let mut pending: Vec<(JobNode, Option<NodeIndex>, usize)> =
            nodes.into_iter().rev().map(|node| (node, None, 0)).collect();

        while let Some((mut node, parent, depth)) = pending.pop() {
            let children = node.children.take().unwrap_or_default();
            let index = tree.push_entry(node, parent, depth, children.len());
            pending.extend(
                children
                    .into_iter()
                    .rev()
                    .map(|child| (child, Some(index), depth + 1)),
            );
        }

        tree
    }

    /// Copies the caller-owned hierarchy into a new arena, one node at a time.
    #[must_use]
    pub fn from_nodes(nodes: &[JobNode]) -> Self {
        let mut tree = Self::default();
        let mut pending: Vec<(&JobNode, Option<NodeIndex>, usize)> =
            nodes.iter().rev().map(|node| (node, None, 0)).collect();

        while let Some((node, parent, depth)) = pending.pop() {
            let children = node.children();
            let index = tree.push_entry(node.without_children(), parent, depth, children.len());
            pending.extend(
                children
                    .iter()
                    .rev()
                    .map(|child| (child, Some(index), depth + 1)),
            );
        }

        tree
    }

    fn push_entry(
        &mut self,
        node: JobNode,
        parent: Option<NodeIndex>,
        depth: usize,
        child_count: usize,
    ) -> NodeIndex {
        let index = NodeIndex(self.entries.len());
        self.by_id.entry(node.id.key()).or_default().push(index);
        match parent {
            Some(parent) => self.entries[parent.0].children.push(index),
            None => self.roots.push(index),
        }
        self.entries.push(TreeEntry {
            node,
            parent,
            children: Vec::with_capacity(child_count),
            depth,
        });
        index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    #[must_use]
    pub fn entry(&self, index: NodeIndex) -> Option<&TreeEntry> {
        self.entries.get(index.0)
    }

    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&JobNode> {
        self.entry(index).map(|entry| &entry.node)
    }

    #[must_use]
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.entry(index)
            .map(|entry| entry.children.as_slice())
            .unwrap_or_default()
    }

    /// Every arena position holding `id`; more than one means a duplicated id.
    #[must_use]
    pub fn indices_of(&self, id: &NodeId) -> &[NodeIndex] {
        self.by_id
            .get(&id.key())
            .map(|indices| indices.as_slice())
            .unwrap_or_default()
    }

    /// Ids that occur at more than one position, in first-seen order.
    pub fn duplicate_ids(&self) -> impl Iterator<Item = &str> {
        self.by_id
            .iter()
            .filter(|(_, indices)| indices.len() > 1)
            .map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &TreeEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (NodeIndex(index), entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<JobNode> {
        vec![
            JobNode::new("a", "A").with_children(vec![
                JobNode::new("a1", "A1").with_children(vec![JobNode::new("a1x", "A1x")]),
                JobNode::new("a2", "A2"),
            ]),
            JobNode::new("b", "B"),
        ]
    }

    #[test]
    fn builds_pre_order_arena() {
        let tree = JobTree::build(sample());
        let names: Vec<&str> = tree.iter().map(|(_, e)| e.node.name.as_str()).collect();
        assert_eq!(names, ["A", "A1", "A1x", "A2", "B"]);
        assert_eq!(tree.roots().len(), 2);

        let a = tree.roots()[0];
        let children: Vec<&str> = tree
            .children(a)
            .iter()
            .filter_map(|i| tree.node(*i))
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(children, ["A1", "A2"]);
        assert_eq!(tree.entry(tree.children(a)[0]).map(|e| e.depth), Some(1));
    }

    #[test]
    fn indexes_duplicate_ids() {
        let tree = JobTree::build(vec![
            JobNode::new("x", "first").with_children(vec![JobNode::new("shared", "S")]),
            JobNode::new("y", "second").with_children(vec![JobNode::new("shared", "S")]),
        ]);
        assert_eq!(tree.indices_of(&NodeId::from("shared")).len(), 2);
        assert_eq!(tree.duplicate_ids().collect::<Vec<_>>(), ["shared"]);
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let mut node = JobNode::new(0_i64, "leaf");
        for depth in 1..10_000_i64 {
            node = JobNode::new(depth, "n").with_children(vec![node]);
        }
        let tree = JobTree::build(vec![node]);
        assert_eq!(tree.len(), 10_000);
        assert_eq!(tree.iter().last().map(|(_, e)| e.depth), Some(9_999));
    }

    #[test]
    fn borrowed_deep_chains_are_copied_without_recursion() {
        let mut node = JobNode::new(0_i64, "leaf");
        for depth in 1..10_000_i64 {
            node = JobNode::new(depth, "n").with_children(vec![node]);
        }

        let tree = JobTree::from_nodes(std::slice::from_ref(&node));
        assert_eq!(tree.len(), 10_000);
        assert_eq!(tree.iter().last().map(|(_, e)| e.depth), Some(9_999));
        assert!(tree.iter().all(|(_, entry)| entry.node.children.is_none()));

        // Dropping the input chain node by node keeps the test itself shallow.
        let mut pending = vec![node];
        while let Some(mut next) = pending.pop() {
            pending.extend(next.children.take().unwrap_or_default());
        }
    }

    #[test]
    fn borrowed_and_owned_builds_agree() {
        assert_eq!(JobTree::from_nodes(&sample()), JobTree::build(sample()));
    }
}
