use gantt_rs::core::{JobNode, NodeId};
use gantt_rs::hierarchy::{JobTree, flatten};
use gantt_rs::state::{ExpandState, ExpandedRowsData};
use proptest::prelude::*;

fn build_forest(shape: &[usize]) -> Vec<JobNode> {
    shape
        .iter()
        .enumerate()
        .map(|(root, &children)| {
            let kids = (0..children)
                .map(|child| JobNode::new(format!("{root}.{child}"), format!("child {root}.{child}")))
                .collect();
            JobNode::new(format!("{root}"), format!("root {root}")).with_children(kids)
        })
        .collect()
}

proptest! {
    #[test]
    fn collapsed_forest_yields_roots_only(shape in prop::collection::vec(0usize..6, 0..20)) {
        let tree = JobTree::build(build_forest(&shape));
        let outcome = flatten(&tree, &ExpandState::default());

        prop_assert_eq!(outcome.rows.len(), shape.len());
        prop_assert!(outcome.rows.iter().all(|row| row.depth == 0));
        prop_assert!(outcome.faults.is_empty());
    }

    #[test]
    fn expanded_roots_add_their_children_after_them(
        shape in prop::collection::vec(0usize..6, 1..20),
        mask in prop::collection::vec(any::<bool>(), 20)
    ) {
        let tree = JobTree::build(build_forest(&shape));
        let rows: ExpandedRowsData = shape
            .iter()
            .enumerate()
            .filter(|(root, _)| mask[*root])
            .map(|(root, _)| (root.to_string(), true))
            .collect();
        let outcome = flatten(&tree, &ExpandState::from_rows_data(rows, false));

        let expected: usize = shape
            .iter()
            .enumerate()
            .map(|(root, &children)| 1 + if mask[root] { children } else { 0 })
            .sum();
        prop_assert_eq!(outcome.rows.len(), expected);

        let mut cursor = 0;
        for (root, &children) in shape.iter().enumerate() {
            let node = tree.node(outcome.rows[cursor].node).expect("root node");
            prop_assert_eq!(&node.id, &NodeId::from(root.to_string()));
            cursor += 1;
            if mask[root] {
                for child in 0..children {
                    let row = outcome.rows[cursor];
                    let node = tree.node(row.node).expect("child node");
                    prop_assert_eq!(row.depth, 1);
                    prop_assert_eq!(node.id.key(), format!("{root}.{child}"));
                    cursor += 1;
                }
            }
        }
    }
}
