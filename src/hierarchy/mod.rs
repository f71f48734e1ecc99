//! Job hierarchy arena and the visible-row flattener.

pub mod flatten;
pub mod tree;

pub use flatten::{FlatRow, FlattenFault, FlattenFaultKind, FlattenOutcome, flatten};
pub use tree::{JobTree, NodeIndex, TreeEntry};
