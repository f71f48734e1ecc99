//! Mutable interaction state: expand/collapse and viewport scroll.

pub mod expand;
pub mod viewport;

pub use expand::{ExpandEvent, ExpandListener, ExpandState, ExpandStore, ExpandedRowsData};
pub use viewport::{
    DEFAULT_COLUMN_WIDTH_PX, DEFAULT_LABEL_PANEL_WIDTH_PX, HorizontalExtent,
    MAX_LABEL_PANEL_WIDTH_PX, MIN_LABEL_PANEL_WIDTH_PX, ScrollSynchronizer, ViewportState,
};
