use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{GanttError, GanttResult};

pub const DEFAULT_COLUMN_WIDTH_PX: f64 = 100.0;
pub const DEFAULT_LABEL_PANEL_WIDTH_PX: f64 = 250.0;
pub const MIN_LABEL_PANEL_WIDTH_PX: f64 = 150.0;
pub const MAX_LABEL_PANEL_WIDTH_PX: f64 = 800.0;

/// Scroll and size state shared by the label column and the timeline.
///
/// `visible_width == 0` means the host has not measured the timeline yet;
/// every column is then treated as visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub scroll_left: f64,
    pub scroll_top: f64,
    pub column_width: f64,
    pub visible_width: f64,
    pub visible_height: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scroll_left: 0.0,
            scroll_top: 0.0,
            column_width: DEFAULT_COLUMN_WIDTH_PX,
            visible_width: 0.0,
            visible_height: 0.0,
        }
    }
}

impl ViewportState {
    pub fn validate(self) -> GanttResult<Self> {
        if !self.column_width.is_finite() || self.column_width <= 0.0 {
            return Err(GanttError::configuration(format!(
                "column width must be finite and > 0, got {}",
                self.column_width
            )));
        }
        if !self.visible_width.is_finite()
            || !self.visible_height.is_finite()
            || self.visible_width < 0.0
            || self.visible_height < 0.0
        {
            return Err(GanttError::InvalidViewport {
                width: self.visible_width,
                height: self.visible_height,
            });
        }
        if !self.scroll_left.is_finite() || !self.scroll_top.is_finite() {
            return Err(GanttError::InvalidData(
                "scroll offsets must be finite".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Anything laid out along the timeline's x axis in pixels.
pub trait HorizontalExtent {
    fn left_px(&self) -> f64;
    fn width_px(&self) -> f64;
}

/// Keeps the label column and the timeline vertically in step while the
/// timeline scrolls horizontally on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollSynchronizer {
    state: ViewportState,
    content_width: f64,
    content_height: f64,
    label_panel_width: f64,
    revision: u64,
}

impl Default for ScrollSynchronizer {
    fn default() -> Self {
        Self {
            state: ViewportState::default(),
            content_width: 0.0,
            content_height: 0.0,
            label_panel_width: DEFAULT_LABEL_PANEL_WIDTH_PX,
            revision: 0,
        }
    }
}

impl ScrollSynchronizer {
    pub fn new(state: ViewportState) -> GanttResult<Self> {
        Ok(Self {
            state: state.validate()?,
            ..Self::default()
        })
    }

    /// Copy of the current state for one layout pass.
    #[must_use]
    pub fn state(&self) -> ViewportState {
        self.state
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Vertical offset applied to the fixed label column.
    #[must_use]
    pub fn label_scroll_top(&self) -> f64 {
        self.state.scroll_top
    }

    /// Vertical offset applied to the scrollable timeline; always equal to
    /// [`ScrollSynchronizer::label_scroll_top`].
    #[must_use]
    pub fn timeline_scroll_top(&self) -> f64 {
        self.state.scroll_top
    }

    /// Horizontal translation of the header strip.
    #[must_use]
    pub fn header_offset(&self) -> f64 {
        -self.state.scroll_left
    }

    #[must_use]
    pub fn label_panel_width(&self) -> f64 {
        self.label_panel_width
    }

    /// Records the laid-out content size so scroll offsets can be clamped.
    pub fn set_content_size(&mut self, width: f64, height: f64) {
        self.content_width = width.max(0.0);
        self.content_height = height.max(0.0);
        self.state.scroll_left = self.clamp_left(self.state.scroll_left);
        self.state.scroll_top = self.clamp_top(self.state.scroll_top);
    }

    /// Scroll event from the timeline region: drives both axes.
    pub fn scroll_timeline(&mut self, scroll_left: f64, scroll_top: f64) -> GanttResult<()> {
        ensure_finite(scroll_left, "scroll left")?;
        ensure_finite(scroll_top, "scroll top")?;
        self.state.scroll_left = self.clamp_left(scroll_left);
        self.state.scroll_top = self.clamp_top(scroll_top);
        self.revision += 1;
        trace!(
            scroll_left = self.state.scroll_left,
            scroll_top = self.state.scroll_top,
            "timeline scrolled"
        );
        Ok(())
    }

    /// Scroll event from the label column: only the shared vertical offset moves.
    pub fn scroll_labels(&mut self, scroll_top: f64) -> GanttResult<()> {
        ensure_finite(scroll_top, "scroll top")?;
        self.state.scroll_top = self.clamp_top(scroll_top);
        self.revision += 1;
        trace!(scroll_top = self.state.scroll_top, "label column scrolled");
        Ok(())
    }

    pub fn resize(&mut self, visible_width: f64, visible_height: f64) -> GanttResult<()> {
        let next = ViewportState {
            visible_width,
            visible_height,
            ..self.state
        }
        .validate()?;
        self.state = next;
        self.state.scroll_left = self.clamp_left(self.state.scroll_left);
        self.state.scroll_top = self.clamp_top(self.state.scroll_top);
        self.revision += 1;
        Ok(())
    }

    pub fn set_column_width(&mut self, column_width: f64) -> GanttResult<()> {
        self.state = ViewportState {
            column_width,
            ..self.state
        }
        .validate()?;
        self.revision += 1;
        Ok(())
    }

    /// Drag-resizes the label panel; the width is clamped to `[150, 800]` px.
    pub fn resize_label_panel(&mut self, width: f64) -> f64 {
        if width.is_finite() {
            self.label_panel_width = width.clamp(MIN_LABEL_PANEL_WIDTH_PX, MAX_LABEL_PANEL_WIDTH_PX);
        }
        self.label_panel_width
    }

    /// Index range of the already-computed cells intersecting the visible strip.
    ///
    /// `cells` must be sorted by `left_px`, which holds for header columns.
    #[must_use]
    pub fn visible_columns<C: HorizontalExtent>(&self, cells: &[C]) -> Range<usize> {
        if self.state.visible_width <= 0.0 {
            return 0..cells.len();
        }
        let left = self.state.scroll_left;
        let right = left + self.state.visible_width;
        let first = cells.partition_point(|cell| cell.left_px() + cell.width_px() <= left);
        let last = cells.partition_point(|cell| cell.left_px() < right);
        first..last.max(first)
    }

    /// Row window for virtualized drawing, widened by `overscan` rows each side.
    #[must_use]
    pub fn visible_rows(&self, row_height: f64, row_count: usize, overscan: usize) -> Range<usize> {
        if row_count == 0 {
            return 0..0;
        }
        if !row_height.is_finite() || row_height <= 0.0 || self.state.visible_height <= 0.0 {
            return 0..row_count;
        }
        let first = (self.state.scroll_top / row_height).floor() as usize;
        let visible = (self.state.visible_height / row_height).ceil() as usize + 1;
        let start = first.saturating_sub(overscan).min(row_count);
        let end = first
            .saturating_add(visible)
            .saturating_add(overscan)
            .min(row_count);
        start..end
    }

    fn clamp_left(&self, value: f64) -> f64 {
        let max = (self.content_width - self.state.visible_width).max(0.0);
        if self.content_width > 0.0 {
            value.clamp(0.0, max)
        } else {
            value.max(0.0)
        }
    }

    fn clamp_top(&self, value: f64) -> f64 {
        let max = (self.content_height - self.state.visible_height).max(0.0);
        if self.content_height > 0.0 {
            value.clamp(0.0, max)
        } else {
            value.max(0.0)
        }
    }
}

fn ensure_finite(value: f64, name: &str) -> GanttResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GanttError::InvalidData(format!("{name} must be finite")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Cell(f64, f64);

    impl HorizontalExtent for Cell {
        fn left_px(&self) -> f64 {
            self.0
        }
        fn width_px(&self) -> f64 {
            self.1
        }
    }

    fn cells(count: usize) -> Vec<Cell> {
        (0..count).map(|i| Cell(i as f64 * 100.0, 100.0)).collect()
    }

    #[test]
    fn vertical_scroll_is_shared() {
        let mut sync = ScrollSynchronizer::default();
        sync.scroll_timeline(40.0, 120.0).expect("scroll");
        assert_eq!(sync.label_scroll_top(), 120.0);
        sync.scroll_labels(30.0).expect("scroll");
        assert_eq!(sync.timeline_scroll_top(), 30.0);
        assert_eq!(sync.state().scroll_left, 40.0);
        assert_eq!(sync.header_offset(), -40.0);
    }

    #[test]
    fn visible_columns_follow_scroll_left() {
        let mut sync = ScrollSynchronizer::new(ViewportState {
            visible_width: 250.0,
            visible_height: 400.0,
            ..ViewportState::default()
        })
        .expect("sync");
        assert_eq!(sync.visible_columns(&cells(10)), 0..3);
        sync.scroll_timeline(150.0, 0.0).expect("scroll");
        assert_eq!(sync.visible_columns(&cells(10)), 1..4);
        sync.scroll_timeline(5_000.0, 0.0).expect("scroll");
        assert!(sync.visible_columns(&cells(10)).is_empty());
    }

    #[test]
    fn unmeasured_viewport_shows_every_column() {
        let sync = ScrollSynchronizer::default();
        assert_eq!(sync.visible_columns(&cells(4)), 0..4);
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut sync = ScrollSynchronizer::new(ViewportState {
            visible_width: 300.0,
            visible_height: 200.0,
            ..ViewportState::default()
        })
        .expect("sync");
        sync.set_content_size(500.0, 1_000.0);
        sync.scroll_timeline(900.0, -10.0).expect("scroll");
        assert_eq!(sync.state().scroll_left, 200.0);
        assert_eq!(sync.state().scroll_top, 0.0);
    }

    #[test]
    fn label_panel_width_is_clamped() {
        let mut sync = ScrollSynchronizer::default();
        assert_eq!(sync.resize_label_panel(40.0), MIN_LABEL_PANEL_WIDTH_PX);
        assert_eq!(sync.resize_label_panel(1_200.0), MAX_LABEL_PANEL_WIDTH_PX);
        assert_eq!(sync.resize_label_panel(f64::NAN), MAX_LABEL_PANEL_WIDTH_PX);
    }

    #[test]
    fn visible_rows_apply_overscan() {
        let mut sync = ScrollSynchronizer::new(ViewportState {
            visible_height: 100.0,
            ..ViewportState::default()
        })
        .expect("sync");
        sync.scroll_labels(200.0).expect("scroll");
        assert_eq!(sync.visible_rows(40.0, 50, 2), 3..11);
        assert_eq!(sync.visible_rows(40.0, 0, 2), 0..0);
    }

    #[test]
    fn rejects_non_positive_column_width() {
        let mut sync = ScrollSynchronizer::default();
        assert!(sync.set_column_width(0.0).is_err());
        assert_eq!(sync.state().column_width, DEFAULT_COLUMN_WIDTH_PX);
    }
}
