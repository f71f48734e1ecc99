//! Row geometry in timeline fractions (`0` = range start, `1` = range end).

pub mod bar;
pub mod line;
pub mod marker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{DisplayType, JobNode, TimeRange};
use crate::error::{GanttError, GanttResult};

pub use bar::{BarGeometry, FillStyle, GradientStop, PixelSpan, layout_bar};
pub use line::{LineFillGeometry, LineGeometry, LinePoint, layout_line};
pub use marker::current_time_fraction;

/// Geometry of one visible row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RowGeometry {
    Bar(BarGeometry),
    Line(LineGeometry),
    /// The node carries no temporal data; only its label is drawn.
    Empty,
}

impl RowGeometry {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Inputs shared by every row of one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutContext {
    pub range: TimeRange,
    pub min_bar_width_fraction: f64,
    pub current_time: Option<DateTime<Utc>>,
}

impl LayoutContext {
    /// Converts the pixel minimum bar width into a fraction of `total_width_px`.
    pub fn new(
        range: TimeRange,
        total_width_px: f64,
        min_bar_width_px: f64,
        current_time: Option<DateTime<Utc>>,
    ) -> GanttResult<Self> {
        if !total_width_px.is_finite() || total_width_px <= 0.0 {
            return Err(GanttError::InvalidViewport {
                width: total_width_px,
                height: 0.0,
            });
        }
        if !min_bar_width_px.is_finite() || min_bar_width_px < 0.0 {
            return Err(GanttError::InvalidData(
                "minimum bar width must be finite and >= 0".to_owned(),
            ));
        }
        Ok(Self {
            range,
            min_bar_width_fraction: (min_bar_width_px / total_width_px).min(1.0),
            current_time,
        })
    }

    /// Lays out one node.
    ///
    /// A bar with no end uses the current time when one is configured; a
    /// current time before the start collapses it to a marker at the start.
    pub fn layout_node(&self, node: &JobNode) -> GanttResult<RowGeometry> {
        if node.display_type == DisplayType::Line {
            if node.dates.is_empty() && node.values.is_empty() {
                return Ok(RowGeometry::Empty);
            }
            return layout_line(
                self.range,
                &node.dates,
                &node.values,
                node.value_range,
                node.fill,
            )
            .map(RowGeometry::Line);
        }

        let Some(start) = node.start.map(|t| t.instant()) else {
            return Ok(RowGeometry::Empty);
        };
        let end = match (node.end, self.current_time) {
            (Some(end), _) => end.instant(),
            (None, Some(now)) => now.max(start),
            (None, None) => return Ok(RowGeometry::Empty),
        };

        layout_bar(
            self.range,
            start,
            end,
            self.min_bar_width_fraction,
            node.display_type,
        )
        .map(RowGeometry::Bar)
    }
}
