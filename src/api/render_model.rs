use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Column, NodeId};
use crate::error::{ErrorKind, GanttError, GanttResult};
use crate::layout::RowGeometry;
use crate::resolve::TooltipContent;
use crate::state::{HorizontalExtent, ViewportState};

/// One header column placed on the timeline.
///
/// Only cells inside [`HeaderModel::visible`] carry a formatted label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderCell {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub left_px: f64,
    pub width_px: f64,
    pub partial: bool,
}

impl HeaderCell {
    pub(crate) fn from_column(column: &Column, left_px: f64, width_px: f64) -> Self {
        Self {
            index: column.index,
            label: None,
            start: column.start,
            end: column.end,
            left_px,
            width_px,
            partial: column.partial,
        }
    }
}

impl HorizontalExtent for HeaderCell {
    fn left_px(&self) -> f64 {
        self.left_px
    }

    fn width_px(&self) -> f64 {
        self.width_px
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderModel {
    pub cells: Vec<HeaderCell>,
    /// Horizontal translation keeping the header aligned with the timeline.
    pub offset_px: f64,
    /// Cells intersecting the visible strip.
    pub visible: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRow {
    pub index: usize,
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub color: String,
    pub geometry: RowGeometry,
    pub tooltip: TooltipContent,
    pub top_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentTimeMarker {
    pub time: DateTime<Utc>,
    pub fraction: f64,
    pub left_px: f64,
}

/// A row-scoped failure; the row keeps its label but loses its geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFault {
    pub id: String,
    /// Visible row index, absent when the faulty subtree produced no row.
    pub row: Option<usize>,
    pub kind: ErrorKind,
    pub message: String,
}

impl RowFault {
    pub(crate) fn from_error(id: &NodeId, row: Option<usize>, error: &GanttError) -> Self {
        Self {
            id: id.key(),
            row,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderModel {
    pub title: String,
    pub range_start: DateTime<Utc>,
    pub range_end: DateTime<Utc>,
    pub total_width_px: f64,
    pub row_height_px: f64,
    pub header: HeaderModel,
    pub rows: Vec<RenderRow>,
    pub visible_rows: Range<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<CurrentTimeMarker>,
    #[serde(default)]
    pub faults: Vec<RowFault>,
    pub viewport: ViewportState,
    pub label_panel_width_px: f64,
    #[serde(default)]
    pub max_height: Value,
    #[serde(default)]
    pub styles: Value,
    #[serde(default)]
    pub class_names: Value,
}

impl RenderModel {
    #[must_use]
    pub fn total_height_px(&self) -> f64 {
        self.rows.len() as f64 * self.row_height_px
    }

    #[must_use]
    pub fn row(&self, id: &NodeId) -> Option<&RenderRow> {
        let key = id.key();
        self.rows.iter().find(|row| row.id.key() == key)
    }

    #[must_use]
    pub fn visible_header_cells(&self) -> &[HeaderCell] {
        self.header
            .cells
            .get(self.header.visible.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn visible_row_slice(&self) -> &[RenderRow] {
        self.rows.get(self.visible_rows.clone()).unwrap_or_default()
    }

    /// Structural sanity checks a renderer may rely on.
    pub fn validate(&self) -> GanttResult<()> {
        if !self.total_width_px.is_finite() || self.total_width_px <= 0.0 {
            return Err(GanttError::InvalidViewport {
                width: self.total_width_px,
                height: self.total_height_px(),
            });
        }
        if self.range_start >= self.range_end {
            return Err(GanttError::InvalidData(
                "render model range must be increasing".to_owned(),
            ));
        }
        if self.header.visible.end > self.header.cells.len()
            || self.visible_rows.end > self.rows.len()
        {
            return Err(GanttError::InvalidData(
                "visible window exceeds model bounds".to_owned(),
            ));
        }
        if let Some(pair) = self
            .header
            .cells
            .windows(2)
            .find(|pair| pair[1].start <= pair[0].start)
        {
            return Err(GanttError::InvalidData(format!(
                "header cells are not increasing at column {}",
                pair[1].index
            )));
        }
        if let Some(row) = self.rows.iter().find(|row| match &row.geometry {
            RowGeometry::Bar(bar) => {
                bar.position < 0.0 || bar.width < 0.0 || bar.end() > 1.0 + 1e-9
            }
            _ => false,
        }) {
            return Err(GanttError::InvalidData(format!(
                "bar geometry of row `{}` leaves the timeline",
                row.id
            )));
        }
        Ok(())
    }
}
