use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::core::{DisplayType, TimeRange};
use crate::error::{GanttError, GanttResult};

/// Opacity stop along a bar, `offset` in `[0, 1]` of the bar width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub opacity: f64,
}

impl GradientStop {
    const fn new(offset: f64, opacity: f64) -> Self {
        Self { offset, opacity }
    }
}

/// How the resolved row color fills a bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillStyle {
    Solid,
    Gradient { stops: SmallVec<[GradientStop; 4]> },
}

impl FillStyle {
    #[must_use]
    pub fn for_display_type(display_type: DisplayType) -> Self {
        match display_type {
            DisplayType::Bar | DisplayType::Line => Self::Solid,
            DisplayType::Gradient => Self::Gradient {
                stops: smallvec![
                    GradientStop::new(0.0, 0.0),
                    GradientStop::new(0.15, 1.0),
                    GradientStop::new(0.85, 1.0),
                    GradientStop::new(1.0, 0.0),
                ],
            },
            DisplayType::GradientRight => Self::Gradient {
                stops: smallvec![
                    GradientStop::new(0.0, 1.0),
                    GradientStop::new(0.9, 1.0),
                    GradientStop::new(1.0, 0.0),
                ],
            },
        }
    }

    /// Color opacity at `offset` along the bar, linear between stops.
    #[must_use]
    pub fn opacity_at(&self, offset: f64) -> f64 {
        let stops = match self {
            Self::Solid => return 1.0,
            Self::Gradient { stops } => stops,
        };
        let offset = offset.clamp(0.0, 1.0);
        let Some(first) = stops.first() else {
            return 1.0;
        };
        if offset <= first.offset {
            return first.opacity;
        }
        for pair in stops.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            if offset <= right.offset {
                let span = right.offset - left.offset;
                if span <= 0.0 {
                    return right.opacity;
                }
                let t = (offset - left.offset) / span;
                return left.opacity + (right.opacity - left.opacity) * t;
            }
        }
        stops.last().map_or(1.0, |stop| stop.opacity)
    }
}

/// Horizontal placement of a bar in timeline fractions.
///
/// `position + width <= 1` always holds; values outside the range are clipped
/// and flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub position: f64,
    pub width: f64,
    pub clipped_start: bool,
    pub clipped_end: bool,
    pub visible: bool,
    /// Zero-length span drawn at the minimum width.
    pub marker: bool,
    pub fill: FillStyle,
}

/// Pixel placement derived from a [`BarGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelSpan {
    pub left_px: f64,
    pub width_px: f64,
}

impl BarGeometry {
    #[must_use]
    pub fn to_pixels(&self, total_width_px: f64) -> PixelSpan {
        PixelSpan {
            left_px: self.position * total_width_px,
            width_px: self.width * total_width_px,
        }
    }

    #[must_use]
    pub fn end(&self) -> f64 {
        self.position + self.width
    }
}

/// Lays out one bar against `range`.
///
/// `min_width_fraction` is the marker width used for zero-length spans.
pub fn layout_bar(
    range: TimeRange,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_width_fraction: f64,
    display_type: DisplayType,
) -> GanttResult<BarGeometry> {
    if start > end {
        return Err(GanttError::configuration(format!(
            "bar start ({start}) is after its end ({end})"
        )));
    }
    if !min_width_fraction.is_finite() || min_width_fraction < 0.0 {
        return Err(GanttError::InvalidData(
            "minimum bar width must be finite and >= 0".to_owned(),
        ));
    }

    let fill = FillStyle::for_display_type(display_type);
    let raw_start = range.fraction(start);
    let raw_end = range.fraction(end);

    if start == end {
        let visible = (0.0..=1.0).contains(&raw_start);
        let width = min_width_fraction.min(1.0);
        return Ok(BarGeometry {
            position: raw_start.clamp(0.0, 1.0 - width),
            width: if visible { width } else { 0.0 },
            clipped_start: false,
            clipped_end: false,
            visible,
            marker: visible,
            fill,
        });
    }

    let position = raw_start.clamp(0.0, 1.0);
    let clipped_end_fraction = raw_end.clamp(0.0, 1.0);
    let width = clipped_end_fraction - position;
    if width <= 0.0 {
        return Ok(BarGeometry {
            position,
            width: 0.0,
            clipped_start: false,
            clipped_end: false,
            visible: false,
            marker: false,
            fill,
        });
    }

    Ok(BarGeometry {
        position,
        width,
        clipped_start: raw_start < 0.0,
        clipped_end: raw_end > 1.0,
        visible: true,
        marker: false,
        fill,
    })
}
