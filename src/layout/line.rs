use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{LineFill, LinearScale, TimeRange, Timestamp, ValueRange};
use crate::error::{GanttError, GanttResult};

/// Point in timeline fractions. `y = 0` is the baseline, `y = 1` the top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub x: f64,
    pub y: f64,
}

/// Area under the polyline with a horizontal opacity ramp.
///
/// `polygon` is explicitly closed: it starts and ends on the same baseline
/// vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFillGeometry {
    pub polygon: Vec<LinePoint>,
    pub start_opacity: f64,
    pub end_opacity: f64,
    pub x_min: f64,
    pub x_max: f64,
}

impl LineFillGeometry {
    #[must_use]
    pub fn opacity_at(&self, x: f64) -> f64 {
        let span = self.x_max - self.x_min;
        if span <= 0.0 {
            return self.start_opacity;
        }
        let t = ((x - self.x_min) / span).clamp(0.0, 1.0);
        self.start_opacity + (self.end_opacity - self.start_opacity) * t
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineGeometry {
    /// Clipped polyline, sorted by `x`.
    pub points: Vec<LinePoint>,
    /// Set when only a single point remains to draw.
    pub marker: Option<LinePoint>,
    pub fill: Option<LineFillGeometry>,
    /// Value mapped to `y = 0` and `y = 1`.
    pub value_domain: (f64, f64),
}

impl LineGeometry {
    fn empty(value_domain: (f64, f64)) -> Self {
        Self {
            points: Vec::new(),
            marker: None,
            fill: None,
            value_domain,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        Some((self.points.first()?.x, self.points.last()?.x))
    }
}

fn validate_series(dates: &[Timestamp], values: &[f64]) -> GanttResult<()> {
    if dates.len() != values.len() {
        return Err(GanttError::configuration(format!(
            "line series has {} dates but {} values",
            dates.len(),
            values.len()
        )));
    }
    if let Some(index) = values.iter().position(|value| !value.is_finite()) {
        return Err(GanttError::InvalidData(format!(
            "line value at index {index} must be finite"
        )));
    }
    if let Some(index) = dates.windows(2).position(|pair| pair[1] < pair[0]) {
        return Err(GanttError::configuration(format!(
            "line dates must be chronological; index {} precedes index {index}",
            index + 1
        )));
    }
    Ok(())
}

fn value_domain(values: &[f64], value_range: Option<ValueRange>) -> GanttResult<(f64, f64)> {
    if let Some(range) = value_range {
        let range = range.validate()?;
        return Ok((range.min, range.max));
    }
    let min = values.iter().copied().map(OrderedFloat).min();
    let max = values.iter().copied().map(OrderedFloat).max();
    Ok(match (min, max) {
        (Some(min), Some(max)) => (min.0, max.0),
        _ => (0.0, 0.0),
    })
}

fn push_distinct(point: LinePoint, clipped: &mut Vec<LinePoint>) {
    if clipped.last() != Some(&point) {
        clipped.push(point);
    }
}

/// Keeps the part of the monotone polyline inside `x ∈ [0, 1]`, adding
/// interpolated points where segments cross the edges.
fn clip_to_unit_x(points: &[LinePoint]) -> Vec<LinePoint> {
    let inside = |point: &LinePoint| (0.0..=1.0).contains(&point.x);
    let mut clipped: Vec<LinePoint> = Vec::with_capacity(points.len() + 2);
    if points.len() == 1 {
        if inside(&points[0]) {
            push_distinct(points[0], &mut clipped);
        }
        return clipped;
    }

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let dx = b.x - a.x;
        if dx <= 0.0 {
            for point in [a, b] {
                if inside(&point) {
                    push_distinct(point, &mut clipped);
                }
            }
            continue;
        }

        let t_enter = ((0.0 - a.x) / dx).max(0.0);
        let t_exit = ((1.0 - a.x) / dx).min(1.0);
        if t_enter > t_exit {
            continue;
        }
        // Endpoints are kept exact so shared vertices deduplicate.
        let lerp = |t: f64| {
            if t <= 0.0 {
                a
            } else if t >= 1.0 {
                b
            } else {
                LinePoint {
                    x: (a.x + dx * t).clamp(0.0, 1.0),
                    y: a.y + (b.y - a.y) * t,
                }
            }
        };
        push_distinct(lerp(t_enter), &mut clipped);
        push_distinct(lerp(t_exit), &mut clipped);
    }
    clipped
}

fn build_fill(points: &[LinePoint], fill: LineFill) -> Option<LineFillGeometry> {
    if !fill.enabled || points.len() < 2 {
        return None;
    }
    let first_x = points[0].x;
    let last_x = points[points.len() - 1].x;

    let mut polygon = Vec::with_capacity(points.len() + 3);
    polygon.push(LinePoint { x: first_x, y: 0.0 });
    polygon.extend(points.iter().copied());
    polygon.push(LinePoint { x: last_x, y: 0.0 });
    polygon.push(LinePoint { x: first_x, y: 0.0 });

    Some(LineFillGeometry {
        polygon,
        start_opacity: fill.start_opacity,
        end_opacity: fill.end_opacity,
        x_min: first_x,
        x_max: last_x,
    })
}

/// Lays out a time series against `range`.
///
/// Values are normalized with `value_range` when given, otherwise with the
/// series min/max; a constant series sits at `y = 0.5`.
pub fn layout_line(
    range: TimeRange,
    dates: &[Timestamp],
    values: &[f64],
    value_range: Option<ValueRange>,
    fill: Option<LineFill>,
) -> GanttResult<LineGeometry> {
    validate_series(dates, values)?;
    let fill = fill.unwrap_or_default().validate()?;
    let domain = value_domain(values, value_range)?;
    if dates.is_empty() {
        return Ok(LineGeometry::empty(domain));
    }

    let value_scale = LinearScale::new(domain.0, domain.1).ok();
    let normalize = |value: f64| {
        value_scale.map_or(0.5, |scale| scale.domain_to_fraction(value).clamp(0.0, 1.0))
    };

    let projected: Vec<LinePoint> = dates
        .iter()
        .zip(values)
        .map(|(date, value)| LinePoint {
            x: range.fraction(date.instant()),
            y: normalize(*value),
        })
        .collect();

    let points = clip_to_unit_x(&projected);
    trace!(
        input = projected.len(),
        clipped = points.len(),
        "line series projected"
    );

    let marker = match points.as_slice() {
        [single] => Some(*single),
        _ => None,
    };
    let fill = build_fill(&points, fill);
    Ok(LineGeometry {
        points,
        marker,
        fill,
        value_domain: domain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse_timestamp;

    fn ts(input: &str) -> Timestamp {
        Timestamp(parse_timestamp(input).expect("timestamp"))
    }

    fn range() -> TimeRange {
        TimeRange::new(
            parse_timestamp("2023-10-01 14:00").expect("start"),
            parse_timestamp("2023-10-01 15:00").expect("end"),
        )
        .expect("range")
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let result = layout_line(range(), &[ts("2023-10-01 14:00")], &[1.0, 2.0], None, None);
        assert!(matches!(result, Err(GanttError::Configuration(_))));
    }

    #[test]
    fn out_of_order_dates_are_rejected() {
        let result = layout_line(
            range(),
            &[ts("2023-10-01 14:30"), ts("2023-10-01 14:10")],
            &[1.0, 2.0],
            None,
            None,
        );
        assert!(matches!(result, Err(GanttError::Configuration(_))));
    }

    #[test]
    fn values_are_min_max_normalized() {
        let geometry = layout_line(
            range(),
            &[
                ts("2023-10-01 14:00"),
                ts("2023-10-01 14:30"),
                ts("2023-10-01 15:00"),
            ],
            &[10.0, 30.0, 20.0],
            None,
            None,
        )
        .expect("line");
        let ys: Vec<f64> = geometry.points.iter().map(|p| p.y).collect();
        assert_eq!(ys, [0.0, 1.0, 0.5]);
        assert_eq!(geometry.value_domain, (10.0, 30.0));
    }

    #[test]
    fn constant_series_sits_mid_height() {
        let geometry = layout_line(
            range(),
            &[ts("2023-10-01 14:00"), ts("2023-10-01 14:30")],
            &[7.0, 7.0],
            None,
            None,
        )
        .expect("line");
        assert!(geometry.points.iter().all(|p| (p.y - 0.5).abs() <= 1e-12));
    }

    #[test]
    fn segments_crossing_the_range_edge_are_interpolated() {
        let geometry = layout_line(
            range(),
            &[ts("2023-10-01 13:30"), ts("2023-10-01 14:30")],
            &[0.0, 100.0],
            Some(ValueRange {
                min: 0.0,
                max: 100.0,
            }),
            None,
        )
        .expect("line");
        assert_eq!(geometry.points.len(), 2);
        assert!(geometry.points[0].x.abs() <= 1e-12);
        assert!((geometry.points[0].y - 0.5).abs() <= 1e-9);
        assert!((geometry.points[1].x - 0.5).abs() <= 1e-9);
    }

    #[test]
    fn fill_polygon_is_closed_and_ramps_opacity() {
        let geometry = layout_line(
            range(),
            &[ts("2023-10-01 14:00"), ts("2023-10-01 15:00")],
            &[1.0, 2.0],
            None,
            None,
        )
        .expect("line");
        let fill = geometry.fill.expect("fill");
        assert_eq!(fill.polygon.first(), fill.polygon.last());
        assert_eq!(fill.polygon.len(), 5);
        assert!((fill.opacity_at(0.0) - 0.3).abs() <= 1e-9);
        assert!((fill.opacity_at(0.5) - 0.2).abs() <= 1e-9);
        assert!((fill.opacity_at(1.0) - 0.1).abs() <= 1e-9);
    }

    #[test]
    fn single_point_becomes_marker() {
        let geometry =
            layout_line(range(), &[ts("2023-10-01 14:30")], &[3.0], None, None).expect("line");
        assert_eq!(geometry.marker, Some(LinePoint { x: 0.5, y: 0.5 }));
        assert!(geometry.fill.is_none());
    }
}
