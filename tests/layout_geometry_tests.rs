use approx::assert_relative_eq;
use gantt_rs::core::{DisplayType, JobNode, LineFill, TimeRange, Timestamp, parse_timestamp};
use gantt_rs::error::GanttError;
use gantt_rs::layout::{FillStyle, LayoutContext, RowGeometry, layout_bar, layout_line};

fn ts(input: &str) -> Timestamp {
    Timestamp::parse(input).expect("timestamp")
}

fn range() -> TimeRange {
    TimeRange::new(
        parse_timestamp("2023-10-01 14:00").expect("start"),
        parse_timestamp("2023-10-01 15:12").expect("end"),
    )
    .expect("range")
}

#[test]
fn full_range_bar_spans_the_timeline() {
    let bar = layout_bar(
        range(),
        range().start(),
        range().end(),
        0.0,
        DisplayType::Bar,
    )
    .expect("bar");
    assert_eq!(bar.position, 0.0);
    assert_eq!(bar.width, 1.0);
    assert!(!bar.clipped_start && !bar.clipped_end);
}

#[test]
fn bars_outside_the_range_are_hidden() {
    for (start, end) in [
        ("2023-10-01 12:00", "2023-10-01 13:00"),
        ("2023-10-01 16:00", "2023-10-01 17:00"),
        ("2023-10-01 13:00", "2023-10-01 14:00"),
    ] {
        let bar = layout_bar(
            range(),
            parse_timestamp(start).expect("start"),
            parse_timestamp(end).expect("end"),
            0.01,
            DisplayType::Bar,
        )
        .expect("bar");
        assert_eq!(bar.width, 0.0, "{start}..{end}");
        assert!(!bar.visible, "{start}..{end}");
    }
}

#[test]
fn pixel_span_matches_fractions() {
    let bar = layout_bar(
        range(),
        parse_timestamp("2023-10-01 14:11").expect("start"),
        parse_timestamp("2023-10-01 14:52").expect("end"),
        0.0,
        DisplayType::Gradient,
    )
    .expect("bar");
    let span = bar.to_pixels(480.0);
    assert_relative_eq!(span.left_px, 480.0 * 11.0 / 72.0, epsilon = 1e-9);
    assert_relative_eq!(span.width_px, 480.0 * 41.0 / 72.0, epsilon = 1e-9);
    assert!(matches!(bar.fill, FillStyle::Gradient { ref stops } if stops.len() == 4));
}

#[test]
fn zero_length_bar_at_range_start_stays_inside() {
    let start = range().start();
    let bar = layout_bar(range(), start, start, 0.05, DisplayType::Bar).expect("bar");
    assert!(bar.marker);
    assert_eq!(bar.position, 0.0);
    assert_relative_eq!(bar.width, 0.05, epsilon = 1e-12);
}

#[test]
fn reversed_node_span_fails_only_that_row() {
    let context = LayoutContext::new(range(), 480.0, 2.0, None).expect("context");
    let reversed = JobNode::new("bad", "Bad").with_span(ts("2023-10-01 14:30"), ts("2023-10-01 14:10"));
    let fine = JobNode::new("ok", "Ok").with_span(ts("2023-10-01 14:10"), ts("2023-10-01 14:30"));

    assert!(matches!(
        context.layout_node(&reversed),
        Err(GanttError::Configuration(_))
    ));
    assert!(matches!(
        context.layout_node(&fine),
        Ok(RowGeometry::Bar(_))
    ));
}

#[test]
fn line_outside_the_range_has_no_points() {
    let geometry = layout_line(
        range(),
        &[ts("2023-10-01 10:00"), ts("2023-10-01 11:00")],
        &[1.0, 2.0],
        None,
        None,
    )
    .expect("line");
    assert!(geometry.is_empty());
    assert!(geometry.fill.is_none());
    assert_eq!(geometry.marker, None);
}

#[test]
fn line_crossing_both_edges_is_clipped_with_interpolation() {
    let geometry = layout_line(
        range(),
        &[ts("2023-10-01 13:48"), ts("2023-10-01 15:24")],
        &[0.0, 96.0],
        None,
        None,
    )
    .expect("line");
    assert_eq!(geometry.points.len(), 2);
    let (left, right) = (geometry.points[0], geometry.points[1]);
    assert_relative_eq!(left.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(right.x, 1.0, epsilon = 1e-12);
    assert_relative_eq!(left.y, 12.0 / 96.0, epsilon = 1e-9);
    assert_relative_eq!(right.y, 84.0 / 96.0, epsilon = 1e-9);
    assert_eq!(geometry.x_extent(), Some((left.x, right.x)));
}

#[test]
fn disabled_fill_produces_no_polygon() {
    let geometry = layout_line(
        range(),
        &[ts("2023-10-01 14:00"), ts("2023-10-01 14:30")],
        &[1.0, 2.0],
        None,
        Some(LineFill {
            enabled: false,
            ..LineFill::default()
        }),
    )
    .expect("line");
    assert!(geometry.fill.is_none());
    assert_eq!(geometry.points.len(), 2);
}

#[test]
fn non_finite_values_are_invalid_data() {
    let result = layout_line(
        range(),
        &[ts("2023-10-01 14:00"), ts("2023-10-01 14:30")],
        &[1.0, f64::NAN],
        None,
        None,
    );
    assert!(matches!(result, Err(GanttError::InvalidData(_))));
}
