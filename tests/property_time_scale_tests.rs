use chrono::{DateTime, TimeDelta, Utc};
use gantt_rs::core::{TimeRange, TimeScale, TimeUnit};
use proptest::prelude::*;

fn unit_strategy() -> impl Strategy<Value = TimeUnit> {
    prop_oneof![
        Just(TimeUnit::Minutes),
        Just(TimeUnit::Hours),
        Just(TimeUnit::Days),
        Just(TimeUnit::Weeks),
        Just(TimeUnit::Months),
    ]
}

fn base() -> DateTime<Utc> {
    DateTime::from_timestamp(1_696_168_800, 0).expect("base instant")
}

proptest! {
    #[test]
    fn boundaries_are_strictly_increasing_and_cover_the_range(
        unit in unit_strategy(),
        value in 1i64..30,
        start_offset_min in 0i64..100_000,
        span_min in 1i64..50_000
    ) {
        let start = base() + TimeDelta::minutes(start_offset_min);
        let end = start + TimeDelta::minutes(span_min);
        let range = TimeRange::new(start, end).expect("range");
        let boundaries: Vec<_> = TimeScale::new(unit, value, "YYYY-MM-DD HH:mm")
            .boundaries(range)
            .expect("boundaries")
            .take(300_000)
            .collect();

        prop_assert_eq!(boundaries.first().copied(), Some(start));
        prop_assert_eq!(boundaries.last().copied(), Some(end));
        prop_assert!(boundaries.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn column_step_ratios_reconstruct_the_range(
        value in 1i64..90,
        span_min in 1i64..20_000
    ) {
        let start = base();
        let range = TimeRange::new(start, start + TimeDelta::minutes(span_min)).expect("range");
        let columns = TimeScale::new(TimeUnit::Minutes, value, "HH:mm")
            .columns(range)
            .expect("columns");

        let steps: f64 = columns.iter().map(|column| column.step_ratio()).sum();
        let expected = span_min as f64 / value as f64;
        prop_assert!((steps - expected).abs() <= 1e-6);
        prop_assert!(columns.iter().rev().skip(1).all(|column| !column.partial));
    }
}
