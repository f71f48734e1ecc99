use chrono::{DateTime, Utc};

use crate::core::TimeRange;

/// Timeline fraction of the current-time cursor, `None` outside the range.
#[must_use]
pub fn current_time_fraction(range: TimeRange, current_time: Option<DateTime<Utc>>) -> Option<f64> {
    current_time
        .filter(|instant| range.contains(*instant))
        .map(|instant| range.fraction(instant))
}
