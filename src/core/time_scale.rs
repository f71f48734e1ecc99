use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{LabelFormat, LinearScale, datetime_to_unix_millis};
use crate::error::{GanttError, GanttResult};

/// Column granularity of the timeline header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

impl TimeUnit {
    /// Returns `from + amount units`, or `None` when the result overflows.
    ///
    /// Month steps are calendar-aware and clamp to the last day of shorter months.
    #[must_use]
    pub fn advance(self, from: DateTime<Utc>, amount: u64) -> Option<DateTime<Utc>> {
        let amount_i64 = i64::try_from(amount).ok()?;
        let delta = match self {
            Self::Minutes => TimeDelta::try_minutes(amount_i64)?,
            Self::Hours => TimeDelta::try_hours(amount_i64)?,
            Self::Days => TimeDelta::try_days(amount_i64)?,
            Self::Weeks => TimeDelta::try_weeks(amount_i64)?,
            Self::Months => {
                let months = u32::try_from(amount).ok()?;
                return from.checked_add_months(Months::new(months));
            }
        };
        from.checked_add_signed(delta)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = GanttError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "minutes" | "minute" => Ok(Self::Minutes),
            "hours" | "hour" => Ok(Self::Hours),
            "days" | "day" => Ok(Self::Days),
            "weeks" | "week" => Ok(Self::Weeks),
            "months" | "month" => Ok(Self::Months),
            other => Err(GanttError::configuration(format!(
                "unrecognized time scale unit `{other}`"
            ))),
        }
    }
}

/// Absolute window shown by the chart. Invariant: `start < end`.
///
/// Deserialization goes through [`TimeRange::new`], so a payload cannot
/// bypass the invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawTimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = GanttError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> GanttResult<Self> {
        if start >= end {
            return Err(GanttError::configuration(format!(
                "time range start ({start}) must be before end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub fn end(self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn duration_millis(self) -> f64 {
        datetime_to_unix_millis(self.end) - datetime_to_unix_millis(self.start)
    }

    #[must_use]
    pub fn contains(self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// Linear millisecond scale mapping `start → 0` and `end → 1`.
    pub fn linear(self) -> GanttResult<LinearScale> {
        LinearScale::new(
            datetime_to_unix_millis(self.start),
            datetime_to_unix_millis(self.end),
        )
    }

    /// Unclamped `(instant − start) / (end − start)`.
    #[must_use]
    pub fn fraction(self, instant: DateTime<Utc>) -> f64 {
        (datetime_to_unix_millis(instant) - datetime_to_unix_millis(self.start))
            / self.duration_millis()
    }
}

fn default_step() -> i64 {
    1
}

fn default_format() -> String {
    "HH:mm".to_owned()
}

/// Column granularity: `value` steps of `unit`, labelled with `format`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeScale {
    pub unit: TimeUnit,
    #[serde(default = "default_step")]
    pub value: i64,
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for TimeScale {
    fn default() -> Self {
        Self {
            unit: TimeUnit::Hours,
            value: 1,
            format: default_format(),
        }
    }
}

impl TimeScale {
    #[must_use]
    pub fn new(unit: TimeUnit, value: i64, format: impl Into<String>) -> Self {
        Self {
            unit,
            value,
            format: format.into(),
        }
    }

    pub fn validate(&self) -> GanttResult<()> {
        if self.value <= 0 {
            return Err(GanttError::configuration(format!(
                "time scale value must be a positive integer, got {}",
                self.value
            )));
        }
        LabelFormat::compile(&self.format)?;
        Ok(())
    }

    fn step(&self) -> u64 {
        self.value.unsigned_abs()
    }

    /// Boundary `index` counted from `origin`, without truncation.
    #[must_use]
    pub fn nominal_boundary(&self, origin: DateTime<Utc>, index: u64) -> Option<DateTime<Utc>> {
        index
            .checked_mul(self.step())
            .and_then(|amount| self.unit.advance(origin, amount))
    }

    /// Lazy, restartable sequence of column boundaries covering `range`.
    ///
    /// The first boundary is `range.start`, the last is `range.end`; the final
    /// column is truncated rather than overshooting the range.
    pub fn boundaries(&self, range: TimeRange) -> GanttResult<ColumnBoundaries> {
        self.validate()?;
        Ok(ColumnBoundaries {
            scale: self.clone(),
            range,
            next_index: 0,
            finished: false,
        })
    }

    /// Compiled label format for this scale's `format`.
    pub fn label_format(&self) -> GanttResult<LabelFormat> {
        LabelFormat::compile(&self.format)
    }

    /// Materializes consecutive boundary pairs as columns.
    ///
    /// Labels are not formatted here; call [`Column::label`] for the columns
    /// actually shown.
    pub fn columns(&self, range: TimeRange) -> GanttResult<Vec<Column>> {
        let boundaries: Vec<DateTime<Utc>> = self.boundaries(range)?.collect();

        let columns = boundaries
            .windows(2)
            .enumerate()
            .map(|(index, pair)| {
                let nominal_end = self.nominal_boundary(range.start(), index as u64 + 1);
                let nominal_span_millis = nominal_end.map_or_else(
                    || datetime_to_unix_millis(pair[1]) - datetime_to_unix_millis(pair[0]),
                    |end| datetime_to_unix_millis(end) - datetime_to_unix_millis(pair[0]),
                );
                Column {
                    index,
                    start: pair[0],
                    end: pair[1],
                    partial: nominal_end != Some(pair[1]),
                    nominal_span_millis,
                }
            })
            .collect();

        Ok(columns)
    }
}

/// Iterator over column boundary instants.
///
/// Clone it before consuming, or call [`ColumnBoundaries::restart`], to walk
/// the same sequence again.
#[derive(Debug, Clone)]
pub struct ColumnBoundaries {
    scale: TimeScale,
    range: TimeRange,
    next_index: u64,
    finished: bool,
}

impl ColumnBoundaries {
    #[must_use]
    pub fn restart(&self) -> Self {
        Self {
            scale: self.scale.clone(),
            range: self.range,
            next_index: 0,
            finished: false,
        }
    }
}

impl Iterator for ColumnBoundaries {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self
            .scale
            .nominal_boundary(self.range.start(), self.next_index)
        {
            Some(boundary) if boundary < self.range.end() => {
                self.next_index += 1;
                Some(boundary)
            }
            _ => {
                self.finished = true;
                Some(self.range.end())
            }
        }
    }
}

impl std::iter::FusedIterator for ColumnBoundaries {}

/// One header column between two consecutive boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// `true` when the column was truncated at the range end.
    pub partial: bool,
    /// Length a full step starting at `start` would have.
    pub nominal_span_millis: f64,
}

impl Column {
    /// Header text for this column.
    #[must_use]
    pub fn label(&self, format: &LabelFormat) -> String {
        format.format(self.start)
    }

    #[must_use]
    pub fn span_millis(&self) -> f64 {
        datetime_to_unix_millis(self.end) - datetime_to_unix_millis(self.start)
    }

    /// Share of a full step this column covers (`1.0` unless truncated).
    #[must_use]
    pub fn step_ratio(&self) -> f64 {
        if self.nominal_span_millis > 0.0 {
            (self.span_millis() / self.nominal_span_millis).min(1.0)
        } else {
            1.0
        }
    }
}
