pub mod job;
pub mod label_format;
pub mod primitives;
pub mod scale;
pub mod time_scale;
pub mod types;

pub use job::{DisplayType, JobNode, LineFill, ValueRange};
pub use label_format::LabelFormat;
pub use primitives::{Timestamp, datetime_to_unix_millis, parse_timestamp};
pub use scale::LinearScale;
pub use time_scale::{Column, ColumnBoundaries, TimeRange, TimeScale, TimeUnit};
pub use types::NodeId;
