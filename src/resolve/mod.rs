//! Per-row presentation attributes: color and tooltip.

pub mod color;
pub mod tooltip;

pub use color::{ColorMapping, DEFAULT_COLOR, resolve_color};
pub use tooltip::{TooltipContent, TooltipEntry, TooltipFields};
