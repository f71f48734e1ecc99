//! gantt-rs: UI-agnostic Gantt/timeline layout engine.
//!
//! The crate turns a job hierarchy, a time range and a time scale into a
//! deterministic [`api::RenderModel`]: header columns, visible rows with bar or
//! line geometry, colors, tooltips and the current-time cursor. Drawing is left
//! to a [`render::Renderer`] implementation supplied by the host.

pub mod api;
pub mod core;
pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod render;
pub mod resolve;
pub mod state;
pub mod telemetry;

pub use api::{GanttConfig, GanttEngine, RenderModel};
pub use error::{GanttError, GanttResult};
