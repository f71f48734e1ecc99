//! Host-facing engine, configuration and render model.

mod config;
mod engine;
mod json_contract;
mod layout_cache;
mod render_model;

pub use config::GanttConfig;
pub use engine::GanttEngine;
pub use json_contract::{RENDER_MODEL_JSON_SCHEMA_V1, RenderModelJsonContractV1};
pub use layout_cache::LayoutCacheStats;
pub use render_model::{
    CurrentTimeMarker, HeaderCell, HeaderModel, RenderModel, RenderRow, RowFault,
};
