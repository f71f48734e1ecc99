mod null_renderer;

pub use null_renderer::NullRenderer;

use crate::api::RenderModel;
use crate::error::GanttResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `RenderModel`: header cells, rows
/// with geometry in timeline fractions, and the current-time cursor. Drawing
/// code never touches the hierarchy or the expand state.
pub trait Renderer {
    fn render(&mut self, model: &RenderModel) -> GanttResult<()>;
}
