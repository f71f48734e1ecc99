use crate::api::RenderModel;
use crate::error::GanttResult;
use crate::render::Renderer;

/// No-op renderer used by tests and headless engine usage.
///
/// It still validates the model so tests catch invalid geometry before a real
/// backend is introduced.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
    pub last_row_count: usize,
    pub last_header_cell_count: usize,
    pub last_fault_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, model: &RenderModel) -> GanttResult<()> {
        model.validate()?;
        self.frames += 1;
        self.last_row_count = model.rows.len();
        self.last_header_cell_count = model.header.cells.len();
        self.last_fault_count = model.faults.len();
        Ok(())
    }
}
