use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, debug_span, trace};

#[cfg(feature = "parallel-layout")]
use rayon::prelude::*;

use crate::core::{Column, JobNode, LabelFormat, NodeId, TimeRange, TimeScale};
use crate::error::GanttResult;
use crate::hierarchy::{FlattenOutcome, JobTree, NodeIndex, flatten};
use crate::layout::{LayoutContext, RowGeometry, current_time_fraction};
use crate::render::Renderer;
use crate::resolve::{ColorMapping, TooltipFields, resolve_color};
use crate::state::{
    ExpandEvent, ExpandListener, ExpandState, ExpandStore, ExpandedRowsData, ScrollSynchronizer,
    ViewportState,
};

use super::layout_cache::{CachedGeometry, LayoutCache, LayoutCacheStats, LayoutKey};
use super::{
    CurrentTimeMarker, GanttConfig, HeaderCell, HeaderModel, RenderModel, RenderRow, RowFault,
};

/// Rows drawn above and below the visible window.
const ROW_OVERSCAN: usize = 5;

struct FlattenMemo {
    data_revision: u64,
    expand_revision: u64,
    outcome: Arc<FlattenOutcome>,
}

/// Main orchestration facade consumed by host applications.
///
/// `GanttEngine` owns the job hierarchy, the expand and viewport state, and
/// the memoized flatten/layout results, and hands finished
/// [`RenderModel`]s to its renderer.
pub struct GanttEngine<R: Renderer> {
    renderer: R,
    title: String,
    range: TimeRange,
    time_scale: TimeScale,
    label_format: LabelFormat,
    columns: Vec<Column>,
    current_time: Option<DateTime<Utc>>,
    color_mapping: Option<ColorMapping>,
    tooltip_fields: TooltipFields,
    min_bar_width_px: f64,
    row_height_px: f64,
    max_height: Value,
    styles: Value,
    class_names: Value,
    tree: JobTree,
    data_revision: u64,
    expand: ExpandStore,
    viewport: ScrollSynchronizer,
    flattened: Option<FlattenMemo>,
    flatten_passes: u64,
    layout_cache: LayoutCache,
}

impl<R: Renderer> GanttEngine<R> {
    pub fn new(renderer: R, config: GanttConfig) -> GanttResult<Self> {
        config.validate()?;
        let range = config.time_range()?;
        let columns = config.time_scale.columns(range)?;
        let label_format = config.time_scale.label_format()?;

        let mut viewport = ScrollSynchronizer::new(ViewportState {
            column_width: config.column_width,
            ..ViewportState::default()
        })?;
        viewport.resize_label_panel(config.label_panel_width_px);

        debug!(
            roots = config.data.len(),
            columns = columns.len(),
            unit = %config.time_scale.unit,
            "gantt engine created"
        );

        let mut engine = Self {
            renderer,
            title: config.title,
            range,
            time_scale: config.time_scale,
            label_format,
            columns,
            current_time: config.current_time.map(|t| t.instant()),
            color_mapping: config.color_mapping,
            tooltip_fields: config.tooltip_fields,
            min_bar_width_px: config.min_bar_width_px,
            row_height_px: config.row_height_px,
            max_height: config.max_height,
            styles: config.styles,
            class_names: config.class_names,
            tree: JobTree::build(config.data),
            data_revision: 0,
            expand: ExpandStore::from_rows_data(
                config.expanded_rows_data,
                config.default_expanded,
            ),
            viewport,
            flattened: None,
            flatten_passes: 0,
            layout_cache: LayoutCache::default(),
        };
        engine.sync_content_size();
        Ok(engine)
    }

    /// Replaces the job hierarchy. Expand state is kept, keyed by id.
    pub fn set_data(&mut self, data: Vec<JobNode>) {
        self.tree = JobTree::build(data);
        self.data_revision += 1;
        self.flattened = None;
        self.layout_cache.clear();
        self.sync_content_size();
        debug!(
            nodes = self.tree.len(),
            revision = self.data_revision,
            "job data replaced"
        );
    }

    #[must_use]
    pub fn tree(&self) -> &JobTree {
        &self.tree
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    #[must_use]
    pub fn time_range(&self) -> TimeRange {
        self.range
    }

    pub fn set_time_range(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> GanttResult<()> {
        let range = TimeRange::new(start, end)?;
        self.columns = self.time_scale.columns(range)?;
        self.range = range;
        self.sync_content_size();
        Ok(())
    }

    #[must_use]
    pub fn time_scale(&self) -> &TimeScale {
        &self.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: TimeScale) -> GanttResult<()> {
        let label_format = time_scale.label_format()?;
        self.columns = time_scale.columns(self.range)?;
        self.label_format = label_format;
        self.time_scale = time_scale;
        self.sync_content_size();
        Ok(())
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn current_time(&self) -> Option<DateTime<Utc>> {
        self.current_time
    }

    pub fn set_current_time(&mut self, current_time: Option<DateTime<Utc>>) {
        self.current_time = current_time;
    }

    pub fn set_column_width(&mut self, column_width: f64) -> GanttResult<()> {
        self.viewport.set_column_width(column_width)?;
        self.sync_content_size();
        Ok(())
    }

    pub fn set_color_mapping(&mut self, color_mapping: Option<ColorMapping>) {
        self.color_mapping = color_mapping;
    }

    pub fn set_tooltip_fields(&mut self, tooltip_fields: TooltipFields) {
        self.tooltip_fields = tooltip_fields;
    }

    /// Full timeline width: one `column_width` per full step, truncated
    /// columns proportionally narrower.
    #[must_use]
    pub fn total_width_px(&self) -> f64 {
        let column_width = self.viewport.state().column_width;
        self.columns
            .iter()
            .map(|column| column_width * column.step_ratio())
            .sum()
    }

    pub fn toggle_row(&mut self, id: impl Into<NodeId>) -> ExpandEvent {
        let event = self.expand.toggle(&id.into());
        self.sync_content_size();
        event
    }

    pub fn set_row_expanded(&mut self, id: impl Into<NodeId>, expanded: bool) -> Option<ExpandEvent> {
        let event = self.expand.set_expanded(&id.into(), expanded);
        if event.is_some() {
            self.sync_content_size();
        }
        event
    }

    pub fn reset_expanded_rows(&mut self) {
        self.expand.reset();
        self.sync_content_size();
    }

    #[must_use]
    pub fn expanded_rows_data(&self) -> ExpandedRowsData {
        self.expand.rows_data()
    }

    pub fn set_expanded_rows_data(&mut self, rows: ExpandedRowsData) {
        self.expand.replace(rows);
        self.sync_content_size();
    }

    #[must_use]
    pub fn last_expanded_row(&self) -> Option<&ExpandEvent> {
        self.expand.last_expanded_row()
    }

    #[must_use]
    pub fn expand_snapshot(&self) -> Arc<ExpandState> {
        self.expand.snapshot()
    }

    pub fn add_expand_listener(&mut self, listener: Box<dyn ExpandListener>) {
        self.expand.add_listener(listener);
    }

    pub fn remove_expand_listener(&mut self, id: &str) -> bool {
        self.expand.remove_listener(id)
    }

    #[must_use]
    pub fn viewport(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn scroll_timeline(&mut self, scroll_left: f64, scroll_top: f64) -> GanttResult<()> {
        self.viewport.scroll_timeline(scroll_left, scroll_top)
    }

    pub fn scroll_labels(&mut self, scroll_top: f64) -> GanttResult<()> {
        self.viewport.scroll_labels(scroll_top)
    }

    pub fn resize_viewport(&mut self, visible_width: f64, visible_height: f64) -> GanttResult<()> {
        self.viewport.resize(visible_width, visible_height)
    }

    /// Returns the applied (clamped) label panel width.
    pub fn resize_label_panel(&mut self, width: f64) -> f64 {
        self.viewport.resize_label_panel(width)
    }

    /// Visible rows for the current data and expand state.
    ///
    /// Memoized on the data and expand revisions; scrolling and resizing never
    /// re-run the flattener.
    pub fn flatten(&mut self) -> Arc<FlattenOutcome> {
        let expand_revision = self.expand.revision();
        if let Some(memo) = &self.flattened {
            if memo.data_revision == self.data_revision && memo.expand_revision == expand_revision
            {
                trace!("flatten memo hit");
                return Arc::clone(&memo.outcome);
            }
        }

        let snapshot = self.expand.snapshot();
        let outcome = Arc::new(flatten(&self.tree, &snapshot));
        self.flatten_passes += 1;
        self.flattened = Some(FlattenMemo {
            data_revision: self.data_revision,
            expand_revision,
            outcome: Arc::clone(&outcome),
        });
        outcome
    }

    /// Feeds the laid-out content size to the scroll clamp.
    ///
    /// Called by every handler that changes the row count or the timeline
    /// width; layout passes only read the viewport.
    fn sync_content_size(&mut self) {
        let row_count = self.flatten().rows.len();
        let width = self.total_width_px();
        self.viewport
            .set_content_size(width, row_count as f64 * self.row_height_px);
    }

    #[must_use]
    pub fn flatten_passes(&self) -> u64 {
        self.flatten_passes
    }

    #[must_use]
    pub fn layout_cache_stats(&self) -> LayoutCacheStats {
        self.layout_cache.stats()
    }

    fn layout_key(&self) -> LayoutKey {
        LayoutKey {
            range: self.range,
            time_scale: self.time_scale.clone(),
            column_width_bits: self.viewport.state().column_width.to_bits(),
            min_bar_width_bits: self.min_bar_width_px.to_bits(),
            current_time: self.current_time,
            data_revision: self.data_revision,
        }
    }

    fn fill_layout_cache(&mut self, context: &LayoutContext, outcome: &FlattenOutcome) {
        let pending: Vec<NodeIndex> = outcome
            .rows
            .iter()
            .map(|row| row.node)
            .filter(|node| !self.layout_cache.contains(*node))
            .collect();
        if pending.is_empty() {
            return;
        }

        let tree = &self.tree;
        #[cfg(feature = "parallel-layout")]
        let computed: Vec<(NodeIndex, CachedGeometry)> = pending
            .par_iter()
            .map(|index| (*index, layout_row(tree, context, *index)))
            .collect();
        #[cfg(not(feature = "parallel-layout"))]
        let computed: Vec<(NodeIndex, CachedGeometry)> = pending
            .iter()
            .map(|index| (*index, layout_row(tree, context, *index)))
            .collect();

        trace!(rows = computed.len(), "row geometry computed");
        for (index, geometry) in computed {
            self.layout_cache.insert(index, geometry);
        }
    }

    /// Places every column and formats labels for the visible window only.
    fn header(&self, total_width_px: f64) -> HeaderModel {
        let mut cells: Vec<HeaderCell> = self
            .columns
            .iter()
            .map(|column| {
                let left = self.range.fraction(column.start) * total_width_px;
                let right = self.range.fraction(column.end) * total_width_px;
                HeaderCell::from_column(column, left, right - left)
            })
            .collect();
        let visible = self.viewport.visible_columns(&cells);
        for (cell, column) in cells
            .iter_mut()
            .zip(&self.columns)
            .skip(visible.start)
            .take(visible.len())
        {
            cell.label = Some(column.label(&self.label_format));
        }
        HeaderModel {
            visible,
            offset_px: self.viewport.header_offset(),
            cells,
        }
    }

    /// Runs flatten and layout and assembles the frame description.
    ///
    /// Row-level failures are reported in [`RenderModel::faults`]; only
    /// engine-wide problems return an error.
    pub fn build_render_model(&mut self) -> GanttResult<RenderModel> {
        let span = debug_span!(
            "build_render_model",
            data_revision = self.data_revision,
            expand_revision = self.expand.revision()
        );
        let _guard = span.enter();

        let outcome = self.flatten();
        let total_width_px = self.total_width_px();
        let context = LayoutContext::new(
            self.range,
            total_width_px,
            self.min_bar_width_px,
            self.current_time,
        )?;

        self.layout_cache.prepare(self.layout_key());
        self.fill_layout_cache(&context, &outcome);

        let mut faults: Vec<RowFault> = outcome
            .faults
            .iter()
            .map(|fault| RowFault::from_error(&fault.id, fault.row, &fault.to_error()))
            .collect();

        let mut rows = Vec::with_capacity(outcome.rows.len());
        for (index, flat) in outcome.rows.iter().enumerate() {
            let Some(node) = self.tree.node(flat.node) else {
                continue;
            };
            let geometry = match self.layout_cache.get(flat.node) {
                Some(Ok(geometry)) => geometry.clone(),
                Some(Err(error)) => {
                    faults.push(RowFault::from_error(&node.id, Some(index), error));
                    RowGeometry::Empty
                }
                None => RowGeometry::Empty,
            };
            rows.push(RenderRow {
                index,
                id: node.id.clone(),
                name: node.name.clone(),
                label: node.label.clone(),
                icon: node.icon.clone(),
                depth: flat.depth,
                has_children: flat.has_children,
                expanded: flat.expanded,
                color: resolve_color(self.color_mapping.as_ref(), node),
                geometry,
                tooltip: self.tooltip_fields.assemble(node),
                top_px: index as f64 * self.row_height_px,
            });
        }

        let header = self.header(total_width_px);
        let visible_rows = self
            .viewport
            .visible_rows(self.row_height_px, rows.len(), ROW_OVERSCAN);

        let current_time = self.current_time.and_then(|time| {
            current_time_fraction(self.range, Some(time)).map(|fraction| CurrentTimeMarker {
                time,
                fraction,
                left_px: fraction * total_width_px,
            })
        });

        debug!(
            rows = rows.len(),
            faults = faults.len(),
            cache_hits = self.layout_cache.stats().hits,
            "render model built"
        );

        Ok(RenderModel {
            title: self.title.clone(),
            range_start: self.range.start(),
            range_end: self.range.end(),
            total_width_px,
            row_height_px: self.row_height_px,
            header,
            rows,
            visible_rows,
            current_time,
            faults,
            viewport: self.viewport.state(),
            label_panel_width_px: self.viewport.label_panel_width(),
            max_height: self.max_height.clone(),
            styles: self.styles.clone(),
            class_names: self.class_names.clone(),
        })
    }

    pub fn render(&mut self) -> GanttResult<()> {
        let model = self.build_render_model()?;
        self.renderer.render(&model)
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

fn layout_row(tree: &JobTree, context: &LayoutContext, index: NodeIndex) -> CachedGeometry {
    match tree.node(index) {
        Some(node) => context.layout_node(node),
        None => Ok(RowGeometry::Empty),
    }
}
