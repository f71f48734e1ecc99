use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::core::{TimeRange, TimeScale};
use crate::error::GanttError;
use crate::hierarchy::NodeIndex;
use crate::layout::RowGeometry;

/// Runtime metrics exposed by the per-row geometry cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

/// Every input that changes row geometry. Scroll offsets are not part of it,
/// so scrolling reuses cached rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct LayoutKey {
    pub(super) range: TimeRange,
    pub(super) time_scale: TimeScale,
    pub(super) column_width_bits: u64,
    pub(super) min_bar_width_bits: u64,
    pub(super) current_time: Option<DateTime<Utc>>,
    pub(super) data_revision: u64,
}

pub(super) type CachedGeometry = Result<RowGeometry, GanttError>;

#[derive(Debug, Default)]
pub(super) struct LayoutCache {
    key: Option<LayoutKey>,
    entries: HashMap<NodeIndex, CachedGeometry>,
    hits: u64,
    misses: u64,
}

impl LayoutCache {
    /// Drops every entry when `key` differs from the key the entries were built for.
    pub(super) fn prepare(&mut self, key: LayoutKey) {
        if self.key.as_ref() != Some(&key) {
            self.entries.clear();
            self.key = Some(key);
        }
    }

    pub(super) fn get(&mut self, node: NodeIndex) -> Option<&CachedGeometry> {
        let value = self.entries.get(&node);
        if value.is_some() {
            self.hits = self.hits.saturating_add(1);
        }
        value
    }

    pub(super) fn contains(&self, node: NodeIndex) -> bool {
        self.entries.contains_key(&node)
    }

    pub(super) fn insert(&mut self, node: NodeIndex, value: CachedGeometry) {
        self.misses = self.misses.saturating_add(1);
        self.entries.insert(node, value);
    }

    pub(super) fn clear(&mut self) {
        self.entries.clear();
        self.key = None;
    }

    pub(super) fn stats(&self) -> LayoutCacheStats {
        LayoutCacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
        }
    }
}
