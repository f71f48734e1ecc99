use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::NodeId;

/// Wire form of the expand state: row id (string form) to expanded flag.
pub type ExpandedRowsData = IndexMap<String, bool>;

/// Immutable expand-state snapshot read by one flatten/layout pass.
///
/// Entries are keyed by [`NodeId::key`]. A node repeated at several tree
/// positions shares one entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpandState {
    entries: ExpandedRowsData,
    default_expanded: bool,
}

impl ExpandState {
    #[must_use]
    pub fn new(default_expanded: bool) -> Self {
        Self {
            entries: IndexMap::new(),
            default_expanded,
        }
    }

    #[must_use]
    pub fn from_rows_data(entries: ExpandedRowsData, default_expanded: bool) -> Self {
        Self {
            entries,
            default_expanded,
        }
    }

    #[must_use]
    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.entries
            .get(&id.key())
            .copied()
            .unwrap_or(self.default_expanded)
    }

    #[must_use]
    pub fn default_expanded(&self) -> bool {
        self.default_expanded
    }

    #[must_use]
    pub fn rows_data(&self) -> &ExpandedRowsData {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Change notification emitted for every toggle (`lastExpandedRow`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandEvent {
    pub id: NodeId,
    pub expanded: bool,
}

/// Host-side observer of expand/collapse changes.
///
/// Listeners see the event and the state after the change; they cannot
/// mutate the store.
pub trait ExpandListener {
    fn id(&self) -> &str;
    fn on_expand_changed(&mut self, event: &ExpandEvent, state: &ExpandState);
}

/// Single-writer store for expand state.
///
/// Mutations copy the shared snapshot only when a reader still holds it, so a
/// layout pass that took [`ExpandStore::snapshot`] never observes a change.
#[derive(Default)]
pub struct ExpandStore {
    state: Arc<ExpandState>,
    last_event: Option<ExpandEvent>,
    revision: u64,
    listeners: Vec<Box<dyn ExpandListener>>,
}

impl std::fmt::Debug for ExpandStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpandStore")
            .field("state", &self.state)
            .field("last_event", &self.last_event)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ExpandStore {
    #[must_use]
    pub fn new(default_expanded: bool) -> Self {
        Self::from_rows_data(ExpandedRowsData::new(), default_expanded)
    }

    #[must_use]
    pub fn from_rows_data(entries: ExpandedRowsData, default_expanded: bool) -> Self {
        Self {
            state: Arc::new(ExpandState::from_rows_data(entries, default_expanded)),
            last_event: None,
            revision: 0,
            listeners: Vec::new(),
        }
    }

    /// Copy-on-read snapshot for one pass.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ExpandState> {
        Arc::clone(&self.state)
    }

    #[must_use]
    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.state.is_expanded(id)
    }

    /// Increments on every mutation; used to key memoized flatten results.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn last_expanded_row(&self) -> Option<&ExpandEvent> {
        self.last_event.as_ref()
    }

    #[must_use]
    pub fn rows_data(&self) -> ExpandedRowsData {
        self.state.rows_data().clone()
    }

    /// Flips the stored flag for `id` and notifies listeners.
    pub fn toggle(&mut self, id: &NodeId) -> ExpandEvent {
        let expanded = !self.state.is_expanded(id);
        self.write(id, expanded)
    }

    /// Stores an explicit flag for `id`; returns `None` when the effective
    /// state, stored or default, already matches.
    pub fn set_expanded(&mut self, id: &NodeId, expanded: bool) -> Option<ExpandEvent> {
        if self.state.is_expanded(id) == expanded {
            return None;
        }
        Some(self.write(id, expanded))
    }

    /// Clears every entry back to the configured default.
    pub fn reset(&mut self) {
        let default_expanded = self.state.default_expanded;
        self.state = Arc::new(ExpandState::new(default_expanded));
        self.revision += 1;
        debug!(revision = self.revision, "expand state reset");
    }

    /// Replaces the whole state, e.g. when the host pushes `expandedRowsData`.
    pub fn replace(&mut self, entries: ExpandedRowsData) {
        let default_expanded = self.state.default_expanded;
        self.state = Arc::new(ExpandState::from_rows_data(entries, default_expanded));
        self.revision += 1;
        debug!(
            revision = self.revision,
            entries = self.state.len(),
            "expand state replaced"
        );
    }

    pub fn add_listener(&mut self, listener: Box<dyn ExpandListener>) {
        self.listeners.push(listener);
    }

    /// Removes every listener registered under `id`; returns whether any was removed.
    pub fn remove_listener(&mut self, id: &str) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id() != id);
        before != self.listeners.len()
    }

    fn write(&mut self, id: &NodeId, expanded: bool) -> ExpandEvent {
        Arc::make_mut(&mut self.state)
            .entries
            .insert(id.key(), expanded);
        self.revision += 1;

        let event = ExpandEvent {
            id: id.clone(),
            expanded,
        };
        debug!(id = %id, expanded, revision = self.revision, "row expand state changed");

        for listener in &mut self.listeners {
            trace!(listener = listener.id(), "dispatch expand event");
            listener.on_expand_changed(&event, &self.state);
        }
        self.last_event = Some(event.clone());
        event
    }
}
