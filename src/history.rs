//! Bounded linear undo/redo history of scene snapshots.
//!
//! Entries are whole `Scene` values. Because scenes share unchanged
//! collections structurally, storing one per commit is cheap.
//!
//! Invariants:
//! - `1 <= entries.len() <= capacity`
//! - `index < entries.len()`; `entries[index]` is the state the user sees.
//! - committing discards every entry after `index`.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use tracing::debug;

use crate::consts::HISTORY_CAPACITY;
use crate::scene::Scene;

/// Undo/redo stack with a fixed capacity.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Scene>,
    index: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl History {
    /// A history holding one empty scene. `capacity` is clamped to at least 1.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_initial(Scene::new(), capacity)
    }

    /// A history whose only entry is `initial`.
    #[must_use]
    pub fn with_initial(initial: Scene, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut entries = VecDeque::with_capacity(capacity.min(HISTORY_CAPACITY));
        entries.push_back(initial);
        Self { entries, index: 0, capacity }
    }

    /// Replace the whole history with a single entry.
    pub fn reset(&mut self, scene: Scene) {
        self.entries.clear();
        self.entries.push_back(scene);
        self.index = 0;
    }

    /// Record `scene` as the newest state, discarding any redo branch.
    pub fn commit(&mut self, scene: Scene) {
        self.entries.truncate(self.index + 1);
        self.entries.push_back(scene);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.index = self.entries.len() - 1;
        debug!(index = self.index, len = self.entries.len(), "history commit");
    }

    /// Step back one entry, returning the scene to restore.
    pub fn undo(&mut self) -> Option<Scene> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    /// Step forward one entry, returning the scene to restore.
    pub fn redo(&mut self) -> Option<Scene> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// The entry the cursor points at.
    #[must_use]
    pub fn current(&self) -> &Scene {
        &self.entries[self.index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history holds at least one entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
