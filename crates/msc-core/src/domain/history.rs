//! Bounded undo/redo history over sequence snapshots.
//!
//! The editor records a full clone of the sequence at each structural edit
//! and moves a cursor over those snapshots for undo/redo.  The ring holds
//! at most [`HistoryRing::DEFAULT_CAPACITY`] entries; recording past the
//! cap evicts the oldest snapshot.
//!
//! # Branch truncation (for beginners)
//!
//! History is linear, not a tree.  If the user undoes twice and then makes
//! a new edit, the two redo entries are discarded before the new snapshot
//! is appended — there is no way back to the abandoned branch.  This
//! matches what every mainstream editor does.

use crate::domain::sequence::Sequence;

/// Fixed-capacity snapshot ring with an undo/redo cursor.
///
/// Invariant: when `entries` is non-empty, `index` points at the snapshot
/// that represents the current state.
#[derive(Debug, Clone)]
pub struct HistoryRing {
    entries: Vec<Sequence>,
    index: usize,
    capacity: usize,
}

impl HistoryRing {
    /// Default number of retained snapshots.
    pub const DEFAULT_CAPACITY: usize = 50;

    /// Creates an empty ring with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates an empty ring holding at most `capacity` snapshots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Records a snapshot as the new current state.
    ///
    /// Any redo entries beyond the cursor are dropped first; if the ring
    /// is full the oldest snapshot is evicted.
    pub fn record(&mut self, snapshot: Sequence) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        if self.entries.len() == self.capacity {
            tracing::debug!(capacity = self.capacity, "history full, evicting oldest snapshot");
            self.entries.remove(0);
        }
        self.entries.push(snapshot);
        self.index = self.entries.len() - 1;
    }

    /// Whether an older snapshot exists to step back to.
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Whether a newer snapshot exists to step forward to.
    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.index + 1 < self.entries.len()
    }

    /// Steps the cursor back and returns the snapshot it lands on.
    pub fn undo(&mut self) -> Option<&Sequence> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Steps the cursor forward and returns the snapshot it lands on.
    pub fn redo(&mut self) -> Option<&Sequence> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    /// The snapshot the cursor currently points at.
    pub fn current(&self) -> Option<&Sequence> {
        self.entries.get(self.index)
    }

    /// Discards all snapshots and resets the cursor.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ring holds no snapshots.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new()
    }
}
