//! Snapshot-based undo/redo history
//!
//! Every entry is a full deep copy of the grid taken immediately before a
//! mutation. A drag stroke records one entry per cell that actually changed,
//! so a long stroke undoes one cell at a time.

use dungeon_map_core::Grid;
use std::collections::VecDeque;

/// Default number of undo snapshots kept
pub const MAX_UNDO: usize = 50;

/// Result of an undo or redo request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The live grid was replaced; every layer needs redrawing
    Restored,
    /// Nothing recorded, nothing changed
    EmptyHistory,
}

/// Bounded undo/redo stacks of grid snapshots.
///
/// The capacity caps memory use; when it is exceeded the oldest snapshot is
/// dropped (first in, first out).
#[derive(Debug, Clone)]
pub struct CommandHistory {
    undo_stack: VecDeque<Grid>,
    redo_stack: VecDeque<Grid>,
    capacity: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_UNDO)
    }
}

impl CommandHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(capacity),
            redo_stack: VecDeque::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn push_bounded(stack: &mut VecDeque<Grid>, grid: Grid, capacity: usize) {
        stack.push_back(grid);
        while stack.len() > capacity {
            stack.pop_front();
            tracing::trace!("History full, dropped oldest snapshot");
        }
    }

    /// Save a copy of `grid` before it is mutated. Clears the redo stack.
    pub fn record_before_mutation(&mut self, grid: &Grid) {
        Self::push_bounded(&mut self.undo_stack, grid.clone_deep(), self.capacity);
        self.redo_stack.clear();
        tracing::debug!("Recorded snapshot ({} in history)", self.undo_stack.len());
    }

    /// Pop the most recent snapshot. `live` is kept for redo.
    ///
    /// `None` means the history is empty and nothing should change.
    pub fn undo(&mut self, live: &Grid) -> Option<Grid> {
        let Some(previous) = self.undo_stack.pop_back() else {
            tracing::debug!("Nothing to undo");
            return None;
        };
        Self::push_bounded(&mut self.redo_stack, live.clone_deep(), self.capacity);
        tracing::debug!("Undo ({} left)", self.undo_stack.len());
        Some(previous)
    }

    /// Pop the most recently undone state. `live` goes back on the undo stack.
    pub fn redo(&mut self, live: &Grid) -> Option<Grid> {
        let Some(next) = self.redo_stack.pop_back() else {
            tracing::debug!("Nothing to redo");
            return None;
        };
        Self::push_bounded(&mut self.undo_stack, live.clone_deep(), self.capacity);
        tracing::debug!("Redo ({} left)", self.redo_stack.len());
        Some(next)
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(value: u32) -> Grid {
        let mut grid = Grid::new(4, 4);
        grid.set_tile_index(0, 0, value).unwrap();
        grid
    }

    #[test]
    fn test_undo_restores_exact_snapshot() {
        let mut history = CommandHistory::default();
        let mut grid = Grid::new(10, 10);
        grid.set_room_id(1, 1, 4).unwrap();
        let before = grid.clone_deep();

        history.record_before_mutation(&grid);
        grid.set_tile_index(5, 5, 3).unwrap();
        grid.set_room_id(1, 1, 0).unwrap();

        let restored = history.undo(&grid).unwrap();
        assert_eq!(restored, before);
        assert_eq!(restored.get(5, 5).unwrap().tile_index, 0);
    }

    #[test]
    fn test_undo_is_lifo() {
        let mut history = CommandHistory::default();
        history.record_before_mutation(&grid_with(1));
        history.record_before_mutation(&grid_with(2));

        let live = grid_with(3);
        assert_eq!(history.undo(&live).unwrap(), grid_with(2));
        assert_eq!(history.undo(&live).unwrap(), grid_with(1));
        assert!(history.undo(&live).is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = CommandHistory::default();
        for i in 0..=MAX_UNDO as u32 {
            history.record_before_mutation(&grid_with(i));
        }
        assert_eq!(history.undo_len(), MAX_UNDO);

        let live = grid_with(999);
        let mut last = None;
        for _ in 0..MAX_UNDO {
            last = history.undo(&live);
        }
        // The first snapshot (0) was evicted, so the oldest left is the second
        assert_eq!(last.unwrap(), grid_with(1));
        assert!(history.undo(&live).is_none());
    }

    #[test]
    fn test_redo_after_undo() {
        let mut history = CommandHistory::default();
        history.record_before_mutation(&grid_with(1));
        let live = grid_with(2);

        let previous = history.undo(&live).unwrap();
        assert_eq!(history.redo_len(), 1);
        let next = history.redo(&previous).unwrap();
        assert_eq!(next, live);
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = CommandHistory::default();
        history.record_before_mutation(&grid_with(1));
        history.undo(&grid_with(2));
        assert_eq!(history.redo_len(), 1);

        history.record_before_mutation(&grid_with(3));
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut history = CommandHistory::with_capacity(0);
        history.record_before_mutation(&grid_with(1));
        history.record_before_mutation(&grid_with(2));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.undo_len(), 1);
    }
}
