//! Bounded undo/redo history
//!
//! Snapshots are owned values. `undo` and `redo` take the caller's current
//! state by value and hand back the state to restore, so the stack never
//! aliases the live layer.

use std::collections::VecDeque;

/// Default number of undo steps kept
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Undo/redo stack of owned snapshots
#[derive(Debug, Clone)]
pub struct UndoStack<T> {
    undo:      VecDeque<T>,
    redo:      Vec<T>,
    max_depth: usize,
}

impl<T> UndoStack<T> {
    /// Creates a stack keeping at most `max_depth` undo steps (minimum 1)
    pub fn new(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        Self {
            undo: VecDeque::with_capacity(max_depth.min(DEFAULT_MAX_DEPTH)),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Records a state to return to. Clears the redo history and evicts the
    /// oldest snapshot once `max_depth` is exceeded.
    pub fn push(&mut self, snapshot: T) {
        self.undo.push_back(snapshot);
        while self.undo.len() > self.max_depth {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Steps back: stores `current` for redo and returns the state to restore.
    ///
    /// Returns `None` (dropping nothing) when there is nothing to undo; the
    /// caller keeps `current` in that case.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Steps forward: stores `current` for undo and returns the redone state.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo.pop()?;
        self.undo.push_back(current);
        while self.undo.len() > self.max_depth {
            self.undo.pop_front();
        }
        Some(next)
    }

    /// Drops all history
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo steps available
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl<T> Default for UndoStack<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}
