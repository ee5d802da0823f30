//! Snapshot-based undo/redo.

/// Undo/redo stacks of whole-state snapshots.
///
/// The live state is owned by the caller and passed in by reference, so a
/// gesture can mutate it freely and record the superseded snapshot once at
/// the end with [`History::record`].
#[derive(Debug, Clone)]
pub struct History<S> {
    /// Oldest first.
    past: Vec<S>,
    /// Next redo last.
    future: Vec<S>,
    limit: Option<usize>,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> History<S> {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            limit: None,
        }
    }

    /// Create a history keeping at most `limit` undo steps.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Install `next` as the live state, making the old one undoable.
    pub fn commit(&mut self, current: &mut S, next: S) {
        let previous = std::mem::replace(current, next);
        self.record(previous);
    }

    /// Push a state the live state has already moved on from.
    /// Discards any redo branch.
    pub fn record(&mut self, previous: S) {
        self.future.clear();
        self.past.push(previous);
        if let Some(limit) = self.limit {
            if self.past.len() > limit {
                let excess = self.past.len() - limit;
                self.past.drain(..excess);
            }
        }
    }

    /// Step back. Returns false if there is nothing to undo.
    pub fn undo(&mut self, current: &mut S) -> bool {
        match self.past.pop() {
            Some(previous) => {
                let undone = std::mem::replace(current, previous);
                self.future.push(undone);
                true
            }
            None => false,
        }
    }

    /// Step forward. Returns false if there is nothing to redo.
    pub fn redo(&mut self, current: &mut S) -> bool {
        match self.future.pop() {
            Some(next) => {
                let redone = std::mem::replace(current, next);
                self.past.push(redone);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Forget all snapshots.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
