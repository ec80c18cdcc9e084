//! Snapshot history for cloneable state.

/// Undo stack of whole-value snapshots, unbounded unless given a limit.
///
/// Push the current value *before* changing it; `undo` hands back the most
/// recent snapshot. There is no redo: popping discards the entry.
///
/// # Example
/// ```
/// use mothra_ui::UndoStack;
///
/// let mut stack: UndoStack<Vec<u32>> = UndoStack::unbounded();
///
/// let mut list = vec![1, 2];
/// stack.push(list.clone());
/// list.push(3);
///
/// if let Some(previous) = stack.undo() {
///     list = previous;
/// }
/// assert_eq!(list, vec![1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct UndoStack<T: Clone> {
    /// Snapshots, oldest first
    undo_stack: Vec<T>,
    /// Maximum history size, None for no limit
    max_history: Option<usize>,
}

impl<T: Clone> Default for UndoStack<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T: Clone> UndoStack<T> {
    /// Create a new undo stack with specified max history size.
    /// A size of 0 means no limit.
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            max_history: (max_history > 0).then_some(max_history),
        }
    }

    /// Undo stack that never drops snapshots
    pub fn unbounded() -> Self {
        Self {
            undo_stack: Vec::new(),
            max_history: None,
        }
    }

    /// Push a state to the undo stack (call this BEFORE making a change)
    pub fn push(&mut self, state: T) {
        self.undo_stack.push(state);

        // Limit history size
        if let Some(max) = self.max_history {
            while self.undo_stack.len() > max {
                self.undo_stack.remove(0);
            }
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Pop the most recent snapshot, or None if nothing to undo
    pub fn undo(&mut self) -> Option<T> {
        self.undo_stack.pop()
    }

    /// Get number of undo steps available
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn max_history(&self) -> Option<usize> {
        self.max_history
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
    }
}
