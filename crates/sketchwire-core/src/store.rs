//! Per-participant drawing state: History and the redo stack.

use crate::protocol::Stroke;

/// The ordered sequence of committed strokes owned by one participant,
/// plus the stack of strokes removed by undo.
///
/// History order reflects local commit/receipt order only; there is no
/// global total order across participants. Remote undo/redo/clear events
/// carry no stroke reference, so every participant runs the identical
/// transition against its own stacks.
#[derive(Debug, Clone, Default)]
pub struct StrokeStore {
    history: Vec<Stroke>,
    redo: Vec<Stroke>,
}

impl StrokeStore {
    /// Create an empty store. A newly joining participant always starts
    /// empty; there is no late-join sync.
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed history, in order.
    pub fn history(&self) -> &[Stroke] {
        &self.history
    }

    /// Commit a locally captured stroke. A fresh local commit always
    /// empties the redo stack: a stale redo is unreachable afterwards.
    pub fn commit(&mut self, stroke: Stroke) {
        self.redo.clear();
        self.history.push(stroke);
    }

    /// Append a stroke received from a remote participant.
    ///
    /// Leaves the redo stack alone: only a local commit invalidates it.
    pub fn apply_remote(&mut self, stroke: Stroke) {
        self.history.push(stroke);
    }

    /// Pop the newest stroke into the redo stack.
    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(stroke) => {
                self.redo.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Restore the most recently undone stroke.
    /// Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(stroke) => {
                self.history.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Empty both stacks.
    pub fn clear(&mut self) {
        self.history.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }
}
