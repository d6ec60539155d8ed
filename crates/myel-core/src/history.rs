//! Bounded undo/redo over [`Annotations`].

use std::collections::VecDeque;

use crate::annotation::Annotations;

/// Maximum entries kept on each stack.
pub const HISTORY_CAPACITY: usize = 30;

/// A deep copy of the annotation state.
///
/// Built only by cloning, so a snapshot never shares storage with the
/// live state it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSnapshot(Annotations);

impl EditorSnapshot {
    /// Copy the current state.
    #[must_use]
    pub fn capture(state: &Annotations) -> Self {
        Self(state.clone())
    }

    /// The captured state.
    #[must_use]
    pub const fn state(&self) -> &Annotations {
        &self.0
    }

    /// Take the captured state.
    #[must_use]
    pub fn into_state(self) -> Annotations {
        self.0
    }
}

/// Undo and redo stacks, each capped at [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: VecDeque<EditorSnapshot>,
    redo: VecDeque<EditorSnapshot>,
}

impl History {
    /// Empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `state` as it was before a mutation. Clears the redo stack.
    pub fn record(&mut self, state: &Annotations) {
        push_bounded(&mut self.undo, EditorSnapshot::capture(state));
        self.redo.clear();
    }

    /// Step back: returns the state to restore, stashing `current` for
    /// redo. `None` when there is nothing to undo.
    pub fn undo(&mut self, current: &Annotations) -> Option<Annotations> {
        let previous = self.undo.pop_back()?;
        push_bounded(&mut self.redo, EditorSnapshot::capture(current));
        Some(previous.into_state())
    }

    /// Step forward: the mirror of [`undo`](Self::undo).
    pub fn redo(&mut self, current: &Annotations) -> Option<Annotations> {
        let next = self.redo.pop_back()?;
        push_bounded(&mut self.undo, EditorSnapshot::capture(current));
        Some(next.into_state())
    }

    /// Whether [`undo`](Self::undo) would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether [`redo`](Self::redo) would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Entries on the undo stack.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Entries on the redo stack.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

fn push_bounded(stack: &mut VecDeque<EditorSnapshot>, snapshot: EditorSnapshot) {
    if stack.len() == HISTORY_CAPACITY {
        stack.pop_front();
    }
    stack.push_back(snapshot);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::annotation::Counter;
    use crate::types::Point;

    fn with_counters(n: i32) -> Annotations {
        Annotations {
            counters: (0..n)
                .map(|i| Counter {
                    position: Point::new(i, i),
                    group: "g".to_owned(),
                })
                .collect(),
            ..Annotations::default()
        }
    }

    #[test]
    fn undo_on_empty_is_none() {
        let mut h = History::new();
        assert!(h.undo(&Annotations::default()).is_none());
        assert!(h.redo(&Annotations::default()).is_none());
        assert!(!h.can_undo());
    }

    #[test]
    fn round_trip_restores_every_step() {
        let mut h = History::new();
        let mut state = with_counters(0);
        for n in 1..=5 {
            h.record(&state);
            state = with_counters(n);
        }
        for n in (0..5).rev() {
            state = h.undo(&state).unwrap();
            assert_eq!(state, with_counters(n));
        }
        assert!(!h.can_undo());
        for n in 1..=5 {
            state = h.redo(&state).unwrap();
            assert_eq!(state, with_counters(n));
        }
        assert!(!h.can_redo());
    }

    #[test]
    fn recording_clears_redo() {
        let mut h = History::new();
        h.record(&with_counters(0));
        let _ = h.undo(&with_counters(1)).unwrap();
        assert!(h.can_redo());
        h.record(&with_counters(0));
        assert!(!h.can_redo());
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut h = History::new();
        for n in 0..31 {
            h.record(&with_counters(n));
        }
        assert_eq!(h.undo_len(), HISTORY_CAPACITY);
        let mut state = with_counters(31);
        for _ in 0..30 {
            state = h.undo(&state).unwrap();
        }
        // Entry 0 was discarded; the oldest reachable state is entry 1.
        assert_eq!(state, with_counters(1));
        assert!(h.undo(&state).is_none());
    }

    #[test]
    fn snapshot_does_not_alias_live_state() {
        let mut live = with_counters(2);
        let snap = EditorSnapshot::capture(&live);
        live.counters.clear();
        assert_eq!(snap.state().counters.len(), 2);
    }
}
