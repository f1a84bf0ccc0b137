//! Row selection and the current (highlighted) row
//!
//! Selection is keyed by [`RowId`], so it survives re-sorting and
//! filtering. Ids whose rows were replaced stay in the set until cleared.

use super::row::RowId;
use std::collections::HashSet;

/// Selected rows plus the single current row.
///
/// Every mutator returns whether the state actually changed.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    selected: HashSet<RowId>,
    current: Option<RowId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids, sorted for deterministic ordering
    pub fn selected(&self) -> Vec<RowId> {
        let mut ids: Vec<_> = self.selected.iter().copied().collect();
        ids.sort();
        ids
    }

    pub fn is_selected(&self, id: RowId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn current(&self) -> Option<RowId> {
        self.current
    }

    pub fn select(&mut self, id: RowId) -> bool {
        self.selected.insert(id)
    }

    pub fn unselect(&mut self, id: RowId) -> bool {
        self.selected.remove(&id)
    }

    /// Force membership to `explicit`, or flip it when `None`
    pub fn toggle(&mut self, id: RowId, explicit: Option<bool>) -> bool {
        let target = explicit.unwrap_or(!self.selected.contains(&id));
        if target {
            self.select(id)
        } else {
            self.unselect(id)
        }
    }

    /// Replace the selection with exactly `visible`
    pub fn select_all(&mut self, visible: &[RowId]) -> bool {
        let next: HashSet<RowId> = visible.iter().copied().collect();
        if next == self.selected {
            return false;
        }
        self.selected = next;
        true
    }

    /// Clear when the selection is as large as `visible`, otherwise
    /// select all of `visible`.
    ///
    /// Only the sizes are compared, so a selection holding ids that are
    /// no longer visible can be mistaken for a full selection.
    pub fn toggle_all(&mut self, visible: &[RowId]) -> bool {
        if self.selected.len() == visible.len() {
            self.clear()
        } else {
            self.select_all(visible)
        }
    }

    pub fn clear(&mut self) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        self.selected.clear();
        true
    }

    pub fn set_current(&mut self, id: Option<RowId>) -> bool {
        if self.current == id {
            return false;
        }
        self.current = id;
        true
    }
}
