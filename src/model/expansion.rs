//! Expanded-row tracking

use super::row::RowId;
use std::collections::HashSet;

/// Rows whose detail panel is open. Independent of selection.
#[derive(Debug, Clone, Default)]
pub struct ExpansionTracker {
    expanded: HashSet<RowId>,
}

impl ExpansionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership, returning the new expanded state
    pub fn toggle(&mut self, id: RowId) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    pub fn is_expanded(&self, id: RowId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn expand_all(&mut self, ids: &[RowId]) {
        self.expanded.extend(ids.iter().copied());
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}
