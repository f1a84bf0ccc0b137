//! Single-column sort state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Header caret
    pub fn caret(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "ascending"),
            SortDirection::Descending => write!(f, "descending"),
        }
    }
}

/// Active sort column and direction.
///
/// Column and direction are stored together so one can never be set
/// without the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    active: Option<(String, SortDirection)>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(&self) -> Option<&str> {
        self.active.as_ref().map(|(key, _)| key.as_str())
    }

    pub fn direction(&self) -> Option<SortDirection> {
        self.active.as_ref().map(|(_, dir)| *dir)
    }

    /// Direction for `key` if it is the active sort column
    pub fn direction_for(&self, key: &str) -> Option<SortDirection> {
        match &self.active {
            Some((active, dir)) if active == key => Some(*dir),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Advance the sort cycle for a header click on `key`:
    /// ascending, then descending, then unsorted. Another column
    /// always restarts at ascending.
    pub fn toggle(&mut self, key: &str) {
        self.active = match self.active.take() {
            Some((active, SortDirection::Ascending)) if active == key => {
                Some((active, SortDirection::Descending))
            }
            Some((active, SortDirection::Descending)) if active == key => None,
            _ => Some((key.to_string(), SortDirection::Ascending)),
        };
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_cycles_same_column() {
        let mut sort = SortState::new();
        let mut seen = Vec::new();
        for _ in 0..3 {
            sort.toggle("age");
            seen.push(sort.direction());
        }

        assert_eq!(
            seen,
            vec![
                Some(SortDirection::Ascending),
                Some(SortDirection::Descending),
                None
            ]
        );
        assert_eq!(sort.column(), None);
    }

    #[test]
    fn test_toggle_other_column_resets_to_ascending() {
        let mut sort = SortState::new();
        sort.toggle("age");
        sort.toggle("age");
        assert_eq!(sort.direction(), Some(SortDirection::Descending));

        sort.toggle("name");
        assert_eq!(sort.column(), Some("name"));
        assert_eq!(sort.direction(), Some(SortDirection::Ascending));
    }

    #[test]
    fn test_direction_for() {
        let mut sort = SortState::new();
        sort.toggle("age");
        assert_eq!(sort.direction_for("age"), Some(SortDirection::Ascending));
        assert_eq!(sort.direction_for("name"), None);

        sort.clear();
        assert!(!sort.is_active());
        assert_eq!(sort.direction_for("age"), None);
    }
}
