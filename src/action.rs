//! Action enum - All possible application actions
//!
//! Components emit Actions in response to key events, and the App
//! processes them to update the table view.

use serde_json::Value;
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick for time-based updates
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Quit without confirmation
    ForceQuit,
    /// Reload rows and columns from disk
    Reload,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    /// Move the cursor to the next row
    NextRow,
    /// Move the cursor to the previous row
    PrevRow,
    FirstRow,
    LastRow,
    PageDown,
    PageUp,
    /// Focus the next column
    NextColumn,
    /// Focus the previous column
    PrevColumn,

    // ─────────────────────────────────────────────────────────────────────────
    // Sorting
    // ─────────────────────────────────────────────────────────────────────────
    /// Cycle the sort on the focused column
    ToggleSort,
    ClearSort,

    // ─────────────────────────────────────────────────────────────────────────
    // Selection & Expansion
    // ─────────────────────────────────────────────────────────────────────────
    /// Toggle selection of the row under the cursor
    ToggleRowSelection,
    /// Select every visible row, or clear when all are selected
    ToggleAllSelection,
    ClearSelection,
    /// Expand or collapse the row under the cursor
    ToggleRowExpansion,
    /// Activate the row under the cursor (row click)
    ClickRow,

    // ─────────────────────────────────────────────────────────────────────────
    // Filtering
    // ─────────────────────────────────────────────────────────────────────────
    /// Open the value filter for the focused column
    OpenColumnFilter,
    /// Apply an accepted-value set to a column
    ApplyColumnFilter(String, Vec<Value>),
    /// Remove the filter on one column
    ClearColumnFilter(String),
    ClearAllFilters,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    OpenQuitDialog,
    OpenHelp,
    CloseModal,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::Reload => write!(f, "Reload"),
            Action::NextRow => write!(f, "NextRow"),
            Action::PrevRow => write!(f, "PrevRow"),
            Action::FirstRow => write!(f, "FirstRow"),
            Action::LastRow => write!(f, "LastRow"),
            Action::PageDown => write!(f, "PageDown"),
            Action::PageUp => write!(f, "PageUp"),
            Action::NextColumn => write!(f, "NextColumn"),
            Action::PrevColumn => write!(f, "PrevColumn"),
            Action::ToggleSort => write!(f, "ToggleSort"),
            Action::ClearSort => write!(f, "ClearSort"),
            Action::ToggleRowSelection => write!(f, "ToggleRowSelection"),
            Action::ToggleAllSelection => write!(f, "ToggleAllSelection"),
            Action::ClearSelection => write!(f, "ClearSelection"),
            Action::ToggleRowExpansion => write!(f, "ToggleRowExpansion"),
            Action::ClickRow => write!(f, "ClickRow"),
            Action::OpenColumnFilter => write!(f, "OpenColumnFilter"),
            Action::ApplyColumnFilter(column, values) => {
                write!(f, "ApplyColumnFilter({}, {} values)", column, values.len())
            }
            Action::ClearColumnFilter(column) => write!(f, "ClearColumnFilter({})", column),
            Action::ClearAllFilters => write!(f, "ClearAllFilters"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::CloseModal => write!(f, "CloseModal"),
        }
    }
}
