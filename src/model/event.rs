//! Change notifications emitted by the table view
//!
//! Listeners are called synchronously, once per state-changing operation,
//! after the view's state has settled.

use super::row::RowId;
use super::sort::SortDirection;
use serde::Serialize;
use std::fmt;

/// A state change in the table view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TableEvent {
    SortChange {
        column: Option<String>,
        direction: Option<SortDirection>,
    },
    SelectionChange {
        selection: Vec<RowId>,
    },
    CurrentChange {
        current: Option<RowId>,
    },
    ExpandChange {
        row: RowId,
        expanded: bool,
    },
    RowClick {
        row: RowId,
        index: usize,
    },
}

impl fmt::Display for TableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableEvent::SortChange {
                column: Some(column),
                direction: Some(direction),
            } => write!(f, "sort-change({} {})", column, direction),
            TableEvent::SortChange { .. } => write!(f, "sort-change(none)"),
            TableEvent::SelectionChange { selection } => {
                write!(f, "selection-change({} rows)", selection.len())
            }
            TableEvent::CurrentChange { current: Some(id) } => write!(f, "current-change({})", id),
            TableEvent::CurrentChange { current: None } => write!(f, "current-change(none)"),
            TableEvent::ExpandChange { row, expanded } => {
                write!(f, "expand-change({}, {})", row, expanded)
            }
            TableEvent::RowClick { row, index } => write!(f, "row-click({}, {})", row, index),
        }
    }
}

type Listener = Box<dyn FnMut(&TableEvent)>;

/// Registered event listeners
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&TableEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Deliver an event to every listener in registration order
    pub fn emit(&mut self, event: TableEvent) {
        log::debug!("{}", event);
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
