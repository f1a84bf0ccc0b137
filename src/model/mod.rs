//! Model layer - the table engine and UI overlay state
//!
//! This module contains:
//! - `TabularView` - rows, columns and all derived/tracked table state
//! - The pieces it is built from (store, pipeline, trackers, projection)
//! - `ModalStack` - Modal overlay management for the terminal front end

pub mod column;
pub mod event;
pub mod expansion;
pub mod filter;
pub mod format;
pub mod modal;
pub mod options;
pub mod pipeline;
pub mod projection;
pub mod row;
pub mod selection;
pub mod sort;
pub mod value;
pub mod view;

// Re-export commonly used types
pub use column::{Align, ColumnDescriptor, ColumnKind, FixedSide, Size};
pub use event::TableEvent;
pub use format::ColumnFormat;
pub use options::{TableSize, ViewOptions};
pub use projection::{CellContent, CellFn, HeaderCell, PresentationTree, RowNode};
pub use row::{Record, Row, RowId};
pub use sort::{SortDirection, SortState};
pub use view::TabularView;
