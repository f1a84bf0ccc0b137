//! Render projection
//!
//! Turns the derived view plus selection, expansion, sort and filter state
//! into a [`PresentationTree`]. The terminal front end draws the tree; the
//! projection itself has no side effects beyond logging.

use super::column::{Align, ColumnDescriptor, ColumnKind, FixedSide, Size};
use super::expansion::ExpansionTracker;
use super::filter::FilterState;
use super::options::{TableSize, ViewOptions};
use super::row::{Row, RowId, RowStore};
use super::selection::SelectionTracker;
use super::sort::{SortDirection, SortState};
use super::value::display_value;
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;

/// Caller-supplied cell callback: `(row, column, value, row_index)`.
///
/// `row_index` is the row's position in the derived view. An `Err` blanks
/// only the cell it was produced for.
pub type CellFn = Rc<dyn Fn(&Row, &ColumnDescriptor, Option<&Value>, usize) -> Result<String>>;

// ═══════════════════════════════════════════════════════════════════════════════
// Presentation Tree
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentationTree {
    pub show_header: bool,
    pub columns: Vec<HeaderCell>,
    pub rows: Vec<RowNode>,
    /// Set when the derived view is empty
    pub empty_text: Option<String>,
    pub size: TableSize,
}

/// Header cell and layout metadata for one column
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    pub kind: ColumnKind,
    pub align: Align,
    pub width: Option<Size>,
    pub min_width: Option<Size>,
    pub fixed: Option<FixedSide>,
    pub sortable: bool,
    pub filterable: bool,
    /// Direction when this column is the active sort column
    pub sort: Option<SortDirection>,
    /// Whether a filter is active on this column
    pub filtered: bool,
}

/// One displayed row
#[derive(Debug, Clone, PartialEq)]
pub struct RowNode {
    pub id: RowId,
    /// Position in the derived view
    pub index: usize,
    pub striped: bool,
    pub current: bool,
    pub selected: bool,
    pub expanded: bool,
    pub cells: Vec<CellNode>,
    /// Field listing shown under an expanded row
    pub detail: Vec<DetailLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellNode {
    pub content: CellContent,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    Checkbox { checked: bool },
    Index(usize),
    ExpandToggle { expanded: bool },
    Text(String),
}

impl CellContent {
    /// Plain text rendering of the cell
    pub fn text(&self) -> String {
        match self {
            CellContent::Checkbox { checked: true } => "[x]".to_string(),
            CellContent::Checkbox { checked: false } => "[ ]".to_string(),
            CellContent::Index(n) => n.to_string(),
            CellContent::ExpandToggle { expanded: true } => "▼".to_string(),
            CellContent::ExpandToggle { expanded: false } => "▶".to_string(),
            CellContent::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLine {
    pub label: String,
    pub text: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Projection
// ═══════════════════════════════════════════════════════════════════════════════

/// Borrowed view of all state the projection reads
pub struct ProjectionSource<'a> {
    pub store: &'a RowStore,
    pub positions: &'a [usize],
    pub selection: &'a SelectionTracker,
    pub expansion: &'a ExpansionTracker,
    pub sort: &'a SortState,
    pub filters: &'a FilterState,
    pub options: &'a ViewOptions,
    pub formatters: &'a HashMap<String, CellFn>,
    pub renderers: &'a HashMap<String, CellFn>,
}

/// Build the presentation tree for the current state
pub fn project(source: &ProjectionSource<'_>) -> PresentationTree {
    let columns = source.store.columns();

    let header = columns
        .iter()
        .map(|column| HeaderCell {
            key: column.key.clone(),
            label: column.display_label().to_string(),
            kind: column.kind,
            align: column.effective_header_align(),
            width: column.width,
            min_width: column.min_width,
            fixed: column.fixed,
            sortable: column.sortable,
            filterable: column.filterable,
            sort: source.sort.direction_for(&column.key),
            filtered: source.filters.is_active(&column.key),
        })
        .collect();

    let rows: Vec<RowNode> = source
        .positions
        .iter()
        .enumerate()
        .map(|(index, &pos)| project_row(source, &source.store.rows()[pos], index))
        .collect();

    let empty_text = rows
        .is_empty()
        .then(|| source.options.empty_text.clone());

    PresentationTree {
        show_header: source.options.show_header,
        columns: header,
        rows,
        empty_text,
        size: source.options.size,
    }
}

fn project_row(source: &ProjectionSource<'_>, row: &Row, index: usize) -> RowNode {
    let selected = source.selection.is_selected(row.id);
    let expanded = source.expansion.is_expanded(row.id);
    let columns = source.store.columns();

    let cells = columns
        .iter()
        .map(|column| {
            let content = match column.kind {
                ColumnKind::Selection => CellContent::Checkbox { checked: selected },
                ColumnKind::Index => CellContent::Index(index + 1),
                ColumnKind::Expand => CellContent::ExpandToggle { expanded },
                ColumnKind::Normal => CellContent::Text(resolve_text(source, row, column, index)),
            };
            CellNode {
                content,
                align: column.align,
            }
        })
        .collect();

    let detail = if expanded {
        columns
            .iter()
            .filter(|column| column.is_normal())
            .map(|column| DetailLine {
                label: column.display_label().to_string(),
                text: resolve_text(source, row, column, index),
            })
            .collect()
    } else {
        Vec::new()
    };

    RowNode {
        id: row.id,
        index,
        striped: source.options.stripe && index % 2 == 1,
        current: source.options.highlight_current_row
            && source.selection.current() == Some(row.id),
        selected,
        expanded,
        cells,
        detail,
    }
}

/// Resolve a normal cell: formatter callback, declarative format,
/// render callback, then the raw value.
fn resolve_text(
    source: &ProjectionSource<'_>,
    row: &Row,
    column: &ColumnDescriptor,
    index: usize,
) -> String {
    let value = row.get(&column.key);

    let result = if let Some(formatter) = source.formatters.get(&column.key) {
        formatter(row, column, value, index)
    } else if let Some(format) = &column.format {
        format.apply(value)
    } else if let Some(renderer) = source.renderers.get(&column.key) {
        renderer(row, column, value, index)
    } else {
        return display_value(value);
    };

    match result {
        Ok(text) => text,
        Err(err) => {
            log::warn!(
                "Cell {:?} of row {} could not be formatted: {:#}",
                column.key,
                row.id,
                err
            );
            String::new()
        }
    }
}
