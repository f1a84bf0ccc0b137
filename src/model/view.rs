//! TabularView - the table engine
//!
//! Owns the row store and all derived and tracked state. Every public
//! mutator runs to completion, re-derives the visible rows when needed and
//! emits at most one [`TableEvent`] before returning. Invalid input (unknown
//! columns, unknown rows) is ignored and logged at debug level.

use super::column::ColumnDescriptor;
use super::event::{EventBus, TableEvent};
use super::expansion::ExpansionTracker;
use super::filter::FilterState;
use super::options::ViewOptions;
use super::pipeline::derive_positions;
use super::projection::{project, CellFn, PresentationTree, ProjectionSource};
use super::row::{Record, Row, RowId, RowStore};
use super::selection::SelectionTracker;
use super::sort::SortState;
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Stateful presentation engine over a row collection
#[derive(Default)]
pub struct TabularView {
    store: RowStore,
    filters: FilterState,
    sort: SortState,
    selection: SelectionTracker,
    expansion: ExpansionTracker,
    options: ViewOptions,
    formatters: HashMap<String, CellFn>,
    renderers: HashMap<String, CellFn>,
    /// Derived view as positions into the store
    derived: Vec<usize>,
    events: EventBus,
}

impl fmt::Debug for TabularView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabularView")
            .field("rows", &self.store.len())
            .field("columns", &self.store.columns().len())
            .field("visible", &self.derived.len())
            .field("sort", &self.sort)
            .field("filters", &self.filters)
            .field("selected", &self.selection.len())
            .field("expanded", &self.expansion.len())
            .finish()
    }
}

impl TabularView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ViewOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ViewOptions) {
        self.options = options;
    }

    /// Register a listener for state-change events
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&TableEvent) + 'static,
    {
        self.events.subscribe(listener);
    }

    fn rederive(&mut self) {
        self.derived = derive_positions(&self.store, &self.filters, &self.sort);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rows & Columns
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace all rows with fresh identities.
    ///
    /// Selection, current row and expansion entries for the old rows are
    /// kept; they no longer match anything until cleared.
    pub fn set_rows(&mut self, records: Vec<Record>) -> Vec<RowId> {
        let ids = self.store.set_rows(records);
        self.after_rows_replaced(&ids);
        ids
    }

    /// Replace all rows, keeping caller-supplied identities
    pub fn set_identified_rows(&mut self, rows: Vec<Row>) -> Vec<RowId> {
        let ids = self.store.set_identified_rows(rows);
        self.after_rows_replaced(&ids);
        ids
    }

    fn after_rows_replaced(&mut self, ids: &[RowId]) {
        if self.options.default_expand_all {
            self.expansion.expand_all(ids);
        }
        self.rederive();
        log::debug!("Loaded {} rows, {} visible", ids.len(), self.derived.len());
    }

    /// Replace the columns. Filters on columns that no longer exist are
    /// dropped, and so is a sort on a column that is gone or no longer
    /// sortable.
    pub fn set_columns(&mut self, columns: Vec<ColumnDescriptor>) {
        self.store.set_columns(columns);

        let store = &self.store;
        self.filters.retain(|key| store.column(key).is_some());

        let stale_sort = self
            .sort
            .column()
            .is_some_and(|key| !store.column(key).is_some_and(|c| c.sortable));
        if stale_sort {
            log::debug!("Dropping sort on removed column {:?}", self.sort.column());
            self.sort.clear();
        }

        self.rederive();
        if stale_sort {
            self.emit_sort_change();
        }
    }

    pub fn rows(&self) -> &[Row] {
        self.store.rows()
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        self.store.columns()
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.store.row(id)
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.store.column(key)
    }

    /// Distinct values of a column across all stored rows
    pub fn distinct_values(&self, key: &str) -> Vec<Value> {
        self.store.distinct_values(key)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Filtering & Sorting
    // ─────────────────────────────────────────────────────────────────────────

    /// Install or replace a column filter; an empty set removes it
    pub fn set_filter(&mut self, key: &str, accepted: Vec<Value>) {
        if self.store.column(key).is_none() {
            log::debug!("Ignoring filter on unknown column {:?}", key);
            return;
        }
        self.filters.set(key, accepted);
        self.rederive();
    }

    /// Remove one column's filter, or all filters when `key` is `None`
    pub fn clear_filter(&mut self, key: Option<&str>) {
        match key {
            Some(key) => self.filters.remove(key),
            None => self.filters.clear(),
        }
        self.rederive();
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Advance the sort cycle for a sortable column
    pub fn toggle_sort(&mut self, key: &str) {
        match self.store.column(key) {
            Some(column) if column.sortable => {}
            Some(_) => {
                log::debug!("Ignoring sort on non-sortable column {:?}", key);
                return;
            }
            None => {
                log::debug!("Ignoring sort on unknown column {:?}", key);
                return;
            }
        }
        self.sort.toggle(key);
        self.rederive();
        self.emit_sort_change();
    }

    pub fn clear_sort(&mut self) {
        if !self.sort.is_active() {
            return;
        }
        self.sort.clear();
        self.rederive();
        self.emit_sort_change();
    }

    fn emit_sort_change(&mut self) {
        self.events.emit(TableEvent::SortChange {
            column: self.sort.column().map(str::to_string),
            direction: self.sort.direction(),
        });
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Rows that pass every filter, in sort order
    pub fn derive(&self) -> Vec<&Row> {
        let rows = self.store.rows();
        self.derived.iter().map(|&pos| &rows[pos]).collect()
    }

    pub fn derived_ids(&self) -> Vec<RowId> {
        let rows = self.store.rows();
        self.derived.iter().map(|&pos| rows[pos].id).collect()
    }

    pub fn derived_len(&self) -> usize {
        self.derived.len()
    }

    /// Position of a row within the derived view
    pub fn derived_index(&self, id: RowId) -> Option<usize> {
        let rows = self.store.rows();
        self.derived.iter().position(|&pos| rows[pos].id == id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn select(&mut self, id: RowId) {
        if !self.store.contains(id) {
            log::debug!("Ignoring selection of unknown row {}", id);
            return;
        }
        if self.selection.select(id) {
            self.emit_selection_change();
        }
    }

    pub fn unselect(&mut self, id: RowId) {
        if self.selection.unselect(id) {
            self.emit_selection_change();
        }
    }

    /// Force selection state to `explicit`, or flip it when `None`
    pub fn toggle_selection(&mut self, id: RowId, explicit: Option<bool>) {
        let target = explicit.unwrap_or(!self.selection.is_selected(id));
        if target {
            self.select(id);
        } else {
            self.unselect(id);
        }
    }

    /// Select exactly the rows of the derived view
    pub fn select_all(&mut self) {
        let visible = self.derived_ids();
        if self.selection.select_all(&visible) {
            self.emit_selection_change();
        }
    }

    /// Clear when as many rows are selected as are visible, otherwise
    /// select all visible rows
    pub fn toggle_all(&mut self) {
        let visible = self.derived_ids();
        if self.selection.toggle_all(&visible) {
            self.emit_selection_change();
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.emit_selection_change();
        }
    }

    fn emit_selection_change(&mut self) {
        self.events.emit(TableEvent::SelectionChange {
            selection: self.selection.selected(),
        });
    }

    pub fn selection(&self) -> Vec<RowId> {
        self.selection.selected()
    }

    pub fn is_selected(&self, id: RowId) -> bool {
        self.selection.is_selected(id)
    }

    /// Selected rows that are still in the store, in store order
    pub fn selected_rows(&self) -> Vec<&Row> {
        self.store
            .rows()
            .iter()
            .filter(|row| self.selection.is_selected(row.id))
            .collect()
    }

    pub fn set_current(&mut self, id: Option<RowId>) {
        if let Some(id) = id {
            if !self.store.contains(id) {
                log::debug!("Ignoring unknown current row {}", id);
                return;
            }
        }
        if self.selection.set_current(id) {
            self.events.emit(TableEvent::CurrentChange { current: id });
        }
    }

    pub fn current(&self) -> Option<RowId> {
        self.selection.current()
    }

    /// A click on a row: it becomes current when current-row highlighting
    /// is enabled, then a `row-click` event is emitted
    pub fn click_row(&mut self, id: RowId) {
        let Some(index) = self.derived_index(id) else {
            log::debug!("Ignoring click on row {} outside the view", id);
            return;
        };
        if self.options.highlight_current_row {
            self.set_current(Some(id));
        }
        self.events.emit(TableEvent::RowClick { row: id, index });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expansion
    // ─────────────────────────────────────────────────────────────────────────

    pub fn toggle_expansion(&mut self, id: RowId) {
        if !self.store.contains(id) {
            log::debug!("Ignoring expansion of unknown row {}", id);
            return;
        }
        let expanded = self.expansion.toggle(id);
        self.events.emit(TableEvent::ExpandChange { row: id, expanded });
    }

    pub fn is_expanded(&self, id: RowId) -> bool {
        self.expansion.is_expanded(id)
    }

    /// Collapse every row. A bulk reset, so no `expand-change` is emitted.
    pub fn clear_expansion(&mut self) {
        self.expansion.clear();
    }

    pub fn expanded_len(&self) -> usize {
        self.expansion.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    /// Install a formatter callback for a column
    pub fn set_formatter<F>(&mut self, key: &str, formatter: F)
    where
        F: Fn(&Row, &ColumnDescriptor, Option<&Value>, usize) -> Result<String> + 'static,
    {
        self.formatters.insert(key.to_string(), Rc::new(formatter));
    }

    /// Install a render callback for a column
    pub fn set_renderer<F>(&mut self, key: &str, renderer: F)
    where
        F: Fn(&Row, &ColumnDescriptor, Option<&Value>, usize) -> Result<String> + 'static,
    {
        self.renderers.insert(key.to_string(), Rc::new(renderer));
    }

    /// Project the current state into a presentation tree
    pub fn project(&self) -> PresentationTree {
        project(&ProjectionSource {
            store: &self.store,
            positions: &self.derived,
            selection: &self.selection,
            expansion: &self.expansion,
            sort: &self.sort,
            filters: &self.filters,
            options: &self.options,
            formatters: &self.formatters,
            renderers: &self.renderers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::column::ColumnKind;
    use crate::model::projection::CellContent;
    use crate::model::sort::SortDirection;
    use anyhow::anyhow;
    use serde_json::json;
    use std::cell::RefCell;

    fn records(rows: Value) -> Vec<Record> {
        rows.as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().cloned().unwrap())
            .collect()
    }

    /// The three-row age table used throughout
    fn age_view() -> TabularView {
        let mut view = TabularView::new();
        view.set_columns(vec![
            ColumnDescriptor::new("id", "Id"),
            ColumnDescriptor::new("age", "Age").sortable().filterable(),
        ]);
        view.set_rows(records(json!([
            {"id": 1, "age": 30},
            {"id": 2, "age": 25},
            {"id": 3, "age": 25},
        ])));
        view
    }

    fn derived_ids(view: &TabularView) -> Vec<i64> {
        view.derive()
            .iter()
            .map(|r| r.get("id").and_then(Value::as_i64).unwrap())
            .collect()
    }

    fn record_events(view: &mut TabularView) -> Rc<RefCell<Vec<TableEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        view.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    #[test]
    fn test_sort_scenario() {
        let mut view = age_view();

        view.toggle_sort("age");
        assert_eq!(derived_ids(&view), vec![2, 3, 1]);

        view.toggle_sort("age");
        assert_eq!(derived_ids(&view), vec![1, 2, 3]);

        view.toggle_sort("age");
        assert_eq!(derived_ids(&view), vec![1, 2, 3]);
        assert_eq!(view.sort_state().column(), None);
    }

    #[test]
    fn test_filter_scenario() {
        let mut view = age_view();
        view.set_filter("age", vec![json!(25)]);
        assert_eq!(derived_ids(&view), vec![2, 3]);
    }

    #[test]
    fn test_empty_filter_equals_no_filter() {
        let mut filtered = age_view();
        filtered.set_filter("age", vec![]);
        let plain = age_view();

        assert_eq!(derived_ids(&filtered), derived_ids(&plain));
        assert!(filtered.filters().is_empty());
    }

    #[test]
    fn test_clear_filter_one_and_all() {
        let mut view = age_view();
        view.set_filter("age", vec![json!(25)]);
        view.set_filter("id", vec![json!(2)]);
        assert_eq!(derived_ids(&view), vec![2]);

        view.clear_filter(Some("id"));
        assert_eq!(derived_ids(&view), vec![2, 3]);

        view.clear_filter(None);
        assert_eq!(derived_ids(&view), vec![1, 2, 3]);
    }

    #[test]
    fn test_unknown_and_unsortable_columns_are_ignored() {
        let mut view = age_view();
        let events = record_events(&mut view);

        view.toggle_sort("id");
        view.toggle_sort("missing");
        view.set_filter("missing", vec![json!(1)]);

        assert!(!view.sort_state().is_active());
        assert!(view.filters().is_empty());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_toggle_all_scenario() {
        let mut view = age_view();
        view.set_filter("age", vec![json!(25)]);
        assert_eq!(view.derived_len(), 2);

        view.toggle_all();
        assert_eq!(view.selection().len(), 2);

        view.toggle_all();
        assert!(view.selection().is_empty());
    }

    #[test]
    fn test_select_all_only_selects_visible_rows() {
        let mut view = age_view();
        view.set_filter("age", vec![json!(25)]);
        view.select_all();

        let visible = view.derived_ids();
        assert_eq!(view.selection(), visible);
        let hidden = view.rows()[0].id;
        assert!(!view.is_selected(hidden));
    }

    #[test]
    fn test_selection_emits_once_per_change() {
        let mut view = age_view();
        let events = record_events(&mut view);
        let id = view.rows()[1].id;

        view.select(id);
        view.select(id);
        view.unselect(RowId(999));
        view.toggle_selection(id, Some(true));

        assert_eq!(
            *events.borrow(),
            vec![TableEvent::SelectionChange {
                selection: vec![id]
            }]
        );

        view.toggle_selection(id, None);
        view.clear_selection();
        assert_eq!(events.borrow().len(), 2);
        assert!(view.selection().is_empty());
    }

    #[test]
    fn test_sort_change_events() {
        let mut view = age_view();
        let events = record_events(&mut view);

        view.toggle_sort("age");
        view.clear_sort();
        view.clear_sort();

        assert_eq!(
            *events.borrow(),
            vec![
                TableEvent::SortChange {
                    column: Some("age".to_string()),
                    direction: Some(SortDirection::Ascending),
                },
                TableEvent::SortChange {
                    column: None,
                    direction: None,
                },
            ]
        );
    }

    #[test]
    fn test_expansion_and_current_events() {
        let mut view = age_view();
        let events = record_events(&mut view);
        let id = view.rows()[0].id;

        view.toggle_expansion(id);
        view.set_current(Some(id));
        view.toggle_expansion(id);

        assert_eq!(
            *events.borrow(),
            vec![
                TableEvent::ExpandChange {
                    row: id,
                    expanded: true
                },
                TableEvent::CurrentChange { current: Some(id) },
                TableEvent::ExpandChange {
                    row: id,
                    expanded: false
                },
            ]
        );
        assert_eq!(view.current(), Some(id));
    }

    #[test]
    fn test_click_row_sets_current_only_when_highlighting() {
        let mut view = age_view();
        let events = record_events(&mut view);
        let id = view.rows()[2].id;

        view.click_row(id);
        assert_eq!(view.current(), None);
        assert_eq!(*events.borrow(), vec![TableEvent::RowClick { row: id, index: 2 }]);

        view.set_options(ViewOptions {
            highlight_current_row: true,
            ..ViewOptions::default()
        });
        view.click_row(id);
        assert_eq!(view.current(), Some(id));
    }

    #[test]
    fn test_orphaned_selection_survives_set_rows() {
        let mut view = age_view();
        let old = view.rows()[0].id;
        view.select(old);
        view.toggle_expansion(old);

        view.set_rows(records(json!([{"id": 1, "age": 30}])));

        assert_eq!(view.selection(), vec![old]);
        assert!(view.selected_rows().is_empty());
        let tree = view.project();
        assert!(!tree.rows[0].selected);
        assert!(!tree.rows[0].expanded);
    }

    #[test]
    fn test_identified_rows_restore_orphans() {
        let mut view = age_view();
        let row = view.rows()[0].clone();
        view.select(row.id);

        view.set_rows(records(json!([{"id": 9}])));
        assert!(view.selected_rows().is_empty());

        view.set_identified_rows(vec![row.clone()]);
        assert_eq!(view.selected_rows(), vec![&row]);
    }

    #[test]
    fn test_default_expand_all() {
        let mut view = TabularView::with_options(ViewOptions {
            default_expand_all: true,
            ..ViewOptions::default()
        });
        let ids = view.set_rows(records(json!([{"a": 1}, {"a": 2}])));
        assert!(ids.iter().all(|&id| view.is_expanded(id)));
    }

    #[test]
    fn test_clear_expansion_is_silent() {
        let mut view = age_view();
        let first = view.derived_ids()[0];
        view.toggle_expansion(first);
        let events = record_events(&mut view);

        view.clear_expansion();

        assert!(!view.is_expanded(first));
        assert_eq!(view.expanded_len(), 0);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_set_columns_drops_state_on_removed_columns() {
        let mut view = age_view();
        view.set_filter("age", vec![json!(25)]);
        view.set_filter("id", vec![json!(2), json!(3)]);
        view.toggle_sort("age");
        let events = record_events(&mut view);

        view.set_columns(vec![ColumnDescriptor::new("id", "Id")]);

        assert!(!view.filters().is_active("age"));
        assert!(view.filters().is_active("id"));
        assert!(!view.sort_state().is_active());
        assert_eq!(derived_ids(&view), vec![2, 3]);
        assert_eq!(
            *events.borrow(),
            vec![TableEvent::SortChange {
                column: None,
                direction: None,
            }]
        );
    }

    #[test]
    fn test_set_columns_keeps_state_on_surviving_columns() {
        let mut view = age_view();
        view.set_filter("age", vec![json!(25)]);
        view.toggle_sort("age");
        let events = record_events(&mut view);

        let columns = view.columns().to_vec();
        view.set_columns(columns);

        assert!(view.filters().is_active("age"));
        assert_eq!(view.sort_state().column(), Some("age"));
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_project_special_columns() {
        let mut view = age_view();
        let mut columns = vec![
            ColumnDescriptor::special(ColumnKind::Selection),
            ColumnDescriptor::special(ColumnKind::Index),
            ColumnDescriptor::special(ColumnKind::Expand),
        ];
        columns.extend(view.columns().to_vec());
        view.set_columns(columns);
        view.toggle_sort("age");
        let first = view.derived_ids()[0];
        view.select(first);
        view.toggle_expansion(first);

        let tree = view.project();
        let row = &tree.rows[0];
        assert_eq!(row.cells[0].content, CellContent::Checkbox { checked: true });
        assert_eq!(row.cells[1].content, CellContent::Index(1));
        assert_eq!(row.cells[2].content, CellContent::ExpandToggle { expanded: true });
        assert_eq!(row.cells[4].content, CellContent::Text("25".to_string()));
        assert_eq!(row.detail.len(), 2);
        assert_eq!(row.detail[1].label, "Age");
        assert_eq!(tree.rows[1].cells[1].content, CellContent::Index(2));
        assert!(tree.rows[1].detail.is_empty());
        assert_eq!(tree.columns[4].sort, Some(SortDirection::Ascending));
    }

    #[test]
    fn test_project_cell_priority() {
        let mut view = age_view();
        view.set_renderer("id", |_, _, value, _| Ok(format!("r{}", value.unwrap())));
        view.set_renderer("age", |_, _, _, _| Ok("rendered".to_string()));
        view.set_formatter("age", |_, _, value, index| {
            Ok(format!("{}@{}", value.unwrap(), index))
        });

        let tree = view.project();
        assert_eq!(tree.rows[0].cells[0].content.text(), "r1");
        assert_eq!(tree.rows[2].cells[1].content.text(), "25@2");
    }

    #[test]
    fn test_failing_formatter_blanks_only_its_cell() {
        let mut view = age_view();
        view.set_formatter("age", |row, _, value, _| {
            if row.get("id") == Some(&json!(2)) {
                Err(anyhow!("boom"))
            } else {
                Ok(value.map(|v| v.to_string()).unwrap_or_default())
            }
        });

        let tree = view.project();
        let ages: Vec<String> = tree.rows.iter().map(|r| r.cells[1].content.text()).collect();
        assert_eq!(ages, vec!["30", "", "25"]);
        assert_eq!(tree.rows[1].cells[0].content.text(), "2");
    }

    #[test]
    fn test_project_marks_stripes_filters_and_empty_text() {
        let mut view = age_view();
        view.set_options(ViewOptions {
            stripe: true,
            ..ViewOptions::default()
        });

        let tree = view.project();
        let stripes: Vec<bool> = tree.rows.iter().map(|r| r.striped).collect();
        assert_eq!(stripes, vec![false, true, false]);
        assert!(tree.empty_text.is_none());

        view.set_filter("age", vec![json!(99)]);
        let tree = view.project();
        assert!(tree.rows.is_empty());
        assert_eq!(tree.empty_text.as_deref(), Some("No data"));
        assert!(tree.columns[1].filtered);
    }

    #[test]
    fn test_project_does_not_change_state() {
        let mut view = age_view();
        let events = record_events(&mut view);
        view.toggle_sort("age");
        let before = view.derived_ids();

        let first = view.project();
        let second = view.project();

        assert_eq!(first, second);
        assert_eq!(view.derived_ids(), before);
        assert_eq!(events.borrow().len(), 1);
    }
}
