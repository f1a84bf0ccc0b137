//! Root application component
//!
//! The App owns the [`TabularView`] and routes Actions from child
//! components into view operations. After every Action the table is
//! re-projected and the events it emitted are reported on the status line.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    calculate_main_layout, FilterDialog, HelpDialog, QuitDialog, TableComponent,
};
use crate::model::modal::{Modal, ModalStack};
use crate::model::{ColumnDescriptor, Record, TableEvent, TabularView, ViewOptions};
use crate::services;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Files the table was loaded from
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    pub data: PathBuf,
    pub columns: Option<PathBuf>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Table state
    pub view: TabularView,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Where rows and columns come from, if loaded from disk
    pub source: Option<DataSource>,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Error message to display
    pub error: Option<String>,

    /// Status message to display
    pub status_message: Option<String>,

    /// Events emitted by the view since the last Action
    events: Rc<RefCell<Vec<TableEvent>>>,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub table: TableComponent,
    pub filter_dialog: FilterDialog,
    pub help_dialog: HelpDialog,
    pub quit_dialog: QuitDialog,
}

impl Default for App {
    fn default() -> Self {
        Self::new(ViewOptions::default())
    }
}

impl App {
    pub fn new(options: ViewOptions) -> App {
        let mut view = TabularView::with_options(options);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        view.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        App {
            view,
            modals: ModalStack::new(),
            source: None,
            should_quit: false,
            error: None,
            status_message: None,
            events,
            table: TableComponent::new(),
            filter_dialog: FilterDialog::new(),
            help_dialog: HelpDialog::default(),
            quit_dialog: QuitDialog::default(),
        }
    }

    /// Load rows (and optionally column descriptors) from disk
    pub fn open(&mut self, data: PathBuf, columns: Option<PathBuf>) -> Result<()> {
        let source = DataSource { data, columns };
        self.load(&source)?;
        self.source = Some(source);
        Ok(())
    }

    fn load(&mut self, source: &DataSource) -> Result<()> {
        let loaded = services::load_rows(&source.data)?;
        let columns = match &source.columns {
            Some(path) => services::load_columns(path)?,
            None => services::infer_columns(&loaded),
        };

        let title = source
            .data
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.data.display().to_string());
        self.table.set_title(title);
        self.set_table(columns, loaded.records);
        Ok(())
    }

    /// Replace columns and rows. Selection, current row and expansion refer
    /// to the old rows, so they are reset first.
    pub fn set_table(&mut self, columns: Vec<ColumnDescriptor>, records: Vec<Record>) {
        self.view.clear_selection();
        self.view.set_current(None);
        self.view.clear_expansion();
        self.view.set_columns(columns);
        self.view.set_rows(records);
        self.refresh();
    }

    fn reload(&mut self) {
        let Some(source) = self.source.clone() else {
            self.status_message = Some("Nothing to reload".to_string());
            return;
        };
        match self.load(&source) {
            Ok(()) => {
                self.error = None;
                self.status_message = Some(format!("Reloaded {} rows", self.view.rows().len()));
                log::info!("Reloaded {}", source.data.display());
            }
            Err(e) => {
                log::error!("Reload failed: {:#}", e);
                self.error = Some(format!("{:#}", e));
            }
        }
    }

    /// Re-project the view into the table and report emitted events
    fn refresh(&mut self) {
        self.table.sync(self.view.project());

        let events: Vec<TableEvent> = self.events.borrow_mut().drain(..).collect();
        for event in &events {
            log::info!("{}", event);
        }
        if let Some(last) = events.last() {
            self.status_message = Some(describe_event(last));
        }
    }

    /// Key of the focused column when it is a plain field column
    fn focused_key(&self) -> Option<String> {
        self.table
            .focused_column()
            .filter(|column| !column.key.is_empty())
            .map(|column| column.key.clone())
    }

    fn toggle_sort(&mut self) {
        let Some(column) = self.table.focused_column() else {
            return;
        };
        if !column.sortable {
            self.status_message = Some(format!("{} is not sortable", column.label));
            return;
        }
        if let Some(key) = self.focused_key() {
            self.view.toggle_sort(&key);
        }
    }

    fn open_column_filter(&mut self) {
        let Some(column) = self.table.focused_column() else {
            return;
        };
        if !column.filterable || column.key.is_empty() {
            self.status_message = Some(format!("{} is not filterable", column.label));
            return;
        }
        let key = column.key.clone();
        let label = column.label.clone();

        let values = self.view.distinct_values(&key);
        let accepted = self.view.filters().accepted(&key).to_vec();
        self.filter_dialog.open(&key, &label, values, &accepted);
        self.modals.push(Modal::ColumnFilter { column: key });
    }
}

impl Component for App {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // Any key dismisses an error
        if self.error.take().is_some() {
            return Ok(None);
        }

        match self.modals.top() {
            Some(Modal::QuitConfirm) => self.quit_dialog.handle_key_event(key),
            Some(Modal::ColumnFilter { .. }) => self.filter_dialog.handle_key_event(key),
            Some(Modal::Help) => self.help_dialog.handle_key_event(key),
            None => self.table.handle_key_event(key),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if !matches!(action, Action::Tick) {
            log::debug!("Action: {}", action);
        }

        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick | Action::Resize(_, _) => return Ok(None),
            Action::ForceQuit => {
                self.should_quit = true;
                return Ok(None);
            }
            Action::Reload => self.reload(),

            // ─────────────────────────────────────────────────────────────────
            // Navigation (delegate to TableComponent)
            // ─────────────────────────────────────────────────────────────────
            Action::NextRow
            | Action::PrevRow
            | Action::FirstRow
            | Action::LastRow
            | Action::PageDown
            | Action::PageUp
            | Action::NextColumn
            | Action::PrevColumn => {
                return self.table.update(action);
            }

            // ─────────────────────────────────────────────────────────────────
            // Sorting & Filtering
            // ─────────────────────────────────────────────────────────────────
            Action::ToggleSort => self.toggle_sort(),
            Action::ClearSort => self.view.clear_sort(),
            Action::OpenColumnFilter => self.open_column_filter(),
            Action::ApplyColumnFilter(key, values) => {
                self.modals.pop();
                self.view.set_filter(&key, values);
            }
            Action::ClearColumnFilter(key) => {
                self.modals.pop();
                self.view.clear_filter(Some(key.as_str()));
            }
            Action::ClearAllFilters => self.view.clear_filter(None),

            // ─────────────────────────────────────────────────────────────────
            // Rows
            // ─────────────────────────────────────────────────────────────────
            Action::ToggleRowSelection => {
                if let Some(id) = self.table.cursor_row() {
                    self.view.toggle_selection(id, None);
                }
            }
            Action::ToggleAllSelection => self.view.toggle_all(),
            Action::ClearSelection => self.view.clear_selection(),
            Action::ToggleRowExpansion => {
                if let Some(id) = self.table.cursor_row() {
                    self.view.toggle_expansion(id);
                }
            }
            Action::ClickRow => {
                if let Some(id) = self.table.cursor_row() {
                    self.view.click_row(id);
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                self.quit_dialog.selected = self.view.selection().len();
                self.modals.push(Modal::QuitConfirm);
            }
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help);
            }
            Action::CloseModal => {
                self.modals.pop();
            }
        }

        self.refresh();
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = calculate_main_layout(area);

        self.table.draw(frame, layout.table)?;
        self.render_status_bar(frame, layout.status);
        render_help_bar(frame, layout.help, self.modals.top());

        match self.modals.top() {
            Some(Modal::QuitConfirm) => self.quit_dialog.draw(frame, area)?,
            Some(Modal::ColumnFilter { .. }) => self.filter_dialog.draw(frame, area)?,
            Some(Modal::Help) => self.help_dialog.draw(frame, area)?,
            None => {}
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Status & Help Bars
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            format!(" {}/{} rows ", self.view.derived_len(), self.view.rows().len()),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];

        let selected = self.view.selection().len();
        if selected > 0 {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!(" {} selected ", selected),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        let sort = self.view.sort_state();
        if let (Some(column), Some(direction)) = (sort.column(), sort.direction()) {
            spans.push(Span::styled(
                format!(" sort: {} {}", column, direction.caret()),
                Style::default().fg(Color::Magenta),
            ));
        }

        let filtered: Vec<&str> = self.view.filters().iter().map(|(key, _)| key).collect();
        if !filtered.is_empty() {
            spans.push(Span::styled(
                format!(" filter: {}", filtered.join(", ")),
                Style::default().fg(Color::Magenta),
            ));
        }

        if let Some(error) = &self.error {
            spans.push(Span::styled(
                format!(" Error: {} ", error),
                Style::default().fg(Color::Red),
            ));
        } else if let Some(status) = &self.status_message {
            spans.push(Span::styled(
                format!("  {} ", status),
                Style::default().fg(Color::Yellow),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn render_help_bar(frame: &mut Frame, area: Rect, modal: Option<&Modal>) {
    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let shortcuts: &[(&str, &str)] = match modal {
        Some(_) => &[(" Esc ", "Close")],
        None => &[
            (" s ", "Sort  "),
            (" f ", "Filter  "),
            (" Space ", "Select  "),
            (" Tab ", "Expand  "),
            (" Enter ", "Activate  "),
            (" ? ", "Help  "),
            (" q ", "Quit"),
        ],
    };

    let spans: Vec<Span> = shortcuts
        .iter()
        .flat_map(|(key, label)| [Span::styled(*key, key_style), Span::raw(*label)])
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Short status line text for an emitted event
fn describe_event(event: &TableEvent) -> String {
    match event {
        TableEvent::SortChange {
            column: Some(column),
            direction: Some(direction),
        } => format!("Sorted by {} {}", column, direction),
        TableEvent::SortChange { .. } => "Sort cleared".to_string(),
        TableEvent::SelectionChange { selection } => {
            format!("{} rows selected", selection.len())
        }
        TableEvent::CurrentChange { current: Some(id) } => format!("Current row {}", id),
        TableEvent::CurrentChange { current: None } => "No current row".to_string(),
        TableEvent::ExpandChange { row, expanded } => {
            let verb = if *expanded { "Expanded" } else { "Collapsed" };
            format!("{} row {}", verb, row)
        }
        TableEvent::RowClick { row, index } => format!("Activated row {} at {}", row, index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnKind;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn app() -> App {
        let mut app = App::default();
        app.set_table(
            vec![
                ColumnDescriptor::special(ColumnKind::Selection),
                ColumnDescriptor::new("name", "Name").sortable(),
                ColumnDescriptor::new("city", "City").filterable(),
            ],
            vec![
                record(json!({"name": "Carol", "city": "Oslo"})),
                record(json!({"name": "Alice", "city": "Paris"})),
                record(json!({"name": "Bob", "city": "Oslo"})),
            ],
        );
        app
    }

    fn names(app: &App) -> Vec<String> {
        app.view
            .derive()
            .iter()
            .map(|row| row.get("name").and_then(|v| v.as_str()).unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_sort_focused_column() {
        let mut app = app();
        app.update(Action::NextColumn).unwrap();
        app.update(Action::ToggleSort).unwrap();

        assert_eq!(names(&app), vec!["Alice", "Bob", "Carol"]);
        assert_eq!(app.status_message.as_deref(), Some("Sorted by name ascending"));

        app.update(Action::ClearSort).unwrap();
        assert_eq!(names(&app), vec!["Carol", "Alice", "Bob"]);
        assert_eq!(app.status_message.as_deref(), Some("Sort cleared"));
    }

    #[test]
    fn test_sort_rejected_on_plain_column() {
        let mut app = app();
        app.update(Action::NextColumn).unwrap();
        app.update(Action::NextColumn).unwrap();
        app.update(Action::ToggleSort).unwrap();

        assert!(!app.view.sort_state().is_active());
        assert_eq!(app.status_message.as_deref(), Some("City is not sortable"));
    }

    #[test]
    fn test_filter_dialog_flow() {
        let mut app = app();
        app.update(Action::NextColumn).unwrap();
        app.update(Action::NextColumn).unwrap();
        app.update(Action::OpenColumnFilter).unwrap();

        assert_eq!(
            app.modals.top(),
            Some(&Modal::ColumnFilter {
                column: "city".to_string()
            })
        );
        assert_eq!(app.filter_dialog.values, vec![json!("Oslo"), json!("Paris")]);

        app.update(Action::ApplyColumnFilter("city".to_string(), vec![json!("Oslo")]))
            .unwrap();
        assert!(app.modals.is_empty());
        assert_eq!(names(&app), vec!["Carol", "Bob"]);

        app.update(Action::ClearAllFilters).unwrap();
        assert_eq!(app.view.derived_len(), 3);
    }

    #[test]
    fn test_selection_follows_cursor() {
        let mut app = app();
        app.update(Action::NextRow).unwrap();
        app.update(Action::ToggleRowSelection).unwrap();

        let alice = app.view.derive()[1].id;
        assert_eq!(app.view.selection(), vec![alice]);
        assert_eq!(app.status_message.as_deref(), Some("1 rows selected"));

        app.update(Action::ToggleAllSelection).unwrap();
        assert_eq!(app.view.selection().len(), 3);
        app.update(Action::ClearSelection).unwrap();
        assert!(app.view.selection().is_empty());
    }

    #[test]
    fn test_expand_and_click() {
        let mut app = app();
        app.update(Action::ToggleRowExpansion).unwrap();
        let first = app.view.derive()[0].id;

        assert!(app.view.is_expanded(first));
        assert!(app.table.tree().rows[0].expanded);

        app.update(Action::ClickRow).unwrap();
        assert_eq!(
            app.status_message.as_deref(),
            Some(format!("Activated row {} at 1", first).as_str())
        );
    }

    #[test]
    fn test_quit_dialog_reports_selection() {
        let mut app = app();
        let first = app.view.derive()[0].id;
        app.view.select(first);
        app.update(Action::OpenQuitDialog).unwrap();
        assert_eq!(app.quit_dialog.selected, 1);
        assert_eq!(app.modals.top(), Some(&Modal::QuitConfirm));

        app.update(Action::CloseModal).unwrap();
        assert!(app.modals.is_empty());

        app.update(Action::ForceQuit).unwrap();
        assert!(app.should_quit);
    }

    fn temp_csv(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tabular-view-app-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_reload_resets_row_state() {
        let path = temp_csv("reload.csv", "name,city\nAlice,Paris\nBob,Oslo\n");
        let mut app = App::new(ViewOptions {
            highlight_current_row: true,
            default_expand_all: true,
            ..ViewOptions::default()
        });
        app.open(path, None).unwrap();
        assert_eq!(app.view.expanded_len(), 2);

        app.update(Action::ToggleAllSelection).unwrap();
        app.update(Action::ClickRow).unwrap();
        assert_eq!(app.view.selection().len(), 2);
        assert!(app.view.current().is_some());

        app.update(Action::Reload).unwrap();
        assert!(app.view.selection().is_empty());
        assert_eq!(app.view.current(), None);
        assert_eq!(app.view.expanded_len(), 2);
        assert!(app.view.derived_ids().iter().all(|&id| app.view.is_expanded(id)));
        assert_eq!(app.status_message.as_deref(), Some("Reloaded 2 rows"));

        app.update(Action::ToggleAllSelection).unwrap();
        assert_eq!(app.view.selection(), app.view.derived_ids());
    }

    #[test]
    fn test_reload_with_changed_columns_drops_stale_filter() {
        let mut app = app();
        app.view.set_filter("city", vec![json!("Oslo")]);
        app.set_table(
            vec![ColumnDescriptor::new("name", "Name")],
            vec![
                record(json!({"name": "Carol", "city": "Oslo"})),
                record(json!({"name": "Alice", "city": "Paris"})),
            ],
        );
        assert!(app.view.filters().is_empty());
        assert_eq!(app.view.derived_len(), 2);
    }

    #[test]
    fn test_draw_with_filter_dialog_on_small_terminal() {
        use ratatui::{backend::TestBackend, Terminal};

        let mut app = app();
        app.update(Action::NextColumn).unwrap();
        app.update(Action::NextColumn).unwrap();
        app.update(Action::OpenColumnFilter).unwrap();

        for (width, height) in [(30, 4), (80, 24)] {
            let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
            terminal
                .draw(|frame| {
                    app.draw(frame, frame.area()).unwrap();
                })
                .unwrap();
        }
    }

    #[test]
    fn test_reload_without_source() {
        let mut app = app();
        app.update(Action::Reload).unwrap();
        assert_eq!(app.status_message.as_deref(), Some("Nothing to reload"));
    }
}
