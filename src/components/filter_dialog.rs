//! Column filter dialog component
//!
//! Lists the distinct values of one column with checkboxes. Enter applies
//! the checked set as the column's accepted values.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::value::display_value;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use serde_json::Value;

/// Value filter dialog for a single column
pub struct FilterDialog {
    /// Column key the filter applies to
    pub column: String,
    /// Header label of the column
    pub label: String,
    /// Distinct values in the column
    pub values: Vec<Value>,
    /// Checked state per value
    pub checked: Vec<bool>,
    pub selected_index: usize,
    pub list_state: ListState,
}

impl Default for FilterDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterDialog {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            column: String::new(),
            label: String::new(),
            values: Vec::new(),
            checked: Vec::new(),
            selected_index: 0,
            list_state,
        }
    }

    /// Load the candidate values, pre-checking the ones already accepted
    pub fn open(&mut self, column: &str, label: &str, values: Vec<Value>, accepted: &[Value]) {
        self.column = column.to_string();
        self.label = label.to_string();
        self.checked = values.iter().map(|v| accepted.contains(v)).collect();
        self.values = values;
        self.selected_index = 0;
        self.list_state.select(Some(0));
    }

    /// Values currently checked, in list order
    pub fn accepted(&self) -> Vec<Value> {
        self.values
            .iter()
            .zip(&self.checked)
            .filter(|(_, checked)| **checked)
            .map(|(value, _)| value.clone())
            .collect()
    }

    fn toggle_current(&mut self) {
        if let Some(checked) = self.checked.get_mut(self.selected_index) {
            *checked = !*checked;
        }
    }

    fn toggle_every(&mut self) {
        let all = self.checked.iter().all(|&c| c);
        self.checked.iter_mut().for_each(|c| *c = !all);
    }

    fn select_next(&mut self) {
        if self.selected_index + 1 < self.values.len() {
            self.selected_index += 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    fn select_prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.list_state.select(Some(self.selected_index));
        }
    }
}

impl Component for FilterDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::CloseModal),
            KeyCode::Enter => Some(Action::ApplyColumnFilter(
                self.column.clone(),
                self.accepted(),
            )),
            KeyCode::Char('c') => Some(Action::ClearColumnFilter(self.column.clone())),
            KeyCode::Char(' ') => {
                self.toggle_current();
                None
            }
            KeyCode::Char('a') => {
                self.toggle_every();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let content_height = (self.values.len().max(1) as u16).saturating_add(2);
        let popup_area = centered_popup(area, 50, content_height.saturating_add(6));

        frame.render_widget(Clear, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(3),    // Value list
                Constraint::Length(3), // Help bar
            ])
            .split(popup_area);

        let checked = self.checked.iter().filter(|&&c| c).count();
        let header_text = if checked == 0 {
            "No filter active".to_string()
        } else {
            format!("{} of {} values accepted", checked, self.values.len())
        };
        let header = Paragraph::new(Line::from(Span::styled(
            header_text,
            Style::default().fg(Color::Cyan),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Filter: {} ", self.label))
                .title_style(
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
        );
        frame.render_widget(header, chunks[0]);

        if self.values.is_empty() {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Column has no values",
                    Style::default().fg(Color::Yellow),
                )),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
            frame.render_widget(empty, chunks[1]);
        } else {
            let items: Vec<ListItem> = self
                .values
                .iter()
                .zip(&self.checked)
                .map(|(value, &checked)| {
                    let text = match value {
                        Value::Null => "(empty)".to_string(),
                        other => display_value(Some(other)),
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            if checked { "[x] " } else { "[ ] " },
                            Style::default().fg(Color::Green),
                        ),
                        Span::styled(text, Style::default().fg(Color::White)),
                    ]))
                })
                .collect();

            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray)),
                )
                .highlight_style(
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▶ ");

            frame.render_stateful_widget(list, chunks[1], &mut self.list_state);
        }

        let help = Paragraph::new(Line::from(vec![
            Span::styled(" Space ", Style::default().fg(Color::Cyan)),
            Span::raw("Toggle  "),
            Span::styled(" Enter ", Style::default().fg(Color::Yellow)),
            Span::raw("Apply  "),
            Span::styled(" c ", Style::default().fg(Color::Yellow)),
            Span::raw("Clear  "),
            Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
            Span::raw("Cancel"),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[2]);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn press(dialog: &mut FilterDialog, code: KeyCode) -> Option<Action> {
        dialog
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn test_open_prechecks_accepted_values() {
        let mut dialog = FilterDialog::new();
        dialog.open(
            "city",
            "City",
            vec![json!("Oslo"), json!("Paris"), json!("Rome")],
            &[json!("Paris")],
        );
        assert_eq!(dialog.checked, vec![false, true, false]);
        assert_eq!(dialog.accepted(), vec![json!("Paris")]);
    }

    #[test]
    fn test_toggle_and_apply() {
        let mut dialog = FilterDialog::new();
        dialog.open("city", "City", vec![json!("Oslo"), json!("Paris")], &[]);

        assert_eq!(press(&mut dialog, KeyCode::Char(' ')), None);
        press(&mut dialog, KeyCode::Char('j'));
        press(&mut dialog, KeyCode::Char('j'));
        press(&mut dialog, KeyCode::Char(' '));

        assert_eq!(
            press(&mut dialog, KeyCode::Enter),
            Some(Action::ApplyColumnFilter(
                "city".to_string(),
                vec![json!("Oslo"), json!("Paris")]
            ))
        );
    }

    #[test]
    fn test_toggle_every_value() {
        let mut dialog = FilterDialog::new();
        dialog.open("n", "N", vec![json!(1), json!(2)], &[json!(1)]);

        press(&mut dialog, KeyCode::Char('a'));
        assert_eq!(dialog.checked, vec![true, true]);
        press(&mut dialog, KeyCode::Char('a'));
        assert_eq!(dialog.checked, vec![false, false]);
    }

    #[test]
    fn test_clear_and_cancel() {
        let mut dialog = FilterDialog::new();
        dialog.open("city", "City", vec![json!("Oslo")], &[]);
        assert_eq!(
            press(&mut dialog, KeyCode::Char('c')),
            Some(Action::ClearColumnFilter("city".to_string()))
        );
        assert_eq!(press(&mut dialog, KeyCode::Esc), Some(Action::CloseModal));
    }

    #[test]
    fn test_draw_fits_short_terminal() {
        let mut dialog = FilterDialog::new();
        dialog.open(
            "city",
            "City",
            vec![json!("Oslo"), json!("Paris"), json!("Rome")],
            &[],
        );

        for (width, height) in [(60, 6), (20, 3), (80, 30)] {
            let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
            terminal
                .draw(|frame| {
                    dialog.draw(frame, frame.area()).unwrap();
                })
                .unwrap();
        }
    }
}
