//! Table component
//!
//! Draws a [`PresentationTree`] with a sticky header, a row cursor, a
//! focused column and horizontal scrolling over unpinned columns. Expanded
//! rows show their fields underneath.

use crate::action::Action;
use crate::component::Component;
use crate::model::{Align, CellContent, FixedSide, HeaderCell, PresentationTree, RowId, RowNode};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a column grows when sized from its content
const MAX_AUTO_WIDTH: usize = 40;

/// Column separator
const SEPARATOR: &str = "│";

/// Table component for the derived view
pub struct TableComponent {
    /// Latest projection of the table view
    tree: PresentationTree,
    /// Title shown on the border
    title: String,
    /// Cursor position in the derived view
    cursor: usize,
    /// Index into `tree.columns`
    focused_column: usize,
    /// First body line shown
    scroll: usize,
    /// First unpinned column shown
    column_offset: usize,
    /// Rows per page, measured on the last draw
    page_size: usize,
}

impl Default for TableComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl TableComponent {
    pub fn new() -> Self {
        Self {
            tree: PresentationTree::default(),
            title: String::new(),
            cursor: 0,
            focused_column: 0,
            scroll: 0,
            column_offset: 0,
            page_size: 10,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Replace the projection. The cursor follows the row it was on if
    /// that row is still visible.
    pub fn sync(&mut self, tree: PresentationTree) {
        let previous = self.cursor_row();
        self.tree = tree;

        if let Some(index) = previous
            .and_then(|id| self.tree.rows.iter().position(|row| row.id == id))
        {
            self.cursor = index;
        }
        self.cursor = self.cursor.min(self.tree.rows.len().saturating_sub(1));
        self.focused_column = self
            .focused_column
            .min(self.tree.columns.len().saturating_sub(1));
    }

    pub fn tree(&self) -> &PresentationTree {
        &self.tree
    }

    /// Row under the cursor
    pub fn cursor_row(&self) -> Option<RowId> {
        self.tree.rows.get(self.cursor).map(|row| row.id)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Column with focus, used for sorting and filtering
    pub fn focused_column(&self) -> Option<&HeaderCell> {
        self.tree.columns.get(self.focused_column)
    }

    fn move_cursor(&mut self, delta: isize) {
        let last = self.tree.rows.len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    fn move_focus(&mut self, delta: isize) {
        let last = self.tree.columns.len().saturating_sub(1);
        self.focused_column = self.focused_column.saturating_add_signed(delta).min(last);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Layout
    // ─────────────────────────────────────────────────────────────────────────

    /// Pick the columns that fit in `width` cells: pinned-left columns,
    /// unpinned columns from `column_offset`, then pinned-right columns.
    /// Adjusts `column_offset` so the focused column stays visible.
    fn visible_columns(&mut self, widths: &[usize], width: usize) -> Vec<usize> {
        let pad = self.tree.size.cell_padding();
        let slot = |i: usize| widths[i] + pad * 2 + SEPARATOR.width();

        let order = display_order(&self.tree.columns);
        let (pinned, free): (Vec<usize>, Vec<usize>) = order
            .iter()
            .partition(|&&i| self.tree.columns[i].fixed.is_some());
        let pinned_width: usize = pinned.iter().map(|&i| slot(i)).sum();
        let room = width.saturating_sub(pinned_width);

        let fits_from = |offset: usize, target: usize| {
            let mut used = 0;
            for &i in &free[offset..] {
                used += slot(i);
                if i == target {
                    return used <= room || free[offset] == target;
                }
            }
            false
        };

        if let Some(pos) = free.iter().position(|&i| i == self.focused_column) {
            if pos < self.column_offset {
                self.column_offset = pos;
            }
            while self.column_offset < pos && !fits_from(self.column_offset, self.focused_column) {
                self.column_offset += 1;
            }
        }
        self.column_offset = self.column_offset.min(free.len().saturating_sub(1));

        let mut shown_free = Vec::new();
        let mut used = 0;
        for &i in free.iter().skip(self.column_offset) {
            if used + slot(i) > room && !shown_free.is_empty() {
                break;
            }
            used += slot(i);
            shown_free.push(i);
        }

        order
            .into_iter()
            .filter(|i| pinned.contains(i) || shown_free.contains(i))
            .collect()
    }

    fn header_line(&self, visible: &[usize], widths: &[usize]) -> Line<'static> {
        let pad = " ".repeat(self.tree.size.cell_padding());
        let mut spans = Vec::new();

        for &i in visible {
            let cell = &self.tree.columns[i];
            let mut style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
            if cell.sort.is_some() {
                style = style.fg(Color::Magenta);
            }
            if cell.filtered {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            if i == self.focused_column {
                style = style.bg(Color::DarkGray);
            }
            spans.push(Span::styled(
                format!("{}{}{}", pad, fit_cell(&header_text(cell), widths[i], cell.align), pad),
                style,
            ));
            spans.push(Span::styled(SEPARATOR, Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }

    fn row_style(&self, row: &RowNode) -> Style {
        let mut style = Style::default().fg(Color::White);
        if row.striped {
            style = style.bg(Color::Indexed(236));
        }
        if row.selected {
            style = style.fg(Color::Green);
        }
        if row.current {
            style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }
        if row.index == self.cursor {
            style = style.bg(Color::Blue);
        }
        style
    }

    /// Body lines plus the first line index of every row
    fn body_lines(&self, visible: &[usize], widths: &[usize]) -> (Vec<Line<'static>>, Vec<usize>) {
        let pad = " ".repeat(self.tree.size.cell_padding());
        let spacing = self.tree.size.row_spacing() as usize;
        let mut lines = Vec::new();
        let mut starts = Vec::with_capacity(self.tree.rows.len());

        for row in &self.tree.rows {
            starts.push(lines.len());
            let style = self.row_style(row);

            let mut spans = Vec::new();
            for &i in visible {
                let Some(cell) = row.cells.get(i) else {
                    continue;
                };
                let text = cell.content.text().replace('\n', " ");
                let mut cell_style = style;
                if matches!(cell.content, CellContent::Checkbox { checked: true }) {
                    cell_style = cell_style.fg(Color::Green);
                }
                spans.push(Span::styled(
                    format!("{}{}{}", pad, fit_cell(&text, widths[i], cell.align), pad),
                    cell_style,
                ));
                spans.push(Span::styled(SEPARATOR, Style::default().fg(Color::DarkGray)));
            }
            lines.push(Line::from(spans));

            for detail in &row.detail {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("    {}: ", detail.label),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(detail.text.clone(), Style::default().fg(Color::White)),
                ]));
            }
            if row.expanded && !row.detail.is_empty() {
                lines.push(Line::from(""));
            }

            for _ in 0..spacing {
                lines.push(Line::from(""));
            }
        }

        (lines, starts)
    }

    /// Scroll so the cursor row's first line and as much of its detail as
    /// possible are visible
    fn follow_cursor(&mut self, starts: &[usize], total: usize, height: usize) {
        let Some(&start) = starts.get(self.cursor) else {
            self.scroll = 0;
            return;
        };
        let end = starts.get(self.cursor + 1).copied().unwrap_or(total);

        if start < self.scroll {
            self.scroll = start;
        } else if end > self.scroll + height {
            self.scroll = end.saturating_sub(height).min(start);
        }
        self.scroll = self.scroll.min(total.saturating_sub(1));
    }
}

impl Component for TableComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            KeyCode::Char('c') if ctrl => Some(Action::ForceQuit),
            KeyCode::Char('d') if ctrl => Some(Action::PageDown),
            KeyCode::Char('u') if ctrl => Some(Action::PageUp),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextRow),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevRow),
            KeyCode::Char('g') | KeyCode::Home => Some(Action::FirstRow),
            KeyCode::Char('G') | KeyCode::End => Some(Action::LastRow),
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::NextColumn),
            KeyCode::Char('h') | KeyCode::Left => Some(Action::PrevColumn),
            KeyCode::Char('s') => Some(Action::ToggleSort),
            KeyCode::Char('S') => Some(Action::ClearSort),
            KeyCode::Char(' ') => Some(Action::ToggleRowSelection),
            KeyCode::Char('a') => Some(Action::ToggleAllSelection),
            KeyCode::Esc => Some(Action::ClearSelection),
            KeyCode::Tab | KeyCode::Char('e') => Some(Action::ToggleRowExpansion),
            KeyCode::Enter => Some(Action::ClickRow),
            KeyCode::Char('f') => Some(Action::OpenColumnFilter),
            KeyCode::Char('F') => Some(Action::ClearAllFilters),
            KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('q') => Some(Action::OpenQuitDialog),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let page = self.page_size.max(1) as isize;
        match action {
            Action::NextRow => self.move_cursor(1),
            Action::PrevRow => self.move_cursor(-1),
            Action::PageDown => self.move_cursor(page),
            Action::PageUp => self.move_cursor(-page),
            Action::FirstRow => self.cursor = 0,
            Action::LastRow => self.cursor = self.tree.rows.len().saturating_sub(1),
            Action::NextColumn => self.move_focus(1),
            Action::PrevColumn => self.move_focus(-1),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let title = format!(" {} ({}) ", self.title, self.tree.rows.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let header_height = if self.tree.show_header { 2 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(header_height), Constraint::Min(0)])
            .split(inner);

        let widths = column_widths(&self.tree, inner.width);
        let visible = self.visible_columns(&widths, inner.width as usize);

        if self.tree.show_header {
            let separator = Line::from(Span::styled(
                "─".repeat(inner.width as usize),
                Style::default().fg(Color::DarkGray),
            ));
            let header = Paragraph::new(vec![self.header_line(&visible, &widths), separator]);
            frame.render_widget(header, chunks[0]);
        }

        let body_area = chunks[1];
        let height = body_area.height as usize;
        let rows_per_line = 1 + self.tree.size.row_spacing() as usize;
        self.page_size = (height / rows_per_line).max(1);

        if let Some(empty_text) = &self.tree.empty_text {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    empty_text.clone(),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(empty, body_area);
            return Ok(());
        }

        let (lines, starts) = self.body_lines(&visible, &widths);
        let total = lines.len();
        self.follow_cursor(&starts, total, height);

        let body = Paragraph::new(lines).scroll((self.scroll as u16, 0));
        frame.render_widget(body, body_area);

        // Render scrollbar if content exceeds visible area
        if height > 0 && total > height {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(height)).position(self.scroll);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Cell Layout Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Header label with sort caret and filter marker
pub fn header_text(cell: &HeaderCell) -> String {
    let mut text = cell.label.clone();
    match cell.sort {
        Some(direction) => {
            text.push(' ');
            text.push_str(direction.caret());
        }
        None if cell.sortable => text.push_str(" ↕"),
        None => {}
    }
    if cell.filtered {
        text.push_str(" ⚑");
    }
    text
}

/// Column indices in display order: pinned-left, unpinned, pinned-right
pub fn display_order(columns: &[HeaderCell]) -> Vec<usize> {
    let side = |i: &usize| match columns[*i].fixed {
        Some(FixedSide::Left) => 0,
        None => 1,
        Some(FixedSide::Right) => 2,
    };
    let mut order: Vec<usize> = (0..columns.len()).collect();
    order.sort_by_key(side);
    order
}

/// Width of every column in cells. Explicit widths win; otherwise the
/// widest of header and content, capped, then raised to the minimum width.
pub fn column_widths(tree: &PresentationTree, total: u16) -> Vec<usize> {
    tree.columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let natural = match column.width {
                Some(width) => width.resolve(total) as usize,
                None => {
                    let content = tree
                        .rows
                        .iter()
                        .filter_map(|row| row.cells.get(i))
                        .map(|cell| cell.content.text().width())
                        .max()
                        .unwrap_or(0);
                    header_text(column).width().max(content).min(MAX_AUTO_WIDTH)
                }
            };
            let min = column
                .min_width
                .map(|m| m.resolve(total) as usize)
                .unwrap_or(0);
            natural.max(min).max(1)
        })
        .collect()
}

/// Pad or truncate `text` to exactly `width` display cells
pub fn fit_cell(text: &str, width: usize, align: Align) -> String {
    let body = if text.width() > width {
        truncate(text, width)
    } else {
        text.to_string()
    };
    let pad = width.saturating_sub(body.width());

    match align {
        Align::Left => format!("{}{}", body, " ".repeat(pad)),
        Align::Right => format!("{}{}", " ".repeat(pad), body),
        Align::Center => {
            let left = pad / 2;
            format!("{}{}{}", " ".repeat(left), body, " ".repeat(pad - left))
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
