//! Render functions for the TUI.

use listsync::state::{ListState, NoticeKind};
use listsync::util::{fit_to_width, sanitize_cell};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use super::status;
use super::view::ListView;

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 10;

const MARKER_WIDTH: u16 = 1;
const CHECK_WIDTH: u16 = 3;
const ID_WIDTH: u16 = 7;
const COLUMN_SPACING: u16 = 1;

pub(super) fn render(f: &mut Frame, state: &ListState, view: &mut ListView) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let mut constraints = vec![Constraint::Length(3), Constraint::Length(1)];
    if state.error().is_some() {
        constraints.push(Constraint::Length(1));
    }
    if state.sync_notice().is_some() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(3));
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_search(f, state, chunks[0]);
    render_totals(f, state, chunks[1]);

    let mut next = 2;
    if let Some(error) = state.error() {
        let banner = Paragraph::new(sanitize_cell(error).into_owned())
            .style(Style::default().fg(Color::White).bg(Color::Red));
        f.render_widget(banner, chunks[next]);
        next += 1;
    }
    if let Some(notice) = state.sync_notice() {
        let label = match notice.kind {
            NoticeKind::Selection => "selection",
            NoticeKind::Order => "order",
            NoticeKind::Settings => "settings",
        };
        let text = format!("⚠ [{}] {}  (Ctrl+N dismiss)", label, notice.message);
        let line = Paragraph::new(sanitize_cell(&text).into_owned())
            .style(Style::default().fg(Color::Black).bg(Color::Yellow));
        f.render_widget(line, chunks[next]);
        next += 1;
    }

    render_table(f, state, view, chunks[next]);
    status::render(f, state, chunks[next + 1]);
}

fn render_search(f: &mut Frame, state: &ListState, area: Rect) {
    let query = sanitize_cell(state.query());
    let input = Paragraph::new(Line::from(vec![
        Span::raw(query.into_owned()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title("Search"),
    );
    f.render_widget(input, area);
}

fn render_totals(f: &mut Frame, state: &ListState, area: Rect) {
    let text = format!(
        "Total: {} | Selected: {}",
        state.total_items(),
        state.selected_ids().len()
    );
    f.render_widget(
        Paragraph::new(text).style(Style::default().add_modifier(Modifier::BOLD)),
        area,
    );
}

fn render_table(f: &mut Frame, state: &ListState, view: &mut ListView, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        "Items ({}/{})",
        state.items().len(),
        state.total_items()
    ));
    let inner = block.inner(area);
    // One row for the header.
    view.set_viewport(inner.height.saturating_sub(1) as usize);
    view.clamp(state.items().len());

    if state.items().is_empty() {
        let msg = if state.loading_initial() {
            "Loading…"
        } else if !state.query().is_empty() {
            "Nothing matches your search"
        } else {
            "The list is empty"
        };
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let fixed = MARKER_WIDTH + CHECK_WIDTH + ID_WIDTH + 3 * COLUMN_SPACING;
    let value_width = inner.width.saturating_sub(fixed) as usize;
    let dragged = state.active_drag_item().map(|item| item.id);

    let rows: Vec<Row> = state
        .items()
        .iter()
        .enumerate()
        .skip(view.offset)
        .take(view.viewport_rows)
        .map(|(i, item)| {
            let is_cursor = i == view.cursor;
            let is_dragged = dragged == Some(item.id);

            let marker = if is_dragged {
                Span::styled("≡", Style::default().fg(Color::Magenta))
            } else if is_cursor && dragged.is_some() {
                Span::styled("▸", Style::default().fg(Color::Magenta))
            } else {
                Span::raw(" ")
            };
            let check = if item.selected {
                Span::styled("[x]", Style::default().fg(Color::Green))
            } else {
                Span::raw("[ ]")
            };
            let value = sanitize_cell(&item.value);
            let value = fit_to_width(&value, value_width).into_owned();

            let style = if is_dragged {
                Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC)
            } else if is_cursor {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(marker),
                Cell::from(check),
                Cell::from(item.id.to_string()),
                Cell::from(value),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(vec!["", "Sel", "ID", "Value"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Length(MARKER_WIDTH),
            Constraint::Length(CHECK_WIDTH),
            Constraint::Length(ID_WIDTH),
            Constraint::Min(1),
        ],
    )
    .header(header)
    .column_spacing(COLUMN_SPACING)
    .block(block);

    f.render_widget(table, area);
}
