//! UI rendering using ratatui

use chrono::NaiveDateTime;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs},
    Frame,
};
use triagectl_core::{PatientRecord, Status, Urgency};

use super::app::{App, Mode, Tab};
use super::form::FormField;

/// Primary accent color
const ACCENT: Color = Color::Cyan;
/// Secondary color for less important elements
const SECONDARY: Color = Color::DarkGray;
/// Highlight color for selected items
const HIGHLIGHT: Color = Color::Yellow;
/// Success color
const SUCCESS: Color = Color::Green;
/// Dim text color
const DIM: Color = Color::Rgb(100, 100, 100);

/// Severity colors
const CRITICAL: Color = Color::Rgb(255, 51, 51);
const ELEVATED: Color = Color::Rgb(255, 153, 51);
const ROUTINE: Color = Color::Rgb(51, 255, 51);

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab header
            Constraint::Min(5),    // Table
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);

    match app.tab {
        Tab::Queue => render_queue(frame, app, chunks[1]),
        Tab::History => render_records(frame, app, &app.history_rows, " History ", chunks[1]),
        Tab::Search => {
            let title = if app.search_query.is_empty() {
                " Search (press / to type a name) ".to_string()
            } else {
                format!(" Search: '{}' ", app.search_query)
            };
            render_records(frame, app, &app.search_rows, &title, chunks[1]);
        }
    }

    render_status_bar(frame, app, chunks[2]);

    match app.mode {
        Mode::Form => render_form(frame, app),
        Mode::Filter => render_filter_input(frame, app),
        Mode::ConfirmClear => render_confirm_clear(frame, app),
        Mode::Normal => {}
    }
}

/// Render the tab header
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<String> = Tab::ALL
        .iter()
        .map(|tab| format!("{}:{}", tab.index() + 1, tab.title()))
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(" Patient Queue ")
                .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(SECONDARY)),
        )
        .select(app.tab.index())
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}

fn severity_color(severity: i64) -> Color {
    match Urgency::from_severity(severity) {
        Urgency::Critical => CRITICAL,
        Urgency::Elevated => ELEVATED,
        Urgency::Routine => ROUTINE,
    }
}

fn header(cells: &[&'static str]) -> Row<'static> {
    Row::new(cells.iter().copied().map(Cell::from))
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
}

fn selected_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

/// Render the waiting queue table
fn render_queue(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.queue_filter.is_empty() {
        format!(" Queue ({} waiting) ", app.counts.waiting)
    } else {
        format!(
            " Queue: filter '{}' ({} of {}) ",
            app.queue_filter,
            app.queue_rows.len(),
            app.counts.waiting
        )
    };
    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));

    if app.queue_rows.is_empty() {
        let text = if app.queue_filter.is_empty() {
            "  No patients waiting. Press 'a' to add one."
        } else {
            "  No matches"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(DIM))).block(block),
            area,
        );
        return;
    }

    let rows = app.queue_rows.iter().map(|entry| {
        let r = &entry.record;
        Row::new(vec![
            Cell::from((entry.position + 1).to_string()),
            Cell::from(r.name.clone()),
            Cell::from(r.age.to_string()),
            Cell::from(r.severity.to_string())
                .style(Style::default().fg(severity_color(r.severity))),
            Cell::from(r.checkup.clone()),
            Cell::from(waited(r, app.now)),
            Cell::from(format!("{} min", entry.est_wait_minutes)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(16),
            Constraint::Length(5),
            Constraint::Length(9),
            Constraint::Min(12),
            Constraint::Length(8),
            Constraint::Length(10),
        ],
    )
    .header(header(&["#", "Name", "Age", "Severity", "Checkup", "Waited", "Est. Wait"]))
    .block(block)
    .row_highlight_style(selected_style());

    let mut state = TableState::default().with_selected(Some(app.selected_index));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Time since arrival, or "-" before the first tick or for unparseable timestamps
fn waited(record: &PatientRecord, now: Option<NaiveDateTime>) -> String {
    now.and_then(|now| record.waited_minutes(now))
        .map(|minutes| format!("{} min", minutes))
        .unwrap_or_else(|| "-".to_string())
}

/// Render history or search results
fn render_records(frame: &mut Frame, app: &App, records: &[PatientRecord], title: &str, area: Rect) {
    let block = Block::default()
        .title(title.to_string())
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));

    if records.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("  No records", Style::default().fg(DIM))).block(block),
            area,
        );
        return;
    }

    let rows = records.iter().map(|r| {
        let status_style = match r.status {
            Status::Waiting => Style::default().fg(HIGHLIGHT),
            Status::Served => Style::default().fg(DIM),
        };
        Row::new(vec![
            Cell::from(r.id.to_string()),
            Cell::from(r.name.clone()),
            Cell::from(r.age.to_string()),
            Cell::from(r.severity.to_string())
                .style(Style::default().fg(severity_color(r.severity))),
            Cell::from(r.checkup.clone()),
            Cell::from(r.visit_time.clone()),
            Cell::from(r.status.to_string()).style(status_style),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(16),
            Constraint::Length(5),
            Constraint::Length(9),
            Constraint::Min(12),
            Constraint::Length(20),
            Constraint::Length(8),
        ],
    )
    .header(header(&["ID", "Name", "Age", "Severity", "Checkup", "Visit", "Status"]))
    .block(block)
    .row_highlight_style(selected_style());

    let mut state = TableState::default().with_selected(Some(app.selected_index));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_indicator = match app.mode {
        Mode::Normal => Span::styled(" NORMAL ", Style::default().bg(ACCENT).fg(Color::Black)),
        Mode::Filter => Span::styled(" FILTER ", Style::default().bg(Color::Magenta).fg(Color::Black)),
        Mode::Form => Span::styled(" ADD ", Style::default().bg(SUCCESS).fg(Color::Black)),
        Mode::ConfirmClear => Span::styled(" CONFIRM ", Style::default().bg(HIGHLIGHT).fg(Color::Black)),
    };

    let help_text = match (app.mode, app.tab) {
        (Mode::Normal, Tab::Queue) => "a:add  n:next  s:serve  /:filter  C:clear  1-3:tabs  q:quit",
        (Mode::Normal, _) => "j/k:nav  /:search  r:refresh  1-3:tabs  q:quit",
        (Mode::Filter, Tab::Queue) => "Type to filter  Enter:apply  Esc:clear",
        (Mode::Filter, _) => "Type a name  Enter:search  Esc:cancel",
        (Mode::Form, _) => "Tab:next field  ←/→:severity  Enter:add  Esc:cancel",
        (Mode::ConfirmClear, _) => "y:serve everyone waiting  any key:cancel",
    };

    let counts = format!(
        " waiting:{} served:{} ",
        app.counts.waiting, app.counts.served
    );

    let status = app.status_message.as_deref().unwrap_or("");

    let line = Line::from(vec![
        mode_indicator,
        Span::raw(" "),
        Span::styled(help_text, Style::default().fg(DIM)),
        Span::styled(counts, Style::default().fg(SUCCESS)),
        Span::styled(status, Style::default().fg(HIGHLIGHT)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Rect of the given size centered in `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

/// Render the add-patient form overlay
fn render_form(frame: &mut Frame, app: &App) {
    let popup_area = centered(frame.area(), 50, FormField::ALL.len() as u16 + 4);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Add New Patient ")
        .title_style(Style::default().fg(SUCCESS).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SUCCESS));

    let mut lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|&field| {
            let focused = field == app.form.field;
            let marker = if focused { "> " } else { "  " };
            let value = if focused && field != FormField::Severity {
                format!("{}|", app.form.value(field))
            } else {
                app.form.value(field)
            };
            let value_style = match field {
                FormField::Severity => Style::default().fg(severity_color(app.form.severity)),
                _ if focused => Style::default().fg(HIGHLIGHT),
                _ => Style::default().fg(Color::White),
            };
            Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("{:<16}", field.label()), Style::default().fg(DIM)),
                Span::styled(value, value_style),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Enter: add patient   Esc: cancel",
        Style::default().fg(DIM),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

/// Render filter input overlay
fn render_filter_input(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let width = 60.min(area.width.saturating_sub(4));
    let popup_area = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + 2, // Near top for quick filtering
        width,
        height: 3,
    };

    frame.render_widget(Clear, popup_area);

    let title = match app.tab {
        Tab::Queue => format!(" Filter ({} matches) ", app.queue_rows.len()),
        _ => " Search by name ".to_string(),
    };

    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let content = format!("{}|", app.filter_input());
    frame.render_widget(Paragraph::new(content).block(block), popup_area);
}

/// Render the clear-queue confirmation overlay
fn render_confirm_clear(frame: &mut Frame, app: &App) {
    let popup_area = centered(frame.area(), 50, 5);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Clear Queue ")
        .title_style(Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(HIGHLIGHT));

    let text = format!(
        "Mark all {} waiting patient(s) as served? (y/n)",
        app.counts.waiting
    );
    frame.render_widget(Paragraph::new(text).block(block), popup_area);
}
