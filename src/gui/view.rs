use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs, Wrap};

use super::app::{App, FieldValue, Form, Tab};

const HELP: &str = "F1-F4 tabs | Tab/Up/Down move | Enter submit | Esc cancel wait | \
                    Ctrl+R credits | Ctrl+D auto-download | Ctrl+L clear | Ctrl+Q quit";

const HISTORY_WIDTHS: [Constraint; 4] = [
    Constraint::Length(9),
    Constraint::Length(10),
    Constraint::Min(20),
    Constraint::Length(16),
];

pub fn draw(frame: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    draw_header(frame, app, chunks[0]);
    draw_tabs(frame, app, chunks[1]);
    match app.tab {
        Tab::History => draw_history(frame, app, chunks[2]),
        tab => draw_workspace(frame, app, tab, chunks[2]),
    }
    draw_status(frame, app, chunks[3]);
    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        chunks[4],
    );
}

fn draw_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let credits = match app.credits {
        Some(balance) => format!("Credits: {balance}"),
        None => "Credits: --".to_string(),
    };
    let download = if app.auto_download { "on" } else { "off" };
    let line = Line::from(vec![
        Span::styled(
            "Suno Music Studio",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(credits, Style::default().fg(Color::Green)),
        Span::raw(format!("   Auto-download: {download}")),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_tabs(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.title())).collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(app.tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn draw_workspace(frame: &mut ratatui::Frame, app: &App, tab: Tab, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    if let Some(form) = app.form(tab) {
        let title = match tab {
            Tab::Generate => "Music",
            Tab::Lyrics => "Lyrics (Ctrl+U: use as music prompt)",
            _ => "Process a track",
        };
        frame.render_widget(form_widget(form, title), chunks[0]);
    }

    let output = app.output(tab);
    // keep the newest lines in view
    let visible = usize::from(chunks[1].height.saturating_sub(2));
    let skip = output.len().saturating_sub(visible);
    let lines: Vec<Line> = output
        .iter()
        .skip(skip)
        .map(|l| Line::from(l.as_str()))
        .collect();
    let results = Paragraph::new(lines)
        .block(Block::default().title("Results").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(results, chunks[1]);
}

fn form_widget<'a>(form: &'a Form, title: &'a str) -> Paragraph<'a> {
    let label_width = form
        .fields
        .iter()
        .map(|f| f.label.len())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(form.fields.len() * 2);
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let marker = if focused { "> " } else { "  " };
        let mut value = field.display();
        if focused && matches!(field.value, FieldValue::Text(_)) {
            value.push('_');
        }
        let value_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(
                format!("{:<label_width$}  ", field.label),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(value, value_style),
        ]));
    }

    Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .wrap(Wrap { trim: false })
}

fn draw_history(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let header = Row::new(vec!["Time", "Kind", "Task ID", "Status"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = app
        .history
        .iter()
        .map(|entry| {
            let status_style = match entry.status.as_str() {
                "SUCCESS" => Style::default().fg(Color::Green),
                s if s.contains("FAIL") || s.contains("ERROR") => Style::default().fg(Color::Red),
                _ => Style::default().fg(Color::Yellow),
            };
            Row::new(vec![
                Cell::from(entry.at.format("%H:%M:%S").to_string()),
                Cell::from(entry.kind),
                Cell::from(entry.task_id.to_string()),
                Cell::from(entry.status.clone()).style(status_style),
            ])
        })
        .collect();

    let table = Table::new(rows)
        .header(header)
        .widths(&HISTORY_WIDTHS)
        .block(
            Block::default()
                .title("History (Enter: check status)")
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    if !app.history.is_empty() {
        state.select(Some(app.history_selected));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_status(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let line = if let Some(running) = &app.running {
        let elapsed = running.started.elapsed().as_secs();
        let task = running
            .task_id
            .as_ref()
            .map(|id| format!(" {id}"))
            .unwrap_or_default();
        Line::from(Span::styled(
            format!(
                "{}{task}: {} ({elapsed}s)",
                running.label, running.raw_status
            ),
            Style::default().fg(Color::Blue),
        ))
    } else if let Some(notice) = &app.notice {
        let color = if notice.is_error {
            Color::Red
        } else {
            Color::Green
        };
        Line::from(Span::styled(
            notice.text.clone(),
            Style::default().fg(color),
        ))
    } else {
        Line::from("Ready")
    };
    frame.render_widget(Paragraph::new(line), area);
}
