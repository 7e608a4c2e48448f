//! Plain-text rendering for the command-line tool
//!
//! Everything here returns strings; colouring happens at the print site so
//! the layout stays testable.

use owo_colors::AnsiColors;

use crate::types::{Lyrics, TaskState, Track, format_duration};

/// Lyrics longer than this are cut when shown in `suno status`
pub const STATUS_LYRICS_PREVIEW: usize = 500;

/// Audio ids are shortened to this many characters in compact tables
const SHORT_ID: usize = 20;

/// Cut `text` to `max` characters, marking the cut with `...`
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// How audio ids appear in a track table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdColumn {
    Full,
    Short,
}

/// Track table with `#`, title, duration and audio id columns
pub fn track_table(tracks: &[Track], ids: IdColumn) -> String {
    let rows: Vec<[String; 4]> = tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let title = if track.title.trim().is_empty() {
                "Untitled".to_string()
            } else {
                track.title.clone()
            };
            let id = match ids {
                IdColumn::Full => track.id.clone(),
                IdColumn::Short => truncate_chars(&track.id, SHORT_ID),
            };
            [(i + 1).to_string(), title, format_duration(track.duration), id]
        })
        .collect();

    let header = ["#", "Title", "Duration", "Audio ID"];
    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 4]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(header)];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &rows {
        out.push(line([&row[0], &row[1], &row[2], &row[3]]));
    }
    out.join("\n")
}

/// Boxed panel with a title in the top border
pub fn panel(title: &str, body: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let inner = lines
        .iter()
        .map(|l| l.chars().count())
        .chain(std::iter::once(title.chars().count() + 2))
        .max()
        .unwrap_or(0);

    let top_fill = inner.saturating_sub(title.chars().count() + 1);
    let mut out = format!("╭─ {title} {}╮\n", "─".repeat(top_fill));
    for line in &lines {
        let pad = inner - line.chars().count();
        out.push_str(&format!("│ {line}{} │\n", " ".repeat(pad)));
    }
    out.push_str(&format!("╰{}╯", "─".repeat(inner + 2)));
    out
}

/// Panel title for the `n`th lyrics variation
pub fn lyrics_title(n: usize, lyrics: &Lyrics) -> String {
    if lyrics.title.trim().is_empty() {
        format!("Lyrics #{n}")
    } else {
        format!("Lyrics #{n} - {}", lyrics.title)
    }
}

pub fn state_color(state: TaskState) -> AnsiColors {
    match state {
        TaskState::Pending => AnsiColors::Yellow,
        TaskState::Running => AnsiColors::Blue,
        TaskState::Complete => AnsiColors::Green,
        TaskState::Failed => AnsiColors::Red,
    }
}
