//! UI rendering for the TUI

use crate::app::{side_name, App, ContentMode};
use crate::views::{render_diff, render_file};
use covlens_core::{CoverageSummary, NavigationStore};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Truncate a path to fit a given width, keeping the file name
fn truncate_path(path: &str, max_width: usize) -> String {
    if path.chars().count() <= max_width {
        return path.to_string();
    }
    let name = path.rsplit('/').next().unwrap_or(path);
    let keep = max_width.saturating_sub(4);
    let tail: String = name
        .chars()
        .rev()
        .take(keep)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!(".../{}", tail)
}

fn truncate_end(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Main drawing function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Lines
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    match app.mode {
        ContentMode::File => render_file(frame, app, chunks[0]),
        ContentMode::Diff => render_diff(frame, app, chunks[0]),
    }

    if app.goto.is_some() {
        draw_goto_prompt(frame, app, chunks[1]);
    } else {
        draw_status_bar(frame, app, chunks[1]);
    }
}

fn coverage_spans(summary: CoverageSummary, app: &App) -> Vec<Span<'static>> {
    let Some(percent) = summary.percent() else {
        return vec![Span::styled(
            " no coverage ",
            Style::default().fg(app.palette.line_number),
        )];
    };
    vec![
        Span::styled(
            format!(" {:.1}% ", percent),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} hit ", summary.hits),
            Style::default().fg(app.palette.hit),
        ),
        Span::styled(
            format!("{} miss ", summary.misses),
            Style::default().fg(app.palette.miss),
        ),
        Span::styled(
            format!("{} partial ", summary.partials),
            Style::default().fg(app.palette.partial),
        ),
    ]
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode = match app.mode {
        ContentMode::File => " FILE ".to_string(),
        ContentMode::Diff => format!(" DIFF:{} ", side_name(app.active_side)),
    };

    let position = format!(
        " {}/{} ",
        (app.cursor + 1).min(app.renderer.len()),
        app.renderer.len()
    );

    let mut right: Vec<Span> = Vec::new();
    if let Some(token) = app.nav.token() {
        right.push(Span::styled(
            format!(" {} ", token),
            Style::default().fg(app.palette.partial),
        ));
    }
    if app.line_wrap {
        right.push(Span::styled(" wrap ", Style::default().fg(app.palette.line_number)));
    }
    if !app.pointer_enabled {
        right.push(Span::styled(" ⇅ ", Style::default().fg(app.palette.line_number)));
    }
    right.push(Span::raw(position));

    let mut left: Vec<Span> = vec![Span::styled(
        mode,
        Style::default()
            .fg(Color::Black)
            .bg(app.palette.hit)
            .add_modifier(Modifier::BOLD),
    )];
    left.extend(coverage_spans(app.summary(), app));

    let used: usize = left
        .iter()
        .chain(right.iter())
        .map(|span| span.width())
        .sum();
    let available = (area.width as usize).saturating_sub(used + 2);
    match app.message.as_deref() {
        Some(message) => left.push(Span::styled(
            format!(" {} ", truncate_end(message, available)),
            Style::default().fg(app.palette.miss),
        )),
        None => left.push(Span::raw(format!(
            " {} ",
            truncate_path(&app.label, available)
        ))),
    }

    let left_width: usize = left.iter().map(|span| span.width()).sum();
    let right_width: usize = right.iter().map(|span| span.width()).sum();
    let padding = (area.width as usize).saturating_sub(left_width + right_width);
    let mut spans = left;
    spans.push(Span::raw(" ".repeat(padding)));
    spans.extend(right);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_goto_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let buffer = app.goto.as_deref().unwrap_or("");
    let hint = match app.mode {
        ContentMode::File => "line or #L<n>",
        ContentMode::Diff => "line on active side, or #<hash>-L<n> / -R<n>",
    };
    let line = Line::from(vec![
        Span::styled(":", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(buffer.to_string()),
        Span::styled("█", Style::default().fg(app.palette.line_number)),
        Span::styled(
            format!("  {}", hint),
            Style::default().fg(app.palette.line_number),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
