//! Line number gutter with coverage decorations

use crate::app::Markers;
use crate::config::Palette;
use covlens_core::{CoverageTone, GutterCell, GutterIcon, GutterStyle};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

const SOLID_BAR: &str = "▌";
const DASHED_BAR: &str = "╎";
const CURSOR_MARKER: &str = "›";
/// Columns of the hit-count badge
const BADGE_WIDTH: usize = 3;

/// Width of one side's gutter for line numbers up to `max_line`
pub fn cell_width(max_line: usize) -> u16 {
    let digits = max_line.max(1).to_string().len().max(3);
    // bar, marker, number, space, icon, badge, space
    (1 + 1 + digits + 1 + 1 + BADGE_WIDTH + 1) as u16
}

/// Column range of the line number within a cell, relative to the cell start
pub fn number_columns(width: u16) -> std::ops::Range<u16> {
    let digits = width - (1 + 1 + 1 + 1 + BADGE_WIDTH as u16 + 1);
    2..2 + digits
}

fn tone_color(tone: CoverageTone, palette: &Palette) -> Color {
    match tone {
        CoverageTone::Covered => palette.hit,
        CoverageTone::Uncovered => palette.miss,
        CoverageTone::Partial => palette.partial,
    }
}

fn number_color(style: GutterStyle, palette: &Palette) -> Color {
    match style {
        GutterStyle::Neutral => palette.line_number,
        GutterStyle::Covered => palette.hit,
        GutterStyle::Uncovered => palette.miss,
        GutterStyle::Partial => palette.partial,
    }
}

/// Hit count squeezed into three columns: `7`, `42`, `12k`, `.4M`, `3M`
pub fn compact_count(hits: u64) -> String {
    match hits {
        0..=999 => hits.to_string(),
        1_000..=99_999 => format!("{}k", hits / 1_000),
        100_000..=999_999 => format!(".{}M", hits / 100_000),
        _ => format!("{}M", (hits / 1_000_000).min(99)),
    }
}

/// Spans for the first visual row of a line
pub fn cell_spans(
    cell: &GutterCell,
    width: u16,
    is_cursor: bool,
    markers: &Markers,
    palette: &Palette,
) -> Vec<Span<'static>> {
    let digits = number_columns(width).len();
    let decoration = cell.decoration;

    let bar = match decoration.bar {
        Some(bar) => Span::styled(
            if bar.dashed { DASHED_BAR } else { SOLID_BAR },
            Style::default().fg(tone_color(bar.tone, palette)),
        ),
        None => Span::raw(" "),
    };

    let marker = if cell.highlighted {
        Span::styled(
            markers.highlight.clone(),
            Style::default()
                .fg(palette.partial)
                .add_modifier(Modifier::BOLD),
        )
    } else if is_cursor && cell.number.is_some() {
        Span::styled(CURSOR_MARKER, Style::default().fg(palette.line_number))
    } else {
        Span::raw(" ")
    };

    let mut number_style = Style::default().fg(number_color(decoration.line_number, palette));
    if cell.highlighted {
        number_style = number_style
            .bg(palette.highlight_bg)
            .add_modifier(Modifier::BOLD);
    }
    let number = Span::styled(
        format!(
            "{:>digits$}",
            cell.number.as_deref().unwrap_or(""),
            digits = digits
        ),
        number_style,
    );

    let icon = match decoration.icon {
        Some(GutterIcon::Warning) => {
            Span::styled(markers.warning.clone(), Style::default().fg(palette.miss))
        }
        Some(GutterIcon::PartialMarker) => {
            Span::styled(markers.partial.clone(), Style::default().fg(palette.partial))
        }
        None => Span::raw(" "),
    };

    let badge = Span::styled(
        format!(
            "{:>BADGE_WIDTH$}",
            decoration.badge.map(compact_count).unwrap_or_default()
        ),
        Style::default()
            .fg(palette.line_number)
            .add_modifier(Modifier::DIM),
    );

    vec![bar, marker, number, Span::raw(" "), icon, badge, Span::raw(" ")]
}

/// Spans for wrapped continuation rows: the bar continues, nothing else
pub fn continuation_spans(cell: &GutterCell, width: u16, palette: &Palette) -> Vec<Span<'static>> {
    let bar = match cell.decoration.bar {
        Some(bar) => Span::styled(
            if bar.dashed { DASHED_BAR } else { SOLID_BAR },
            Style::default().fg(tone_color(bar.tone, palette)),
        ),
        None => Span::raw(" "),
    };
    vec![bar, Span::raw(" ".repeat(width.saturating_sub(1) as usize))]
}
