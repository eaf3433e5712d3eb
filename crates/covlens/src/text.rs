//! Display-width helpers shared by measurement and drawing

use crate::syntax::StyledSpan;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Terminal columns taken by a line of spans
pub fn display_width(spans: &[StyledSpan]) -> usize {
    spans
        .iter()
        .flat_map(|span| span.text.chars())
        .map(|c| c.width().unwrap_or(0))
        .sum()
}

/// Break a line of spans into rows of at most `width` columns.
///
/// Always yields at least one row; a wide char never straddles two rows.
pub fn wrap_spans(spans: &[StyledSpan], width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut rows: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0usize;

    for span in spans {
        let mut chunk = String::new();
        for c in span.text.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > width && used > 0 {
                if !chunk.is_empty() {
                    current.push(Span::styled(std::mem::take(&mut chunk), span.style));
                }
                rows.push(Line::from(std::mem::take(&mut current)));
                used = 0;
            }
            chunk.push(c);
            used += w;
        }
        if !chunk.is_empty() {
            current.push(Span::styled(chunk, span.style));
        }
    }
    rows.push(Line::from(current));
    rows
}

/// Rows a line occupies once wrapped to `width`
pub fn wrapped_height(spans: &[StyledSpan], width: usize) -> usize {
    let width = width.max(1);
    let mut rows = 1;
    let mut used = 0usize;
    for c in spans.iter().flat_map(|span| span.text.chars()) {
        let w = c.width().unwrap_or(0);
        if used + w > width && used > 0 {
            rows += 1;
            used = 0;
        }
        used += w;
    }
    rows
}

/// Unwrapped line as ratatui spans
pub fn to_line(spans: &[StyledSpan]) -> Line<'static> {
    Line::from(
        spans
            .iter()
            .map(|span| Span::styled(span.text.clone(), span.style))
            .collect::<Vec<_>>(),
    )
}
