//! Virtualized line pane shared by the file and diff views

use super::gutter::{self, cell_spans, continuation_spans};
use crate::app::{App, GutterHit};
use crate::text::{to_line, wrap_spans};
use covlens_core::{NavigationStore, Side, Surface};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Render the rows of the current window into `area`.
///
/// `sides` lists the gutters to draw, left to right.
pub(super) fn render_pane(frame: &mut Frame, app: &mut App, area: Rect, sides: &[Side]) {
    let show_scrollbar = !app.line_wrap && app.scrollbar_surface().is_some();
    let (rows_area, scrollbar_area) = if show_scrollbar && area.height > 1 {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    let cell_width = gutter::cell_width(app.renderer.len());
    let sign_width: u16 = if sides.len() > 1 { 1 } else { 0 };
    let gutter_width = cell_width * sides.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(gutter_width),
            Constraint::Length(sign_width),
            Constraint::Min(0),
        ])
        .split(rows_area);
    let (gutter_area, sign_area, content_area) = (chunks[0], chunks[1], chunks[2]);

    app.prepare_viewport(content_area.height, content_area.width);

    let top = app.scroller.offset;
    let bottom = top + content_area.height as u64;
    let token = app.nav.token();
    let palette = app.palette;
    let wrap_width = content_area.width as usize;

    let mut gutter_lines: Vec<Line> = Vec::new();
    let mut sign_lines: Vec<Line> = Vec::new();
    let mut content_lines: Vec<Line> = Vec::new();
    let mut hits: Vec<GutterHit> = Vec::new();

    for row in app.renderer.rows(token.as_deref()) {
        let item = row.item;
        if item.end() <= top {
            continue;
        }
        if item.start >= bottom {
            break;
        }

        let cells: Vec<_> = sides
            .iter()
            .filter_map(|side| match side {
                Side::Base => row.base.as_ref().map(|cell| (*side, cell)),
                Side::Head => Some((*side, &row.head)),
            })
            .collect();
        let highlighted = cells.iter().any(|(_, cell)| cell.highlighted);
        let is_cursor = row.record.index == app.cursor;

        let (sign, row_style) = match (row.record.identity.number(Side::Base), sides.len()) {
            (_, 1) => (" ", Style::default()),
            (None, _) => ("+", Style::default().bg(palette.added_bg)),
            (Some(_), _) if row.record.identity.number(Side::Head).is_none() => {
                ("-", Style::default().bg(palette.removed_bg))
            }
            _ => (" ", Style::default()),
        };
        let row_style = if highlighted {
            row_style.bg(palette.highlight_bg)
        } else {
            row_style
        };

        let visual = if app.line_wrap {
            wrap_spans(&row.record.tokens, wrap_width)
        } else {
            vec![to_line(&row.record.tokens)]
        };

        for (k, line) in visual.into_iter().enumerate() {
            let y_abs = item.start + k as u64;
            if y_abs < top {
                continue;
            }
            if y_abs >= bottom {
                break;
            }
            let y = gutter_area.y + (y_abs - top) as u16;

            let mut spans: Vec<Span> = Vec::new();
            for (slot, (side, cell)) in cells.iter().enumerate() {
                if k == 0 {
                    spans.extend(cell_spans(
                        cell,
                        cell_width,
                        is_cursor && *side == app.active_side,
                        &app.markers,
                        &palette,
                    ));
                    if cell.number.is_some() {
                        let start = gutter_area.x + slot as u16 * cell_width;
                        let columns = gutter::number_columns(cell_width);
                        hits.push(GutterHit {
                            y,
                            x: start + columns.start..start + columns.end,
                            index: row.record.index,
                            side: *side,
                        });
                    }
                } else {
                    spans.extend(continuation_spans(cell, cell_width, &palette));
                }
            }
            gutter_lines.push(Line::from(spans));

            let sign = if k == 0 { sign } else { " " };
            sign_lines.push(Line::from(Span::styled(
                sign,
                row_style.add_modifier(Modifier::BOLD),
            )));
            content_lines.push(line.style(row_style));
        }
    }

    app.gutter_hits = hits;

    frame.render_widget(Paragraph::new(gutter_lines), gutter_area);
    if sign_width > 0 {
        frame.render_widget(Paragraph::new(sign_lines), sign_area);
    }
    let content = if app.line_wrap {
        Paragraph::new(content_lines)
    } else {
        Paragraph::new(content_lines).scroll((0, app.horizontal_offset()))
    };
    frame.render_widget(content, content_area);

    if let Some(area) = scrollbar_area {
        render_scrollbar(frame, app, area, content_area.x);
    }
}

fn render_scrollbar(frame: &mut Frame, app: &App, area: Rect, content_x: u16) {
    let Some(metrics) = app.scrollbar_surface().and_then(|s| s.metrics().ok()) else {
        return;
    };
    let track = Rect {
        x: content_x,
        width: area.width.saturating_sub(content_x - area.x),
        ..area
    };
    let mut state = ScrollbarState::new(metrics.max_scroll_left() as usize)
        .position(metrics.scroll_left as usize)
        .viewport_content_length(metrics.client_width as usize);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::HorizontalBottom)
            .begin_symbol(None)
            .end_symbol(None)
            .style(Style::default().fg(app.palette.line_number)),
        track,
        &mut state,
    );
}
