//! View rendering modules

mod gutter;
mod pane;

use crate::app::App;
use covlens_core::Side;
use ratatui::{layout::Rect, Frame};

/// Single file: one head-side gutter
pub fn render_file(frame: &mut Frame, app: &mut App, area: Rect) {
    pane::render_pane(frame, app, area, &[Side::Head]);
}

/// Diff: base and head gutters side by side, then a `+`/`-` column
pub fn render_diff(frame: &mut Frame, app: &mut App, area: Rect) {
    pane::render_pane(frame, app, area, &[Side::Base, Side::Head]);
}
