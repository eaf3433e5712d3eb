use super::{App, ContentMode};
use covlens_core::{Align, AnchorMode, NavToken, NavigationStore, Side, SurfaceId};
use std::time::Instant;

/// Columns moved per horizontal step
const H_STEP: i64 = 4;
/// Columns moved per scrollbar drag step
const SCROLLBAR_STEP: i64 = 8;

impl App {
    // ==================== Vertical ====================

    /// Scroll the page by `delta` rows without moving the cursor.
    pub fn scroll_rows(&mut self, delta: i64, now: Instant) {
        if self.scroller.scroll_by(delta) {
            self.renderer.on_scroll(now, &self.scroller);
        }
    }

    pub fn page_down(&mut self, now: Instant) {
        let half = (self.scroller.viewport / 2).max(1) as i64;
        self.scroll_rows(half, now);
    }

    pub fn page_up(&mut self, now: Instant) {
        let half = (self.scroller.viewport / 2).max(1) as i64;
        self.scroll_rows(-half, now);
    }

    pub fn move_cursor(&mut self, delta: i64, now: Instant) {
        let len = self.renderer.len();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor as i64 + delta).clamp(0, len as i64 - 1) as usize;
        self.ensure_cursor_visible(now);
    }

    pub fn goto_start(&mut self, now: Instant) {
        self.cursor = 0;
        self.ensure_cursor_visible(now);
    }

    pub fn goto_end(&mut self, now: Instant) {
        self.cursor = self.renderer.len().saturating_sub(1);
        self.ensure_cursor_visible(now);
    }

    fn ensure_cursor_visible(&mut self, now: Instant) {
        let top = self.scroller.offset;
        let bottom = top + self.scroller.viewport as u64;
        let align = match self.renderer.window().item(self.cursor) {
            Some(item) if item.start >= top && item.end() <= bottom => return,
            Some(item) if item.start < top => Align::Start,
            Some(_) => Align::End,
            None => {
                let above = self
                    .renderer
                    .window()
                    .visible_range
                    .as_ref()
                    .is_some_and(|range| self.cursor < *range.start());
                if above {
                    Align::Start
                } else {
                    Align::End
                }
            }
        };
        let cursor = self.cursor;
        if self
            .renderer
            .scroll_to_index(cursor, align, &mut self.scroller)
            .is_some()
        {
            self.renderer.on_scroll(now, &self.scroller);
        }
    }

    // ==================== Horizontal ====================

    fn drive_surface(&mut self, driver: SurfaceId, delta: i64) {
        let Some(surface) = self.renderer.surfaces_mut().get_mut(driver) else {
            return;
        };
        if surface.scroll_by(delta) {
            self.renderer.on_horizontal_scroll(driver);
            self.process_events();
        }
    }

    /// Scroll the input surface; overlay and scrollbar follow.
    pub fn scroll_left(&mut self) {
        self.drive_surface(SurfaceId::Input, -H_STEP);
    }

    pub fn scroll_right(&mut self) {
        self.drive_surface(SurfaceId::Input, H_STEP);
    }

    /// Drag the scrollbar; input and overlay follow.
    pub fn drag_scrollbar(&mut self, forward: bool) {
        let delta = if forward {
            SCROLLBAR_STEP
        } else {
            -SCROLLBAR_STEP
        };
        if self.renderer.surfaces().is_mounted(SurfaceId::Scrollbar) {
            self.drive_surface(SurfaceId::Scrollbar, delta);
        } else {
            self.drive_surface(SurfaceId::Input, delta);
        }
    }

    pub fn scroll_to_line_start(&mut self) {
        self.drive_surface(SurfaceId::Input, -(self.natural_width() as i64));
    }

    pub fn scroll_to_line_end(&mut self) {
        self.drive_surface(SurfaceId::Input, self.natural_width() as i64);
    }

    // ==================== Highlight ====================

    /// Toggle the highlight on the cursor row's active side.
    pub fn toggle_highlight(&mut self) {
        let (cursor, side) = (self.cursor, self.active_side);
        if !self.renderer.click_line_number(cursor, side, &mut self.nav) {
            self.message = Some(format!("no {} line on this row", side_name(side)));
        }
        self.process_events();
    }

    /// Mouse click at screen cell (`x`, `y`); ignored while scrolling.
    pub fn click(&mut self, x: u16, y: u16) {
        if !self.pointer_enabled {
            tracing::trace!(x, y, "click ignored while scrolling");
            return;
        }
        let Some(hit) = self
            .gutter_hits
            .iter()
            .find(|hit| hit.y == y && hit.x.contains(&x))
            .cloned()
        else {
            return;
        };
        self.cursor = hit.index;
        self.active_side = hit.side;
        self.renderer
            .click_line_number(hit.index, hit.side, &mut self.nav);
        self.process_events();
    }

    pub fn switch_side(&mut self) {
        if self.mode == ContentMode::Diff {
            self.active_side = self.active_side.other();
        }
    }

    // ==================== Goto prompt ====================

    pub fn open_goto(&mut self) {
        self.goto = Some(String::new());
        self.message = None;
    }

    pub fn close_goto(&mut self) {
        self.goto = None;
    }

    pub fn goto_push(&mut self, c: char) {
        if let Some(buffer) = self.goto.as_mut() {
            buffer.push(c);
        }
    }

    pub fn goto_pop(&mut self) {
        if let Some(buffer) = self.goto.as_mut() {
            buffer.pop();
        }
    }

    /// Turn the prompt input into a navigation token and navigate to it.
    ///
    /// Accepts a full token (`#L12`, `#<hash>-R4`) or a bare line number on
    /// the active side.
    pub fn submit_goto(&mut self) {
        let Some(input) = self.goto.take() else {
            return;
        };
        let input = input.trim();
        if input.is_empty() {
            return;
        }
        let token = if input.starts_with('#') {
            input.to_string()
        } else if let Ok(line) = input.parse::<usize>() {
            match self.renderer.mode() {
                AnchorMode::File => NavToken::Line(line).to_string(),
                AnchorMode::Diff { hashed_path } => NavToken::Diff {
                    hashed_path: hashed_path.clone(),
                    side: self.active_side,
                    line,
                }
                .to_string(),
            }
        } else {
            format!("#{input}")
        };
        tracing::debug!(%token, "goto");
        self.message = None;
        if self.nav.token().as_deref() == Some(token.as_str()) {
            // Same fragment again: navigate anyway
            self.renderer.mount(&self.nav);
        } else {
            self.nav.set_token(Some(token));
            self.renderer.navigation_changed(&self.nav);
        }
    }
}

pub(crate) fn side_name(side: Side) -> &'static str {
    match side {
        Side::Base => "base",
        Side::Head => "head",
    }
}
