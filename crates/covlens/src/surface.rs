//! Terminal-backed surfaces and scroll controller
//!
//! A terminal has no scroll containers, so each surface is plain geometry in
//! columns: the view reads `scroll_left` back when drawing.

use covlens_core::{ContentWidth, ScrollController, Surface, SurfaceError, SurfaceMetrics};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermSurface {
    metrics: SurfaceMetrics,
    content_width: ContentWidth,
}

impl TermSurface {
    pub fn new(scroll_width: u32, client_width: u32) -> Self {
        Self {
            metrics: SurfaceMetrics {
                scroll_left: 0,
                scroll_width,
                client_width,
                client_height: 0,
            },
            content_width: ContentWidth::Full,
        }
    }

    pub fn scroll_left(&self) -> u32 {
        self.metrics.scroll_left
    }

    pub fn content_width(&self) -> ContentWidth {
        self.content_width
    }

    /// Update the geometry after a resize or a content change.
    pub fn resize(&mut self, scroll_width: u32, client_width: u32, client_height: u32) {
        self.metrics.scroll_width = scroll_width;
        self.metrics.client_width = client_width;
        self.metrics.client_height = client_height;
        self.metrics.scroll_left = self.metrics.scroll_left.min(self.metrics.max_scroll_left());
    }

    /// Move by `delta` columns, clamped. Returns whether the offset changed.
    pub fn scroll_by(&mut self, delta: i64) -> bool {
        let target = (self.metrics.scroll_left as i64 + delta)
            .clamp(0, self.metrics.max_scroll_left() as i64) as u32;
        let changed = target != self.metrics.scroll_left;
        self.metrics.scroll_left = target;
        changed
    }
}

impl Surface for TermSurface {
    fn metrics(&self) -> Result<SurfaceMetrics, SurfaceError> {
        Ok(self.metrics)
    }

    fn set_scroll_left(&mut self, offset: u32) -> Result<(), SurfaceError> {
        self.metrics.scroll_left = offset.min(self.metrics.max_scroll_left());
        Ok(())
    }

    fn set_content_width(&mut self, width: ContentWidth) -> Result<(), SurfaceError> {
        self.content_width = width;
        self.metrics.scroll_width = width.resolve(self.metrics.client_width);
        self.metrics.scroll_left = self.metrics.scroll_left.min(self.metrics.max_scroll_left());
        Ok(())
    }
}

/// Vertical scroll position of the content pane, in terminal rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TermScroller {
    pub offset: u64,
    pub viewport: u32,
    /// Total content height, for clamping manual scrolls
    pub total: u64,
}

impl TermScroller {
    pub fn max_offset(&self) -> u64 {
        self.total.saturating_sub(self.viewport as u64)
    }

    /// Scroll by `delta` rows. Returns whether the offset changed.
    pub fn scroll_by(&mut self, delta: i64) -> bool {
        let target = (self.offset as i64 + delta).clamp(0, self.max_offset() as i64) as u64;
        let changed = target != self.offset;
        self.offset = target;
        changed
    }
}

impl ScrollController for TermScroller {
    fn scroll_offset(&self) -> u64 {
        self.offset
    }

    fn viewport_size(&self) -> u32 {
        self.viewport
    }

    fn scroll_to(&mut self, offset: u64) {
        self.offset = offset;
    }
}
