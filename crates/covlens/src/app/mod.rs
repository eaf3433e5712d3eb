//! Application state and logic

use crate::config::{Config, Palette};
use crate::surface::{TermScroller, TermSurface};
use crate::syntax::StyledSpan;
use crate::text::{display_width, wrapped_height};
use covlens_core::{
    CoverageLookup, CoverageSummary, DiffRow, MemoryNavigation, Renderer, RendererEvent, Side,
    SurfaceId,
};
use std::ops::Range;

pub(crate) mod content;
mod navigation;
pub(crate) use navigation::side_name;
#[cfg(test)]
mod tests;

/// Upper bound on measure/flush rounds per frame
const SETTLE_ROUNDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    File,
    Diff,
}

/// Gutter glyphs from `[ui]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub warning: String,
    pub partial: String,
    pub highlight: String,
}

/// Screen cells of a clickable line number, recorded while drawing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GutterHit {
    pub y: u16,
    pub x: Range<u16>,
    pub index: usize,
    pub side: Side,
}

/// The main application state
pub struct App {
    pub renderer: Renderer<StyledSpan, TermSurface>,
    pub nav: MemoryNavigation,
    pub scroller: TermScroller,
    pub mode: ContentMode,
    /// File path, or `base → head`
    pub label: String,
    /// Row the keyboard acts on
    pub cursor: usize,
    /// Pane side `Enter` and goto act on
    pub active_side: Side,
    pub line_wrap: bool,
    pub scrollbar_enabled: bool,
    pub markers: Markers,
    pub palette: Palette,
    /// Goto prompt buffer while the prompt is open
    pub goto: Option<String>,
    /// Last diagnostic, shown in the status bar
    pub message: Option<String>,
    pub pointer_enabled: bool,
    pub gutter_hits: Vec<GutterHit>,
    pub should_quit: bool,
    pub base_summary: CoverageSummary,
    pub head_summary: CoverageSummary,
    /// Widest line, in columns
    natural_width: u32,
    content_width: u16,
    viewport_dirty: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let mut renderer = Renderer::new(config.renderer.clone());
        renderer.mount_surface(SurfaceId::Input, TermSurface::default());
        renderer.mount_surface(SurfaceId::Overlay, TermSurface::default());
        Self {
            renderer,
            nav: MemoryNavigation::default(),
            scroller: TermScroller::default(),
            mode: ContentMode::File,
            label: String::new(),
            cursor: 0,
            active_side: Side::Head,
            line_wrap: config.ui.line_wrap,
            scrollbar_enabled: config.ui.scrollbar,
            markers: Markers {
                warning: config.ui.warning_marker.clone(),
                partial: config.ui.partial_marker.clone(),
                highlight: config.ui.highlight_marker.clone(),
            },
            palette: config.ui.colors.resolve(),
            goto: None,
            message: None,
            pointer_enabled: true,
            gutter_hits: Vec::new(),
            should_quit: false,
            base_summary: CoverageSummary::default(),
            head_summary: CoverageSummary::default(),
            natural_width: 0,
            content_width: 0,
            viewport_dirty: true,
        }
    }

    // ==================== Content ====================

    pub fn load_file(
        &mut self,
        label: String,
        lines: Vec<Vec<StyledSpan>>,
        coverage: &impl CoverageLookup,
    ) {
        self.mode = ContentMode::File;
        self.active_side = Side::Head;
        self.renderer.set_file_content(lines, coverage);
        self.content_loaded(label);
    }

    pub fn load_diff(&mut self, label: String, hashed_path: String, rows: Vec<DiffRow<StyledSpan>>) {
        self.mode = ContentMode::Diff;
        self.renderer.set_diff_content(hashed_path, rows);
        self.content_loaded(label);
    }

    fn content_loaded(&mut self, label: String) {
        tracing::info!(%label, lines = self.renderer.len(), "content loaded");
        self.label = label;
        self.cursor = 0;
        self.scroller.offset = 0;
        self.natural_width = self
            .renderer
            .records()
            .iter()
            .map(|record| display_width(&record.tokens) as u32)
            .max()
            .unwrap_or(0);
        self.base_summary = self.renderer.summary(Side::Base);
        self.head_summary = self.renderer.summary(Side::Head);
        self.viewport_dirty = true;
    }

    /// Resolve the navigation token against freshly loaded content.
    pub fn mount_navigation(&mut self, token: Option<String>) {
        self.nav = MemoryNavigation::new(token);
        self.renderer.mount(&self.nav);
    }

    pub fn natural_width(&self) -> u32 {
        self.natural_width
    }

    /// Columns the overlay is scrolled by
    pub fn horizontal_offset(&self) -> u16 {
        self.renderer
            .surfaces()
            .get(SurfaceId::Overlay)
            .map(|surface| surface.scroll_left().min(u16::MAX as u32) as u16)
            .unwrap_or(0)
    }

    pub fn scrollbar_surface(&self) -> Option<&TermSurface> {
        self.renderer.surfaces().get(SurfaceId::Scrollbar)
    }

    pub fn summary(&self) -> CoverageSummary {
        match self.active_side {
            Side::Base => self.base_summary,
            Side::Head => self.head_summary,
        }
    }

    // ==================== Frame ====================

    fn row_height(&self, index: usize) -> i64 {
        if !self.line_wrap {
            return 1;
        }
        self.renderer
            .records()
            .get(index)
            .map(|record| wrapped_height(&record.tokens, self.content_width as usize) as i64)
            .unwrap_or(1)
    }

    fn resize_surfaces(&mut self, height: u16) {
        let client = self.content_width as u32;
        let natural = if self.line_wrap {
            client
        } else {
            self.natural_width
        };
        let surfaces = self.renderer.surfaces_mut();
        if let Some(input) = surfaces.get_mut(SurfaceId::Input) {
            input.resize(natural, client, height as u32);
        }
        if let Some(overlay) = surfaces.get_mut(SurfaceId::Overlay) {
            let width = overlay.content_width().resolve(client);
            overlay.resize(width, client, height as u32);
        }
        if let Some(scrollbar) = surfaces.get_mut(SurfaceId::Scrollbar) {
            scrollbar.resize(natural, client, 1);
        }
    }

    /// Lay out, measure and settle the window for a content pane of
    /// `height` rows by `content_width` columns. Called by the views before
    /// drawing rows.
    pub fn prepare_viewport(&mut self, height: u16, content_width: u16) {
        let width_changed = self.content_width != content_width;
        let resized =
            self.viewport_dirty || width_changed || self.scroller.viewport != height as u32;
        if width_changed && self.line_wrap {
            self.renderer.invalidate_heights();
        }
        self.content_width = content_width;
        self.scroller.viewport = height as u32;

        if resized {
            self.viewport_dirty = false;
            self.resize_surfaces(height);
            self.renderer.on_resize(&self.scroller);
        } else {
            self.renderer.layout(&self.scroller);
        }

        // Key scrolls mount rows between frames; measure all of them here
        for _ in 0..SETTLE_ROUNDS {
            let sizes: Vec<(usize, i64)> = self
                .renderer
                .unmeasured()
                .into_iter()
                .map(|index| (index, self.row_height(index)))
                .collect();
            self.renderer.commit_measurements(sizes);
            self.scroller.total = self.renderer.total_size();
            if self.renderer.flush(&mut self.scroller).is_none() {
                break;
            }
        }
        self.scroller.total = self.renderer.total_size();
        self.process_events();
    }

    pub fn process_events(&mut self) {
        for event in self.renderer.take_events() {
            match event {
                RendererEvent::ScrollToRequested { index, .. } => {
                    self.cursor = index;
                }
                RendererEvent::Highlighted { identity, side } => {
                    tracing::debug!(?identity, ?side, "highlighted");
                }
                RendererEvent::Unhighlighted { identity, side } => {
                    tracing::debug!(?identity, ?side, "unhighlighted");
                }
                RendererEvent::UnresolvedToken { raw, reason } => {
                    self.message = Some(format!("{raw}: {reason}"));
                }
                RendererEvent::PointerModeChanged(mode) => {
                    self.pointer_enabled = mode == covlens_core::PointerMode::Enabled;
                }
                RendererEvent::ScrollbarShown => {
                    if self.scrollbar_enabled {
                        let client = self.content_width as u32;
                        let mut scrollbar = TermSurface::new(self.natural_width, client);
                        scrollbar.resize(self.natural_width, client, 1);
                        self.renderer.attach_scrollbar(scrollbar);
                    }
                }
                RendererEvent::ScrollbarHidden => {
                    tracing::debug!("scrollbar hidden");
                }
                RendererEvent::ObserverFailed { surface, message } => {
                    self.message = Some(format!("{surface:?} surface: {message}"));
                }
            }
        }
    }

    pub fn toggle_line_wrap(&mut self) {
        self.line_wrap = !self.line_wrap;
        self.renderer.invalidate_heights();
        self.viewport_dirty = true;
    }

    pub fn tick(&mut self, now: std::time::Instant) {
        self.renderer.tick(now);
        self.process_events();
    }
}
