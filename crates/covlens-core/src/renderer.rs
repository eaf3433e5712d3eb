//! The virtual line renderer
//!
//! Ties the windowing engine, surface synchronization, width/overflow
//! observation, anchors and coverage decoration together. The host drives it
//! with discrete events; for a scroll the order is always:
//!
//! 1. [`Renderer::on_scroll`] / [`Renderer::layout`] computes the window and
//!    reports which rows to mount and unmount,
//! 2. the host mounts those rows,
//! 3. the host measures the rows still lacking a height
//!    ([`Renderer::unmeasured`]) and hands them to
//!    [`Renderer::commit_measurements`],
//! 4. [`Renderer::flush`] applies offset corrections and any pending
//!    scroll-to-line as a follow-up layout.

use crate::anchor::{AnchorMode, AnchorResolver, NavToken, NavigationStore, Resolution};
use crate::config::RendererConfig;
use crate::coverage::{CoverageDecoration, CoverageLookup, CoverageSummary};
use crate::error::SurfaceError;
use crate::events::{Align, RendererEvent};
use crate::line::{DiffRow, LineRecord, Side};
use crate::overflow::OverflowDetector;
use crate::pointer::{PointerMode, PointerSuppressor};
use crate::surface::{Surface, SurfaceId, SurfaceSet};
use crate::sync::ScrollSync;
use crate::width::{ContentWidth, WidthReconciler};
use crate::window::{ViewportWindow, VirtualItem, WindowEngine};
use std::time::Instant;

/// Owner of the vertical scroll position (the page, or the terminal viewport)
pub trait ScrollController {
    fn scroll_offset(&self) -> u64;
    fn viewport_size(&self) -> u32;
    fn scroll_to(&mut self, offset: u64);
}

/// Rows that entered and left the window in one layout pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameUpdate {
    pub window: ViewportWindow,
    pub mounted: Vec<usize>,
    pub unmounted: Vec<usize>,
}

/// Gutter cell for one side of a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GutterCell {
    pub number: Option<String>,
    pub decoration: CoverageDecoration,
    pub highlighted: bool,
}

/// A mounted row ready to draw
#[derive(Debug, Clone)]
pub struct RenderedRow<'a, T> {
    pub record: &'a LineRecord<T>,
    pub item: VirtualItem,
    /// Base gutter; absent in single-file mode
    pub base: Option<GutterCell>,
    pub head: GutterCell,
}

#[derive(Debug, Clone, Copy)]
struct PendingScroll {
    generation: u64,
    index: usize,
    align: Align,
}

pub struct Renderer<T, S> {
    config: RendererConfig,
    anchors: AnchorResolver,
    records: Vec<LineRecord<T>>,
    /// Bumped whenever the line sequence is replaced
    generation: u64,
    engine: WindowEngine,
    window: ViewportWindow,
    surfaces: SurfaceSet<S>,
    sync: ScrollSync,
    width: WidthReconciler,
    overflow: OverflowDetector,
    pointer: PointerSuppressor,
    pending_scroll: Option<PendingScroll>,
    needs_correction: bool,
    seen_token: Option<String>,
    events: Vec<RendererEvent>,
}

impl<T, S: Surface> Renderer<T, S> {
    pub fn new(config: RendererConfig) -> Self {
        let mut sync = ScrollSync::new();
        sync.register(SurfaceId::Input, SurfaceId::Overlay);
        Self {
            engine: WindowEngine::new(0, &config),
            pointer: PointerSuppressor::new(config.pointer_quiet_period()),
            config,
            anchors: AnchorResolver::new(AnchorMode::File),
            records: Vec::new(),
            generation: 0,
            window: ViewportWindow::empty(),
            surfaces: SurfaceSet::new(),
            sync,
            width: WidthReconciler::new(),
            overflow: OverflowDetector::new(),
            pending_scroll: None,
            needs_correction: false,
            seen_token: None,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn records(&self) -> &[LineRecord<T>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mode(&self) -> &AnchorMode {
        self.anchors.mode()
    }

    pub fn window(&self) -> &ViewportWindow {
        &self.window
    }

    /// Rows in the window whose height was never measured
    pub fn unmeasured(&self) -> Vec<usize> {
        self.window
            .items
            .iter()
            .map(|item| item.index)
            .filter(|&index| !self.engine.cache().is_measured(index))
            .collect()
    }

    pub fn total_size(&mut self) -> u64 {
        self.engine.total_size()
    }

    pub fn pointer_mode(&self) -> PointerMode {
        self.pointer.mode()
    }

    pub fn is_overflowing(&self) -> bool {
        self.overflow.is_overflowing()
    }

    pub fn take_events(&mut self) -> Vec<RendererEvent> {
        std::mem::take(&mut self.events)
    }

    // ==================== Content ====================

    /// Load a single file: one token list per line plus its coverage.
    pub fn set_file_content(&mut self, lines: Vec<Vec<T>>, coverage: &impl CoverageLookup) {
        self.anchors = AnchorResolver::new(AnchorMode::File);
        self.replace_records(LineRecord::from_file(lines, coverage));
    }

    /// Load a diff; `hashed_path` keeps this renderer's anchors apart from
    /// other renderers sharing the fragment.
    pub fn set_diff_content(&mut self, hashed_path: String, rows: Vec<DiffRow<T>>) {
        self.anchors = AnchorResolver::new(AnchorMode::Diff { hashed_path });
        self.replace_records(LineRecord::from_diff(rows));
    }

    fn replace_records(&mut self, records: Vec<LineRecord<T>>) {
        self.generation += 1;
        if let Some(pending) = self.pending_scroll.take() {
            tracing::debug!(
                index = pending.index,
                generation = self.generation,
                "content replaced, dropping pending scroll"
            );
        }
        self.engine.reset(records.len());
        self.records = records;
        self.window = ViewportWindow::empty();
        self.needs_correction = false;
        self.width.invalidate();
    }

    /// Forget every measured height, e.g. after the wrap width changed.
    /// Content and pending navigation are kept.
    pub fn invalidate_heights(&mut self) {
        self.engine.reset(self.records.len());
        self.window = ViewportWindow::empty();
        self.needs_correction = false;
    }

    pub fn summary(&self, side: Side) -> CoverageSummary {
        self.records
            .iter()
            .map(|record| record.coverage(side).coverage)
            .collect()
    }

    // ==================== Surfaces ====================

    pub fn surfaces(&self) -> &SurfaceSet<S> {
        &self.surfaces
    }

    pub fn surfaces_mut(&mut self) -> &mut SurfaceSet<S> {
        &mut self.surfaces
    }

    /// Mount the input surface or the overlay. The scrollbar goes through
    /// [`Renderer::attach_scrollbar`].
    pub fn mount_surface(&mut self, id: SurfaceId, surface: S) {
        if id == SurfaceId::Scrollbar {
            self.attach_scrollbar(surface);
            return;
        }
        self.surfaces.mount(id, surface);
        if id == SurfaceId::Overlay {
            self.width.invalidate();
        }
    }

    pub fn unmount_surface(&mut self, id: SurfaceId) -> Option<S> {
        if id == SurfaceId::Scrollbar {
            self.sync.unregister_surface(SurfaceId::Scrollbar);
        }
        self.surfaces.unmount(id)
    }

    /// Mount the custom scrollbar. Refused while the content fits.
    pub fn attach_scrollbar(&mut self, surface: S) -> bool {
        if !self.overflow.is_overflowing() {
            return false;
        }
        self.surfaces.mount(SurfaceId::Scrollbar, surface);
        self.sync.register(SurfaceId::Input, SurfaceId::Scrollbar);
        self.sync.register_all(
            SurfaceId::Scrollbar,
            &[SurfaceId::Input, SurfaceId::Overlay],
        );
        self.on_horizontal_scroll(SurfaceId::Input);
        true
    }

    fn hide_scrollbar(&mut self) {
        self.sync.unregister_surface(SurfaceId::Scrollbar);
        self.surfaces.unmount(SurfaceId::Scrollbar);
        self.events.push(RendererEvent::ScrollbarHidden);
    }

    fn report(&mut self, surface: SurfaceId, err: SurfaceError) {
        tracing::warn!(?surface, %err, "surface observer failed");
        self.events.push(RendererEvent::ObserverFailed {
            surface,
            message: err.to_string(),
        });
    }

    /// A surface scrolled horizontally; copy its offset to its followers.
    pub fn on_horizontal_scroll(&mut self, driver: SurfaceId) -> usize {
        let outcome = self.sync.on_scroll(driver, &mut self.surfaces);
        for (surface, err) in outcome.failures {
            self.report(surface, err);
        }
        outcome.updated
    }

    /// The input surface was resized or its content changed: reconcile the
    /// overlay width and the scrollbar.
    pub fn observe_width(&mut self) {
        let Some(input) = self.surfaces.get(SurfaceId::Input) else {
            return;
        };
        let metrics = match input.metrics() {
            Ok(metrics) => metrics,
            Err(err) => {
                self.report(SurfaceId::Input, err);
                return;
            }
        };

        let width = ContentWidth::from_metrics(&metrics);
        if let Err(err) = self
            .width
            .apply(width, self.surfaces.get_mut(SurfaceId::Overlay))
        {
            self.report(SurfaceId::Overlay, err);
        }

        match self.overflow.observe(&metrics) {
            Some(true) => self.events.push(RendererEvent::ScrollbarShown),
            Some(false) => self.hide_scrollbar(),
            None => {}
        }
    }

    // ==================== Navigation ====================

    /// Resolve the current fragment as on first mount.
    pub fn mount(&mut self, nav: &impl NavigationStore) {
        self.resolve_token(nav.token());
    }

    /// Resolve the fragment if it changed since we last looked.
    pub fn navigation_changed(&mut self, nav: &impl NavigationStore) {
        let token = nav.token();
        if token != self.seen_token {
            self.resolve_token(token);
        }
    }

    fn resolve_token(&mut self, token: Option<String>) {
        let previous = self.highlight_target(self.seen_token.as_deref());
        let next = match self.anchors.resolve(token.as_deref(), &self.records) {
            Resolution::Target(index) => {
                self.pending_scroll = Some(PendingScroll {
                    generation: self.generation,
                    index,
                    align: Align::Start,
                });
                self.highlight_target(token.as_deref())
            }
            Resolution::NotOurs => None,
            Resolution::Unresolved(reason) => {
                let raw = token.clone().unwrap_or_default();
                tracing::warn!(token = %raw, %reason, "unresolved line anchor");
                self.pending_scroll = None;
                self.events
                    .push(RendererEvent::UnresolvedToken { raw, reason });
                None
            }
        };
        self.highlight_changed(previous, next);
        self.seen_token = token;
    }

    /// Row and side `token` highlights in the current content
    fn highlight_target(&self, token: Option<&str>) -> Option<(usize, Side)> {
        let Resolution::Target(index) = self.anchors.resolve(token, &self.records) else {
            return None;
        };
        let side = match NavToken::parse(token?).ok()? {
            NavToken::Line(_) => Side::Head,
            NavToken::Diff { side, .. } => side,
        };
        Some((index, side))
    }

    fn highlight_changed(
        &mut self,
        previous: Option<(usize, Side)>,
        next: Option<(usize, Side)>,
    ) {
        if previous == next {
            return;
        }
        if let Some((index, side)) = previous {
            if let Some(record) = self.records.get(index) {
                self.events.push(RendererEvent::Unhighlighted {
                    identity: record.identity.clone(),
                    side,
                });
            }
        }
        if let Some((index, side)) = next {
            if let Some(record) = self.records.get(index) {
                self.events.push(RendererEvent::Highlighted {
                    identity: record.identity.clone(),
                    side,
                });
            }
        }
    }

    /// Toggle the highlight on a line number. Last click wins.
    ///
    /// Returns false when the row has no line on `side`.
    pub fn click_line_number(
        &mut self,
        index: usize,
        side: Side,
        nav: &mut impl NavigationStore,
    ) -> bool {
        let Some(record) = self.records.get(index) else {
            return false;
        };
        let Some(clicked) = self.anchors.token_for(&record.identity, side) else {
            return false;
        };

        let current = nav.token();
        let next = self.anchors.toggle(current.as_deref(), &clicked);
        let previous = self.highlight_target(current.as_deref());
        let target = next.is_some().then_some((index, side));
        self.highlight_changed(previous, target);

        nav.set_token(next.clone());
        self.seen_token = next;
        true
    }

    // ==================== Frame pipeline ====================

    /// Vertical scroll event: suppress pointer input and lay out again.
    pub fn on_scroll(&mut self, now: Instant, scroller: &impl ScrollController) -> FrameUpdate {
        if let Some(mode) = self.pointer.on_scroll(now) {
            self.events.push(RendererEvent::PointerModeChanged(mode));
        }
        self.layout(scroller)
    }

    /// Viewport resize: reconcile widths, then lay out again.
    pub fn on_resize(&mut self, scroller: &impl ScrollController) -> FrameUpdate {
        self.observe_width();
        self.layout(scroller)
    }

    /// Compute the window for the current scroll position.
    pub fn layout(&mut self, scroller: &impl ScrollController) -> FrameUpdate {
        let window = self
            .engine
            .compute(scroller.scroll_offset(), scroller.viewport_size());
        let mounted = window
            .items
            .iter()
            .map(|item| item.index)
            .filter(|&index| !self.window.contains(index))
            .collect();
        let unmounted = self
            .window
            .items
            .iter()
            .map(|item| item.index)
            .filter(|&index| !window.contains(index))
            .collect();
        self.window = window.clone();
        FrameUpdate {
            window,
            mounted,
            unmounted,
        }
    }

    /// Feed back rendered heights. Changes are applied by the next
    /// [`Renderer::flush`], not immediately.
    pub fn commit_measurements(&mut self, sizes: impl IntoIterator<Item = (usize, i64)>) {
        for (index, height) in sizes {
            if self.engine.measure(index, height) {
                self.needs_correction = true;
            }
        }
    }

    /// Apply offset corrections and any pending scroll-to-line.
    ///
    /// Returns the follow-up layout when anything moved.
    pub fn flush(&mut self, scroller: &mut impl ScrollController) -> Option<FrameUpdate> {
        let mut relayout = std::mem::take(&mut self.needs_correction);

        if let Some(pending) = self.pending_scroll.take() {
            if pending.generation == self.generation && pending.index < self.records.len() {
                let offset =
                    self.engine
                        .offset_for(pending.index, pending.align, scroller.viewport_size());
                scroller.scroll_to(offset);
                self.events.push(RendererEvent::ScrollToRequested {
                    index: pending.index,
                    align: pending.align,
                });
                relayout = true;
            } else {
                tracing::debug!(index = pending.index, "abandoning stale scroll target");
            }
        }

        relayout.then(|| self.layout(&*scroller))
    }

    /// Scroll so that `index` lands at `align` right away (keyboard moves).
    pub fn scroll_to_index(
        &mut self,
        index: usize,
        align: Align,
        scroller: &mut impl ScrollController,
    ) -> Option<FrameUpdate> {
        if index >= self.records.len() {
            return None;
        }
        let offset = self
            .engine
            .offset_for(index, align, scroller.viewport_size());
        scroller.scroll_to(offset);
        self.events
            .push(RendererEvent::ScrollToRequested { index, align });
        Some(self.layout(&*scroller))
    }

    /// Advance the pointer suppressor.
    pub fn tick(&mut self, now: Instant) {
        if let Some(mode) = self.pointer.tick(now) {
            self.events.push(RendererEvent::PointerModeChanged(mode));
        }
    }

    /// Tear down: cancel timers and pending work, drop surfaces.
    pub fn unmount(&mut self) {
        self.pointer.unmount();
        self.pending_scroll = None;
        self.sync.unregister_surface(SurfaceId::Scrollbar);
        self.surfaces.clear();
        self.width.invalidate();
        self.overflow = OverflowDetector::new();
    }

    // ==================== Rows ====================

    fn gutter_cell(
        &self,
        record: &LineRecord<T>,
        side: Side,
        current: Option<&NavToken>,
    ) -> GutterCell {
        let number = record.identity.number(side);
        let decoration = if number.is_some() {
            record.coverage(side).decoration()
        } else {
            CoverageDecoration::default()
        };
        GutterCell {
            highlighted: number.is_some()
                && self
                    .anchors
                    .is_highlighted(current, &record.identity, side),
            number,
            decoration,
        }
    }

    /// Mounted rows, decorated for the current fragment.
    pub fn rows<'a>(
        &'a self,
        current_token: Option<&str>,
    ) -> impl Iterator<Item = RenderedRow<'a, T>> + 'a {
        let current = current_token.and_then(|raw| NavToken::parse(raw).ok());
        let diff_mode = matches!(self.anchors.mode(), AnchorMode::Diff { .. });
        self.window.items.iter().filter_map(move |item| {
            let record = self.records.get(item.index)?;
            Some(RenderedRow {
                record,
                item: *item,
                base: diff_mode.then(|| self.gutter_cell(record, Side::Base, current.as_ref())),
                head: self.gutter_cell(record, Side::Head, current.as_ref()),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{hash_path, MemoryNavigation};
    use crate::coverage::{Coverage, CoverageMap, CoverageTone, GutterIcon, LineCoverage};
    use crate::line::{DiffIdentity, LineIdentity};
    use crate::surface::testing::FakeSurface;
    use std::time::Duration;

    struct TestScroller {
        offset: u64,
        viewport: u32,
    }

    impl ScrollController for TestScroller {
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

    fn config() -> RendererConfig {
        RendererConfig {
            overscan: 2,
            estimated_row_height: 20,
            pointer_quiet_ms: 150,
        }
    }

    fn file_renderer(lines: usize, coverage: &CoverageMap) -> Renderer<String, FakeSurface> {
        let mut renderer = Renderer::new(config());
        let lines = (1..=lines).map(|n| vec![format!("line {n}")]).collect();
        renderer.set_file_content(lines, coverage);
        renderer
    }

    fn scroll_requests(events: &[RendererEvent]) -> Vec<usize> {
        events
            .iter()
            .filter_map(|event| match event {
                RendererEvent::ScrollToRequested { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_three_line_coverage_file() {
        let coverage: CoverageMap = [
            (1, LineCoverage::new(Coverage::Hit, Some(2))),
            (2, LineCoverage::new(Coverage::Miss, None)),
            (3, LineCoverage::new(Coverage::Partial, None)),
        ]
        .into_iter()
        .collect();
        let mut renderer = file_renderer(3, &coverage);
        renderer.mount_surface(SurfaceId::Input, FakeSurface::new(60, 100));
        renderer.mount_surface(SurfaceId::Overlay, FakeSurface::new(60, 100));
        let scroller = TestScroller {
            offset: 0,
            viewport: 200,
        };
        let update = renderer.on_resize(&scroller);
        assert_eq!(update.mounted, vec![0, 1, 2]);

        let rows: Vec<_> = renderer.rows(None).collect();
        let tones: Vec<_> = rows
            .iter()
            .map(|row| row.head.decoration.bar.map(|bar| bar.tone))
            .collect();
        assert_eq!(
            tones,
            vec![
                Some(CoverageTone::Covered),
                Some(CoverageTone::Uncovered),
                Some(CoverageTone::Partial)
            ]
        );
        assert_eq!(rows[0].head.decoration.badge, Some(2));
        assert_eq!(rows[1].head.decoration.icon, Some(GutterIcon::Warning));
        assert_eq!(rows[2].head.decoration.icon, Some(GutterIcon::PartialMarker));
        assert!(rows.iter().all(|row| row.base.is_none()));

        assert!(!renderer.is_overflowing());
        let events = renderer.take_events();
        assert!(!events.contains(&RendererEvent::ScrollbarShown));
        assert_eq!(
            renderer
                .surfaces()
                .get(SurfaceId::Overlay)
                .and_then(|s| s.content_width),
            Some(ContentWidth::Full)
        );
    }

    #[test]
    fn test_head_only_diff_row() {
        let hash = hash_path("src/app.rs");
        let mut renderer: Renderer<&str, FakeSurface> = Renderer::new(config());
        renderer.set_diff_content(
            hash.clone(),
            vec![
                DiffRow {
                    identity: DiffIdentity::new(Some(41), Some(41)),
                    tokens: vec!["same"],
                    base_coverage: LineCoverage::new(Coverage::Hit, None),
                    head_coverage: LineCoverage::new(Coverage::Hit, None),
                },
                DiffRow {
                    identity: DiffIdentity::new(None, Some(42)),
                    tokens: vec!["added"],
                    base_coverage: LineCoverage::new(Coverage::Miss, None),
                    head_coverage: LineCoverage::new(Coverage::Miss, None),
                },
            ],
        );
        let scroller = TestScroller {
            offset: 0,
            viewport: 100,
        };
        renderer.layout(&scroller);

        let rows: Vec<_> = renderer.rows(None).collect();
        let base = rows[1].base.as_ref().expect("diff rows have a base gutter");
        assert_eq!(base.number, None);
        assert_eq!(base.decoration, CoverageDecoration::default());
        assert_eq!(rows[1].head.number.as_deref(), Some("42"));
        assert_eq!(rows[1].head.decoration.icon, Some(GutterIcon::Warning));

        let mut nav = MemoryNavigation::default();
        assert!(!renderer.click_line_number(1, Side::Base, &mut nav));
        assert!(renderer.click_line_number(1, Side::Head, &mut nav));
        assert_eq!(nav.token(), Some(format!("#{hash}-R42")));

        let token = nav.token();
        let rows: Vec<_> = renderer.rows(token.as_deref()).collect();
        assert!(rows[1].head.highlighted);
        assert!(!rows[0].head.highlighted);
        assert!(!rows[1].base.as_ref().is_some_and(|cell| cell.highlighted));
    }

    #[test]
    fn test_anchor_on_mount_scrolls_to_index() {
        let mut renderer = file_renderer(10, &CoverageMap::new());
        let nav = MemoryNavigation::new(Some("#L4".into()));
        let mut scroller = TestScroller {
            offset: 0,
            viewport: 60,
        };
        renderer.mount(&nav);
        renderer.layout(&scroller);

        let update = renderer.flush(&mut scroller).expect("scroll moves the window");
        assert_eq!(scroller.offset, 60);
        assert_eq!(update.window.item(3).map(|item| item.start), Some(60));
        let events = renderer.take_events();
        assert!(events.contains(&RendererEvent::ScrollToRequested {
            index: 3,
            align: Align::Start
        }));
    }

    #[test]
    fn test_unknown_line_emits_diagnostic() {
        let mut renderer = file_renderer(10, &CoverageMap::new());
        let nav = MemoryNavigation::new(Some("#L999".into()));
        let mut scroller = TestScroller {
            offset: 0,
            viewport: 60,
        };
        renderer.mount(&nav);
        assert!(renderer.flush(&mut scroller).is_none());
        assert_eq!(scroller.offset, 0);

        let events = renderer.take_events();
        assert!(scroll_requests(&events).is_empty());
        assert!(events.iter().any(|event| matches!(
            event,
            RendererEvent::UnresolvedToken { raw, .. } if raw == "#L999"
        )));
    }

    #[test]
    fn test_content_swap_drops_pending_scroll() {
        let mut renderer = file_renderer(10, &CoverageMap::new());
        let nav = MemoryNavigation::new(Some("#L8".into()));
        let mut scroller = TestScroller {
            offset: 0,
            viewport: 60,
        };
        renderer.mount(&nav);
        let lines = (0..10).map(|n| vec![format!("new {n}")]).collect();
        renderer.set_file_content(lines, &CoverageMap::new());

        assert!(renderer.flush(&mut scroller).is_none());
        assert_eq!(scroller.offset, 0);
        assert!(scroll_requests(&renderer.take_events()).is_empty());
    }

    #[test]
    fn test_navigation_change_only_when_token_differs() {
        let mut renderer = file_renderer(10, &CoverageMap::new());
        let mut nav = MemoryNavigation::new(Some("#L2".into()));
        let mut scroller = TestScroller {
            offset: 0,
            viewport: 60,
        };
        renderer.mount(&nav);
        renderer.flush(&mut scroller);
        renderer.navigation_changed(&nav);
        assert!(renderer.flush(&mut scroller).is_none());

        nav.set_token(Some("#L6".into()));
        renderer.navigation_changed(&nav);
        renderer.flush(&mut scroller);
        assert_eq!(scroll_requests(&renderer.take_events()), vec![1, 5]);
    }

    #[test]
    fn test_rapid_scrolls_toggle_pointer_once() {
        let mut renderer = file_renderer(100, &CoverageMap::new());
        let mut scroller = TestScroller {
            offset: 0,
            viewport: 60,
        };
        let start = Instant::now();
        for i in 0..5u64 {
            let now = start + Duration::from_millis(i * 20);
            renderer.tick(now);
            scroller.offset += 40;
            renderer.on_scroll(now, &scroller);
        }
        renderer.tick(start + Duration::from_millis(200));
        assert_eq!(renderer.pointer_mode(), PointerMode::Disabled);
        renderer.tick(start + Duration::from_millis(230));
        renderer.tick(start + Duration::from_millis(500));

        let modes: Vec<_> = renderer
            .take_events()
            .into_iter()
            .filter_map(|event| match event {
                RendererEvent::PointerModeChanged(mode) => Some(mode),
                _ => None,
            })
            .collect();
        assert_eq!(modes, vec![PointerMode::Disabled, PointerMode::Enabled]);
    }

    #[test]
    fn test_measurement_corrects_offsets_on_flush() {
        let mut renderer = file_renderer(50, &CoverageMap::new());
        let mut scroller = TestScroller {
            offset: 0,
            viewport: 100,
        };
        let update = renderer.layout(&scroller);
        assert_eq!(update.window.item(4).map(|item| item.start), Some(80));

        // Row 1 wrapped onto three lines
        renderer.commit_measurements(
            update
                .mounted
                .iter()
                .map(|&i| (i, if i == 1 { 60 } else { 20 })),
        );
        assert_eq!(renderer.window().item(4).map(|item| item.start), Some(80));

        let corrected = renderer.flush(&mut scroller).expect("height changed");
        assert_eq!(corrected.window.item(4).map(|item| item.start), Some(120));
        assert_eq!(corrected.window.total_size, 50 * 20 + 40);
        assert!(renderer.flush(&mut scroller).is_none());
    }

    #[test]
    fn test_layout_reports_mount_changes() {
        let mut renderer = file_renderer(100, &CoverageMap::new());
        let mut scroller = TestScroller {
            offset: 0,
            viewport: 100,
        };
        let first = renderer.layout(&scroller);
        assert_eq!(first.mounted, (0..=6).collect::<Vec<_>>());
        scroller.offset = 40;
        let second = renderer.on_scroll(Instant::now(), &scroller);
        assert_eq!(second.mounted, vec![7, 8]);
        assert!(second.unmounted.is_empty());
        scroller.offset = 400;
        let third = renderer.on_scroll(Instant::now(), &scroller);
        assert_eq!(third.unmounted, (0..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_highlight_exclusive_and_clears() {
        let mut renderer = file_renderer(10, &CoverageMap::new());
        let mut nav = MemoryNavigation::default();
        let scroller = TestScroller {
            offset: 0,
            viewport: 200,
        };
        renderer.layout(&scroller);

        renderer.click_line_number(2, Side::Head, &mut nav);
        renderer.click_line_number(5, Side::Head, &mut nav);
        let token = nav.token();
        let highlighted: Vec<usize> = renderer
            .rows(token.as_deref())
            .filter(|row| row.head.highlighted)
            .map(|row| row.record.index)
            .collect();
        assert_eq!(highlighted, vec![5]);

        let events = renderer.take_events();
        assert!(events.contains(&RendererEvent::Unhighlighted {
            identity: LineIdentity::Number(3),
            side: Side::Head
        }));

        renderer.click_line_number(5, Side::Head, &mut nav);
        assert_eq!(nav.token(), None);
        assert_eq!(renderer.rows(None).filter(|row| row.head.highlighted).count(), 0);
        // Clicking sets the fragment but does not scroll
        let mut scroller = scroller;
        assert!(renderer.flush(&mut scroller).is_none());
    }

    #[test]
    fn test_scrollbar_lifecycle() {
        let mut renderer = file_renderer(3, &CoverageMap::new());
        renderer.mount_surface(SurfaceId::Input, FakeSurface::new(400, 100));
        renderer.mount_surface(SurfaceId::Overlay, FakeSurface::new(100, 100));

        // Content fits until the input surface reports otherwise
        assert!(!renderer.attach_scrollbar(FakeSurface::new(400, 100)));

        renderer.observe_width();
        assert!(renderer.is_overflowing());
        assert!(renderer.take_events().contains(&RendererEvent::ScrollbarShown));
        assert_eq!(
            renderer
                .surfaces()
                .get(SurfaceId::Overlay)
                .and_then(|s| s.content_width),
            Some(ContentWidth::Exact(400))
        );
        assert!(renderer.attach_scrollbar(FakeSurface::new(400, 100)));

        // Dragging the scrollbar moves the other two
        renderer
            .surfaces_mut()
            .get_mut(SurfaceId::Scrollbar)
            .unwrap()
            .metrics
            .scroll_left = 120;
        assert_eq!(renderer.on_horizontal_scroll(SurfaceId::Scrollbar), 2);
        for id in [SurfaceId::Input, SurfaceId::Overlay] {
            assert_eq!(renderer.surfaces().get(id).unwrap().metrics.scroll_left, 120);
        }

        // Viewport widens: the scrollbar is torn down with its listeners
        renderer
            .surfaces_mut()
            .get_mut(SurfaceId::Input)
            .unwrap()
            .metrics
            .client_width = 500;
        renderer.observe_width();
        assert!(!renderer.surfaces().is_mounted(SurfaceId::Scrollbar));
        assert!(renderer.take_events().contains(&RendererEvent::ScrollbarHidden));
        assert_eq!(renderer.on_horizontal_scroll(SurfaceId::Scrollbar), 0);
    }

    #[test]
    fn test_broken_surface_is_a_diagnostic() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let mut renderer = file_renderer(3, &CoverageMap::new());
        let mut input = FakeSurface::new(400, 100);
        input.broken = true;
        renderer.mount_surface(SurfaceId::Input, input);
        renderer.observe_width();
        renderer.on_horizontal_scroll(SurfaceId::Input);

        let failures = renderer
            .take_events()
            .into_iter()
            .filter(|event| matches!(event, RendererEvent::ObserverFailed { .. }))
            .count();
        assert_eq!(failures, 2);
    }

    #[test]
    fn test_unmount_cancels_pending_work() {
        let mut renderer = file_renderer(10, &CoverageMap::new());
        let nav = MemoryNavigation::new(Some("#L5".into()));
        let mut scroller = TestScroller {
            offset: 0,
            viewport: 60,
        };
        let start = Instant::now();
        renderer.mount(&nav);
        assert_eq!(
            renderer.take_events(),
            vec![RendererEvent::Highlighted {
                identity: LineIdentity::Number(5),
                side: Side::Head
            }]
        );
        renderer.on_scroll(start, &scroller);
        renderer.unmount();
        renderer.tick(start + Duration::from_secs(1));
        assert!(renderer.flush(&mut scroller).is_none());

        let events = renderer.take_events();
        assert_eq!(
            events,
            vec![RendererEvent::PointerModeChanged(PointerMode::Disabled)]
        );
    }

    #[test]
    fn test_external_token_change_moves_highlight() {
        let mut renderer = file_renderer(10, &CoverageMap::new());
        let mut nav = MemoryNavigation::new(Some("#L2".into()));
        renderer.mount(&nav);
        renderer.take_events();

        nav.set_token(Some("#L7".into()));
        renderer.navigation_changed(&nav);
        assert_eq!(
            renderer.take_events(),
            vec![
                RendererEvent::Unhighlighted {
                    identity: LineIdentity::Number(2),
                    side: Side::Head
                },
                RendererEvent::Highlighted {
                    identity: LineIdentity::Number(7),
                    side: Side::Head
                },
            ]
        );

        // Cleared fragment drops the highlight
        nav.set_token(None);
        renderer.navigation_changed(&nav);
        assert_eq!(
            renderer.take_events(),
            vec![RendererEvent::Unhighlighted {
                identity: LineIdentity::Number(7),
                side: Side::Head
            }]
        );

        // Unresolved tokens never highlight
        nav.set_token(Some("#L99".into()));
        renderer.navigation_changed(&nav);
        let events = renderer.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], RendererEvent::UnresolvedToken { .. }));
    }

    #[test]
    fn test_unmeasured_lists_window_rows_without_heights() {
        let mut renderer = file_renderer(50, &CoverageMap::new());
        let mut scroller = TestScroller {
            offset: 0,
            viewport: 60,
        };
        let update = renderer.layout(&scroller);
        assert_eq!(renderer.unmeasured(), update.mounted);

        renderer.commit_measurements(update.mounted.iter().map(|&index| (index, 20)));
        assert!(renderer.unmeasured().is_empty());

        // Scrolling without measuring leaves the new rows pending
        scroller.offset = 400;
        renderer.on_scroll(Instant::now(), &scroller);
        let pending = renderer.unmeasured();
        assert!(!pending.is_empty());
        assert!(pending.iter().all(|&index| index >= 5));
        assert_eq!(pending.len(), renderer.window().items.len());
    }

    #[test]
    fn test_scroll_to_index_end_alignment() {
        let mut renderer = file_renderer(20, &CoverageMap::new());
        let mut scroller = TestScroller {
            offset: 0,
            viewport: 60,
        };
        renderer.layout(&scroller);
        let update = renderer
            .scroll_to_index(9, Align::End, &mut scroller)
            .expect("index in range");
        assert_eq!(scroller.offset, 140);
        assert!(update.window.contains(9));
        assert!(renderer.scroll_to_index(20, Align::End, &mut scroller).is_none());
    }

    #[test]
    fn test_invalidate_heights_keeps_content() {
        let mut renderer = file_renderer(10, &CoverageMap::new());
        let scroller = TestScroller {
            offset: 0,
            viewport: 200,
        };
        renderer.layout(&scroller);
        renderer.commit_measurements([(0, 80)]);
        assert_eq!(renderer.total_size(), 9 * 20 + 80);
        renderer.invalidate_heights();
        assert_eq!(renderer.total_size(), 200);
        assert_eq!(renderer.len(), 10);
        assert!(renderer.window().is_empty());
    }

    #[test]
    fn test_summary_counts_head_side() {
        let coverage: CoverageMap = [
            (1, LineCoverage::new(Coverage::Hit, None)),
            (2, LineCoverage::new(Coverage::Miss, None)),
        ]
        .into_iter()
        .collect();
        let renderer = file_renderer(4, &coverage);
        let summary = renderer.summary(Side::Head);
        assert_eq!((summary.hits, summary.misses), (1, 1));
        assert_eq!(renderer.summary(Side::Base).tracked(), 0);
    }
}
