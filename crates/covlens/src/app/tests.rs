use super::*;
use crate::syntax::plain_lines;
use covlens_core::{Coverage, CoverageMap, LineCoverage, NavigationStore};
use std::time::Instant;

fn lines(count: usize, width: usize) -> Vec<Vec<StyledSpan>> {
    (0..count)
        .map(|i| vec![StyledSpan::plain(format!("{:<width$}", i, width = width))])
        .collect()
}

fn file_app(count: usize, width: usize) -> App {
    let mut app = App::new(&Config::default());
    app.load_file("src/lib.rs".to_string(), lines(count, width), &CoverageMap::new());
    app
}

#[test]
fn test_goto_on_mount_scrolls_and_moves_cursor() {
    let mut app = file_app(100, 10);
    app.mount_navigation(Some("#L50".to_string()));
    app.prepare_viewport(10, 80);

    assert_eq!(app.scroller.offset, 49);
    assert_eq!(app.cursor, 49);
    assert_eq!(app.scroller.total, 100);
    assert!(app.message.is_none());
}

#[test]
fn test_goto_near_end_clamps_offset() {
    let mut app = file_app(100, 10);
    app.mount_navigation(Some("#L98".to_string()));
    app.prepare_viewport(10, 80);
    assert_eq!(app.scroller.offset, 90);
    assert_eq!(app.cursor, 97);
}

#[test]
fn test_unresolved_goto_sets_message() {
    let mut app = file_app(100, 10);
    app.mount_navigation(None);
    app.prepare_viewport(10, 80);

    app.open_goto();
    for c in "999".chars() {
        app.goto_push(c);
    }
    app.submit_goto();
    app.prepare_viewport(10, 80);

    assert!(app.goto.is_none());
    assert_eq!(app.scroller.offset, 0);
    let message = app.message.as_deref().unwrap_or_default();
    assert!(message.starts_with("#L999"), "message: {message}");
}

#[test]
fn test_goto_prompt_navigates_and_repeats() {
    let mut app = file_app(100, 10);
    app.mount_navigation(None);
    app.prepare_viewport(10, 80);

    app.open_goto();
    app.goto_push('4');
    app.goto_push('1');
    app.goto_pop();
    app.goto_push('0');
    app.submit_goto();
    app.prepare_viewport(10, 80);
    assert_eq!(app.nav.token().as_deref(), Some("#L40"));
    assert_eq!(app.scroller.offset, 39);

    // Scroll away, then ask for the same line again
    app.scroll_rows(-20, Instant::now());
    app.prepare_viewport(10, 80);
    assert_eq!(app.scroller.offset, 19);
    app.open_goto();
    app.goto_push('4');
    app.goto_push('0');
    app.submit_goto();
    app.prepare_viewport(10, 80);
    assert_eq!(app.scroller.offset, 39);
}

#[test]
fn test_goto_in_diff_uses_active_side() {
    let base = "a\nb\nc\n";
    let head = "a\nB\nc\nd\n";
    let rows = content::diff_rows(
        base,
        head,
        plain_lines(base),
        plain_lines(head),
        &CoverageMap::new(),
        &CoverageMap::new(),
    );
    let mut app = App::new(&Config::default());
    app.load_diff("a → b".to_string(), "abc123".to_string(), rows);
    app.mount_navigation(None);
    app.prepare_viewport(2, 40);

    app.switch_side();
    assert_eq!(app.active_side, Side::Base);
    app.open_goto();
    app.goto_push('3');
    app.submit_goto();
    assert_eq!(app.nav.token().as_deref(), Some("#abc123-L3"));
}

#[test]
fn test_wrapped_rows_are_measured() {
    let mut app = file_app(5, 25);
    app.toggle_line_wrap();
    app.mount_navigation(None);
    app.prepare_viewport(10, 10);

    assert_eq!(app.scroller.total, 15);
    let starts: Vec<u64> = app
        .renderer
        .window()
        .items
        .iter()
        .map(|item| item.start)
        .collect();
    assert_eq!(starts, vec![0, 3, 6, 9, 12]);

    app.prepare_viewport(10, 20);
    assert_eq!(app.scroller.total, 10);

    app.toggle_line_wrap();
    app.prepare_viewport(10, 20);
    assert_eq!(app.scroller.total, 5);
}

#[test]
fn test_rows_scrolled_in_are_measured_when_wrapped() {
    let mut app = file_app(50, 25);
    app.toggle_line_wrap();
    app.mount_navigation(None);
    app.prepare_viewport(10, 10);

    app.scroll_rows(30, Instant::now());
    app.prepare_viewport(10, 10);

    let window = app.renderer.window();
    assert!(window.items.iter().any(|item| item.index >= 20));
    for item in &window.items {
        assert_eq!(item.size, 3, "row {} not measured", item.index);
    }
    assert!(app.renderer.unmeasured().is_empty());
    assert_eq!(app.scroller.total, app.renderer.total_size());
}

#[test]
fn test_horizontal_scroll_keeps_surfaces_aligned() {
    let mut app = file_app(3, 200);
    app.mount_navigation(None);
    app.prepare_viewport(10, 80);
    assert!(app.renderer.is_overflowing());
    assert!(app.scrollbar_surface().is_some());

    app.scroll_right();
    assert_eq!(app.horizontal_offset(), 4);
    assert_eq!(app.scrollbar_surface().map(|s| s.scroll_left()), Some(4));

    app.drag_scrollbar(true);
    assert_eq!(app.horizontal_offset(), 12);
    let input = app.renderer.surfaces().get(SurfaceId::Input).map(|s| s.scroll_left());
    assert_eq!(input, Some(12));

    app.scroll_to_line_end();
    assert_eq!(app.horizontal_offset(), 120);
    app.scroll_to_line_start();
    assert_eq!(app.horizontal_offset(), 0);
}

#[test]
fn test_scrollbar_follows_overflow() {
    let mut app = file_app(3, 60);
    app.mount_navigation(None);
    app.prepare_viewport(10, 80);
    assert!(!app.renderer.is_overflowing());
    assert!(app.scrollbar_surface().is_none());

    // Narrow the pane until the lines overflow
    app.prepare_viewport(10, 40);
    assert!(app.scrollbar_surface().is_some());

    app.prepare_viewport(10, 100);
    assert!(app.scrollbar_surface().is_none());
}

#[test]
fn test_scrollbar_disabled_in_config() {
    let mut config = Config::default();
    config.ui.scrollbar = false;
    let mut app = App::new(&config);
    app.load_file("wide.rs".to_string(), lines(3, 200), &CoverageMap::new());
    app.mount_navigation(None);
    app.prepare_viewport(10, 80);

    assert!(app.renderer.is_overflowing());
    assert!(app.scrollbar_surface().is_none());
    app.scroll_right();
    assert_eq!(app.horizontal_offset(), 4);
}

#[test]
fn test_click_ignored_while_scrolling() {
    let mut app = file_app(100, 10);
    app.mount_navigation(None);
    app.prepare_viewport(10, 80);
    app.gutter_hits = vec![GutterHit {
        y: 0,
        x: 2..5,
        index: 3,
        side: Side::Head,
    }];

    let now = Instant::now();
    app.scroll_rows(3, now);
    app.tick(now);
    assert!(!app.pointer_enabled);
    app.click(3, 0);
    assert_eq!(app.nav.token(), None);

    app.tick(now + std::time::Duration::from_millis(200));
    assert!(app.pointer_enabled);
    app.click(3, 0);
    assert_eq!(app.nav.token().as_deref(), Some("#L4"));
    assert_eq!(app.cursor, 3);

    // Clicking the highlighted number again clears it
    app.click(3, 0);
    assert_eq!(app.nav.token(), None);
}

#[test]
fn test_toggle_highlight_on_missing_side() {
    let base = "a\n";
    let head = "a\nb\n";
    let rows = content::diff_rows(
        base,
        head,
        plain_lines(base),
        plain_lines(head),
        &CoverageMap::new(),
        &CoverageMap::new(),
    );
    let mut app = App::new(&Config::default());
    app.load_diff("a → b".to_string(), "abc123".to_string(), rows);
    app.mount_navigation(None);
    app.prepare_viewport(5, 40);

    app.cursor = 1;
    app.active_side = Side::Base;
    app.toggle_highlight();
    assert_eq!(app.nav.token(), None);
    assert_eq!(app.message.as_deref(), Some("no base line on this row"));

    app.switch_side();
    app.toggle_highlight();
    assert_eq!(app.nav.token().as_deref(), Some("#abc123-R2"));
}

#[test]
fn test_cursor_moves_keep_it_visible() {
    let mut app = file_app(100, 10);
    app.mount_navigation(None);
    app.prepare_viewport(10, 80);
    let now = Instant::now();

    app.move_cursor(15, now);
    assert_eq!(app.cursor, 15);
    assert_eq!(app.scroller.offset, 6);

    app.goto_end(now);
    assert_eq!(app.cursor, 99);
    assert_eq!(app.scroller.offset, 90);

    app.goto_start(now);
    assert_eq!(app.scroller.offset, 0);
}

#[test]
fn test_summary_follows_active_side() {
    let coverage: CoverageMap = [
        (1, LineCoverage::new(Coverage::Hit, Some(2))),
        (2, LineCoverage::new(Coverage::Miss, None)),
    ]
    .into_iter()
    .collect();
    let mut app = App::new(&Config::default());
    app.load_file("src/lib.rs".to_string(), lines(4, 10), &coverage);

    let summary = app.summary();
    assert_eq!(summary.hits, 1);
    assert_eq!(summary.misses, 1);
    assert_eq!(summary.percent(), Some(50.0));
}
