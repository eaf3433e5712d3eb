//! covlens CLI - virtualized source and diff viewer with coverage overlays

mod app;
mod config;
mod logging;
mod surface;
mod syntax;
mod text;
mod ui;
mod views;

use anyhow::{Context, Result};
use app::{content, App};
use clap::Parser;
use covlens_core::{hash_path, CoverageMap, NavToken, Side};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use syntax::SyntaxEngine;

#[derive(Parser, Debug)]
#[command(name = "covlens")]
#[command(author, version, about = "A source and diff viewer with per-line coverage")]
struct Args {
    /// File to view
    #[arg(
        required_unless_present_all = ["base", "head"],
        conflicts_with_all = ["base", "head"]
    )]
    file: Option<PathBuf>,

    /// Coverage map (JSON) for FILE
    #[arg(short, long, requires = "file")]
    coverage: Option<PathBuf>,

    /// Old side of a diff
    #[arg(long, requires = "head")]
    base: Option<PathBuf>,

    /// New side of a diff
    #[arg(long, requires = "base")]
    head: Option<PathBuf>,

    /// Coverage map (JSON) for the base file
    #[arg(long, requires = "base")]
    base_coverage: Option<PathBuf>,

    /// Coverage map (JSON) for the head file
    #[arg(long, requires = "head")]
    head_coverage: Option<PathBuf>,

    /// Line to open at: `#L12`, `#<hash>-R42`, or a bare line number
    #[arg(short, long)]
    goto: Option<String>,

    /// Syntax to use instead of detecting it from the file name (e.g. `rs`)
    #[arg(short, long)]
    language: Option<String>,

    /// Disable syntax highlighting
    #[arg(long)]
    no_syntax: bool,

    /// Wrap long lines
    #[arg(short, long)]
    wrap: bool,

    /// Log file (default: <cache dir>/covlens/covlens.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).context(format!("Failed to read: {}", path.display()))
}

fn load_coverage(path: Option<&Path>) -> Result<CoverageMap> {
    match path {
        Some(path) => CoverageMap::load(path)
            .with_context(|| format!("Failed to load coverage map: {}", path.display())),
        None => Ok(CoverageMap::new()),
    }
}

/// Bare line numbers become a token for the head side.
fn goto_token(raw: &str, hashed_path: Option<&str>) -> String {
    let raw = raw.trim();
    match (raw.parse::<usize>(), hashed_path) {
        (Ok(line), None) => NavToken::Line(line).to_string(),
        (Ok(line), Some(hashed_path)) => NavToken::Diff {
            hashed_path: hashed_path.to_string(),
            side: Side::Head,
            line,
        }
        .to_string(),
        (Err(_), _) => raw.to_string(),
    }
}

fn load_app(args: &Args, config: &config::Config) -> Result<App> {
    let mut app = App::new(config);
    app.line_wrap = app.line_wrap || args.wrap;

    let engine = (config.ui.syntax && !args.no_syntax).then(SyntaxEngine::new);
    let language = args.language.as_deref();

    let hashed_path = match (&args.file, &args.base, &args.head) {
        (Some(file), _, _) => {
            let source = read_source(file)?;
            let coverage = load_coverage(args.coverage.as_deref())?;
            let name = file.display().to_string();
            let lines = content::tokenize(engine.as_ref(), &source, &name, language);
            tracing::info!(file = %name, coverage_lines = coverage.len(), "loading file");
            app.load_file(name, lines, &coverage);
            None
        }
        (None, Some(base), Some(head)) => {
            let base_text = read_source(base)?;
            let head_text = read_source(head)?;
            let base_coverage = load_coverage(args.base_coverage.as_deref())?;
            let head_coverage = load_coverage(args.head_coverage.as_deref())?;
            let head_name = head.display().to_string();
            let base_name = base.display().to_string();
            let rows = content::diff_rows(
                &base_text,
                &head_text,
                content::tokenize(engine.as_ref(), &base_text, &base_name, language),
                content::tokenize(engine.as_ref(), &head_text, &head_name, language),
                &base_coverage,
                &head_coverage,
            );
            let hashed = hash_path(&head_name);
            app.load_diff(format!("{} → {}", base_name, head_name), hashed.clone(), rows);
            Some(hashed)
        }
        _ => anyhow::bail!("Usage: covlens <file> | covlens --base <old> --head <new>"),
    };

    let token = args
        .goto
        .as_deref()
        .map(|raw| goto_token(raw, hashed_path.as_deref()));
    app.mount_navigation(token);
    Ok(app)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = args.log_file.clone().unwrap_or_else(logging::default_log_path);
    if let Err(err) = logging::init(&log_path) {
        eprintln!("Warning: logging disabled: {:#}", err);
    }

    let config = config::Config::load();
    let mut app = load_app(&args, &config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(%err, "event loop failed");
        eprintln!("Error: {}", err);
        return Err(err);
    }

    Ok(())
}

fn handle_goto_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_goto(),
        KeyCode::Enter => app.submit_goto(),
        KeyCode::Backspace => app.goto_pop(),
        KeyCode::Char(c) => app.goto_push(c),
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if app.goto.is_some() {
        handle_goto_key(app, key);
        return;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        // Cursor
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1, now),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1, now),
        KeyCode::Home | KeyCode::Char('g') => app.goto_start(now),
        KeyCode::End | KeyCode::Char('G') => app.goto_end(now),
        // Page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => app.page_down(now),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.page_up(now),
        KeyCode::PageDown | KeyCode::Char('J') => app.page_down(now),
        KeyCode::PageUp | KeyCode::Char('K') => app.page_up(now),
        // Horizontal: input surface drives, scrollbar follows
        KeyCode::Left | KeyCode::Char('h') => app.scroll_left(),
        KeyCode::Right | KeyCode::Char('l') => app.scroll_right(),
        KeyCode::Char('0') => app.scroll_to_line_start(),
        KeyCode::Char('$') => app.scroll_to_line_end(),
        // Scrollbar drives, input and overlay follow
        KeyCode::Char('H') => app.drag_scrollbar(false),
        KeyCode::Char('L') => app.drag_scrollbar(true),
        // Anchors
        KeyCode::Enter => app.toggle_highlight(),
        KeyCode::Char(':') => app.open_goto(),
        KeyCode::Tab => app.switch_side(),
        KeyCode::Char('w') => app.toggle_line_wrap(),
        _ => {}
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(16);

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(tick_rate)? {
            let now = Instant::now();
            match event::read()? {
                Event::Mouse(me) => match me.kind {
                    MouseEventKind::ScrollUp => app.scroll_rows(-3, now),
                    MouseEventKind::ScrollDown => app.scroll_rows(3, now),
                    MouseEventKind::ScrollLeft => app.scroll_left(),
                    MouseEventKind::ScrollRight => app.scroll_right(),
                    MouseEventKind::Down(MouseButton::Left) => app.click(me.column, me.row),
                    _ => {}
                },
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key, now),
                _ => {}
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goto_token() {
        assert_eq!(goto_token("12", None), "#L12");
        assert_eq!(goto_token("#L4", None), "#L4");
        assert_eq!(goto_token(" 7 ", Some("abc")), "#abc-R7");
    }

    #[test]
    fn test_args_file_or_diff() {
        let args = Args::try_parse_from(["covlens", "src/lib.rs", "--coverage", "cov.json"])
            .expect("file mode parses");
        assert_eq!(args.file.as_deref(), Some(Path::new("src/lib.rs")));

        let args = Args::try_parse_from(["covlens", "--base", "a.rs", "--head", "b.rs"])
            .expect("diff mode parses");
        assert!(args.file.is_none());

        assert!(Args::try_parse_from(["covlens"]).is_err());
        assert!(Args::try_parse_from(["covlens", "--base", "a.rs"]).is_err());
        assert!(Args::try_parse_from(["covlens", "x.rs", "--base", "a.rs", "--head", "b.rs"]).is_err());
    }
}
