//! View command - interactive terminal viewer.
//!
//! Raw-mode crossterm loop around a [`ViewerSession`]: arrow keys step,
//! mouse clicks run queries, `m` toggles the query mode, `s` writes a PNG
//! snapshot. The composite is previewed with half-block cells and the HUD
//! shows position, cache usage, and the last query result. Logs go to a
//! file while the TUI owns the terminal.

use std::io::Stdout;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::Terminal;

use depthscope::source::PngDirSource;
use depthscope::{InputEvent, QueryMode, SessionUpdate, ViewerSession};

use super::common::{self, ModeArg};
use crate::error::CliError;
use crate::input::{self, ViewerAction};
use crate::snapshot::{self, PngSnapshotSink};
use crate::ui::{HudModel, HudWidget, PreviewWidget};
use crate::logging;

/// Arguments for the view command.
#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Directory of exported color_NNNNN.png / depth_NNNNN.png frame pairs
    #[arg(long)]
    pub input: PathBuf,

    /// Frame index to start at
    #[arg(long, default_value_t = 0)]
    pub start: u64,

    /// Query mode at startup (m toggles)
    #[arg(long, value_enum, default_value_t = ModeArg::Point)]
    pub mode: ModeArg,

    /// Ring cache capacity in frames
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Directory for PNG snapshots (s key)
    #[arg(long, default_value = "snapshots")]
    pub snapshot_dir: PathBuf,

    /// Directory for the log file
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,
}

/// Run the view command.
pub fn run(args: ViewArgs) -> Result<(), CliError> {
    let _log_guard = logging::init_file(&args.log_dir);

    let source = PngDirSource::open(&args.input)?;
    let config = common::viewer_config(args.start, args.capacity);
    let mut session = ViewerSession::open(source, args.mode.into(), config)?;
    let mut snapshots = PngSnapshotSink::new(&args.snapshot_dir)
        .map_err(|e| CliError::Snapshot(e.to_string()))?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || shutdown.store(true, Ordering::SeqCst)) {
            tracing::warn!(error = %e, "failed to install signal handler");
        }
    }

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut session, &mut snapshots, &shutdown);
    restore_terminal(&mut terminal);
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, CliError> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) {
    // Restore what we can even if one step fails; the shell is unusable
    // otherwise.
    if let Err(e) = disable_raw_mode() {
        tracing::warn!(error = %e, "failed to disable raw mode");
    }
    if let Err(e) = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    ) {
        tracing::warn!(error = %e, "failed to leave alternate screen");
    }
    if let Err(e) = terminal.show_cursor() {
        tracing::warn!(error = %e, "failed to restore cursor");
    }
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &mut ViewerSession<PngDirSource>,
    snapshots: &mut PngSnapshotSink,
    shutdown: &AtomicBool,
) -> Result<(), CliError> {
    let mut status: Option<String> = None;
    let mut preview_area = Rect::default();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            tracing::info!("shutdown signal received");
            return Ok(());
        }

        terminal.draw(|frame| {
            let [preview, hud] =
                Layout::vertical([Constraint::Min(10), Constraint::Length(7)]).areas(frame.area());
            preview_area = preview;

            if let Some(decoded) = session.current_frame() {
                let annotated = snapshot::rasterize(&decoded.composite, &session.overlays());
                frame.render_widget(PreviewWidget::new(&annotated), preview);
            }
            let model = hud_model(session, status.clone());
            frame.render_widget(HudWidget::new(&model), hud);
        })?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Some(action) = input::translate(&event::read()?) else {
            continue;
        };

        match action {
            ViewerAction::StepForward => {
                status = step_status(session.handle_event(InputEvent::StepForward)?);
            }
            ViewerAction::StepBackward => {
                status = step_status(session.handle_event(InputEvent::StepBackward)?);
            }
            ViewerAction::Click { column, row } => {
                if let Some((x, y)) = map_click(preview_area, session, column, row) {
                    session.handle_event(InputEvent::PointerClick { x, y })?;
                    status = None;
                }
            }
            ViewerAction::ToggleMode => {
                let next = match session.mode() {
                    QueryMode::Point => QueryMode::RectangleAverage,
                    QueryMode::RectangleAverage => QueryMode::Point,
                };
                session.set_mode(next);
                status = None;
            }
            ViewerAction::Snapshot => {
                session
                    .render_to(snapshots)
                    .map_err(|e| CliError::Snapshot(e.to_string()))?;
                status = snapshots
                    .last_path()
                    .map(|path| format!("snapshot written to {}", path.display()));
            }
            ViewerAction::Quit => return Ok(()),
        }
    }
}

fn step_status(update: SessionUpdate) -> Option<String> {
    match update {
        SessionUpdate::Stepped { .. } => None,
        other => Some(common::describe_update(&other)),
    }
}

/// Project a terminal cell inside the preview pane onto display coordinates.
fn map_click(
    area: Rect,
    session: &ViewerSession<PngDirSource>,
    column: u16,
    row: u16,
) -> Option<(u32, u32)> {
    if area.width == 0 || area.height == 0 || !area.contains(Position::new(column, row)) {
        return None;
    }
    let composite_w = f64::from(session.display_width() * 2);
    let composite_h = f64::from(session.display_height());
    // Cell centers, so a click anywhere in a cell lands mid-sample.
    let x = (f64::from(column - area.x) + 0.5) * composite_w / f64::from(area.width);
    let y = (f64::from(row - area.y) + 0.5) * composite_h / f64::from(area.height);
    Some((x as u32, y as u32))
}

fn hud_model(session: &ViewerSession<PngDirSource>, status: Option<String>) -> HudModel {
    let (raw_width, raw_height) = session
        .current_frame()
        .map(|frame| (frame.raw_width(), frame.raw_height()))
        .unwrap_or((0, 0));
    let (cache_len, cache_capacity) = session.cache_usage();
    HudModel {
        frame_index: session.current_index(),
        raw_width,
        raw_height,
        mode: session.mode(),
        cache_len,
        cache_capacity,
        selection: session.selection_state(),
        result_line: session.last_response().map(common::describe_response),
        metrics_line: session.metrics().to_string(),
        status_line: status,
    }
}
