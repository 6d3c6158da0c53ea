//! Probe command - headless stepping and querying.
//!
//! Drives the same session object as the interactive viewer, so a scripted
//! probe exercises exactly the navigation and query paths a user would.

use std::path::PathBuf;

use clap::Args;

use depthscope::source::PngDirSource;
use depthscope::{InputEvent, QueryMode, ViewerSession};

use super::common;
use crate::error::CliError;
use crate::logging;

/// Arguments for the probe command.
#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Directory of exported color_NNNNN.png / depth_NNNNN.png frame pairs
    #[arg(long)]
    pub input: PathBuf,

    /// Frame index to start at
    #[arg(long, default_value_t = 0)]
    pub start: u64,

    /// Step script applied before the query: f = forward, b = backward
    #[arg(long, default_value = "")]
    pub steps: String,

    /// Rectangle-average query as two display-space clicks: x1,y1,x2,y2
    #[arg(long, conflicts_with = "point")]
    pub rect: Option<String>,

    /// Point query as one display-space click: x,y
    #[arg(long)]
    pub point: Option<String>,

    /// Ring cache capacity in frames
    #[arg(long)]
    pub capacity: Option<usize>,
}

/// Run the probe command.
pub fn run(args: ProbeArgs) -> Result<(), CliError> {
    logging::init_stderr();

    // Parse everything before touching the stream, so a bad script fails
    // without a multi-second open.
    let steps = common::parse_step_script(&args.steps)?;
    let rect = args.rect.as_deref().map(common::parse_rect_spec).transpose()?;
    let point = args.point.as_deref().map(common::parse_click).transpose()?;

    let mode = if rect.is_some() {
        QueryMode::RectangleAverage
    } else {
        QueryMode::Point
    };

    let source = PngDirSource::open(&args.input)?;
    let config = common::viewer_config(args.start, args.capacity);
    let mut session = ViewerSession::open(source, mode, config)?;
    println!("opened {} at frame {}", args.input.display(), session.current_index());

    for (i, event) in steps.iter().enumerate() {
        let update = session.handle_event(*event)?;
        println!("step {:>3}: {}", i + 1, common::describe_update(&update));
    }

    if let Some(((x1, y1), (x2, y2))) = rect {
        let first = session.handle_event(InputEvent::PointerClick { x: x1, y: y1 })?;
        println!("click 1: {}", common::describe_update(&first));
        let second = session.handle_event(InputEvent::PointerClick { x: x2, y: y2 })?;
        println!("click 2: {}", common::describe_update(&second));
    } else if let Some((x, y)) = point {
        let update = session.handle_event(InputEvent::PointerClick { x, y })?;
        println!("click: {}", common::describe_update(&update));
    }

    println!("metrics: {}", session.metrics());
    Ok(())
}
