//! Shared argument handling and output formatting.

use clap::ValueEnum;

use depthscope::navigator::StepPath;
use depthscope::query::{CompositeHalf, QueryResponse};
use depthscope::{InputEvent, QueryMode, SessionUpdate, ViewerConfig};

use crate::error::CliError;

/// Query mode as a command-line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// One click reads the depth under the pointer.
    Point,
    /// Two clicks select a rectangle and average its valid depth.
    Rect,
}

impl From<ModeArg> for QueryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Point => QueryMode::Point,
            ModeArg::Rect => QueryMode::RectangleAverage,
        }
    }
}

/// Build a viewer configuration from the shared flags.
pub fn viewer_config(start: u64, capacity: Option<usize>) -> ViewerConfig {
    let mut config = ViewerConfig::default().with_start_index(start);
    if let Some(capacity) = capacity {
        config = config.with_cache_capacity(capacity);
    }
    config
}

/// Parse a step script like `fffbf` into navigation events.
pub fn parse_step_script(script: &str) -> Result<Vec<InputEvent>, CliError> {
    script
        .chars()
        .map(|c| match c {
            'f' => Ok(InputEvent::StepForward),
            'b' => Ok(InputEvent::StepBackward),
            other => Err(CliError::Config(format!(
                "invalid step '{other}' in script (use f for forward, b for backward)"
            ))),
        })
        .collect()
}

/// Parse a display-space click `x,y`.
pub fn parse_click(spec: &str) -> Result<(u32, u32), CliError> {
    let parts: Vec<&str> = spec.split(',').collect();
    let [x, y] = parts.as_slice() else {
        return Err(CliError::Config(format!(
            "expected x,y but got '{spec}'"
        )));
    };
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| CliError::Config(format!("invalid coordinate '{s}' in '{spec}'")))
    };
    Ok((parse(x)?, parse(y)?))
}

/// Parse a rectangle spec `x1,y1,x2,y2` into two display-space clicks.
pub fn parse_rect_spec(spec: &str) -> Result<((u32, u32), (u32, u32)), CliError> {
    let parts: Vec<&str> = spec.split(',').collect();
    let [x1, y1, x2, y2] = parts.as_slice() else {
        return Err(CliError::Config(format!(
            "expected x1,y1,x2,y2 but got '{spec}'"
        )));
    };
    Ok((
        parse_click(&format!("{x1},{y1}"))?,
        parse_click(&format!("{x2},{y2}"))?,
    ))
}

fn half_name(half: CompositeHalf) -> &'static str {
    match half {
        CompositeHalf::Color => "color",
        CompositeHalf::Depth => "depth",
    }
}

fn path_name(path: StepPath) -> &'static str {
    match path {
        StepPath::FreshRead => "fresh read",
        StepPath::CachedReplay => "cache replay",
        StepPath::CachedPrevious => "cache hit",
        StepPath::Reseek => "reseek",
    }
}

/// One-line description of a query response.
pub fn describe_response(response: &QueryResponse) -> String {
    match response {
        QueryResponse::CornerPlaced { raw } => {
            format!("corner placed at raw ({}, {})", raw.x, raw.y)
        }
        QueryResponse::PointMeasured { raw, half, depth_mm } => format!(
            "depth {} mm at raw ({}, {}) [{} half]",
            depth_mm,
            raw.x,
            raw.y,
            half_name(*half)
        ),
        QueryResponse::RegionCommitted { rect, stats } => format!(
            "avg {:.1} mm over {} samples in raw [{}..{}, {}..{}]",
            stats.mean_mm, stats.samples, rect.x_min, rect.x_max, rect.y_min, rect.y_max
        ),
        QueryResponse::EmptyRegion { rect } => format!(
            "no valid samples in raw [{}..{}, {}..{}]",
            rect.x_min, rect.x_max, rect.y_min, rect.y_max
        ),
        QueryResponse::Rejected { x, y } => {
            format!("click ({x}, {y}) is outside the sensor bounds")
        }
    }
}

/// One-line description of a session update.
pub fn describe_update(update: &SessionUpdate) -> String {
    match update {
        SessionUpdate::Stepped { index, path } => {
            format!("frame {} ({})", index, path_name(*path))
        }
        SessionUpdate::Unavailable => "unavailable (stream exhausted)".to_string(),
        SessionUpdate::AtStart => "at first frame".to_string(),
        SessionUpdate::Queried(response) => describe_response(response),
        SessionUpdate::Quit => "quit".to_string(),
    }
}
