//! Frame filename parsing for exported PNG frame pairs.
//!
//! Recorded streams exported to disk use one file per plane per frame:
//! `color_00042.png` and `depth_00042.png`. The index is the sequential
//! frame index within the recording, zero-padded to five digits by the
//! exporter but accepted at any width here.

use std::sync::OnceLock;

use regex::Regex;

/// Which plane of a frame a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameChannel {
    /// The color plane (8-bit RGB).
    Color,
    /// The depth plane (16-bit grayscale, millimeters).
    Depth,
}

/// Parsed frame filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFilename {
    /// Plane the file holds.
    pub channel: FrameChannel,
    /// Sequential frame index within the recording.
    pub index: u64,
}

/// Error parsing a frame filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenameError {
    /// Filename doesn't match the `{channel}_{index}.png` pattern.
    InvalidPattern,
    /// Index component did not fit in a u64.
    InvalidIndex(String),
}

impl std::fmt::Display for FilenameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilenameError::InvalidPattern => write!(f, "Filename doesn't match frame pattern"),
            FilenameError::InvalidIndex(s) => write!(f, "Invalid frame index: {}", s),
        }
    }
}

impl std::error::Error for FilenameError {}

fn frame_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // (color|depth) - plane name
        // (\d+)         - frame index
        // \.png         - extension
        Regex::new(r"^(color|depth)_(\d+)\.png$").unwrap()
    })
}

/// Parse a frame filename into its plane and index.
///
/// # Examples
///
/// ```
/// use depthscope::source::{parse_frame_filename, FrameChannel};
///
/// let parsed = parse_frame_filename("depth_00042.png").unwrap();
/// assert_eq!(parsed.channel, FrameChannel::Depth);
/// assert_eq!(parsed.index, 42);
/// ```
pub fn parse_frame_filename(filename: &str) -> Result<FrameFilename, FilenameError> {
    let captures = frame_pattern()
        .captures(filename)
        .ok_or(FilenameError::InvalidPattern)?;

    let channel = match captures.get(1).map(|m| m.as_str()) {
        Some("color") => FrameChannel::Color,
        Some("depth") => FrameChannel::Depth,
        _ => return Err(FilenameError::InvalidPattern),
    };

    let index_str = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
    let index = index_str
        .parse::<u64>()
        .map_err(|_| FilenameError::InvalidIndex(index_str.to_string()))?;

    Ok(FrameFilename { channel, index })
}
