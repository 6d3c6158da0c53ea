//! Frame source abstraction for recorded dual-channel streams.
//!
//! A [`FrameSource`] wraps a recorded color+depth stream and exposes the
//! playback-handle contract the navigator relies on: sequential reads with a
//! bounded timeout, coarse timestamp seeks, pause/resume around seeks, and a
//! non-blocking drain of any decoder backlog left behind by a seek.
//!
//! Two implementations ship with the library:
//!
//! - [`PngDirSource`] - reads a directory of exported `color_NNNNN.png` /
//!   `depth_NNNNN.png` frame pairs (16-bit grayscale depth, millimeters).
//! - [`ScriptedSource`] - deterministic in-memory source for tests, with
//!   scriptable timeouts, seek landing bias, and simulated decoder backlog.

mod filename;
mod png_dir;
mod scripted;

pub use filename::{parse_frame_filename, FilenameError, FrameChannel, FrameFilename};
pub use png_dir::PngDirSource;
pub use scripted::{synthetic_frame, ScriptedSource};

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Color plane channel ordering as recorded by the sensor.
///
/// Recorded streams carry whatever order the vendor pipeline produced; the
/// compositor normalizes everything to RGB for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 3 bytes per pixel, red first.
    Rgb8,
    /// 3 bytes per pixel, blue first.
    Bgr8,
    /// 4 bytes per pixel, red first, trailing alpha.
    Rgba8,
    /// 4 bytes per pixel, blue first, trailing alpha.
    Bgra8,
}

impl PixelFormat {
    /// Number of bytes one pixel occupies in the color plane.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 3,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
        }
    }
}

/// One decoded sensor frame as delivered by a [`FrameSource`].
///
/// The depth plane is 16-bit distance in millimeters; a value of 0 marks an
/// invalid sample (no return). Both planes share the same resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// Width of both planes in pixels.
    pub width: u32,
    /// Height of both planes in pixels.
    pub height: u32,
    /// Channel ordering of the color plane.
    pub pixel_format: PixelFormat,
    /// Packed color plane, `width * height * bytes_per_pixel` bytes.
    pub color: Vec<u8>,
    /// Row-major depth plane, `width * height` samples, 0 = invalid.
    pub depth: Vec<u16>,
}

/// Result of a sequential read from a frame source.
#[derive(Debug)]
pub enum ReadOutcome {
    /// A frame was decoded.
    Frame(RawFrame),
    /// The stream has no further frames at the current position.
    EndOfStream,
    /// The source's internal decode did not produce a frame within the
    /// caller's timeout. The navigator treats this as stream exhaustion.
    Timeout,
}

/// Errors raised by frame sources.
///
/// Everything here is fatal to the read that raised it; only failure to open
/// the initial source is fatal to session startup.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The recorded stream could not be opened.
    #[error("failed to open recorded stream at {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    /// I/O error while reading the stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame was present but could not be decoded.
    #[error("failed to decode frame {index}: {reason}")]
    Decode { index: u64, reason: String },
}

/// A recorded dual-channel stream with coarse seek support.
///
/// Implementations are driven by a single thread; no method is required to
/// be re-entrant. `read_next` is the only potentially-blocking call and is
/// bounded by the caller-supplied timeout.
pub trait FrameSource {
    /// Read the next frame in sequence.
    ///
    /// `EndOfStream` is sticky and non-consuming: repeated reads at the end
    /// keep returning it without advancing the stream position.
    fn read_next(&mut self, timeout: Duration) -> Result<ReadOutcome, SourceError>;

    /// Reposition playback to the frame nearest `timestamp_us`.
    ///
    /// Timestamps past the end of the recording clamp to the end; the next
    /// read then reports `EndOfStream`. The landing position is approximate
    /// for recordings with non-uniform container timestamps.
    fn seek(&mut self, timestamp_us: u64) -> Result<(), SourceError>;

    /// Pause playback. Bracketing a seek with pause/resume matches the
    /// recorded-playback handle contract even for sources where it is a
    /// no-op.
    fn pause(&mut self);

    /// Resume playback after a pause.
    fn resume(&mut self);

    /// Nominal frame rate of the recording.
    fn fps(&self) -> f64;

    /// Discard one stale buffered frame without decoding it.
    ///
    /// Sources whose decoder keeps a backlog across seeks return `true`
    /// while stale frames remain. Sources with no backlog use the default.
    fn poll_discard(&mut self) -> Result<bool, SourceError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_format_bytes_per_pixel() {
        assert_eq!(PixelFormat::Rgb8.bytes_per_pixel(), 3);
        assert_eq!(PixelFormat::Bgr8.bytes_per_pixel(), 3);
        assert_eq!(PixelFormat::Rgba8.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::Bgra8.bytes_per_pixel(), 4);
    }

    #[test]
    fn test_source_error_display_open() {
        let err = SourceError::Open {
            path: PathBuf::from("/tmp/missing"),
            reason: "no frames found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing"));
        assert!(msg.contains("no frames found"));
    }

    #[test]
    fn test_source_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SourceError = io_err.into();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
