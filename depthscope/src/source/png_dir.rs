//! Frame source backed by a directory of exported PNG frame pairs.
//!
//! Each frame is stored as `color_NNNNN.png` (8-bit RGB) plus
//! `depth_NNNNN.png` (16-bit grayscale, millimeters, 0 = invalid), the
//! layout produced by the capture project's bag-to-PNG export. Frames are
//! decoded lazily on read, so opening a large recording is cheap.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::filename::{parse_frame_filename, FrameChannel};
use super::{FrameSource, PixelFormat, RawFrame, ReadOutcome, SourceError};

/// Default nominal frame rate when the recording carries no rate metadata.
const DEFAULT_FPS: f64 = 30.0;

/// Reads exported frame pairs from a directory in index order.
///
/// The recording is the contiguous run of indices starting at 0 for which
/// both planes exist; trailing files with gaps before them are ignored.
pub struct PngDirSource {
    /// Per-frame (color, depth) file paths, indexed by frame index.
    frames: Vec<(PathBuf, PathBuf)>,
    position: u64,
    fps: f64,
    paused: bool,
}

impl PngDirSource {
    /// Open a recording directory.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Open`] if the directory cannot be listed or
    /// contains no complete frame pair at index 0. This is the one error
    /// that aborts session startup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = path.as_ref().to_path_buf();

        let entries = std::fs::read_dir(&dir).map_err(|e| SourceError::Open {
            path: dir.clone(),
            reason: e.to_string(),
        })?;

        let mut color_paths = HashMap::new();
        let mut depth_paths = HashMap::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Ok(parsed) = parse_frame_filename(name) {
                match parsed.channel {
                    FrameChannel::Color => color_paths.insert(parsed.index, entry.path()),
                    FrameChannel::Depth => depth_paths.insert(parsed.index, entry.path()),
                };
            }
        }

        // The recording ends at the first index missing either plane.
        let mut frames = Vec::new();
        loop {
            let index = frames.len() as u64;
            match (color_paths.remove(&index), depth_paths.remove(&index)) {
                (Some(color), Some(depth)) => frames.push((color, depth)),
                _ => break,
            }
        }

        if frames.is_empty() {
            return Err(SourceError::Open {
                path: dir,
                reason: "no complete color/depth frame pair at index 0".to_string(),
            });
        }

        tracing::info!(
            dir = %dir.display(),
            frames = frames.len(),
            "opened recorded stream"
        );

        Ok(Self {
            frames,
            position: 0,
            fps: DEFAULT_FPS,
            paused: false,
        })
    }

    /// Override the nominal frame rate used for timestamp seeks.
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Number of complete frames in the recording.
    pub fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    fn load(&self, index: u64) -> Result<RawFrame, SourceError> {
        let (color_path, depth_path) = &self.frames[index as usize];

        let color = image::open(color_path)
            .map_err(|e| SourceError::Decode {
                index,
                reason: format!("{}: {}", color_path.display(), e),
            })?
            .to_rgb8();
        let depth = image::open(depth_path)
            .map_err(|e| SourceError::Decode {
                index,
                reason: format!("{}: {}", depth_path.display(), e),
            })?
            .to_luma16();

        if color.dimensions() != depth.dimensions() {
            return Err(SourceError::Decode {
                index,
                reason: format!(
                    "plane resolution mismatch: color {}x{}, depth {}x{}",
                    color.width(),
                    color.height(),
                    depth.width(),
                    depth.height()
                ),
            });
        }

        let (width, height) = color.dimensions();
        Ok(RawFrame {
            width,
            height,
            pixel_format: PixelFormat::Rgb8,
            color: color.into_raw(),
            depth: depth.into_raw(),
        })
    }
}

impl FrameSource for PngDirSource {
    fn read_next(&mut self, _timeout: Duration) -> Result<ReadOutcome, SourceError> {
        if self.position >= self.frame_count() {
            return Ok(ReadOutcome::EndOfStream);
        }
        let frame = self.load(self.position)?;
        self.position += 1;
        Ok(ReadOutcome::Frame(frame))
    }

    fn seek(&mut self, timestamp_us: u64) -> Result<(), SourceError> {
        let index = (timestamp_us as f64 * self.fps / 1e6).round() as u64;
        // Past-end seeks clamp to the end; the next read reports EndOfStream.
        self.position = index.min(self.frame_count());
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn fps(&self) -> f64 {
        self.fps
    }
}
