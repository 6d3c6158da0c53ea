//! Deterministic in-memory frame source for tests.
//!
//! `ScriptedSource` holds its frames in memory and exposes the knobs the
//! navigator tests need: a seek landing bias (modeling non-uniform container
//! timestamps), a simulated decoder backlog that appears after each seek
//! (modeling stale buffered frames), and scripted timeouts. Counters record
//! every read, seek, and discard so tests can assert which path the
//! navigator actually took.

use std::time::Duration;

use super::{FrameSource, PixelFormat, RawFrame, ReadOutcome, SourceError};

/// In-memory scripted frame source.
pub struct ScriptedSource {
    frames: Vec<RawFrame>,
    position: u64,
    fps: f64,
    paused: bool,

    /// Stale frames still buffered from before the last seek.
    backlog: u64,
    /// Read position the backlog serves stale frames from.
    backlog_position: u64,
    /// Backlog size injected by every seek.
    backlog_on_seek: u64,
    /// Frames of error a seek lands off-target by.
    seek_bias: i64,
    /// Position at which reads report `Timeout` instead of a frame.
    timeout_at: Option<u64>,

    reads: u64,
    seeks: u64,
    discards: u64,
    pauses: u64,
    resumes: u64,
}

impl ScriptedSource {
    /// Create a source over the given frames.
    pub fn new(frames: Vec<RawFrame>) -> Self {
        Self {
            frames,
            position: 0,
            fps: 30.0,
            paused: false,
            backlog: 0,
            backlog_position: 0,
            backlog_on_seek: 0,
            seek_bias: 0,
            timeout_at: None,
            reads: 0,
            seeks: 0,
            discards: 0,
            pauses: 0,
            resumes: 0,
        }
    }

    /// Create a source of `count` synthetic frames.
    pub fn with_synthetic_frames(count: u64, width: u32, height: u32) -> Self {
        let frames = (0..count)
            .map(|i| synthetic_frame(i, width, height))
            .collect();
        Self::new(frames)
    }

    /// Make every seek land `bias` frames off the requested target.
    pub fn with_seek_bias(mut self, bias: i64) -> Self {
        self.seek_bias = bias;
        self
    }

    /// Make every seek leave `count` stale buffered frames behind.
    pub fn with_backlog_on_seek(mut self, count: u64) -> Self {
        self.backlog_on_seek = count;
        self
    }

    /// Report `Timeout` whenever a read is attempted at `position`.
    pub fn with_timeout_at(mut self, position: u64) -> Self {
        self.timeout_at = Some(position);
        self
    }

    /// Total sequential reads performed (including stale backlog reads).
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Total seeks performed.
    pub fn seeks(&self) -> u64 {
        self.seeks
    }

    /// Total stale frames discarded via `poll_discard`.
    pub fn discards(&self) -> u64 {
        self.discards
    }

    /// Total pause calls.
    pub fn pauses(&self) -> u64 {
        self.pauses
    }

    /// Total resume calls.
    pub fn resumes(&self) -> u64 {
        self.resumes
    }
}

impl FrameSource for ScriptedSource {
    fn read_next(&mut self, _timeout: Duration) -> Result<ReadOutcome, SourceError> {
        // An undrained backlog serves stale pre-seek frames first, exactly
        // like a hardware decoder whose queue survived the seek.
        if self.backlog > 0 {
            self.backlog -= 1;
            self.reads += 1;
            let index = self.backlog_position.min(self.frames.len().saturating_sub(1) as u64);
            self.backlog_position += 1;
            return Ok(ReadOutcome::Frame(self.frames[index as usize].clone()));
        }

        if self.timeout_at == Some(self.position) {
            return Ok(ReadOutcome::Timeout);
        }

        if self.position >= self.frames.len() as u64 {
            return Ok(ReadOutcome::EndOfStream);
        }

        let frame = self.frames[self.position as usize].clone();
        self.position += 1;
        self.reads += 1;
        Ok(ReadOutcome::Frame(frame))
    }

    fn seek(&mut self, timestamp_us: u64) -> Result<(), SourceError> {
        self.seeks += 1;
        let target = (timestamp_us as f64 * self.fps / 1e6).round() as i64 + self.seek_bias;
        let clamped = target.clamp(0, self.frames.len() as i64) as u64;
        self.backlog = self.backlog_on_seek;
        self.backlog_position = self.position;
        self.position = clamped;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
        self.pauses += 1;
    }

    fn resume(&mut self) {
        self.paused = false;
        self.resumes += 1;
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn poll_discard(&mut self) -> Result<bool, SourceError> {
        if self.backlog > 0 {
            self.backlog -= 1;
            self.backlog_position += 1;
            self.discards += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Build a synthetic frame whose content identifies its index.
///
/// The first depth sample is `index + 1` (never 0, so it always reads as a
/// valid measurement) and the color plane is a flat tint derived from the
/// index. Tests use the depth marker to verify index-exact navigation.
pub fn synthetic_frame(index: u64, width: u32, height: u32) -> RawFrame {
    let pixels = (width * height) as usize;
    let tint = (index % 251) as u8;
    let mut depth = vec![0u16; pixels];
    depth[0] = index as u16 + 1;
    RawFrame {
        width,
        height,
        pixel_format: PixelFormat::Rgb8,
        color: vec![tint; pixels * 3],
        depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_sequential_reads_in_order() {
        let mut source = ScriptedSource::with_synthetic_frames(3, 4, 4);
        for expected in 1..=3u16 {
            match source.read_next(TIMEOUT).unwrap() {
                ReadOutcome::Frame(frame) => assert_eq!(frame.depth[0], expected),
                other => panic!("expected frame, got {:?}", other),
            }
        }
        assert!(matches!(
            source.read_next(TIMEOUT).unwrap(),
            ReadOutcome::EndOfStream
        ));
        assert_eq!(source.reads(), 3);
    }

    #[test]
    fn test_seek_repositions() {
        let mut source = ScriptedSource::with_synthetic_frames(10, 4, 4);
        // 30 fps: frame 6 sits at 200_000 us.
        source.seek(200_000).unwrap();
        match source.read_next(TIMEOUT).unwrap() {
            ReadOutcome::Frame(frame) => assert_eq!(frame.depth[0], 7),
            other => panic!("expected frame, got {:?}", other),
        }
        assert_eq!(source.seeks(), 1);
    }

    #[test]
    fn test_seek_bias_lands_off_target() {
        let mut source = ScriptedSource::with_synthetic_frames(10, 4, 4).with_seek_bias(1);
        source.seek(200_000).unwrap();
        match source.read_next(TIMEOUT).unwrap() {
            ReadOutcome::Frame(frame) => assert_eq!(frame.depth[0], 8),
            other => panic!("expected frame, got {:?}", other),
        }
    }

    #[test]
    fn test_backlog_serves_stale_frames_until_drained() {
        let mut source = ScriptedSource::with_synthetic_frames(10, 4, 4).with_backlog_on_seek(2);
        for _ in 0..5 {
            source.read_next(TIMEOUT).unwrap();
        }
        source.seek(0).unwrap();

        // Undrained backlog yields stale frames from the pre-seek position.
        match source.read_next(TIMEOUT).unwrap() {
            ReadOutcome::Frame(frame) => assert_eq!(frame.depth[0], 6),
            other => panic!("expected frame, got {:?}", other),
        }

        // Draining clears the rest, then reads come from the seek target.
        assert!(source.poll_discard().unwrap());
        assert!(!source.poll_discard().unwrap());
        match source.read_next(TIMEOUT).unwrap() {
            ReadOutcome::Frame(frame) => assert_eq!(frame.depth[0], 1),
            other => panic!("expected frame, got {:?}", other),
        }
        assert_eq!(source.discards(), 1);
    }

    #[test]
    fn test_timeout_at_position() {
        let mut source = ScriptedSource::with_synthetic_frames(3, 4, 4).with_timeout_at(1);
        assert!(matches!(
            source.read_next(TIMEOUT).unwrap(),
            ReadOutcome::Frame(_)
        ));
        assert!(matches!(
            source.read_next(TIMEOUT).unwrap(),
            ReadOutcome::Timeout
        ));
        // Timeouts do not advance the position.
        assert!(matches!(
            source.read_next(TIMEOUT).unwrap(),
            ReadOutcome::Timeout
        ));
    }
}
