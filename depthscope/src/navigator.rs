//! Frame navigation: stepping, cache reconciliation, and reseek recovery.
//!
//! The navigator owns the ring cache and a cursor (the authoritative current
//! frame index). It also tracks the read frontier, the highest index ever
//! fetched; the underlying stream position is always `frontier + 1`, because
//! sequential reads are the only thing that advances the stream and cached
//! back-steps never rewind it.
//!
//! That bookkeeping is what makes navigation index-exact:
//!
//! - Backward, cached: move the cursor down without touching the stream.
//!   Entries above the cursor stay in the ring so forward steps can replay
//!   them; a fresh read at that point would hand back the wrong frame, since
//!   the stream never rewound.
//! - Backward, uncached: pause, seek to the estimated timestamp of the
//!   target, resume, drain the decoder backlog, truncate the now-stale tail
//!   of the ring, and fetch fresh. The timestamp estimate can land one frame
//!   off on recordings with non-uniform container timestamps; that trade-off
//!   is accepted to avoid full linear rescans.
//! - Forward at the frontier: a fresh sequential read. Forward motion never
//!   seeks.

use crate::cache::FrameRing;
use crate::compositor::{Compositor, DecodedFrame};
use crate::config::ViewerConfig;
use crate::metrics::SessionMetrics;
use crate::source::{FrameSource, ReadOutcome, SourceError};

/// How a successful step obtained its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPath {
    /// Fresh sequential read at the frontier.
    FreshRead,
    /// Forward step replayed from cache after a cached back-step.
    CachedReplay,
    /// Backward step served from cache.
    CachedPrevious,
    /// Backward step recovered via seek + flush + fetch.
    Reseek,
}

/// Result of a navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved to `index`.
    Stepped { index: u64, path: StepPath },
    /// The stream had no frame (exhausted or timed out); position unchanged.
    Unavailable,
    /// Backward step at index 0; nothing to do.
    AtStart,
}

/// Errors raised while starting navigation.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    /// The stream ended before the requested start frame.
    #[error("stream exhausted while skipping to start frame {start}")]
    StartBeyondEnd { start: u64 },

    /// The source failed outright.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Drives forward/backward stepping over a frame source.
pub struct Navigator {
    ring: FrameRing,
    cursor: u64,
    frontier: u64,
    started: bool,
    /// Set when a failed reseek left the stream position unknown; the next
    /// fresh read reconciles with an explicit seek first.
    desynced: bool,
    flush_limit: u32,
    fetch_timeout: std::time::Duration,
}

impl Navigator {
    /// Create a navigator with an empty ring.
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            ring: FrameRing::new(config.cache_capacity),
            cursor: 0,
            frontier: 0,
            started: false,
            desynced: false,
            flush_limit: config.flush_limit,
            fetch_timeout: config.fetch_timeout,
        }
    }

    /// Skip to `start_index` and fetch the first frame.
    ///
    /// Unlike later stepping, inability to produce the first frame is fatal:
    /// there is nothing to display and nothing to recover to.
    pub fn start(
        &mut self,
        start_index: u64,
        source: &mut dyn FrameSource,
        compositor: &mut Compositor,
        metrics: &mut SessionMetrics,
    ) -> Result<(), StartError> {
        for _ in 0..start_index {
            match source.read_next(self.fetch_timeout)? {
                ReadOutcome::Frame(_) => {}
                ReadOutcome::EndOfStream | ReadOutcome::Timeout => {
                    return Err(StartError::StartBeyondEnd { start: start_index });
                }
            }
        }
        match source.read_next(self.fetch_timeout)? {
            ReadOutcome::Frame(raw) => {
                let decoded = compositor.compose(start_index, raw);
                self.ring.push(decoded);
                self.cursor = start_index;
                self.frontier = start_index;
                self.started = true;
                metrics.fresh_reads += 1;
                Ok(())
            }
            ReadOutcome::EndOfStream | ReadOutcome::Timeout => {
                Err(StartError::StartBeyondEnd { start: start_index })
            }
        }
    }

    /// Current frame index. Meaningful once started.
    pub fn current_index(&self) -> u64 {
        self.cursor
    }

    /// The current decoded frame, if navigation has started.
    pub fn current(&self) -> Option<&DecodedFrame> {
        if !self.started {
            return None;
        }
        self.ring.get(self.cursor)
    }

    /// The ring cache, for stats display.
    pub fn ring(&self) -> &FrameRing {
        &self.ring
    }

    /// Step forward one frame.
    pub fn step_forward(
        &mut self,
        source: &mut dyn FrameSource,
        compositor: &mut Compositor,
        metrics: &mut SessionMetrics,
    ) -> Result<StepOutcome, SourceError> {
        let next = self.cursor + 1;

        // Frames behind the frontier were stepped back over without a seek;
        // the stream is already past them, so the cache is the only correct
        // place to get them from.
        if next <= self.frontier && self.ring.get(next).is_some() {
            self.cursor = next;
            metrics.forward_replays += 1;
            return Ok(StepOutcome::Stepped {
                index: next,
                path: StepPath::CachedReplay,
            });
        }

        if next <= self.frontier {
            // Behind the frontier but evicted from cache. The push-only-at-
            // frontier discipline makes this unreachable, but recover with a
            // reseek rather than serving a mislabeled frame.
            tracing::warn!(index = next, "cached replay frame missing; reseeking");
            return self.reseek_to(next, source, compositor, metrics);
        }

        if self.desynced {
            // A failed reseek left the stream somewhere unknown; realign
            // before trusting a sequential read again.
            return self.reseek_to(next, source, compositor, metrics);
        }

        match self.fetch_fresh(next, source, compositor, metrics)? {
            true => {
                self.cursor = next;
                self.frontier = next;
                Ok(StepOutcome::Stepped {
                    index: next,
                    path: StepPath::FreshRead,
                })
            }
            false => Ok(StepOutcome::Unavailable),
        }
    }

    /// Step backward one frame.
    pub fn step_backward(
        &mut self,
        source: &mut dyn FrameSource,
        compositor: &mut Compositor,
        metrics: &mut SessionMetrics,
    ) -> Result<StepOutcome, SourceError> {
        if self.cursor == 0 {
            return Ok(StepOutcome::AtStart);
        }
        let target = self.cursor - 1;

        if self.ring.peek_previous(self.cursor).is_some() {
            self.cursor = target;
            metrics.backward_cache_hits += 1;
            return Ok(StepOutcome::Stepped {
                index: target,
                path: StepPath::CachedPrevious,
            });
        }

        self.reseek_to(target, source, compositor, metrics)
    }

    /// Recover `target` by seeking: pause, seek to the estimated timestamp,
    /// resume, drain the decoder backlog, truncate stale cache entries, and
    /// fetch fresh.
    fn reseek_to(
        &mut self,
        target: u64,
        source: &mut dyn FrameSource,
        compositor: &mut Compositor,
        metrics: &mut SessionMetrics,
    ) -> Result<StepOutcome, SourceError> {
        metrics.reseeks += 1;

        source.pause();
        let timestamp_us = (target as f64 * 1e6 / source.fps()) as u64;
        source.seek(timestamp_us)?;
        source.resume();

        let mut flushed = 0u32;
        while flushed < self.flush_limit && source.poll_discard()? {
            flushed += 1;
        }
        metrics.flushed_frames += u64::from(flushed);
        tracing::debug!(target, flushed, "seek reconciliation");

        match source.read_next(self.fetch_timeout)? {
            ReadOutcome::Frame(raw) => {
                // Entries above the target are stale relative to the new
                // stream position; drop them before adopting the fetch.
                self.ring.truncate_after(target);
                let decoded = compositor.compose(target, raw);
                self.ring.push(decoded);
                self.cursor = target;
                self.frontier = target;
                self.desynced = false;
                metrics.fresh_reads += 1;
                Ok(StepOutcome::Stepped {
                    index: target,
                    path: StepPath::Reseek,
                })
            }
            ReadOutcome::EndOfStream => {
                self.desynced = true;
                Ok(StepOutcome::Unavailable)
            }
            ReadOutcome::Timeout => {
                self.desynced = true;
                metrics.fetch_timeouts += 1;
                tracing::warn!(target, "fetch timed out during reseek");
                Ok(StepOutcome::Unavailable)
            }
        }
    }

    /// Sequential read at the frontier. Returns whether a frame was adopted.
    fn fetch_fresh(
        &mut self,
        index: u64,
        source: &mut dyn FrameSource,
        compositor: &mut Compositor,
        metrics: &mut SessionMetrics,
    ) -> Result<bool, SourceError> {
        match source.read_next(self.fetch_timeout)? {
            ReadOutcome::Frame(raw) => {
                let decoded = compositor.compose(index, raw);
                self.ring.push(decoded);
                metrics.fresh_reads += 1;
                Ok(true)
            }
            ReadOutcome::EndOfStream => Ok(false),
            ReadOutcome::Timeout => {
                metrics.fetch_timeouts += 1;
                tracing::warn!(index, "fetch timed out; treating as stream exhaustion");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptedSource;

    struct Fixture {
        source: ScriptedSource,
        compositor: Compositor,
        navigator: Navigator,
        metrics: SessionMetrics,
    }

    fn fixture(frames: u64, config: ViewerConfig) -> Fixture {
        let mut f = Fixture {
            source: ScriptedSource::with_synthetic_frames(frames, 4, 4),
            compositor: Compositor::new(&config),
            navigator: Navigator::new(&config),
            metrics: SessionMetrics::default(),
        };
        f.navigator
            .start(
                config.start_index,
                &mut f.source,
                &mut f.compositor,
                &mut f.metrics,
            )
            .unwrap();
        f
    }

    fn small_config() -> ViewerConfig {
        ViewerConfig::default().with_display_size(4, 4)
    }

    impl Fixture {
        fn forward(&mut self) -> StepOutcome {
            self.navigator
                .step_forward(&mut self.source, &mut self.compositor, &mut self.metrics)
                .unwrap()
        }

        fn backward(&mut self) -> StepOutcome {
            self.navigator
                .step_backward(&mut self.source, &mut self.compositor, &mut self.metrics)
                .unwrap()
        }

        fn marker(&self) -> u16 {
            self.navigator.current().unwrap().depth.get(0, 0).unwrap()
        }
    }

    #[test]
    fn test_start_fetches_first_frame() {
        let f = fixture(5, small_config());
        assert_eq!(f.navigator.current_index(), 0);
        assert_eq!(f.marker(), 1);
    }

    #[test]
    fn test_start_skips_to_start_index() {
        let f = fixture(10, small_config().with_start_index(3));
        assert_eq!(f.navigator.current_index(), 3);
        assert_eq!(f.marker(), 4);
    }

    #[test]
    fn test_start_beyond_end_is_fatal() {
        let config = small_config().with_start_index(9);
        let mut source = ScriptedSource::with_synthetic_frames(3, 4, 4);
        let mut compositor = Compositor::new(&config);
        let mut navigator = Navigator::new(&config);
        let mut metrics = SessionMetrics::default();
        let result = navigator.start(9, &mut source, &mut compositor, &mut metrics);
        assert!(matches!(result, Err(StartError::StartBeyondEnd { start: 9 })));
    }

    #[test]
    fn test_forward_reads_sequentially() {
        let mut f = fixture(4, small_config());
        for expected in 2..=4u16 {
            assert!(matches!(
                f.forward(),
                StepOutcome::Stepped {
                    path: StepPath::FreshRead,
                    ..
                }
            ));
            assert_eq!(f.marker(), expected);
        }
    }

    #[test]
    fn test_forward_at_end_is_repeatable_noop() {
        let mut f = fixture(2, small_config());
        f.forward();
        assert_eq!(f.forward(), StepOutcome::Unavailable);
        assert_eq!(f.forward(), StepOutcome::Unavailable);
        assert_eq!(f.navigator.current_index(), 1);
        assert_eq!(f.marker(), 2);
    }

    #[test]
    fn test_backward_at_start_is_noop() {
        let mut f = fixture(3, small_config());
        assert_eq!(f.backward(), StepOutcome::AtStart);
        assert_eq!(f.navigator.current_index(), 0);
    }

    #[test]
    fn test_backward_cache_hit_avoids_seek() {
        let mut f = fixture(5, small_config());
        f.forward();
        f.forward();
        let seeks_before = f.source.seeks();
        assert!(matches!(
            f.backward(),
            StepOutcome::Stepped {
                index: 1,
                path: StepPath::CachedPrevious,
            }
        ));
        assert_eq!(f.source.seeks(), seeks_before);
        assert_eq!(f.marker(), 2);
    }

    #[test]
    fn test_forward_after_cached_backward_replays_without_reseek() {
        let mut f = fixture(5, small_config());
        f.forward();
        f.forward();
        f.backward();
        let seeks_before = f.source.seeks();
        let reads_before = f.source.reads();

        assert!(matches!(
            f.forward(),
            StepOutcome::Stepped {
                index: 2,
                path: StepPath::CachedReplay,
            }
        ));
        assert_eq!(f.marker(), 3);
        assert_eq!(f.source.seeks(), seeks_before, "no reseek expected");
        assert_eq!(f.source.reads(), reads_before, "no read expected");
    }

    #[test]
    fn test_forward_past_frontier_resumes_fresh_reads() {
        let mut f = fixture(6, small_config());
        f.forward(); // 1
        f.forward(); // 2
        f.backward(); // 1 (cached)
        f.forward(); // 2 (replay)
        assert!(matches!(
            f.forward(),
            StepOutcome::Stepped {
                index: 3,
                path: StepPath::FreshRead,
            }
        ));
        assert_eq!(f.marker(), 4);
    }

    #[test]
    fn test_backward_miss_reseeks_and_truncates() {
        let config = small_config().with_cache_capacity(2);
        let mut f = fixture(10, config);
        for _ in 0..5 {
            f.forward();
        }
        // Ring holds [4, 5]; stepping back twice exhausts the cached window.
        assert!(matches!(
            f.backward(),
            StepOutcome::Stepped {
                index: 4,
                path: StepPath::CachedPrevious,
            }
        ));
        assert!(matches!(
            f.backward(),
            StepOutcome::Stepped {
                index: 3,
                path: StepPath::Reseek,
            }
        ));
        assert_eq!(f.marker(), 4);
        assert_eq!(f.source.seeks(), 1);
        assert_eq!(f.metrics.reseeks, 1);
        // The reseek reset the frontier; forward reads continue from there.
        assert!(matches!(
            f.forward(),
            StepOutcome::Stepped {
                index: 4,
                path: StepPath::FreshRead,
            }
        ));
        assert_eq!(f.marker(), 5);
    }

    #[test]
    fn test_reseek_drains_backlog_up_to_limit() {
        let config = small_config().with_cache_capacity(1).with_flush_limit(5);
        let mut f = Fixture {
            source: ScriptedSource::with_synthetic_frames(10, 4, 4).with_backlog_on_seek(3),
            compositor: Compositor::new(&config),
            navigator: Navigator::new(&config),
            metrics: SessionMetrics::default(),
        };
        f.navigator
            .start(0, &mut f.source, &mut f.compositor, &mut f.metrics)
            .unwrap();
        for _ in 0..4 {
            f.forward();
        }
        f.backward();
        assert_eq!(f.source.discards(), 3);
        assert_eq!(f.metrics.flushed_frames, 3);
        assert_eq!(f.marker(), 4);
    }

    #[test]
    fn test_timeout_treated_as_exhaustion() {
        let config = small_config();
        let mut f = Fixture {
            source: ScriptedSource::with_synthetic_frames(5, 4, 4).with_timeout_at(2),
            compositor: Compositor::new(&config),
            navigator: Navigator::new(&config),
            metrics: SessionMetrics::default(),
        };
        f.navigator
            .start(0, &mut f.source, &mut f.compositor, &mut f.metrics)
            .unwrap();
        f.forward(); // 1
        assert_eq!(f.forward(), StepOutcome::Unavailable);
        assert_eq!(f.navigator.current_index(), 1);
        assert_eq!(f.metrics.fetch_timeouts, 1);
    }

    #[test]
    fn test_seek_bias_accepted_one_frame_off() {
        let config = small_config().with_cache_capacity(1);
        let mut f = Fixture {
            source: ScriptedSource::with_synthetic_frames(10, 4, 4).with_seek_bias(1),
            compositor: Compositor::new(&config),
            navigator: Navigator::new(&config),
            metrics: SessionMetrics::default(),
        };
        f.navigator
            .start(0, &mut f.source, &mut f.compositor, &mut f.metrics)
            .unwrap();
        for _ in 0..4 {
            f.forward();
        }
        // Reseek lands one frame off; the step still completes at the target
        // index with the off-by-one content the recording's timestamps gave.
        assert!(matches!(
            f.backward(),
            StepOutcome::Stepped {
                index: 3,
                path: StepPath::Reseek,
            }
        ));
        assert_eq!(f.navigator.current_index(), 3);
        assert_eq!(f.marker(), 5);
    }

    #[test]
    fn test_pause_resume_bracket_every_seek() {
        let config = small_config().with_cache_capacity(1);
        let mut f = fixture(10, config);
        for _ in 0..3 {
            f.forward();
        }
        f.backward();
        assert_eq!(f.source.pauses(), 1);
        assert_eq!(f.source.resumes(), 1);
    }
}
