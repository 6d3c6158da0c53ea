//! Viewer configuration.
//!
//! `ViewerConfig` is the single configuration surface handed to
//! [`crate::session::ViewerSession`]; it bundles the display geometry, cache
//! bound, and the seek-reconciliation knobs so every component is configured
//! consistently.

use std::time::Duration;

use thiserror::Error;

/// Default width of each composite half in pixels.
pub const DEFAULT_DISPLAY_WIDTH: u32 = 640;

/// Default height of the composite in pixels.
pub const DEFAULT_DISPLAY_HEIGHT: u32 = 480;

/// Default ring cache capacity in frames.
///
/// 120 frames is four seconds of history at 30 fps, enough that ordinary
/// back-and-forth scrubbing almost never pays for a reseek.
pub const DEFAULT_CACHE_CAPACITY: usize = 120;

/// Default number of stale buffered frames drained after a seek.
pub const DEFAULT_FLUSH_LIMIT: u32 = 5;

/// Default bound on a single blocking fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Default depth ceiling for the false-color visualization, in millimeters.
pub const DEFAULT_MAX_DEPTH_MM: u16 = 16_000;

/// Configuration for a viewer session.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Width of each composite half in pixels.
    pub display_width: u32,
    /// Height of the composite in pixels.
    pub display_height: u32,
    /// Ring cache capacity in frames.
    pub cache_capacity: usize,
    /// Maximum stale buffered frames drained after a seek.
    pub flush_limit: u32,
    /// Bound on a single blocking fetch; a fetch that exceeds it is treated
    /// as stream exhaustion.
    pub fetch_timeout: Duration,
    /// Depth ceiling for the false-color visualization, in millimeters.
    pub max_depth_mm: u16,
    /// Frame index to skip to before the first displayed frame.
    pub start_index: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            display_width: DEFAULT_DISPLAY_WIDTH,
            display_height: DEFAULT_DISPLAY_HEIGHT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            flush_limit: DEFAULT_FLUSH_LIMIT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_depth_mm: DEFAULT_MAX_DEPTH_MM,
            start_index: 0,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The cache must hold at least the current frame.
    #[error("cache capacity must be at least 1")]
    ZeroCacheCapacity,

    /// Composite dimensions must be non-zero.
    #[error("display dimensions must be non-zero, got {width}x{height}")]
    ZeroDisplayDimension { width: u32, height: u32 },

    /// A zero depth ceiling would make every valid sample saturate.
    #[error("max depth must be non-zero")]
    ZeroMaxDepth,
}

impl ViewerConfig {
    /// Set the composite half size.
    pub fn with_display_size(mut self, width: u32, height: u32) -> Self {
        self.display_width = width;
        self.display_height = height;
        self
    }

    /// Set the ring cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the post-seek flush limit.
    pub fn with_flush_limit(mut self, limit: u32) -> Self {
        self.flush_limit = limit;
        self
    }

    /// Set the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the depth visualization ceiling.
    pub fn with_max_depth_mm(mut self, max_depth_mm: u16) -> Self {
        self.max_depth_mm = max_depth_mm;
        self
    }

    /// Set the start frame index.
    pub fn with_start_index(mut self, start_index: u64) -> Self {
        self.start_index = start_index;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::ZeroCacheCapacity);
        }
        if self.display_width == 0 || self.display_height == 0 {
            return Err(ConfigError::ZeroDisplayDimension {
                width: self.display_width,
                height: self.display_height,
            });
        }
        if self.max_depth_mm == 0 {
            return Err(ConfigError::ZeroMaxDepth);
        }
        Ok(())
    }
}
