//! Depthscope - frame-accurate review of recorded color+depth sensor streams
//!
//! This library provides the core of the interactive viewer: a frame source
//! abstraction over recorded dual-channel (color + depth) streams, a
//! decoder/compositor producing display-ready side-by-side composites, a
//! bounded ring cache of decoded frames, a navigator that reconciles
//! forward/backward stepping against cache contents and coarse timestamp
//! seeks, and a click-driven spatial query engine for point and
//! rectangle-average depth measurements.
//!
//! # Architecture
//!
//! ```text
//! InputEvent ──► ViewerSession ──► Navigator ──► FrameRing (hit)
//!                     │                │            │ miss
//!                     │                │         FrameSource (read / seek+flush)
//!                     │                └──► Compositor ──► DecodedFrame
//!                     ├──► QueryEngine (selection state, depth statistics)
//!                     └──► RenderSink (composite + overlay shapes)
//! ```
//!
//! All state lives in the [`session::ViewerSession`] object, which is passed
//! by ownership into the event loop. There is no ambient global state, so
//! multiple independent sessions can coexist and tests construct sessions
//! directly.

pub mod cache;
pub mod compositor;
pub mod config;
pub mod input;
pub mod metrics;
pub mod navigator;
pub mod query;
pub mod render;
pub mod session;
pub mod source;

pub use cache::FrameRing;
pub use compositor::{Compositor, DecodedFrame, DepthBuffer};
pub use config::ViewerConfig;
pub use input::InputEvent;
pub use metrics::SessionMetrics;
pub use navigator::{Navigator, StepOutcome, StepPath};
pub use query::{QueryEngine, QueryMode, QueryResponse, RegionStats, SelectionState};
pub use render::{OverlayShape, RenderSink};
pub use session::{SessionError, SessionUpdate, ViewerSession};
pub use source::{FrameSource, PixelFormat, RawFrame, ReadOutcome, SourceError};

/// Library version, sourced from the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
