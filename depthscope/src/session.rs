//! Viewer session: the explicit state object driving the event loop.
//!
//! `ViewerSession` bundles the frame source, compositor, navigator (ring
//! inside), query engine, and metrics into one owned value. The event loop
//! takes it by ownership and feeds it symbolic [`InputEvent`]s; fetch,
//! decode, and query update run strictly in sequence on the calling thread.
//! Nothing is global, so independent sessions coexist and tests construct
//! them directly.

use thiserror::Error;

use crate::compositor::{Compositor, DecodedFrame};
use crate::config::{ConfigError, ViewerConfig};
use crate::input::InputEvent;
use crate::metrics::SessionMetrics;
use crate::navigator::{Navigator, StartError, StepOutcome, StepPath};
use crate::query::{QueryEngine, QueryMode, QueryResponse, SelectionState};
use crate::render::{OverlayShape, RenderError, RenderSink};
use crate::source::{FrameSource, SourceError};

/// Errors that end a session.
///
/// Only startup is fatal; a running session folds stream exhaustion and
/// timeouts into [`SessionUpdate::Unavailable`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The first frame could not be produced.
    #[error("failed to start session: {0}")]
    Start(#[from] StartError),

    /// The source failed outright mid-session.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// What an input event did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// Navigation moved to `index`.
    Stepped { index: u64, path: StepPath },
    /// The stream had no frame in that direction; position unchanged.
    Unavailable,
    /// Backward step at index 0; nothing to do.
    AtStart,
    /// A click ran a query.
    Queried(QueryResponse),
    /// The user asked to quit.
    Quit,
}

/// Owns all state for one viewer session.
pub struct ViewerSession<S: FrameSource> {
    source: S,
    compositor: Compositor,
    navigator: Navigator,
    query: QueryEngine,
    metrics: SessionMetrics,
    last_response: Option<QueryResponse>,
}

impl<S: FrameSource> ViewerSession<S> {
    /// Open a session over `source`, fetching the first frame.
    ///
    /// Validates the configuration and skips to `config.start_index`.
    /// Failure here aborts session startup; there is nothing to display.
    pub fn open(source: S, mode: QueryMode, config: ViewerConfig) -> Result<Self, SessionError> {
        config.validate()?;

        let mut session = Self {
            source,
            compositor: Compositor::new(&config),
            navigator: Navigator::new(&config),
            query: QueryEngine::new(mode),
            metrics: SessionMetrics::default(),
            last_response: None,
        };
        session.navigator.start(
            config.start_index,
            &mut session.source,
            &mut session.compositor,
            &mut session.metrics,
        )?;
        tracing::info!(start = config.start_index, "session started");
        Ok(session)
    }

    /// Apply one input event.
    ///
    /// Navigation events clear the selection before stepping, so a committed
    /// rectangle never survives into the next rendered frame.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<SessionUpdate, SessionError> {
        match event {
            InputEvent::StepForward => {
                self.clear_selection();
                let outcome = self.navigator.step_forward(
                    &mut self.source,
                    &mut self.compositor,
                    &mut self.metrics,
                )?;
                Ok(Self::update_from(outcome))
            }
            InputEvent::StepBackward => {
                self.clear_selection();
                let outcome = self.navigator.step_backward(
                    &mut self.source,
                    &mut self.compositor,
                    &mut self.metrics,
                )?;
                Ok(Self::update_from(outcome))
            }
            InputEvent::PointerClick { x, y } => Ok(SessionUpdate::Queried(self.click(x, y))),
            InputEvent::Quit => Ok(SessionUpdate::Quit),
        }
    }

    fn update_from(outcome: StepOutcome) -> SessionUpdate {
        match outcome {
            StepOutcome::Stepped { index, path } => SessionUpdate::Stepped { index, path },
            StepOutcome::Unavailable => SessionUpdate::Unavailable,
            StepOutcome::AtStart => SessionUpdate::AtStart,
        }
    }

    fn clear_selection(&mut self) {
        self.query.reset();
        self.last_response = None;
    }

    fn click(&mut self, x: u32, y: u32) -> QueryResponse {
        let Some(frame) = self.navigator.current() else {
            self.metrics.rejected_clicks += 1;
            return QueryResponse::Rejected { x, y };
        };
        let response = self
            .query
            .click(frame, self.compositor.display_width(), x, y);
        match &response {
            QueryResponse::Rejected { x, y } => {
                self.metrics.rejected_clicks += 1;
                tracing::debug!(x, y, "click rejected: outside raw sensor bounds");
            }
            QueryResponse::RegionCommitted { rect, stats } => {
                self.metrics.committed_queries += 1;
                tracing::info!(
                    ?rect,
                    mean_mm = stats.mean_mm,
                    samples = stats.samples,
                    "region committed"
                );
            }
            QueryResponse::PointMeasured { raw, depth_mm, .. } => {
                tracing::info!(x = raw.x, y = raw.y, depth_mm, "point measured");
            }
            QueryResponse::EmptyRegion { rect } => {
                tracing::info!(?rect, "region had no valid samples");
            }
            QueryResponse::CornerPlaced { .. } => {}
        }
        self.last_response = Some(response.clone());
        response
    }

    /// Present the current frame and selection overlays to a sink.
    pub fn render_to(&self, sink: &mut dyn RenderSink) -> Result<(), RenderError> {
        if let Some(frame) = self.navigator.current() {
            sink.present(frame, &self.overlays())?;
        }
        Ok(())
    }

    /// Overlay shapes for the current selection, in display space.
    ///
    /// Selection coordinates live in raw sensor space; they are projected
    /// through the current frame's scale factors here, and every shape is
    /// mirrored onto the depth half of the composite.
    pub fn overlays(&self) -> Vec<OverlayShape> {
        let Some(frame) = self.navigator.current() else {
            return Vec::new();
        };
        let half_width = self.compositor.display_width();
        let mut shapes = Vec::new();

        if let Some(corner) = self.query.pending_corner() {
            let x = (f64::from(corner.x) * frame.scale_x).round() as u32;
            let y = (f64::from(corner.y) * frame.scale_y).round() as u32;
            shapes.push(OverlayShape::Marker { x, y });
            shapes.push(OverlayShape::Marker {
                x: x + half_width,
                y,
            });
        }

        if let Some((rect, stats)) = self.query.committed() {
            let x = (f64::from(rect.x_min) * frame.scale_x).round() as u32;
            let y = (f64::from(rect.y_min) * frame.scale_y).round() as u32;
            let width = ((f64::from(rect.x_max - rect.x_min) + 1.0) * frame.scale_x).round() as u32;
            let height =
                ((f64::from(rect.y_max - rect.y_min) + 1.0) * frame.scale_y).round() as u32;
            let text = format!("{:.1} mm (n={})", stats.mean_mm, stats.samples);
            for shift in [0, half_width] {
                shapes.push(OverlayShape::Rectangle {
                    x: x + shift,
                    y,
                    width,
                    height,
                });
                shapes.push(OverlayShape::Label {
                    x: x + shift,
                    y: y.saturating_sub(12),
                    text: text.clone(),
                });
            }
        }

        shapes
    }

    /// Current frame index.
    pub fn current_index(&self) -> u64 {
        self.navigator.current_index()
    }

    /// The current decoded frame.
    pub fn current_frame(&self) -> Option<&DecodedFrame> {
        self.navigator.current()
    }

    /// Current selection lifecycle state.
    pub fn selection_state(&self) -> SelectionState {
        self.query.state()
    }

    /// The most recent query response, cleared by navigation.
    pub fn last_response(&self) -> Option<&QueryResponse> {
        self.last_response.as_ref()
    }

    /// Current query mode.
    pub fn mode(&self) -> QueryMode {
        self.query.mode()
    }

    /// Switch query modes, resetting any selection.
    pub fn set_mode(&mut self, mode: QueryMode) {
        self.query.set_mode(mode);
        self.last_response = None;
    }

    /// Session metrics.
    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Cached frame count and capacity, for stats display.
    pub fn cache_usage(&self) -> (usize, usize) {
        let ring = self.navigator.ring();
        (ring.len(), ring.capacity())
    }

    /// Width of one composite half in pixels.
    pub fn display_width(&self) -> u32 {
        self.compositor.display_width()
    }

    /// Height of the composite in pixels.
    pub fn display_height(&self) -> u32 {
        self.compositor.display_height()
    }
}
