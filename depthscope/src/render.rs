//! Render sink abstraction and overlay shapes.
//!
//! The session hands each step's composite to a [`RenderSink`] together with
//! the overlay shapes describing the current selection. Overlay geometry is
//! in display space; how the sink presents it (terminal, window, PNG on
//! disk) is unconstrained.

use thiserror::Error;

use crate::compositor::DecodedFrame;

/// A shape to draw over the composite, in display coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayShape {
    /// Cross marker for a pending selection corner.
    Marker { x: u32, y: u32 },
    /// Outline of a committed selection rectangle.
    Rectangle {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    /// Text label, anchored at its top-left corner.
    Label { x: u32, y: u32, text: String },
}

/// Errors raised while presenting a frame.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The sink's backing output failed.
    #[error("render output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Receives one composite plus overlay shapes per step.
pub trait RenderSink {
    /// Present a decoded frame with its overlays.
    fn present(&mut self, frame: &DecodedFrame, overlays: &[OverlayShape]) -> Result<(), RenderError>;
}

/// Sink that records what was presented, for tests.
#[derive(Default)]
pub struct RecordingSink {
    presented: Vec<(u64, Vec<OverlayShape>)>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame indices and overlays presented so far, oldest first.
    pub fn presented(&self) -> &[(u64, Vec<OverlayShape>)] {
        &self.presented
    }

    /// The overlays of the most recent presentation.
    pub fn last_overlays(&self) -> Option<&[OverlayShape]> {
        self.presented.last().map(|(_, shapes)| shapes.as_slice())
    }
}

impl RenderSink for RecordingSink {
    fn present(&mut self, frame: &DecodedFrame, overlays: &[OverlayShape]) -> Result<(), RenderError> {
        self.presented.push((frame.index, overlays.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::DepthBuffer;

    use image::RgbImage;

    fn frame(index: u64) -> DecodedFrame {
        DecodedFrame {
            index,
            composite: RgbImage::new(2, 1),
            depth: DepthBuffer::new(vec![0], 1, 1),
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    #[test]
    fn test_recording_sink_captures_order() {
        let mut sink = RecordingSink::new();
        sink.present(&frame(0), &[]).unwrap();
        sink.present(&frame(1), &[OverlayShape::Marker { x: 3, y: 4 }])
            .unwrap();

        assert_eq!(sink.presented().len(), 2);
        assert_eq!(sink.presented()[0].0, 0);
        assert_eq!(
            sink.last_overlays(),
            Some(&[OverlayShape::Marker { x: 3, y: 4 }][..])
        );
    }
}
