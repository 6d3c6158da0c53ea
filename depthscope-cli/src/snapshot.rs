//! PNG snapshot render sink.
//!
//! Burns the selection overlays into a copy of the composite and writes it
//! as `snapshot_NNNNN.png`. Labels are not rasterized - the committed value
//! is in the HUD and the probe output - so only markers and rectangles are
//! drawn.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use depthscope::render::RenderError;
use depthscope::{DecodedFrame, OverlayShape, RenderSink};

const OVERLAY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const MARKER_ARM: u32 = 5;

/// Render sink that writes annotated composites to a directory.
pub struct PngSnapshotSink {
    dir: PathBuf,
    written: u64,
    last_path: Option<PathBuf>,
}

impl PngSnapshotSink {
    /// Write snapshots into `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: 0,
            last_path: None,
        })
    }

    /// Snapshots written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path of the most recent snapshot.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

impl RenderSink for PngSnapshotSink {
    fn present(&mut self, frame: &DecodedFrame, overlays: &[OverlayShape]) -> Result<(), RenderError> {
        let annotated = rasterize(&frame.composite, overlays);
        let path = self.dir.join(format!("snapshot_{:05}.png", frame.index));
        annotated
            .save(&path)
            .map_err(|e| RenderError::Io(std::io::Error::other(e.to_string())))?;
        self.written += 1;
        tracing::info!(path = %path.display(), "snapshot written");
        self.last_path = Some(path);
        Ok(())
    }
}

/// Draw overlays onto a copy of the composite.
pub fn rasterize(composite: &RgbImage, overlays: &[OverlayShape]) -> RgbImage {
    let mut out = composite.clone();
    for shape in overlays {
        match shape {
            OverlayShape::Marker { x, y } => draw_marker(&mut out, *x, *y),
            OverlayShape::Rectangle {
                x,
                y,
                width,
                height,
            } => draw_rect(&mut out, *x, *y, *width, *height),
            OverlayShape::Label { .. } => {}
        }
    }
    out
}

fn put(image: &mut RgbImage, x: u32, y: u32) {
    if x < image.width() && y < image.height() {
        image.put_pixel(x, y, OVERLAY_COLOR);
    }
}

fn draw_marker(image: &mut RgbImage, x: u32, y: u32) {
    for d in 0..=MARKER_ARM {
        put(image, x + d, y);
        put(image, x.saturating_sub(d), y);
        put(image, x, y + d);
        put(image, x, y.saturating_sub(d));
    }
}

fn draw_rect(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32) {
    if width == 0 || height == 0 {
        return;
    }
    let right = x + width - 1;
    let bottom = y + height - 1;
    for cx in x..=right {
        put(image, cx, y);
        put(image, cx, bottom);
    }
    for cy in y..=bottom {
        put(image, x, cy);
        put(image, right, cy);
    }
}
