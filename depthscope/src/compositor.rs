//! Decoder/compositor: raw sensor frames to display-ready composites.
//!
//! Normalizes the vendor color channel order to RGB, renders the depth plane
//! as a false-color visualization for human inspection, and emits a
//! fixed-resolution side-by-side composite (color half | depth half) together
//! with the scale factors that map display coordinates back to raw sensor
//! coordinates. The raw depth buffer is carried through untouched so later
//! queries measure what the sensor recorded, not what the display shows.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::config::ViewerConfig;
use crate::source::{PixelFormat, RawFrame};

/// Raw depth plane retained alongside the composite.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBuffer {
    data: Vec<u16>,
    width: u32,
    height: u32,
}

impl DepthBuffer {
    /// Wrap a row-major depth plane.
    pub fn new(data: Vec<u16>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), (width * height) as usize);
        Self {
            data,
            width,
            height,
        }
    }

    /// Depth at a raw sensor coordinate, or `None` out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[(y * self.width + x) as usize])
    }

    /// Width of the raw plane in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the raw plane in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// A decoded frame ready for display and querying.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Sequential index within the recording.
    pub index: u64,
    /// Side-by-side composite: color half on the left, depth visualization
    /// on the right, each `display_width` wide.
    pub composite: RgbImage,
    /// Raw depth plane at sensor resolution.
    pub depth: DepthBuffer,
    /// Display x per raw x (display_width / raw width).
    pub scale_x: f64,
    /// Display y per raw y (display_height / raw height).
    pub scale_y: f64,
}

impl DecodedFrame {
    /// Raw sensor width in pixels.
    pub fn raw_width(&self) -> u32 {
        self.depth.width()
    }

    /// Raw sensor height in pixels.
    pub fn raw_height(&self) -> u32 {
        self.depth.height()
    }
}

/// Turns raw frames into display composites.
pub struct Compositor {
    display_width: u32,
    display_height: u32,
    max_depth_mm: u16,
    logged_resolution: bool,
}

impl Compositor {
    /// Create a compositor from the session configuration.
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            display_width: config.display_width,
            display_height: config.display_height,
            max_depth_mm: config.max_depth_mm,
            logged_resolution: false,
        }
    }

    /// Width of one composite half.
    pub fn display_width(&self) -> u32 {
        self.display_width
    }

    /// Height of the composite.
    pub fn display_height(&self) -> u32 {
        self.display_height
    }

    /// Compose a raw frame into a display-ready decoded frame.
    pub fn compose(&mut self, index: u64, frame: RawFrame) -> DecodedFrame {
        if !self.logged_resolution {
            tracing::info!(
                width = frame.width,
                height = frame.height,
                format = ?frame.pixel_format,
                "stream resolution"
            );
            self.logged_resolution = true;
        }

        let color = normalize_color(&frame);
        let depth_vis = colorize_depth(&frame, self.max_depth_mm);

        let color_half = imageops::resize(
            &color,
            self.display_width,
            self.display_height,
            FilterType::Triangle,
        );
        // Nearest keeps invalid (black) samples from bleeding into neighbors.
        let depth_half = imageops::resize(
            &depth_vis,
            self.display_width,
            self.display_height,
            FilterType::Nearest,
        );

        let mut composite = RgbImage::new(self.display_width * 2, self.display_height);
        imageops::replace(&mut composite, &color_half, 0, 0);
        imageops::replace(&mut composite, &depth_half, self.display_width as i64, 0);

        let scale_x = self.display_width as f64 / frame.width as f64;
        let scale_y = self.display_height as f64 / frame.height as f64;

        let (width, height) = (frame.width, frame.height);
        DecodedFrame {
            index,
            composite,
            depth: DepthBuffer::new(frame.depth, width, height),
            scale_x,
            scale_y,
        }
    }
}

/// Reorder the color plane into RGB.
fn normalize_color(frame: &RawFrame) -> RgbImage {
    let bpp = frame.pixel_format.bytes_per_pixel();
    let mut out = RgbImage::new(frame.width, frame.height);
    for (i, pixel) in out.pixels_mut().enumerate() {
        let src = &frame.color[i * bpp..i * bpp + bpp];
        *pixel = match frame.pixel_format {
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => Rgb([src[0], src[1], src[2]]),
            PixelFormat::Bgr8 | PixelFormat::Bgra8 => Rgb([src[2], src[1], src[0]]),
        };
    }
    out
}

/// Render the depth plane as a false-color image.
///
/// Invalid samples (0) render black; valid samples map onto a blue-to-red
/// ramp that saturates at `max_depth_mm`.
fn colorize_depth(frame: &RawFrame, max_depth_mm: u16) -> RgbImage {
    let mut out = RgbImage::new(frame.width, frame.height);
    for (i, pixel) in out.pixels_mut().enumerate() {
        let d = frame.depth[i];
        *pixel = if d == 0 {
            Rgb([0, 0, 0])
        } else {
            depth_ramp(f64::from(d) / f64::from(max_depth_mm))
        };
    }
    out
}

/// Classic jet ramp: 0.0 is blue (near), 1.0 is red (far).
fn depth_ramp(t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let channel = |center: f64| ((1.5 - (4.0 * t - center).abs()).clamp(0.0, 1.0) * 255.0) as u8;
    Rgb([channel(3.0), channel(2.0), channel(1.0)])
}
