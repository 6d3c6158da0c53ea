//! Composite preview widget.
//!
//! Renders an RGB image into terminal cells using upper-half-block glyphs,
//! two image rows per cell row: the glyph's foreground carries the top
//! sample, the background the bottom one. Sampling is nearest-neighbor at
//! cell centers, so the pane can be any size.

use image::RgbImage;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::Widget,
};

/// Widget displaying an RGB composite in half-block cells.
pub struct PreviewWidget<'a> {
    image: &'a RgbImage,
}

impl<'a> PreviewWidget<'a> {
    pub fn new(image: &'a RgbImage) -> Self {
        Self { image }
    }

    fn sample(&self, virtual_x: u32, virtual_y: u32, virtual_w: u32, virtual_h: u32) -> Color {
        let (img_w, img_h) = self.image.dimensions();
        let x = ((virtual_x as u64 * img_w as u64) / virtual_w as u64) as u32;
        let y = ((virtual_y as u64 * img_h as u64) / virtual_h as u64) as u32;
        let pixel = self.image.get_pixel(x.min(img_w - 1), y.min(img_h - 1));
        Color::Rgb(pixel[0], pixel[1], pixel[2])
    }
}

impl Widget for PreviewWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.image.width() == 0 {
            return;
        }
        // Two vertical samples per cell row.
        let virtual_w = u32::from(area.width);
        let virtual_h = u32::from(area.height) * 2;

        for cy in 0..area.height {
            for cx in 0..area.width {
                let top = self.sample(u32::from(cx), u32::from(cy) * 2, virtual_w, virtual_h);
                let bottom =
                    self.sample(u32::from(cx), u32::from(cy) * 2 + 1, virtual_w, virtual_h);
                if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                    cell.set_symbol("▀").set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_renders_half_blocks_with_sampled_colors() {
        // Top row red, bottom row blue.
        let mut image = RgbImage::new(2, 2);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        image.put_pixel(1, 0, Rgb([255, 0, 0]));
        image.put_pixel(0, 1, Rgb([0, 0, 255]));
        image.put_pixel(1, 1, Rgb([0, 0, 255]));

        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        PreviewWidget::new(&image).render(area, &mut buf);

        let cell = buf.cell((0, 0)).unwrap();
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn test_zero_area_is_noop() {
        let image = RgbImage::new(4, 4);
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 4));
        PreviewWidget::new(&image).render(area, &mut buf);
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), " ");
    }
}
