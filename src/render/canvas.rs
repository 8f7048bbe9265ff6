//! Grayscale raster with the drawing primitives the preview needs.
//!
//! Coordinates are pixels and may be negative or past the edge; anything
//! outside the image is clipped.

use image::{GrayImage, Luma};

use super::glyphs::{GLYPH_HEIGHT, GLYPH_WIDTH, GlyphCache};
use crate::layout::CHAR_WIDTH_FACTOR;

pub const PAPER: u8 = 255;
pub const GRID: u8 = 225;
pub const OVERLAY: u8 = 120;

pub struct Canvas {
    image: GrayImage,
    /// Luma used for label content.
    ink: u8,
}

impl Canvas {
    pub fn new(width: u32, height: u32, ink: u8) -> Self {
        Self {
            image: GrayImage::from_pixel(width.max(1), height.max(1), Luma([PAPER])),
            ink,
        }
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// `start..end` clipped to `0..limit`.
    fn clip(start: i64, end: i64, limit: u32) -> std::ops::Range<i64> {
        start.max(0)..end.min(limit as i64)
    }

    pub fn set(&mut self, x: i64, y: i64, luma: u8) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        self.image.put_pixel(x as u32, y as u32, Luma([luma]));
    }

    /// Content pixel.
    pub fn dot(&mut self, x: i64, y: i64) {
        let ink = self.ink;
        self.set(x, y, ink);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (x0, y0) = (x.round() as i64, y.round() as i64);
        let (w, h) = ((w.round() as i64).max(1), (h.round() as i64).max(1));
        let (width, height) = self.dimensions();
        for yy in Self::clip(y0, y0.saturating_add(h), height) {
            for xx in Self::clip(x0, x0.saturating_add(w), width) {
                self.dot(xx, yy);
            }
        }
    }

    /// Ellipse inscribed in the box. With `stroke`, only the band that wide
    /// inside the edge is filled.
    pub fn ellipse(&mut self, x: f32, y: f32, w: f32, h: f32, stroke: Option<f32>) {
        let (rx, ry) = (w / 2.0, h / 2.0);
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let (cx, cy) = (x + rx, y + ry);
        let inner = stroke.map(|s| {
            let s = s.clamp(1.0, rx.min(ry));
            ((rx - s).max(0.0), (ry - s).max(0.0))
        });

        let (width, height) = self.dimensions();
        for yy in Self::clip(y.floor() as i64, (y + h).ceil() as i64, height) {
            for xx in Self::clip(x.floor() as i64, (x + w).ceil() as i64, width) {
                let dx = xx as f32 + 0.5 - cx;
                let dy = yy as f32 + 0.5 - cy;
                if (dx / rx).powi(2) + (dy / ry).powi(2) > 1.0 {
                    continue;
                }
                if let Some((irx, iry)) = inner
                    && irx > 0.0
                    && iry > 0.0
                    && (dx / irx).powi(2) + (dy / iry).powi(2) < 1.0
                {
                    continue;
                }
                self.dot(xx, yy);
            }
        }
    }

    /// One line of text; each glyph cell is `font_px` tall and
    /// `0.6 × font_px` wide.
    pub fn text(&mut self, glyphs: &mut GlyphCache, x: f32, y: f32, font_px: f32, text: &str) {
        let cell_h = font_px.round().max(1.0) as usize;
        let advance = font_px * CHAR_WIDTH_FACTOR;
        let cell_w = advance.round().max(1.0) as usize;

        let (width, height) = self.dimensions();
        let gy = y.round() as i64;
        let rows = Self::clip(gy, gy.saturating_add(cell_h as i64), height);
        if rows.is_empty() {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            let gx = (x + i as f32 * advance).round() as i64;
            if gx >= width as i64 {
                break;
            }
            let cols = Self::clip(gx, gx.saturating_add(cell_w as i64), width);
            if cols.is_empty() {
                continue;
            }
            let glyph = glyphs.get(ch);
            for ty in (rows.start - gy) as usize..(rows.end - gy) as usize {
                let sy = ty * GLYPH_HEIGHT / cell_h;
                for tx in (cols.start - gx) as usize..(cols.end - gx) as usize {
                    let sx = tx * GLYPH_WIDTH / cell_w;
                    if glyph[sy * GLYPH_WIDTH + sx] {
                        self.dot(gx + tx as i64, gy + ty as i64);
                    }
                }
            }
        }
    }

    /// Draw a grayscale image at a position, thresholded the way the
    /// printer thresholds `^GFA` data.
    pub fn blit(&mut self, image: &GrayImage, x: f32, y: f32) {
        let (x0, y0) = (x.round() as i64, y.round() as i64);
        for (px, py, pixel) in image.enumerate_pixels() {
            if pixel.0[0] < crate::zpl::graphic::THRESHOLD {
                self.dot(x0 + px as i64, y0 + py as i64);
            }
        }
    }

    /// Box with an X through it.
    pub fn placeholder(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (x0, y0) = (x.round() as i64, y.round() as i64);
        let (w, h) = ((w.round() as i64).max(2), (h.round() as i64).max(2));
        for i in 0..w {
            self.dot(x0 + i, y0);
            self.dot(x0 + i, y0 + h - 1);
        }
        for i in 0..h {
            self.dot(x0, y0 + i);
            self.dot(x0 + w - 1, y0 + i);
        }
        let steps = w.max(h);
        for i in 0..steps {
            let dx = i * (w - 1) / steps;
            let dy = i * (h - 1) / steps;
            self.dot(x0 + dx, y0 + dy);
            self.dot(x0 + w - 1 - dx, y0 + dy);
        }
    }

    /// Dashed 1px outline in overlay gray.
    pub fn dashed_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (x0, y0) = (x.round() as i64, y.round() as i64);
        let (x1, y1) = ((x + w).round() as i64, (y + h).round() as i64);
        for xx in x0..=x1 {
            if (xx - x0) % 6 < 4 {
                self.set(xx, y0, OVERLAY);
                self.set(xx, y1, OVERLAY);
            }
        }
        for yy in y0..=y1 {
            if (yy - y0) % 6 < 4 {
                self.set(x0, yy, OVERLAY);
                self.set(x1, yy, OVERLAY);
            }
        }
    }

    pub fn overlay_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (x0, y0) = (x.round() as i64, y.round() as i64);
        let (width, height) = self.dimensions();
        for yy in Self::clip(y0, y0.saturating_add((h.round() as i64).max(1)), height) {
            for xx in Self::clip(x0, x0.saturating_add((w.round() as i64).max(1)), width) {
                self.set(xx, yy, OVERLAY);
            }
        }
    }

    /// Grid lines every `step` pixels.
    pub fn grid(&mut self, step: f32) {
        if step < 2.0 {
            return;
        }
        let (w, h) = self.image.dimensions();
        let mut x = step;
        while x < w as f32 {
            for y in 0..h {
                self.set(x.round() as i64, y as i64, GRID);
            }
            x += step;
        }
        let mut y = step;
        while y < h as f32 {
            for x in 0..w {
                self.set(x as i64, y.round() as i64, GRID);
            }
            y += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink_count(canvas: Canvas) -> usize {
        canvas
            .into_image()
            .pixels()
            .filter(|p| p.0[0] == 0)
            .count()
    }

    #[test]
    fn test_clipping() {
        let mut c = Canvas::new(4, 4, 0);
        c.fill_rect(-2.0, -2.0, 10.0, 10.0);
        assert_eq!(ink_count(c), 16);
    }

    #[test]
    fn test_huge_shapes_are_clipped() {
        let mut c = Canvas::new(8, 8, 0);
        c.fill_rect(-1e9, -1e9, 3e9, 3e9);
        c.ellipse(-1e9, -1e9, 3e9, 3e9, None);
        c.text(&mut GlyphCache::new(), -1e6, 0.0, 1e6, "WW");
        assert_eq!(ink_count(c), 64);
    }

    #[test]
    fn test_ring_has_hole() {
        let mut c = Canvas::new(40, 40, 0);
        c.ellipse(0.0, 0.0, 40.0, 40.0, Some(4.0));
        let img = c.into_image();
        assert_eq!(img.get_pixel(20, 20).0[0], PAPER);
        assert_eq!(img.get_pixel(20, 1).0[0], 0);
    }

    #[test]
    fn test_filled_ellipse() {
        let mut c = Canvas::new(40, 40, 0);
        c.ellipse(0.0, 0.0, 40.0, 40.0, None);
        let img = c.into_image();
        assert_eq!(img.get_pixel(20, 20).0[0], 0);
        assert_eq!(img.get_pixel(0, 0).0[0], PAPER);
    }

    #[test]
    fn test_text_draws_ink() {
        let mut c = Canvas::new(100, 30, 0);
        c.text(&mut GlyphCache::new(), 0.0, 0.0, 24.0, "Hi");
        assert!(ink_count(c) > 0);
    }
}
