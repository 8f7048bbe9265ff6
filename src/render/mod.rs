//! # Preview Renderer
//!
//! Paints a [`LabelDocument`] into a grayscale raster at screen scale
//! (`PX_PER_MM × zoom`). Positions, wrapping and visibility follow the same
//! rules as the ZPL generator, so what is drawn is what prints.
//!
//! ## Paint Order
//!
//! ```text
//! paper → grid (optional) → content → selection outline + handle
//! ```
//!
//! Content is the four anchors in fixed order (standard mode) or the free
//! items by `zIndex` (free mode).
//!
//! ## Darkness
//!
//! `darknessPreview` only changes the ink luma:
//!
//! ```text
//! alpha = clamp(0.7 × darknessPreview, 0, 1)
//! ink   = round(255 × (1 − alpha))
//!
//! 1.0 → 77   1.8 → 0
//! ```
//!
//! It never touches geometry or the document.
//!
//! ## Barcodes
//!
//! A real EAN-13 symbol is drawn from the normalised value. A value that
//! would be left out of the ZPL is drawn as a crossed box instead.
//!
//! ## Size Limits
//!
//! Zoom is capped at [`MAX_ZOOM`] and the raster at [`MAX_PREVIEW_PIXELS`].
//! [`render`] scales a larger request down to fit; [`preview_issue`] reports
//! it so a server can refuse the request instead.

mod barcode;
mod canvas;
mod glyphs;

pub use barcode::{Symbol, encode as encode_barcode};
pub use canvas::{Canvas, GRID, OVERLAY, PAPER};

use image::{GrayImage, ImageEncoder};
use tracing::{debug, warn};

use crate::assets::{Assets, fit_within, is_image_reference};
use crate::error::{EtiketError, Result, ValidationIssue};
use crate::layout::{
    AnchorKey, EditMode, FreeItem, FreeItemKind, LabelDocument, MAX_LABEL_MM, RectMm, wrap_text,
};
use crate::units::mm_to_px;
use glyphs::GlyphCache;

/// Side of the square resize handle, in screen pixels.
pub const HANDLE_PX: f32 = 8.0;

/// Font height of the digits under a barcode.
pub const BARCODE_TEXT_MM: f32 = 2.5;

/// Largest zoom factor the renderer applies.
pub const MAX_ZOOM: f32 = 8.0;

/// Pixel budget for one preview raster (one byte per pixel).
pub const MAX_PREVIEW_PIXELS: u64 = 40_000_000;

/// View settings that are not part of the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub zoom: f32,
    /// Grid spacing; `None` hides the grid.
    pub grid_mm: Option<f32>,
    /// Outline plus resize handle around this box.
    pub selection: Option<RectMm>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            grid_mm: None,
            selection: None,
        }
    }
}

/// Ink luma for a preview darkness multiplier (already clamped).
pub fn ink_for_darkness(darkness: f32) -> u8 {
    let alpha = (0.7 * darkness).clamp(0.0, 1.0);
    (255.0 * (1.0 - alpha)).round() as u8
}

/// Screen-space box of the resize handle for an item's bounds.
pub fn handle_rect_px(bounds: RectMm, zoom: f32) -> (f32, f32, f32, f32) {
    let x = mm_to_px(bounds.right(), zoom) - HANDLE_PX / 2.0;
    let y = mm_to_px(bounds.bottom(), zoom) - HANDLE_PX / 2.0;
    (x, y, HANDLE_PX, HANDLE_PX)
}

/// Zoom actually applied for a requested zoom.
pub fn effective_zoom(zoom: f32) -> f32 {
    if zoom > 0.0 && zoom.is_finite() {
        zoom.min(MAX_ZOOM)
    } else {
        1.0
    }
}

/// Raster size in pixels for a document at `zoom`.
pub fn canvas_size(doc: &LabelDocument, zoom: f32) -> (u64, u64) {
    let side = |mm: f32| {
        let mm = if mm.is_nan() { 0.0 } else { mm.clamp(0.0, MAX_LABEL_MM) };
        mm_to_px(mm, zoom).ceil() as u64
    };
    (side(doc.label_width_mm), side(doc.label_height_mm))
}

/// Whether the preview at the requested zoom would exceed the pixel budget.
pub fn preview_issue(doc: &LabelDocument, zoom: f32) -> Option<ValidationIssue> {
    let (width, height) = canvas_size(doc, effective_zoom(zoom));
    (width.saturating_mul(height) > MAX_PREVIEW_PIXELS).then_some(ValidationIssue::PreviewTooLarge {
        width,
        height,
        max: MAX_PREVIEW_PIXELS,
    })
}

/// Paint the document.
pub fn render(doc: &LabelDocument, assets: &Assets, options: &RenderOptions) -> GrayImage {
    let mut zoom = effective_zoom(options.zoom);
    let (w, h) = canvas_size(doc, zoom);
    let pixels = w.saturating_mul(h);
    if pixels > MAX_PREVIEW_PIXELS {
        zoom *= (MAX_PREVIEW_PIXELS as f64 / pixels as f64).sqrt() as f32;
        warn!(requested = options.zoom, applied = zoom, "preview scaled down to the pixel limit");
    }
    let (darkness, _) = doc.resolved_darkness_preview();
    let (width, height) = canvas_size(doc, zoom);
    let (width, height) = (width as u32, height as u32);

    let mut painter = Painter {
        canvas: Canvas::new(width, height, ink_for_darkness(darkness)),
        glyphs: GlyphCache::new(),
        assets,
        zoom,
    };

    if let Some(grid) = options.grid_mm
        && grid > 0.0
    {
        painter.canvas.grid(mm_to_px(grid, zoom));
    }

    match doc.mode {
        EditMode::Standard => painter.standard(doc),
        EditMode::Free => {
            for item in doc.free_items_in_paint_order() {
                painter.free_item(doc, item);
            }
        }
    }

    if let Some(sel) = options.selection {
        painter.canvas.dashed_rect(
            mm_to_px(sel.x_mm, zoom),
            mm_to_px(sel.y_mm, zoom),
            mm_to_px(sel.width_mm, zoom),
            mm_to_px(sel.height_mm, zoom),
        );
        let (hx, hy, hw, hh) = handle_rect_px(sel, zoom);
        painter.canvas.overlay_rect(hx, hy, hw, hh);
    }

    debug!(width, height, zoom, "rendered preview");
    painter.canvas.into_image()
}

/// Paint and encode as PNG.
pub fn render_png(doc: &LabelDocument, assets: &Assets, options: &RenderOptions) -> Result<Vec<u8>> {
    to_png(&render(doc, assets, options))
}

/// Encode a grayscale raster as PNG.
pub fn to_png(img: &GrayImage) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::L8,
        )
        .map_err(|e| EtiketError::Image(e.to_string()))?;
    Ok(png_bytes)
}

struct Painter<'a> {
    canvas: Canvas,
    glyphs: GlyphCache,
    assets: &'a Assets,
    zoom: f32,
}

impl Painter<'_> {
    fn px(&self, mm: f32) -> f32 {
        mm_to_px(mm, self.zoom)
    }

    fn text_block(&mut self, x_mm: f32, y_mm: f32, font_mm: f32, gap_mm: f32, lines: &[String]) {
        let font_px = self.px(font_mm);
        for (i, line) in lines.iter().enumerate() {
            let y = self.px(y_mm + i as f32 * (font_mm + gap_mm));
            let x = self.px(x_mm);
            self.canvas.text(&mut self.glyphs, x, y, font_px, line);
        }
    }

    fn barcode(&mut self, rect: RectMm, value: &str) {
        let (x, y, w, h) = self.rect_px(rect);
        let Some(symbol) = barcode::encode(value) else {
            self.canvas.placeholder(x, y, w, h);
            return;
        };
        let module = w / symbol.modules.len() as f32;
        for (i, &bar) in symbol.modules.iter().enumerate() {
            if bar {
                let bx = x + i as f32 * module;
                self.canvas.fill_rect(bx, y, module.max(1.0), h);
            }
        }
        let font_px = self.px(BARCODE_TEXT_MM);
        let text_w = symbol.text.chars().count() as f32 * font_px * crate::layout::CHAR_WIDTH_FACTOR;
        let tx = x + ((w - text_w) / 2.0).max(0.0);
        self.canvas
            .text(&mut self.glyphs, tx, y + h + 1.0, font_px, &symbol.text);
    }

    fn image(&mut self, rect: RectMm, reference: &str) {
        let (x, y, w, h) = self.rect_px(rect);
        match self.assets.get(reference) {
            Some(source) => {
                // Parts past the canvas edge are clipped anyway
                let (max_w, max_h) = self.canvas.dimensions();
                let fit_w = (w.round().max(1.0) as u32).min(max_w);
                let fit_h = (h.round().max(1.0) as u32).min(max_h);
                let fitted = fit_within(source, fit_w, fit_h);
                self.canvas.blit(&fitted, x, y);
            }
            None => self.canvas.placeholder(x, y, w, h),
        }
    }

    fn rect_px(&self, rect: RectMm) -> (f32, f32, f32, f32) {
        (
            self.px(rect.x_mm),
            self.px(rect.y_mm),
            self.px(rect.width_mm),
            self.px(rect.height_mm),
        )
    }

    fn standard(&mut self, doc: &LabelDocument) {
        let styles = doc.styles;
        for key in AnchorKey::ORDER {
            if !doc.is_anchor_present(key) {
                continue;
            }
            let bounds = doc.anchor_bounds(key);
            match key {
                AnchorKey::Title => {
                    let logo = doc.field_values.logo.trim();
                    if logo.is_empty() {
                        continue;
                    }
                    if is_image_reference(logo) {
                        self.image(bounds, logo);
                    } else {
                        let lines = wrap_text(logo, styles.title.font_mm, None);
                        self.text_block(bounds.x_mm, bounds.y_mm, styles.title.font_mm, 0.0, &lines);
                    }
                }
                AnchorKey::ProductName => {
                    let style = styles.product_name;
                    let lines = doc.product_name_lines();
                    self.text_block(bounds.x_mm, bounds.y_mm, style.font_mm, style.line_gap_mm, &lines);
                }
                AnchorKey::Details => {
                    let style = styles.details;
                    let lines: Vec<String> =
                        doc.details_lines().into_iter().map(|(_, line)| line).collect();
                    self.text_block(bounds.x_mm, bounds.y_mm, style.font_mm, style.line_gap_mm, &lines);
                }
                AnchorKey::Barcode => {
                    let value = doc.field_values.barcode.trim();
                    if !value.is_empty() {
                        self.barcode(bounds, value);
                    }
                }
            }
        }
    }

    fn free_item(&mut self, doc: &LabelDocument, item: &FreeItem) {
        let bounds = item.bounds();
        match item.kind {
            FreeItemKind::Text => {
                let lines = item.lines();
                self.text_block(item.x_mm, item.y_mm, item.font_mm(), item.line_gap_mm(), &lines);
            }
            FreeItemKind::Barcode => {
                let value = doc.free_barcode_value(item);
                if !value.is_empty() {
                    self.barcode(bounds, value);
                }
            }
            FreeItemKind::Image => {
                let reference = item.src.as_deref().unwrap_or("").trim();
                self.image(bounds, reference);
            }
            FreeItemKind::Line => {
                let (x, y, w, h) = self.rect_px(bounds);
                self.canvas.fill_rect(x, y, w, h);
            }
            FreeItemKind::Circle => {
                let (x, y, w, h) = self.rect_px(bounds);
                self.canvas.ellipse(x, y, w, h, None);
            }
            FreeItemKind::Ring => {
                let (x, y, w, h) = self.rect_px(bounds);
                let stroke = self.px(item.stroke_mm());
                self.canvas.ellipse(x, y, w, h, Some(stroke));
            }
        }
    }
}
