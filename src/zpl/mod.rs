//! # ZPL Generator
//!
//! Turns a [`LabelDocument`] into a ZPL II command stream for Zebra printers.
//!
//! ## Output Layout
//!
//! ```text
//! ^XA                       start of format
//! ^CI28                     UTF-8 field data
//! ^PW{w}  ^LL{h}  ^LH0,0    label size in dots, home at origin
//! ^MD{darkness}             0..=30
//! ^FO..^A0N..^FD..^FS       one line per text line
//! ^FO..^BY..^BEN..^FD..^FS  EAN-13
//! ^FO..^GB/^GE/^GFA..^FS    shapes and images (free mode)
//! ^PQ{n}                    only when more than one copy
//! ^XZ                       end of format
//! ```
//!
//! Commands are separated by `\n`; the stream ends with `^XZ` and no newline.
//!
//! ## Field Order
//!
//! Standard mode walks the anchors in a fixed order: title/logo, product
//! name, details (amount, serial, batch, invoice, entry date, expiry date,
//! supplier), barcode. Free mode walks free items by `zIndex`.
//!
//! ## Determinism
//!
//! The output depends only on the document and the assets. The same input
//! always yields byte-identical ZPL; nothing here reads the clock or
//! iterates a hash map.
//!
//! ## Validation
//!
//! Content problems never abort generation. A malformed barcode or a missing
//! image is left out, reserved characters are escaped, darkness and DPI are
//! clamped, and each case is reported in [`ZplOutput::issues`].

pub mod commands;
pub mod ean13;
pub mod escape;
pub mod graphic;

use serde::Serialize;
use tracing::debug;

use crate::assets::{Assets, is_image_reference};
use crate::error::ValidationIssue;
use crate::layout::{AnchorKey, EditMode, FreeItem, FreeItemKind, LabelDocument, wrap_text};
use crate::units::{Dpi, mm_to_dots};

/// Modules in an EAN-13 symbol, quiet zones excluded.
pub const EAN13_MODULES: u32 = 95;

/// Generated ZPL plus everything that was corrected or left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZplOutput {
    pub zpl: String,
    pub issues: Vec<ValidationIssue>,
}

impl ZplOutput {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Generate ZPL for a document.
///
/// ```
/// use etiket::{assets::Assets, layout::LabelDocument, zpl};
///
/// let mut doc = LabelDocument::default();
/// doc.field_values.product_name = "Vida".into();
/// let out = zpl::generate(&doc, &Assets::new());
/// assert!(out.zpl.starts_with("^XA"));
/// assert!(out.zpl.ends_with("^XZ"));
/// ```
pub fn generate(doc: &LabelDocument, assets: &Assets) -> ZplOutput {
    let (dpi, _) = doc.resolved_dpi();
    let (darkness, _) = doc.resolved_zpl_darkness();

    let mut emitter = Emitter {
        dpi,
        commands: Vec::new(),
        issues: doc.settings_issues(),
    };

    emitter.push(commands::start_format());
    emitter.push(commands::utf8_encoding());
    let width = emitter.dots(doc.label_width_mm);
    let height = emitter.dots(doc.label_height_mm);
    emitter.push(commands::print_width(width));
    emitter.push(commands::label_length(height));
    emitter.push(commands::label_home(0, 0));
    emitter.push(commands::media_darkness(darkness));

    match doc.mode {
        EditMode::Standard => emit_standard(&mut emitter, doc, assets),
        EditMode::Free => {
            for item in doc.free_items_in_paint_order() {
                emit_free_item(&mut emitter, doc, item, assets);
            }
        }
    }

    if doc.copies > 1 {
        emitter.push(commands::print_quantity(doc.copies));
    }
    emitter.push(commands::end_format());

    debug!(
        commands = emitter.commands.len(),
        issues = emitter.issues.len(),
        dpi = dpi.value(),
        "generated ZPL"
    );

    ZplOutput {
        zpl: emitter.commands.join("\n"),
        issues: emitter.issues,
    }
}

/// Collects command lines and issues while walking a document.
struct Emitter {
    dpi: Dpi,
    commands: Vec<String>,
    issues: Vec<ValidationIssue>,
}

impl Emitter {
    fn push(&mut self, command: impl Into<String>) {
        self.commands.push(command.into());
    }

    /// Millimeters to dots, negative results clamped to 0.
    fn dots(&self, mm: f32) -> u32 {
        mm_to_dots(mm, self.dpi).max(0) as u32
    }

    /// One `^FD` per line, stacked `font + gap` apart.
    fn text_block(
        &mut self,
        field: &str,
        x_mm: f32,
        y_mm: f32,
        font_mm: f32,
        line_gap_mm: f32,
        lines: &[String],
    ) {
        if lines.iter().any(|l| escape::needs_escape(l)) {
            self.issues.push(ValidationIssue::ReservedCharacters {
                field: field.to_string(),
            });
        }
        let font = self.dots(font_mm);
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let y = y_mm + i as f32 * (font_mm + line_gap_mm);
            let command = format!(
                "{}{}{}",
                commands::field_origin(self.dots(x_mm), self.dots(y)),
                commands::font(font, font),
                commands::field_data(line)
            );
            self.push(command);
        }
    }

    /// EAN-13 field. Invalid values are reported and left out.
    fn barcode(&mut self, x_mm: f32, y_mm: f32, width_mm: f32, height_mm: f32, value: &str) {
        let code = match ean13::normalize(value) {
            Ok(code) => code,
            Err(issue) => {
                self.issues.push(issue);
                return;
            }
        };
        self.issues.extend(code.issue.clone());

        let module = (self.dots(width_mm) as f32 / EAN13_MODULES as f32).round() as u32;
        let command = format!(
            "{}{}{}{}",
            commands::field_origin(self.dots(x_mm), self.dots(y_mm)),
            commands::barcode_defaults(module),
            commands::ean13(self.dots(height_mm)),
            commands::field_data(&code.value)
        );
        self.push(command);
    }

    /// `^GFA` image fitted into the box, or a missing-image issue.
    fn image(
        &mut self,
        reference: &str,
        x_mm: f32,
        y_mm: f32,
        width_mm: f32,
        height_mm: f32,
        assets: &Assets,
    ) {
        let Some(source) = assets.get(reference) else {
            self.issues.push(ValidationIssue::MissingImage {
                reference: reference.to_string(),
            });
            return;
        };
        let (width, height) = (self.dots(width_mm), self.dots(height_mm));
        if width as u64 * height as u64 > graphic::MAX_GRAPHIC_DOTS {
            self.issues.push(ValidationIssue::GraphicTooLarge {
                reference: reference.to_string(),
                width,
                height,
                max: graphic::MAX_GRAPHIC_DOTS,
            });
            return;
        }
        let bitmap = graphic::to_bitmap(source, width, height);
        let command = format!(
            "{}{}",
            commands::field_origin(self.dots(x_mm), self.dots(y_mm)),
            commands::graphic_field(bitmap.bytes_per_row, &bitmap.data)
        );
        self.push(command);
    }
}

fn emit_standard(emitter: &mut Emitter, doc: &LabelDocument, assets: &Assets) {
    let anchors = doc.anchors();
    let styles = &doc.styles;

    for key in AnchorKey::ORDER {
        if !doc.is_anchor_present(key) {
            continue;
        }
        let at = anchors.get(key);
        match key {
            AnchorKey::Title => {
                let logo = doc.field_values.logo.trim();
                if logo.is_empty() {
                    continue;
                }
                if is_image_reference(logo) {
                    emitter.image(
                        logo,
                        at.x_mm,
                        at.y_mm,
                        styles.title.width_mm,
                        styles.title.font_mm,
                        assets,
                    );
                } else {
                    let lines = wrap_text(logo, styles.title.font_mm, None);
                    emitter.text_block(
                        "Logo",
                        at.x_mm,
                        at.y_mm,
                        styles.title.font_mm,
                        0.0,
                        &lines,
                    );
                }
            }
            AnchorKey::ProductName => {
                let lines = doc.product_name_lines();
                let style = &styles.product_name;
                emitter.text_block(
                    "ProductName",
                    at.x_mm,
                    at.y_mm,
                    style.font_mm,
                    style.line_gap_mm,
                    &lines,
                );
            }
            AnchorKey::Details => {
                let style = &styles.details;
                for (i, (field, line)) in doc.details_lines().into_iter().enumerate() {
                    let y = at.y_mm + i as f32 * (style.font_mm + style.line_gap_mm);
                    emitter.text_block(
                        &format!("{:?}", field),
                        at.x_mm,
                        y,
                        style.font_mm,
                        0.0,
                        &[line],
                    );
                }
            }
            AnchorKey::Barcode => {
                let value = doc.field_values.barcode.trim();
                if value.is_empty() {
                    continue;
                }
                emitter.barcode(
                    at.x_mm,
                    at.y_mm,
                    styles.barcode.width_mm,
                    styles.barcode.height_mm,
                    value,
                );
            }
        }
    }
}

fn emit_free_item(emitter: &mut Emitter, doc: &LabelDocument, item: &FreeItem, assets: &Assets) {
    let (x, y) = (item.x_mm, item.y_mm);
    let (w, h) = (item.width_mm(), item.height_mm());

    match item.kind {
        FreeItemKind::Text => {
            let lines = item.lines();
            emitter.text_block(&item.id, x, y, item.font_mm(), item.line_gap_mm(), &lines);
        }
        FreeItemKind::Barcode => {
            let value = doc.free_barcode_value(item);
            if !value.is_empty() {
                emitter.barcode(x, y, w, h, value);
            }
        }
        FreeItemKind::Image => {
            let reference = item.src.as_deref().unwrap_or("").trim();
            if !reference.is_empty() {
                emitter.image(reference, x, y, w, h, assets);
            }
        }
        FreeItemKind::Line => {
            let (wd, hd) = (emitter.dots(w).max(1), emitter.dots(h).max(1));
            let command = format!(
                "{}{}",
                commands::field_origin(emitter.dots(x), emitter.dots(y)),
                commands::graphic_box(wd, hd, wd.min(hd))
            );
            emitter.push(command);
        }
        FreeItemKind::Circle | FreeItemKind::Ring => {
            let (wd, hd) = (emitter.dots(w).max(1), emitter.dots(h).max(1));
            let solid = wd.min(hd).div_ceil(2);
            let thickness = if item.kind == FreeItemKind::Circle {
                solid
            } else {
                emitter.dots(item.stroke_mm()).clamp(1, solid.max(1))
            };
            let command = format!(
                "{}{}",
                commands::field_origin(emitter.dots(x), emitter.dots(y)),
                commands::graphic_ellipse(wd, hd, thickness)
            );
            emitter.push(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FieldKey, FieldRule, PointMm};
    use image::{GrayImage, Luma};

    fn doc() -> LabelDocument {
        let mut doc = LabelDocument::default();
        doc.field_values.product_name = "Vida".into();
        doc.field_values.barcode = "400638133393".into();
        doc
    }

    #[test]
    fn test_frame_and_setup() {
        let out = generate(&LabelDocument::default(), &Assets::new());
        let lines: Vec<&str> = out.zpl.lines().collect();
        assert_eq!(
            lines,
            vec!["^XA", "^CI28", "^PW799", "^LL559", "^LH0,0", "^MD15", "^XZ"]
        );
        assert!(out.is_clean());
    }

    #[test]
    fn test_standard_field_order() {
        let mut d = doc();
        d.field_values.logo = "ACME".into();
        d.field_values.amount = "3".into();
        let out = generate(&d, &Assets::new());
        let acme = out.zpl.find("^FDACME").unwrap();
        let vida = out.zpl.find("^FDVida").unwrap();
        let amount = out.zpl.find("^FDMiktar: 3").unwrap();
        let barcode = out.zpl.find("^BEN").unwrap();
        assert!(acme < vida && vida < amount && amount < barcode);
    }

    #[test]
    fn test_barcode_block() {
        let out = generate(&doc(), &Assets::new());
        // barcode anchor (4, 52) → (32, 416); 40mm → 320 dots → module 3; 12mm → 96
        assert!(
            out.zpl
                .contains("^FO32,416^BY3^BEN,96,Y,N^FD4006381333931^FS")
        );
    }

    #[test]
    fn test_invalid_barcode_omitted_rest_kept() {
        let mut d = doc();
        d.field_values.barcode = "12-34".into();
        let out = generate(&d, &Assets::new());
        assert!(!out.zpl.contains("^BEN"));
        assert!(out.zpl.contains("^FDVida^FS"));
        assert!(matches!(
            out.issues.as_slice(),
            [ValidationIssue::BarcodeNotNumeric { .. }]
        ));
    }

    #[test]
    fn test_checksum_mismatch_still_printed() {
        let mut d = doc();
        d.field_values.barcode = "4006381333939".into();
        let out = generate(&d, &Assets::new());
        assert!(out.zpl.contains("^FD4006381333939^FS"));
        assert_eq!(out.issues.len(), 1);
    }

    #[test]
    fn test_hidden_barcode_not_emitted() {
        let mut d = doc();
        *d.visible_fields.get_mut(FieldKey::Barcode) = FieldRule::HIDDEN;
        let out = generate(&d, &Assets::new());
        assert!(!out.zpl.contains("^BEN"));
        assert!(!out.zpl.contains("^BY"));
    }

    #[test]
    fn test_wrapped_product_name_lines() {
        let mut d = doc();
        d.styles.product_name.font_mm = 5.0;
        d.styles.product_name.wrap_width_mm = 30.0;
        d.styles.product_name.line_gap_mm = 1.0;
        d.field_values.product_name = "aaa bbb ccc ddd".into();
        d.set_anchor(AnchorKey::ProductName, PointMm::new(0.0, 10.0));
        let out = generate(&d, &Assets::new());
        // 10mm → 80, 16mm → 128, font 5mm → 40
        assert!(out.zpl.contains("^FO0,80^A0N,40,40^FDaaa bbb^FS"));
        assert!(out.zpl.contains("^FO0,128^A0N,40,40^FDccc ddd^FS"));
    }

    #[test]
    fn test_reserved_characters_escaped_and_reported() {
        let mut d = doc();
        d.field_values.product_name = "50^XZ".into();
        let out = generate(&d, &Assets::new());
        assert!(out.zpl.contains("^FH\\^FD50\\5EXZ^FS"));
        assert_eq!(out.zpl.matches("^XZ").count(), 1);
        assert!(out.issues.contains(&ValidationIssue::ReservedCharacters {
            field: "ProductName".into()
        }));
    }

    #[test]
    fn test_darkness_clamped() {
        let mut d = doc();
        d.zpl_darkness = -4;
        let out = generate(&d, &Assets::new());
        assert!(out.zpl.contains("\n^MD0\n"));
        assert!(matches!(
            out.issues[0],
            ValidationIssue::DarknessClamped { applied: 0, .. }
        ));
    }

    #[test]
    fn test_copies() {
        let mut d = doc();
        d.copies = 3;
        assert!(generate(&d, &Assets::new()).zpl.ends_with("^PQ3\n^XZ"));
    }

    #[test]
    fn test_logo_image_from_assets() {
        let mut d = doc();
        d.field_values.logo = "logo.png".into();
        let missing = generate(&d, &Assets::new());
        assert!(missing.issues.contains(&ValidationIssue::MissingImage {
            reference: "logo.png".into()
        }));
        assert!(!missing.zpl.contains("^GFA"));

        let mut assets = Assets::new();
        assets.insert("logo.png", GrayImage::from_pixel(16, 16, Luma([0])));
        let out = generate(&d, &assets);
        assert!(out.zpl.contains("^FO32,24^GFA,"));
    }

    #[test]
    fn test_oversize_image_skipped() {
        let mut d = LabelDocument {
            mode: EditMode::Free,
            ..Default::default()
        };
        let mut item = FreeItem::new(FreeItemKind::Image, 0.0, 0.0);
        item.src = Some("big.png".into());
        item.width_mm = Some(1e6);
        item.height_mm = Some(1e6);
        d.add_free_item(item);

        let mut assets = Assets::new();
        assets.insert("big.png", GrayImage::from_pixel(4, 4, Luma([0])));
        let out = generate(&d, &assets);
        assert!(!out.zpl.contains("^GFA"));
        assert!(
            out.issues
                .iter()
                .any(|i| matches!(i, ValidationIssue::GraphicTooLarge { reference, .. } if reference == "big.png"))
        );
    }

    #[test]
    fn test_free_shapes() {
        let mut d = LabelDocument {
            mode: EditMode::Free,
            ..Default::default()
        };
        let mut line = FreeItem::new(FreeItemKind::Line, 5.0, 5.0);
        line.height_mm = Some(0.5);
        d.add_free_item(line);
        d.add_free_item(FreeItem::new(FreeItemKind::Circle, 10.0, 10.0));
        d.add_free_item(FreeItem::new(FreeItemKind::Ring, 30.0, 10.0));
        let out = generate(&d, &Assets::new());
        // 12mm → 96 dots, 0.5mm → 4 dots, 1mm stroke → 8 dots
        assert!(out.zpl.contains("^FO40,40^GB96,4,4^FS"));
        assert!(out.zpl.contains("^FO80,80^GE96,96,48^FS"));
        assert!(out.zpl.contains("^FO240,80^GE96,96,8^FS"));
    }

    #[test]
    fn test_free_mode_ignores_anchors() {
        let mut d = doc();
        d.mode = EditMode::Free;
        d.add_free_item(FreeItem::text("Serbest", 1.0, 1.0));
        let out = generate(&d, &Assets::new());
        assert!(!out.zpl.contains("^FDVida"));
        assert!(out.zpl.contains("^FDSerbest^FS"));
    }

    #[test]
    fn test_free_barcode_falls_back_to_document_value() {
        let mut d = doc();
        d.mode = EditMode::Free;
        d.add_free_item(FreeItem::new(FreeItemKind::Barcode, 0.0, 0.0));
        let out = generate(&d, &Assets::new());
        assert!(out.zpl.contains("^FD4006381333931^FS"));
    }

    #[test]
    fn test_negative_position_clamped_to_zero() {
        let mut d = LabelDocument {
            mode: EditMode::Free,
            ..Default::default()
        };
        d.add_free_item(FreeItem::text("x", -5.0, -1.0));
        let out = generate(&d, &Assets::new());
        assert!(out.zpl.contains("^FO0,0^A0N"));
    }
}
