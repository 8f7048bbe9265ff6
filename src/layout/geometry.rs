//! Millimeter geometry for anchors and free items.
//!
//! The renderer paints into these boxes and the editor hit-tests against
//! them, so the box math lives here once.

use serde::Serialize;

use super::LabelDocument;
use super::types::{AnchorKey, DETAIL_FIELDS, FieldKey, FreeItem};
use super::wrap::wrap_text;

/// Axis-aligned box in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RectMm {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl RectMm {
    pub fn new(x_mm: f32, y_mm: f32, width_mm: f32, height_mm: f32) -> Self {
        Self {
            x_mm,
            y_mm,
            width_mm,
            height_mm,
        }
    }

    pub fn right(&self) -> f32 {
        self.x_mm + self.width_mm
    }

    pub fn bottom(&self) -> f32 {
        self.y_mm + self.height_mm
    }

    /// Inclusive on all edges.
    pub fn contains(&self, x_mm: f32, y_mm: f32) -> bool {
        x_mm >= self.x_mm && x_mm <= self.right() && y_mm >= self.y_mm && y_mm <= self.bottom()
    }
}

/// Height of `lines` stacked text lines.
pub fn text_block_height(lines: usize, font_mm: f32, line_gap_mm: f32) -> f32 {
    let n = lines.max(1) as f32;
    n * font_mm + (n - 1.0) * line_gap_mm
}

impl LabelDocument {
    /// Product name split at the configured wrap width.
    pub fn product_name_lines(&self) -> Vec<String> {
        let style = &self.styles.product_name;
        wrap_text(
            self.field_values.product_name.trim(),
            style.font_mm,
            Some(style.wrap_width_mm),
        )
    }

    /// `"<caption>: <value>"` for every visible details sub-field that has a value.
    pub fn details_lines(&self) -> Vec<(FieldKey, String)> {
        DETAIL_FIELDS
            .iter()
            .copied()
            .filter(|&key| self.is_field_visible(key))
            .filter_map(|key| {
                let value = self.field_values.display(key);
                if value.is_empty() {
                    None
                } else {
                    Some((key, format!("{}: {}", key.caption(), value)))
                }
            })
            .collect()
    }

    /// Box an anchor occupies, derived from its position and style group.
    pub fn anchor_bounds(&self, key: AnchorKey) -> RectMm {
        let at = self.anchors().get(key);
        let styles = &self.styles;
        let (width, height) = match key {
            AnchorKey::Title => (styles.title.width_mm, styles.title.font_mm),
            AnchorKey::ProductName => {
                let style = &styles.product_name;
                let lines = self.product_name_lines().len();
                (
                    style.wrap_width_mm,
                    text_block_height(lines, style.font_mm, style.line_gap_mm),
                )
            }
            AnchorKey::Details => {
                let style = &styles.details;
                let lines = self.details_lines().len();
                (
                    style.width_mm,
                    text_block_height(lines, style.font_mm, style.line_gap_mm),
                )
            }
            AnchorKey::Barcode => (styles.barcode.width_mm, styles.barcode.height_mm),
        };
        RectMm::new(at.x_mm, at.y_mm, width, height)
    }
}

impl FreeItem {
    pub fn bounds(&self) -> RectMm {
        RectMm::new(self.x_mm, self.y_mm, self.width_mm(), self.height_mm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FieldRule, FreeItemKind, PointMm};

    #[test]
    fn test_rect_contains_edges() {
        let r = RectMm::new(1.0, 2.0, 3.0, 4.0);
        assert!(r.contains(1.0, 2.0));
        assert!(r.contains(4.0, 6.0));
        assert!(!r.contains(4.1, 6.0));
        assert!(!r.contains(0.9, 3.0));
    }

    #[test]
    fn test_details_lines_skip_hidden_and_empty() {
        let mut doc = LabelDocument::default();
        doc.field_values.amount = "5 adet".into();
        doc.field_values.serial_number = "SN-1".into();
        doc.field_values.expiry_date = "2027-01-31".into();
        *doc.visible_fields.get_mut(FieldKey::SerialNumber) = FieldRule::HIDDEN;

        let lines: Vec<String> = doc.details_lines().into_iter().map(|(_, l)| l).collect();
        assert_eq!(lines, vec!["Miktar: 5 adet", "SKT: 31.01.2027"]);
    }

    #[test]
    fn test_anchor_bounds_follow_styles() {
        let mut doc = LabelDocument::default();
        doc.set_anchor(AnchorKey::Barcode, PointMm::new(10.0, 20.0));
        doc.styles.barcode.width_mm = 35.0;
        doc.styles.barcode.height_mm = 9.0;
        assert_eq!(
            doc.anchor_bounds(AnchorKey::Barcode),
            RectMm::new(10.0, 20.0, 35.0, 9.0)
        );
    }

    #[test]
    fn test_details_bounds_grow_with_lines() {
        let mut doc = LabelDocument::default();
        let one = doc.anchor_bounds(AnchorKey::Details).height_mm;
        doc.field_values.amount = "1".into();
        doc.field_values.supplier = "ACME".into();
        let two = doc.anchor_bounds(AnchorKey::Details).height_mm;
        let style = doc.styles.details;
        assert!((two - one - (style.font_mm + style.line_gap_mm)).abs() < 1e-5);
    }

    #[test]
    fn test_free_item_bounds() {
        let mut item = FreeItem::new(FreeItemKind::Circle, 3.0, 4.0);
        item.width_mm = Some(8.0);
        assert_eq!(item.bounds(), RectMm::new(3.0, 4.0, 8.0, 12.0));
    }
}
