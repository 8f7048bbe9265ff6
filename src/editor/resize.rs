//! Per-target resize rules.
//!
//! | Target | Horizontal delta | Vertical delta |
//! |--------|------------------|----------------|
//! | title anchor | width | font |
//! | productName anchor | wrap width, font scaled by the same ratio | none |
//! | details anchor | width | font, scaled by block height ratio |
//! | barcode anchor | width | height |
//! | free text | wrap width, font scaled by the same ratio | none |
//! | line | width | thickness |
//! | other free items | width | height |
//!
//! Every result is floored: fonts at [`MIN_FONT_MM`], boxes at
//! [`MIN_ITEM_MM`], line thickness at [`MIN_LINE_MM`].

use crate::layout::{
    AnchorKey, FreeItem, FreeItemKind, MIN_FONT_MM, MIN_ITEM_MM, MIN_LINE_MM, RectMm, Styles,
};

/// Metrics captured when a resize gesture starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub bounds: RectMm,
    pub font_mm: f32,
    pub wrap_width_mm: Option<f32>,
}

fn ratio(new: f32, old: f32) -> f32 {
    if old > 0.0 { new / old } else { 1.0 }
}

/// Apply a resize delta to an anchor's style group.
pub fn resize_anchor(styles: &mut Styles, key: AnchorKey, base: &Baseline, dx: f32, dy: f32) {
    match key {
        AnchorKey::Title => {
            styles.title.width_mm = (base.bounds.width_mm + dx).max(MIN_ITEM_MM);
            styles.title.font_mm = (base.font_mm + dy).max(MIN_FONT_MM);
        }
        AnchorKey::ProductName => {
            let old = base.wrap_width_mm.unwrap_or(base.bounds.width_mm);
            let wrap = (old + dx).max(MIN_ITEM_MM);
            styles.product_name.wrap_width_mm = wrap;
            styles.product_name.font_mm = (base.font_mm * ratio(wrap, old)).max(MIN_FONT_MM);
        }
        AnchorKey::Details => {
            styles.details.width_mm = (base.bounds.width_mm + dx).max(MIN_ITEM_MM);
            let height = (base.bounds.height_mm + dy).max(0.0);
            styles.details.font_mm =
                (base.font_mm * ratio(height, base.bounds.height_mm)).max(MIN_FONT_MM);
        }
        AnchorKey::Barcode => {
            styles.barcode.width_mm = (base.bounds.width_mm + dx).max(MIN_ITEM_MM);
            styles.barcode.height_mm = (base.bounds.height_mm + dy).max(MIN_ITEM_MM);
        }
    }
}

/// Apply a resize delta to a free item.
pub fn resize_free(item: &mut FreeItem, base: &Baseline, dx: f32, dy: f32) {
    match item.kind {
        FreeItemKind::Text => {
            let old = base.wrap_width_mm.unwrap_or(base.bounds.width_mm);
            let new = old + dx;
            item.font_mm = Some((base.font_mm * ratio(new, old)).max(MIN_FONT_MM));
            if base.wrap_width_mm.is_some() {
                item.wrap_width_mm = Some(new.max(MIN_ITEM_MM));
            }
        }
        FreeItemKind::Line => {
            item.width_mm = Some((base.bounds.width_mm + dx).max(MIN_ITEM_MM));
            item.height_mm = Some((base.bounds.height_mm + dy).max(MIN_LINE_MM));
        }
        _ => {
            item.width_mm = Some((base.bounds.width_mm + dx).max(MIN_ITEM_MM));
            item.height_mm = Some((base.bounds.height_mm + dy).max(MIN_ITEM_MM));
        }
    }
}
