//! # Label Layout Model
//!
//! [`LabelDocument`] is the whole editing state of one label: physical size,
//! printer settings, the four fixed anchors with their style groups, field
//! visibility from the active label type, free-form items, and the content.
//!
//! ```
//! use etiket::layout::{AnchorKey, FreeItem, LabelDocument, PointMm};
//!
//! let mut doc = LabelDocument::default();
//! doc.field_values.product_name = "Vida M4x20".into();
//! doc.set_anchor(AnchorKey::ProductName, PointMm::new(6.0, 13.0));
//!
//! let id = doc.add_free_item(FreeItem::text("FRAGILE", 60.0, 4.0));
//! assert!(doc.free_item(&id).is_some());
//! ```
//!
//! The document never drops an anchor. Hiding a field only stops it from
//! being painted and printed; its position survives for when it is shown again.

mod geometry;
pub mod types;
mod wrap;

pub use geometry::{RectMm, text_block_height};
pub use types::*;
pub use wrap::{CHAR_WIDTH_FACTOR, chars_per_line, text_width_mm, wrap_text};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationIssue;
use crate::registry::LabelTypeDef;
use crate::units::Dpi;
use crate::zpl::{ean13, escape};

/// Range of the on-screen darkness multiplier.
pub const PREVIEW_DARKNESS_RANGE: (f32, f32) = (0.6, 2.0);

/// Highest `^MD` value accepted.
pub const MAX_ZPL_DARKNESS: i32 = 30;

/// Upper bound for label sides and every style or item size, in mm.
pub const MAX_LABEL_MM: f32 = 1000.0;

/// Which layer of the document is being edited and printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    /// The four fixed anchors fed from field values
    #[default]
    Standard,
    /// User-placed free items only
    Free,
}

/// Editing state of one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelDocument {
    pub label_width_mm: f32,
    pub label_height_mm: f32,
    /// 203, 300 or 600. Anything else prints at 203 with a validation issue.
    pub dpi: u16,
    /// Preview-only ink multiplier, 0.6 to 2.0.
    pub darkness_preview: f32,
    /// Printer `^MD` value, 0 to 30.
    pub zpl_darkness: i32,
    pub copies: u32,
    pub mode: EditMode,
    /// `None` until a label type seeds it or the user places an anchor.
    pub anchors: Option<Anchors>,
    pub styles: Styles,
    pub visible_fields: FieldsConfig,
    pub free_items: Vec<FreeItem>,
    pub field_values: FieldValues,
}

impl Default for LabelDocument {
    fn default() -> Self {
        Self {
            label_width_mm: 100.0,
            label_height_mm: 70.0,
            dpi: 203,
            darkness_preview: 1.0,
            zpl_darkness: 15,
            copies: 1,
            mode: EditMode::Standard,
            anchors: None,
            styles: Styles::default(),
            visible_fields: FieldsConfig::default(),
            free_items: Vec::new(),
            field_values: FieldValues::default(),
        }
    }
}

impl LabelDocument {
    // ------------------------------------------------------------------
    // Label types and anchors
    // ------------------------------------------------------------------

    /// Take field visibility from a label type.
    ///
    /// Anchors are seeded from the type only when the document has none yet,
    /// so switching types never moves content the user already placed.
    pub fn apply_label_type(&mut self, def: &LabelTypeDef) {
        self.visible_fields = def.fields;
        if self.anchors.is_none() {
            self.anchors = Some(def.anchors.unwrap_or_default());
        }
    }

    /// Current anchor positions, defaults if none were set.
    pub fn anchors(&self) -> Anchors {
        self.anchors.unwrap_or_default()
    }

    /// Move an anchor. Coordinates are clamped to `>= 0`; there is no upper
    /// clamp so content may sit past the label edge while editing.
    pub fn set_anchor(&mut self, key: AnchorKey, at: PointMm) {
        let anchors = self.anchors.get_or_insert_with(Anchors::default);
        *anchors.get_mut(key) = at.clamped();
    }

    // ------------------------------------------------------------------
    // Visibility
    // ------------------------------------------------------------------

    pub fn is_field_visible(&self, key: FieldKey) -> bool {
        self.visible_fields.is_visible(key)
    }

    /// Whether an anchor is painted and printed. The details block needs at
    /// least one visible sub-field.
    pub fn is_anchor_present(&self, key: AnchorKey) -> bool {
        match key {
            AnchorKey::Details => key.fields().iter().any(|&f| self.is_field_visible(f)),
            _ => key.fields().iter().all(|&f| self.is_field_visible(f)),
        }
    }

    // ------------------------------------------------------------------
    // Free items
    // ------------------------------------------------------------------

    /// Append a free item, assigning a fresh id if it has none (or a taken one).
    /// Returns the item's id.
    pub fn add_free_item(&mut self, mut item: FreeItem) -> String {
        if item.id.is_empty() || self.free_item(&item.id).is_some() {
            item.id = Uuid::new_v4().to_string();
        }
        let id = item.id.clone();
        self.free_items.push(item);
        id
    }

    /// Remove a free item by id.
    pub fn remove_free_item(&mut self, id: &str) -> Option<FreeItem> {
        let index = self.free_items.iter().position(|i| i.id == id)?;
        Some(self.free_items.remove(index))
    }

    /// Patch a free item in place. Returns `false` if no item has that id.
    pub fn update_free_item(&mut self, id: &str, patch: FreeItemPatch) -> bool {
        match self.free_item_mut(id) {
            Some(item) => {
                patch.apply(item);
                true
            }
            None => false,
        }
    }

    pub fn free_item(&self, id: &str) -> Option<&FreeItem> {
        self.free_items.iter().find(|i| i.id == id)
    }

    pub fn free_item_mut(&mut self, id: &str) -> Option<&mut FreeItem> {
        self.free_items.iter_mut().find(|i| i.id == id)
    }

    /// Free items in paint order: `zIndex` ascending, insertion order on ties.
    /// Items without a `zIndex` use their insertion index.
    pub fn free_items_in_paint_order(&self) -> Vec<&FreeItem> {
        let mut items: Vec<(i64, usize, &FreeItem)> = self
            .free_items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.z_index.map(i64::from).unwrap_or(i as i64), i, item))
            .collect();
        items.sort_by_key(|&(z, i, _)| (z, i));
        items.into_iter().map(|(_, _, item)| item).collect()
    }

    // ------------------------------------------------------------------
    // Printer settings
    // ------------------------------------------------------------------

    /// Printer resolution, falling back to 203 for unsupported values.
    pub fn resolved_dpi(&self) -> (Dpi, Option<ValidationIssue>) {
        match Dpi::try_from(self.dpi) {
            Ok(dpi) => (dpi, None),
            Err(_) => (
                Dpi::Dpi203,
                Some(ValidationIssue::UnsupportedDpi {
                    requested: self.dpi,
                    applied: Dpi::Dpi203.value(),
                }),
            ),
        }
    }

    /// `^MD` value clamped to 0..=30.
    pub fn resolved_zpl_darkness(&self) -> (u8, Option<ValidationIssue>) {
        let applied = self.zpl_darkness.clamp(0, MAX_ZPL_DARKNESS);
        let issue = (applied != self.zpl_darkness).then(|| ValidationIssue::DarknessClamped {
            requested: self.zpl_darkness,
            applied: applied as u8,
        });
        (applied as u8, issue)
    }

    /// Preview ink multiplier clamped to 0.6..=2.0.
    pub fn resolved_darkness_preview(&self) -> (f32, Option<ValidationIssue>) {
        let (lo, hi) = PREVIEW_DARKNESS_RANGE;
        let requested = if self.darkness_preview.is_finite() {
            self.darkness_preview
        } else {
            1.0
        };
        let applied = requested.clamp(lo, hi);
        let issue = (applied != self.darkness_preview).then_some(
            ValidationIssue::PreviewDarknessClamped {
                requested: self.darkness_preview,
                applied,
            },
        );
        (applied, issue)
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Settings-level issues: DPI, darkness, negative sizes, missing required
    /// fields. Content issues (barcode, reserved characters) come from
    /// [`LabelDocument::validate`].
    pub fn settings_issues(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        issues.extend(self.resolved_dpi().1);
        issues.extend(self.resolved_zpl_darkness().1);
        issues.extend(self.resolved_darkness_preview().1);

        let mut check = |what: &str, value: f32| {
            if value < 0.0 {
                issues.push(ValidationIssue::NegativeDimension {
                    what: what.to_string(),
                    value,
                });
            } else if value > MAX_LABEL_MM || value.is_nan() {
                issues.push(ValidationIssue::DimensionTooLarge {
                    what: what.to_string(),
                    value,
                    max: MAX_LABEL_MM,
                });
            }
        };
        check("labelWidthMm", self.label_width_mm);
        check("labelHeightMm", self.label_height_mm);
        let s = &self.styles;
        check("title.fontMm", s.title.font_mm);
        check("title.widthMm", s.title.width_mm);
        check("productName.fontMm", s.product_name.font_mm);
        check("productName.wrapWidthMm", s.product_name.wrap_width_mm);
        check("productName.lineGapMm", s.product_name.line_gap_mm);
        check("details.fontMm", s.details.font_mm);
        check("details.lineGapMm", s.details.line_gap_mm);
        check("details.widthMm", s.details.width_mm);
        check("barcode.heightMm", s.barcode.height_mm);
        check("barcode.widthMm", s.barcode.width_mm);
        for item in &self.free_items {
            let sizes = [
                ("widthMm", item.width_mm),
                ("heightMm", item.height_mm),
                ("fontMm", item.font_mm),
                ("wrapWidthMm", item.wrap_width_mm),
                ("lineGapMm", item.line_gap_mm),
                ("strokeMm", item.stroke_mm),
            ];
            for (name, value) in sizes {
                if let Some(value) = value {
                    check(&format!("{}.{}", item.id, name), value);
                }
            }
        }

        if self.mode == EditMode::Standard {
            for key in FieldKey::ALL {
                let rule = self.visible_fields.get(key);
                if rule.visible && rule.required && self.field_values.get(key).trim().is_empty() {
                    issues.push(ValidationIssue::RequiredFieldMissing { field: key });
                }
            }
        }

        issues
    }

    /// Sizes past [`MAX_LABEL_MM`]. Servers refuse such documents instead of
    /// rendering them.
    pub fn oversize_issues(&self) -> Vec<ValidationIssue> {
        self.settings_issues()
            .into_iter()
            .filter(|issue| matches!(issue, ValidationIssue::DimensionTooLarge { .. }))
            .collect()
    }

    /// Everything the ZPL generator would flag, without generating. Used to
    /// show inline errors while the user edits; generation re-checks.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = self.settings_issues();

        match self.mode {
            EditMode::Standard => {
                let barcode = self.field_values.barcode.trim();
                if self.is_anchor_present(AnchorKey::Barcode) && !barcode.is_empty() {
                    match ean13::normalize(barcode) {
                        Ok(code) => issues.extend(code.issue),
                        Err(issue) => issues.push(issue),
                    }
                }
                let mut text_fields = vec![FieldKey::ProductName, FieldKey::Logo];
                text_fields.extend(DETAIL_FIELDS);
                for key in text_fields {
                    if self.is_field_visible(key) && escape::needs_escape(self.field_values.get(key)) {
                        issues.push(ValidationIssue::ReservedCharacters {
                            field: format!("{:?}", key),
                        });
                    }
                }
            }
            EditMode::Free => {
                for item in &self.free_items {
                    match item.kind {
                        FreeItemKind::Text if escape::needs_escape(item.text_content()) => {
                            issues.push(ValidationIssue::ReservedCharacters {
                                field: item.id.clone(),
                            });
                        }
                        FreeItemKind::Barcode => {
                            let value = self.free_barcode_value(item);
                            if !value.is_empty() {
                                match ean13::normalize(value) {
                                    Ok(code) => issues.extend(code.issue),
                                    Err(issue) => issues.push(issue),
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        issues
    }

    /// Barcode value of a free barcode item: its own text, else the document's barcode.
    pub fn free_barcode_value<'a>(&'a self, item: &'a FreeItem) -> &'a str {
        let own = item.text_content().trim();
        if own.is_empty() {
            self.field_values.barcode.trim()
        } else {
            own
        }
    }
}

/// Validate a document on edit; same issues as [`LabelDocument::validate`].
pub fn validate_document(doc: &LabelDocument) -> Vec<ValidationIssue> {
    doc.validate()
}
