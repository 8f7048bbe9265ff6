//! Field keys, style groups and free items for the label layout model.
//!
//! Every type derives `Serialize + Deserialize` with camelCase names so the
//! same structs are the Rust API and the JSON shape the dashboard stores.

use serde::{Deserialize, Serialize};

use super::wrap::{CHAR_WIDTH_FACTOR, wrap_text};

/// Smallest font any resize or patch can produce.
pub const MIN_FONT_MM: f32 = 1.0;

/// Smallest width/height a free item box can shrink to.
pub const MIN_ITEM_MM: f32 = 1.0;

/// Line thickness floor, so a rule never disappears.
pub const MIN_LINE_MM: f32 = 0.2;

/// Default box size for barcode, image, line width, circle and ring items.
pub const DEFAULT_ITEM_MM: f32 = 12.0;

/// Default thickness of a line item.
pub const DEFAULT_LINE_THICKNESS_MM: f32 = 0.3;

/// Default band width of a ring item.
pub const DEFAULT_RING_STROKE_MM: f32 = 1.0;

/// Default font size for new text items.
pub const DEFAULT_TEXT_FONT_MM: f32 = 3.0;

/// Gap between wrapped lines when none is configured.
pub const DEFAULT_LINE_GAP_MM: f32 = 1.0;

/// Vertical padding added to a text item's derived height.
pub const TEXT_PADDING_MM: f32 = 1.0;

// ============================================================================
// FIELD KEYS
// ============================================================================

/// One of the ten content fields a label type can show or hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    ProductName,
    Barcode,
    SerialNumber,
    EntryDate,
    ExpiryDate,
    Amount,
    InvoiceNumber,
    BatchNumber,
    Supplier,
    Logo,
}

impl FieldKey {
    pub const ALL: [FieldKey; 10] = [
        FieldKey::ProductName,
        FieldKey::Barcode,
        FieldKey::SerialNumber,
        FieldKey::EntryDate,
        FieldKey::ExpiryDate,
        FieldKey::Amount,
        FieldKey::InvoiceNumber,
        FieldKey::BatchNumber,
        FieldKey::Supplier,
        FieldKey::Logo,
    ];

    /// Caption printed in front of the value in the details block.
    pub fn caption(self) -> &'static str {
        match self {
            FieldKey::ProductName => "Ürün",
            FieldKey::Barcode => "Barkod",
            FieldKey::SerialNumber => "Seri No",
            FieldKey::EntryDate => "Giriş Tarihi",
            FieldKey::ExpiryDate => "SKT",
            FieldKey::Amount => "Miktar",
            FieldKey::InvoiceNumber => "Fatura No",
            FieldKey::BatchNumber => "Parti No",
            FieldKey::Supplier => "Tedarikçi",
            FieldKey::Logo => "Logo",
        }
    }

    /// Whether the value is an ISO date that gets reformatted for printing.
    pub fn is_date(self) -> bool {
        matches!(self, FieldKey::EntryDate | FieldKey::ExpiryDate)
    }
}

/// Sub-fields of the details block, in print order.
pub const DETAIL_FIELDS: [FieldKey; 7] = [
    FieldKey::Amount,
    FieldKey::SerialNumber,
    FieldKey::BatchNumber,
    FieldKey::InvoiceNumber,
    FieldKey::EntryDate,
    FieldKey::ExpiryDate,
    FieldKey::Supplier,
];

/// Visibility and requiredness of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FieldRule {
    fn default() -> Self {
        Self {
            visible: true,
            required: false,
        }
    }
}

impl FieldRule {
    pub const HIDDEN: FieldRule = FieldRule {
        visible: false,
        required: false,
    };
    pub const REQUIRED: FieldRule = FieldRule {
        visible: true,
        required: true,
    };
}

/// Per-field rules for all ten [`FieldKey`]s. Missing keys deserialize as
/// visible and optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldsConfig {
    pub product_name: FieldRule,
    pub barcode: FieldRule,
    pub serial_number: FieldRule,
    pub entry_date: FieldRule,
    pub expiry_date: FieldRule,
    pub amount: FieldRule,
    pub invoice_number: FieldRule,
    pub batch_number: FieldRule,
    pub supplier: FieldRule,
    pub logo: FieldRule,
}

impl FieldsConfig {
    pub fn get(&self, key: FieldKey) -> FieldRule {
        match key {
            FieldKey::ProductName => self.product_name,
            FieldKey::Barcode => self.barcode,
            FieldKey::SerialNumber => self.serial_number,
            FieldKey::EntryDate => self.entry_date,
            FieldKey::ExpiryDate => self.expiry_date,
            FieldKey::Amount => self.amount,
            FieldKey::InvoiceNumber => self.invoice_number,
            FieldKey::BatchNumber => self.batch_number,
            FieldKey::Supplier => self.supplier,
            FieldKey::Logo => self.logo,
        }
    }

    pub fn get_mut(&mut self, key: FieldKey) -> &mut FieldRule {
        match key {
            FieldKey::ProductName => &mut self.product_name,
            FieldKey::Barcode => &mut self.barcode,
            FieldKey::SerialNumber => &mut self.serial_number,
            FieldKey::EntryDate => &mut self.entry_date,
            FieldKey::ExpiryDate => &mut self.expiry_date,
            FieldKey::Amount => &mut self.amount,
            FieldKey::InvoiceNumber => &mut self.invoice_number,
            FieldKey::BatchNumber => &mut self.batch_number,
            FieldKey::Supplier => &mut self.supplier,
            FieldKey::Logo => &mut self.logo,
        }
    }

    /// Builder-style setter.
    pub fn with(mut self, key: FieldKey, rule: FieldRule) -> Self {
        *self.get_mut(key) = rule;
        self
    }

    pub fn is_visible(&self, key: FieldKey) -> bool {
        self.get(key).visible
    }
}

// ============================================================================
// ANCHORS
// ============================================================================

/// The four fixed layout slots of a standard-mode label, in paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorKey {
    Title,
    ProductName,
    Details,
    Barcode,
}

impl AnchorKey {
    pub const ORDER: [AnchorKey; 4] = [
        AnchorKey::Title,
        AnchorKey::ProductName,
        AnchorKey::Details,
        AnchorKey::Barcode,
    ];

    /// Content fields whose visibility gates this anchor.
    pub fn fields(self) -> &'static [FieldKey] {
        match self {
            AnchorKey::Title => &[FieldKey::Logo],
            AnchorKey::ProductName => &[FieldKey::ProductName],
            AnchorKey::Details => &DETAIL_FIELDS,
            AnchorKey::Barcode => &[FieldKey::Barcode],
        }
    }
}

/// A position in millimeters from the label's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointMm {
    #[serde(rename = "x", alias = "xMm")]
    pub x_mm: f32,
    #[serde(rename = "y", alias = "yMm")]
    pub y_mm: f32,
}

impl PointMm {
    pub const fn new(x_mm: f32, y_mm: f32) -> Self {
        Self { x_mm, y_mm }
    }

    /// Same point with both coordinates clamped to `>= 0`.
    pub fn clamped(self) -> Self {
        Self {
            x_mm: self.x_mm.max(0.0),
            y_mm: self.y_mm.max(0.0),
        }
    }
}

/// Positions of all four anchors. A struct rather than a map so every label
/// always has exactly the four keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Anchors {
    pub title: PointMm,
    pub product_name: PointMm,
    pub details: PointMm,
    pub barcode: PointMm,
}

impl Default for Anchors {
    fn default() -> Self {
        Self {
            title: PointMm::new(4.0, 3.0),
            product_name: PointMm::new(4.0, 12.0),
            details: PointMm::new(4.0, 24.0),
            barcode: PointMm::new(4.0, 52.0),
        }
    }
}

impl Anchors {
    pub fn get(&self, key: AnchorKey) -> PointMm {
        match key {
            AnchorKey::Title => self.title,
            AnchorKey::ProductName => self.product_name,
            AnchorKey::Details => self.details,
            AnchorKey::Barcode => self.barcode,
        }
    }

    pub fn get_mut(&mut self, key: AnchorKey) -> &mut PointMm {
        match key {
            AnchorKey::Title => &mut self.title,
            AnchorKey::ProductName => &mut self.product_name,
            AnchorKey::Details => &mut self.details,
            AnchorKey::Barcode => &mut self.barcode,
        }
    }
}

// ============================================================================
// STYLES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TitleStyle {
    pub font_mm: f32,
    pub width_mm: f32,
}

impl Default for TitleStyle {
    fn default() -> Self {
        Self {
            font_mm: 4.0,
            width_mm: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductNameStyle {
    pub font_mm: f32,
    pub wrap_width_mm: f32,
    pub line_gap_mm: f32,
}

impl Default for ProductNameStyle {
    fn default() -> Self {
        Self {
            font_mm: 3.5,
            wrap_width_mm: 60.0,
            line_gap_mm: DEFAULT_LINE_GAP_MM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetailsStyle {
    pub font_mm: f32,
    pub line_gap_mm: f32,
    pub width_mm: f32,
}

impl Default for DetailsStyle {
    fn default() -> Self {
        Self {
            font_mm: 2.5,
            line_gap_mm: DEFAULT_LINE_GAP_MM,
            width_mm: 60.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarcodeStyle {
    pub height_mm: f32,
    pub width_mm: f32,
}

impl Default for BarcodeStyle {
    fn default() -> Self {
        Self {
            height_mm: 12.0,
            width_mm: 40.0,
        }
    }
}

/// Rendering parameters for each anchor group.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Styles {
    pub title: TitleStyle,
    pub product_name: ProductNameStyle,
    pub details: DetailsStyle,
    pub barcode: BarcodeStyle,
}

// ============================================================================
// FIELD VALUES
// ============================================================================

/// Label content. Empty strings mean "no value".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldValues {
    pub product_name: String,
    pub barcode: String,
    pub serial_number: String,
    /// ISO `YYYY-MM-DD`
    pub entry_date: String,
    /// ISO `YYYY-MM-DD`
    pub expiry_date: String,
    pub amount: String,
    pub invoice_number: String,
    pub batch_number: String,
    pub supplier: String,
    /// Logo at the title anchor. An image reference (URL, `data:` URL or
    /// image file name) is printed as a graphic and reported as a missing
    /// image when no asset is loaded; any other value is printed as title text.
    pub logo: String,
}

impl FieldValues {
    pub fn get(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::ProductName => &self.product_name,
            FieldKey::Barcode => &self.barcode,
            FieldKey::SerialNumber => &self.serial_number,
            FieldKey::EntryDate => &self.entry_date,
            FieldKey::ExpiryDate => &self.expiry_date,
            FieldKey::Amount => &self.amount,
            FieldKey::InvoiceNumber => &self.invoice_number,
            FieldKey::BatchNumber => &self.batch_number,
            FieldKey::Supplier => &self.supplier,
            FieldKey::Logo => &self.logo,
        }
    }

    /// Value as it appears on the label: trimmed, dates as `DD.MM.YYYY`.
    pub fn display(&self, key: FieldKey) -> String {
        let raw = self.get(key).trim();
        if key.is_date()
            && let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        {
            return date.format("%d.%m.%Y").to_string();
        }
        raw.to_string()
    }
}

// ============================================================================
// FREE ITEMS
// ============================================================================

/// Kind of a free-form layout element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreeItemKind {
    Text,
    Barcode,
    Image,
    Line,
    Circle,
    Ring,
}

/// A user-placed element in free editing mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeItem {
    /// Assigned on insert when empty; never changes afterwards.
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FreeItemKind,
    #[serde(default)]
    pub x_mm: f32,
    #[serde(default)]
    pub y_mm: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_mm: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_mm: Option<f32>,
    /// Text content, or the barcode value for barcode items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_mm: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_width_mm: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_gap_mm: Option<f32>,
    /// Image asset reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Band width for rings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_mm: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

impl FreeItem {
    /// A new item of the given kind at a position, all sizes derived.
    pub fn new(kind: FreeItemKind, x_mm: f32, y_mm: f32) -> Self {
        Self {
            id: String::new(),
            kind,
            x_mm,
            y_mm,
            width_mm: None,
            height_mm: None,
            text: None,
            font_mm: None,
            wrap_width_mm: None,
            line_gap_mm: None,
            src: None,
            stroke_mm: None,
            z_index: None,
        }
    }

    /// A text item.
    pub fn text(content: impl Into<String>, x_mm: f32, y_mm: f32) -> Self {
        Self {
            text: Some(content.into()),
            ..Self::new(FreeItemKind::Text, x_mm, y_mm)
        }
    }

    pub fn font_mm(&self) -> f32 {
        self.font_mm.unwrap_or(DEFAULT_TEXT_FONT_MM).max(MIN_FONT_MM)
    }

    pub fn line_gap_mm(&self) -> f32 {
        self.line_gap_mm.unwrap_or(DEFAULT_LINE_GAP_MM).max(0.0)
    }

    pub fn text_content(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Text lines after wrapping at `wrap_width_mm` (if set).
    pub fn lines(&self) -> Vec<String> {
        wrap_text(self.text_content(), self.font_mm(), self.wrap_width_mm)
    }

    /// Effective width: explicit, else derived from kind.
    pub fn width_mm(&self) -> f32 {
        if let Some(w) = self.width_mm {
            return w;
        }
        match self.kind {
            FreeItemKind::Text => self.wrap_width_mm.unwrap_or_else(|| {
                let longest = self
                    .lines()
                    .iter()
                    .map(|l| l.chars().count())
                    .max()
                    .unwrap_or(0);
                (longest as f32 * self.font_mm() * CHAR_WIDTH_FACTOR).max(MIN_ITEM_MM)
            }),
            _ => DEFAULT_ITEM_MM,
        }
    }

    /// Effective height: explicit, else derived from kind.
    pub fn height_mm(&self) -> f32 {
        if let Some(h) = self.height_mm {
            return h;
        }
        match self.kind {
            FreeItemKind::Text => {
                let lines = self.lines().len().max(1) as f32;
                lines * self.font_mm() + (lines - 1.0) * self.line_gap_mm() + TEXT_PADDING_MM
            }
            FreeItemKind::Line => DEFAULT_LINE_THICKNESS_MM,
            _ => DEFAULT_ITEM_MM,
        }
    }

    pub fn stroke_mm(&self) -> f32 {
        self.stroke_mm.unwrap_or(DEFAULT_RING_STROKE_MM).max(MIN_LINE_MM)
    }
}

/// Partial update for a free item. `id` and kind are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FreeItemPatch {
    pub x_mm: Option<f32>,
    pub y_mm: Option<f32>,
    pub width_mm: Option<f32>,
    pub height_mm: Option<f32>,
    pub text: Option<String>,
    pub font_mm: Option<f32>,
    pub wrap_width_mm: Option<f32>,
    pub line_gap_mm: Option<f32>,
    pub src: Option<String>,
    pub stroke_mm: Option<f32>,
    pub z_index: Option<i32>,
}

impl FreeItemPatch {
    /// Apply to an item, clamping positions to `>= 0` and sizes to their floors.
    pub fn apply(self, item: &mut FreeItem) {
        if let Some(x) = self.x_mm {
            item.x_mm = x.max(0.0);
        }
        if let Some(y) = self.y_mm {
            item.y_mm = y.max(0.0);
        }
        if let Some(w) = self.width_mm {
            item.width_mm = Some(w.max(MIN_ITEM_MM));
        }
        if let Some(h) = self.height_mm {
            let floor = if item.kind == FreeItemKind::Line {
                MIN_LINE_MM
            } else {
                MIN_ITEM_MM
            };
            item.height_mm = Some(h.max(floor));
        }
        if let Some(text) = self.text {
            item.text = Some(text);
        }
        if let Some(font) = self.font_mm {
            item.font_mm = Some(font.max(MIN_FONT_MM));
        }
        if let Some(wrap) = self.wrap_width_mm {
            item.wrap_width_mm = Some(wrap.max(MIN_ITEM_MM));
        }
        if let Some(gap) = self.line_gap_mm {
            item.line_gap_mm = Some(gap.max(0.0));
        }
        if let Some(src) = self.src {
            item.src = Some(src);
        }
        if let Some(stroke) = self.stroke_mm {
            item.stroke_mm = Some(stroke.max(MIN_LINE_MM));
        }
        if let Some(z) = self.z_index {
            item.z_index = Some(z);
        }
    }
}
