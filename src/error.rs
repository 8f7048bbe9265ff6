//! # Error Types
//!
//! Errors are split in two tiers:
//!
//! - [`EtiketError`]: failures at an I/O boundary (printer, spooler, label type
//!   store). These abort the operation that raised them.
//! - [`ValidationIssue`]: problems with label content. They never abort ZPL
//!   generation; the offending field is omitted or auto-corrected and the issue
//!   is returned next to the output.

use serde::Serialize;
use thiserror::Error;

use crate::layout::FieldKey;

/// Main error type for etiket operations
#[derive(Debug, Error)]
pub enum EtiketError {
    /// Request rejected outright, e.g. a printer name the print proxy refuses
    #[error("Validation error: {0}")]
    Validation(ValidationIssue),

    /// Raw TCP connect or write exceeded the transport timeout
    #[error("Printer at {addr} did not respond within {secs}s")]
    TransportTimeout { addr: String, secs: u64 },

    /// Connection refused, host unreachable, or spooler command failed
    #[error("{0}")]
    TransportConnection(String),

    /// Native print spooler integration is not present on this host
    #[error("Print spooler unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Label type store unreachable or rejected a write
    #[error("Label type registry error: {0}")]
    Registry(String),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EtiketError>;

/// Content problem found while validating or generating a label.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationIssue {
    /// Barcode value contains something other than digits.
    #[error("Barcode must contain only digits: {value:?}")]
    BarcodeNotNumeric { value: String },

    /// Barcode value is longer than 13 digits.
    #[error("Barcode must be 12 or 13 digits, got {len}")]
    BarcodeLength { value: String, len: usize },

    /// 13-digit barcode whose last digit does not match the computed check digit.
    /// The entered value is still printed.
    #[error("EAN-13 check digit mismatch for {value}: expected {expected}, found {found}")]
    ChecksumMismatch {
        value: String,
        expected: u8,
        found: u8,
    },

    /// User text contained `^`, `~` or `\`; it was hex-escaped.
    #[error("{field} contains reserved ZPL characters; they were escaped")]
    ReservedCharacters { field: String },

    /// `^MD` darkness outside 0..=30; clamped.
    #[error("Darkness {requested} out of range 0-30, clamped to {applied}")]
    DarknessClamped { requested: i32, applied: u8 },

    /// Preview darkness multiplier outside 0.6..=2.0; clamped for display only.
    #[error("Preview darkness {requested} out of range 0.6-2.0, clamped to {applied}")]
    PreviewDarknessClamped { requested: f32, applied: f32 },

    /// DPI not one of 203, 300, 600.
    #[error("Unsupported DPI {requested}, using {applied}")]
    UnsupportedDpi { requested: u16, applied: u16 },

    /// A size or position that must not be negative.
    #[error("{what} must not be negative ({value}mm)")]
    NegativeDimension { what: String, value: f32 },

    /// A visible field flagged as required has no value.
    #[error("Required field {field:?} is empty")]
    RequiredFieldMissing { field: FieldKey },

    /// A size above [`MAX_LABEL_MM`](crate::layout::MAX_LABEL_MM).
    #[error("{what} is {value}mm, larger than the {max}mm limit")]
    DimensionTooLarge { what: String, value: f32, max: f32 },

    /// Preview raster would exceed the pixel budget.
    #[error("Preview of {width}x{height} pixels exceeds the {max} pixel limit")]
    PreviewTooLarge { width: u64, height: u64, max: u64 },

    /// Image box in dots too large for a `^GFA` field; the image is skipped.
    #[error("Image {reference:?} at {width}x{height} dots exceeds the {max} dot limit")]
    GraphicTooLarge {
        reference: String,
        width: u32,
        height: u32,
        max: u64,
    },

    /// Image item or logo references an asset that was not supplied.
    #[error("Image {reference:?} is not available")]
    MissingImage { reference: String },

    /// Printer name with characters the print proxy does not pass on.
    #[error("Invalid printer name {name:?}")]
    InvalidPrinterName { name: String },
}
