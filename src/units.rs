//! # Unit Conversion
//!
//! All layout geometry is stored in millimeters. It leaves millimeters in
//! exactly two places:
//!
//! - the preview, through [`mm_to_px`] at a given zoom
//! - the ZPL stream, through [`mm_to_dots`] at the printer's DPI
//!
//! ## Calculations
//!
//! ```text
//! px   = mm * PX_PER_MM * zoom          (96 dpi screen equivalent)
//! dots = floor(mm * dpi / 25.4 + 0.5)   (round half up)
//!
//! 203 dpi: 8 dots/mm    (10mm = 80 dots)
//! 300 dpi: 11.8 dots/mm (10mm = 118 dots)
//! 600 dpi: 23.6 dots/mm (10mm = 236 dots)
//! ```
//!
//! Round-half-up (toward +infinity) is used rather than `f32::round`, which
//! rounds half away from zero. The two only differ for negative halves, which
//! callers clamp anyway, but the choice is fixed so golden ZPL stays stable.

use serde::{Deserialize, Serialize};

/// Screen pixels per millimeter at zoom 1.0.
pub const PX_PER_MM: f32 = 3.78;

/// Millimeters per inch.
pub const MM_PER_INCH: f32 = 25.4;

/// Printer resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Dpi {
    /// 8 dots/mm, the common desktop Zebra resolution
    #[default]
    Dpi203,
    /// 12 dots/mm
    Dpi300,
    /// 24 dots/mm
    Dpi600,
}

impl Dpi {
    pub const ALL: [Dpi; 3] = [Dpi::Dpi203, Dpi::Dpi300, Dpi::Dpi600];

    /// Dots per inch as a number.
    #[inline]
    pub fn value(self) -> u16 {
        match self {
            Dpi::Dpi203 => 203,
            Dpi::Dpi300 => 300,
            Dpi::Dpi600 => 600,
        }
    }

    /// Dots per millimeter.
    #[inline]
    pub fn dots_per_mm(self) -> f32 {
        self.value() as f32 / MM_PER_INCH
    }
}

impl TryFrom<u16> for Dpi {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            203 => Ok(Dpi::Dpi203),
            300 => Ok(Dpi::Dpi300),
            600 => Ok(Dpi::Dpi600),
            other => Err(format!("unsupported DPI {}, expected 203, 300 or 600", other)),
        }
    }
}

impl From<Dpi> for u16 {
    fn from(dpi: Dpi) -> u16 {
        dpi.value()
    }
}

/// Convert millimeters to screen pixels at the given zoom.
#[inline]
pub fn mm_to_px(mm: f32, zoom: f32) -> f32 {
    mm * PX_PER_MM * zoom
}

/// Inverse of [`mm_to_px`]. A zero zoom is treated as 1.0.
#[inline]
pub fn px_to_mm(px: f32, zoom: f32) -> f32 {
    let zoom = if zoom > 0.0 { zoom } else { 1.0 };
    px / (PX_PER_MM * zoom)
}

/// Convert millimeters to printer dots, rounding half up.
///
/// Negative input yields negative dots; the ZPL generator clamps those to 0.
///
/// ```
/// use etiket::units::{mm_to_dots, Dpi};
///
/// assert_eq!(mm_to_dots(10.0, Dpi::Dpi203), 80);
/// assert_eq!(mm_to_dots(10.0, Dpi::Dpi300), 118);
/// ```
#[inline]
pub fn mm_to_dots(mm: f32, dpi: Dpi) -> i32 {
    let exact = mm as f64 * dpi.value() as f64 / MM_PER_INCH as f64;
    (exact + 0.5).floor() as i32
}

/// Convert printer dots back to millimeters.
#[inline]
pub fn dots_to_mm(dots: i32, dpi: Dpi) -> f32 {
    (dots as f64 * MM_PER_INCH as f64 / dpi.value() as f64) as f32
}
