//! # ZPL II Command Builders
//!
//! Each function returns the text of one ZPL command. Commands are
//! caret-prefixed mnemonics with comma-separated parameters; a field is
//! opened by `^FO` and closed by `^FS`.
//!
//! | Command | Meaning |
//! |---------|---------|
//! | `^XA` / `^XZ` | start / end of label format |
//! | `^CI28` | UTF-8 field data |
//! | `^PW` / `^LL` | print width / label length in dots |
//! | `^LH` | label home offset |
//! | `^MD` | media darkness |
//! | `^PQ` | print quantity |
//! | `^FO` | field origin |
//! | `^A0N` | scalable font 0, normal orientation |
//! | `^FH` / `^FD` / `^FS` | hex indicator / field data / field separator |
//! | `^BY` / `^BE` | bar code defaults / EAN-13 |
//! | `^GB` / `^GE` / `^GF` | box / ellipse / graphic field |
//!
//! ## Reference
//!
//! Zebra "ZPL II Programming Guide", Volume One.

use super::escape;

/// # Start Format (^XA)
///
/// Opens a label format. Everything up to `^XZ` describes one label.
#[inline]
pub fn start_format() -> &'static str {
    "^XA"
}

/// # End Format (^XZ)
#[inline]
pub fn end_format() -> &'static str {
    "^XZ"
}

/// # Change International Font/Encoding (^CI28)
///
/// Selects UTF-8 for field data so Turkish characters print as typed.
#[inline]
pub fn utf8_encoding() -> &'static str {
    "^CI28"
}

/// # Print Width (^PW)
#[inline]
pub fn print_width(dots: u32) -> String {
    format!("^PW{}", dots)
}

/// # Label Length (^LL)
#[inline]
pub fn label_length(dots: u32) -> String {
    format!("^LL{}", dots)
}

/// # Label Home (^LH)
#[inline]
pub fn label_home(x: u32, y: u32) -> String {
    format!("^LH{},{}", x, y)
}

/// # Media Darkness (^MD)
///
/// Clamped to 0..=30.
#[inline]
pub fn media_darkness(level: u8) -> String {
    format!("^MD{}", level.min(30))
}

/// # Print Quantity (^PQ)
#[inline]
pub fn print_quantity(copies: u32) -> String {
    format!("^PQ{}", copies.max(1))
}

/// # Field Origin (^FO)
#[inline]
pub fn field_origin(x: u32, y: u32) -> String {
    format!("^FO{},{}", x, y)
}

/// # Scalable Font (^A0N)
///
/// Font 0 in normal orientation; height and width in dots, at least 1.
#[inline]
pub fn font(height: u32, width: u32) -> String {
    format!("^A0N,{},{}", height.max(1), width.max(1))
}

/// # Field Data (^FD ... ^FS)
///
/// Text containing `^`, `~` or `\` is written with `^FH\` so those bytes
/// become hex escapes instead of commands.
///
/// ```
/// use etiket::zpl::commands::field_data;
///
/// assert_eq!(field_data("Vida"), "^FDVida^FS");
/// assert_eq!(field_data("A^B"), "^FH\\^FDA\\5EB^FS");
/// ```
pub fn field_data(text: &str) -> String {
    if escape::needs_escape(text) {
        format!("^FH\\^FD{}^FS", escape::hex_escape(text))
    } else {
        format!("^FD{}^FS", text)
    }
}

/// # Bar Code Field Default (^BY)
///
/// Module (narrow bar) width in dots, clamped to 1..=10.
#[inline]
pub fn barcode_defaults(module_width: u32) -> String {
    format!("^BY{}", module_width.clamp(1, 10))
}

/// # EAN-13 Bar Code (^BE)
///
/// Normal orientation, interpretation line below, not above.
#[inline]
pub fn ean13(height: u32) -> String {
    format!("^BEN,{},Y,N", height.max(1))
}

/// # Graphic Box (^GB)
///
/// A border `thickness` dots wide. When thickness reaches the smaller side
/// the box is solid, which is how lines are drawn.
#[inline]
pub fn graphic_box(width: u32, height: u32, thickness: u32) -> String {
    format!("^GB{},{},{}^FS", width.max(1), height.max(1), thickness.max(1))
}

/// # Graphic Ellipse (^GE)
///
/// Same thickness rule as `^GB`: half the smaller side fills it.
#[inline]
pub fn graphic_ellipse(width: u32, height: u32, thickness: u32) -> String {
    format!("^GE{},{},{}^FS", width.max(1), height.max(1), thickness.max(1))
}

/// # Graphic Field, ASCII hex (^GFA)
///
/// `data` is packed 1-bit rows, MSB first, 1 = black.
pub fn graphic_field(bytes_per_row: usize, data: &[u8]) -> String {
    let total = data.len();
    let mut hex = String::with_capacity(total * 2);
    for byte in data {
        hex.push_str(&format!("{:02X}", byte));
    }
    format!("^GFA,{},{},{},{}^FS", total, total, bytes_per_row, hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_delimiters() {
        assert_eq!(start_format(), "^XA");
        assert_eq!(end_format(), "^XZ");
    }

    #[test]
    fn test_setup_commands() {
        assert_eq!(print_width(799), "^PW799");
        assert_eq!(label_length(559), "^LL559");
        assert_eq!(label_home(0, 0), "^LH0,0");
        assert_eq!(media_darkness(15), "^MD15");
        assert_eq!(media_darkness(99), "^MD30");
        assert_eq!(print_quantity(0), "^PQ1");
    }

    #[test]
    fn test_field_commands() {
        assert_eq!(field_origin(32, 24), "^FO32,24");
        assert_eq!(font(28, 28), "^A0N,28,28");
        assert_eq!(font(0, 0), "^A0N,1,1");
    }

    #[test]
    fn test_field_data_escapes() {
        assert_eq!(field_data("a~b"), "^FH\\^FDa\\7Eb^FS");
        assert_eq!(field_data("c:\\x"), "^FH\\^FDc:\\5Cx^FS");
        assert_eq!(field_data("Çay Şeker"), "^FDÇay Şeker^FS");
    }

    #[test]
    fn test_barcode_commands() {
        assert_eq!(barcode_defaults(0), "^BY1");
        assert_eq!(barcode_defaults(3), "^BY3");
        assert_eq!(barcode_defaults(40), "^BY10");
        assert_eq!(ean13(96), "^BEN,96,Y,N");
    }

    #[test]
    fn test_graphics() {
        assert_eq!(graphic_box(96, 2, 2), "^GB96,2,2^FS");
        assert_eq!(graphic_ellipse(80, 80, 40), "^GE80,80,40^FS");
        assert_eq!(
            graphic_field(2, &[0xFF, 0x00, 0x0A, 0xB0]),
            "^GFA,4,4,2,FF000AB0^FS"
        );
    }
}
