//! EAN-13 symbol modules for the preview, via `barcoders`.

use barcoders::sym::ean13::EAN13;

use crate::zpl::ean13;

/// Bars for a barcode value plus the digits printed under them.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// One entry per module, `true` = bar.
    pub modules: Vec<bool>,
    pub text: String,
}

/// Encode a value the same way the printer will: normalised first, then
/// encoded from its 12 data digits. `None` if the value cannot be printed.
pub fn encode(value: &str) -> Option<Symbol> {
    let code = ean13::normalize(value).ok()?;
    let data = code.value.get(..12)?;
    let symbol = EAN13::new(data).ok()?;
    let modules = symbol.encode().into_iter().map(|m| m == 1).collect();
    Some(Symbol {
        modules,
        text: code.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ean13() {
        let symbol = encode("400638133393").unwrap();
        assert_eq!(symbol.text, "4006381333931");
        assert_eq!(symbol.modules.len(), 95);
        // Start guard 101
        assert_eq!(&symbol.modules[..3], &[true, false, true]);
    }

    #[test]
    fn test_encode_rejects_invalid() {
        assert!(encode("ABC").is_none());
        assert!(encode("").is_none());
    }
}
