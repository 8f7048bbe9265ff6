//! EAN-13 value normalisation.
//!
//! ## Check Digit
//!
//! ```text
//! digits d1..d12, weights from the right: 3, 1, 3, 1, ...
//! sum   = Σ weight(i) * d(i)
//! check = (10 - sum % 10) % 10
//!
//! 400638133393 → sum 89 → check 1 → 4006381333931
//! ```
//!
//! Shorter numeric input is left-padded with zeros to 12 digits, the way
//! the printer firmware pads `^BE` data.

use crate::error::ValidationIssue;

/// A barcode value ready for `^FD`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ean13 {
    /// 13 digits.
    pub value: String,
    /// Set when a 13-digit input failed its checksum; `value` is then the
    /// input exactly as entered.
    pub issue: Option<ValidationIssue>,
}

/// Compute the check digit for 12 data digits.
pub fn check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| d as u32 * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Normalise user input to a 13-digit EAN-13 value.
///
/// - up to 12 digits: zero-padded to 12, check digit appended
/// - 13 digits: check digit verified; a mismatch keeps the entered value and
///   reports [`ValidationIssue::ChecksumMismatch`]
/// - anything else: error, the barcode is not printed
pub fn normalize(input: &str) -> Result<Ean13, ValidationIssue> {
    let value = input.trim();
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationIssue::BarcodeNotNumeric {
            value: value.to_string(),
        });
    }
    let len = value.len();
    if len == 0 || len > 13 {
        return Err(ValidationIssue::BarcodeLength {
            value: value.to_string(),
            len,
        });
    }

    if len == 13 {
        let digits: Vec<u8> = value.bytes().map(|b| b - b'0').collect();
        let expected = check_digit(&digits[..12]);
        let found = digits[12];
        let issue = (expected != found).then(|| ValidationIssue::ChecksumMismatch {
            value: value.to_string(),
            expected,
            found,
        });
        return Ok(Ean13 {
            value: value.to_string(),
            issue,
        });
    }

    let padded = format!("{:0>12}", value);
    let digits: Vec<u8> = padded.bytes().map(|b| b - b'0').collect();
    let check = check_digit(&digits);
    Ok(Ean13 {
        value: format!("{}{}", padded, check),
        issue: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_digit_reference() {
        let digits: Vec<u8> = "400638133393".bytes().map(|b| b - b'0').collect();
        assert_eq!(check_digit(&digits), 1);
        let digits: Vec<u8> = "590123412345".bytes().map(|b| b - b'0').collect();
        assert_eq!(check_digit(&digits), 7);
    }

    #[test]
    fn test_twelve_digits_appends_check() {
        let code = normalize("400638133393").unwrap();
        assert_eq!(code.value, "4006381333931");
        assert!(code.issue.is_none());
    }

    #[test]
    fn test_thirteen_digits_valid() {
        let code = normalize(" 5901234123457 ").unwrap();
        assert_eq!(code.value, "5901234123457");
        assert!(code.issue.is_none());
    }

    #[test]
    fn test_thirteen_digits_mismatch_keeps_value() {
        let code = normalize("4006381333935").unwrap();
        assert_eq!(code.value, "4006381333935");
        assert_eq!(
            code.issue,
            Some(ValidationIssue::ChecksumMismatch {
                value: "4006381333935".into(),
                expected: 1,
                found: 5,
            })
        );
    }

    #[test]
    fn test_short_input_padded() {
        let code = normalize("12345").unwrap();
        assert_eq!(code.value.len(), 13);
        assert!(code.value.starts_with("0000000"));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            normalize("12AB"),
            Err(ValidationIssue::BarcodeNotNumeric { .. })
        ));
        assert!(matches!(
            normalize("12345678901234"),
            Err(ValidationIssue::BarcodeLength { len: 14, .. })
        ));
        assert!(matches!(
            normalize(""),
            Err(ValidationIssue::BarcodeLength { len: 0, .. })
        ));
    }
}
