//! Escaping of user text inside `^FD` field data.
//!
//! `^` and `~` start ZPL commands anywhere in the stream, so they can never
//! appear raw in field data. With `^FH\` active, `\` introduces a two-digit
//! hex byte, so it is escaped as well.

/// Characters that cannot appear raw in field data.
pub const RESERVED: [char; 2] = ['^', '~'];

/// Whether `text` needs the `^FH\` hex treatment.
pub fn needs_escape(text: &str) -> bool {
    text.chars().any(|c| RESERVED.contains(&c) || c == '\\')
}

/// Replace `^`, `~` and `\` with `\5E`, `\7E` and `\5C`.
pub fn hex_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '^' => out.push_str("\\5E"),
            '~' => out.push_str("\\7E"),
            '\\' => out.push_str("\\5C"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_escape() {
        assert!(!needs_escape("Plain text 123"));
        assert!(needs_escape("^XZ"));
        assert!(needs_escape("~JA"));
        assert!(needs_escape("back\\slash"));
    }

    #[test]
    fn test_hex_escape() {
        assert_eq!(hex_escape("^XZ~JA"), "\\5EXZ\\7EJA");
        assert_eq!(hex_escape("ığüşöç"), "ığüşöç");
    }
}
