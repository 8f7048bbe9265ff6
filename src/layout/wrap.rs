//! Greedy word wrap shared by the preview renderer and the ZPL generator.
//!
//! Both sides measure text with the same fixed advance so a line that fits on
//! screen also fits on the printed label.

/// Average glyph advance as a fraction of the font height.
pub const CHAR_WIDTH_FACTOR: f32 = 0.6;

/// Width of `text` in millimeters at `font_mm`.
pub fn text_width_mm(text: &str, font_mm: f32) -> f32 {
    text.chars().count() as f32 * font_mm * CHAR_WIDTH_FACTOR
}

/// How many characters fit in `width_mm` (at least one).
pub fn chars_per_line(font_mm: f32, width_mm: f32) -> usize {
    let advance = (font_mm * CHAR_WIDTH_FACTOR).max(f32::EPSILON);
    (((width_mm + 1e-4) / advance).floor() as usize).max(1)
}

/// Split `text` into lines.
///
/// Explicit newlines always break. With a wrap width, words are packed
/// greedily; a single word wider than the line stays whole on its own line.
/// Empty input gives no lines.
pub fn wrap_text(text: &str, font_mm: f32, wrap_width_mm: Option<f32>) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let max_chars = wrap_width_mm.map(|w| chars_per_line(font_mm, w));
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let Some(max_chars) = max_chars else {
            lines.push(paragraph.to_string());
            continue;
        };

        let mut current = String::new();
        let mut current_len = 0usize;
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if current_len == 0 {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            }
        }
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_width_keeps_lines() {
        assert_eq!(
            wrap_text("Hello world", 3.0, None),
            vec!["Hello world".to_string()]
        );
        assert_eq!(wrap_text("a\nb", 3.0, None), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(wrap_text("", 3.0, Some(10.0)).is_empty());
    }

    #[test]
    fn test_greedy_packing() {
        // 5mm font → 3mm advance → 10 chars in 30mm
        assert_eq!(chars_per_line(5.0, 30.0), 10);
        let lines = wrap_text("aaa bbb ccc ddd", 5.0, Some(30.0));
        assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn test_exact_fit_stays_on_line() {
        let lines = wrap_text("aaaa bbbbb", 5.0, Some(30.0));
        assert_eq!(lines, vec!["aaaa bbbbb"]);
    }

    #[test]
    fn test_long_word_kept_whole() {
        let lines = wrap_text("x abcdefghijklmnop y", 5.0, Some(15.0));
        assert_eq!(lines, vec!["x", "abcdefghijklmnop", "y"]);
    }

    #[test]
    fn test_newlines_and_wrap_combined() {
        let lines = wrap_text("one two three\nfour", 5.0, Some(24.0));
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // 4 chars, 8 bytes
        assert!((text_width_mm("ğüşı", 5.0) - 12.0).abs() < 1e-4);
        assert_eq!(wrap_text("ğüş ıöç", 5.0, Some(21.0)), vec!["ğüş ıöç"]);
    }
}
