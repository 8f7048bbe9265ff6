//! Glyph bitmaps for preview text.
//!
//! Uses the Spleen 12x24 bitmap font and scales each cell to the label's font
//! height. The advance is `0.6 × height`, the same metric the word wrap uses,
//! so line breaks on screen match the printed ones.

use std::collections::HashMap;

use spleen_font::{FONT_12X24, PSF2Font};

pub const GLYPH_WIDTH: usize = 12;
pub const GLYPH_HEIGHT: usize = 24;

/// A 12x24 bitmap, row-major, `true` = ink.
pub type Glyph = Vec<bool>;

/// Per-render glyph cache.
#[derive(Debug, Default)]
pub struct GlyphCache {
    glyphs: HashMap<char, Glyph>,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, ch: char) -> &Glyph {
        self.glyphs.entry(ch).or_insert_with(|| load_glyph(ch))
    }
}

fn load_glyph(ch: char) -> Glyph {
    if ch == ' ' {
        return vec![false; GLYPH_WIDTH * GLYPH_HEIGHT];
    }
    if let Some(glyph) = spleen_glyph(ch) {
        return glyph;
    }
    // Letters outside the font's coverage fall back to their base letter
    if let Some(base) = base_letter(ch)
        && let Some(glyph) = spleen_glyph(base)
    {
        return glyph;
    }
    box_glyph()
}

fn spleen_glyph(ch: char) -> Option<Glyph> {
    let mut spleen = PSF2Font::new(FONT_12X24).ok()?;
    let utf8 = ch.to_string();
    let rows = spleen.glyph_for_utf8(utf8.as_bytes())?;

    let mut glyph = vec![false; GLYPH_WIDTH * GLYPH_HEIGHT];
    for (row_y, row) in rows.enumerate() {
        for (col_x, on) in row.enumerate() {
            if row_y < GLYPH_HEIGHT && col_x < GLYPH_WIDTH {
                glyph[row_y * GLYPH_WIDTH + col_x] = on;
            }
        }
    }
    Some(glyph)
}

fn base_letter(ch: char) -> Option<char> {
    Some(match ch {
        'ğ' => 'g',
        'Ğ' => 'G',
        'ş' => 's',
        'Ş' => 'S',
        'ı' => 'i',
        'İ' => 'I',
        _ => return None,
    })
}

/// Hollow box for characters with no glyph.
fn box_glyph() -> Glyph {
    let mut glyph = vec![false; GLYPH_WIDTH * GLYPH_HEIGHT];
    for y in 4..GLYPH_HEIGHT - 4 {
        for x in 2..GLYPH_WIDTH - 2 {
            let edge = y == 4 || y == GLYPH_HEIGHT - 5 || x == 2 || x == GLYPH_WIDTH - 3;
            glyph[y * GLYPH_WIDTH + x] = edge;
        }
    }
    glyph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_glyph_has_ink() {
        let mut cache = GlyphCache::new();
        assert!(cache.get('A').iter().any(|&on| on));
        assert!(cache.get(' ').iter().all(|&on| !on));
    }

    #[test]
    fn test_turkish_letters_never_blank() {
        let mut cache = GlyphCache::new();
        for ch in ['ğ', 'Ş', 'ı', 'İ', 'ü', 'ç', 'Ö'] {
            assert!(cache.get(ch).iter().any(|&on| on), "{ch} is blank");
        }
    }
}
