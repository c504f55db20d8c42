//! Advance widths of the regular Helvetica built-in font.

/// Widths of `' '..='~'` in thousandths of an em (Adobe Helvetica AFM).
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Width of `?`, which stands in for anything outside printable ASCII.
const REPLACEMENT_WIDTH: u16 = 556;

const MM_PER_POINT: f32 = 25.4 / 72.0;

fn char_units(c: char) -> u16 {
    u32::from(c)
        .checked_sub(u32::from(' '))
        .and_then(|index| HELVETICA_WIDTHS.get(index as usize))
        .copied()
        .unwrap_or(REPLACEMENT_WIDTH)
}

/// Width of one character in millimetres at `font_size` points.
pub fn char_width_mm(c: char, font_size: f32) -> f32 {
    f32::from(char_units(c)) * font_size / 1000.0 * MM_PER_POINT
}

/// Width of `text` in millimetres at `font_size` points.
pub fn text_width_mm(text: &str, font_size: f32) -> f32 {
    text.chars().map(|c| char_width_mm(c, font_size)).sum()
}
