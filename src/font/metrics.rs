//! Metrics for the built-in standard PDF fonts.
//!
//! Width tables come from the Adobe AFM files, in 1/1000 em units, indexed
//! by WinAnsi code starting at 0x20. Oblique variants share their upright
//! widths; Courier is fixed-pitch at 600 units. Characters outside
//! WinAnsiEncoding measure (and later render) as `?`, so measurement and
//! painting can never disagree about a line's width.

use super::StandardFont;

/// Measurement interface for one standard font.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    widths: &'static [u16; 224],
    /// Typographic ascender in 1/1000 em.
    pub ascender: i16,
    /// Typographic descender in 1/1000 em (negative).
    pub descender: i16,
}

impl StandardFontMetrics {
    /// Advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let code = winansi_code(ch).unwrap_or(b'?');
        let units = self.widths[(code - 0x20) as usize];
        f64::from(units) * font_size / 1000.0
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }

    /// Distance from baseline to the top of the em box, in points.
    pub fn ascent(&self, font_size: f64) -> f64 {
        f64::from(self.ascender) * font_size / 1000.0
    }
}

impl StandardFont {
    /// Metrics table for this font.
    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            StandardFont::Helvetica | StandardFont::HelveticaOblique => StandardFontMetrics {
                widths: &HELVETICA_WIDTHS,
                ascender: 718,
                descender: -207,
            },
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => {
                StandardFontMetrics {
                    widths: &HELVETICA_BOLD_WIDTHS,
                    ascender: 718,
                    descender: -207,
                }
            }
            StandardFont::Courier
            | StandardFont::CourierBold
            | StandardFont::CourierOblique
            | StandardFont::CourierBoldOblique => StandardFontMetrics {
                widths: &COURIER_WIDTHS,
                ascender: 629,
                descender: -157,
            },
        }
    }
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Codepoints in 0x20..=0x7E and
/// 0xA0..=0xFF map directly. The 0x80..=0x9F range contains special
/// mappings for smart quotes, bullets, dashes, etc.
pub fn winansi_code(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82), // Single low-9 quotation mark
        0x0192 => Some(0x83), // Latin small letter f with hook
        0x201E => Some(0x84), // Double low-9 quotation mark
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86), // Dagger
        0x2021 => Some(0x87), // Double dagger
        0x02C6 => Some(0x88), // Modifier letter circumflex accent
        0x2030 => Some(0x89), // Per mille sign
        0x0160 => Some(0x8A), // Latin capital letter S with caron
        0x2039 => Some(0x8B), // Single left-pointing angle quotation
        0x0152 => Some(0x8C), // Latin capital ligature OE
        0x017D => Some(0x8E), // Latin capital letter Z with caron
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98), // Small tilde
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A), // Latin small letter s with caron
        0x203A => Some(0x9B), // Single right-pointing angle quotation
        0x0153 => Some(0x9C), // Latin small ligature oe
        0x017E => Some(0x9E), // Latin small letter z with caron
        0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
        _ => None,
    }
}

/// Reverse of [`winansi_code`]: the character a WinAnsi byte stands for.
pub fn winansi_char(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E => Some(code as char),
        0xA0..=0xFF => char::from_u32(code as u32),
        0x80 => Some('\u{20AC}'),
        0x82 => Some('\u{201A}'),
        0x83 => Some('\u{0192}'),
        0x84 => Some('\u{201E}'),
        0x85 => Some('\u{2026}'),
        0x86 => Some('\u{2020}'),
        0x87 => Some('\u{2021}'),
        0x88 => Some('\u{02C6}'),
        0x89 => Some('\u{2030}'),
        0x8A => Some('\u{0160}'),
        0x8B => Some('\u{2039}'),
        0x8C => Some('\u{0152}'),
        0x8E => Some('\u{017D}'),
        0x91 => Some('\u{2018}'),
        0x92 => Some('\u{2019}'),
        0x93 => Some('\u{201C}'),
        0x94 => Some('\u{201D}'),
        0x95 => Some('\u{2022}'),
        0x96 => Some('\u{2013}'),
        0x97 => Some('\u{2014}'),
        0x98 => Some('\u{02DC}'),
        0x99 => Some('\u{2122}'),
        0x9A => Some('\u{0161}'),
        0x9B => Some('\u{203A}'),
        0x9C => Some('\u{0153}'),
        0x9E => Some('\u{017E}'),
        0x9F => Some('\u{0178}'),
        _ => None,
    }
}

// Helvetica.afm character widths, WinAnsi order. Unassigned slots are 0 and
// unreachable through winansi_code.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 224] = [
    //  x0    x1    x2    x3    x4    x5    x6    x7
    278,  278,  355,  556,  556,  889,  667,  191, // 0x20 space ! " # $ % & '
    333,  333,  389,  584,  278,  333,  278,  278, // 0x28 ( ) * + , - . /
    556,  556,  556,  556,  556,  556,  556,  556, // 0x30 0-7
    556,  556,  278,  278,  584,  584,  584,  556, // 0x38 8 9 : ; < = > ?
    1015, 667,  667,  722,  722,  667,  611,  778, // 0x40 @ A-G
    722,  278,  500,  667,  556,  833,  722,  778, // 0x48 H-O
    667,  778,  722,  667,  611,  722,  667,  944, // 0x50 P-W
    667,  667,  611,  278,  278,  278,  469,  556, // 0x58 X Y Z [ \ ] ^ _
    333,  556,  556,  500,  556,  556,  278,  556, // 0x60 ` a-g
    556,  222,  222,  500,  222,  833,  556,  556, // 0x68 h-o
    556,  556,  333,  500,  278,  556,  500,  722, // 0x70 p-w
    500,  500,  500,  334,  260,  334,  584,  0,   // 0x78 x y z { | } ~
    556,  0,    222,  556,  333,  1000, 556,  556, // 0x80 € ‚ ƒ „ … † ‡
    333,  1000, 667,  333,  1000, 0,    611,  0,   // 0x88 ˆ ‰ Š ‹ Œ Ž
    0,    222,  222,  333,  333,  350,  556,  1000,// 0x90 ' ' " " • – —
    333,  1000, 500,  333,  944,  0,    500,  667, // 0x98 ˜ ™ š › œ ž Ÿ
    278,  333,  556,  556,  556,  556,  260,  556, // 0xA0 nbsp ¡ ¢ £ ¤ ¥ ¦ §
    333,  737,  370,  556,  584,  333,  737,  333, // 0xA8 ¨ © ª « ¬ shy ® ¯
    400,  584,  333,  333,  333,  556,  537,  278, // 0xB0 ° ± ² ³ ´ µ ¶ ·
    333,  333,  365,  556,  834,  834,  834,  611, // 0xB8 ¸ ¹ º » ¼ ½ ¾ ¿
    667,  667,  667,  667,  667,  667,  1000, 722, // 0xC0 À Á Â Ã Ä Å Æ Ç
    667,  667,  667,  667,  278,  278,  278,  278, // 0xC8 È É Ê Ë Ì Í Î Ï
    722,  722,  778,  778,  778,  778,  778,  584, // 0xD0 Ð Ñ Ò Ó Ô Õ Ö ×
    778,  722,  722,  722,  722,  667,  667,  611, // 0xD8 Ø Ù Ú Û Ü Ý Þ ß
    556,  556,  556,  556,  556,  556,  889,  500, // 0xE0 à á â ã ä å æ ç
    556,  556,  556,  556,  278,  278,  278,  278, // 0xE8 è é ê ë ì í î ï
    556,  556,  556,  556,  556,  556,  556,  584, // 0xF0 ð ñ ò ó ô õ ö ÷
    611,  556,  556,  556,  556,  500,  556,  500, // 0xF8 ø ù ú û ü ý þ ÿ
];

// Helvetica-Bold.afm character widths, WinAnsi order.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 224] = [
    //  x0    x1    x2    x3    x4    x5    x6    x7
    278,  333,  474,  556,  556,  889,  722,  238, // 0x20
    333,  333,  389,  584,  278,  333,  278,  278, // 0x28
    556,  556,  556,  556,  556,  556,  556,  556, // 0x30
    556,  556,  333,  333,  584,  584,  584,  611, // 0x38
    975,  722,  722,  722,  722,  667,  611,  778, // 0x40
    722,  278,  556,  722,  611,  833,  722,  778, // 0x48
    667,  778,  722,  667,  611,  722,  667,  944, // 0x50
    667,  667,  611,  333,  278,  333,  584,  556, // 0x58
    333,  556,  611,  556,  611,  556,  333,  611, // 0x60
    611,  278,  278,  556,  278,  889,  611,  611, // 0x68
    611,  611,  389,  556,  333,  611,  556,  778, // 0x70
    556,  556,  500,  389,  280,  389,  584,  0,   // 0x78
    556,  0,    278,  556,  500,  1000, 556,  556, // 0x80
    333,  1000, 667,  333,  1000, 0,    611,  0,   // 0x88
    0,    278,  278,  500,  500,  350,  556,  1000,// 0x90
    333,  1000, 556,  333,  944,  0,    500,  667, // 0x98
    278,  333,  556,  556,  556,  556,  280,  556, // 0xA0
    333,  737,  370,  556,  584,  333,  737,  333, // 0xA8
    400,  584,  333,  333,  333,  611,  556,  278, // 0xB0
    333,  333,  365,  556,  834,  834,  834,  611, // 0xB8
    722,  722,  722,  722,  722,  722,  1000, 722, // 0xC0
    667,  667,  667,  667,  278,  278,  278,  278, // 0xC8
    722,  722,  778,  778,  778,  778,  778,  584, // 0xD0
    778,  722,  722,  722,  722,  667,  667,  611, // 0xD8
    556,  556,  556,  556,  556,  556,  889,  556, // 0xE0
    556,  556,  556,  556,  278,  278,  278,  278, // 0xE8
    611,  611,  611,  611,  611,  611,  611,  584, // 0xF0
    611,  611,  611,  611,  611,  556,  611,  556, // 0xF8
];

// Courier is fixed-pitch: every glyph advances 600 units.
const COURIER_WIDTHS: [u16; 224] = [600; 224];
