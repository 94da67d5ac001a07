//! # Font Management
//!
//! Measurement and registration of the fonts a report draws with.
//!
//! The built-in repertoire is the Helvetica and Courier families of the 14
//! standard PDF fonts, which need no embedding. Caller-supplied TrueType
//! faces are parsed with `ttf-parser` for real metrics and embedded by the
//! PDF serializer with WinAnsi encoding.
//!
//! Layout works in millimetres, so the public measurement methods here
//! return millimetres; the raw AFM/ttf tables underneath are per-em units.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::error::MinutaError;
use crate::model::FontEntry;
use base64::Engine as _;
use std::collections::HashMap;

/// Millimetres per PostScript point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;
/// PostScript points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// A font registry that maps font family + weight + style to font data.
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the built-in standard PDF fonts. No embedding needed.
    Standard(StandardFont),
    /// A TrueType font that gets embedded.
    Custom {
        data: Vec<u8>,
        metrics: CustomFontMetrics,
    },
}

/// Parsed metrics from a TrueType font via ttf-parser. Only the WinAnsi
/// repertoire is sampled, since that is all the serializer can encode.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
}

impl CustomFontMetrics {
    /// Advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (f64::from(w) / f64::from(self.units_per_em)) * font_size
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        // 0x2122 (trade mark sign) is the highest codepoint WinAnsi covers.
        for ch in (0x20u32..=0x2122).filter_map(char::from_u32) {
            if metrics::winansi_code(ch).is_none() {
                continue;
            }
            if let Some(glyph_id) = face.glyph_index(ch) {
                let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                advance_widths.insert(ch, advance);
                if ch == ' ' {
                    default_advance = advance;
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender,
            descender,
        })
    }
}

/// The built-in standard PDF fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();

        let standard_mappings = vec![
            (("Helvetica", 400, false), StandardFont::Helvetica),
            (("Helvetica", 700, false), StandardFont::HelveticaBold),
            (("Helvetica", 400, true), StandardFont::HelveticaOblique),
            (("Helvetica", 700, true), StandardFont::HelveticaBoldOblique),
            (("Courier", 400, false), StandardFont::Courier),
            (("Courier", 700, false), StandardFont::CourierBold),
            (("Courier", 400, true), StandardFont::CourierOblique),
            (("Courier", 700, true), StandardFont::CourierBoldOblique),
        ];

        for ((family, weight, italic), font) in standard_mappings {
            fonts.insert(
                FontKey {
                    family: family.to_string(),
                    weight,
                    italic,
                },
                FontData::Standard(font),
            );
        }

        Self { fonts }
    }

    /// Look up a font, falling back to Helvetica if not found.
    pub fn resolve(&self, family: &str, weight: u32, italic: bool) -> &FontData {
        let key = FontKey {
            family: family.to_string(),
            weight,
            italic,
        };
        if let Some(font) = self.fonts.get(&key) {
            return font;
        }

        // Snap the weight to 400 or 700 and retry.
        let snapped_weight = if weight >= 600 { 700 } else { 400 };
        let key = FontKey {
            family: family.to_string(),
            weight: snapped_weight,
            italic,
        };
        if let Some(font) = self.fonts.get(&key) {
            return font;
        }

        log::debug!(
            "font '{}' (weight {}, italic {}) not registered, falling back to Helvetica",
            family,
            weight,
            italic
        );
        let key = FontKey {
            family: "Helvetica".to_string(),
            weight: snapped_weight,
            italic,
        };
        self.fonts.get(&key).unwrap_or_else(|| {
            self.fonts
                .get(&FontKey {
                    family: "Helvetica".to_string(),
                    weight: 400,
                    italic: false,
                })
                .expect("Helvetica must be registered")
        })
    }

    /// Register a custom font from raw TrueType bytes.
    pub fn register(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        data: Vec<u8>,
    ) -> Result<(), MinutaError> {
        let metrics = CustomFontMetrics::from_font_data(&data).ok_or_else(|| {
            MinutaError::Font(format!("could not parse font data for family '{}'", family))
        })?;
        self.fonts.insert(
            FontKey {
                family: family.to_string(),
                weight,
                italic,
            },
            FontData::Custom { data, metrics },
        );
        Ok(())
    }

    /// Iterate over all registered fonts.
    pub fn iter(&self) -> impl Iterator<Item = (&FontKey, &FontData)> {
        self.fonts.iter()
    }
}

/// Shared font context used by layout and PDF serialization.
/// Provides text measurement with real glyph metrics, in millimetres.
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Register every font entry of a report before layout begins.
    pub fn register_entries(&mut self, entries: &[FontEntry]) -> Result<(), MinutaError> {
        for entry in entries {
            let data = decode_font_src(&entry.src)?;
            self.registry
                .register(&entry.family, entry.weight, entry.italic, data)?;
        }
        Ok(())
    }

    /// Advance width of a single character, in millimetres.
    pub fn char_width(
        &self,
        ch: char,
        family: &str,
        weight: u32,
        italic: bool,
        font_size: f64,
    ) -> f64 {
        let pt = match self.registry.resolve(family, weight, italic) {
            FontData::Standard(std_font) => std_font.metrics().char_width(ch, font_size),
            FontData::Custom { metrics, .. } => metrics.char_width(ch, font_size),
        };
        pt * MM_PER_PT
    }

    /// Width of a string, in millimetres.
    pub fn measure(&self, text: &str, family: &str, weight: u32, italic: bool, font_size: f64) -> f64 {
        let pt = match self.registry.resolve(family, weight, italic) {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font_size),
            FontData::Custom { metrics, .. } => metrics.measure_string(text, font_size),
        };
        pt * MM_PER_PT
    }

    /// Baseline-to-top distance of a font at a size, in millimetres.
    pub fn ascent(&self, family: &str, weight: u32, italic: bool, font_size: f64) -> f64 {
        let pt = match self.registry.resolve(family, weight, italic) {
            FontData::Standard(std_font) => std_font.metrics().ascent(font_size),
            FontData::Custom { metrics, .. } => {
                (f64::from(metrics.ascender) / f64::from(metrics.units_per_em)) * font_size
            }
        };
        pt * MM_PER_PT
    }

    /// Resolve a font key to its font data.
    pub fn resolve(&self, family: &str, weight: u32, italic: bool) -> &FontData {
        self.registry.resolve(family, weight, italic)
    }

    /// Access the underlying font registry.
    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }
}

/// Decode a font source string: a `data:` URI or raw base64.
fn decode_font_src(src: &str) -> Result<Vec<u8>, MinutaError> {
    let payload = match src.split_once("base64,") {
        Some((_, rest)) => rest,
        None => src,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| MinutaError::Font(format!("invalid base64 font data: {}", e)))
}
