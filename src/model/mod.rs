//! # Report Model
//!
//! The input representation for the generator. A report is an ordered list of
//! sections, each rendered as a bordered box with a title band, an optional
//! subtitle band, and a content area. This is designed to be produced by a
//! document-type-specific assembler (demand formalization, technical study,
//! procurement plan, risk plan, terms of reference) or by direct JSON
//! construction.
//!
//! The model is deliberately flat: no nested node trees, no per-node style
//! cascade. Sections carry typed bodies, and everything visual comes from one
//! [`LayoutConfig`] so two runs over the same input are byte-identical.
//!
//! All lengths in this module are millimetres unless a field says otherwise;
//! font sizes are points.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A complete report ready for rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Report metadata: heading, footer text, suggested filename, logo.
    pub meta: ReportMeta,

    /// The ordered sections of the report.
    pub sections: Vec<Section>,

    /// Page geometry and style knobs. Defaults to the A4 profile shared by
    /// all five document types.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Custom fonts to register before layout. Each entry contains the font
    /// family name, base64-encoded font data, weight, and style.
    #[serde(default)]
    pub fonts: Vec<FontEntry>,
}

/// Report metadata drawn on the first page and in the footer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    /// Document heading, drawn centered below the logo box on page 1.
    pub title: String,

    /// Issuing organ or author line, drawn under the heading when present.
    #[serde(default)]
    pub author: Option<String>,

    /// Suggested download filename for the exported byte stream.
    #[serde(default)]
    pub filename: Option<String>,

    /// "Generated on" text for the footer. Supplied by the caller so that
    /// identical input always produces identical bytes; the generator never
    /// reads a clock.
    #[serde(default)]
    pub generated_at: Option<String>,

    /// Logo image source: a file path, a `data:` URI, or raw base64. Load
    /// failure is non-fatal; see `image_loader`.
    #[serde(default)]
    pub logo: Option<String>,
}

impl ReportMeta {
    /// The filename to suggest for download.
    pub fn suggested_filename(&self) -> &str {
        self.filename.as_deref().unwrap_or("relatorio.pdf")
    }
}

/// A custom font to register with the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Font family name (e.g. "Inter", "Roboto").
    pub family: String,
    /// Base64-encoded font data, or a data URI (e.g. "data:font/ttf;base64,...").
    pub src: String,
    /// Font weight (100-900). Defaults to 400.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Whether this is an italic variant.
    #[serde(default)]
    pub italic: bool,
}

fn default_weight() -> u32 {
    400
}

/// A titled, bordered content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Title band text. An empty title still gets its band; the band is
    /// never omitted.
    pub title: String,

    /// Optional subtitle band, drawn in a muted style beneath the title.
    #[serde(default)]
    pub subtitle: Option<String>,

    /// What goes into the content area.
    pub body: SectionBody,
}

impl Section {
    /// A section whose content is wrapped prose.
    pub fn text(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: None,
            body: SectionBody::Text {
                text: body.to_string(),
            },
        }
    }

    /// A section whose content is a list of `label: value` lines.
    pub fn key_values(title: &str, entries: Vec<KeyValue>) -> Self {
        Self {
            title: title.to_string(),
            subtitle: None,
            body: SectionBody::KeyValueList { entries },
        }
    }

    /// A section whose content is an item table.
    pub fn table(title: &str, table: ItemTable) -> Self {
        Self {
            title: title.to_string(),
            subtitle: None,
            body: SectionBody::Table(table),
        }
    }

    /// Attach a subtitle band.
    pub fn with_subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }
}

/// The different kinds of section content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SectionBody {
    /// Wrapped prose. Empty text renders the configured placeholder.
    Text { text: String },

    /// `label: value` lines, one wrapped paragraph per entry.
    KeyValueList { entries: Vec<KeyValue> },

    /// A fixed-column table of item rows.
    Table(ItemTable),
}

/// One entry of a key-value list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// A table with fixed column widths, a header row, and N body rows.
///
/// Rows map column keys to cell values; a row may omit a column, in which
/// case the table's fallback literal is rendered instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTable {
    /// Column plan. Widths are millimetres; their sum must not exceed the
    /// content width between the page margins.
    pub columns: Vec<Column>,

    /// Ordered body rows.
    pub rows: Vec<TableRow>,

    /// Whether the header row is repeated at the top of continuation pages
    /// when the table breaks. Observed source behavior is to draw it once,
    /// so the default is [`HeaderRepeat::Never`].
    #[serde(default)]
    pub header_repeat: HeaderRepeat,

    /// Literal rendered for a missing cell ("N/A", "[A DEFINIR]", ...).
    #[serde(default = "default_missing_value")]
    pub missing_value: String,
}

fn default_missing_value() -> String {
    "N/A".to_string()
}

/// A single table row: column key to cell value.
///
/// A `BTreeMap` keeps serialization order stable, which the byte-identical
/// output guarantee depends on.
pub type TableRow = BTreeMap<String, CellValue>;

/// Column definition for item tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Row key this column reads.
    pub key: String,
    /// Header label, drawn bold and centered.
    pub label: String,
    /// Fixed column width in millimetres.
    pub width: f64,
    /// Content kind; controls alignment and number formatting.
    #[serde(default)]
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(key: &str, label: &str, width: f64) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            width,
            kind: ColumnKind::Text,
        }
    }

    pub fn kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }
}

/// What a column holds. Text is left-aligned; numeric and currency columns
/// are right-aligned, and currency values are formatted per the locale
/// profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKind {
    #[default]
    Text,
    Numeric,
    Currency,
}

/// A cell value: free text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// Header repetition policy for multi-page tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderRepeat {
    /// Header drawn once at table start; continuation pages go straight to
    /// body rows from the top margin.
    #[default]
    Never,
    /// Header redrawn at the top of every page the table touches.
    EveryPage,
}

// ─── Configuration ──────────────────────────────────────────────────────────

/// Everything visual in one place: geometry, section chrome, table chrome,
/// placeholder text, currency locale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    #[serde(default)]
    pub geometry: PageGeometry,

    #[serde(default)]
    pub section: SectionStyle,

    #[serde(default)]
    pub table: TableStyle,

    /// Font family used throughout the report. Defaults to Helvetica; a
    /// registered custom family may be named instead.
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Substituted wherever body text is empty.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Locale profile for currency cells.
    #[serde(default)]
    pub currency: CurrencyProfile,
}

fn default_placeholder() -> String {
    "Não informado".to_string()
}

fn default_font_family() -> String {
    "Helvetica".to_string()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            section: SectionStyle::default(),
            table: TableStyle::default(),
            font_family: default_font_family(),
            placeholder: default_placeholder(),
            currency: CurrencyProfile::default(),
        }
    }
}

/// Page geometry: fixed constants per document type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    /// Page width in millimetres.
    pub page_width: f64,
    /// Page height in millimetres.
    pub page_height: f64,
    /// Page margins in millimetres.
    pub margin: Edges,
    /// Base font size for body text, in points.
    pub base_font_size: f64,
    /// Height of one wrapped text line, in millimetres.
    pub line_height: f64,
    /// Height of the logo box above the content area of page 1.
    pub logo_height: f64,
    /// Where page-1 content starts when the logo failed to load. Smaller
    /// than `margin.top + logo_height`, per the agreed fallback.
    pub fallback_top: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        // The A4 profile all five document types share. The bottom margin
        // puts the content floor at y = 270.
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: Edges {
                top: 15.0,
                right: 10.0,
                bottom: 27.0,
                left: 10.0,
            },
            base_font_size: 10.0,
            line_height: 5.0,
            logo_height: 20.0,
            fallback_top: 20.0,
        }
    }
}

impl PageGeometry {
    /// Horizontal space between the side margins.
    pub fn content_width(&self) -> f64 {
        self.page_width - self.margin.horizontal()
    }

    /// The y coordinate content must not cross (the bottom margin line).
    pub fn content_bottom(&self) -> f64 {
        self.page_height - self.margin.bottom
    }

    /// Where the cursor starts on the first page.
    pub fn first_page_top(&self, logo_drawn: bool) -> f64 {
        if logo_drawn {
            self.margin.top + self.logo_height
        } else {
            self.fallback_top
        }
    }

    /// Vertical space available on an empty continuation page.
    pub fn full_page_space(&self) -> f64 {
        self.content_bottom() - self.margin.top
    }
}

/// Edge values (top, right, bottom, left) in millimetres.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Chrome for section boxes: band metrics, padding, separator, gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionStyle {
    /// Title font size in points (drawn bold).
    pub title_font_size: f64,
    /// Subtitle font size in points.
    pub subtitle_font_size: f64,
    /// Height of one title line in millimetres.
    pub title_line_height: f64,
    /// Height of one subtitle line in millimetres.
    pub subtitle_line_height: f64,
    /// Fixed padding added to each band's wrapped height.
    pub band_padding: f64,
    /// Padding around the content area inside the box.
    pub content_padding: f64,
    /// Vertical gap between a section box and the next.
    pub gap: f64,
    /// Border gray level (0 = black, 1 = white).
    pub border_gray: f64,
    /// Separator line gray level.
    pub separator_gray: f64,
    /// Subtitle text gray level (muted).
    pub subtitle_gray: f64,
}

impl Default for SectionStyle {
    fn default() -> Self {
        Self {
            title_font_size: 11.0,
            subtitle_font_size: 9.0,
            title_line_height: 6.0,
            subtitle_line_height: 5.0,
            band_padding: 2.0,
            content_padding: 3.0,
            gap: 6.0,
            border_gray: 0.0,
            separator_gray: 0.0,
            subtitle_gray: 0.35,
        }
    }
}

/// Chrome for item tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStyle {
    /// Table font size in points (header and body).
    pub font_size: f64,
    /// Padding above and below cell text. A one-line row is
    /// `line_height + 2 * cell_padding` tall.
    pub cell_padding: f64,
    /// Header row fill gray level.
    pub header_fill_gray: f64,
    /// Cell rule gray level.
    pub rule_gray: f64,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            font_size: 9.0,
            cell_padding: 2.5,
            header_fill_gray: 0.85,
            rule_gray: 0.0,
        }
    }
}

/// Currency locale profile: fixed two decimals, configured separators. The
/// default is the Brazilian profile (thousands `.`, decimal `,`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyProfile {
    pub thousands_sep: String,
    pub decimal_sep: String,
    /// Optional prefix such as `"R$"`, separated from the amount by a space.
    #[serde(default)]
    pub symbol: Option<String>,
}

impl Default for CurrencyProfile {
    fn default() -> Self {
        Self {
            thousands_sep: ".".to_string(),
            decimal_sep: ",".to_string(),
            symbol: None,
        }
    }
}

impl CurrencyProfile {
    /// Format a value with fixed two decimals and grouped thousands:
    /// `1234567.5` becomes `1.234.567,50`.
    pub fn format(&self, value: f64) -> String {
        let negative = value < 0.0;
        let cents = (value.abs() * 100.0).round() as u64;
        let whole = cents / 100;
        let frac = cents % 100;

        let digits = whole.to_string();
        let mut grouped = String::new();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push_str(&self.thousands_sep);
            }
            grouped.push(c);
        }

        let mut out = String::new();
        if let Some(symbol) = &self.symbol {
            out.push_str(symbol);
            out.push(' ');
        }
        if negative {
            out.push('-');
        }
        out.push_str(&grouped);
        out.push_str(&self.decimal_sep);
        out.push_str(&format!("{:02}", frac));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry_matches_a4_profile() {
        let g = PageGeometry::default();
        assert_eq!(g.content_width(), 190.0);
        assert_eq!(g.content_bottom(), 270.0);
        assert_eq!(g.first_page_top(true), 35.0);
        assert_eq!(g.first_page_top(false), 20.0);
    }

    #[test]
    fn report_parses_from_json() {
        let json = r#"{
            "meta": { "title": "DOCUMENTO DE FORMALIZAÇÃO DA DEMANDA" },
            "sections": [
                { "title": "1. OBJETO", "body": { "type": "text", "text": "Aquisição de material." } },
                { "title": "2. ITENS", "body": { "type": "table",
                    "columns": [
                        { "key": "item", "label": "ITEM", "width": 20 },
                        { "key": "valor", "label": "VALOR", "width": 40, "kind": "currency" }
                    ],
                    "rows": [ { "item": "Caneta", "valor": 3.5 } ]
                } }
            ]
        }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.sections.len(), 2);
        match &report.sections[1].body {
            SectionBody::Table(t) => {
                assert_eq!(t.header_repeat, HeaderRepeat::Never);
                assert_eq!(t.missing_value, "N/A");
                assert_eq!(t.rows[0]["valor"], CellValue::Number(3.5));
            }
            other => panic!("expected table body, got {:?}", other),
        }
    }

    #[test]
    fn currency_profile_formats_brazilian_style() {
        let p = CurrencyProfile::default();
        assert_eq!(p.format(0.0), "0,00");
        assert_eq!(p.format(3.5), "3,50");
        assert_eq!(p.format(1234567.5), "1.234.567,50");
        assert_eq!(p.format(-42.0), "-42,00");

        let with_symbol = CurrencyProfile {
            symbol: Some("R$".to_string()),
            ..CurrencyProfile::default()
        };
        assert_eq!(with_symbol.format(1000.0), "R$ 1.000,00");
    }

    #[test]
    fn config_defaults_are_not_empty() {
        let c = LayoutConfig::default();
        assert_eq!(c.placeholder, "Não informado");
        assert_eq!(c.font_family, "Helvetica");
        let parsed: LayoutConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.placeholder, c.placeholder);
    }

    #[test]
    fn missing_filename_falls_back() {
        let meta = ReportMeta {
            title: "PLANO DE GERENCIAMENTO DE RISCOS".to_string(),
            ..ReportMeta::default()
        };
        assert_eq!(meta.suggested_filename(), "relatorio.pdf");
    }
}
