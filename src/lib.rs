//! # Minuta
//!
//! A page-native PDF generator for procurement reports.
//!
//! Most PDF toolkits lay a document out on an infinite vertical canvas and
//! slice it into pages afterwards. That is how tables lose their headers and
//! section boxes get cut mid-border. Minuta does the opposite: **the page is
//! the fundamental unit of layout.** Every section and every table row is
//! measured against the space left on the current page before anything is
//! drawn, so content flows *into* pages instead of being sliced across them.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       |
//!   [model]         - Report tree: metadata, sections, tables, config
//!       |
//!   [layout]        - Page-aware placement in millimetres
//!       |
//!   [pdf]           - Serialize to PDF bytes
//! ```
//!
//! The supporting cast: [`font`] measures text with Adobe AFM metrics or
//! embedded TrueType faces, [`text`] breaks paragraphs into lines, and
//! [`image_loader`] fetches the optional logo. A missing or broken logo never
//! fails a render; the first page simply starts higher.
//!
//! ## Example
//!
//! ```no_run
//! use minuta::model::{Report, ReportMeta, Section};
//!
//! let report = Report {
//!     meta: ReportMeta {
//!         title: "Relatório de Formalização de Demanda".to_string(),
//!         ..ReportMeta::default()
//!     },
//!     sections: vec![Section::text("1. OBJETO", "Aquisição de material de expediente.")],
//!     ..Report::default()
//! };
//!
//! let rendered = minuta::render(&report)?;
//! rendered.write_to("relatorio.pdf")?;
//! # Ok::<(), minuta::MinutaError>(())
//! ```

pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod text;

pub use error::MinutaError;

use font::FontContext;
use layout::LayoutEngine;
use model::Report;
use pdf::PdfWriter;

/// A finished render: the PDF bytes plus everything a caller needs to hand
/// the file on.
#[derive(Debug)]
pub struct RenderedReport {
    /// The complete PDF file.
    pub bytes: Vec<u8>,
    /// Download filename, from the report metadata or a fixed default.
    pub filename: String,
    /// Number of pages in the document.
    pub page_count: usize,
}

impl RenderedReport {
    /// Writes the PDF to disk.
    pub fn write_to(&self, path: impl AsRef<std::path::Path>) -> Result<(), MinutaError> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }

    /// Encodes the PDF as a `data:application/pdf;base64,...` URI, the form
    /// embedded viewers and preview panes expect.
    pub fn to_data_uri(&self) -> String {
        use base64::Engine as _;
        format!(
            "data:application/pdf;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Renders a report to a PDF.
///
/// This is the primary entry point. Registers any custom fonts, loads the
/// logo if one is configured, lays the sections out page by page, and
/// serializes the result.
pub fn render(report: &Report) -> Result<RenderedReport, MinutaError> {
    let mut fonts = FontContext::new();
    fonts.register_entries(&report.fonts)?;

    let logo = image_loader::load_logo(report.meta.logo.as_deref());

    let engine = LayoutEngine::new();
    let pages = engine.layout(report, &fonts, logo.as_ref())?;

    let writer = PdfWriter::new();
    let bytes = writer.write(&pages, &report.meta, &fonts, logo.as_ref())?;

    Ok(RenderedReport {
        filename: report.meta.suggested_filename().to_string(),
        page_count: pages.len(),
        bytes,
    })
}

/// Renders a report described as JSON.
pub fn render_json(json: &str) -> Result<RenderedReport, MinutaError> {
    let report: Report = serde_json::from_str(json)?;
    render(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{ReportMeta, Section};

    #[test]
    fn minimal_report_renders_one_page() {
        let report = Report {
            meta: ReportMeta {
                title: "Teste".to_string(),
                ..ReportMeta::default()
            },
            sections: vec![Section::text("1. OBJETO", "Uma linha de texto.")],
            ..Report::default()
        };

        let rendered = render(&report).unwrap();
        assert_eq!(rendered.page_count, 1);
        assert_eq!(rendered.filename, "relatorio.pdf");
        assert!(rendered.bytes.starts_with(b"%PDF-1.7"));
    }

    #[test]
    fn data_uri_carries_the_pdf_mime_type() {
        let report = Report::default();
        let rendered = render(&report).unwrap();
        let uri = rendered.to_data_uri();
        assert!(uri.starts_with("data:application/pdf;base64,"));
        // "JVBERi0" is "%PDF-1" in base64.
        assert!(uri["data:application/pdf;base64,".len()..].starts_with("JVBERi0"));
    }

    #[test]
    fn malformed_json_surfaces_a_parse_error() {
        let err = render_json("{not json").unwrap_err();
        assert!(matches!(err, MinutaError::Parse { .. }));
    }

    #[test]
    fn json_round_trips_through_the_full_pipeline() {
        let json = r#"{
            "meta": { "title": "Formalização de Demanda" },
            "sections": [
                { "title": "1. OBJETO", "body": { "type": "text", "text": "Aquisição de materiais." } }
            ]
        }"#;

        let rendered = render_json(json).unwrap();
        assert_eq!(rendered.page_count, 1);
        assert!(rendered.bytes.windows(5).any(|w| w == b"%%EOF"));
    }
}
