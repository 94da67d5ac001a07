//! Structured error types for the Minuta report generator.
//!
//! Every failure the public API can produce lands in [`MinutaError`]. Layout
//! composition problems (content that cannot fit any page, column plans wider
//! than the content area) get dedicated variants so callers can show the
//! offending section instead of a generic "render failed".

use thiserror::Error;

/// The unified error type returned by all public Minuta API functions.
#[derive(Debug, Error)]
pub enum MinutaError {
    /// JSON input failed to deserialize as a report.
    #[error("failed to parse report: {source}{hint}")]
    Parse {
        source: serde_json::Error,
        /// Display-ready suffix, empty or `"\n  hint: ..."`.
        hint: String,
    },

    /// A font could not be parsed or registered.
    #[error("font error: {0}")]
    Font(String),

    /// A section is taller than the content area of an empty page, so no
    /// amount of page breaking can place it.
    #[error("section '{title}' needs {needed_mm:.1} mm but an empty page offers {available_mm:.1} mm")]
    SectionTooTall {
        title: String,
        needed_mm: f64,
        available_mm: f64,
    },

    /// A single table row is taller than the content area of an empty page.
    #[error("table row {row} in section '{title}' needs {needed_mm:.1} mm but an empty page offers {available_mm:.1} mm")]
    RowTooTall {
        title: String,
        row: usize,
        needed_mm: f64,
        available_mm: f64,
    },

    /// The fixed column widths of a table add up to more than the content
    /// width between the page margins.
    #[error("table in section '{title}' is {total_mm:.1} mm wide but the content area is {available_mm:.1} mm")]
    TableTooWide {
        title: String,
        total_mm: f64,
        available_mm: f64,
    },

    /// PDF serialization failed.
    #[error("render error: {0}")]
    Render(String),

    /// Writing the finished PDF to disk failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for MinutaError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "\n  hint: check for trailing commas, missing quotes, or unescaped characters"
            }
            serde_json::error::Category::Data => {
                "\n  hint: the JSON is valid but does not match the report schema; check field names and types"
            }
            serde_json::error::Category::Eof => {
                "\n  hint: unexpected end of input, is the JSON truncated?"
            }
            serde_json::error::Category::Io => "",
        };
        MinutaError::Parse {
            source: e,
            hint: hint.to_string(),
        }
    }
}
