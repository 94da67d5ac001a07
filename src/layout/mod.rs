//! # Page Layout
//!
//! The page-break controller. Walks the report's sections in order, measures
//! every block before anything is drawn, and starts a new page whenever a
//! block would cross the content floor. Output is one flat list of draw
//! commands per page; coordinates are millimetres from the top-left page
//! corner with y growing downward, so the PDF serializer can paint without
//! re-measuring.
//!
//! Fit checks are strict `>` throughout: a block whose bottom lands exactly
//! on the content floor stays on the current page.

mod section;
mod table;

pub use section::SectionFrame;

use crate::error::MinutaError;
use crate::font::FontContext;
use crate::image_loader::LoadedImage;
use crate::model::{PageGeometry, Report, SectionBody};
use crate::text::TextLayout;

/// Report heading font size in points (bold, centered on page 1).
const HEADING_FONT_SIZE: f64 = 13.0;
/// Gap between the heading block and the first section, in millimetres.
const HEADING_GAP: f64 = 4.0;
/// Footer line offset below the content floor, in millimetres.
const FOOTER_OFFSET: f64 = 5.0;
/// Footer font size in points.
const FOOTER_FONT_SIZE: f64 = 8.0;
/// Footer text gray level.
const FOOTER_GRAY: f64 = 0.35;
/// Stroke width of section borders, in millimetres.
pub(crate) const BORDER_WIDTH: f64 = 0.3;
/// Stroke width of separators and table rules, in millimetres.
pub(crate) const RULE_WIDTH: f64 = 0.2;

/// One finished page: fixed dimensions plus everything drawn on it.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    /// Page width in millimetres.
    pub width: f64,
    /// Page height in millimetres.
    pub height: f64,
    /// Draw commands in paint order.
    pub commands: Vec<DrawCommand>,
}

/// A drawing primitive the PDF serializer knows how to paint. Coordinates
/// are millimetres from the top-left page corner.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// A rectangle, filled and/or stroked.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        /// Fill gray level; `None` leaves the interior unpainted.
        fill_gray: Option<f64>,
        /// Stroke gray level; `None` draws no outline.
        stroke_gray: Option<f64>,
        /// Stroke width in millimetres.
        stroke_width: f64,
    },
    /// A straight line segment.
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        gray: f64,
        width: f64,
    },
    /// One line of text. `y` is the top of the line box; the serializer
    /// drops to the baseline using the font's ascent.
    Text(TextSpan),
    /// The report logo, scaled into the given box.
    Image { x: f64, y: f64, width: f64, height: f64 },
}

/// A positioned single-line text run.
#[derive(Debug, Clone)]
pub struct TextSpan {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub family: String,
    pub weight: u32,
    pub italic: bool,
    /// Font size in points.
    pub font_size: f64,
    pub gray: f64,
}

/// Write position on the page being assembled. `y` only moves down, and
/// resets to the top margin when a new page starts.
pub(crate) struct PageCursor {
    pub(crate) geometry: PageGeometry,
    pub(crate) y: f64,
    pub(crate) page_index: usize,
    commands: Vec<DrawCommand>,
}

impl PageCursor {
    fn new(geometry: &PageGeometry, top: f64) -> Self {
        Self {
            geometry: geometry.clone(),
            y: top,
            page_index: 0,
            commands: Vec::new(),
        }
    }

    /// Vertical space left before the content floor.
    pub(crate) fn remaining(&self) -> f64 {
        self.geometry.content_bottom() - self.y
    }

    pub(crate) fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub(crate) fn finalize(&self) -> LayoutPage {
        LayoutPage {
            width: self.geometry.page_width,
            height: self.geometry.page_height,
            commands: self.commands.clone(),
        }
    }

    /// A fresh cursor for the next page.
    pub(crate) fn new_page(&self) -> Self {
        let mut cursor = PageCursor::new(&self.geometry, self.geometry.margin.top);
        cursor.page_index = self.page_index + 1;
        cursor
    }
}

/// Lays a report out into pages.
///
/// Stateless between calls; every call owns a private page set which is
/// finalized on return and read-only thereafter.
pub struct LayoutEngine {
    text: TextLayout,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            text: TextLayout::new(),
        }
    }

    pub(crate) fn text(&self) -> &TextLayout {
        &self.text
    }

    /// Lay out the whole report.
    ///
    /// The logo, when present, was loaded before this call; without one the
    /// first page starts at the smaller fallback top margin.
    pub fn layout(
        &self,
        report: &Report,
        fonts: &FontContext,
        logo: Option<&LoadedImage>,
    ) -> Result<Vec<LayoutPage>, MinutaError> {
        let config = &report.layout;
        let geometry = &config.geometry;

        let mut pages: Vec<LayoutPage> = Vec::new();
        let mut cursor = PageCursor::new(geometry, geometry.first_page_top(logo.is_some()));

        if let Some(image) = logo {
            cursor.push(logo_command(image, geometry));
        }
        self.paint_heading(&mut cursor, fonts, report);

        for section in &report.sections {
            match &section.body {
                SectionBody::Table(table) => {
                    self.layout_table(section, table, config, fonts, &mut cursor, &mut pages)?;
                }
                body => {
                    let bands = self.measure_bands(section, config, fonts);
                    let lines = self.measure_body_lines(body, config, fonts);
                    let content_height = lines.len() as f64 * geometry.line_height
                        + 2.0 * config.section.content_padding;
                    let total = bands.total() + content_height;

                    if total > geometry.full_page_space() {
                        return Err(MinutaError::SectionTooTall {
                            title: section.title.clone(),
                            needed_mm: total,
                            available_mm: geometry.full_page_space(),
                        });
                    }
                    if total > cursor.remaining() {
                        log::debug!(
                            "section {:?} needs {:.1}mm, {:.1}mm left on page {}, breaking",
                            section.title,
                            total,
                            cursor.remaining(),
                            cursor.page_index + 1
                        );
                        pages.push(cursor.finalize());
                        cursor = cursor.new_page();
                    }

                    let frame = self.paint_section_box(&mut cursor, &bands, content_height, config);
                    self.paint_body_lines(
                        &mut cursor,
                        &lines,
                        frame.content_start_y + config.section.content_padding,
                        config,
                    );
                    cursor.y = frame.box_bottom_y;
                }
            }
            cursor.y += config.section.gap;
        }

        pages.push(cursor.finalize());
        self.paint_footers(&mut pages, report, fonts);
        Ok(pages)
    }

    /// Centered report heading plus the author line, drawn on page 1 below
    /// the logo box. Skipped entirely when the heading is blank.
    fn paint_heading(&self, cursor: &mut PageCursor, fonts: &FontContext, report: &Report) {
        let config = &report.layout;
        let geometry = &config.geometry;
        let title = report.meta.title.trim();
        if title.is_empty() {
            return;
        }

        let width = geometry.content_width();
        let x = geometry.margin.left;
        let lines = self
            .text
            .break_into_lines(fonts, title, width, &config.font_family, 700, false, HEADING_FONT_SIZE);
        for line in &lines {
            cursor.push(DrawCommand::Text(TextSpan {
                x: x + (width - line.width).max(0.0) / 2.0,
                y: cursor.y,
                text: line.text.clone(),
                family: config.font_family.clone(),
                weight: 700,
                italic: false,
                font_size: HEADING_FONT_SIZE,
                gray: 0.0,
            }));
            cursor.y += config.section.title_line_height;
        }

        let author = report.meta.author.as_deref().map(str::trim).unwrap_or("");
        if !author.is_empty() {
            let lines = self.text.break_into_lines(
                fonts,
                author,
                width,
                &config.font_family,
                400,
                false,
                geometry.base_font_size,
            );
            for line in &lines {
                cursor.push(DrawCommand::Text(TextSpan {
                    x: x + (width - line.width).max(0.0) / 2.0,
                    y: cursor.y,
                    text: line.text.clone(),
                    family: config.font_family.clone(),
                    weight: 400,
                    italic: false,
                    font_size: geometry.base_font_size,
                    gray: 0.0,
                }));
                cursor.y += geometry.line_height;
            }
        }

        cursor.y += HEADING_GAP;
    }

    /// Page number and "generated on" line inside the bottom margin of every
    /// page. Runs after layout because the page total must be known.
    fn paint_footers(&self, pages: &mut [LayoutPage], report: &Report, fonts: &FontContext) {
        let config = &report.layout;
        let geometry = &config.geometry;
        let total = pages.len();
        let y = geometry.content_bottom() + FOOTER_OFFSET;

        for (i, page) in pages.iter_mut().enumerate() {
            let generated = report.meta.generated_at.as_deref().map(str::trim).unwrap_or("");
            if !generated.is_empty() {
                page.commands.push(DrawCommand::Text(TextSpan {
                    x: geometry.margin.left,
                    y,
                    text: generated.to_string(),
                    family: config.font_family.clone(),
                    weight: 400,
                    italic: false,
                    font_size: FOOTER_FONT_SIZE,
                    gray: FOOTER_GRAY,
                }));
            }

            let label = format!("Página {} de {}", i + 1, total);
            let width = fonts.measure(&label, &config.font_family, 400, false, FOOTER_FONT_SIZE);
            page.commands.push(DrawCommand::Text(TextSpan {
                x: geometry.margin.left + geometry.content_width() - width,
                y,
                text: label,
                family: config.font_family.clone(),
                weight: 400,
                italic: false,
                font_size: FOOTER_FONT_SIZE,
                gray: FOOTER_GRAY,
            }));
        }
    }
}

/// Scale the logo into the logo box, centered between the side margins.
fn logo_command(image: &LoadedImage, geometry: &PageGeometry) -> DrawCommand {
    let aspect = image.width_px as f64 / image.height_px.max(1) as f64;
    let mut height = geometry.logo_height;
    let mut width = height * aspect;
    if width > geometry.content_width() {
        width = geometry.content_width();
        height = width / aspect;
    }
    DrawCommand::Image {
        x: geometry.margin.left + (geometry.content_width() - width) / 2.0,
        y: geometry.margin.top,
        width,
        height,
    }
}
