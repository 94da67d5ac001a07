//! Section box measurement and painting.
//!
//! A section renders as a bordered rectangle: a title band (never omitted,
//! even when the title is blank), an optional muted subtitle band, a
//! separator rule under the bands, then the content area. Everything here is
//! pure drawing at a given offset; page-break decisions belong to the
//! driver in the parent module.

use super::{DrawCommand, LayoutEngine, PageCursor, TextSpan, BORDER_WIDTH, RULE_WIDTH};
use crate::font::FontContext;
use crate::model::{LayoutConfig, Section, SectionBody};
use crate::text::{or_placeholder, Line};

/// Where a freshly painted box starts and ends, so content can be drawn
/// without re-measuring.
#[derive(Debug, Clone, Copy)]
pub struct SectionFrame {
    /// Top of the content area (just under the band separator).
    pub content_start_y: f64,
    /// Bottom edge of the box border.
    pub box_bottom_y: f64,
}

/// Pre-measured title and subtitle bands.
///
/// Band height is `wrapped_lines * band_line_height + band_padding`. A blank
/// title still measures one empty line; a blank subtitle measures nothing.
pub(crate) struct Bands {
    title_lines: Vec<Line>,
    subtitle_lines: Vec<Line>,
    title_height: f64,
    subtitle_height: f64,
}

impl Bands {
    pub(crate) fn total(&self) -> f64 {
        self.title_height + self.subtitle_height
    }
}

impl LayoutEngine {
    pub(crate) fn measure_bands(
        &self,
        section: &Section,
        config: &LayoutConfig,
        fonts: &FontContext,
    ) -> Bands {
        let style = &config.section;
        let wrap_width = config.geometry.content_width() - 2.0 * style.band_padding;

        let title_lines = self.text().break_into_lines(
            fonts,
            section.title.trim(),
            wrap_width,
            &config.font_family,
            700,
            false,
            style.title_font_size,
        );
        let title_height = title_lines.len() as f64 * style.title_line_height + style.band_padding;

        let subtitle = section.subtitle.as_deref().map(str::trim).unwrap_or("");
        let (subtitle_lines, subtitle_height) = if subtitle.is_empty() {
            (Vec::new(), 0.0)
        } else {
            let lines = self.text().break_into_lines(
                fonts,
                subtitle,
                wrap_width,
                &config.font_family,
                400,
                false,
                style.subtitle_font_size,
            );
            let height = lines.len() as f64 * style.subtitle_line_height + style.band_padding;
            (lines, height)
        };

        Bands {
            title_lines,
            subtitle_lines,
            title_height,
            subtitle_height,
        }
    }

    /// Draw the box border, the separator under the bands, and the band
    /// text, at the current cursor position. `content_height` is caller
    /// supplied and includes the caller's own content padding.
    pub(crate) fn paint_section_box(
        &self,
        cursor: &mut PageCursor,
        bands: &Bands,
        content_height: f64,
        config: &LayoutConfig,
    ) -> SectionFrame {
        let style = &config.section;
        let geometry = &config.geometry;
        let x = geometry.margin.left;
        let width = geometry.content_width();
        let top = cursor.y;
        let band_bottom = top + bands.total();
        let total = bands.total() + content_height;

        cursor.push(DrawCommand::Rect {
            x,
            y: top,
            width,
            height: total,
            fill_gray: None,
            stroke_gray: Some(style.border_gray),
            stroke_width: BORDER_WIDTH,
        });
        cursor.push(DrawCommand::Line {
            x1: x,
            y1: band_bottom,
            x2: x + width,
            y2: band_bottom,
            gray: style.separator_gray,
            width: RULE_WIDTH,
        });

        let text_x = x + style.band_padding;
        for (i, line) in bands.title_lines.iter().enumerate() {
            if line.text.is_empty() {
                continue;
            }
            cursor.push(DrawCommand::Text(TextSpan {
                x: text_x,
                y: top + style.band_padding / 2.0 + i as f64 * style.title_line_height,
                text: line.text.clone(),
                family: config.font_family.clone(),
                weight: 700,
                italic: false,
                font_size: style.title_font_size,
                gray: 0.0,
            }));
        }

        let subtitle_top = top + bands.title_height;
        for (i, line) in bands.subtitle_lines.iter().enumerate() {
            if line.text.is_empty() {
                continue;
            }
            cursor.push(DrawCommand::Text(TextSpan {
                x: text_x,
                y: subtitle_top + style.band_padding / 2.0 + i as f64 * style.subtitle_line_height,
                text: line.text.clone(),
                family: config.font_family.clone(),
                weight: 400,
                italic: false,
                font_size: style.subtitle_font_size,
                gray: style.subtitle_gray,
            }));
        }

        SectionFrame {
            content_start_y: band_bottom,
            box_bottom_y: top + total,
        }
    }

    /// Wrap a prose or key-value body into drawable lines. Blank text (and
    /// blank values) render the configured placeholder.
    pub(crate) fn measure_body_lines(
        &self,
        body: &SectionBody,
        config: &LayoutConfig,
        fonts: &FontContext,
    ) -> Vec<Line> {
        let wrap_width = config.geometry.content_width() - 2.0 * config.section.content_padding;
        let size = config.geometry.base_font_size;

        match body {
            SectionBody::Text { text } => self.text().break_into_lines(
                fonts,
                or_placeholder(text, &config.placeholder),
                wrap_width,
                &config.font_family,
                400,
                false,
                size,
            ),
            SectionBody::KeyValueList { entries } => {
                if entries.is_empty() {
                    return self.text().break_into_lines(
                        fonts,
                        &config.placeholder,
                        wrap_width,
                        &config.font_family,
                        400,
                        false,
                        size,
                    );
                }
                let mut lines = Vec::new();
                for entry in entries {
                    let paragraph = format!(
                        "{}: {}",
                        entry.key,
                        or_placeholder(&entry.value, &config.placeholder)
                    );
                    lines.extend(self.text().break_into_lines(
                        fonts,
                        &paragraph,
                        wrap_width,
                        &config.font_family,
                        400,
                        false,
                        size,
                    ));
                }
                lines
            }
            SectionBody::Table(_) => Vec::new(),
        }
    }

    pub(crate) fn paint_body_lines(
        &self,
        cursor: &mut PageCursor,
        lines: &[Line],
        top: f64,
        config: &LayoutConfig,
    ) {
        let x = config.geometry.margin.left + config.section.content_padding;
        for (i, line) in lines.iter().enumerate() {
            if line.text.is_empty() {
                continue;
            }
            cursor.push(DrawCommand::Text(TextSpan {
                x,
                y: top + i as f64 * config.geometry.line_height,
                text: line.text.clone(),
                family: config.font_family.clone(),
                weight: 400,
                italic: false,
                font_size: config.geometry.base_font_size,
                gray: 0.0,
            }));
        }
    }
}
