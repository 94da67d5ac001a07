//! # PDF Serializer
//!
//! Takes the laid-out pages from the layout engine and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. We write the raw bytes ourselves
//! because it gives us full control over the output and keeps the crate
//! self-contained. The PDF spec is verbose but the subset a report needs is
//! manageable: pages, content streams, fonts, and one image.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Layout speaks millimetres with y growing downward from the top-left corner;
//! PDF speaks points with y growing upward from the bottom-left. The conversion
//! happens here and nowhere else.

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::MinutaError;
use crate::font::metrics::{winansi_char, winansi_code};
use crate::font::{CustomFontMetrics, FontContext, FontData, FontKey, PT_PER_MM};
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{DrawCommand, LayoutPage, TextSpan};
use crate::model::ReportMeta;

/// Serializes laid-out pages into PDF bytes.
pub struct PdfWriter;

/// A single numbered PDF object. Objects are 1-indexed in the file; index 0 in
/// our vector is a permanent placeholder for the free-list head.
struct PdfObject {
    data: Vec<u8>,
}

struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Font resource table shared by every page: (key, object id). The index
    /// in this vector is the resource name, /F0, /F1, ...
    font_objects: Vec<(FontKey, usize)>,
    /// Object id of the logo XObject, when the report carries one.
    logo_object: Option<usize>,
}

impl PdfWriter {
    pub fn new() -> Self {
        PdfWriter
    }

    /// Builds the complete PDF file for the given pages.
    ///
    /// Object layout: object 1 is the Catalog, object 2 the Pages tree (both
    /// filled in at the end, once every page object exists). Fonts and the
    /// logo come next, then alternating content-stream / page-dict pairs,
    /// and finally the Info dictionary.
    pub fn write(
        &self,
        pages: &[LayoutPage],
        meta: &ReportMeta,
        fonts: &FontContext,
        logo: Option<&LoadedImage>,
    ) -> Result<Vec<u8>, MinutaError> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            logo_object: None,
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, the logo, then content stream / page pairs
        builder.objects.push(PdfObject { data: Vec::new() });
        builder.objects.push(PdfObject { data: Vec::new() });
        builder.objects.push(PdfObject { data: Vec::new() });

        register_fonts(&mut builder, pages, fonts)?;

        if let Some(image) = logo {
            if pages.iter().any(page_has_image) {
                builder.logo_object = Some(write_image_xobject(&mut builder, image));
            }
        }

        let mut page_ids = Vec::with_capacity(pages.len());
        for page in pages {
            let content = build_content_stream(page, &builder, fonts);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_id = builder.objects.len();
            let mut data = Vec::new();
            let _ = write!(
                data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            data.extend_from_slice(&compressed);
            data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data });

            let page_id = builder.objects.len();
            let mut resources = format!("/Font << {} >>", font_resource_entries(&builder));
            if let Some(image_id) = builder.logo_object {
                if page_has_image(page) {
                    let _ = write!(resources, " /XObject << /Im0 {} 0 R >>", image_id);
                }
            }
            let dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] /Contents {} 0 R /Resources << {} >> >>",
                page.width * PT_PER_MM,
                page.height * PT_PER_MM,
                content_id,
                resources
            );
            builder.objects.push(PdfObject {
                data: dict.into_bytes(),
            });
            page_ids.push(page_id);
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data =
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_ids.len()).into_bytes();

        let info_id = write_info_dict(&mut builder, meta);

        Ok(serialize(&builder, info_id))
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        PdfWriter::new()
    }
}

fn page_has_image(page: &LayoutPage) -> bool {
    page.commands
        .iter()
        .any(|command| matches!(command, DrawCommand::Image { .. }))
}

/// Collects every (family, weight, italic) combination used by the pages and
/// writes one font object per combination. Weights snap to 400/700, matching
/// resolution in the font registry.
fn register_fonts(
    builder: &mut PdfBuilder,
    pages: &[LayoutPage],
    fonts: &FontContext,
) -> Result<(), MinutaError> {
    let mut keys: Vec<FontKey> = Vec::new();
    for page in pages {
        for command in &page.commands {
            if let DrawCommand::Text(span) = command {
                keys.push(FontKey {
                    family: span.family.clone(),
                    weight: if span.weight >= 600 { 700 } else { 400 },
                    italic: span.italic,
                });
            }
        }
    }

    // Sort for deterministic ordering, then dedup.
    keys.sort_by(|a, b| {
        a.family
            .cmp(&b.family)
            .then(a.weight.cmp(&b.weight))
            .then(a.italic.cmp(&b.italic))
    });
    keys.dedup();

    // Always have at least Helvetica.
    if keys.is_empty() {
        keys.push(FontKey {
            family: "Helvetica".to_string(),
            weight: 400,
            italic: false,
        });
    }

    for key in keys {
        let id = match fonts.resolve(&key.family, key.weight, key.italic) {
            FontData::Standard(standard) => {
                let dict = format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    standard.pdf_name()
                );
                let id = builder.objects.len();
                builder.objects.push(PdfObject {
                    data: dict.into_bytes(),
                });
                id
            }
            FontData::Custom { data, metrics } => {
                write_truetype_font_objects(builder, &key, data, metrics)?
            }
        };
        builder.font_objects.push((key, id));
    }
    Ok(())
}

fn font_resource_entries(builder: &PdfBuilder) -> String {
    builder
        .font_objects
        .iter()
        .enumerate()
        .map(|(index, (_, id))| format!("/F{} {} 0 R", index, id))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves a text span to its /F index in the resource table. Unknown
/// combinations fall back to regular Helvetica, then to the first font.
fn font_index(builder: &PdfBuilder, span: &TextSpan) -> usize {
    let weight = if span.weight >= 600 { 700 } else { 400 };
    builder
        .font_objects
        .iter()
        .position(|(key, _)| {
            key.family == span.family && key.weight == weight && key.italic == span.italic
        })
        .or_else(|| {
            builder
                .font_objects
                .iter()
                .position(|(key, _)| key.family == "Helvetica" && key.weight == 400 && !key.italic)
        })
        .unwrap_or(0)
}

/// Embeds a custom face as a simple TrueType font with WinAnsi encoding.
///
/// Three objects: the compressed font file, the descriptor, and the font
/// dictionary with a /Widths array covering codes 32..=255. Simple fonts cap
/// us at the WinAnsi repertoire, which covers the Portuguese glyphs these
/// reports need without the weight of a CID font.
fn write_truetype_font_objects(
    builder: &mut PdfBuilder,
    key: &FontKey,
    ttf: &[u8],
    font_metrics: &CustomFontMetrics,
) -> Result<usize, MinutaError> {
    let face = ttf_parser::Face::parse(ttf, 0).map_err(|err| {
        MinutaError::Font(format!(
            "font '{}' is not a parseable TrueType face: {}",
            key.family, err
        ))
    })?;

    let scale = 1000.0 / f64::from(font_metrics.units_per_em);
    let name = sanitize_font_name(&key.family, key.weight, key.italic);

    let compressed = compress_to_vec_zlib(ttf, 6);
    let fontfile_id = builder.objects.len();
    let mut data = Vec::new();
    let _ = write!(
        data,
        "<< /Length {} /Length1 {} /Filter /FlateDecode >>\nstream\n",
        compressed.len(),
        ttf.len()
    );
    data.extend_from_slice(&compressed);
    data.extend_from_slice(b"\nendstream");
    builder.objects.push(PdfObject { data });

    let bbox = face.global_bounding_box();
    let cap_height = face.capital_height().unwrap_or(font_metrics.ascender);
    // Flags bit 6 (value 32) marks the font nonsymbolic, which /Encoding
    // requires to take effect.
    let descriptor_id = builder.objects.len();
    let descriptor = format!(
        "<< /Type /FontDescriptor /FontName /{} /Flags 32 /FontBBox [{} {} {} {}] /ItalicAngle {} /Ascent {} /Descent {} /CapHeight {} /StemV {} /FontFile2 {} 0 R >>",
        name,
        (f64::from(bbox.x_min) * scale).round() as i32,
        (f64::from(bbox.y_min) * scale).round() as i32,
        (f64::from(bbox.x_max) * scale).round() as i32,
        (f64::from(bbox.y_max) * scale).round() as i32,
        if key.italic { -12 } else { 0 },
        (f64::from(font_metrics.ascender) * scale).round() as i32,
        (f64::from(font_metrics.descender) * scale).round() as i32,
        (f64::from(cap_height) * scale).round() as i32,
        if key.weight >= 700 { 120 } else { 80 },
        fontfile_id
    );
    builder.objects.push(PdfObject {
        data: descriptor.into_bytes(),
    });

    let mut widths = String::from("[");
    for code in 0x20u8..=0xFF {
        let advance = winansi_char(code)
            .and_then(|ch| font_metrics.advance_widths.get(&ch).copied())
            .unwrap_or(font_metrics.default_advance);
        let _ = write!(widths, " {}", (f64::from(advance) * scale).round() as u32);
    }
    widths.push_str(" ]");

    let font_id = builder.objects.len();
    let dict = format!(
        "<< /Type /Font /Subtype /TrueType /BaseFont /{} /FirstChar 32 /LastChar 255 /Widths {} /Encoding /WinAnsiEncoding /FontDescriptor {} 0 R >>",
        name, widths, descriptor_id
    );
    builder.objects.push(PdfObject {
        data: dict.into_bytes(),
    });
    Ok(font_id)
}

/// Writes the logo as an image XObject (/Im0). JPEG data passes straight
/// through with DCTDecode; decoded pixels get zlib-compressed, with a
/// separate DeviceGray SMask when the source had an alpha channel.
fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
    match &image.pixel_data {
        ImagePixelData::Jpeg { data, color_space } => {
            let space = match color_space {
                JpegColorSpace::DeviceRGB => "/DeviceRGB",
                JpegColorSpace::DeviceGray => "/DeviceGray",
            };
            let id = builder.objects.len();
            let mut object = Vec::new();
            let _ = write!(
                object,
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>\nstream\n",
                image.width_px, image.height_px, space, data.len()
            );
            object.extend_from_slice(data);
            object.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: object });
            id
        }
        ImagePixelData::Decoded { rgb, alpha } => {
            let smask_id = alpha.as_ref().map(|mask| {
                let compressed = compress_to_vec_zlib(mask, 6);
                let id = builder.objects.len();
                let mut object = Vec::new();
                let _ = write!(
                    object,
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode /Length {} >>\nstream\n",
                    image.width_px, image.height_px, compressed.len()
                );
                object.extend_from_slice(&compressed);
                object.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: object });
                id
            });

            let compressed = compress_to_vec_zlib(rgb, 6);
            let id = builder.objects.len();
            let mut object = Vec::new();
            let _ = write!(
                object,
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode /Length {}",
                image.width_px, image.height_px, compressed.len()
            );
            if let Some(smask) = smask_id {
                let _ = write!(object, " /SMask {} 0 R", smask);
            }
            let _ = write!(object, " >>\nstream\n");
            object.extend_from_slice(&compressed);
            object.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: object });
            id
        }
    }
}

fn write_info_dict(builder: &mut PdfBuilder, meta: &ReportMeta) -> Option<usize> {
    let title = meta.title.trim();
    let author = meta
        .author
        .as_deref()
        .map(str::trim)
        .filter(|author| !author.is_empty());

    let mut info = String::from("<< ");
    if !title.is_empty() {
        let _ = write!(info, "/Title ({}) ", escape_pdf_string(title));
    }
    if let Some(author) = author {
        let _ = write!(info, "/Author ({}) ", escape_pdf_string(author));
    }
    info.push_str("/Producer (minuta) >>");

    let id = builder.objects.len();
    builder.objects.push(PdfObject {
        data: info.into_bytes(),
    });
    Some(id)
}

/// Millimetres to points.
fn pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

/// Translates one page of draw commands into PDF content-stream operators.
/// Every coordinate flips from top-down millimetres to bottom-up points here.
fn build_content_stream(page: &LayoutPage, builder: &PdfBuilder, fonts: &FontContext) -> String {
    let mut stream = String::new();
    let page_height = page.height;

    for command in &page.commands {
        match command {
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                fill_gray,
                stroke_gray,
                stroke_width,
            } => {
                let px = pt(*x);
                let py = pt(page_height - y - height);
                let pw = pt(*width);
                let ph = pt(*height);
                if let Some(gray) = fill_gray {
                    let _ = write!(
                        stream,
                        "q\n{:.3} g\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        gray, px, py, pw, ph
                    );
                }
                if let Some(gray) = stroke_gray {
                    let _ = write!(
                        stream,
                        "q\n{:.3} G\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                        gray,
                        pt(*stroke_width),
                        px,
                        py,
                        pw,
                        ph
                    );
                }
            }
            DrawCommand::Line {
                x1,
                y1,
                x2,
                y2,
                gray,
                width,
            } => {
                let _ = write!(
                    stream,
                    "q\n{:.3} G\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    gray,
                    pt(*width),
                    pt(*x1),
                    pt(page_height - y1),
                    pt(*x2),
                    pt(page_height - y2)
                );
            }
            DrawCommand::Text(span) => {
                write_text(&mut stream, span, page_height, builder, fonts);
            }
            DrawCommand::Image {
                x,
                y,
                width,
                height,
            } => {
                if builder.logo_object.is_some() {
                    let _ = write!(
                        stream,
                        "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im0 Do\nQ\n",
                        pt(*width),
                        pt(*height),
                        pt(*x),
                        pt(page_height - y - height)
                    );
                } else {
                    // No XObject was registered. Paint a grey placeholder so
                    // the reserved area stays visible.
                    let _ = write!(
                        stream,
                        "q\n0.900 g\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        pt(*x),
                        pt(page_height - y - height),
                        pt(*width),
                        pt(*height)
                    );
                }
            }
        }
    }

    stream
}

/// Emits one text-showing block. The span's y is the top of its line box; the
/// baseline sits one ascent below, and Td positions the baseline.
fn write_text(
    stream: &mut String,
    span: &TextSpan,
    page_height: f64,
    builder: &PdfBuilder,
    fonts: &FontContext,
) {
    let index = font_index(builder, span);
    let ascent = fonts.ascent(&span.family, span.weight, span.italic, span.font_size);
    let baseline = span.y + ascent;
    let _ = write!(
        stream,
        "BT\n{:.3} g\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
        span.gray,
        index,
        span.font_size,
        pt(span.x),
        pt(page_height - baseline),
        encode_winansi_literal(&span.text)
    );
}

/// Encodes text as a PDF literal string in WinAnsi. Characters outside the
/// printable ASCII range become octal escapes; characters WinAnsi cannot
/// represent degrade to '?'.
fn encode_winansi_literal(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for ch in text.chars() {
        let code = winansi_code(ch).unwrap_or(b'?');
        match code {
            b'\\' => encoded.push_str("\\\\"),
            b'(' => encoded.push_str("\\("),
            b')' => encoded.push_str("\\)"),
            0x20..=0x7E => encoded.push(code as char),
            _ => {
                let _ = write!(encoded, "\\{:03o}", code);
            }
        }
    }
    encoded
}

/// Escapes special characters in a PDF literal string.
fn escape_pdf_string(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Turns a family name into a valid PDF name token, tagging weight and slant
/// the way the standard fourteen do.
fn sanitize_font_name(family: &str, weight: u32, italic: bool) -> String {
    let mut name: String = family
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .collect();
    if name.is_empty() {
        name.push_str("CustomFont");
    }
    if weight >= 700 {
        name.push_str("-Bold");
    }
    if italic {
        name.push_str("-Italic");
    }
    name
}

/// Serializes all objects into the final PDF byte stream.
fn serialize(builder: &PdfBuilder, info_id: Option<usize>) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();

    // Header, then a binary marker comment so transfer tools keep the file
    // eight-bit clean.
    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    let mut offsets = Vec::with_capacity(builder.objects.len());
    for (id, object) in builder.objects.iter().enumerate().skip(1) {
        offsets.push(output.len());
        let _ = write!(output, "{} 0 obj\n", id);
        output.extend_from_slice(&object.data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
    output.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        let _ = write!(output, "{:010} 00000 n \n", offset);
    }

    let _ = write!(
        output,
        "trailer\n<< /Size {} /Root 1 0 R",
        builder.objects.len()
    );
    if let Some(id) = info_id {
        let _ = write!(output, " /Info {} 0 R", id);
    }
    let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(commands: Vec<DrawCommand>) -> LayoutPage {
        LayoutPage {
            width: 210.0,
            height: 297.0,
            commands,
        }
    }

    fn span(text: &str, weight: u32) -> TextSpan {
        TextSpan {
            x: 10.0,
            y: 20.0,
            text: text.to_string(),
            family: "Helvetica".to_string(),
            weight,
            italic: false,
            font_size: 10.0,
            gray: 0.0,
        }
    }

    fn meta() -> ReportMeta {
        ReportMeta {
            title: "Relatório de Teste".to_string(),
            ..ReportMeta::default()
        }
    }

    #[test]
    fn empty_page_produces_a_well_formed_file() {
        let writer = PdfWriter::new();
        let bytes = writer
            .write(&[page(Vec::new())], &meta(), &FontContext::new(), None)
            .unwrap();

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("xref"));
        assert!(text.contains("trailer"));
        assert!(text.contains("/Type /Catalog"));
        assert!(text.contains("/Count 1"));
    }

    #[test]
    fn metadata_lands_in_the_info_dictionary() {
        let writer = PdfWriter::new();
        let mut meta = meta();
        meta.author = Some("Setor (Compras)".to_string());
        let bytes = writer
            .write(&[page(Vec::new())], &meta, &FontContext::new(), None)
            .unwrap();

        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Author (Setor \\(Compras\\))"));
        assert!(text.contains("/Producer (minuta)"));
    }

    #[test]
    fn bold_and_regular_register_separate_fonts() {
        let writer = PdfWriter::new();
        let commands = vec![
            DrawCommand::Text(span("corpo", 400)),
            DrawCommand::Text(span("titulo", 700)),
        ];
        let bytes = writer
            .write(&[page(commands)], &meta(), &FontContext::new(), None)
            .unwrap();

        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/BaseFont /Helvetica "));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("/F0"));
        assert!(text.contains("/F1"));
    }

    #[test]
    fn every_page_shares_the_font_resources() {
        let writer = PdfWriter::new();
        let pages = vec![
            page(vec![DrawCommand::Text(span("primeira", 400))]),
            page(vec![DrawCommand::Text(span("segunda", 400))]),
        ];
        let bytes = writer
            .write(&pages, &meta(), &FontContext::new(), None)
            .unwrap();

        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 2"));
        assert_eq!(text.matches("/Type /Page ").count(), 2);
        // One font object serves both pages.
        assert_eq!(text.matches("/BaseFont /Helvetica ").count(), 1);
    }

    #[test]
    fn winansi_literal_escapes_accents_as_octal() {
        assert_eq!(encode_winansi_literal("Ação"), "A\\347\\343o");
        assert_eq!(encode_winansi_literal("R$ 1,50"), "R$ 1,50");
        assert_eq!(encode_winansi_literal("a(b)c\\d"), "a\\(b\\)c\\\\d");
        // Outside WinAnsi entirely.
        assert_eq!(encode_winansi_literal("雪"), "?");
    }

    #[test]
    fn escape_handles_parens_and_backslashes() {
        assert_eq!(escape_pdf_string("plain"), "plain");
        assert_eq!(escape_pdf_string("a(b)c"), "a\\(b\\)c");
        assert_eq!(escape_pdf_string("a\\b"), "a\\\\b");
    }

    #[test]
    fn sanitize_strips_odd_characters_and_tags_style() {
        assert_eq!(sanitize_font_name("Open Sans", 400, false), "OpenSans");
        assert_eq!(sanitize_font_name("Open Sans", 700, false), "OpenSans-Bold");
        assert_eq!(sanitize_font_name("Open Sans", 400, true), "OpenSans-Italic");
        assert_eq!(sanitize_font_name("!!!", 700, true), "CustomFont-Bold-Italic");
    }

    #[test]
    fn rect_coordinates_convert_to_points_and_flip() {
        let builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            logo_object: None,
        };
        let commands = vec![DrawCommand::Rect {
            x: 10.0,
            y: 20.0,
            width: 190.0,
            height: 30.0,
            fill_gray: None,
            stroke_gray: Some(0.0),
            stroke_width: 0.3,
        }];
        let stream = build_content_stream(&page(commands), &builder, &FontContext::new());

        // x = 10mm -> 28.35pt; y = (297 - 20 - 30)mm = 247mm -> 700.16pt.
        assert!(stream.contains("28.35 700.16 538.58 85.04 re"));
        assert!(stream.contains("S\n"));
        assert!(!stream.contains("f\n"));
    }

    #[test]
    fn text_baseline_sits_one_ascent_below_the_span_top() {
        let fonts = FontContext::new();
        let builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: vec![(
                FontKey {
                    family: "Helvetica".to_string(),
                    weight: 400,
                    italic: false,
                },
                3,
            )],
            logo_object: None,
        };
        let commands = vec![DrawCommand::Text(span("x", 400))];
        let stream = build_content_stream(&page(commands), &builder, &fonts);

        let ascent = fonts.ascent("Helvetica", 400, false, 10.0);
        let expected = format!("{:.2} {:.2} Td", pt(10.0), pt(297.0 - (20.0 + ascent)));
        assert!(stream.contains(&expected), "stream was: {}", stream);
        assert!(stream.contains("/F0 10.0 Tf"));
    }

    #[test]
    fn image_command_without_a_logo_paints_a_placeholder() {
        let builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            logo_object: None,
        };
        let commands = vec![DrawCommand::Image {
            x: 85.0,
            y: 15.0,
            width: 40.0,
            height: 20.0,
        }];
        let stream = build_content_stream(&page(commands), &builder, &FontContext::new());

        assert!(stream.contains("0.900 g"));
        assert!(!stream.contains("/Im0 Do"));
    }

    #[test]
    fn jpeg_logo_passes_through_with_dctdecode() {
        let writer = PdfWriter::new();
        let image = LoadedImage {
            pixel_data: ImagePixelData::Jpeg {
                data: vec![0xFF, 0xD8, 0xFF, 0xE0],
                color_space: JpegColorSpace::DeviceRGB,
            },
            width_px: 120,
            height_px: 60,
        };
        let commands = vec![DrawCommand::Image {
            x: 85.0,
            y: 15.0,
            width: 40.0,
            height: 20.0,
        }];
        let bytes = writer
            .write(&[page(commands)], &meta(), &FontContext::new(), Some(&image))
            .unwrap();

        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Subtype /Image"));
        assert!(text.contains("/Filter /DCTDecode"));
        assert!(text.contains("/Width 120 /Height 60"));
        assert!(text.contains("/XObject << /Im0"));
    }

    #[test]
    fn decoded_logo_with_alpha_gets_an_smask() {
        let writer = PdfWriter::new();
        let image = LoadedImage {
            pixel_data: ImagePixelData::Decoded {
                rgb: vec![255, 0, 0, 0, 255, 0],
                alpha: Some(vec![255, 128]),
            },
            width_px: 2,
            height_px: 1,
        };
        let commands = vec![DrawCommand::Image {
            x: 85.0,
            y: 15.0,
            width: 40.0,
            height: 20.0,
        }];
        let bytes = writer
            .write(&[page(commands)], &meta(), &FontContext::new(), Some(&image))
            .unwrap();

        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/SMask"));
        assert!(text.contains("/ColorSpace /DeviceGray"));
        assert!(text.contains("/ColorSpace /DeviceRGB"));
    }

    #[test]
    fn xref_table_counts_every_object() {
        let writer = PdfWriter::new();
        let bytes = writer
            .write(&[page(Vec::new())], &meta(), &FontContext::new(), None)
            .unwrap();

        let text = String::from_utf8_lossy(&bytes);
        // Placeholder + Catalog + Pages + font + content + page + Info = 7.
        assert!(text.contains("xref\n0 7\n"));
        assert!(text.contains("/Size 7"));
        assert!(text.contains("0000000000 65535 f "));
    }
}
