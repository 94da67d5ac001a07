//! Integration tests for the Minuta rendering pipeline.
//!
//! These tests exercise the full path from JSON input to PDF output.
//! They verify:
//! - JSON deserialization works correctly
//! - Sections and table rows break across pages at the right places
//! - Nothing is ever drawn twice or dropped at a page boundary
//! - The same input always produces byte-identical output
//! - PDF output is structurally valid

use std::collections::BTreeMap;

use minuta::font::FontContext;
use minuta::image_loader::{ImagePixelData, LoadedImage};
use minuta::layout::{DrawCommand, LayoutEngine, LayoutPage};
use minuta::model::*;
use minuta::MinutaError;

// ─── Helpers ────────────────────────────────────────────────────

fn report(sections: Vec<Section>) -> Report {
    Report {
        meta: ReportMeta::default(),
        sections,
        layout: LayoutConfig::default(),
        fonts: Vec::new(),
    }
}

fn layout_pages(report: &Report) -> Vec<LayoutPage> {
    let fonts = FontContext::new();
    let engine = LayoutEngine::new();
    engine
        .layout(report, &fonts, None)
        .expect("layout should succeed")
}

fn page_texts(page: &LayoutPage) -> Vec<&str> {
    page.commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Text(span) => Some(span.text.as_str()),
            _ => None,
        })
        .collect()
}

/// Section borders are the stroked, unfilled rectangles of a page.
fn section_borders(page: &LayoutPage) -> Vec<(f64, f64)> {
    page.commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Rect {
                y,
                height,
                fill_gray: None,
                stroke_gray: Some(_),
                ..
            } => Some((*y, *height)),
            _ => None,
        })
        .collect()
}

fn row(pairs: &[(&str, &str)]) -> TableRow {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), CellValue::text(value)))
        .collect::<BTreeMap<_, _>>()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(
        bytes.windows(5).any(|w| w == b"%%EOF"),
        "Missing %%EOF marker"
    );
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(
        bytes.windows(7).any(|w| w == b"trailer"),
        "Missing trailer"
    );
}

// ─── Basic Pipeline ─────────────────────────────────────────────

#[test]
fn json_report_renders_a_valid_pdf() {
    let json = r#"{
        "meta": {
            "title": "FORMALIZAÇÃO DE DEMANDA Nº 001/2026",
            "author": "Prefeitura Municipal de Itaguara"
        },
        "sections": [
            {
                "title": "1. OBJETO",
                "body": { "type": "text", "text": "Aquisição de material de expediente." }
            },
            {
                "title": "2. DADOS DO REQUISITANTE",
                "body": {
                    "type": "keyValueList",
                    "entries": [
                        { "key": "Órgão", "value": "Secretaria Municipal de Administração" },
                        { "key": "Responsável", "value": "Maria da Silva" }
                    ]
                }
            }
        ]
    }"#;

    let rendered = minuta::render_json(json).expect("report should render");
    assert_valid_pdf(&rendered.bytes);
    assert_eq!(rendered.page_count, 1);
}

#[test]
fn suggested_filename_comes_from_the_meta() {
    let mut with_name = report(vec![Section::text("1. OBJETO", "Texto.")]);
    with_name.meta.filename = Some("demanda-001.pdf".to_string());
    assert_eq!(
        minuta::render(&with_name).unwrap().filename,
        "demanda-001.pdf"
    );

    let without_name = report(vec![Section::text("1. OBJETO", "Texto.")]);
    assert_eq!(minuta::render(&without_name).unwrap().filename, "relatorio.pdf");
}

// ─── Page Breaking ──────────────────────────────────────────────

#[test]
fn twenty_short_sections_fill_exactly_two_pages() {
    let _ = env_logger::builder().is_test(true).try_init();
    let sections = (1..=20)
        .map(|i| Section::text(&format!("{}. SEÇÃO", i), "Uma linha."))
        .collect();
    let pages = layout_pages(&report(sections));

    assert_eq!(pages.len(), 2, "expected 2 pages, got {}", pages.len());
    assert_eq!(section_borders(&pages[0]).len(), 10);
    assert_eq!(section_borders(&pages[1]).len(), 10);
}

#[test]
fn a_section_never_splits_across_pages() {
    // Eight one-line sections leave 50 mm on page 1; the ninth needs 114 mm
    // and must move to page 2 whole.
    let mut sections: Vec<Section> = (1..=8)
        .map(|i| Section::text(&format!("{}. SEÇÃO", i), "Texto."))
        .collect();
    let tall_body = vec!["linha"; 20].join("\n");
    sections.push(Section::text("9. ESPECIFICAÇÕES", &tall_body));

    let pages = layout_pages(&report(sections));
    assert_eq!(pages.len(), 2);
    assert_eq!(section_borders(&pages[0]).len(), 8);

    let borders = section_borders(&pages[1]);
    assert_eq!(borders.len(), 1);
    // Whole section at the top margin of page 2: title band 8 + body 106.
    assert_eq!(borders[0], (15.0, 114.0));
}

#[test]
fn section_taller_than_a_page_is_reported_not_clipped() {
    let body = vec!["linha"; 60].join("\n");
    let result = minuta::render(&report(vec![Section::text("1. MEMORIAL", &body)]));

    match result {
        Err(MinutaError::SectionTooTall { title, .. }) => {
            assert_eq!(title, "1. MEMORIAL");
        }
        other => panic!("expected SectionTooTall, got {:?}", other.map(|r| r.page_count)),
    }
}

// ─── Tables ─────────────────────────────────────────────────────

fn one_column_table(rows: usize) -> ItemTable {
    ItemTable {
        columns: vec![Column::new("c", "COLUNA", 100.0)],
        rows: (0..rows)
            .map(|i| row(&[("c", &format!("Linha {}", i))]))
            .collect(),
        header_repeat: HeaderRepeat::Never,
        missing_value: "N/A".to_string(),
    }
}

#[test]
fn long_table_spreads_rows_across_pages_without_loss() {
    let _ = env_logger::builder().is_test(true).try_init();
    let pages = layout_pages(&report(vec![Section::table("1. ITENS", one_column_table(60))]));
    assert_eq!(pages.len(), 3, "expected 3 pages, got {}", pages.len());

    let row_count = |page: &LayoutPage| {
        page_texts(page)
            .iter()
            .filter(|t| t.starts_with("Linha "))
            .count()
    };
    assert_eq!(row_count(&pages[0]), 22);
    assert_eq!(row_count(&pages[1]), 25);
    assert_eq!(row_count(&pages[2]), 13);

    // Every row appears exactly once across the document.
    let everything: Vec<&str> = pages.iter().flat_map(page_texts).collect();
    for i in 0..60 {
        let needle = format!("Linha {}", i);
        assert_eq!(
            everything.iter().filter(|t| **t == needle).count(),
            1,
            "row {} drawn a wrong number of times",
            i
        );
    }
}

#[test]
fn header_repeats_on_continuation_pages_when_asked() {
    let mut table = one_column_table(30);
    table.header_repeat = HeaderRepeat::EveryPage;
    let pages = layout_pages(&report(vec![Section::table("1. ITENS", table)]));

    assert_eq!(pages.len(), 2);
    assert!(page_texts(&pages[0]).contains(&"COLUNA"));
    assert!(page_texts(&pages[1]).contains(&"COLUNA"));

    // The default policy draws it only once.
    let pages = layout_pages(&report(vec![Section::table("1. ITENS", one_column_table(30))]));
    assert_eq!(pages.len(), 2);
    assert!(!page_texts(&pages[1]).contains(&"COLUNA"));
}

#[test]
fn header_repeat_spelling_in_json() {
    let table: ItemTable = serde_json::from_str(
        r#"{ "columns": [], "rows": [], "headerRepeat": "everyPage" }"#,
    )
    .expect("camelCase headerRepeat should parse");
    assert_eq!(table.header_repeat, HeaderRepeat::EveryPage);
}

#[test]
fn cells_format_by_kind_and_fall_back_when_missing() {
    let json = r#"{
        "meta": { "title": "" },
        "sections": [
            {
                "title": "1. ITENS",
                "body": {
                    "type": "table",
                    "missingValue": "[A DEFINIR]",
                    "columns": [
                        { "key": "item", "label": "ITEM", "width": 20, "kind": "numeric" },
                        { "key": "descricao", "label": "DESCRIÇÃO", "width": 60 },
                        { "key": "valor", "label": "VALOR", "width": 40, "kind": "currency" }
                    ],
                    "rows": [
                        { "item": 1, "descricao": "Papel A4", "valor": 1234567.5 },
                        { "item": 2, "descricao": "Caneta azul" }
                    ]
                }
            }
        ]
    }"#;

    let parsed: Report = serde_json::from_str(json).expect("table JSON should parse");
    let pages = layout_pages(&parsed);
    let texts = page_texts(&pages[0]);

    assert!(texts.contains(&"1.234.567,50"), "currency not formatted: {:?}", texts);
    assert!(texts.contains(&"1"), "numeric cell missing");
    assert!(texts.contains(&"[A DEFINIR]"), "missing cell fallback not drawn");
}

#[test]
fn wide_table_is_rejected_by_the_full_pipeline() {
    let table = ItemTable {
        columns: vec![
            Column::new("a", "A", 120.0),
            Column::new("b", "B", 80.0),
        ],
        rows: vec![row(&[("a", "x"), ("b", "y")])],
        header_repeat: HeaderRepeat::Never,
        missing_value: "N/A".to_string(),
    };
    let result = minuta::render(&report(vec![Section::table("1. ITENS", table)]));
    assert!(matches!(result, Err(MinutaError::TableTooWide { .. })));
}

// ─── Determinism ────────────────────────────────────────────────

#[test]
fn identical_input_renders_byte_identical_pdfs() {
    let mut table = one_column_table(5);
    table.rows[2].remove("c");
    let mut r = report(vec![
        Section::text("1. OBJETO", "Aquisição de material de expediente."),
        Section::key_values(
            "2. DADOS",
            vec![
                KeyValue::new("Órgão", "Secretaria de Administração"),
                KeyValue::new("Telefone", ""),
            ],
        ),
        Section::table("3. ITENS", table),
    ]);
    r.meta.title = "FORMALIZAÇÃO DE DEMANDA".to_string();
    r.meta.generated_at = Some("Gerado em 01/01/2026 às 12:00".to_string());

    let first = minuta::render(&r).unwrap().bytes;
    let second = minuta::render(&r).unwrap().bytes;
    assert_eq!(first, second, "two renders of the same report differ");
}

#[test]
fn the_injected_timestamp_is_what_varies_between_runs() {
    let mut a = report(vec![Section::text("1. OBJETO", "Texto.")]);
    a.meta.generated_at = Some("Gerado em 01/01/2026 às 12:00".to_string());
    let mut b = report(vec![Section::text("1. OBJETO", "Texto.")]);
    b.meta.generated_at = Some("Gerado em 02/01/2026 às 08:15".to_string());

    let first = minuta::render(&a).unwrap().bytes;
    let second = minuta::render(&b).unwrap().bytes;
    assert_ne!(first, second);
}

// ─── Placeholders and the Logo ──────────────────────────────────

#[test]
fn empty_body_text_renders_the_placeholder() {
    let pages = layout_pages(&report(vec![Section::text("1. OBJETO", "   ")]));
    assert!(page_texts(&pages[0]).contains(&"Não informado"));
}

#[test]
fn empty_key_value_entries_render_the_placeholder() {
    let pages = layout_pages(&report(vec![Section::key_values(
        "1. DADOS",
        vec![KeyValue::new("Telefone", "")],
    )]));
    assert!(page_texts(&pages[0]).contains(&"Telefone: Não informado"));
}

#[test]
fn missing_logo_file_never_fails_the_render() {
    let mut r = report(vec![Section::text("1. OBJETO", "Texto.")]);
    r.meta.logo = Some("/definitely/not/here/logo.png".to_string());
    let rendered = minuta::render(&r).expect("broken logo must not fail the render");
    assert_valid_pdf(&rendered.bytes);
}

#[test]
fn a_logo_pushes_first_page_content_down() {
    let image = LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb: vec![0, 0, 0],
            alpha: None,
        },
        width_px: 1,
        height_px: 1,
    };
    let r = report(vec![Section::text("1. OBJETO", "Texto.")]);
    let fonts = FontContext::new();
    let engine = LayoutEngine::new();

    let with_logo = engine.layout(&r, &fonts, Some(&image)).unwrap();
    let without_logo = engine.layout(&r, &fonts, None).unwrap();

    assert_eq!(section_borders(&with_logo[0])[0].0, 35.0);
    assert_eq!(section_borders(&without_logo[0])[0].0, 20.0);
}

// ─── Footers ────────────────────────────────────────────────────

#[test]
fn every_page_is_numbered_against_the_total() {
    let sections = (1..=20)
        .map(|i| Section::text(&format!("{}. SEÇÃO", i), "Uma linha."))
        .collect();
    let mut r = report(sections);
    r.meta.generated_at = Some("Gerado em 14/02/2026 às 09:30".to_string());
    let pages = layout_pages(&r);

    assert_eq!(pages.len(), 2);
    assert!(page_texts(&pages[0]).contains(&"Página 1 de 2"));
    assert!(page_texts(&pages[1]).contains(&"Página 2 de 2"));
    for page in &pages {
        assert!(page_texts(page).contains(&"Gerado em 14/02/2026 às 09:30"));
    }
}

// ─── Error Surfacing ────────────────────────────────────────────

#[test]
fn schema_violations_surface_as_parse_errors_with_hints() {
    let err = minuta::render_json(r#"{ "meta": { "title": 3 }, "sections": [] }"#).unwrap_err();
    match err {
        MinutaError::Parse { hint, .. } => assert!(hint.contains("hint")),
        other => panic!("expected Parse, got {}", other),
    }
}

#[test]
fn truncated_json_is_a_parse_error() {
    let err = minuta::render_json(r#"{ "meta": { "title""#).unwrap_err();
    assert!(matches!(err, MinutaError::Parse { .. }));
}

// ─── Custom Font Embedding ──────────────────────────────────────

/// Load a system TTF font for testing. Returns None if not available.
fn load_test_font() -> Option<Vec<u8>> {
    let paths = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Verdana.ttf",
    ];
    for path in &paths {
        if let Ok(data) = std::fs::read(path) {
            if ttf_parser::Face::parse(&data, 0).is_ok() {
                return Some(data);
            }
        }
    }
    None
}

#[test]
fn custom_font_embeds_as_truetype_with_winansi() {
    use base64::Engine as _;

    let font_data = match load_test_font() {
        Some(data) => data,
        None => {
            eprintln!("Skipping: no test TTF font found");
            return;
        }
    };

    let mut r = report(vec![Section::text("1. OBJETO", "Texto no corpo do relatório.")]);
    r.fonts = vec![FontEntry {
        family: "TestSans".to_string(),
        src: base64::engine::general_purpose::STANDARD.encode(&font_data),
        weight: 400,
        italic: false,
    }];
    r.layout.font_family = "TestSans".to_string();

    let rendered = minuta::render(&r).expect("custom font report should render");
    assert_valid_pdf(&rendered.bytes);

    let text = String::from_utf8_lossy(&rendered.bytes);
    assert!(text.contains("/Subtype /TrueType"), "simple TrueType font expected");
    assert!(text.contains("/FontFile2"), "font program must be embedded");
    assert!(text.contains("/Encoding /WinAnsiEncoding"));
    assert!(text.contains("/BaseFont /TestSans"));
    // The bold title still comes from the standard set.
    assert!(text.contains("/BaseFont /Helvetica-Bold"));
}
