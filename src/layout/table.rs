//! Item table measurement and painting.
//!
//! Column widths are fixed millimetre constants from the column plan; cells
//! wrap independently inside them. Row heights are measured before any
//! drawing so the per-row overflow check can run first, and a table that
//! outgrows its page continues row-by-row on the next one.

use super::{DrawCommand, LayoutEngine, LayoutPage, PageCursor, TextSpan, BORDER_WIDTH, RULE_WIDTH};
use crate::error::MinutaError;
use crate::font::FontContext;
use crate::model::{
    CellValue, Column, ColumnKind, CurrencyProfile, HeaderRepeat, ItemTable, LayoutConfig, Section,
    TableRow,
};
use crate::text::Line;

/// One measured row: wrapped lines per column (in column order) plus the
/// resulting height, `max(line counts) * line_height + 2 * cell_padding`.
struct MeasuredRow {
    cells: Vec<Vec<Line>>,
    height: f64,
}

impl LayoutEngine {
    pub(crate) fn layout_table(
        &self,
        section: &Section,
        table: &ItemTable,
        config: &LayoutConfig,
        fonts: &FontContext,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
    ) -> Result<(), MinutaError> {
        let geometry = &config.geometry;
        let table_width: f64 = table.columns.iter().map(|c| c.width).sum();
        if table_width > geometry.content_width() {
            return Err(MinutaError::TableTooWide {
                title: section.title.clone(),
                total_mm: table_width,
                available_mm: geometry.content_width(),
            });
        }

        let header = self.measure_header(table, config, fonts);
        let rows: Vec<MeasuredRow> = table
            .rows
            .iter()
            .map(|row| self.measure_row(row, table, config, fonts))
            .collect();

        // A row must fit on an empty page, minus the header when the policy
        // redraws it there.
        let header_allowance = match table.header_repeat {
            HeaderRepeat::EveryPage => header.height,
            HeaderRepeat::Never => 0.0,
        };
        let row_capacity = geometry.full_page_space() - header_allowance;
        for (i, row) in rows.iter().enumerate() {
            log::trace!("row {} of {:?}: {:.1}mm", i + 1, section.title, row.height);
            if row.height > row_capacity {
                return Err(MinutaError::RowTooTall {
                    title: section.title.clone(),
                    row: i + 1,
                    needed_mm: row.height,
                    available_mm: row_capacity,
                });
            }
        }

        let bands = self.measure_bands(section, config, fonts);
        let padding = config.section.content_padding;

        // Smallest placeable chunk: bands, top padding, header, first row.
        // Anything less would orphan the band or header at a page bottom.
        let first_row = rows.first().map(|r| r.height).unwrap_or(0.0);
        let min_chunk = bands.total() + padding + header.height + first_row;
        if min_chunk > geometry.full_page_space() {
            return Err(MinutaError::SectionTooTall {
                title: section.title.clone(),
                needed_mm: min_chunk,
                available_mm: geometry.full_page_space(),
            });
        }
        if min_chunk > cursor.remaining() {
            log::debug!(
                "table {:?} needs {:.1}mm to start, {:.1}mm left on page {}, breaking",
                section.title,
                min_chunk,
                cursor.remaining(),
                cursor.page_index + 1
            );
            pages.push(cursor.finalize());
            *cursor = cursor.new_page();
        }

        let x = geometry.margin.left;
        let floor = geometry.content_bottom();

        // Opening segment, wrapped in the section box. How many rows fit is
        // settled up front so the border can enclose them exactly.
        let rows_top = cursor.y + bands.total() + padding + header.height;
        let mut placed = fitting_count(&rows, rows_top, floor);
        let rows_height: f64 = rows[..placed].iter().map(|r| r.height).sum();
        let content_height = padding + header.height + rows_height;

        let frame = self.paint_section_box(cursor, &bands, content_height, config);
        let mut y = frame.content_start_y + padding;
        y = self.paint_header(cursor, &header, table, config, x, y);
        for row in &rows[..placed] {
            y = self.paint_row(cursor, row, table, config, x, y);
        }
        cursor.y = frame.box_bottom_y;

        // Continuation segments: remaining rows from the top margin, bordered
        // but bandless, with the header redrawn only under the EveryPage
        // policy.
        while placed < rows.len() {
            log::debug!(
                "table {:?}: {} of {} rows placed, continuing on page {}",
                section.title,
                placed,
                rows.len(),
                cursor.page_index + 2
            );
            pages.push(cursor.finalize());
            *cursor = cursor.new_page();

            let top = cursor.y;
            let header_height = match table.header_repeat {
                HeaderRepeat::EveryPage => header.height,
                HeaderRepeat::Never => 0.0,
            };
            let count = fitting_count(&rows[placed..], top + header_height, floor).max(1);
            let segment = &rows[placed..placed + count];
            let segment_height: f64 = segment.iter().map(|r| r.height).sum();

            cursor.push(DrawCommand::Rect {
                x,
                y: top,
                width: geometry.content_width(),
                height: header_height + segment_height,
                fill_gray: None,
                stroke_gray: Some(config.section.border_gray),
                stroke_width: BORDER_WIDTH,
            });

            let mut y = top;
            if table.header_repeat == HeaderRepeat::EveryPage {
                y = self.paint_header(cursor, &header, table, config, x, y);
            }
            for row in segment {
                y = self.paint_row(cursor, row, table, config, x, y);
            }
            placed += count;
            cursor.y = y;
        }

        Ok(())
    }

    fn measure_header(
        &self,
        table: &ItemTable,
        config: &LayoutConfig,
        fonts: &FontContext,
    ) -> MeasuredRow {
        let mut cells = Vec::with_capacity(table.columns.len());
        let mut max_lines = 1usize;
        for col in &table.columns {
            let wrap_width = col.width - 2.0 * config.table.cell_padding;
            let lines = self.text().break_into_lines(
                fonts,
                &col.label,
                wrap_width,
                &config.font_family,
                700,
                false,
                config.table.font_size,
            );
            max_lines = max_lines.max(lines.len());
            cells.push(lines);
        }
        MeasuredRow {
            cells,
            height: max_lines as f64 * config.geometry.line_height
                + 2.0 * config.table.cell_padding,
        }
    }

    fn measure_row(
        &self,
        row: &TableRow,
        table: &ItemTable,
        config: &LayoutConfig,
        fonts: &FontContext,
    ) -> MeasuredRow {
        let mut cells = Vec::with_capacity(table.columns.len());
        let mut max_lines = 1usize;
        for col in &table.columns {
            let text = cell_text(row.get(&col.key), col, table, config);
            let wrap_width = col.width - 2.0 * config.table.cell_padding;
            let lines = self.text().break_into_lines(
                fonts,
                &text,
                wrap_width,
                &config.font_family,
                400,
                false,
                config.table.font_size,
            );
            max_lines = max_lines.max(lines.len());
            cells.push(lines);
        }
        MeasuredRow {
            cells,
            height: max_lines as f64 * config.geometry.line_height
                + 2.0 * config.table.cell_padding,
        }
    }

    /// Filled header strip with bold, centered labels. Returns the y just
    /// under it.
    fn paint_header(
        &self,
        cursor: &mut PageCursor,
        header: &MeasuredRow,
        table: &ItemTable,
        config: &LayoutConfig,
        x: f64,
        top: f64,
    ) -> f64 {
        let style = &config.table;
        let table_width: f64 = table.columns.iter().map(|c| c.width).sum();

        cursor.push(DrawCommand::Rect {
            x,
            y: top,
            width: table_width,
            height: header.height,
            fill_gray: Some(style.header_fill_gray),
            stroke_gray: None,
            stroke_width: 0.0,
        });

        let mut col_x = x;
        for (i, col) in table.columns.iter().enumerate() {
            for (j, line) in header.cells[i].iter().enumerate() {
                if line.text.is_empty() {
                    continue;
                }
                cursor.push(DrawCommand::Text(TextSpan {
                    x: col_x + (col.width - line.width).max(0.0) / 2.0,
                    y: top + style.cell_padding + j as f64 * config.geometry.line_height,
                    text: line.text.clone(),
                    family: config.font_family.clone(),
                    weight: 700,
                    italic: false,
                    font_size: style.font_size,
                    gray: 0.0,
                }));
            }
            col_x += col.width;
        }

        self.paint_grid(cursor, table, config, x, top, header.height);
        top + header.height
    }

    /// One body row: left-aligned text cells, right-aligned numeric and
    /// currency cells. Returns the y just under it.
    fn paint_row(
        &self,
        cursor: &mut PageCursor,
        row: &MeasuredRow,
        table: &ItemTable,
        config: &LayoutConfig,
        x: f64,
        top: f64,
    ) -> f64 {
        let style = &config.table;

        let mut col_x = x;
        for (i, col) in table.columns.iter().enumerate() {
            for (j, line) in row.cells[i].iter().enumerate() {
                if line.text.is_empty() {
                    continue;
                }
                let text_x = match col.kind {
                    ColumnKind::Text => col_x + style.cell_padding,
                    ColumnKind::Numeric | ColumnKind::Currency => {
                        col_x + col.width - style.cell_padding - line.width
                    }
                };
                cursor.push(DrawCommand::Text(TextSpan {
                    x: text_x,
                    y: top + style.cell_padding + j as f64 * config.geometry.line_height,
                    text: line.text.clone(),
                    family: config.font_family.clone(),
                    weight: 400,
                    italic: false,
                    font_size: style.font_size,
                    gray: 0.0,
                }));
            }
            col_x += col.width;
        }

        self.paint_grid(cursor, table, config, x, top, row.height);
        top + row.height
    }

    /// Column rules and the bottom rule of one row-high strip.
    fn paint_grid(
        &self,
        cursor: &mut PageCursor,
        table: &ItemTable,
        config: &LayoutConfig,
        x: f64,
        top: f64,
        height: f64,
    ) {
        let gray = config.table.rule_gray;
        let mut col_x = x;
        for col in &table.columns {
            cursor.push(DrawCommand::Line {
                x1: col_x,
                y1: top,
                x2: col_x,
                y2: top + height,
                gray,
                width: RULE_WIDTH,
            });
            col_x += col.width;
        }
        cursor.push(DrawCommand::Line {
            x1: col_x,
            y1: top,
            x2: col_x,
            y2: top + height,
            gray,
            width: RULE_WIDTH,
        });
        cursor.push(DrawCommand::Line {
            x1: x,
            y1: top + height,
            x2: col_x,
            y2: top + height,
            gray,
            width: RULE_WIDTH,
        });
    }
}

/// How many rows fit between `y` and the content floor. Strict `>`: a row
/// ending exactly on the floor fits.
fn fitting_count(rows: &[MeasuredRow], mut y: f64, floor: f64) -> usize {
    let mut count = 0;
    for row in rows {
        if y + row.height > floor {
            break;
        }
        y += row.height;
        count += 1;
    }
    count
}

/// Resolve a cell to its drawable text. Missing or blank cells render the
/// table's fallback literal; numbers format per the column kind.
fn cell_text(
    value: Option<&CellValue>,
    col: &Column,
    table: &ItemTable,
    config: &LayoutConfig,
) -> String {
    match value {
        None => table.missing_value.clone(),
        Some(CellValue::Text(s)) if s.trim().is_empty() => table.missing_value.clone(),
        Some(CellValue::Text(s)) => s.clone(),
        Some(CellValue::Number(n)) => match col.kind {
            ColumnKind::Currency => config.currency.format(*n),
            _ => format_numeric(*n, &config.currency),
        },
    }
}

/// Plain numbers: whole values drop the decimals, fractional ones keep the
/// locale's decimal separator.
fn format_numeric(value: f64, currency: &CurrencyProfile) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value).replace('.', &currency.decimal_sep)
    }
}
