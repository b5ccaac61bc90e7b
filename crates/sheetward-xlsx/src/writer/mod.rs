//! XLSX writer

mod drawing;

use std::io::{Cursor, Write};

use log::debug;
use zip::write::SimpleFileOptions;

use crate::error::{CodecError, CodecResult};
use crate::package::{content_type, ns, rel_type, VBA_PROJECT_PART};
use crate::styles::XlsxStyleTable;
use crate::xml::{encode_excel_escapes, escape_attr, escape_text, needs_space_preserve};
use sheetward_core::{CellValue, Workbook, Worksheet};

type PackageWriter = zip::ZipWriter<Cursor<Vec<u8>>>;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Drawing and chart part numbers of one sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DrawingParts {
    /// `xl/drawings/drawingN.xml`
    drawing: usize,
    /// Number of the sheet's first chart part, `xl/charts/chartK.xml`
    first_chart: usize,
    chart_count: usize,
}

/// Part numbering for a whole package, fixed before anything is written
#[derive(Debug)]
struct PackageLayout {
    drawings: Vec<Option<DrawingParts>>,
    has_macros: bool,
}

impl PackageLayout {
    fn plan(workbook: &Workbook) -> Self {
        let mut next_drawing = 1;
        let mut next_chart = 1;
        let drawings = workbook
            .worksheets()
            .map(|sheet| {
                let count = sheet.charts().len();
                if count == 0 {
                    return None;
                }
                let parts = DrawingParts {
                    drawing: next_drawing,
                    first_chart: next_chart,
                    chart_count: count,
                };
                next_drawing += 1;
                next_chart += count;
                Some(parts)
            })
            .collect();

        Self {
            drawings,
            has_macros: workbook.macro_archive().is_present(),
        }
    }

    fn all_drawings(&self) -> impl Iterator<Item = &DrawingParts> {
        self.drawings.iter().flatten()
    }
}

/// XLSX package writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Encode a workbook into package bytes
    ///
    /// The output depends only on the workbook: part order and numbering are
    /// fixed and every entry carries the same timestamp.
    pub fn write(workbook: &Workbook) -> CodecResult<Vec<u8>> {
        if workbook.is_empty() {
            return Err(CodecError::EncodeFailure("workbook has no sheets".into()));
        }

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));

        // Build a workbook-wide style table.
        let style_table = XlsxStyleTable::build(workbook);
        let layout = PackageLayout::plan(workbook);

        Self::write_content_types(&mut zip, workbook, &layout)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, workbook)?;
        Self::write_workbook_rels(&mut zip, workbook, &layout)?;
        Self::write_part(&mut zip, "xl/styles.xml", &style_table.to_styles_xml())?;

        for (index, sheet) in workbook.worksheets().enumerate() {
            let parts = layout.drawings.get(index).copied().flatten();
            Self::write_worksheet(&mut zip, sheet, index, &style_table, parts.is_some())?;

            if let Some(parts) = parts {
                Self::write_sheet_drawing(&mut zip, sheet, index, parts)?;
            }
        }

        if let Some(bytes) = workbook.macro_archive().bytes() {
            zip.start_file(VBA_PROJECT_PART, Self::part_options())?;
            zip.write_all(bytes)?;
        }

        let cursor = zip.finish()?;
        let bytes = cursor.into_inner();
        debug!(
            "encoded {} sheets into {} bytes",
            workbook.sheet_count(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Deflate with the zip epoch (1980-01-01 00:00:00) as timestamp
    fn part_options() -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
    }

    fn write_part(zip: &mut PackageWriter, name: &str, content: &str) -> CodecResult<()> {
        zip.start_file(name, Self::part_options())?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_content_types(
        zip: &mut PackageWriter,
        workbook: &Workbook,
        layout: &PackageLayout,
    ) -> CodecResult<()> {
        let mut content = format!(
            "{}\n<Types xmlns=\"{}\">\
             <Default Extension=\"rels\" ContentType=\"{}\"/>\
             <Default Extension=\"xml\" ContentType=\"{}\"/>",
            XML_DECLARATION,
            ns::CONTENT_TYPES,
            content_type::RELATIONSHIPS,
            content_type::XML
        );
        if layout.has_macros {
            content.push_str(&format!(
                "<Default Extension=\"bin\" ContentType=\"{}\"/>",
                content_type::VBA_PROJECT
            ));
        }

        let workbook_type = if layout.has_macros {
            content_type::WORKBOOK_MACRO_ENABLED
        } else {
            content_type::WORKBOOK
        };
        Self::push_override(&mut content, "/xl/workbook.xml", workbook_type);
        Self::push_override(&mut content, "/xl/styles.xml", content_type::STYLES);

        for i in 1..=workbook.sheet_count() {
            Self::push_override(
                &mut content,
                &format!("/xl/worksheets/sheet{}.xml", i),
                content_type::WORKSHEET,
            );
        }
        for parts in layout.all_drawings() {
            Self::push_override(
                &mut content,
                &format!("/xl/drawings/drawing{}.xml", parts.drawing),
                content_type::DRAWING,
            );
        }
        for parts in layout.all_drawings() {
            for k in parts.first_chart..parts.first_chart + parts.chart_count {
                Self::push_override(
                    &mut content,
                    &format!("/xl/charts/chart{}.xml", k),
                    content_type::CHART,
                );
            }
        }

        content.push_str("</Types>");
        Self::write_part(zip, "[Content_Types].xml", &content)
    }

    fn push_override(content: &mut String, part_name: &str, content_type: &str) {
        content.push_str(&format!(
            "<Override PartName=\"{}\" ContentType=\"{}\"/>",
            part_name, content_type
        ));
    }

    fn write_root_rels(zip: &mut PackageWriter) -> CodecResult<()> {
        let content = relationships_xml(&[(rel_type::OFFICE_DOCUMENT, "xl/workbook.xml".into())]);
        Self::write_part(zip, "_rels/.rels", &content)
    }

    fn write_workbook_xml(zip: &mut PackageWriter, workbook: &Workbook) -> CodecResult<()> {
        let mut content = format!(
            "{}\n<workbook xmlns=\"{}\" xmlns:r=\"{}\">",
            XML_DECLARATION,
            ns::SPREADSHEETML,
            ns::RELATIONSHIPS
        );

        let active = workbook.active_sheet();
        if active == 0 {
            content.push_str("<bookViews><workbookView/></bookViews>");
        } else {
            content.push_str(&format!(
                "<bookViews><workbookView activeTab=\"{}\"/></bookViews>",
                active
            ));
        }

        content.push_str("<sheets>");
        for (i, sheet) in workbook.worksheets().enumerate() {
            let state = sheet
                .visibility()
                .as_xml()
                .map(|s| format!(" state=\"{}\"", s))
                .unwrap_or_default();
            content.push_str(&format!(
                "<sheet name=\"{}\" sheetId=\"{}\"{} r:id=\"rId{}\"/>",
                escape_attr(sheet.name()),
                i + 1,
                state,
                i + 1
            ));
        }
        content.push_str("</sheets></workbook>");

        Self::write_part(zip, "xl/workbook.xml", &content)
    }

    fn write_workbook_rels(
        zip: &mut PackageWriter,
        workbook: &Workbook,
        layout: &PackageLayout,
    ) -> CodecResult<()> {
        let mut rels: Vec<(&str, String)> = (1..=workbook.sheet_count())
            .map(|i| (rel_type::WORKSHEET, format!("worksheets/sheet{}.xml", i)))
            .collect();
        rels.push((rel_type::STYLES, "styles.xml".into()));
        if layout.has_macros {
            rels.push((rel_type::VBA_PROJECT, "vbaProject.bin".into()));
        }
        Self::write_part(zip, "xl/_rels/workbook.xml.rels", &relationships_xml(&rels))
    }

    fn write_worksheet(
        zip: &mut PackageWriter,
        sheet: &Worksheet,
        index: usize,
        style_table: &XlsxStyleTable,
        has_drawing: bool,
    ) -> CodecResult<()> {
        let dimension = sheet
            .used_range()
            .map(|range| {
                if range.is_single_cell() {
                    range.start.to_a1_string()
                } else {
                    range.to_string()
                }
            })
            .unwrap_or_else(|| "A1".to_string());

        let mut content = format!(
            "{}\n<worksheet xmlns=\"{}\" xmlns:r=\"{}\"><dimension ref=\"{}\"/><sheetData>",
            XML_DECLARATION,
            ns::SPREADSHEETML,
            ns::RELATIONSHIPS,
            dimension
        );

        // Write cell data (sparse, row-major)
        let mut current_row: Option<u32> = None;
        for (addr, cell) in sheet.iter_cells() {
            let xf_id = style_table.xf_id_for(index, cell.style_index);
            // Empty text has no cell form and reads back as empty
            if xf_id == 0 && is_empty_text(&cell.value) {
                continue;
            }

            if current_row != Some(addr.row) {
                if current_row.is_some() {
                    content.push_str("</row>");
                }
                content.push_str(&format!("<row r=\"{}\">", addr.row));
                current_row = Some(addr.row);
            }

            let style_attr = if xf_id != 0 {
                format!(" s=\"{}\"", xf_id)
            } else {
                String::new()
            };
            Self::write_cell(&mut content, &addr.to_a1_string(), &style_attr, &cell.value);
        }
        if current_row.is_some() {
            content.push_str("</row>");
        }
        content.push_str("</sheetData>");

        if has_drawing {
            content.push_str("<drawing r:id=\"rId1\"/>");
        }
        content.push_str("</worksheet>");

        Self::write_part(zip, &format!("xl/worksheets/sheet{}.xml", index + 1), &content)
    }

    fn write_cell(content: &mut String, cell_ref: &str, style_attr: &str, value: &CellValue) {
        match value {
            CellValue::Empty => {
                content.push_str(&format!("<c r=\"{}\"{}/>", cell_ref, style_attr));
            }
            CellValue::String(s) if s.as_str().is_empty() => {
                content.push_str(&format!("<c r=\"{}\"{}/>", cell_ref, style_attr));
            }
            CellValue::Number(n) if n.is_finite() => {
                content.push_str(&format!("<c r=\"{}\"{}><v>{}</v></c>", cell_ref, style_attr, n));
            }
            // NaN and infinities have no representation in a cell
            CellValue::Number(_) => {
                content.push_str(&format!(
                    "<c r=\"{}\"{} t=\"e\"><v>#NUM!</v></c>",
                    cell_ref, style_attr
                ));
            }
            CellValue::String(s) => {
                content.push_str(&format!(
                    "<c r=\"{}\"{} t=\"inlineStr\"><is>{}</is></c>",
                    cell_ref,
                    style_attr,
                    inline_text(s.as_str())
                ));
            }
            CellValue::Boolean(b) => {
                content.push_str(&format!(
                    "<c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
                    cell_ref,
                    style_attr,
                    u8::from(*b)
                ));
            }
            CellValue::Error(e) => {
                content.push_str(&format!(
                    "<c r=\"{}\"{} t=\"e\"><v>{}</v></c>",
                    cell_ref,
                    style_attr,
                    escape_text(e.as_str())
                ));
            }
            CellValue::Formula { text, cached_value } => {
                let Some(formula) = text.strip_prefix('=') else {
                    // Text that merely sits in the formula slot
                    content.push_str(&format!(
                        "<c r=\"{}\"{} t=\"inlineStr\"><is>{}</is></c>",
                        cell_ref,
                        style_attr,
                        inline_text(text)
                    ));
                    return;
                };
                let formula = escape_text(formula);
                let cached = cached_value.as_deref().unwrap_or(&CellValue::Empty);
                let (type_attr, cached) = match cached {
                    CellValue::Number(n) if n.is_finite() => ("", n.to_string()),
                    CellValue::String(s) => {
                        (" t=\"str\"", escape_text(&encode_excel_escapes(s.as_str())).into_owned())
                    }
                    CellValue::Boolean(b) => (" t=\"b\"", u8::from(*b).to_string()),
                    CellValue::Error(e) => (" t=\"e\"", e.as_str().to_string()),
                    _ => ("", String::new()),
                };
                if cached.is_empty() {
                    content.push_str(&format!(
                        "<c r=\"{}\"{}{}><f>{}</f></c>",
                        cell_ref, style_attr, type_attr, formula
                    ));
                } else {
                    content.push_str(&format!(
                        "<c r=\"{}\"{}{}><f>{}</f><v>{}</v></c>",
                        cell_ref, style_attr, type_attr, formula, cached
                    ));
                }
            }
        }
    }

    /// Sheet rels, the drawing part, its rels and one part per chart
    fn write_sheet_drawing(
        zip: &mut PackageWriter,
        sheet: &Worksheet,
        index: usize,
        parts: DrawingParts,
    ) -> CodecResult<()> {
        let sheet_rels = relationships_xml(&[(
            rel_type::DRAWING,
            format!("../drawings/drawing{}.xml", parts.drawing),
        )]);
        Self::write_part(
            zip,
            &format!("xl/worksheets/_rels/sheet{}.xml.rels", index + 1),
            &sheet_rels,
        )?;

        Self::write_part(
            zip,
            &format!("xl/drawings/drawing{}.xml", parts.drawing),
            &drawing::drawing_xml(sheet.charts()),
        )?;

        let chart_rels: Vec<(&str, String)> = (0..parts.chart_count)
            .map(|k| {
                (
                    rel_type::CHART,
                    format!("../charts/chart{}.xml", parts.first_chart + k),
                )
            })
            .collect();
        Self::write_part(
            zip,
            &format!("xl/drawings/_rels/drawing{}.xml.rels", parts.drawing),
            &relationships_xml(&chart_rels),
        )?;

        for (k, chart) in sheet.charts().iter().enumerate() {
            let number = parts.first_chart + k;
            Self::write_part(
                zip,
                &format!("xl/charts/chart{}.xml", number),
                &drawing::chart_xml(chart, number),
            )?;
        }
        Ok(())
    }
}

/// A relationships part; ids are `rId1..` in the given order
fn relationships_xml(rels: &[(&str, String)]) -> String {
    let mut content = format!(
        "{}\n<Relationships xmlns=\"{}\">",
        XML_DECLARATION,
        ns::PACKAGE_RELATIONSHIPS
    );
    for (i, (rel_type, target)) in rels.iter().enumerate() {
        content.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{}\" Target=\"{}\"/>",
            i + 1,
            rel_type,
            escape_attr(target)
        ));
    }
    content.push_str("</Relationships>");
    content
}

fn is_empty_text(value: &CellValue) -> bool {
    matches!(value, CellValue::String(s) if s.as_str().is_empty())
}

/// `<t>` element of an inline string
fn inline_text(s: &str) -> String {
    let encoded = encode_excel_escapes(s);
    let space = if needs_space_preserve(s) {
        " xml:space=\"preserve\""
    } else {
        ""
    };
    format!("<t{}>{}</t>", space, escape_text(&encoded))
}
