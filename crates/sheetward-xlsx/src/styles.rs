//! XLSX styles (styles.xml) read/write helpers

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{CodecError, CodecResult};
use crate::xml::{attr, escape_attr, is_true};
use sheetward_core::style::{
    Alignment, Color, FillStyle, FontStyle, HorizontalAlignment, NumberFormat, Style, Underline,
    VerticalAlignment,
};
use sheetward_core::Workbook;

const STYLES_PART: &str = "xl/styles.xml";

// === Writing ===

/// Workbook-wide cell format table
///
/// Worksheets deduplicate styles locally; this folds every sheet's pool into
/// one `cellXfs` list and remembers how local indices map onto it.
#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Global, deduplicated styles. Index corresponds to the cellXfs index (xfId).
    styles: Vec<Style>,
    /// Per-worksheet mapping: local worksheet style index -> global xfId.
    sheet_maps: Vec<HashMap<u32, u32>>,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    num_fmt_id: u32,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut styles: Vec<Style> = Vec::new();
        let mut style_to_xf: HashMap<Style, u32> = HashMap::new();

        // Index 0 is always default style
        let default = Style::default();
        styles.push(default.clone());
        style_to_xf.insert(default, 0);

        let mut sheet_maps: Vec<HashMap<u32, u32>> = Vec::with_capacity(workbook.sheet_count());

        for sheet in workbook.worksheets() {
            let mut map: HashMap<u32, u32> = HashMap::new();
            map.insert(0, 0);

            for (_, cell) in sheet.iter_cells() {
                let local_idx = cell.style_index;
                if map.contains_key(&local_idx) {
                    continue;
                }

                let style = sheet.style_by_index(local_idx).cloned().unwrap_or_default();

                let xf_id = match style_to_xf.get(&style) {
                    Some(&id) => id,
                    None => {
                        let id = styles.len() as u32;
                        styles.push(style.clone());
                        style_to_xf.insert(style, id);
                        id
                    }
                };

                map.insert(local_idx, xf_id);
            }

            sheet_maps.push(map);
        }

        Self { styles, sheet_maps }
    }

    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_style_index).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut font_ids: HashMap<&FontStyle, u32> = HashMap::new();
        let mut fonts: Vec<&FontStyle> = Vec::new();

        let mut fill_ids: HashMap<FillStyle, u32> = HashMap::new();
        // Excel requires the first two fills to be none and gray125
        let mut fill_count: u32 = 2;
        let mut fills: Vec<FillStyle> = Vec::new();

        let mut numfmt_ids: HashMap<&str, u32> = HashMap::new();
        let mut numfmts: Vec<(u32, &str)> = Vec::new();
        let mut next_numfmt_id = NumberFormat::FIRST_CUSTOM_ID;

        let mut resolved: Vec<ResolvedXfIds> = Vec::with_capacity(self.styles.len());

        for style in &self.styles {
            let font_id = match font_ids.get(&style.font) {
                Some(&id) => id,
                None => {
                    let id = fonts.len() as u32;
                    fonts.push(&style.font);
                    font_ids.insert(&style.font, id);
                    id
                }
            };

            let fill_id = match style.fill {
                FillStyle::None => 0,
                other => match fill_ids.get(&other) {
                    Some(&id) => id,
                    None => {
                        let id = fill_count;
                        fill_count += 1;
                        fills.push(other);
                        fill_ids.insert(other, id);
                        id
                    }
                },
            };

            let num_fmt_id = match &style.number_format {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id,
                NumberFormat::Custom(code) => match numfmt_ids.get(code.as_str()) {
                    Some(&id) => id,
                    None => {
                        let id = next_numfmt_id;
                        next_numfmt_id += 1;
                        numfmt_ids.insert(code.as_str(), id);
                        numfmts.push((id, code.as_str()));
                        id
                    }
                },
            };

            resolved.push(ResolvedXfIds {
                font_id,
                fill_id,
                num_fmt_id,
            });
        }

        let mut xml = String::new();
        xml.push_str(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
            for (id, code) in &numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_attr(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.len()));
        for font in &fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        xml.push_str(&format!("\n  <fills count=\"{}\">", fill_count));
        xml.push_str("\n    <fill><patternFill patternType=\"none\"/></fill>");
        xml.push_str("\n    <fill><patternFill patternType=\"gray125\"/></fill>");
        for fill in &fills {
            xml.push_str("\n    ");
            xml.push_str(&write_fill(fill));
        }
        xml.push_str("\n  </fills>");

        xml.push_str(
            r#"
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.styles.len()));
        for (style, ids) in self.styles.iter().zip(&resolved) {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
        );
        xml
    }
}

fn write_color(tag: &str, color: &Color) -> String {
    match color {
        Color::Auto => format!("<{tag} auto=\"1\"/>"),
        Color::Rgb { r, g, b } => format!("<{tag} rgb=\"FF{:02X}{:02X}{:02X}\"/>", r, g, b),
        Color::Argb { a, r, g, b } => {
            format!("<{tag} rgb=\"{:02X}{:02X}{:02X}{:02X}\"/>", a, r, g, b)
        }
        Color::Indexed(i) => format!("<{tag} indexed=\"{}\"/>", i),
        Color::Theme { index, tint: 0 } => format!("<{tag} theme=\"{}\"/>", index),
        Color::Theme { index, tint } => {
            format!("<{tag} theme=\"{}\" tint=\"{}\"/>", index, (*tint as f64) / 100.0)
        }
    }
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    match font.underline.as_xml() {
        None => {}
        Some("single") => s.push_str("<u/>"),
        Some(val) => s.push_str(&format!("<u val=\"{}\"/>", val)),
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape_attr(&font.name)));
    s.push_str("</font>");
    s
}

fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } => format!(
            "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
            write_color("fgColor", color)
        ),
    }
}

fn write_alignment(al: &Alignment) -> String {
    if al.is_default() {
        return String::new();
    }

    let default = Alignment::default();
    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", al.horizontal.as_xml()));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", al.vertical.as_xml()));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    s.push_str("/>");
    s
}

fn write_xf(style: &Style, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if style.font != FontStyle::default() {
        attrs.push_str(" applyFont=\"1\"");
    }
    if !style.fill.is_none() {
        attrs.push_str(" applyFill=\"1\"");
    }
    if !style.alignment.is_default() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let mut s = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"0\" xfId=\"0\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, attrs
    );

    let alignment_xml = write_alignment(&style.alignment);
    if alignment_xml.is_empty() {
        s.push_str("/>");
    } else {
        s.push('>');
        s.push_str(&alignment_xml);
        s.push_str("</xf>");
    }
    s
}

// === Reading ===

#[derive(Debug, Default)]
struct PendingXf {
    num_fmt_id: u32,
    font_id: u32,
    fill_id: u32,
    alignment: Alignment,
}

/// Read styles.xml into the resolved `cellXfs` list (index = xf id)
///
/// Borders, protection, differential formats and non-solid pattern fills are
/// not modelled and read as defaults.
pub(crate) fn read_styles_xml(xml: &[u8]) -> CodecResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(xml);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<FontStyle> = Vec::new();
    let mut fills: Vec<FillStyle> = Vec::new();
    let mut cell_xfs: Vec<Style> = Vec::new();

    let mut current_font: Option<FontStyle> = None;
    let mut in_fill = false;
    let mut fill_is_solid = false;
    let mut fill_fg = Color::Auto;
    let mut current_xf: Option<PendingXf> = None;
    let mut in_cell_xfs = false;
    // Differential formats reuse <font>/<fill>; they are skipped wholesale
    let mut in_dxfs = false;

    loop {
        let event = xml_reader
            .read_event_into(&mut buf)
            .map_err(|e| CodecError::malformed_xml(STYLES_PART, e))?;
        let is_empty = matches!(event, Event::Empty(_));

        match event {
            Event::Start(e) | Event::Empty(e) => {
                if in_dxfs {
                    buf.clear();
                    continue;
                }
                match e.local_name().as_ref() {
                    b"dxfs" if !is_empty => in_dxfs = true,
                    b"cellXfs" if !is_empty => in_cell_xfs = true,

                    b"numFmt" => {
                        let id = attr(&e, b"numFmtId").and_then(|v| v.parse::<u32>().ok());
                        if let (Some(id), Some(code)) = (id, attr(&e, b"formatCode")) {
                            numfmts.insert(id, code);
                        }
                    }

                    b"font" => {
                        if is_empty {
                            fonts.push(FontStyle::default());
                        } else {
                            current_font = Some(FontStyle::default());
                        }
                    }
                    b"b" | b"i" | b"u" | b"sz" | b"name" | b"color" if current_font.is_some() => {
                        if let Some(font) = current_font.as_mut() {
                            apply_font_property(font, &e);
                        }
                    }

                    b"fill" => {
                        if is_empty {
                            fills.push(FillStyle::None);
                        } else {
                            in_fill = true;
                            fill_is_solid = false;
                            fill_fg = Color::Auto;
                        }
                    }
                    b"patternFill" if in_fill => {
                        fill_is_solid = attr(&e, b"patternType").as_deref() == Some("solid");
                    }
                    b"fgColor" if in_fill => {
                        fill_fg = parse_color_attrs(&e);
                    }

                    b"xf" if in_cell_xfs => {
                        let id = |key: &[u8]| {
                            attr(&e, key)
                                .and_then(|v| v.parse::<u32>().ok())
                                .unwrap_or(0)
                        };
                        let xf = PendingXf {
                            num_fmt_id: id(b"numFmtId"),
                            font_id: id(b"fontId"),
                            fill_id: id(b"fillId"),
                            alignment: Alignment::default(),
                        };
                        if is_empty {
                            cell_xfs.push(resolve_style(&xf, &numfmts, &fonts, &fills));
                        } else {
                            current_xf = Some(xf);
                        }
                    }
                    b"alignment" => {
                        if let Some(xf) = current_xf.as_mut() {
                            xf.alignment = parse_alignment(&e);
                        }
                    }
                    _ => {}
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"dxfs" => in_dxfs = false,
                _ if in_dxfs => {}
                b"cellXfs" => in_cell_xfs = false,
                b"font" => {
                    if let Some(font) = current_font.take() {
                        fonts.push(font);
                    }
                }
                b"fill" if in_fill => {
                    in_fill = false;
                    fills.push(if fill_is_solid {
                        FillStyle::Solid { color: fill_fg }
                    } else {
                        FillStyle::None
                    });
                }
                b"xf" => {
                    if let Some(xf) = current_xf.take() {
                        cell_xfs.push(resolve_style(&xf, &numfmts, &fonts, &fills));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if cell_xfs.is_empty() {
        cell_xfs.push(Style::default());
    }
    Ok(cell_xfs)
}

fn apply_font_property(font: &mut FontStyle, e: &BytesStart<'_>) {
    let val = attr(e, b"val");
    match e.local_name().as_ref() {
        b"b" => font.bold = val.as_deref().map_or(true, is_true),
        b"i" => font.italic = val.as_deref().map_or(true, is_true),
        b"u" => font.underline = Underline::from_xml(val.as_deref().unwrap_or("single")),
        b"sz" => {
            if let Some(size) = val.and_then(|v| v.parse::<f64>().ok()) {
                font.size = size;
            }
        }
        b"name" => {
            if let Some(name) = val {
                font.name = name;
            }
        }
        b"color" => font.color = parse_color_attrs(e),
        _ => {}
    }
}

fn parse_alignment(e: &BytesStart<'_>) -> Alignment {
    Alignment {
        horizontal: attr(e, b"horizontal")
            .as_deref()
            .and_then(HorizontalAlignment::from_xml)
            .unwrap_or_default(),
        vertical: attr(e, b"vertical")
            .as_deref()
            .and_then(VerticalAlignment::from_xml)
            .unwrap_or_default(),
        wrap_text: attr(e, b"wrapText").as_deref().is_some_and(is_true),
    }
}

fn resolve_style(
    xf: &PendingXf,
    numfmts: &HashMap<u32, String>,
    fonts: &[FontStyle],
    fills: &[FillStyle],
) -> Style {
    let number_format = match numfmts.get(&xf.num_fmt_id) {
        Some(code) => NumberFormat::from_code(code),
        None => NumberFormat::from_id(xf.num_fmt_id),
    };
    Style {
        font: fonts.get(xf.font_id as usize).cloned().unwrap_or_default(),
        fill: fills.get(xf.fill_id as usize).copied().unwrap_or_default(),
        alignment: xf.alignment,
        number_format,
    }
}

fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    // Priority: rgb > theme > indexed > auto
    if let Some(color) = attr(e, b"rgb").as_deref().and_then(Color::from_hex) {
        return color;
    }

    if let Some(index) = attr(e, b"theme").and_then(|s| s.parse::<u8>().ok()) {
        let tint = attr(e, b"tint")
            .and_then(|s| s.parse::<f64>().ok())
            .map(|t| (t * 100.0).round().clamp(-100.0, 100.0) as i8)
            .unwrap_or(0);
        return Color::Theme { index, tint };
    }

    if let Some(i) = attr(e, b"indexed").and_then(|s| s.parse::<u8>().ok()) {
        return Color::Indexed(i);
    }

    Color::Auto
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetward_core::CellAddress;

    #[test]
    fn test_table_deduplicates_across_sheets() {
        let mut wb = Workbook::new();
        wb.add_worksheet().unwrap();
        let bold = Style::new().bold(true);
        for i in 0..2 {
            let sheet = wb.worksheet_mut(i).unwrap();
            sheet.set_style_at(CellAddress::new(1, 1), &bold).unwrap();
        }

        let table = XlsxStyleTable::build(&wb);
        assert_eq!(table.styles.len(), 2);
        assert_eq!(table.xf_id_for(0, 1), 1);
        assert_eq!(table.xf_id_for(1, 1), 1);
        assert_eq!(table.xf_id_for(1, 0), 0);
    }

    #[test]
    fn test_styles_round_trip_through_xml() {
        let mut wb = Workbook::new();
        let styled = Style::new()
            .bold(true)
            .italic(true)
            .font_name("Arial")
            .font_size(14.5)
            .font_color(Color::RED)
            .fill_color(Color::Theme { index: 4, tint: 40 })
            .horizontal_alignment(HorizontalAlignment::Center)
            .wrap_text(true)
            .number_format("yyyy-mm-dd");
        wb.worksheet_mut(0)
            .unwrap()
            .set_style_at(CellAddress::new(2, 2), &styled)
            .unwrap();

        let xml = XlsxStyleTable::build(&wb).to_styles_xml();
        let styles = read_styles_xml(xml.as_bytes()).unwrap();

        assert_eq!(styles.len(), 2);
        assert_eq!(styles[0], Style::default());
        assert_eq!(styles[1], styled);
    }

    #[test]
    fn test_read_excel_style_sheet() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="165" formatCode="0.000"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><color theme="1"/><name val="Calibri"/><family val="2"/></font>
    <font><b/><u val="double"/><sz val="12"/><color rgb="FF0000FF"/><name val="Arial"/></font>
  </fonts>
  <fills count="3">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"/><bgColor indexed="64"/></patternFill></fill>
  </fills>
  <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="1" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="165" fontId="1" fillId="2" borderId="0" xfId="0" applyFont="1">
      <alignment vertical="top"/>
    </xf>
    <xf numFmtId="10" fontId="0" fillId="1" borderId="0" xfId="0"/>
  </cellXfs>
  <dxfs count="1"><dxf><font><b/></font></dxf></dxfs>
</styleSheet>"#;
        let styles = read_styles_xml(xml).unwrap();
        assert_eq!(styles.len(), 3);

        let s = &styles[1];
        assert!(s.font.bold);
        assert_eq!(s.font.underline, Underline::Double);
        assert_eq!(s.font.name, "Arial");
        assert_eq!(s.font.color, Color::BLUE);
        assert_eq!(s.fill, FillStyle::solid(Color::YELLOW));
        assert_eq!(s.alignment.vertical, VerticalAlignment::Top);
        assert_eq!(s.number_format, NumberFormat::Custom("0.000".into()));

        assert_eq!(styles[0].font.color, Color::Theme { index: 1, tint: 0 });
        assert_eq!(styles[2].fill, FillStyle::None);
        assert_eq!(styles[2].number_format, NumberFormat::BuiltIn(10));
    }

    #[test]
    fn test_write_color_variants() {
        assert_eq!(write_color("color", &Color::RED), "<color rgb=\"FFFF0000\"/>");
        assert_eq!(
            write_color("fgColor", &Color::Theme { index: 3, tint: -25 }),
            "<fgColor theme=\"3\" tint=\"-0.25\"/>"
        );
        assert_eq!(write_color("fgColor", &Color::Auto), "<fgColor auto=\"1\"/>");
    }
}
