//! Worksheet and shared string parts

use std::collections::HashMap;

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::formula::shift_formula;
use crate::error::{CodecError, CodecResult};
use crate::xml::{attr, decode_excel_escapes, is_true, local_attr};
use sheetward_core::style::Style;
use sheetward_core::{CellAddress, CellData, CellError, CellValue, SharedString, Worksheet};

/// Read the shared string table
///
/// Rich text runs are concatenated; phonetic hints are dropped.
pub(crate) fn read_shared_strings(xml: &[u8], part: &str) -> CodecResult<Vec<SharedString>> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);

    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_si && !in_phonetic => in_t = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                strings.push(SharedString::new(""));
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(SharedString::new(decode_excel_escapes(&current)));
                    in_si = false;
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Text(e)) if in_t => {
                let text = e.unescape().map_err(|e| CodecError::malformed_xml(part, e))?;
                current.push_str(&text);
            }
            Ok(Event::CData(e)) if in_t => {
                current.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CodecError::malformed_xml(part, e)),
            _ => {}
        }
        buf.clear();
    }

    debug!("{}: {} shared strings", part, strings.len());
    Ok(strings)
}

/// Workbook-wide inputs for reading one worksheet
pub(crate) struct SheetContext<'a> {
    pub shared_strings: &'a [SharedString],
    /// Resolved `cellXfs`, indexed by the `s` attribute
    pub cell_styles: &'a [Style],
    pub max_cells: usize,
}

/// Running state across every worksheet of one decode
#[derive(Debug, Default)]
pub(crate) struct CellBudget {
    /// Cells stored so far, style-only cells included
    pub stored: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TextSlot {
    Value,
    Formula,
    InlineText,
}

#[derive(Debug, Clone, PartialEq)]
enum FormulaKind {
    Normal,
    /// `t="shared"`; the master carries text, dependents only `si`
    Shared(String),
    /// Array formulas and data tables keep their text on the anchor cell only
    Other,
}

#[derive(Debug)]
struct PendingCell {
    addr: CellAddress,
    cell_type: Option<String>,
    xf: u32,
    value: String,
    has_value: bool,
    formula: String,
    formula_kind: Option<FormulaKind>,
}

impl PendingCell {
    fn new(addr: CellAddress, e: &BytesStart<'_>) -> Self {
        Self {
            addr,
            cell_type: attr(e, b"t"),
            xf: attr(e, b"s").and_then(|s| s.parse().ok()).unwrap_or(0),
            value: String::new(),
            has_value: false,
            formula: String::new(),
            formula_kind: None,
        }
    }
}

struct SheetReader<'a, 'w> {
    part: &'a str,
    ctx: &'a SheetContext<'a>,
    worksheet: &'w mut Worksheet,
    budget: &'a mut CellBudget,
    /// xf id -> index in the worksheet's style pool
    style_map: HashMap<u32, u32>,
    /// Shared formula group -> (master cell, formula text without `=`)
    shared: HashMap<String, (CellAddress, String)>,
}

/// Read a worksheet part into `worksheet`
///
/// Returns the relationship id of the sheet's drawing, if any.
pub(crate) fn read_worksheet(
    xml: &[u8],
    part: &str,
    worksheet: &mut Worksheet,
    ctx: &SheetContext<'_>,
    budget: &mut CellBudget,
) -> CodecResult<Option<String>> {
    let mut sheet = SheetReader {
        part,
        ctx,
        worksheet,
        budget,
        style_map: HashMap::new(),
        shared: HashMap::new(),
    };

    let mut reader = Reader::from_reader(xml);
    // Whitespace inside <v>, <f> and <t> is significant
    reader.trim_text(false);

    let mut buf = Vec::new();
    let mut drawing_rid = None;

    let mut row: u32 = 0;
    let mut col: u32 = 0;
    let mut in_sheet_data = false;
    let mut current: Option<PendingCell> = None;
    let mut slot: Option<TextSlot> = None;
    let mut in_inline = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sheetData" => in_sheet_data = true,
                b"row" if in_sheet_data => {
                    row = next_row(&e, row)?;
                    col = 0;
                }
                b"c" if in_sheet_data => {
                    let addr = cell_address(&e, row, col, part)?;
                    (row, col) = (addr.row, addr.col);
                    current = Some(PendingCell::new(addr, &e));
                }
                b"v" if current.is_some() => slot = Some(TextSlot::Value),
                b"f" => {
                    if let Some(cell) = current.as_mut() {
                        cell.formula_kind = Some(formula_kind(&e));
                        slot = Some(TextSlot::Formula);
                    }
                }
                b"is" if current.is_some() => in_inline = true,
                b"t" if in_inline => slot = Some(TextSlot::InlineText),
                b"rPh" if in_inline => in_inline = false,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" if in_sheet_data => {
                    row = next_row(&e, row)?;
                    col = 0;
                }
                b"c" if in_sheet_data => {
                    let addr = cell_address(&e, row, col, part)?;
                    (row, col) = (addr.row, addr.col);
                    sheet.store(PendingCell::new(addr, &e))?;
                }
                b"f" => {
                    if let Some(cell) = current.as_mut() {
                        cell.formula_kind = Some(formula_kind(&e));
                    }
                }
                b"drawing" => drawing_rid = local_attr(&e, b"id"),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if let (Some(target), Some(cell)) = (slot, current.as_mut()) {
                    let text = e.unescape().map_err(|e| CodecError::malformed_xml(part, e))?;
                    match target {
                        TextSlot::Value | TextSlot::InlineText => {
                            cell.value.push_str(&text);
                            cell.has_value = true;
                        }
                        TextSlot::Formula => cell.formula.push_str(&text),
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"sheetData" => in_sheet_data = false,
                b"c" => {
                    if let Some(cell) = current.take() {
                        sheet.store(cell)?;
                    }
                    in_inline = false;
                    slot = None;
                }
                b"v" | b"f" | b"t" => slot = None,
                b"is" => in_inline = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(CodecError::malformed_xml(part, e)),
            _ => {}
        }
        buf.clear();
    }

    debug!(
        "{}: {} cells, extent {}x{}",
        part,
        sheet.worksheet.cell_count(),
        sheet.worksheet.max_row(),
        sheet.worksheet.max_column()
    );
    Ok(drawing_rid)
}

fn next_row(e: &BytesStart<'_>, previous: u32) -> CodecResult<u32> {
    match attr(e, b"r") {
        Some(r) => r
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|r| (1..=sheetward_core::MAX_ROWS).contains(r))
            .ok_or_else(|| CodecError::corrupt(format!("invalid row number '{}'", r))),
        None => Ok(previous + 1),
    }
}

/// Address from the `r` attribute, or the cell after the previous one
fn cell_address(e: &BytesStart<'_>, row: u32, col: u32, part: &str) -> CodecResult<CellAddress> {
    let addr = match attr(e, b"r") {
        Some(r) => CellAddress::parse(&r)
            .map_err(|_| CodecError::corrupt(format!("{}: invalid cell reference '{}'", part, r)))?,
        None => CellAddress::new(row.max(1), col + 1),
    };
    addr.validate()
        .map_err(|err| CodecError::corrupt(format!("{}: {}", part, err)))?;
    Ok(addr)
}

fn formula_kind(e: &BytesStart<'_>) -> FormulaKind {
    match attr(e, b"t").as_deref() {
        None | Some("normal") => FormulaKind::Normal,
        Some("shared") => FormulaKind::Shared(attr(e, b"si").unwrap_or_default()),
        Some(_) => FormulaKind::Other,
    }
}

impl SheetReader<'_, '_> {
    fn store(&mut self, cell: PendingCell) -> CodecResult<()> {
        let cached = self.cached_value(&cell)?;
        let value = match self.formula_text(&cell) {
            Some(text) => CellValue::formula_with_cached(format!("={}", text), cached),
            None => cached,
        };
        let style_index = self.local_style(cell.xf);

        if value.is_empty() && style_index == 0 {
            return Ok(());
        }
        self.budget.stored += 1;
        if self.budget.stored > self.ctx.max_cells {
            return Err(CodecError::TooManyCells {
                limit: self.ctx.max_cells,
            });
        }

        self.worksheet
            .set_cell_data_at(cell.addr, CellData::with_style(value, style_index))
            .map_err(|err| CodecError::corrupt(format!("{}: {}", self.part, err)))
    }

    /// Formula text without the leading `=`, expanding shared formulas
    fn formula_text(&mut self, cell: &PendingCell) -> Option<String> {
        let text = cell.formula.trim_start_matches('=');
        match cell.formula_kind.as_ref()? {
            FormulaKind::Normal | FormulaKind::Other => {
                (!text.is_empty()).then(|| text.to_string())
            }
            FormulaKind::Shared(si) if !text.is_empty() => {
                self.shared
                    .insert(si.clone(), (cell.addr, text.to_string()));
                Some(text.to_string())
            }
            FormulaKind::Shared(si) => {
                let (master, master_text) = self.shared.get(si)?;
                Some(shift_formula(
                    master_text,
                    i64::from(cell.addr.row) - i64::from(master.row),
                    i64::from(cell.addr.col) - i64::from(master.col),
                ))
            }
        }
    }

    /// Plain value, or the cached result of a formula cell
    fn cached_value(&self, cell: &PendingCell) -> CodecResult<CellValue> {
        if !cell.has_value {
            return Ok(CellValue::Empty);
        }
        let raw = cell.value.as_str();

        Ok(match cell.cell_type.as_deref() {
            Some("s") => {
                let index: usize = raw.trim().parse().map_err(|_| {
                    CodecError::corrupt(format!("{}: invalid shared string index '{}'", self.part, raw))
                })?;
                let s = self.ctx.shared_strings.get(index).ok_or_else(|| {
                    CodecError::corrupt(format!(
                        "{}: shared string index {} out of range",
                        self.part, index
                    ))
                })?;
                CellValue::String(s.clone())
            }
            Some("inlineStr") | Some("str") => CellValue::string(decode_excel_escapes(raw)),
            Some("b") => CellValue::Boolean(is_true(raw.trim())),
            Some("e") => match CellError::parse(raw) {
                Some(err) => CellValue::Error(err),
                None => CellValue::string(raw),
            },
            // ISO 8601 dates stay text; there is no date type in the model
            Some("d") => CellValue::string(raw),
            _ => match raw.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) if raw.is_empty() => CellValue::Empty,
                Err(_) => CellValue::string(raw),
            },
        })
    }

    fn local_style(&mut self, xf: u32) -> u32 {
        if xf == 0 {
            return 0;
        }
        if let Some(&index) = self.style_map.get(&xf) {
            return index;
        }
        let index = match self.ctx.cell_styles.get(xf as usize) {
            Some(style) => self.worksheet.style_pool_mut().get_or_insert(style.clone()),
            None => 0,
        };
        self.style_map.insert(xf, index);
        index
    }
}
