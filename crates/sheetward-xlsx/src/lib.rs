//! # sheetward-xlsx
//!
//! Container codec for sheetward: converts between XLSX (Office Open XML)
//! package bytes and an in-memory [`Workbook`].
//!
//! The codec never touches the filesystem. Callers hand it a byte buffer and
//! get one back.
//!
//! ```rust
//! use sheetward_core::Workbook;
//!
//! let mut workbook = Workbook::new();
//! workbook
//!     .worksheet_mut(0)
//!     .unwrap()
//!     .set_cell_value("A1", "Hello")
//!     .unwrap();
//!
//! let bytes = sheetward_xlsx::encode(&workbook).unwrap();
//! let decoded = sheetward_xlsx::decode(&bytes, false).unwrap();
//! assert_eq!(decoded.sheet_names(), vec!["Sheet1"]);
//! ```

pub mod error;
pub mod reader;
pub mod writer;

mod package;
mod styles;
mod xml;

pub use error::{CodecError, CodecResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;

use sheetward_core::Workbook;

/// Default ceiling on non-empty cells across a whole document
pub const DEFAULT_MAX_CELLS: usize = 2_000_000;

/// Options for [`decode_with_options`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Keep the raw macro project so it can be scanned and written back
    pub preserve_macros: bool,
    /// Fail with [`CodecError::TooManyCells`] once more cells than this have
    /// been stored; cells that only carry a style count too
    pub max_cells: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            preserve_macros: false,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

/// Decode package bytes with the default cell ceiling
pub fn decode(bytes: &[u8], preserve_macros: bool) -> CodecResult<Workbook> {
    decode_with_options(
        bytes,
        &DecodeOptions {
            preserve_macros,
            ..DecodeOptions::default()
        },
    )
}

/// Decode package bytes
pub fn decode_with_options(bytes: &[u8], options: &DecodeOptions) -> CodecResult<Workbook> {
    XlsxReader::read(bytes, options)
}

/// Encode a workbook into package bytes
///
/// Encoding the same workbook twice yields identical bytes.
pub fn encode(workbook: &Workbook) -> CodecResult<Vec<u8>> {
    XlsxWriter::write(workbook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetward_core::{
        CellAddress, CellRange, CellValue, Chart, ChartAnchor, ChartKind, Color, DataReference,
        DataSeries, HorizontalAlignment, MacroArchive, SheetVisibility, Style,
    };

    fn sample_workbook() -> Workbook {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Sales Data").unwrap();
        wb.add_worksheet_with_name("Hidden").unwrap();
        wb.worksheet_mut(2)
            .unwrap()
            .set_visibility(SheetVisibility::Hidden);

        let sheet = wb.worksheet_mut(1).unwrap();
        sheet.set_cell_value("A1", "Month").unwrap();
        sheet.set_cell_value("B1", "Revenue").unwrap();
        for (i, (month, revenue)) in [("Jan", 10.5), ("Feb", 12.0), ("Mar", -3.25)]
            .iter()
            .enumerate()
        {
            let row = i as u32 + 2;
            sheet.set_value_at(CellAddress::new(row, 1), *month).unwrap();
            sheet.set_value_at(CellAddress::new(row, 2), *revenue).unwrap();
        }
        sheet
            .set_value_at(
                CellAddress::new(5, 2),
                CellValue::formula_with_cached("=SUM(B2:B4)", CellValue::Number(19.25)),
            )
            .unwrap();
        sheet
            .set_style_at(
                CellAddress::new(1, 1),
                &Style::new()
                    .bold(true)
                    .fill_color(Color::YELLOW)
                    .horizontal_alignment(HorizontalAlignment::Center),
            )
            .unwrap();

        let mut chart = Chart::new(
            ChartKind::Line,
            ChartAnchor::with_size(CellAddress::new(1, 4), 8, 15),
        );
        chart.title = Some("Revenue".into());
        chart.y_axis_title = Some("USD".into());
        chart.series.push(DataSeries {
            name: Some(DataReference::cell("Sales Data", CellAddress::new(1, 2))),
            categories: Some(DataReference::new(
                "Sales Data",
                CellRange::parse("A2:A4").unwrap(),
            )),
            values: DataReference::new("Sales Data", CellRange::parse("B2:B4").unwrap()),
        });
        sheet.add_chart(chart);

        wb
    }

    #[test]
    fn test_round_trip() {
        let wb = sample_workbook();
        let decoded = decode(&encode(&wb).unwrap(), true).unwrap();

        assert_eq!(decoded.sheet_names(), wb.sheet_names());
        for (original, read) in wb.worksheets().zip(decoded.worksheets()) {
            assert_eq!(original.visibility(), read.visibility());
            let a: Vec<_> = original.iter_cells().map(|(addr, c)| (addr, c.value.clone())).collect();
            let b: Vec<_> = read.iter_cells().map(|(addr, c)| (addr, c.value.clone())).collect();
            assert_eq!(a, b);
        }

        let sheet = decoded.worksheet_by_name("Sales Data").unwrap();
        assert_eq!(
            sheet.cell_style_at(CellAddress::new(1, 1)),
            wb.worksheet(1).unwrap().cell_style_at(CellAddress::new(1, 1))
        );
        assert_eq!(sheet.charts(), wb.worksheet(1).unwrap().charts());
        assert_eq!(decoded.macro_archive(), &MacroArchive::Absent);
    }

    #[test]
    fn test_reencode_is_stable() {
        let first = encode(&sample_workbook()).unwrap();
        let second = encode(&decode(&first, false).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_text_with_control_characters() {
        let mut wb = Workbook::new();
        let text = "line1\r\nline2\ttab _x0041_ literal";
        wb.worksheet_mut(0).unwrap().set_cell_value("A1", text).unwrap();

        let decoded = decode(&encode(&wb).unwrap(), false).unwrap();
        assert_eq!(
            decoded.worksheet(0).unwrap().get_value("A1").unwrap(),
            CellValue::string(text)
        );
    }

    #[test]
    fn test_cell_ceiling() {
        let mut wb = Workbook::new();
        let sheet = wb.worksheet_mut(0).unwrap();
        for row in 1..=20 {
            sheet.set_value_at(CellAddress::new(row, 1), row as f64).unwrap();
        }
        let bytes = encode(&wb).unwrap();

        let options = DecodeOptions {
            max_cells: 19,
            ..DecodeOptions::default()
        };
        assert_eq!(
            decode_with_options(&bytes, &options).unwrap_err(),
            CodecError::TooManyCells { limit: 19 }
        );
        let options = DecodeOptions {
            max_cells: 20,
            ..DecodeOptions::default()
        };
        assert!(decode_with_options(&bytes, &options).is_ok());
    }
}
