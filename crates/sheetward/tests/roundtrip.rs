//! Decode/encode round trips through the public byte-level API

mod common;

use pretty_assertions::assert_eq;
use sheetward::prelude::*;
use sheetward::{access, decode, decode_with_options, encode, DecodeOptions, MacroArchive};

#[test]
fn test_sheets_and_values_survive() {
    let original = common::three_sheet_workbook();
    let decoded = decode(&encode(&original).unwrap(), false).unwrap();

    assert_eq!(
        decoded.sheet_names(),
        vec!["Summary".to_string(), "Secret".to_string(), "Data".to_string()]
    );
    for (a, b) in original.worksheets().zip(decoded.worksheets()) {
        assert_eq!(a.visibility(), b.visibility());
        let left: Vec<_> = access::iter_cells(a, true, false)
            .map(|v| (v.address, v.value.clone(), v.formula.map(str::to_string)))
            .collect();
        let right: Vec<_> = access::iter_cells(b, true, false)
            .map(|v| (v.address, v.value.clone(), v.formula.map(str::to_string)))
            .collect();
        assert_eq!(left, right, "sheet {}", a.name());
    }

    let summary = decoded.worksheet(0).unwrap();
    assert_eq!(
        summary.get_value("A2").unwrap().formula_text(),
        Some("=Data!B5")
    );
}

#[test]
fn test_set_cell_hello_round_trip() {
    let mut wb = Workbook::from_xlsx_bytes(&Workbook::new().to_xlsx_bytes().unwrap()).unwrap();
    let report = wb.apply_operations(&[Operation::SetCell {
        sheet: Some("Sheet1".into()),
        coord: CellAddress::new(1, 1),
        value: "Hello".into(),
    }]);
    assert_eq!(report.succeeded(), 1);

    let decoded = Workbook::from_xlsx_bytes(&wb.to_xlsx_bytes().unwrap()).unwrap();
    let value = access::cell_value(&decoded, Some("Sheet1"), CellAddress::new(1, 1)).unwrap();
    assert_eq!(value, &CellValue::string("Hello"));
}

#[test]
fn test_ten_thousand_rows() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    for row in 1..=10_000u32 {
        let addr = CellAddress::new(row, (row % 7) + 1);
        sheet.set_value_at(addr, row as f64).unwrap();
    }

    let decoded = decode(&encode(&wb).unwrap(), false).unwrap();
    let sheet = decoded.worksheet(0).unwrap();
    assert_eq!(access::iter_cells(sheet, false, false).count(), 10_000);
    assert_eq!(sheet.max_row(), 10_000);

    let rows: Vec<u32> = access::iter_cells(sheet, false, false)
        .map(|v| v.address.row)
        .take(3)
        .collect();
    assert_eq!(rows, vec![1, 2, 3]);
}

#[test]
fn test_empty_sheet() {
    let decoded = decode(&encode(&Workbook::new()).unwrap(), false).unwrap();
    let sheet = access::get_sheet(&decoded, None).unwrap();
    assert_eq!(access::iter_cells(sheet, true, true).count(), 0);
    assert_eq!((sheet.max_row(), sheet.max_column()), (0, 0));
}

#[test]
fn test_encoding_is_deterministic() {
    let wb = common::three_sheet_workbook();
    assert_eq!(encode(&wb).unwrap(), encode(&wb).unwrap());

    let bytes = encode(&wb).unwrap();
    let reencoded = encode(&decode(&bytes, false).unwrap()).unwrap();
    assert_eq!(bytes, reencoded);
}

#[test]
fn test_malformed_input() {
    let err = decode(b"definitely not a spreadsheet", false).unwrap_err();
    assert_eq!(err.code(), "corrupt_container");

    let mut ole = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
    ole.resize(512, 0);
    assert_eq!(decode(&ole, false).unwrap_err().code(), "unsupported_format");

    let mut truncated = common::three_sheet_bytes();
    truncated.truncate(truncated.len() / 2);
    assert!(decode(&truncated, false).is_err());
}

#[test]
fn test_cell_ceiling() {
    let bytes = common::three_sheet_bytes();
    let total: usize = decode(&bytes, false)
        .unwrap()
        .worksheets()
        .map(|ws| access::iter_cells(ws, false, false).count())
        .sum();

    let tight = DecodeOptions {
        max_cells: total - 1,
        ..DecodeOptions::default()
    };
    assert_eq!(
        decode_with_options(&bytes, &tight).unwrap_err().code(),
        "too_many_cells"
    );

    let exact = DecodeOptions {
        max_cells: total,
        ..DecodeOptions::default()
    };
    assert!(decode_with_options(&bytes, &exact).is_ok());
}

#[test]
fn test_macro_project_preserved_on_request() {
    let project = b"fake vba project bytes".to_vec();
    let bytes = common::with_macro_project(&common::three_sheet_bytes(), &project);

    assert_eq!(
        decode(&bytes, false).unwrap().macro_archive(),
        &MacroArchive::NotInspected
    );

    let kept = decode(&bytes, true).unwrap();
    assert_eq!(kept.macro_archive(), &MacroArchive::Present(project.clone()));

    let rewritten = encode(&kept).unwrap();
    assert!(common::part_names(&rewritten).contains(&"xl/vbaProject.bin".to_string()));
    assert_eq!(
        decode(&rewritten, true).unwrap().macro_archive(),
        &MacroArchive::Present(project)
    );
}
