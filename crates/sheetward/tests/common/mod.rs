//! Fixtures shared by the integration tests

#![allow(dead_code)]

use sheetward::prelude::*;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;

/// Three sheets: "Summary", a hidden "Secret" and "Data" with a header row,
/// three data rows and a total formula
pub fn three_sheet_workbook() -> Workbook {
    let mut wb = Workbook::empty();
    for name in ["Summary", "Secret", "Data"] {
        wb.add_worksheet_with_name(name).unwrap();
    }
    wb.worksheet_mut(1)
        .unwrap()
        .set_visibility(SheetVisibility::Hidden);

    let summary = wb.worksheet_mut(0).unwrap();
    summary.set_cell_value("A1", "Quarterly report").unwrap();
    summary
        .set_formula_at(CellAddress::new(2, 1), "=Data!B5")
        .unwrap();

    let secret = wb.worksheet_mut(1).unwrap();
    secret.set_cell_value("A1", "salary").unwrap();
    secret.set_cell_value("B1", 98000.0).unwrap();

    let data = wb.worksheet_mut(2).unwrap();
    data.set_cell_value("A1", "Month").unwrap();
    data.set_cell_value("B1", "Revenue").unwrap();
    data.set_cell_value("C1", "Cost").unwrap();
    let rows = [("Jan", 120.0, 80.0), ("Feb", 135.5, 82.25), ("Mar", 150.0, 90.0)];
    for (row, (month, revenue, cost)) in rows.into_iter().enumerate() {
        let row = row as u32 + 2;
        data.set_value_at(CellAddress::new(row, 1), month).unwrap();
        data.set_value_at(CellAddress::new(row, 2), revenue).unwrap();
        data.set_value_at(CellAddress::new(row, 3), cost).unwrap();
    }
    data.set_formula_at(CellAddress::new(5, 2), "SUM(B2:B4)").unwrap();
    data.set_value_at(CellAddress::new(5, 3), true).unwrap();

    wb
}

pub fn three_sheet_bytes() -> Vec<u8> {
    three_sheet_workbook().to_xlsx_bytes().unwrap()
}

/// Copy a package, adding `xl/vbaProject.bin`
pub fn with_macro_project(package: &[u8], project: &[u8]) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(package)).unwrap();
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let name = file.name().to_string();
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        writer.start_file(name, options).unwrap();
        writer.write_all(&content).unwrap();
    }
    writer.start_file("xl/vbaProject.bin", options).unwrap();
    writer.write_all(project).unwrap();

    writer.finish().unwrap().into_inner()
}

/// Names of the parts in a package, in archive order
pub fn part_names(package: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(package)).unwrap();
    archive.file_names().map(str::to_string).collect()
}
