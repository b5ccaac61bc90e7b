//! Scanner scenarios over encoded packages

mod common;

use pretty_assertions::assert_eq;
use sheetward::prelude::*;
use sheetward::{scan_bytes, CheckId, FindingStatus, MAX_FINDING_DETAILS};

fn statuses(report: &ScanReport) -> Vec<(CheckId, FindingStatus)> {
    report.findings.iter().map(|f| (f.check, f.status)).collect()
}

#[test]
fn test_hidden_second_sheet() {
    let report = scan_bytes(&common::three_sheet_bytes(), &ScanConfig::default()).unwrap();

    assert_eq!(
        statuses(&report),
        vec![
            (CheckId::MacroCheck, FindingStatus::Safe),
            (CheckId::HiddenSheetsCheck, FindingStatus::Warning),
            (CheckId::ExternalLinksCheck, FindingStatus::Safe),
        ]
    );
    let hidden = report.finding(CheckId::HiddenSheetsCheck).unwrap();
    assert_eq!(hidden.details, vec!["Secret".to_string()]);
    assert_eq!(report.risk_level, RiskLevel::Medium);
    assert_eq!(report.recommendations.len(), 1);
}

#[test]
fn test_clean_workbook_is_low_risk() {
    let mut wb = Workbook::new();
    wb.worksheet_mut(0)
        .unwrap()
        .set_cell_value("A1", "nothing to see")
        .unwrap();
    let report = scan_bytes(&wb.to_xlsx_bytes().unwrap(), &ScanConfig::default()).unwrap();

    assert!(report.findings.iter().all(|f| f.status == FindingStatus::Safe));
    assert_eq!(report.risk_level, RiskLevel::Low);
}

#[test]
fn test_macro_project_flagged() {
    let bytes = common::with_macro_project(&common::three_sheet_bytes(), b"Attribute VB_Name");
    let config = ScanConfig::only([CheckId::MacroCheck]);
    let report = scan_bytes(&bytes, &config).unwrap();

    assert_eq!(
        statuses(&report),
        vec![(CheckId::MacroCheck, FindingStatus::Warning)]
    );
    assert_eq!(report.risk_level, RiskLevel::Medium);
}

#[test]
fn test_macro_check_without_preserved_project_is_error() {
    let wb = Workbook::from_xlsx_bytes(&common::three_sheet_bytes()).unwrap();
    let report = wb.scan(&ScanConfig::only([CheckId::MacroCheck]));

    assert_eq!(
        statuses(&report),
        vec![(CheckId::MacroCheck, FindingStatus::Error)]
    );
    assert_eq!(report.risk_level, RiskLevel::Medium);
}

#[test]
fn test_disabled_checks_are_omitted() {
    let config = ScanConfig::default().without([CheckId::HiddenSheetsCheck]);
    let report = scan_bytes(&common::three_sheet_bytes(), &config).unwrap();

    assert_eq!(report.findings.len(), 2);
    assert!(report.finding(CheckId::HiddenSheetsCheck).is_none());
    assert_eq!(report.risk_level, RiskLevel::Low);
}

#[test]
fn test_external_links_located() {
    let mut wb = common::three_sheet_workbook();
    let data = wb.worksheet_by_name_mut("Data").unwrap();
    for row in 10..25 {
        data.set_formula_at(CellAddress::new(row, 1), "[Budget.xlsx]Plan!B2*2")
            .unwrap();
    }
    let bytes = wb.to_xlsx_bytes().unwrap();
    let report = scan_bytes(&bytes, &ScanConfig::only([CheckId::ExternalLinksCheck])).unwrap();

    let finding = report.finding(CheckId::ExternalLinksCheck).unwrap();
    assert_eq!(finding.status, FindingStatus::Warning);
    assert_eq!(finding.message, "15 formulas referencing other workbooks");
    assert_eq!(finding.details.len(), MAX_FINDING_DETAILS);
    assert_eq!(finding.details[0], "Data!A10");
}

#[test]
fn test_report_serializes_flat() {
    let report = scan_bytes(&common::three_sheet_bytes(), &ScanConfig::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["risk_level"], "medium");
    assert_eq!(json["findings"][1]["check"], "hidden_sheets_check");
    assert_eq!(json["findings"][1]["details"][0], "Secret");
    assert!(json["findings"][0].get("details").is_none());
}
