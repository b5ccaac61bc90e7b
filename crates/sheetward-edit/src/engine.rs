//! Sequential, best-effort application of operations

use crate::error::{EditError, EditResult};
use crate::operation::{CellInput, Operation, OperationRecord};
use log::{debug, warn};
use serde::Serialize;
use sheetward_core::{access, CellAddress, Workbook, Worksheet};

/// Result of one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationStatus {
    Succeeded,
    Failed { reason: String },
}

/// Outcome of the operation at `index` in the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub index: usize,
    pub kind: String,
    #[serde(flatten)]
    pub status: OperationStatus,
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Succeeded
    }
}

/// Per-operation results of a batch, in batch order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MutationReport {
    pub outcomes: Vec<OperationOutcome>,
}

impl MutationReport {
    /// Number of operations that took effect
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of operations that were rejected
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// One-line summary, e.g. "12 of 15 operations succeeded"
    pub fn summary(&self) -> String {
        format!(
            "{} of {} operations succeeded",
            self.succeeded(),
            self.outcomes.len()
        )
    }

    fn record(&mut self, index: usize, kind: &str, result: EditResult<()>) {
        let status = match result {
            Ok(()) => {
                debug!("operation {} ({}) applied", index, kind);
                OperationStatus::Succeeded
            }
            Err(e) => {
                warn!("operation {} ({}) failed: {}", index, kind, e);
                OperationStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };
        self.outcomes.push(OperationOutcome {
            index,
            kind: kind.to_string(),
            status,
        });
    }
}

/// Apply every operation in order
///
/// Later operations see the effects of earlier ones, including sheet bounds
/// grown by an append.
pub fn apply(wb: &mut Workbook, ops: &[Operation]) -> MutationReport {
    let mut report = MutationReport::default();
    for (index, op) in ops.iter().enumerate() {
        report.record(index, op.kind(), apply_operation(wb, op));
    }
    report
}

/// Apply a parsed batch; undecodable records are reported as failures
pub fn apply_records(wb: &mut Workbook, records: &[OperationRecord]) -> MutationReport {
    let mut report = MutationReport::default();
    for (index, record) in records.iter().enumerate() {
        let result = match record {
            OperationRecord::Valid(op) => apply_operation(wb, op),
            OperationRecord::Invalid { reason, .. } => {
                Err(EditError::InvalidOperation(reason.clone()))
            }
        };
        report.record(index, record.kind(), result);
    }
    report
}

/// Apply a single operation
///
/// Inputs are validated before the sheet is touched.
pub fn apply_operation(wb: &mut Workbook, op: &Operation) -> EditResult<()> {
    let sheet = access::get_sheet_mut(wb, op.sheet())?;

    match op {
        Operation::SetCell { coord, value, .. } => {
            sheet.set_value_at(*coord, value.to_cell_value())?;
        }
        Operation::SetRange {
            top_left, values, ..
        } => set_range(sheet, *top_left, values)?,
        Operation::AddFormula { coord, formula, .. } => {
            let formula = formula.trim();
            if formula.is_empty() || formula == "=" {
                return Err(EditError::EmptyFormula);
            }
            sheet.set_formula_at(*coord, formula)?;
        }
        Operation::FormatCell { coord, style, .. } => {
            coord.validate()?;
            let current = sheet.cell_style_at(*coord).cloned().unwrap_or_default();
            let merged = style.apply_to(&current)?;
            sheet.set_style_at(*coord, &merged)?;
        }
        Operation::AppendRow { values, .. } => {
            if values.is_empty() {
                return Err(EditError::EmptyValues { kind: op.kind() });
            }
            let start = CellAddress::checked(sheet.max_row() + 1, 1)?;
            write_line(sheet, start, values, (0, 1))?;
        }
        Operation::AppendColumn { values, .. } => {
            if values.is_empty() {
                return Err(EditError::EmptyValues { kind: op.kind() });
            }
            let start = CellAddress::checked(1, sheet.max_column() + 1)?;
            write_line(sheet, start, values, (1, 0))?;
        }
    }
    Ok(())
}

fn set_range(
    sheet: &mut Worksheet,
    top_left: CellAddress,
    values: &[Vec<CellInput>],
) -> EditResult<()> {
    if values.iter().all(|row| row.is_empty()) {
        return Err(EditError::EmptyValues { kind: "set_range" });
    }
    top_left.validate()?;

    let width = values.iter().map(Vec::len).max().unwrap_or(0) as u32;
    let height = values.len() as u32;
    CellAddress::checked(
        top_left.row.saturating_add(height - 1),
        top_left.col.saturating_add(width.saturating_sub(1)),
    )?;

    for (r, row) in values.iter().enumerate() {
        let start = CellAddress::new(top_left.row + r as u32, top_left.col);
        if !row.is_empty() {
            write_line(sheet, start, row, (0, 1))?;
        }
    }
    Ok(())
}

/// Write `values` from `start`, stepping by `(rows, cols)` per value
fn write_line(
    sheet: &mut Worksheet,
    start: CellAddress,
    values: &[CellInput],
    step: (u32, u32),
) -> EditResult<()> {
    let last = values.len() as u32 - 1;
    CellAddress::checked(
        start.row.saturating_add(step.0 * last),
        start.col.saturating_add(step.1 * last),
    )?;

    for (i, value) in values.iter().enumerate() {
        let i = i as u32;
        let addr = CellAddress::new(start.row + step.0 * i, start.col + step.1 * i);
        sheet.set_value_at(addr, value.to_cell_value())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::StylePatch;
    use pretty_assertions::assert_eq;
    use sheetward_core::{CellValue, Color, FillStyle};

    fn sheet1(wb: &Workbook) -> &Worksheet {
        wb.worksheet(0).unwrap()
    }

    #[test]
    fn test_append_row_twice() {
        let mut wb = Workbook::new();
        let row = |v: f64| Operation::AppendRow {
            sheet: Some("Sheet1".into()),
            values: vec![v.into(), "label".into()],
        };
        let report = apply(&mut wb, &[row(1.0), row(2.0)]);

        assert!(report.all_succeeded());
        let sheet = sheet1(&wb);
        assert_eq!(sheet.max_row(), 2);
        assert_eq!(sheet.get_value("A2").unwrap(), CellValue::Number(2.0));
    }

    #[test]
    fn test_append_column_after_existing_data() {
        let mut wb = Workbook::new();
        let ops = vec![
            Operation::SetCell {
                sheet: None,
                coord: CellAddress::new(3, 2),
                value: "x".into(),
            },
            Operation::AppendColumn {
                sheet: None,
                values: vec![true.into(), CellInput::Empty, 3.0.into()],
            },
        ];
        let report = apply(&mut wb, &ops);

        assert!(report.all_succeeded());
        let sheet = sheet1(&wb);
        assert_eq!(sheet.get_value("C1").unwrap(), CellValue::Boolean(true));
        assert_eq!(sheet.get_value("C2").unwrap(), CellValue::Empty);
        assert_eq!(sheet.get_value("C3").unwrap(), CellValue::Number(3.0));
        assert_eq!(sheet.max_column(), 3);
    }

    #[test]
    fn test_failures_do_not_stop_batch() {
        let mut wb = Workbook::new();
        let ops = vec![
            Operation::SetCell {
                sheet: Some("Nope".into()),
                coord: CellAddress::new(1, 1),
                value: 1.0.into(),
            },
            Operation::SetRange {
                sheet: None,
                top_left: CellAddress::new(1, 1),
                values: vec![vec![], vec![]],
            },
            Operation::SetCell {
                sheet: None,
                coord: CellAddress::new(0, 1),
                value: 1.0.into(),
            },
            Operation::AddFormula {
                sheet: None,
                coord: CellAddress::new(1, 1),
                formula: "SUM(B1:B2)".into(),
            },
        ];
        let report = apply(&mut wb, &ops);

        assert_eq!(report.summary(), "1 of 4 operations succeeded");
        assert_eq!(report.failed(), 3);
        assert!(report.outcomes[3].is_success());
        assert_eq!(
            sheet1(&wb).get_value("A1").unwrap().formula_text(),
            Some("=SUM(B1:B2)")
        );
    }

    #[test]
    fn test_set_range_ragged_rows() {
        let mut wb = Workbook::new();
        let op = Operation::SetRange {
            sheet: None,
            top_left: CellAddress::new(2, 2),
            values: vec![vec![1.0.into(), 2.0.into(), 3.0.into()], vec![], vec!["end".into()]],
        };
        apply_operation(&mut wb, &op).unwrap();

        let sheet = sheet1(&wb);
        assert_eq!(sheet.get_value("D2").unwrap(), CellValue::Number(3.0));
        assert_eq!(sheet.get_value("B4").unwrap(), CellValue::string("end"));
        assert_eq!(sheet.cell_count(), 4);
    }

    #[test]
    fn test_set_range_past_sheet_edge_writes_nothing() {
        let mut wb = Workbook::new();
        let op = Operation::SetRange {
            sheet: None,
            top_left: CellAddress::new(1, sheetward_core::MAX_COLS),
            values: vec![vec![1.0.into(), 2.0.into()]],
        };
        assert!(apply_operation(&mut wb, &op).is_err());
        assert_eq!(sheet1(&wb).cell_count(), 0);
    }

    #[test]
    fn test_format_cell_merges() {
        let mut wb = Workbook::new();
        let coord = CellAddress::new(1, 1);
        let format = |patch: StylePatch| Operation::FormatCell {
            sheet: None,
            coord,
            style: patch,
        };
        let ops = vec![
            Operation::SetCell {
                sheet: None,
                coord,
                value: 5.0.into(),
            },
            format(StylePatch {
                fill_color: Some("FFFF00".into()),
                ..StylePatch::default()
            }),
            format(StylePatch {
                bold: Some(true),
                ..StylePatch::default()
            }),
            format(StylePatch {
                font_color: Some("zzz".into()),
                ..StylePatch::default()
            }),
        ];
        let report = apply(&mut wb, &ops);
        assert_eq!(report.succeeded(), 3);

        let sheet = sheet1(&wb);
        let style = sheet.cell_style_at(coord).unwrap();
        assert!(style.font.bold);
        assert_eq!(style.fill, FillStyle::solid(Color::YELLOW));
        assert_eq!(sheet.get_value_at(coord), CellValue::Number(5.0));
    }

    #[test]
    fn test_invalid_records_reported_in_place() {
        let records = crate::parse_operations(
            r#"[
                {"kind": "set_cell", "coord": "A1", "value": "Hello"},
                {"kind": "delete_sheet", "sheet": "Sheet1"},
                {"kind": "append_row", "values": []}
            ]"#,
        )
        .unwrap();

        let mut wb = Workbook::new();
        let report = apply_records(&mut wb, &records);
        let statuses: Vec<_> = report.outcomes.iter().map(|o| o.is_success()).collect();
        assert_eq!(statuses, vec![true, false, false]);
        assert_eq!(report.outcomes[1].kind, "delete_sheet");

        let json = serde_json::to_value(&report.outcomes[2]).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "append_row requires at least one value");
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut wb = Workbook::new();
        let report = apply(&mut wb, &[]);
        assert_eq!(report.summary(), "0 of 0 operations succeeded");
        assert_eq!(sheet1(&wb).cell_count(), 0);
    }
}
