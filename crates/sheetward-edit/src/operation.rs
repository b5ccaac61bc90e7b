//! Edit operations and their JSON form

use crate::error::{EditError, EditResult};
use crate::patch::StylePatch;
use serde::{Deserialize, Serialize};
use sheetward_core::{CellAddress, CellValue};

/// Value supplied for a cell
///
/// JSON `null` clears the value, numbers, strings and booleans are stored as
/// is, and `{"formula": "=SUM(A1:A3)"}` stores a formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellInput {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    Formula { formula: String },
}

impl CellInput {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellInput::Empty)
    }

    /// Model value for this input
    pub fn to_cell_value(&self) -> CellValue {
        match self {
            CellInput::Empty => CellValue::Empty,
            CellInput::Bool(b) => CellValue::Boolean(*b),
            CellInput::Number(n) => CellValue::Number(*n),
            CellInput::Text(s) => CellValue::string(s),
            CellInput::Formula { formula } => {
                let text = formula.trim();
                if text.starts_with('=') {
                    CellValue::formula(text)
                } else {
                    CellValue::formula(format!("={}", text))
                }
            }
        }
    }
}

impl From<&str> for CellInput {
    fn from(s: &str) -> Self {
        CellInput::Text(s.to_string())
    }
}

impl From<f64> for CellInput {
    fn from(n: f64) -> Self {
        CellInput::Number(n)
    }
}

impl From<bool> for CellInput {
    fn from(b: bool) -> Self {
        CellInput::Bool(b)
    }
}

/// One edit
///
/// `sheet` may be omitted to target the active sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    SetCell {
        #[serde(default)]
        sheet: Option<String>,
        coord: CellAddress,
        value: CellInput,
    },
    /// Write a block row by row starting at `top_left`; rows may differ in length
    SetRange {
        #[serde(default)]
        sheet: Option<String>,
        top_left: CellAddress,
        values: Vec<Vec<CellInput>>,
    },
    AddFormula {
        #[serde(default)]
        sheet: Option<String>,
        coord: CellAddress,
        #[serde(alias = "formula_text")]
        formula: String,
    },
    FormatCell {
        #[serde(default)]
        sheet: Option<String>,
        coord: CellAddress,
        #[serde(alias = "style_patch")]
        style: StylePatch,
    },
    /// Write `values` into the row below the last used one
    AppendRow {
        #[serde(default)]
        sheet: Option<String>,
        values: Vec<CellInput>,
    },
    /// Write `values` into the column right of the last used one
    AppendColumn {
        #[serde(default)]
        sheet: Option<String>,
        values: Vec<CellInput>,
    },
}

impl Operation {
    /// Wire name of the operation kind
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::SetCell { .. } => "set_cell",
            Operation::SetRange { .. } => "set_range",
            Operation::AddFormula { .. } => "add_formula",
            Operation::FormatCell { .. } => "format_cell",
            Operation::AppendRow { .. } => "append_row",
            Operation::AppendColumn { .. } => "append_column",
        }
    }

    /// Target sheet name, `None` for the active sheet
    pub fn sheet(&self) -> Option<&str> {
        match self {
            Operation::SetCell { sheet, .. }
            | Operation::SetRange { sheet, .. }
            | Operation::AddFormula { sheet, .. }
            | Operation::FormatCell { sheet, .. }
            | Operation::AppendRow { sheet, .. }
            | Operation::AppendColumn { sheet, .. } => sheet.as_deref(),
        }
    }
}

/// One element of a parsed batch
///
/// Elements that fail to decode are kept so they can be reported in place.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationRecord {
    Valid(Operation),
    Invalid {
        /// The element's `kind` tag, when it had one
        kind: Option<String>,
        reason: String,
    },
}

impl OperationRecord {
    /// Kind label for reporting
    pub fn kind(&self) -> &str {
        match self {
            OperationRecord::Valid(op) => op.kind(),
            OperationRecord::Invalid { kind, .. } => kind.as_deref().unwrap_or("unknown"),
        }
    }
}

impl From<Operation> for OperationRecord {
    fn from(op: Operation) -> Self {
        OperationRecord::Valid(op)
    }
}

/// Parse a JSON array of operations
///
/// Only a document that is not a JSON array fails as a whole. Each element
/// that does not decode becomes [`OperationRecord::Invalid`].
pub fn parse_operations(json: &str) -> EditResult<Vec<OperationRecord>> {
    let items: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| EditError::InvalidBatch(e.to_string()))?;

    Ok(items
        .into_iter()
        .map(|item| {
            let kind = item
                .get("kind")
                .and_then(|k| k.as_str())
                .map(str::to_string);
            match serde_json::from_value::<Operation>(item) {
                Ok(op) => OperationRecord::Valid(op),
                Err(e) => OperationRecord::Invalid {
                    kind,
                    reason: e.to_string(),
                },
            }
        })
        .collect())
}
