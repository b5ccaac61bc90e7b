//! # sheetward-edit
//!
//! Applies an ordered batch of edit operations to a [`Workbook`].
//!
//! Operations run one after another against the same workbook. A failing
//! operation is recorded in the [`MutationReport`] and the batch carries on;
//! there is no rollback.
//!
//! ## Example
//!
//! ```rust
//! use sheetward_core::Workbook;
//! use sheetward_edit::{apply_records, parse_operations};
//!
//! let ops = parse_operations(r#"[
//!     {"kind": "set_cell", "sheet": "Sheet1", "coord": "A1", "value": "Hello"},
//!     {"kind": "append_row", "sheet": "Sheet1", "values": [1, 2, 3]},
//!     {"kind": "frobnicate"}
//! ]"#).unwrap();
//!
//! let mut workbook = Workbook::new();
//! let report = apply_records(&mut workbook, &ops);
//! assert_eq!(report.summary(), "2 of 3 operations succeeded");
//! ```
//!
//! [`Workbook`]: sheetward_core::Workbook

mod engine;
mod error;
mod operation;
mod patch;

pub use engine::{
    apply, apply_operation, apply_records, MutationReport, OperationOutcome, OperationStatus,
};
pub use error::{EditError, EditResult};
pub use operation::{parse_operations, CellInput, Operation, OperationRecord};
pub use patch::StylePatch;
