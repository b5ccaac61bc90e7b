//! Prelude module - common imports for sheetward users
//!
//! ```rust
//! use sheetward::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellAddress,
    CellRange,
    CellValue,
    // Charts
    ChartKind,
    ChartSpec,
    // Style types
    Color,
    // Errors
    Error,
    HorizontalAlignment,
    // Edits
    MutationReport,
    Operation,
    // Scanning
    RiskLevel,
    ScanConfig,
    ScanReport,
    SecurityScanner,
    SheetVisibility,
    Style,
    StylePatch,
    VerticalAlignment,
    // Main types
    Workbook,
    // Extension traits
    WorkbookExt,
    Worksheet,
};
