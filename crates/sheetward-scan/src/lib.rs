//! # sheetward-scan
//!
//! Read-only risk report for a [`Workbook`](sheetward_core::Workbook).
//!
//! Three checks are available and all run by default:
//! - `macro_check` flags an embedded VBA project
//! - `hidden_sheets_check` lists hidden and very hidden sheets
//! - `external_links_check` finds formulas that point into other workbooks
//!
//! ```rust
//! use sheetward_core::{SheetVisibility, Workbook};
//! use sheetward_scan::{RiskLevel, ScanConfig, SecurityScanner};
//!
//! let mut workbook = Workbook::new();
//! workbook.add_worksheet_with_name("Secret").unwrap();
//! workbook.worksheet_mut(1).unwrap().set_visibility(SheetVisibility::Hidden);
//!
//! let report = SecurityScanner::new(ScanConfig::default()).scan(&workbook);
//! assert_eq!(report.risk_level, RiskLevel::Medium);
//! ```

mod checks;
mod config;
mod report;

pub use config::{CheckId, ScanConfig};
pub use report::{
    FindingStatus, RiskLevel, ScanReport, SecurityFinding, MAX_FINDING_DETAILS,
};

use log::debug;
use sheetward_core::Workbook;

/// Runs the enabled checks over a workbook
#[derive(Debug, Clone, Default)]
pub struct SecurityScanner {
    config: ScanConfig,
}

impl SecurityScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Produce the report; findings follow [`CheckId::ALL`] order
    pub fn scan(&self, wb: &Workbook) -> ScanReport {
        let findings: Vec<SecurityFinding> = CheckId::ALL
            .iter()
            .filter(|id| self.config.is_enabled(**id))
            .map(|id| {
                let finding = checks::run(*id, wb);
                debug!("{}: {} ({})", id, finding.status, finding.message);
                finding
            })
            .collect();
        ScanReport::from_findings(findings)
    }
}

/// Scan with every check enabled
pub fn scan(wb: &Workbook) -> ScanReport {
    SecurityScanner::default().scan(wb)
}
