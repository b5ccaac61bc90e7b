//! Findings and the aggregate report

use crate::config::CheckId;
use serde::Serialize;
use std::fmt;

/// Upper bound on detail entries kept per finding
pub const MAX_FINDING_DETAILS: usize = 10;

const LOW_RISK_ADVICE: &str = "No risky content detected. Standard handling is sufficient.";
const ELEVATED_RISK_ADVICE: &str =
    "Review the flagged items before opening this workbook in a spreadsheet application \
     or sharing it further.";

/// Outcome of one check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingStatus {
    Safe,
    Warning,
    /// The check could not run, which is not evidence of safety
    Error,
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::Safe => "safe",
            FindingStatus::Warning => "warning",
            FindingStatus::Error => "error",
        }
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityFinding {
    pub check: CheckId,
    pub status: FindingStatus,
    pub message: String,
    /// At most [`MAX_FINDING_DETAILS`] entries
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl SecurityFinding {
    pub fn safe(check: CheckId, message: impl Into<String>) -> Self {
        Self::new(check, FindingStatus::Safe, message, Vec::new())
    }

    pub fn error(check: CheckId, message: impl Into<String>) -> Self {
        Self::new(check, FindingStatus::Error, message, Vec::new())
    }

    pub fn warning(check: CheckId, message: impl Into<String>, details: Vec<String>) -> Self {
        Self::new(check, FindingStatus::Warning, message, details)
    }

    fn new(
        check: CheckId,
        status: FindingStatus,
        message: impl Into<String>,
        mut details: Vec<String>,
    ) -> Self {
        details.truncate(MAX_FINDING_DETAILS);
        Self {
            check,
            status,
            message: message.into(),
            details,
        }
    }
}

/// Coarse classification of a whole workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    /// Reserved; no current check produces it
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Fixed advice for this level
    pub fn recommendations(&self) -> Vec<String> {
        match self {
            RiskLevel::Low => vec![LOW_RISK_ADVICE.to_string()],
            RiskLevel::Medium | RiskLevel::High => vec![ELEVATED_RISK_ADVICE.to_string()],
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scanner output, ready to serialize
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub findings: Vec<SecurityFinding>,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
}

impl ScanReport {
    /// Aggregate findings: all safe is low risk, anything else is medium
    pub fn from_findings(findings: Vec<SecurityFinding>) -> Self {
        let risk_level = if findings.iter().all(|f| f.status == FindingStatus::Safe) {
            RiskLevel::Low
        } else {
            RiskLevel::Medium
        };
        Self {
            recommendations: risk_level.recommendations(),
            findings,
            risk_level,
        }
    }

    /// Finding for a check, if it ran
    pub fn finding(&self, check: CheckId) -> Option<&SecurityFinding> {
        self.findings.iter().find(|f| f.check == check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_aggregate() {
        let safe = SecurityFinding::safe(CheckId::MacroCheck, "none");
        let report = ScanReport::from_findings(vec![safe.clone()]);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(report.recommendations, vec![LOW_RISK_ADVICE.to_string()]);

        let error = SecurityFinding::error(CheckId::MacroCheck, "not inspected");
        assert_eq!(
            ScanReport::from_findings(vec![safe, error]).risk_level,
            RiskLevel::Medium
        );
        assert_eq!(ScanReport::from_findings(Vec::new()).risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_details_capped() {
        let details = (0..25).map(|i| format!("Sheet1!A{}", i + 1)).collect();
        let finding = SecurityFinding::warning(CheckId::ExternalLinksCheck, "25 found", details);
        assert_eq!(finding.details.len(), MAX_FINDING_DETAILS);
        assert_eq!(finding.details[9], "Sheet1!A10");
    }

    #[test]
    fn test_serialized_shape() {
        let report = ScanReport::from_findings(vec![SecurityFinding::warning(
            CheckId::HiddenSheetsCheck,
            "1 hidden sheet",
            vec!["Secret".into()],
        )]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "findings": [{
                    "check": "hidden_sheets_check",
                    "status": "warning",
                    "message": "1 hidden sheet",
                    "details": ["Secret"],
                }],
                "risk_level": "medium",
                "recommendations": [ELEVATED_RISK_ADVICE],
            })
        );
    }
}
