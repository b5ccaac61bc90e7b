//! Check selection

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Identifier of a scanner check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    MacroCheck,
    HiddenSheetsCheck,
    ExternalLinksCheck,
}

impl CheckId {
    /// Every check, in report order
    pub const ALL: [CheckId; 3] = [
        CheckId::MacroCheck,
        CheckId::HiddenSheetsCheck,
        CheckId::ExternalLinksCheck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckId::MacroCheck => "macro_check",
            CheckId::HiddenSheetsCheck => "hidden_sheets_check",
            CheckId::ExternalLinksCheck => "external_links_check",
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckId {
    type Err = String;

    /// Accepts the full identifier or its short form (`macro`, `hidden_sheets`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase().replace('-', "_");
        CheckId::ALL
            .into_iter()
            .find(|id| {
                let name = id.as_str();
                name == s || name.strip_suffix("_check") == Some(s.as_str())
            })
            .ok_or_else(|| {
                let known: Vec<_> = CheckId::ALL.iter().map(CheckId::as_str).collect();
                format!("unknown check '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Which checks to run
///
/// Deserializes from `{"enabled": ["macro_check", ...]}`; a missing list
/// enables everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "all_checks")]
    pub enabled: BTreeSet<CheckId>,
}

fn all_checks() -> BTreeSet<CheckId> {
    CheckId::ALL.into_iter().collect()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            enabled: all_checks(),
        }
    }
}

impl ScanConfig {
    /// Run only the given checks
    pub fn only<I: IntoIterator<Item = CheckId>>(checks: I) -> Self {
        Self {
            enabled: checks.into_iter().collect(),
        }
    }

    /// Drop the given checks from this configuration
    pub fn without<I: IntoIterator<Item = CheckId>>(mut self, checks: I) -> Self {
        for check in checks {
            self.enabled.remove(&check);
        }
        self
    }

    pub fn is_enabled(&self, check: CheckId) -> bool {
        self.enabled.contains(&check)
    }
}
