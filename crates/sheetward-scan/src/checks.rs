//! Individual checks

use crate::config::CheckId;
use crate::report::SecurityFinding;
use lazy_regex::regex_is_match;
use sheetward_core::chart::quote_sheet_name;
use sheetward_core::{MacroArchive, SheetVisibility, Workbook};

pub(crate) fn run(check: CheckId, wb: &Workbook) -> SecurityFinding {
    match check {
        CheckId::MacroCheck => macro_check(wb),
        CheckId::HiddenSheetsCheck => hidden_sheets_check(wb),
        CheckId::ExternalLinksCheck => external_links_check(wb),
    }
}

fn macro_check(wb: &Workbook) -> SecurityFinding {
    let id = CheckId::MacroCheck;
    match wb.macro_archive() {
        MacroArchive::NotInspected => SecurityFinding::error(
            id,
            "macro content was not inspected; decode with macro preservation enabled",
        ),
        MacroArchive::Absent => SecurityFinding::safe(id, "no VBA project found"),
        MacroArchive::Present(bytes) => SecurityFinding::warning(
            id,
            format!("workbook contains a VBA project ({} bytes)", bytes.len()),
            Vec::new(),
        ),
    }
}

fn hidden_sheets_check(wb: &Workbook) -> SecurityFinding {
    let id = CheckId::HiddenSheetsCheck;
    let hidden: Vec<(String, SheetVisibility)> = wb
        .worksheets()
        .filter(|ws| ws.is_hidden())
        .map(|ws| (ws.name().to_string(), ws.visibility()))
        .collect();

    if hidden.is_empty() {
        return SecurityFinding::safe(id, "no hidden sheets");
    }
    let very_hidden = hidden
        .iter()
        .filter(|(_, v)| *v == SheetVisibility::VeryHidden)
        .count();
    let mut message = format!("{} hidden sheet{}", hidden.len(), plural(hidden.len()));
    if very_hidden > 0 {
        message.push_str(&format!(" ({} very hidden)", very_hidden));
    }
    let names = hidden.into_iter().map(|(name, _)| name).collect();
    SecurityFinding::warning(id, message, names)
}

fn external_links_check(wb: &Workbook) -> SecurityFinding {
    let id = CheckId::ExternalLinksCheck;
    let mut count = 0usize;
    let mut locations = Vec::new();

    for sheet in wb.worksheets() {
        for (addr, formula) in sheet.formula_cells() {
            if is_external_reference(formula) {
                count += 1;
                if locations.len() < crate::MAX_FINDING_DETAILS {
                    locations.push(format!("{}!{}", quote_sheet_name(sheet.name()), addr));
                }
            }
        }
    }

    if count == 0 {
        return SecurityFinding::safe(id, "no formulas reference other workbooks");
    }
    SecurityFinding::warning(
        id,
        format!("{} formula{} referencing other workbooks", count, plural(count)),
        locations,
    )
}

/// Bracket-token heuristic: `[Budget.xlsx]` or the `[1]` index form.
/// Structured table references match too.
pub(crate) fn is_external_reference(formula: &str) -> bool {
    regex_is_match!(r"\[[^\[\]]+\]", formula)
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
