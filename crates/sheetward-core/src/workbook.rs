//! Workbook type - the main document structure

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// Visibility of a worksheet tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SheetVisibility {
    #[default]
    Visible,
    /// Hidden, but the user can unhide it from the UI
    Hidden,
    /// Hidden and only reachable programmatically
    VeryHidden,
}

impl SheetVisibility {
    /// `state` attribute value in workbook.xml, `None` for visible sheets
    pub fn as_xml(&self) -> Option<&'static str> {
        match self {
            SheetVisibility::Visible => None,
            SheetVisibility::Hidden => Some("hidden"),
            SheetVisibility::VeryHidden => Some("veryHidden"),
        }
    }

    /// Parse the `state` attribute; unknown values read as visible
    pub fn from_xml(s: &str) -> Self {
        match s {
            "hidden" => SheetVisibility::Hidden,
            "veryHidden" => SheetVisibility::VeryHidden,
            _ => SheetVisibility::Visible,
        }
    }

    /// Whether the sheet is hidden in any way
    pub fn is_hidden(&self) -> bool {
        !matches!(self, SheetVisibility::Visible)
    }
}

/// Macro project carried by a workbook
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MacroArchive {
    /// The container was decoded without looking for macros
    #[default]
    NotInspected,
    /// The container was inspected and holds no macro project
    Absent,
    /// Raw bytes of the macro project part
    Present(Vec<u8>),
}

impl MacroArchive {
    /// Whether a macro project is held
    pub fn is_present(&self) -> bool {
        matches!(self, MacroArchive::Present(_))
    }

    /// Raw project bytes, if present
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            MacroArchive::Present(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// A workbook (spreadsheet document)
///
/// Holds an ordered list of worksheets, the active sheet and the macro project.
#[derive(Debug)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
    active_sheet: usize,
    macro_archive: MacroArchive,
}

impl Workbook {
    /// Create a new workbook with one empty worksheet named "Sheet1"
    ///
    /// A fresh workbook carries no macro project.
    pub fn new() -> Self {
        Self {
            worksheets: vec![Worksheet::new("Sheet1")],
            active_sheet: 0,
            macro_archive: MacroArchive::Absent,
        }
    }

    /// Create a workbook with no worksheets
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
            active_sheet: 0,
            macro_archive: MacroArchive::Absent,
        }
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Check if the workbook has no worksheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Get a worksheet by exact (case-sensitive) name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Get a mutable worksheet by exact (case-sensitive) name
    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.worksheets.iter_mut().find(|ws| ws.name() == name)
    }

    /// Index of the sheet with this exact name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets.iter().position(|ws| ws.name() == name)
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.worksheets.iter().map(|ws| ws.name().to_string()).collect()
    }

    /// Iterate over worksheets in order
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Append a worksheet with a generated name ("SheetN")
    pub fn add_worksheet(&mut self) -> Result<usize> {
        let name = self.generate_sheet_name();
        self.add_worksheet_with_name(&name)
    }

    /// Append an empty worksheet with the given name
    ///
    /// Names must be unique ignoring case ("Data" and "data" clash), matching
    /// what spreadsheet applications accept. Lookup by name stays exact.
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.add_existing_worksheet(Worksheet::new(name))
    }

    /// Append a worksheet that was built elsewhere
    pub fn add_existing_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        self.validate_sheet_name(worksheet.name())?;
        self.worksheets.push(worksheet);
        Ok(self.worksheets.len() - 1)
    }

    /// Index of the sheet shown when the document is opened
    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    /// Set the active sheet
    pub fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        self.active_sheet = index;
        Ok(())
    }

    /// Macro project attached to the workbook
    pub fn macro_archive(&self) -> &MacroArchive {
        &self.macro_archive
    }

    /// Replace the macro project
    pub fn set_macro_archive(&mut self, archive: MacroArchive) {
        self.macro_archive = archive;
    }

    /// Check a sheet name against naming rules and existing sheets
    ///
    /// Names must be 1-31 characters, must not contain `: \ / ? * [ ]`, and must
    /// not collide with an existing name ignoring case.
    pub fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }

        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }

        let name_lower = name.to_lowercase();
        if self
            .worksheets
            .iter()
            .any(|ws| ws.name().to_lowercase() == name_lower)
        {
            return Err(Error::DuplicateSheetName(name.into()));
        }

        Ok(())
    }

    fn generate_sheet_name(&self) -> String {
        let mut n = self.worksheets.len() + 1;
        loop {
            let name = format!("Sheet{}", n);
            if self.validate_sheet_name(&name).is_ok() {
                return name;
            }
            n += 1;
        }
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
