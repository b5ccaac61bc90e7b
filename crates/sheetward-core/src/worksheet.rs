//! Worksheet type

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::chart::Chart;
use crate::error::Result;
use crate::style::{Style, StylePool};
use crate::workbook::SheetVisibility;

/// A worksheet: a named grid of cells plus the charts drawn over it
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    visibility: SheetVisibility,
    cells: CellStorage,
    charts: Vec<Chart>,
}

impl Worksheet {
    /// Create a new empty worksheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            visibility: SheetVisibility::Visible,
            cells: CellStorage::new(),
            charts: Vec::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tab visibility
    pub fn visibility(&self) -> SheetVisibility {
        self.visibility
    }

    /// Set tab visibility
    pub fn set_visibility(&mut self, visibility: SheetVisibility) {
        self.visibility = visibility;
    }

    /// Whether the sheet is hidden or very hidden
    pub fn is_hidden(&self) -> bool {
        self.visibility.is_hidden()
    }

    // === Cell Access ===

    /// Get stored data by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_at(addr))
    }

    /// Get stored data at an address
    pub fn cell_at(&self, addr: CellAddress) -> Option<&CellData> {
        self.cells.get(addr.row, addr.col)
    }

    /// Get cell value by address string
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr))
    }

    /// Get cell value at an address, `Empty` when nothing is stored
    pub fn get_value_at(&self, addr: CellAddress) -> CellValue {
        self.cell_at(addr)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Resolved style of a cell, `None` for unstyled cells
    pub fn cell_style_at(&self, addr: CellAddress) -> Option<&Style> {
        let index = self.cell_at(addr)?.style_index;
        if index == 0 {
            return None;
        }
        self.cells.style_pool().get(index)
    }

    /// Resolve a style index from this sheet's pool
    pub fn style_by_index(&self, style_index: u32) -> Option<&Style> {
        self.cells.style_pool().get(style_index)
    }

    // === Cell Mutation ===

    /// Set a value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_value_at(addr, value)
    }

    /// Set a value, keeping the cell's style
    ///
    /// Storing [`CellValue::Empty`] on an unstyled cell removes it.
    pub fn set_value_at<V: Into<CellValue>>(&mut self, addr: CellAddress, value: V) -> Result<()> {
        addr.validate()?;
        self.cells.set_value(addr.row, addr.col, value.into());
        Ok(())
    }

    /// Store a formula, prefixing `=` when missing
    pub fn set_formula_at(&mut self, addr: CellAddress, formula: &str) -> Result<()> {
        let text = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };
        self.set_value_at(addr, CellValue::formula(text))
    }

    /// Set a cell's style, keeping its value
    pub fn set_style_at(&mut self, addr: CellAddress, style: &Style) -> Result<()> {
        addr.validate()?;
        let index = self.cells.style_pool_mut().get_or_insert(style.clone());
        self.cells.set_style(addr.row, addr.col, index);
        Ok(())
    }

    /// Store value and style index together; the index must come from this sheet's pool
    pub fn set_cell_data_at(&mut self, addr: CellAddress, data: CellData) -> Result<()> {
        addr.validate()?;
        self.cells.set(addr.row, addr.col, data);
        Ok(())
    }

    // === Extent ===

    /// Highest row holding a value or style, 0 for an empty sheet
    pub fn max_row(&self) -> u32 {
        self.cells.max_row()
    }

    /// Highest column holding a value or style, 0 for an empty sheet
    pub fn max_column(&self) -> u32 {
        self.cells.max_col()
    }

    /// Bounding range of stored cells
    pub fn used_range(&self) -> Option<CellRange> {
        let (min_row, min_col, max_row, max_col) = self.cells.used_bounds()?;
        Some(CellRange::new(
            CellAddress::new(min_row, min_col),
            CellAddress::new(max_row, max_col),
        ))
    }

    /// Number of stored cells, style-only cells included
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// Iterate row-major over stored cells
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellAddress, &CellData)> {
        self.cells
            .iter()
            .map(|(row, col, data)| (CellAddress::new(row, col), data))
    }

    /// Iterate over cells whose value is a formula
    pub fn formula_cells(&self) -> impl Iterator<Item = (CellAddress, &str)> {
        self.iter_cells()
            .filter_map(|(addr, data)| data.value.formula_text().map(|text| (addr, text)))
    }

    /// Styles referenced by this sheet's cells
    pub fn style_pool(&self) -> &StylePool {
        self.cells.style_pool()
    }

    /// Mutable style pool, for codecs that register styles before storing cells
    pub fn style_pool_mut(&mut self) -> &mut StylePool {
        self.cells.style_pool_mut()
    }

    // === Charts ===

    /// Charts drawn on this sheet, in insertion order
    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }

    /// Attach a chart
    pub fn add_chart(&mut self, chart: Chart) {
        self.charts.push(chart);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::style::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get() {
        let mut sheet = Worksheet::new("Test");
        sheet.set_cell_value("B3", "Hello").unwrap();
        sheet.set_cell_value("A1", 1.5).unwrap();

        assert_eq!(sheet.get_value("B3").unwrap().as_string(), Some("Hello"));
        assert_eq!(sheet.get_value_at(CellAddress::new(1, 1)), CellValue::Number(1.5));
        assert_eq!(sheet.max_row(), 3);
        assert_eq!(sheet.max_column(), 2);
    }

    #[test]
    fn test_zero_coordinates_rejected() {
        let mut sheet = Worksheet::new("Test");
        let err = sheet
            .set_value_at(CellAddress::new(0, 0), CellValue::Number(1.0))
            .unwrap_err();
        assert_eq!(err.code(), "address_out_of_bounds");
        assert!(matches!(
            sheet.set_style_at(CellAddress::new(1, 0), &Style::new()),
            Err(Error::ColumnOutOfBounds(0, _))
        ));
        assert_eq!(sheet.cell_count(), 0);
    }

    #[test]
    fn test_formula_prefix() {
        let mut sheet = Worksheet::new("Test");
        sheet.set_formula_at(CellAddress::new(1, 1), "SUM(B1:B3)").unwrap();

        let value = sheet.get_value_at(CellAddress::new(1, 1));
        assert_eq!(value.formula_text(), Some("=SUM(B1:B3)"));
        assert_eq!(sheet.formula_cells().count(), 1);
    }

    #[test]
    fn test_style_kept_across_value_changes() {
        let mut sheet = Worksheet::new("Test");
        let addr = CellAddress::new(2, 2);
        let style = Style::new().bold(true).fill_color(Color::YELLOW);

        sheet.set_style_at(addr, &style).unwrap();
        assert_eq!(sheet.max_row(), 2);
        assert_eq!(sheet.get_value_at(addr), CellValue::Empty);

        sheet.set_value_at(addr, 10.0).unwrap();
        assert_eq!(sheet.cell_style_at(addr), Some(&style));
    }

    #[test]
    fn test_empty_sheet_extent() {
        let sheet = Worksheet::new("Empty");
        assert_eq!(sheet.max_row(), 0);
        assert_eq!(sheet.max_column(), 0);
        assert_eq!(sheet.used_range(), None);
    }
}
