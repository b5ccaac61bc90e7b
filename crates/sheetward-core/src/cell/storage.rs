//! Sparse cell storage

use super::CellValue;
use crate::style::StylePool;
use std::collections::BTreeMap;

/// What is stored for one cell: its value and an index into the sheet's [`StylePool`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellData {
    /// The cell value
    pub value: CellValue,
    /// Style index (0 = default style)
    pub style_index: u32,
}

impl CellData {
    /// Create cell data with the default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style_index: 0,
        }
    }

    /// Create cell data with a specific style
    pub fn with_style(value: CellValue, style_index: u32) -> Self {
        Self { value, style_index }
    }

    /// Neither a value nor a non-default style
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }
}

/// Row-major sparse storage for a worksheet
///
/// Only cells with a value or a non-default style are kept. Rows and columns
/// are 1-based; callers validate coordinates before storing.
#[derive(Debug, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, BTreeMap<u32, CellData>>,
    len: usize,
    style_pool: StylePool,
}

impl CellStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cell at a position
    pub fn get(&self, row: u32, col: u32) -> Option<&CellData> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Store cell data, removing the cell when it carries nothing
    pub fn set(&mut self, row: u32, col: u32, data: CellData) {
        if data.is_empty() {
            self.remove(row, col);
            return;
        }
        if self.rows.entry(row).or_default().insert(col, data).is_none() {
            self.len += 1;
        }
    }

    /// Set the value, keeping any existing style
    pub fn set_value(&mut self, row: u32, col: u32, value: CellValue) {
        let style_index = self.get(row, col).map(|c| c.style_index).unwrap_or(0);
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Set the style index, keeping any existing value
    pub fn set_style(&mut self, row: u32, col: u32, style_index: u32) {
        let value = self
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default();
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Remove a cell entirely
    pub fn remove(&mut self, row: u32, col: u32) -> Option<CellData> {
        let cells = self.rows.get_mut(&row)?;
        let removed = cells.remove(&col)?;
        if cells.is_empty() {
            self.rows.remove(&row);
        }
        self.len -= 1;
        Some(removed)
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.len
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Highest stored row, 0 when empty
    pub fn max_row(&self) -> u32 {
        self.rows.keys().next_back().copied().unwrap_or(0)
    }

    /// Highest stored column across all rows, 0 when empty
    pub fn max_col(&self) -> u32 {
        self.rows
            .values()
            .filter_map(|cells| cells.keys().next_back().copied())
            .max()
            .unwrap_or(0)
    }

    /// `(min_row, min_col, max_row, max_col)` of stored cells
    pub fn used_bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let min_row = *self.rows.keys().next()?;
        let min_col = self
            .rows
            .values()
            .filter_map(|cells| cells.keys().next().copied())
            .min()?;
        Some((min_row, min_col, self.max_row(), self.max_col()))
    }

    /// Iterate row-major over stored cells
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &CellData)> {
        self.rows
            .iter()
            .flat_map(|(&row, cells)| cells.iter().map(move |(&col, data)| (row, col, data)))
    }

    /// Style pool referenced by the stored style indices
    pub fn style_pool(&self) -> &StylePool {
        &self.style_pool
    }

    /// Mutable style pool
    pub fn style_pool_mut(&mut self) -> &mut StylePool {
        &mut self.style_pool
    }
}
