//! Cell address and range types
//!
//! Rows and columns are 1-based everywhere: `A1` is `(1, 1)`. A coordinate
//! of zero can be constructed but never passes [`CellAddress::validate`].

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "$B$2")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row number, 1-based
    pub row: u32,
    /// Column number, 1-based (A=1, B=2, ..., XFD=16384)
    pub col: u32,
}

impl CellAddress {
    /// Create an address without validating it
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Create an address, rejecting coordinates outside the sheet limits
    pub fn checked(row: u32, col: u32) -> Result<Self> {
        let addr = Self::new(row, col);
        addr.validate()?;
        Ok(addr)
    }

    /// Check that both coordinates are within `1..=MAX_ROWS` / `1..=MAX_COLS`
    pub fn validate(&self) -> Result<()> {
        if self.row == 0 || self.row > MAX_ROWS {
            return Err(Error::RowOutOfBounds(self.row, MAX_ROWS));
        }
        if self.col == 0 || self.col > MAX_COLS {
            return Err(Error::ColumnOutOfBounds(self.col, MAX_COLS));
        }
        Ok(())
    }

    /// Whether the address lies inside the sheet limits
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Parse a cell address from A1-style notation
    ///
    /// `$` anchors are accepted and ignored.
    ///
    /// # Examples
    /// ```
    /// use sheetward_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!((addr.row, addr.col), (1, 1));
    ///
    /// let addr = CellAddress::parse("$AB$12").unwrap();
    /// assert_eq!((addr.row, addr.col), (12, 28));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;
        if bytes.first() == Some(&b'$') {
            pos += 1;
        }

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == col_start {
            return Err(Error::InvalidAddress(format!("no column letters in '{}'", s)));
        }
        let col = Self::letters_to_column(&s[col_start..pos])?;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let row_str = &s[pos..];
        if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!("invalid row number in '{}'", s)));
        }
        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        Self::checked(row, col)
    }

    /// Convert column letters to a 1-based column number (A=1, Z=26, AA=27)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() || letters.len() > 3 {
            return Err(Error::InvalidAddress(format!(
                "invalid column letters '{}'",
                letters
            )));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letters '{}'",
                    letters
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        }

        if col > MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS));
        }
        Ok(col)
    }

    /// Convert a 1-based column number to letters (1=A, 27=AA)
    ///
    /// Column 0 has no letters and yields an empty string.
    pub fn column_to_letters(col: u32) -> String {
        let mut result = Vec::with_capacity(3);
        let mut n = col;
        while n > 0 {
            let rem = (n - 1) % 26;
            result.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        result.reverse();
        String::from_utf8(result).unwrap_or_default()
    }

    /// Format as relative A1 notation
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row)
    }

    /// Format with both anchors, e.g. `$B$2`
    pub fn to_absolute_string(&self) -> String {
        format!("${}${}", Self::column_to_letters(self.col), self.row)
    }

    /// Move the address by a signed offset, failing when it leaves the sheet
    pub fn offset(&self, rows: i64, cols: i64) -> Result<Self> {
        let row = i64::from(self.row) + rows;
        let col = i64::from(self.col) + cols;
        if row < 1 || row > i64::from(MAX_ROWS) {
            return Err(Error::RowOutOfBounds(row.max(0) as u32, MAX_ROWS));
        }
        if col < 1 || col > i64::from(MAX_COLS) {
            return Err(Error::ColumnOutOfBounds(col.max(0) as u32, MAX_COLS));
        }
        Ok(Self::new(row as u32, col as u32))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<(u32, u32)> for CellAddress {
    fn from((row, col): (u32, u32)) -> Self {
        Self::new(row, col)
    }
}

/// A rectangular range of cells, always stored with `start` at the top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Top-left corner
    pub start: CellAddress,
    /// Bottom-right corner
    pub end: CellAddress,
}

impl CellRange {
    /// Create a range from two corners in any order
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self::new(addr, addr)
    }

    /// Parse `A1:B10` or a single `A1`
    ///
    /// # Examples
    /// ```
    /// use sheetward_core::CellRange;
    ///
    /// let range = CellRange::parse("C5:A1").unwrap();
    /// assert_eq!(range.to_string(), "A1:C5");
    /// assert_eq!(range.row_count(), 5);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((a, b)) => {
                let a = CellAddress::parse(a).map_err(|_| Error::InvalidRange(s.to_string()))?;
                let b = CellAddress::parse(b).map_err(|_| Error::InvalidRange(s.to_string()))?;
                Ok(Self::new(a, b))
            }
            None => CellAddress::parse(s)
                .map(Self::single)
                .map_err(|_| Error::InvalidRange(s.to_string())),
        }
    }

    /// Validate both corners
    pub fn validate(&self) -> Result<()> {
        self.start.validate()?;
        self.end.validate()
    }

    /// Number of rows covered, whichever corner is first
    pub fn row_count(&self) -> u32 {
        self.end.row.abs_diff(self.start.row).saturating_add(1)
    }

    /// Number of columns covered, whichever corner is first
    pub fn col_count(&self) -> u32 {
        self.end.col.abs_diff(self.start.col).saturating_add(1)
    }

    /// Whether the address lies inside the range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        (self.start.row..=self.end.row).contains(&addr.row)
            && (self.start.col..=self.end.col).contains(&addr.col)
    }

    /// Whether the range is a single cell
    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    /// Format with anchors on every part, e.g. `$A$1:$B$5`
    pub fn to_absolute_string(&self) -> String {
        format!(
            "{}:{}",
            self.start.to_absolute_string(),
            self.end.to_absolute_string()
        )
    }

    /// Iterate row-major over every address in the range
    pub fn cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        (self.start.row..=self.end.row)
            .flat_map(move |row| (self.start.col..=self.end.col).map(move |col| CellAddress::new(row, col)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::{CellAddress, CellRange};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AddressRepr {
        A1(String),
        Pair(u32, u32),
        Fields { row: u32, col: u32 },
    }

    impl Serialize for CellAddress {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_a1_string())
        }
    }

    /// Accepts `"B3"`, `[3, 2]` or `{"row": 3, "col": 2}`.
    impl<'de> Deserialize<'de> for CellAddress {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            match AddressRepr::deserialize(deserializer)? {
                AddressRepr::A1(text) => CellAddress::parse(&text).map_err(D::Error::custom),
                AddressRepr::Pair(row, col) | AddressRepr::Fields { row, col } => {
                    Ok(CellAddress::new(row, col))
                }
            }
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RangeRepr {
        A1(String),
        Corners {
            start: CellAddress,
            end: CellAddress,
        },
    }

    impl Serialize for CellRange {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for CellRange {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            match RangeRepr::deserialize(deserializer)? {
                RangeRepr::A1(text) => CellRange::parse(&text).map_err(D::Error::custom),
                RangeRepr::Corners { start, end } => Ok(CellRange::new(start, end)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_address() {
        let addr = CellAddress::parse("A1").unwrap();
        assert_eq!(addr, CellAddress::new(1, 1));

        let addr = CellAddress::parse("xfd1048576").unwrap();
        assert_eq!(addr, CellAddress::new(MAX_ROWS, MAX_COLS));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("1A").is_err());
        assert!(CellAddress::parse("A1B").is_err());
        assert!(CellAddress::parse("XFE1").is_err());
        assert!(CellAddress::parse("A1048577").is_err());
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(CellAddress::column_to_letters(1), "A");
        assert_eq!(CellAddress::column_to_letters(26), "Z");
        assert_eq!(CellAddress::column_to_letters(27), "AA");
        assert_eq!(CellAddress::column_to_letters(702), "ZZ");
        assert_eq!(CellAddress::column_to_letters(703), "AAA");
        assert_eq!(CellAddress::column_to_letters(0), "");
        assert_eq!(CellAddress::letters_to_column("AA").unwrap(), 27);
    }

    #[test]
    fn test_zero_coordinates_invalid() {
        assert!(CellAddress::new(0, 1).validate().is_err());
        assert!(CellAddress::new(1, 0).validate().is_err());
        assert!(CellAddress::checked(0, 0).is_err());
        assert!(CellAddress::checked(1, 1).is_ok());
    }

    #[test]
    fn test_absolute_format() {
        let addr = CellAddress::new(5, 2);
        assert_eq!(addr.to_a1_string(), "B5");
        assert_eq!(addr.to_absolute_string(), "$B$5");
    }

    #[test]
    fn test_offset() {
        let addr = CellAddress::new(2, 2);
        assert_eq!(addr.offset(1, -1).unwrap(), CellAddress::new(3, 1));
        assert!(addr.offset(-2, 0).is_err());
    }

    #[test]
    fn test_range_normalizes() {
        let range = CellRange::new(CellAddress::new(5, 3), CellAddress::new(1, 1));
        assert_eq!(range.start, CellAddress::new(1, 1));
        assert_eq!(range.end, CellAddress::new(5, 3));
        assert_eq!(range.row_count(), 5);
        assert_eq!(range.col_count(), 3);
        assert_eq!(range.to_absolute_string(), "$A$1:$C$5");
    }

    #[test]
    fn test_counts_of_hand_built_range() {
        let flipped = CellRange {
            start: CellAddress::new(5, 3),
            end: CellAddress::new(1, 1),
        };
        assert_eq!(flipped.row_count(), 5);
        assert_eq!(flipped.col_count(), 3);
    }

    #[test]
    fn test_range_cells_row_major() {
        let range = CellRange::parse("A1:B2").unwrap();
        let cells: Vec<String> = range.cells().map(|a| a.to_string()).collect();
        assert_eq!(cells, vec!["A1", "B1", "A2", "B2"]);
        assert!(range.contains(&CellAddress::new(2, 2)));
        assert!(!range.contains(&CellAddress::new(3, 1)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_address_deserialize_forms() {
        let a: CellAddress = serde_json::from_str("\"B3\"").unwrap();
        let b: CellAddress = serde_json::from_str("[3, 2]").unwrap();
        let c: CellAddress = serde_json::from_str("{\"row\": 3, \"col\": 2}").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert!(serde_json::from_str::<CellAddress>("[-1, 2]").is_err());
    }
}
