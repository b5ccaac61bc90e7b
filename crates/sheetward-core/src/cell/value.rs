//! Cell value types

use std::fmt;
use std::sync::Arc;

/// The content of a cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,

    Boolean(bool),

    /// Dates are stored as serial numbers
    Number(f64),

    String(SharedString),

    Error(CellError),

    /// Formula with the result last computed by the producing application
    ///
    /// Only text starting with `=` counts as a formula; see [`CellValue::has_formula`].
    Formula {
        /// Formula text including the leading `=` (e.g. "=SUM(A1:A10)")
        text: String,
        /// Cached result, never itself a formula
        cached_value: Option<Box<CellValue>>,
    },
}

impl CellValue {
    pub fn string<S: AsRef<str>>(s: S) -> Self {
        CellValue::String(SharedString::new(s))
    }

    /// Create a formula without a cached result
    pub fn formula<S: Into<String>>(text: S) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: None,
        }
    }

    /// Create a formula carrying a cached result
    pub fn formula_with_cached<S: Into<String>>(text: S, cached: CellValue) -> Self {
        let cached = cached.effective_value().clone();
        CellValue::Formula {
            text: text.into(),
            cached_value: (!cached.is_empty()).then(|| Box::new(cached)),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Formula variant whose text starts with `=`
    pub fn has_formula(&self) -> bool {
        self.formula_text().is_some()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Numeric reading of the effective value; booleans count as 1 and 0
    pub fn as_number(&self) -> Option<f64> {
        match self.effective_value() {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Text of the effective value
    pub fn as_string(&self) -> Option<&str> {
        match self.effective_value() {
            CellValue::String(s) => Some(s.as_str()),
            CellValue::Formula { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Formula text, only when it starts with `=`
    pub fn formula_text(&self) -> Option<&str> {
        match self {
            CellValue::Formula { text, .. } if text.starts_with('=') => Some(text),
            _ => None,
        }
    }

    /// The value a reader sees: the cached result for formulas
    ///
    /// A formula without a cached result reads as [`CellValue::Empty`]. Formula
    /// text without a leading `=` is treated as plain text and returned as-is.
    pub fn effective_value(&self) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        match self {
            CellValue::Formula {
                cached_value: Some(v),
                ..
            } => v.effective_value(),
            CellValue::Formula { text, .. } if text.starts_with('=') => EMPTY,
            _ => self,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => write!(f, "{}", s.as_str()),
            CellValue::Error(e) => write!(f, "{}", e),
            CellValue::Formula {
                cached_value: Some(v),
                ..
            } => write!(f, "{}", v),
            CellValue::Formula { text, .. } => write!(f, "{}", text),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::string(s)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CellValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.effective_value() {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Boolean(b) => serializer.serialize_bool(*b),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::String(s) => serializer.serialize_str(s.as_str()),
            CellValue::Error(e) => serializer.serialize_str(e.as_str()),
            CellValue::Formula { text, .. } => serializer.serialize_str(text),
        }
    }
}

/// Error literal stored in a cell (`t="e"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    Na,
    GettingData,
    Spill,
    Calc,
}

impl CellError {
    /// Literal as written in the sheet, e.g. `#DIV/0!`
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::Na => "#N/A",
            CellError::GettingData => "#GETTING_DATA",
            CellError::Spill => "#SPILL!",
            CellError::Calc => "#CALC!",
        }
    }

    /// Parse an error literal, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "#NULL!" => Some(CellError::Null),
            "#DIV/0!" => Some(CellError::Div0),
            "#VALUE!" => Some(CellError::Value),
            "#REF!" => Some(CellError::Ref),
            "#NAME?" => Some(CellError::Name),
            "#NUM!" => Some(CellError::Num),
            "#N/A" => Some(CellError::Na),
            "#GETTING_DATA" => Some(CellError::GettingData),
            "#SPILL!" => Some(CellError::Spill),
            "#CALC!" => Some(CellError::Calc),
            _ => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference-counted string shared between cells
///
/// The shared string table of a container maps many cells to one entry; decoding
/// hands out clones of one `SharedString` per entry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SharedString(Arc<str>);

impl SharedString {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        SharedString(Arc::from(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SharedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedString {
    fn from(s: &str) -> Self {
        SharedString::new(s)
    }
}

impl From<String> for SharedString {
    fn from(s: String) -> Self {
        SharedString::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from(42), CellValue::Number(42.0));
        assert_eq!(CellValue::from(2.5), CellValue::Number(2.5));
        assert_eq!(CellValue::from(true), CellValue::Boolean(true));
        assert_eq!(CellValue::from("hello").as_string(), Some("hello"));
    }

    #[test]
    fn test_has_formula_requires_equals() {
        assert!(CellValue::formula("=A1+1").has_formula());
        assert!(!CellValue::formula("A1+1").has_formula());
        assert!(!CellValue::Number(1.0).has_formula());
    }

    #[test]
    fn test_effective_value_of_formula() {
        let cached = CellValue::formula_with_cached("=1+1", CellValue::Number(2.0));
        assert_eq!(cached.effective_value(), &CellValue::Number(2.0));
        assert_eq!(cached.as_number(), Some(2.0));

        let uncached = CellValue::formula("=1+1");
        assert_eq!(uncached.effective_value(), &CellValue::Empty);

        let plain = CellValue::formula("not a formula");
        assert_eq!(plain.effective_value(), &plain);
    }

    #[test]
    fn test_cached_value_is_flattened() {
        let inner = CellValue::formula_with_cached("=B1", CellValue::string("x"));
        let outer = CellValue::formula_with_cached("=A1", inner);
        match outer {
            CellValue::Formula { cached_value, .. } => {
                assert_eq!(cached_value.as_deref(), Some(&CellValue::string("x")));
            }
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn test_cell_error_parse() {
        assert_eq!(CellError::parse("#DIV/0!"), Some(CellError::Div0));
        assert_eq!(CellError::parse("#n/a"), Some(CellError::Na));
        assert_eq!(CellError::parse("invalid"), None);
        assert_eq!(CellError::Value.to_string(), "#VALUE!");
    }
}
