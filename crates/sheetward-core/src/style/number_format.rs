//! Number format types

/// Number format for cell display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

/// Built-in format codes that have a fixed ID in every workbook
const BUILT_IN_CODES: &[(u32, &str)] = &[
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

impl NumberFormat {
    /// First ID available for custom formats in styles.xml
    pub const FIRST_CUSTOM_ID: u32 = 164;

    /// Map a format code to a built-in ID when one exists
    ///
    /// ```
    /// use sheetward_core::NumberFormat;
    ///
    /// assert_eq!(NumberFormat::from_code("0.00%"), NumberFormat::BuiltIn(10));
    /// assert_eq!(NumberFormat::from_code("General"), NumberFormat::General);
    /// assert_eq!(
    ///     NumberFormat::from_code("yyyy-mm-dd"),
    ///     NumberFormat::Custom("yyyy-mm-dd".into())
    /// );
    /// ```
    pub fn from_code(code: &str) -> Self {
        if code.eq_ignore_ascii_case("general") {
            return NumberFormat::General;
        }
        BUILT_IN_CODES
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(id, _)| NumberFormat::BuiltIn(*id))
            .unwrap_or_else(|| NumberFormat::Custom(code.to_string()))
    }

    /// Resolve a `numFmtId` that has no `<numFmt>` entry
    pub fn from_id(id: u32) -> Self {
        if id == 0 {
            NumberFormat::General
        } else {
            NumberFormat::BuiltIn(id)
        }
    }

    /// Format code, where one is known
    pub fn code(&self) -> Option<&str> {
        match self {
            NumberFormat::General => Some("General"),
            NumberFormat::BuiltIn(id) => BUILT_IN_CODES
                .iter()
                .find(|(i, _)| i == id)
                .map(|(_, code)| *code),
            NumberFormat::Custom(code) => Some(code),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for NumberFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match (self, self.code()) {
            (_, Some(code)) => serializer.serialize_str(code),
            (NumberFormat::BuiltIn(id), None) => serializer.collect_str(&format_args!("builtin:{}", id)),
            (_, None) => serializer.serialize_str("General"),
        }
    }
}
