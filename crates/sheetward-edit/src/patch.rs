//! Partial style updates

use crate::error::{EditError, EditResult};
use serde::{Deserialize, Serialize};
use sheetward_core::{Color, FillStyle, HorizontalAlignment, NumberFormat, Style, VerticalAlignment};

/// Style fields to change on a cell
///
/// Every field is optional. Fields left out keep the cell's current setting.
/// Colors are hex strings: `"FF0000"`, `"#FF0000"` or `"80FF0000"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StylePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<HorizontalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VerticalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_text: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
}

impl StylePatch {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == StylePatch::default()
    }

    /// Merge the patch over `base`
    ///
    /// Input is checked in full before anything is merged, so an invalid
    /// color never yields a half-applied style.
    pub fn apply_to(&self, base: &Style) -> EditResult<Style> {
        let font_color = self.font_color.as_deref().map(parse_color).transpose()?;
        let fill_color = self.fill_color.as_deref().map(parse_color).transpose()?;
        if let Some(size) = self.font_size {
            if !size.is_finite() || size <= 0.0 || size > 409.0 {
                return Err(EditError::InvalidStyle(format!("font size {size} out of range")));
            }
        }
        if let Some(name) = &self.font_name {
            if name.trim().is_empty() {
                return Err(EditError::InvalidStyle("font name is empty".into()));
            }
        }

        let mut style = base.clone();
        if let Some(name) = &self.font_name {
            style.font.name = name.trim().to_string();
        }
        if let Some(size) = self.font_size {
            style.font.size = size;
        }
        if let Some(bold) = self.bold {
            style.font.bold = bold;
        }
        if let Some(italic) = self.italic {
            style.font.italic = italic;
        }
        if let Some(color) = font_color {
            style.font.color = color;
        }
        if let Some(color) = fill_color {
            style.fill = FillStyle::solid(color);
        }
        if let Some(horizontal) = self.horizontal {
            style.alignment.horizontal = horizontal;
        }
        if let Some(vertical) = self.vertical {
            style.alignment.vertical = vertical;
        }
        if let Some(wrap) = self.wrap_text {
            style.alignment.wrap_text = wrap;
        }
        if let Some(code) = &self.number_format {
            style.number_format = NumberFormat::from_code(code);
        }
        Ok(style)
    }
}

fn parse_color(hex: &str) -> EditResult<Color> {
    Color::from_hex(hex).ok_or_else(|| EditError::InvalidColor(hex.to_string()))
}
