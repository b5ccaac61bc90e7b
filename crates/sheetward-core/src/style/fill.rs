//! Cell background

use super::Color;

/// Background of a cell
///
/// Only solid fills are modelled; pattern and gradient fills decode as
/// [`FillStyle::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum FillStyle {
    #[default]
    None,
    Solid { color: Color },
}

impl FillStyle {
    pub fn solid(color: Color) -> Self {
        FillStyle::Solid { color }
    }

    pub fn is_none(&self) -> bool {
        *self == FillStyle::None
    }
}
