//! Marketplace quantity units.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Unit in which a product is sold.
///
/// Listings price produce per unit; the cart multiplies quantity by the
/// per-unit price regardless of which unit is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    #[default]
    Kilogram,
    Quintal,
    Tonne,
    Litre,
    Piece,
}

impl Unit {
    /// Short label for display (e.g., "kg").
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Kilogram => "kg",
            Self::Quintal => "quintal",
            Self::Tonne => "tonne",
            Self::Litre => "L",
            Self::Piece => "piece",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
