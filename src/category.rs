//! category.rs: top-level waste classes and their finer sub-types.
//!
//! `Category` declaration order is the tie-break priority: Biodegradable
//! outranks Recyclable outranks NonBiodegradable.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Biodegradable,
    Recyclable,
    #[serde(rename = "Non-Biodegradable", alias = "NonBiodegradable")]
    NonBiodegradable,
}

impl Category {
    /// All categories in priority order.
    pub const ALL: [Category; 3] = [
        Category::Biodegradable,
        Category::Recyclable,
        Category::NonBiodegradable,
    ];

    /// Position in the priority order (0 = highest).
    #[inline]
    pub fn priority(self) -> usize {
        self as usize
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Biodegradable => "Biodegradable",
            Category::Recyclable => "Recyclable",
            Category::NonBiodegradable => "Non-Biodegradable",
        }
    }

    /// One-line disposal advice shown next to a result.
    pub fn disposal_tip(self) -> &'static str {
        match self {
            Category::Biodegradable => "Compost or dispose in organic waste bins.",
            Category::Recyclable => "Clean and place in recycling bins.",
            Category::NonBiodegradable => "Dispose responsibly at designated collection points.",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Finer classification inside a category. Which sub-types belong to which
/// category is decided by the taxonomy, not by this enum; `General` is the
/// explicit fallback when nothing in the winning category scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubType {
    Organic,
    Garden,
    Wood,
    Paper,
    Glass,
    Plastic,
    Metal,
    Electronic,
    Hazardous,
    Rubber,
    Textile,
    Ceramic,
    General,
}

impl fmt::Display for SubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
