//! Issue categories.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Reference,
    Coverage,
    Integrity,
    Cardinality,
    Type,
}

impl Category {
    pub const fn all() -> &'static [Self] {
        &[
            Self::Reference,
            Self::Coverage,
            Self::Integrity,
            Self::Cardinality,
            Self::Type,
        ]
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Reference => "Reference",
            Self::Coverage => "Coverage",
            Self::Integrity => "Integrity",
            Self::Cardinality => "Cardinality",
            Self::Type => "Type",
        }
    }

    /// Description for UI.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Reference => "Mapped paths that are missing or not leaves",
            Self::Coverage => "Required target fields without a mapping",
            Self::Integrity => "Corrupt or self-referencing mapping sets",
            Self::Cardinality => "Single/multi-valued mismatches and divergent arrays",
            Self::Type => "Kind conversions between source and target",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_matches_labels() {
        for category in Category::all() {
            assert_eq!(Category::parse(category.label()), Some(*category));
        }
        assert_eq!(Category::parse(" coverage"), Some(Category::Coverage));
        assert_eq!(Category::parse("terminology"), None);
    }
}
