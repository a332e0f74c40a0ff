//! Target schema field definitions.
//!
//! A [`SchemaField`] is one canonical attribute an imported row can land
//! in. Its [`Importance`] drives both how much a match is worth during
//! pattern matching and whether its absence is worth telling the user
//! about. Its [`FieldKind`] decides which row checks apply.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Importance tier of a target field.
///
/// Variants are declared from most to least important so the derived
/// ordering sorts critical fields first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    /// Without it the import is not usable (student name).
    Critical,
    /// Strongly recommended (student id, class).
    Important,
    /// Good to have (main subject scores, class rank).
    Optional,
    /// Bonus data; never reported as missing.
    NiceToHave,
}

impl Importance {
    /// Weight used when scoring a pattern-matched mapping.
    pub fn weight(&self) -> u32 {
        match self {
            Importance::Critical => 10,
            Importance::Important => 7,
            Importance::Optional => 4,
            Importance::NiceToHave => 1,
        }
    }

    /// Stable priority for follow-up ordering (1 = most urgent).
    pub fn rank(&self) -> u8 {
        match self {
            Importance::Critical => 1,
            Importance::Important => 2,
            Importance::Optional => 3,
            Importance::NiceToHave => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Critical => "critical",
            Importance::Important => "important",
            Importance::Optional => "optional",
            Importance::NiceToHave => "nice_to_have",
        }
    }

    /// True for tiers that show up in the missing-field advisory.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Importance::NiceToHave)
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Importance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "critical" => Ok(Importance::Critical),
            "important" => Ok(Importance::Important),
            "optional" => Ok(Importance::Optional),
            "nice_to_have" => Ok(Importance::NiceToHave),
            _ => Err(format!("Unknown importance: {s}")),
        }
    }
}

/// Shape of the values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Student identifier; checked for length.
    Identifier,
    /// Free text (names, class names).
    #[default]
    Text,
    /// Numeric score with a soft upper bound.
    Score,
    /// Numeric rank; non-negative.
    Rank,
    /// Grade letter from a fixed set.
    Grade,
}

impl FieldKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Score | FieldKind::Rank)
    }
}

/// One target field of the import schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub key: String,
    pub display_name: String,
    pub importance: Importance,
    #[serde(default)]
    pub kind: FieldKind,
    /// Recognition synonyms matched against upload headers.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl SchemaField {
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        importance: Importance,
        kind: FieldKind,
        patterns: &[&str],
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            importance,
            kind,
            patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    pub fn weight(&self) -> u32 {
        self.importance.weight()
    }

    /// Fields without patterns are only reachable through an explicit mapping.
    pub fn is_recognizable(&self) -> bool {
        !self.patterns.is_empty()
    }
}
