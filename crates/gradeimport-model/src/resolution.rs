//! Outcome of resolving an upload's columns against the schema.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mapping::ColumnMapping;
use crate::schema::{FieldKind, Importance};

/// Which step of the fallback ladder produced the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTag {
    AiSuccess,
    PatternMatch,
    IntelligentGuess,
    MinimalViable,
    ForceSuccess,
}

impl StrategyTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyTag::AiSuccess => "ai_success",
            StrategyTag::PatternMatch => "pattern_match",
            StrategyTag::IntelligentGuess => "intelligent_guess",
            StrategyTag::MinimalViable => "minimal_viable",
            StrategyTag::ForceSuccess => "force_success",
        }
    }
}

impl fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema field the mapping does not cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingFieldInfo {
    pub field: String,
    pub display_name: String,
    pub importance: Importance,
    /// Unmapped upload headers that look like this field (at most 3).
    pub suggested_source_headers: Vec<String>,
    /// The import can continue without it.
    pub deferrable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpKind {
    SuggestFieldMapping,
    CalculateDerived,
    PromptManualInput,
}

impl FollowUpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowUpKind::SuggestFieldMapping => "suggest_field_mapping",
            FollowUpKind::CalculateDerived => "calculate_derived",
            FollowUpKind::PromptManualInput => "prompt_manual_input",
        }
    }
}

/// Advisory next step for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpAction {
    pub kind: FollowUpKind,
    pub description: String,
    pub target_field: String,
    /// 1 is the most urgent.
    pub priority: u8,
}

/// Final product of the fallback ladder. Built once per upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub strategy: StrategyTag,
    pub confidence: f64,
    pub mapping: ColumnMapping,
    /// Custom target key to its display label.
    pub custom_fields: BTreeMap<String, String>,
    /// Custom target key to the kind of value it holds. Custom targets
    /// absent here are plain text.
    #[serde(default)]
    pub custom_kinds: BTreeMap<String, FieldKind>,
    pub missing_fields: Vec<MissingFieldInfo>,
    pub warnings: Vec<String>,
    pub can_proceed: bool,
    pub follow_ups: Vec<FollowUpAction>,
}

impl ResolutionResult {
    pub fn missing_critical(&self) -> impl Iterator<Item = &MissingFieldInfo> {
        self.missing_fields
            .iter()
            .filter(|info| info.importance == Importance::Critical)
    }

    pub fn is_forced(&self) -> bool {
        self.strategy == StrategyTag::ForceSuccess
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_levels_follow_ladder_order() {
        assert!(StrategyTag::AiSuccess < StrategyTag::PatternMatch);
        assert!(StrategyTag::PatternMatch < StrategyTag::IntelligentGuess);
        assert!(StrategyTag::IntelligentGuess < StrategyTag::MinimalViable);
        assert!(StrategyTag::MinimalViable < StrategyTag::ForceSuccess);
    }

    #[test]
    fn strategy_serializes_snake_case() {
        let json = serde_json::to_string(&StrategyTag::IntelligentGuess).unwrap();
        assert_eq!(json, "\"intelligent_guess\"");
        assert_eq!(StrategyTag::MinimalViable.to_string(), "minimal_viable");
    }
}
