pub mod error;
pub mod exam;
pub mod mapping;
pub mod options;
pub mod progress;
pub mod resolution;
pub mod schema;
pub mod validation;
pub mod value;

pub use error::{EngineError, MappingError, Result, TransitionError};
pub use exam::{ExamContext, ExamKey, ExamRecord, normalize_title};
pub use mapping::{CUSTOM_PREFIX, ColumnMapping, ExternalSuggestion, custom_key, is_custom_key};
pub use options::{
    DuplicatePolicy, EngineConfig, ExamMergePolicy, ImportConfig, ImportMode, ValidationConfig,
};
pub use progress::{ImportProgress, ImportResult, ImportStatus};
pub use resolution::{
    FollowUpAction, FollowUpKind, MissingFieldInfo, ResolutionResult, StrategyTag,
};
pub use schema::{FieldKind, Importance, SchemaField};
pub use validation::{
    MappedRecord, RowStatus, Severity, ValidationIssue, ValidationReport, ValidationSummary,
};
pub use value::{CellValue, SourceRow, UploadedSheet, sample_values};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_result_serializes() {
        let mut mapping = ColumnMapping::new();
        mapping.insert("姓名", "name").expect("insert name");
        let result = ResolutionResult {
            strategy: StrategyTag::PatternMatch,
            confidence: 0.8,
            mapping,
            custom_fields: Default::default(),
            custom_kinds: Default::default(),
            missing_fields: vec![MissingFieldInfo {
                field: "student_id".to_string(),
                display_name: "学号".to_string(),
                importance: Importance::Important,
                suggested_source_headers: vec![],
                deferrable: true,
                default_value: None,
            }],
            warnings: vec![],
            can_proceed: true,
            follow_ups: vec![],
        };
        let json = serde_json::to_string(&result).expect("serialize result");
        assert!(json.contains("\"strategy\":\"pattern_match\""));
        let round: ResolutionResult = serde_json::from_str(&json).expect("deserialize result");
        assert_eq!(round.mapping.get("姓名"), Some("name"));
        assert_eq!(round.missing_critical().count(), 0);
    }
}
