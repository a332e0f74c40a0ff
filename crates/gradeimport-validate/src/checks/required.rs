//! Required presence checks.

use gradeimport_model::{FieldKind, MappedRecord, ValidationConfig, ValidationIssue};

use super::{CLASS_NAME, FieldKinds, NAME, SCORE, STUDENT_ID};

pub fn check(
    record: &MappedRecord,
    kinds: &FieldKinds<'_>,
    config: &ValidationConfig,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let row = record.row_index;

    let mut required = vec![NAME];
    if config.require_student_id {
        required.push(STUDENT_ID);
    }
    if config.require_class_name {
        required.push(CLASS_NAME);
    }
    for key in required {
        if !record.has_value(key) {
            issues.push(ValidationIssue::error(
                row,
                key,
                "",
                format!("{} is required", kinds.display_name(key)),
            ));
        }
    }

    if config.require_scores {
        let has_score = record
            .fields
            .iter()
            .any(|(key, value)| kinds.kind_of(key) == FieldKind::Score && !value.is_blank());
        if !has_score {
            issues.push(ValidationIssue::error(
                row,
                SCORE,
                "",
                "at least one score is required",
            ));
        }
    }

    issues
}
