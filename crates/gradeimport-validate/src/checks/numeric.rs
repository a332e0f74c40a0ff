//! Score and rank value checks.

use gradeimport_model::{FieldKind, MappedRecord, ValidationConfig, ValidationIssue};

use super::FieldKinds;

pub fn check(
    record: &MappedRecord,
    kinds: &FieldKinds<'_>,
    config: &ValidationConfig,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let row = record.row_index;

    for (key, value) in &record.fields {
        let kind = kinds.kind_of(key);
        if !kind.is_numeric() || value.is_blank() {
            continue;
        }
        let raw = value.to_display_string();
        let Some(number) = value.as_number() else {
            issues.push(
                ValidationIssue::error(row, key.as_str(), raw, "value is not a number")
                    .with_suggestion("enter a numeric value or leave the cell empty"),
            );
            continue;
        };
        if number < 0.0 {
            issues.push(ValidationIssue::error(
                row,
                key.as_str(),
                raw,
                "value cannot be negative",
            ));
            continue;
        }
        if kind == FieldKind::Score && number > config.score_upper_bound {
            issues.push(ValidationIssue::warning(
                row,
                key.as_str(),
                raw,
                format!("score exceeds {}", config.score_upper_bound),
            ));
        }
    }

    issues
}
