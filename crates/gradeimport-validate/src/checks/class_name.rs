//! Class name shape check.

use std::sync::LazyLock;

use gradeimport_model::{MappedRecord, ValidationConfig, ValidationIssue};
use regex::Regex;

use super::CLASS_NAME;

static CLASS_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)班|class").ok());

/// Warn on class names carrying neither "班" nor "class".
pub fn check(record: &MappedRecord, config: &ValidationConfig) -> Option<ValidationIssue> {
    if !config.check_class_name_format {
        return None;
    }
    let value = record.text(CLASS_NAME)?;
    let marker = CLASS_MARKER.as_ref()?;
    if marker.is_match(&value) {
        return None;
    }
    Some(
        ValidationIssue::warning(
            record.row_index,
            CLASS_NAME,
            value.clone(),
            "class name does not look like a class",
        )
        .with_suggestion(format!("e.g. \"{value}班\"")),
    )
}
