//! Student identifier repair and shape checks.

use gradeimport_model::{CellValue, FieldKind, MappedRecord, ValidationConfig, ValidationIssue};

use super::{CLASS_NAME, FieldKinds, NAME, STUDENT_ID};

/// Identifiers shorter than this are flagged.
pub const MIN_ID_LEN: usize = 3;

/// Fill a blank student id.
///
/// With auto-generation on, the id becomes `temp_<row>_<stamp>`. Without
/// it, a row that has both a name and a class gets `<class>_<name>_<row>`.
/// Rows that must carry a real id are left alone for the required check.
pub fn repair(
    record: &mut MappedRecord,
    config: &ValidationConfig,
    stamp: &str,
) -> Option<ValidationIssue> {
    if record.has_value(STUDENT_ID) || config.require_student_id {
        return None;
    }
    let row = record.row_index;

    let generated = if config.auto_generate_student_id {
        format!("temp_{row}_{stamp}")
    } else {
        let name = record.text(NAME)?;
        let class = record.text(CLASS_NAME)?;
        format!("{class}_{name}_{row}")
    };

    record.set(STUDENT_ID, CellValue::Text(generated.clone()));
    Some(
        ValidationIssue::warning(
            row,
            STUDENT_ID,
            "",
            format!("student id missing; generated {generated}"),
        )
        .with_suggestion("add a student id column to link grades to existing students"),
    )
}

/// Flag identifiers that are too short to be meaningful.
pub fn check_shape(
    record: &MappedRecord,
    kinds: &FieldKinds<'_>,
    config: &ValidationConfig,
) -> Vec<ValidationIssue> {
    if config.allow_short_student_id {
        return Vec::new();
    }
    record
        .fields
        .iter()
        .filter(|(key, value)| kinds.kind_of(key) == FieldKind::Identifier && !value.is_blank())
        .filter(|(_, value)| value.display_len() < MIN_ID_LEN)
        .map(|(key, value)| {
            ValidationIssue::warning(
                record.row_index,
                key.as_str(),
                value.to_display_string(),
                format!("identifier is shorter than {MIN_ID_LEN} characters"),
            )
        })
        .collect()
}
