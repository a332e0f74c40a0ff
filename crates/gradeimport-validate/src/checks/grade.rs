//! Grade letter checks.

use gradeimport_model::{FieldKind, MappedRecord, ValidationIssue};

use super::FieldKinds;

pub const VALID_GRADES: &[&str] = &[
    "A+", "A", "A-", "B+", "B", "B-", "C+", "C", "C-", "D", "E", "F",
];

pub fn is_valid_grade(value: &str) -> bool {
    VALID_GRADES.contains(&value.trim().to_uppercase().as_str())
}

/// Fold full-width letters and signs, drop whitespace, uppercase.
pub fn normalize_grade(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| match ch {
            '＋' => '+',
            '－' | '—' | '–' | '−' => '-',
            'Ａ'..='Ｚ' | 'ａ'..='ｚ' => {
                char::from_u32(ch as u32 - 0xFEE0).unwrap_or(ch)
            }
            other => other,
        })
        .collect::<String>()
        .to_uppercase()
}

pub fn check(record: &MappedRecord, kinds: &FieldKinds<'_>) -> Vec<ValidationIssue> {
    record
        .fields
        .iter()
        .filter(|(key, value)| kinds.kind_of(key) == FieldKind::Grade && !value.is_blank())
        .filter_map(|(key, value)| {
            let raw = value.to_display_string();
            if is_valid_grade(&raw) {
                return None;
            }
            let normalized = normalize_grade(&raw);
            let suggestion = if is_valid_grade(&normalized) {
                format!("use \"{normalized}\"")
            } else {
                format!("allowed grades: {}", VALID_GRADES.join(", "))
            };
            Some(
                ValidationIssue::warning(
                    record.row_index,
                    key.as_str(),
                    raw,
                    "unrecognized grade",
                )
                .with_suggestion(suggestion),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_accept_case_and_padding() {
        assert!(is_valid_grade(" a+ "));
        assert!(is_valid_grade("F"));
        assert!(!is_valid_grade("A++"));
        assert!(!is_valid_grade("G"));
    }

    #[test]
    fn normalization_folds_full_width() {
        assert_eq!(normalize_grade("Ａ＋"), "A+");
        assert_eq!(normalize_grade("b －"), "B-");
        assert_eq!(normalize_grade("C"), "C");
    }
}
