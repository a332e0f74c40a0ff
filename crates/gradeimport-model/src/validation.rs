//! Row validation results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::CellValue;

/// Issue severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Row cannot be imported as is.
    Error,
    /// Row is importable but should be reviewed.
    Warning,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One problem found in one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// 1-based row number within the upload.
    pub row_index: usize,
    pub field: String,
    pub value: String,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn error(
        row_index: usize,
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row_index,
            field: field.into(),
            value: value.into(),
            message: message.into(),
            severity: Severity::Error,
            suggestion: None,
        }
    }

    pub fn warning(
        row_index: usize,
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(row_index, field, value, message)
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Outcome class of a validated row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    #[default]
    Valid,
    Warning,
    Error,
}

impl RowStatus {
    /// Error wins over warning.
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a ValidationIssue>) -> Self {
        let mut status = RowStatus::Valid;
        for issue in issues {
            match issue.severity {
                Severity::Error => return RowStatus::Error,
                Severity::Warning => status = RowStatus::Warning,
            }
        }
        status
    }
}

/// Counters over a validation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Rows that were validated.
    pub total_rows: usize,
    pub valid_rows: usize,
    pub error_rows: usize,
    pub warning_rows: usize,
    /// Rows never reached because validation halted.
    pub unvalidated_rows: usize,
}

impl ValidationSummary {
    pub fn record(&mut self, status: RowStatus) {
        self.total_rows += 1;
        match status {
            RowStatus::Valid => self.valid_rows += 1,
            RowStatus::Warning => self.warning_rows += 1,
            RowStatus::Error => self.error_rows += 1,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_rows > 0
    }
}

/// A source row projected through the mapping, possibly repaired.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappedRecord {
    /// 1-based row number within the upload.
    pub row_index: usize,
    pub fields: BTreeMap<String, CellValue>,
    #[serde(default)]
    pub status: RowStatus,
}

impl MappedRecord {
    pub fn new(row_index: usize, fields: BTreeMap<String, CellValue>) -> Self {
        Self {
            row_index,
            fields,
            status: RowStatus::Valid,
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.get(key)
    }

    /// Trimmed text of a field; `None` when absent or blank.
    pub fn text(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .filter(|value| !value.is_blank())
            .map(CellValue::to_display_string)
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|value| !value.is_blank())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(key.into(), value.into());
    }
}

/// Full output of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub summary: ValidationSummary,
    pub issues: Vec<ValidationIssue>,
    /// Validated rows in upload order, repairs applied.
    pub records: Vec<MappedRecord>,
    /// Validation stopped before the last row.
    pub halted: bool,
    /// Error rows are withheld from import.
    pub skip_invalid_rows: bool,
}

impl ValidationReport {
    /// Records that should be handed to the importer.
    pub fn importable_records(&self) -> Vec<MappedRecord> {
        self.records
            .iter()
            .filter(|record| !(self.skip_invalid_rows && record.status == RowStatus::Error))
            .cloned()
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|issue| issue.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.len() - self.error_count()
    }

    pub fn issues_for_row(&self, row_index: usize) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.row_index == row_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_wins_over_warning() {
        let issues = [
            ValidationIssue::warning(1, "student_id", "", "generated"),
            ValidationIssue::error(1, "math_score", "abc", "not a number"),
        ];
        assert_eq!(RowStatus::from_issues(&issues), RowStatus::Error);
        assert_eq!(RowStatus::from_issues(&issues[..1]), RowStatus::Warning);
        assert_eq!(RowStatus::from_issues(std::iter::empty()), RowStatus::Valid);
    }

    #[test]
    fn importable_records_respect_skip_flag() {
        let mut bad = MappedRecord::new(2, BTreeMap::new());
        bad.status = RowStatus::Error;
        let mut report = ValidationReport {
            records: vec![MappedRecord::new(1, BTreeMap::new()), bad],
            skip_invalid_rows: true,
            ..Default::default()
        };
        assert_eq!(report.importable_records().len(), 1);
        report.skip_invalid_rows = false;
        assert_eq!(report.importable_records().len(), 2);
    }
}
