//! Row validator: projects rows through a mapping and runs every check.

use std::collections::BTreeMap;

use chrono::Utc;
use gradeimport_model::{
    ColumnMapping, FieldKind, MappedRecord, Result, RowStatus, SourceRow, ValidationConfig,
    ValidationIssue, ValidationReport,
};
use gradeimport_standards::SchemaRegistry;

use crate::checks::{FieldKinds, class_name, grade, identifier, numeric, required};

/// Issue field of the early-halt notice.
pub const SYSTEM_FIELD: &str = "system";

/// Validates uploaded rows against a resolved mapping.
#[derive(Debug, Clone)]
pub struct RowValidator {
    registry: SchemaRegistry,
    config: ValidationConfig,
    custom_kinds: BTreeMap<String, FieldKind>,
    stamp: String,
}

impl RowValidator {
    /// Build a validator; rejects nonsensical configuration.
    pub fn new(registry: SchemaRegistry, config: ValidationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry,
            config,
            custom_kinds: BTreeMap::new(),
            stamp: run_stamp(),
        })
    }

    /// Fix the suffix of generated student ids.
    pub fn with_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.stamp = stamp.into();
        self
    }

    /// Kinds of custom targets, usually `ResolutionResult::custom_kinds`.
    ///
    /// Custom targets without a kind are checked as plain text.
    pub fn with_custom_kinds(mut self, kinds: BTreeMap<String, FieldKind>) -> Self {
        self.custom_kinds = kinds;
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    /// Validate `rows` in order.
    ///
    /// Stops early once `max_errors` errors accumulated or, in strict
    /// mode, at the first error row. Rows past the halt are counted as
    /// unvalidated.
    pub fn validate(&self, rows: &[SourceRow], mapping: &ColumnMapping) -> ValidationReport {
        let _span = tracing::info_span!("validate", rows = rows.len()).entered();

        let mut report = ValidationReport {
            skip_invalid_rows: self.config.skip_invalid_rows,
            ..ValidationReport::default()
        };
        let mut error_total = 0usize;

        for (offset, row) in rows.iter().enumerate() {
            let row_index = offset + 1;
            let (record, issues) = self.validate_row(row_index, row, mapping);

            error_total += issues.iter().filter(|issue| issue.is_error()).count();
            report.summary.record(record.status);
            report.issues.extend(issues);
            let row_failed = record.status == RowStatus::Error;
            report.records.push(record);

            let limit_hit = self.config.max_errors > 0 && error_total >= self.config.max_errors;
            let strict_stop = self.config.strict_mode && row_failed;
            if (limit_hit || strict_stop) && row_index < rows.len() {
                let message = if strict_stop {
                    format!("validation stopped at row {row_index} (strict mode)")
                } else {
                    format!("validation stopped after {error_total} errors")
                };
                tracing::debug!(row_index, error_total, "validation halted");
                report.issues.push(ValidationIssue::warning(
                    row_index,
                    SYSTEM_FIELD,
                    "",
                    message,
                ));
                report.halted = true;
                report.summary.unvalidated_rows = rows.len() - row_index;
                break;
            }
        }

        tracing::info!(
            total = report.summary.total_rows,
            valid = report.summary.valid_rows,
            warnings = report.summary.warning_rows,
            errors = report.summary.error_rows,
            halted = report.halted,
            "validation finished"
        );
        report
    }

    /// Validate a single row; `row_index` is 1-based.
    pub fn validate_row(
        &self,
        row_index: usize,
        row: &SourceRow,
        mapping: &ColumnMapping,
    ) -> (MappedRecord, Vec<ValidationIssue>) {
        let mut record = MappedRecord::new(row_index, mapping.project(row));
        let kinds = FieldKinds::new(&self.registry, &self.custom_kinds);
        let mut issues = required::check(&record, &kinds, &self.config);

        issues.extend(identifier::check_shape(&record, &kinds, &self.config));
        issues.extend(identifier::repair(&mut record, &self.config, &self.stamp));
        issues.extend(numeric::check(&record, &kinds, &self.config));
        issues.extend(grade::check(&record, &kinds));
        issues.extend(class_name::check(&record, &self.config));

        record.status = RowStatus::from_issues(&issues);
        (record, issues)
    }
}

/// Last four digits of the current millisecond timestamp.
fn run_stamp() -> String {
    format!("{:04}", Utc::now().timestamp_millis().rem_euclid(10_000))
}
