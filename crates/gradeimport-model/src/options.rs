//! Configuration options for validation and import.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Options controlling the row validator.
///
/// The presets are plain value bundles; every field can still be tuned
/// with the `with_*` builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Halt at the first row with an error.
    pub strict_mode: bool,
    /// Withhold error rows from the import.
    pub skip_invalid_rows: bool,
    /// Stop once this many errors accumulated. 0 disables the limit.
    pub max_errors: usize,
    pub require_student_id: bool,
    pub require_class_name: bool,
    /// Require at least one score value per row.
    pub require_scores: bool,
    /// Synthesize a temporary id when the student id is blank.
    pub auto_generate_student_id: bool,
    /// Accept student ids shorter than 3 characters without a warning.
    pub allow_short_student_id: bool,
    /// Warn on class names that do not look like a class.
    pub check_class_name_format: bool,
    /// Scores above this value produce a warning.
    pub score_upper_bound: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            skip_invalid_rows: true,
            max_errors: 100,
            require_student_id: false,
            require_class_name: false,
            require_scores: false,
            auto_generate_student_id: true,
            allow_short_student_id: true,
            check_class_name_format: false,
            score_upper_bound: 200.0,
        }
    }
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept nearly anything; for messy exports.
    pub fn lenient() -> Self {
        Self {
            max_errors: 1000,
            score_upper_bound: 1000.0,
            ..Self::default()
        }
    }

    /// Require complete, well-formed rows and stop early.
    pub fn strict() -> Self {
        Self {
            strict_mode: true,
            skip_invalid_rows: false,
            max_errors: 10,
            require_student_id: true,
            require_class_name: true,
            require_scores: true,
            auto_generate_student_id: false,
            allow_short_student_id: false,
            check_class_name_format: true,
            score_upper_bound: 150.0,
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "default" => Some(Self::default()),
            "lenient" => Some(Self::lenient()),
            "strict" => Some(Self::strict()),
            _ => None,
        }
    }

    pub fn with_strict_mode(mut self, enable: bool) -> Self {
        self.strict_mode = enable;
        self
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    pub fn with_skip_invalid_rows(mut self, enable: bool) -> Self {
        self.skip_invalid_rows = enable;
        self
    }

    pub fn with_auto_generate_student_id(mut self, enable: bool) -> Self {
        self.auto_generate_student_id = enable;
        self
    }

    pub fn with_score_upper_bound(mut self, bound: f64) -> Self {
        self.score_upper_bound = bound;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.score_upper_bound.is_finite() || self.score_upper_bound <= 0.0 {
            return Err(EngineError::invalid_config(
                "score_upper_bound",
                format!("must be a positive number, got {}", self.score_upper_bound),
            ));
        }
        Ok(())
    }
}

/// What to do when a row already exists for the same exam and student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the stored row; count the incoming one as skipped.
    Skip,
    /// Overwrite the stored row.
    Update,
    /// Fail the incoming row.
    #[default]
    Reject,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::Skip => "skip",
            DuplicatePolicy::Update => "update",
            DuplicatePolicy::Reject => "reject",
        }
    }
}

/// How an incoming exam is reconciled with a stored one of the same identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamMergePolicy {
    /// Reuse the stored exam untouched.
    #[default]
    ReuseExisting,
    /// Fill gaps in the stored exam from the incoming one.
    MergePreferExisting,
    /// Overwrite stored attributes with incoming ones where present.
    MergePreferIncoming,
}

/// Whether the upload carries student roster data or only grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Names or classes present; unknown students may be created.
    Full,
    /// Grades for students that must already exist.
    GradesOnly,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Full => "full",
            ImportMode::GradesOnly => "grades_only",
        }
    }
}

/// Options controlling the batched importer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub batch_size: usize,
    /// Process the rows of a batch concurrently.
    pub parallel_import: bool,
    /// In-flight rows per batch in parallel mode.
    pub max_concurrency: usize,
    pub duplicate_policy: DuplicatePolicy,
    pub exam_merge_policy: ExamMergePolicy,
    /// Forced mode; detected from the records when `None`.
    pub import_mode: Option<ImportMode>,
    /// Create students the resolver does not know.
    pub create_missing_students: bool,
    /// Fail the run at the first failed row.
    pub strict_mode: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            parallel_import: false,
            max_concurrency: 8,
            duplicate_policy: DuplicatePolicy::default(),
            exam_merge_policy: ExamMergePolicy::default(),
            import_mode: None,
            create_missing_students: true,
            strict_mode: false,
        }
    }
}

impl ImportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_parallel(mut self, max_concurrency: usize) -> Self {
        self.parallel_import = true;
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn with_exam_merge_policy(mut self, policy: ExamMergePolicy) -> Self {
        self.exam_merge_policy = policy;
        self
    }

    pub fn with_import_mode(mut self, mode: ImportMode) -> Self {
        self.import_mode = Some(mode);
        self
    }

    pub fn with_create_missing_students(mut self, enable: bool) -> Self {
        self.create_missing_students = enable;
        self
    }

    pub fn with_strict_mode(mut self, enable: bool) -> Self {
        self.strict_mode = enable;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(EngineError::invalid_config(
                "batch_size",
                "must be at least 1",
            ));
        }
        if self.max_concurrency == 0 {
            return Err(EngineError::invalid_config(
                "max_concurrency",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub validation: ValidationConfig,
    pub import: ImportConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.validation.validate()?;
        self.import.validate()
    }
}
