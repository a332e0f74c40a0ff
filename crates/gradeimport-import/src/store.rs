//! Persistence and identity collaborators of the import orchestrator.

use std::collections::BTreeMap;

use gradeimport_model::{CellValue, ExamContext, ExamKey, ExamRecord, MappedRecord};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// Identity fields of one row, as handed to the [`StudentResolver`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentQuery {
    pub student_id: Option<String>,
    /// Blank when the upload carries no names.
    pub name: String,
    pub class_name: Option<String>,
}

impl StudentQuery {
    pub fn from_record(record: &MappedRecord) -> Self {
        Self {
            student_id: record.text("student_id"),
            name: record.text("name").unwrap_or_default(),
            class_name: record.text("class_name"),
        }
    }

    /// True when the row can only be matched by name.
    pub fn is_name_only(&self) -> bool {
        self.student_id.is_none()
    }
}

/// How a row's student was identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    /// No known student matches.
    New,
    /// Several students match equally well.
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentMatch {
    pub kind: MatchKind,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_key: Option<String>,
}

impl StudentMatch {
    pub fn exact(student_key: impl Into<String>) -> Self {
        Self {
            kind: MatchKind::Exact,
            confidence: 1.0,
            student_key: Some(student_key.into()),
        }
    }

    pub fn fuzzy(student_key: impl Into<String>, confidence: f64) -> Self {
        Self {
            kind: MatchKind::Fuzzy,
            confidence,
            student_key: Some(student_key.into()),
        }
    }

    pub fn new_student() -> Self {
        Self {
            kind: MatchKind::New,
            confidence: 0.0,
            student_key: None,
        }
    }

    pub fn conflict(confidence: f64) -> Self {
        Self {
            kind: MatchKind::Conflict,
            confidence,
            student_key: None,
        }
    }
}

/// Logical identity of a stored grade row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GradeKey {
    pub exam_id: String,
    pub student_key: String,
    pub subject: Option<String>,
}

/// One grade row ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRow {
    pub exam_id: String,
    pub student_key: String,
    pub subject: Option<String>,
    /// 1-based row of the upload this grade came from.
    pub row_index: usize,
    pub fields: BTreeMap<String, CellValue>,
}

impl GradeRow {
    pub fn key(&self) -> GradeKey {
        GradeKey {
            exam_id: self.exam_id.clone(),
            student_key: self.student_key.clone(),
            subject: self.subject.clone(),
        }
    }
}

/// Persistence collaborator. Implementations must be safe to share
/// between concurrently running row imports.
#[async_trait::async_trait]
pub trait ImportStore: Send + Sync {
    async fn find_exam(&self, key: &ExamKey) -> StoreResult<Option<ExamRecord>>;

    /// Store a new exam and return its id.
    ///
    /// Fails with [`StoreError::UniqueViolation`](crate::StoreError::UniqueViolation)
    /// when an exam with the same key already exists.
    async fn create_exam(&self, exam: &ExamContext) -> StoreResult<String>;

    async fn update_exam(&self, exam_id: &str, exam: &ExamContext) -> StoreResult<()>;

    /// Id of a stored row with the same logical key, if any.
    async fn find_duplicate_row(&self, key: &GradeKey) -> StoreResult<Option<String>>;

    async fn insert_row(&self, row: &GradeRow) -> StoreResult<String>;

    async fn update_row(&self, row_id: &str, row: &GradeRow) -> StoreResult<()>;

    /// Return the key of the student described by `query`, creating it when absent.
    async fn create_student_if_missing(&self, query: &StudentQuery) -> StoreResult<String>;
}

/// Maps row identity fields to a known student.
#[async_trait::async_trait]
pub trait StudentResolver: Send + Sync {
    async fn resolve(&self, query: &StudentQuery) -> StoreResult<StudentMatch>;
}
