//! Exam metadata the imported grades attach to.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::options::ExamMergePolicy;

/// Exam an upload belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamContext {
    pub title: String,
    pub exam_type: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<String>,
}

impl ExamContext {
    pub fn new(title: impl Into<String>, exam_type: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            exam_type: exam_type.into(),
            date,
            subject: None,
            grade_level: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_grade_level(mut self, grade_level: impl Into<String>) -> Self {
        self.grade_level = Some(grade_level.into());
        self
    }

    /// Identity used to find an already stored exam.
    pub fn key(&self) -> ExamKey {
        ExamKey {
            title: normalize_title(&self.title),
            exam_type: self.exam_type.trim().to_lowercase(),
            date: self.date,
        }
    }

    /// Combine a stored exam with this incoming one.
    ///
    /// Returns `None` when the stored exam should be kept unchanged.
    pub fn merged_into(&self, stored: &ExamContext, policy: ExamMergePolicy) -> Option<ExamContext> {
        let merged = match policy {
            ExamMergePolicy::ReuseExisting => return None,
            ExamMergePolicy::MergePreferExisting => ExamContext {
                subject: stored.subject.clone().or_else(|| self.subject.clone()),
                grade_level: stored
                    .grade_level
                    .clone()
                    .or_else(|| self.grade_level.clone()),
                ..stored.clone()
            },
            ExamMergePolicy::MergePreferIncoming => ExamContext {
                subject: self.subject.clone().or_else(|| stored.subject.clone()),
                grade_level: self
                    .grade_level
                    .clone()
                    .or_else(|| stored.grade_level.clone()),
                ..stored.clone()
            },
        };
        (merged != *stored).then_some(merged)
    }
}

/// Normalized exam identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExamKey {
    pub title: String,
    pub exam_type: String,
    pub date: NaiveDate,
}

/// Lowercase, trim and collapse inner whitespace.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// An exam as known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRecord {
    pub id: String,
    pub context: ExamContext,
}
