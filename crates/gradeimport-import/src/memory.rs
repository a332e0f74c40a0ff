//! In-memory store and resolver, for tests and dry runs.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use gradeimport_model::{ExamContext, ExamKey, ExamRecord};

use crate::error::{StoreError, StoreResult};
use crate::store::{
    GradeKey, GradeRow, ImportStore, StudentMatch, StudentQuery, StudentResolver,
};

/// Confidence of a name-only student match.
pub const NAME_MATCH_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredStudent {
    pub key: String,
    pub student_id: Option<String>,
    pub name: String,
    pub class_name: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    exams: Vec<ExamRecord>,
    students: Vec<StoredStudent>,
    rows: BTreeMap<String, GradeRow>,
    next_id: usize,
    failing_rows: BTreeSet<usize>,
    race_exam_creation: bool,
    reject_exams: bool,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn find_student(&self, query: &StudentQuery) -> StudentMatch {
        if let Some(id) = &query.student_id
            && let Some(student) = self
                .students
                .iter()
                .find(|s| s.student_id.as_deref() == Some(id.as_str()))
        {
            return StudentMatch::exact(&student.key);
        }

        let name = fold(&query.name);
        if name.is_empty() {
            return StudentMatch::new_student();
        }
        let same_name: Vec<&StoredStudent> = self
            .students
            .iter()
            .filter(|s| fold(&s.name) == name)
            .collect();
        let same_class: Vec<&StoredStudent> = same_name
            .iter()
            .copied()
            .filter(|s| match (&query.class_name, &s.class_name) {
                (Some(wanted), Some(stored)) => fold(wanted) == fold(stored),
                _ => false,
            })
            .collect();

        match (same_class.as_slice(), same_name.as_slice()) {
            ([student], _) => StudentMatch::exact(&student.key),
            ([], [student]) => StudentMatch::fuzzy(&student.key, NAME_MATCH_CONFIDENCE),
            ([], []) => StudentMatch::new_student(),
            _ => StudentMatch::conflict(NAME_MATCH_CONFIDENCE / 2.0),
        }
    }
}

fn fold(value: &str) -> String {
    value.split_whitespace().collect::<String>().to_lowercase()
}

/// Thread-safe store keeping everything in process memory.
///
/// Also implements [`StudentResolver`] over its own students.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a known student and return its key.
    pub fn add_student(
        &self,
        student_id: Option<&str>,
        name: &str,
        class_name: Option<&str>,
    ) -> String {
        let mut state = self.state();
        let key = state.next_id("student");
        state.students.push(StoredStudent {
            key: key.clone(),
            student_id: student_id.map(str::to_string),
            name: name.to_string(),
            class_name: class_name.map(str::to_string),
        });
        key
    }

    /// Register an exam directly, bypassing uniqueness checks.
    pub fn add_exam(&self, exam: ExamContext) -> String {
        let mut state = self.state();
        let id = state.next_id("exam");
        state.exams.push(ExamRecord {
            id: id.clone(),
            context: exam,
        });
        id
    }

    /// Make `insert_row` fail transiently for the given upload row.
    pub fn fail_row(&self, row_index: usize) {
        self.state().failing_rows.insert(row_index);
    }

    /// Simulate a concurrent writer creating the same exam first.
    pub fn race_exam_creation(&self) {
        self.state().race_exam_creation = true;
    }

    /// Make every exam creation fail.
    pub fn reject_exams(&self) {
        self.state().reject_exams = true;
    }

    pub fn exams(&self) -> Vec<ExamRecord> {
        self.state().exams.clone()
    }

    pub fn students(&self) -> Vec<StoredStudent> {
        self.state().students.clone()
    }

    pub fn rows(&self) -> Vec<GradeRow> {
        self.state().rows.values().cloned().collect()
    }

    pub fn row_count(&self) -> usize {
        self.state().rows.len()
    }
}

#[async_trait::async_trait]
impl ImportStore for InMemoryStore {
    async fn find_exam(&self, key: &ExamKey) -> StoreResult<Option<ExamRecord>> {
        Ok(self
            .state()
            .exams
            .iter()
            .find(|exam| exam.context.key() == *key)
            .cloned())
    }

    async fn create_exam(&self, exam: &ExamContext) -> StoreResult<String> {
        let mut state = self.state();
        if state.reject_exams {
            return Err(StoreError::Rejected(format!("exam '{}'", exam.title)));
        }
        let key = exam.key();
        if state.race_exam_creation {
            state.race_exam_creation = false;
            let id = state.next_id("exam");
            state.exams.push(ExamRecord {
                id,
                context: exam.clone(),
            });
        }
        if state.exams.iter().any(|stored| stored.context.key() == key) {
            return Err(StoreError::UniqueViolation(format!("exam '{}'", exam.title)));
        }
        let id = state.next_id("exam");
        state.exams.push(ExamRecord {
            id: id.clone(),
            context: exam.clone(),
        });
        Ok(id)
    }

    async fn update_exam(&self, exam_id: &str, exam: &ExamContext) -> StoreResult<()> {
        let mut state = self.state();
        let stored = state
            .exams
            .iter_mut()
            .find(|stored| stored.id == exam_id)
            .ok_or_else(|| StoreError::NotFound(format!("exam {exam_id}")))?;
        stored.context = exam.clone();
        Ok(())
    }

    async fn find_duplicate_row(&self, key: &GradeKey) -> StoreResult<Option<String>> {
        Ok(self
            .state()
            .rows
            .iter()
            .find(|(_, row)| row.key() == *key)
            .map(|(id, _)| id.clone()))
    }

    async fn insert_row(&self, row: &GradeRow) -> StoreResult<String> {
        let mut state = self.state();
        if state.failing_rows.contains(&row.row_index) {
            return Err(StoreError::Transient(format!(
                "write of row {} timed out",
                row.row_index
            )));
        }
        let key = row.key();
        if state.rows.values().any(|stored| stored.key() == key) {
            return Err(StoreError::UniqueViolation(format!(
                "grade of {} in exam {}",
                row.student_key, row.exam_id
            )));
        }
        let id = state.next_id("grade");
        state.rows.insert(id.clone(), row.clone());
        Ok(id)
    }

    async fn update_row(&self, row_id: &str, row: &GradeRow) -> StoreResult<()> {
        let mut state = self.state();
        let stored = state
            .rows
            .get_mut(row_id)
            .ok_or_else(|| StoreError::NotFound(format!("grade {row_id}")))?;
        *stored = row.clone();
        Ok(())
    }

    async fn create_student_if_missing(&self, query: &StudentQuery) -> StoreResult<String> {
        let mut state = self.state();
        if let Some(key) = state.find_student(query).student_key {
            return Ok(key);
        }
        if query.name.trim().is_empty() && query.student_id.is_none() {
            return Err(StoreError::Rejected(
                "student has neither a name nor an id".to_string(),
            ));
        }
        let key = state.next_id("student");
        state.students.push(StoredStudent {
            key: key.clone(),
            student_id: query.student_id.clone(),
            name: query.name.trim().to_string(),
            class_name: query.class_name.clone(),
        });
        Ok(key)
    }
}

#[async_trait::async_trait]
impl StudentResolver for InMemoryStore {
    async fn resolve(&self, query: &StudentQuery) -> StoreResult<StudentMatch> {
        Ok(self.state().find_student(query))
    }
}
