//! Batched import of validated records.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::Instrument;
use gradeimport_model::{
    DuplicatePolicy, ExamContext, ImportConfig, ImportMode, ImportProgress, ImportResult,
    ImportStatus, MappedRecord, Result,
};

use crate::batch::{batch_count, batch_ranges};
use crate::control::ImportControl;
use crate::error::StoreError;
use crate::sink::ProgressSink;
use crate::store::{GradeRow, ImportStore, MatchKind, StudentQuery, StudentResolver};

/// Result of importing a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Inserted,
    /// Existing row overwritten under [`DuplicatePolicy::Update`].
    Updated,
    SkippedDuplicate,
    SkippedUnknownStudent,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RowReport {
    row_index: usize,
    outcome: RowOutcome,
}

/// Pick the import mode from the records themselves.
///
/// Rows carrying a name or class describe students; anything else only
/// carries grades for students that must already exist.
pub fn detect_mode(records: &[MappedRecord]) -> ImportMode {
    let describes_students = records
        .iter()
        .any(|record| record.has_value("name") || record.has_value("class_name"));
    if describes_students {
        ImportMode::Full
    } else {
        ImportMode::GradesOnly
    }
}

/// Drives one import run per call to [`ImportOrchestrator::run`].
pub struct ImportOrchestrator {
    store: Arc<dyn ImportStore>,
    resolver: Arc<dyn StudentResolver>,
    config: ImportConfig,
    control: ImportControl,
}

impl ImportOrchestrator {
    pub fn new(
        store: Arc<dyn ImportStore>,
        resolver: Arc<dyn StudentResolver>,
        config: ImportConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            config,
            control: ImportControl::new(),
        }
    }

    /// Share an existing control handle instead of a fresh one.
    pub fn with_control(mut self, control: ImportControl) -> Self {
        self.control = control;
        self
    }

    /// Handle to pause, resume or cancel the run from elsewhere.
    pub fn control(&self) -> ImportControl {
        self.control.clone()
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import `records` into `exam`.
    ///
    /// Only an invalid configuration is returned as an error. Store
    /// failures end up in the result's error list.
    pub async fn run(
        &self,
        records: &[MappedRecord],
        exam: &ExamContext,
        sink: &dyn ProgressSink,
    ) -> Result<ImportResult> {
        self.config.validate()?;
        let mode = self
            .config
            .import_mode
            .unwrap_or_else(|| detect_mode(records));
        let span = tracing::info_span!("import", rows = records.len(), mode = mode.as_str());
        Ok(self.execute(records, exam, mode, sink).instrument(span).await)
    }

    async fn execute(
        &self,
        records: &[MappedRecord],
        exam: &ExamContext,
        mode: ImportMode,
        sink: &dyn ProgressSink,
    ) -> ImportResult {
        let started = Instant::now();
        let batches = batch_ranges(records.len(), self.config.batch_size);
        let mut progress =
            ImportProgress::new(records.len(), batch_count(records.len(), self.config.batch_size));

        if self.control.is_cancelled() {
            advance(&mut progress, ImportStatus::Cancelled, sink);
            return self.finish(&progress, None, 0, started, sink);
        }
        advance(&mut progress, ImportStatus::Importing, sink);

        let exam_id = match self.reconcile_exam(exam).await {
            Ok((id, note)) => {
                if let Some(note) = note {
                    progress.warnings.push(note);
                }
                id
            }
            Err(err) => {
                tracing::error!(error = %err, title = %exam.title, "exam reconciliation failed");
                progress.errors.push(format!("exam '{}': {err}", exam.title));
                advance(&mut progress, ImportStatus::Failed, sink);
                return self.finish(&progress, None, 0, started, sink);
            }
        };

        let mut completed_batches = 0;
        let mut stopped = false;
        for (index, range) in batches.into_iter().enumerate() {
            if !self.hold_while_paused(&mut progress, sink).await {
                stopped = true;
                break;
            }
            progress.current_batch = index + 1;

            let batch = &records[range];
            let reports = if self.config.parallel_import {
                self.run_parallel(batch, &exam_id, exam, mode).await
            } else {
                self.run_sequential(batch, &exam_id, exam, mode).await
            };
            let failed_before = progress.failed;
            let whole_batch = reports.len() == batch.len();
            for report in reports {
                apply(&mut progress, report);
            }
            // A cancel can stop dispatch partway through a parallel batch.
            if whole_batch {
                completed_batches += 1;
            }
            tracing::info!(
                batch = index + 1,
                processed = progress.processed,
                successful = progress.successful,
                failed = progress.failed,
                "batch settled"
            );
            sink.on_progress(&progress);

            if self.config.strict_mode && progress.failed > failed_before {
                progress
                    .errors
                    .push("import stopped at the first failed row (strict mode)".to_string());
                advance(&mut progress, ImportStatus::Failed, sink);
                break;
            }
        }

        let cut_short = self.control.is_cancelled() && progress.processed < progress.total;
        if (stopped || cut_short) && !progress.status.is_terminal() {
            advance(&mut progress, ImportStatus::Cancelled, sink);
        }
        if progress.status == ImportStatus::Importing {
            advance(&mut progress, ImportStatus::Completed, sink);
        }
        self.finish(&progress, Some(exam_id), completed_batches, started, sink)
    }

    fn finish(
        &self,
        progress: &ImportProgress,
        exam_id: Option<String>,
        completed_batches: usize,
        started: Instant,
        sink: &dyn ProgressSink,
    ) -> ImportResult {
        let result =
            ImportResult::from_progress(progress, exam_id, completed_batches, started.elapsed());
        tracing::info!(
            status = %result.status,
            successful = result.successful,
            failed = result.failed,
            skipped = result.skipped,
            elapsed_ms = result.elapsed_ms,
            "import finished"
        );
        sink.on_complete(&result);
        result
    }

    /// Honor a pending pause. Returns `false` when the run must stop.
    async fn hold_while_paused(
        &self,
        progress: &mut ImportProgress,
        sink: &dyn ProgressSink,
    ) -> bool {
        if self.control.is_cancelled() {
            return false;
        }
        if !self.control.is_paused() {
            return true;
        }
        tracing::info!(batch = progress.current_batch, "import paused");
        advance(progress, ImportStatus::Paused, sink);
        if !self.control.wait_for_resume().await {
            return false;
        }
        tracing::info!("import resumed");
        advance(progress, ImportStatus::Importing, sink);
        true
    }

    /// Find or create the exam; the note describes a reuse or merge.
    async fn reconcile_exam(
        &self,
        exam: &ExamContext,
    ) -> std::result::Result<(String, Option<String>), StoreError> {
        let key = exam.key();
        if let Some(stored) = self.store.find_exam(&key).await? {
            return self.reuse_exam(stored.id, &stored.context, exam).await;
        }
        match self.store.create_exam(exam).await {
            Ok(id) => {
                tracing::debug!(exam_id = %id, "exam created");
                Ok((id, None))
            }
            Err(StoreError::UniqueViolation(reason)) => {
                tracing::debug!(%reason, "exam created concurrently, looking it up again");
                match self.store.find_exam(&key).await? {
                    Some(stored) => self.reuse_exam(stored.id, &stored.context, exam).await,
                    None => Err(StoreError::UniqueViolation(reason)),
                }
            }
            Err(err) => Err(err),
        }
    }

    async fn reuse_exam(
        &self,
        id: String,
        stored: &ExamContext,
        incoming: &ExamContext,
    ) -> std::result::Result<(String, Option<String>), StoreError> {
        match incoming.merged_into(stored, self.config.exam_merge_policy) {
            Some(merged) => {
                self.store.update_exam(&id, &merged).await?;
                let note = format!("merged details into existing exam '{}'", stored.title);
                Ok((id, Some(note)))
            }
            None => {
                let note = format!("reusing existing exam '{}'", stored.title);
                Ok((id, Some(note)))
            }
        }
    }

    async fn run_sequential(
        &self,
        batch: &[MappedRecord],
        exam_id: &str,
        exam: &ExamContext,
        mode: ImportMode,
    ) -> Vec<RowReport> {
        let mut reports = Vec::with_capacity(batch.len());
        for record in batch {
            reports.push(self.import_row(record, exam_id, exam, mode).await);
        }
        reports
    }

    async fn run_parallel(
        &self,
        batch: &[MappedRecord],
        exam_id: &str,
        exam: &ExamContext,
        mode: ImportMode,
    ) -> Vec<RowReport> {
        let mut reports = Vec::with_capacity(batch.len());
        let mut pending = batch.iter();
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.config.max_concurrency && !self.control.is_cancelled() {
                match pending.next() {
                    Some(record) => in_flight.push(self.import_row(record, exam_id, exam, mode)),
                    None => break,
                }
            }
            match in_flight.next().await {
                Some(report) => reports.push(report),
                None => break,
            }
        }
        reports
    }

    async fn import_row(
        &self,
        record: &MappedRecord,
        exam_id: &str,
        exam: &ExamContext,
        mode: ImportMode,
    ) -> RowReport {
        let outcome = self.row_outcome(record, exam_id, exam, mode).await;
        if let RowOutcome::Failed(reason) = &outcome {
            tracing::warn!(row = record.row_index, %reason, "row failed");
        }
        RowReport {
            row_index: record.row_index,
            outcome,
        }
    }

    async fn row_outcome(
        &self,
        record: &MappedRecord,
        exam_id: &str,
        exam: &ExamContext,
        mode: ImportMode,
    ) -> RowOutcome {
        let query = StudentQuery::from_record(record);
        let matched = match self.resolver.resolve(&query).await {
            Ok(matched) => matched,
            Err(err) => return RowOutcome::Failed(format!("student lookup failed: {err}")),
        };

        let student_key = match (matched.kind, matched.student_key) {
            (MatchKind::Exact | MatchKind::Fuzzy, Some(key)) => key,
            (MatchKind::Exact | MatchKind::Fuzzy, None) => {
                return RowOutcome::Failed("student match carried no key".to_string());
            }
            (MatchKind::Conflict, _) => {
                return RowOutcome::Failed(format!(
                    "several students match '{}'",
                    display_student(&query)
                ));
            }
            (MatchKind::New, _) if self.config.create_missing_students => {
                match self.store.create_student_if_missing(&query).await {
                    Ok(key) => key,
                    Err(err) => return RowOutcome::Failed(format!("student not created: {err}")),
                }
            }
            (MatchKind::New, _) => {
                return match mode {
                    ImportMode::GradesOnly => RowOutcome::SkippedUnknownStudent,
                    ImportMode::Full => RowOutcome::Failed(format!(
                        "unknown student '{}'",
                        display_student(&query)
                    )),
                };
            }
        };

        let row = GradeRow {
            exam_id: exam_id.to_string(),
            student_key,
            subject: record.text("subject").or_else(|| exam.subject.clone()),
            row_index: record.row_index,
            fields: record.fields.clone(),
        };

        let existing = match self.store.find_duplicate_row(&row.key()).await {
            Ok(existing) => existing,
            Err(err) => return RowOutcome::Failed(format!("duplicate check failed: {err}")),
        };
        match (existing, self.config.duplicate_policy) {
            (None, _) => match self.store.insert_row(&row).await {
                Ok(_) => RowOutcome::Inserted,
                Err(err) => RowOutcome::Failed(err.to_string()),
            },
            (Some(_), DuplicatePolicy::Skip) => RowOutcome::SkippedDuplicate,
            (Some(row_id), DuplicatePolicy::Update) => {
                match self.store.update_row(&row_id, &row).await {
                    Ok(()) => RowOutcome::Updated,
                    Err(err) => RowOutcome::Failed(err.to_string()),
                }
            }
            (Some(_), DuplicatePolicy::Reject) => {
                RowOutcome::Failed("grade already imported for this student".to_string())
            }
        }
    }
}

fn display_student(query: &StudentQuery) -> &str {
    if query.name.is_empty() {
        query.student_id.as_deref().unwrap_or("?")
    } else {
        &query.name
    }
}

fn apply(progress: &mut ImportProgress, report: RowReport) {
    progress.processed += 1;
    let row = report.row_index;
    match report.outcome {
        RowOutcome::Inserted | RowOutcome::Updated => progress.successful += 1,
        RowOutcome::SkippedDuplicate => {
            progress.skipped += 1;
            progress
                .warnings
                .push(format!("row {row}: duplicate grade skipped"));
        }
        RowOutcome::SkippedUnknownStudent => {
            progress.skipped += 1;
            progress
                .warnings
                .push(format!("row {row}: unknown student skipped"));
        }
        RowOutcome::Failed(reason) => {
            progress.failed += 1;
            progress.errors.push(format!("row {row}: {reason}"));
        }
    }
}

fn advance(progress: &mut ImportProgress, next: ImportStatus, sink: &dyn ProgressSink) {
    match progress.set_status(next) {
        Ok(()) => sink.on_progress(progress),
        Err(err) => tracing::warn!(error = %err, "ignored status change"),
    }
}

#[cfg(test)]
mod tests {
    use gradeimport_model::CellValue;

    use super::*;

    fn record(fields: &[(&str, &str)]) -> MappedRecord {
        MappedRecord::new(
            1,
            fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), CellValue::from(*v)))
                .collect(),
        )
    }

    #[test]
    fn mode_follows_identity_columns() {
        assert_eq!(detect_mode(&[record(&[("name", "张三")])]), ImportMode::Full);
        assert_eq!(
            detect_mode(&[record(&[("class_name", "1班"), ("student_id", "1")])]),
            ImportMode::Full
        );
        assert_eq!(
            detect_mode(&[record(&[("student_id", "2024001"), ("math_score", "90")])]),
            ImportMode::GradesOnly
        );
        assert_eq!(detect_mode(&[]), ImportMode::GradesOnly);
    }

    #[test]
    fn outcomes_update_counters() {
        let mut progress = ImportProgress::new(3, 1);
        apply(&mut progress, RowReport { row_index: 1, outcome: RowOutcome::Inserted });
        apply(&mut progress, RowReport { row_index: 2, outcome: RowOutcome::SkippedDuplicate });
        apply(
            &mut progress,
            RowReport { row_index: 3, outcome: RowOutcome::Failed("boom".to_string()) },
        );
        assert_eq!(progress.processed, 3);
        assert_eq!(progress.successful, 1);
        assert_eq!(progress.skipped, 1);
        assert_eq!(progress.failed, 1);
        assert_eq!(progress.errors, vec!["row 3: boom".to_string()]);
    }
}
