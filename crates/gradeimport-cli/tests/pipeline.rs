//! Sheet to store: resolve, validate and import together.

use std::sync::Arc;

use chrono::NaiveDate;
use gradeimport_cli::ingest::read_sheet_from;
use gradeimport_import::{ImportOrchestrator, InMemoryStore, NoopSink};
use gradeimport_map::ResolutionEngine;
use gradeimport_model::{
    DuplicatePolicy, ExamContext, ImportConfig, ImportStatus, StrategyTag, ValidationConfig,
};
use gradeimport_standards::SchemaRegistry;
use gradeimport_validate::RowValidator;

const SHEET: &str = "姓名,学号,班级,语文,数学\n\
                     张三,2024001,高一1班,95,88\n\
                     李四,,高一2班,81,abc\n\
                     王五,2024003,高一1班,77,90\n";

fn exam() -> ExamContext {
    ExamContext::new(
        "期中考试",
        "midterm",
        NaiveDate::from_ymd_opt(2026, 4, 18).expect("date"),
    )
}

#[tokio::test]
async fn sheet_is_imported_end_to_end() {
    let sheet = read_sheet_from(SHEET.as_bytes()).expect("sheet");
    let registry = SchemaRegistry::standard();

    let resolution = ResolutionEngine::new(registry.clone())
        .resolve_sheet(&sheet, None)
        .expect("resolve");
    assert_eq!(resolution.strategy, StrategyTag::PatternMatch);
    assert_eq!(resolution.mapping.get("数学"), Some("math_score"));

    let report = RowValidator::new(registry, ValidationConfig::default().with_skip_invalid_rows(true))
        .expect("validator")
        .with_stamp("0001")
        .with_custom_kinds(resolution.custom_kinds.clone())
        .validate(&sheet.rows, &resolution.mapping);
    assert_eq!(report.summary.valid_rows, 2);
    assert_eq!(report.summary.error_rows, 1);
    let records = report.importable_records();
    assert_eq!(records.len(), 2);

    let store = Arc::new(InMemoryStore::new());
    let result = ImportOrchestrator::new(store.clone(), store.clone(), ImportConfig::default())
        .run(&records, &exam(), &NoopSink)
        .await
        .expect("import");
    assert_eq!(result.status, ImportStatus::Completed);
    assert_eq!(result.successful, 2);
    assert_eq!(store.students().len(), 2);

    let again = ImportOrchestrator::new(
        store.clone(),
        store.clone(),
        ImportConfig::default().with_duplicate_policy(DuplicatePolicy::Skip),
    )
    .run(&records, &exam(), &NoopSink)
    .await
    .expect("import");
    assert_eq!(again.successful, 0);
    assert_eq!(again.failed, 0);
    assert_eq!(again.skipped, 2);
    assert_eq!(store.row_count(), 2);
}

#[tokio::test]
async fn generated_ids_flow_into_the_import() {
    let sheet = read_sheet_from("姓名,学号,总分\n赵六,,480\n".as_bytes()).expect("sheet");
    let registry = SchemaRegistry::standard();
    let resolution = ResolutionEngine::new(registry.clone())
        .resolve_sheet(&sheet, None)
        .expect("resolve");
    let report = RowValidator::new(registry, ValidationConfig::default())
        .expect("validator")
        .with_stamp("0042")
        .validate(&sheet.rows, &resolution.mapping);

    assert_eq!(report.summary.warning_rows, 1);
    let records = report.importable_records();
    assert_eq!(records[0].text("student_id").as_deref(), Some("temp_1_0042"));

    let store = Arc::new(InMemoryStore::new());
    let result = ImportOrchestrator::new(store.clone(), store.clone(), ImportConfig::default())
        .run(&records, &exam(), &NoopSink)
        .await
        .expect("import");
    assert!(result.is_success());
    assert_eq!(
        store.students()[0].student_id.as_deref(),
        Some("temp_1_0042")
    );
}

#[test]
fn guessed_subject_columns_are_validated_as_scores() {
    let sheet = read_sheet_from(
        "姓名,Music\n张三,35\n李四,40\n王五,45\n赵六,38\n钱七,42\n孙八,abc\n周九,-5\n"
            .as_bytes(),
    )
    .expect("sheet");
    let registry = SchemaRegistry::standard();
    let resolution = ResolutionEngine::new(registry.clone())
        .resolve_sheet(&sheet, None)
        .expect("resolve");
    assert_eq!(resolution.mapping.get("Music"), Some("custom_music"));

    let report = RowValidator::new(registry, ValidationConfig::default())
        .expect("validator")
        .with_stamp("0007")
        .with_custom_kinds(resolution.custom_kinds.clone())
        .validate(&sheet.rows, &resolution.mapping);

    assert_eq!(report.summary.error_rows, 2);
    let bad_rows: Vec<usize> = report
        .issues
        .iter()
        .filter(|issue| issue.is_error())
        .map(|issue| issue.row_index)
        .collect();
    assert_eq!(bad_rows, vec![6, 7]);
}
