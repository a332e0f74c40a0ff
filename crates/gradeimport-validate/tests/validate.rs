use std::collections::BTreeMap;

use gradeimport_model::{
    CellValue, ColumnMapping, EngineError, FieldKind, RowStatus, Severity, SourceRow,
    ValidationConfig,
};
use gradeimport_standards::SchemaRegistry;
use gradeimport_validate::{RowValidator, SYSTEM_FIELD};

fn mapping(pairs: &[(&str, &str)]) -> ColumnMapping {
    let mut mapping = ColumnMapping::new();
    for (header, target) in pairs {
        mapping.insert(*header, *target).expect("unique target");
    }
    mapping
}

fn row(cells: &[(&str, CellValue)]) -> SourceRow {
    cells
        .iter()
        .map(|(header, value)| ((*header).to_string(), value.clone()))
        .collect()
}

fn validator(config: ValidationConfig) -> RowValidator {
    RowValidator::new(SchemaRegistry::standard(), config)
        .expect("valid config")
        .with_stamp("4321")
}

fn roster_mapping() -> ColumnMapping {
    mapping(&[
        ("姓名", "name"),
        ("学号", "student_id"),
        ("班级", "class_name"),
        ("成绩", "score"),
    ])
}

fn full_row(score: CellValue) -> SourceRow {
    row(&[
        ("姓名", "张三".into()),
        ("学号", "2024001".into()),
        ("班级", "高一1班".into()),
        ("成绩", score),
    ])
}

#[test]
fn non_numeric_score_is_an_error() {
    let report = validator(ValidationConfig::default())
        .validate(&[full_row("abc".into())], &roster_mapping());

    assert_eq!(report.issues.len(), 1);
    let issue = &report.issues[0];
    assert_eq!(issue.field, "score");
    assert_eq!(issue.severity, Severity::Error);
    assert_eq!(issue.row_index, 1);
    assert_eq!(report.summary.error_rows, 1);
    assert_eq!(report.summary.valid_rows, 0);
    assert!(report.importable_records().is_empty());
}

#[test]
fn blank_student_id_is_generated() {
    let rows = vec![row(&[
        ("姓名", "张三".into()),
        ("学号", CellValue::Empty),
        ("班级", "高一1班".into()),
        ("成绩", 90.0.into()),
    ])];
    let report = validator(ValidationConfig::default()).validate(&rows, &roster_mapping());

    assert_eq!(report.error_count(), 0);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.summary.warning_rows, 1);
    let record = &report.records[0];
    assert_eq!(record.status, RowStatus::Warning);
    assert_eq!(record.text("student_id").as_deref(), Some("temp_1_4321"));
}

#[test]
fn unmapped_student_id_is_generated_too() {
    let rows = vec![row(&[("姓名", "张三".into())])];
    let report = validator(ValidationConfig::default()).validate(&rows, &mapping(&[("姓名", "name")]));
    assert_eq!(
        report.records[0].text("student_id").as_deref(),
        Some("temp_1_4321")
    );
}

#[test]
fn composite_id_without_auto_generation() {
    let rows = vec![row(&[
        ("姓名", "张三".into()),
        ("班级", "高一1班".into()),
    ])];
    let config = ValidationConfig::default().with_auto_generate_student_id(false);
    let report = validator(config).validate(&rows, &mapping(&[("姓名", "name"), ("班级", "class_name")]));
    assert_eq!(
        report.records[0].text("student_id").as_deref(),
        Some("高一1班_张三_1")
    );
    assert_eq!(report.summary.warning_rows, 1);
}

#[test]
fn missing_name_is_always_an_error() {
    let rows = vec![row(&[("姓名", "  ".into()), ("学号", "2024001".into())])];
    let report = validator(ValidationConfig::lenient())
        .validate(&rows, &mapping(&[("姓名", "name"), ("学号", "student_id")]));
    assert_eq!(report.summary.error_rows, 1);
    assert_eq!(report.issues[0].field, "name");
}

#[test]
fn score_bounds_and_negative_ranks() {
    let mapping = mapping(&[("姓名", "name"), ("数学", "math_score"), ("排名", "rank_in_class")]);
    let rows = vec![
        row(&[("姓名", "张三".into()), ("数学", 250.0.into()), ("排名", 3.0.into())]),
        row(&[("姓名", "李四".into()), ("数学", 90.0.into()), ("排名", (-1.0).into())]),
        row(&[("姓名", "王五".into()), ("数学", 120.0.into()), ("排名", 12.0.into())]),
    ];
    let report = validator(ValidationConfig::default()).validate(&rows, &mapping);

    let statuses: Vec<RowStatus> = report.records.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![RowStatus::Warning, RowStatus::Error, RowStatus::Warning]
    );
    let math_warnings = report
        .issues
        .iter()
        .filter(|i| i.field == "math_score")
        .count();
    assert_eq!(math_warnings, 1);
}

#[test]
fn grade_letters_get_suggestions() {
    let mapping = mapping(&[("姓名", "name"), ("学号", "student_id"), ("等级", "original_grade")]);
    let rows = vec![
        row(&[("姓名", "张三".into()), ("学号", "001".into()), ("等级", "Ａ＋".into())]),
        row(&[("姓名", "李四".into()), ("学号", "002".into()), ("等级", "b".into())]),
        row(&[("姓名", "王五".into()), ("学号", "003".into()), ("等级", "优".into())]),
    ];
    let report = validator(ValidationConfig::default()).validate(&rows, &mapping);

    assert_eq!(report.summary.valid_rows, 1);
    assert_eq!(report.summary.warning_rows, 2);
    let suggestions: Vec<&str> = report
        .issues
        .iter()
        .filter_map(|i| i.suggestion.as_deref())
        .collect();
    assert_eq!(suggestions[0], "use \"A+\"");
    assert!(suggestions[1].starts_with("allowed grades: A+"));
}

#[test]
fn strict_preset_enforces_identity_and_shape() {
    let rows = vec![row(&[
        ("姓名", "张三".into()),
        ("学号", "7".into()),
        ("班级", "Alpha".into()),
        ("成绩", 90.0.into()),
    ])];
    let report = validator(ValidationConfig::strict()).validate(&rows, &roster_mapping());

    assert_eq!(report.summary.warning_rows, 1);
    let fields: Vec<&str> = report.issues.iter().map(|i| i.field.as_str()).collect();
    assert_eq!(fields, vec!["student_id", "class_name"]);
}

#[test]
fn strict_preset_requires_scores_and_ids() {
    let rows = vec![row(&[("姓名", "张三".into()), ("班级", "1班".into())])];
    let report = validator(ValidationConfig::strict()).validate(&rows, &roster_mapping());

    let errors: Vec<&str> = report
        .issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .map(|i| i.field.as_str())
        .collect();
    assert_eq!(errors, vec!["student_id", "score"]);
    assert_eq!(report.records[0].text("student_id"), None);
    // error rows stay importable when the preset does not skip them
    assert_eq!(report.importable_records().len(), 1);
}

#[test]
fn custom_score_columns_get_numeric_checks() {
    let mapping = mapping(&[("姓名", "name"), ("学号", "student_id"), ("Music", "custom_music")]);
    let rows = vec![
        row(&[("姓名", "张三".into()), ("学号", "2024001".into()), ("Music", "abc".into())]),
        row(&[("姓名", "李四".into()), ("学号", "2024002".into()), ("Music", (-5.0).into())]),
        row(&[("姓名", "王五".into()), ("学号", "2024003".into()), ("Music", 42.0.into())]),
    ];
    let kinds = BTreeMap::from([("custom_music".to_string(), FieldKind::Score)]);
    let report = validator(ValidationConfig::default())
        .with_custom_kinds(kinds)
        .validate(&rows, &mapping);

    assert_eq!(report.summary.error_rows, 2);
    assert_eq!(report.summary.valid_rows, 1);
    assert!(report.issues.iter().all(|i| i.field == "custom_music"));

    // Without a recorded kind the column is free text.
    let report = validator(ValidationConfig::default()).validate(&rows, &mapping);
    assert_eq!(report.summary.error_rows, 0);
}

#[test]
fn custom_score_columns_satisfy_required_scores() {
    let mapping = mapping(&[("姓名", "name"), ("Music", "custom_music")]);
    let rows = vec![row(&[("姓名", "张三".into()), ("Music", 42.0.into())])];
    let config = ValidationConfig {
        require_scores: true,
        ..ValidationConfig::default()
    };

    let report = validator(config.clone()).validate(&rows, &mapping);
    assert!(report.issues.iter().any(|i| i.field == "score"));

    let kinds = BTreeMap::from([("custom_music".to_string(), FieldKind::Score)]);
    let report = validator(config)
        .with_custom_kinds(kinds)
        .validate(&rows, &mapping);
    assert!(report.issues.iter().all(|i| i.field != "score"));
}

#[test]
fn halts_after_max_errors() {
    let rows: Vec<SourceRow> = (0..10).map(|_| full_row("x".into())).collect();
    let config = ValidationConfig::default().with_max_errors(3);
    let report = validator(config).validate(&rows, &roster_mapping());

    assert!(report.halted);
    assert_eq!(report.summary.total_rows, 3);
    assert_eq!(report.summary.unvalidated_rows, 7);
    let last = report.issues.last().expect("system notice");
    assert_eq!(last.field, SYSTEM_FIELD);
    assert_eq!(last.severity, Severity::Warning);
}

#[test]
fn strict_mode_halts_at_first_error_row() {
    let rows = vec![
        full_row(80.0.into()),
        full_row("bad".into()),
        full_row(70.0.into()),
    ];
    let config = ValidationConfig::default().with_strict_mode(true);
    let report = validator(config).validate(&rows, &roster_mapping());

    assert!(report.halted);
    assert_eq!(report.summary.total_rows, 2);
    assert_eq!(report.summary.valid_rows, 1);
    assert_eq!(report.summary.error_rows, 1);
    assert_eq!(report.summary.unvalidated_rows, 1);
}

#[test]
fn zero_max_errors_means_unlimited() {
    let rows: Vec<SourceRow> = (0..150).map(|_| full_row("x".into())).collect();
    let config = ValidationConfig::default().with_max_errors(0);
    let report = validator(config).validate(&rows, &roster_mapping());
    assert!(!report.halted);
    assert_eq!(report.summary.error_rows, 150);
}

#[test]
fn invalid_config_is_rejected() {
    let config = ValidationConfig::default().with_score_upper_bound(-1.0);
    let err = RowValidator::new(SchemaRegistry::standard(), config).unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfig { .. }));
}
