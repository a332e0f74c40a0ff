use gradeimport_model::{
    CellValue, ColumnMapping, RowStatus, Severity, SourceRow, ValidationConfig,
};
use gradeimport_standards::SchemaRegistry;
use gradeimport_validate::RowValidator;
use proptest::prelude::*;

const HEADERS: [(&str, &str); 6] = [
    ("姓名", "name"),
    ("学号", "student_id"),
    ("班级", "class_name"),
    ("数学", "math_score"),
    ("排名", "rank_in_class"),
    ("等级", "original_grade"),
];

fn cell() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Empty),
        "[a-zA-Z0-9+班 -]{0,8}".prop_map(CellValue::Text),
        (-50i32..400).prop_map(|n| CellValue::Number(f64::from(n))),
    ]
}

fn rows() -> impl Strategy<Value = Vec<SourceRow>> {
    prop::collection::vec(prop::collection::vec(cell(), HEADERS.len()), 0..40).prop_map(|grid| {
        grid.into_iter()
            .map(|cells| {
                HEADERS
                    .iter()
                    .map(|(header, _)| (*header).to_string())
                    .zip(cells)
                    .collect()
            })
            .collect()
    })
}

fn config() -> impl Strategy<Value = ValidationConfig> {
    prop_oneof![
        Just(ValidationConfig::default()),
        Just(ValidationConfig::lenient()),
        Just(ValidationConfig::strict()),
        (0usize..5).prop_map(|max| ValidationConfig::default().with_max_errors(max)),
    ]
}

fn mapping() -> ColumnMapping {
    let mut mapping = ColumnMapping::new();
    for (header, target) in HEADERS {
        mapping.insert(header, target).expect("unique target");
    }
    mapping
}

proptest! {
    #[test]
    fn validated_rows_partition(rows in rows(), config in config()) {
        let validator = RowValidator::new(SchemaRegistry::standard(), config).expect("config");
        let report = validator.validate(&rows, &mapping());
        let summary = report.summary;

        prop_assert_eq!(
            summary.valid_rows + summary.error_rows + summary.warning_rows,
            summary.total_rows
        );
        prop_assert_eq!(summary.total_rows + summary.unvalidated_rows, rows.len());
        prop_assert_eq!(report.records.len(), summary.total_rows);

        for record in &report.records {
            let has_error = report
                .issues_for_row(record.row_index)
                .any(|issue| issue.severity == Severity::Error);
            prop_assert_eq!(record.status == RowStatus::Error, has_error);
        }
    }
}
