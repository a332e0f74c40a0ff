use std::io::Write;

use gradeimport_model::{FieldKind, Importance};
use gradeimport_standards::{SchemaError, SchemaRegistry};

#[test]
fn standard_registry_order_and_tiers() {
    let registry = SchemaRegistry::standard();
    let keys: Vec<&str> = registry.fields().iter().map(|f| f.key.as_str()).collect();
    assert_eq!(&keys[..3], &["name", "student_id", "class_name"]);
    assert_eq!(registry.importance_of("name"), Importance::Critical);
    assert_eq!(registry.importance_of("class_name"), Importance::Important);
    assert_eq!(registry.importance_of("rank_in_class"), Importance::Optional);
    assert_eq!(registry.importance_of("geography_score"), Importance::NiceToHave);
    assert_eq!(registry.kind_of("rank_in_grade"), FieldKind::Rank);
    assert_eq!(registry.kind_of("original_grade"), FieldKind::Grade);
}

#[test]
fn long_format_fields_are_not_recognizable() {
    let registry = SchemaRegistry::standard();
    assert!(registry.get("score").is_some());
    assert!(registry.get("subject").is_some());
    assert!(registry.recognizable_fields().all(|f| f.key != "score" && f.key != "subject"));
    assert_eq!(registry.recognizable_weight(), 53);
}

#[test]
fn known_targets_include_custom_keys() {
    let registry = SchemaRegistry::standard();
    assert!(registry.is_known_target("math_score"));
    assert!(registry.is_known_target("custom_music"));
    assert!(!registry.is_known_target("custom_"));
    assert!(!registry.is_known_target("music_score"));
    assert_eq!(registry.custom_key("Music Score"), "custom_music_score");
}

#[test]
fn from_json_loads_override_table() {
    let registry = SchemaRegistry::from_json(
        r#"[
            {"key": "name", "display_name": "Name", "importance": "critical", "patterns": ["name"]},
            {"key": "score", "display_name": "Score", "importance": "optional", "kind": "score", "patterns": ["points"]}
        ]"#,
    )
    .expect("load override");
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.kind_of("name"), FieldKind::Text);
    assert_eq!(registry.weight_of("score"), 4);
}

#[test]
fn from_json_rejects_bad_tables() {
    assert!(matches!(SchemaRegistry::from_json("[]"), Err(SchemaError::Empty)));
    assert!(matches!(
        SchemaRegistry::from_json(
            r#"[{"key": "name", "display_name": "a", "importance": "critical"},
                {"key": "name", "display_name": "b", "importance": "optional"}]"#
        ),
        Err(SchemaError::DuplicateKey { .. })
    ));
    assert!(matches!(
        SchemaRegistry::from_json(
            r#"[{"key": "name", "display_name": "a", "importance": "optional"}]"#
        ),
        Err(SchemaError::MissingPrimary { .. })
    ));
    assert!(matches!(
        SchemaRegistry::from_json(
            r#"[{"key": "name", "display_name": "a", "importance": "critical"},
                {"key": "custom_x", "display_name": "x", "importance": "optional"}]"#
        ),
        Err(SchemaError::InvalidKey { .. })
    ));
    assert!(matches!(
        SchemaRegistry::from_json("not json"),
        Err(SchemaError::Json { .. })
    ));
}

#[test]
fn from_path_reads_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"[{{"key": "name", "display_name": "Name", "importance": "critical", "patterns": ["who"]}}]"#
    )
    .expect("write schema");
    let registry = SchemaRegistry::from_path(file.path()).expect("load schema");
    assert_eq!(registry.fields()[0].patterns, vec!["who".to_string()]);

    let missing = SchemaRegistry::from_path(std::path::Path::new("/nonexistent/schema.json"));
    assert!(matches!(missing, Err(SchemaError::Io { .. })));
}
