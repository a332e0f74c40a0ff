//! Missing-field advisory for an accepted mapping.

use gradeimport_model::{
    ColumnMapping, FieldKind, FollowUpAction, FollowUpKind, Importance, MissingFieldInfo,
};
use gradeimport_standards::SchemaRegistry;

use crate::utils::resembles;

/// Headers suggested per missing field.
pub const MAX_SUGGESTED_HEADERS: usize = 3;

const TOTAL_SCORE: &str = "total_score";

/// Missing fields and follow-ups derived from a mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingFieldAnalysis {
    pub missing_fields: Vec<MissingFieldInfo>,
    pub follow_ups: Vec<FollowUpAction>,
}

/// Diff the mapping against the registry.
///
/// Nice-to-have fields are never reported. Suggestions come only from
/// headers the mapping leaves unused.
pub fn analyze(
    registry: &SchemaRegistry,
    mapping: &ColumnMapping,
    headers: &[String],
) -> MissingFieldAnalysis {
    let unmapped: Vec<&String> = headers
        .iter()
        .filter(|header| !mapping.contains_header(header))
        .collect();

    let mut analysis = MissingFieldAnalysis::default();
    for field in registry.fields() {
        if mapping.contains_target(&field.key) || !field.importance.is_reportable() {
            continue;
        }
        let suggested_source_headers = unmapped
            .iter()
            .filter(|header| {
                field
                    .patterns
                    .iter()
                    .any(|pattern| resembles(header, pattern))
            })
            .take(MAX_SUGGESTED_HEADERS)
            .map(|header| (*header).clone())
            .collect();

        if matches!(field.importance, Importance::Critical | Importance::Important) {
            analysis.follow_ups.push(FollowUpAction {
                kind: FollowUpKind::SuggestFieldMapping,
                description: format!("Map a column to {} ({})", field.display_name, field.key),
                target_field: field.key.clone(),
                priority: field.importance.rank(),
            });
        }

        if field.key == TOTAL_SCORE && has_subject_scores(registry, mapping) {
            analysis.follow_ups.push(FollowUpAction {
                kind: FollowUpKind::CalculateDerived,
                description: format!(
                    "Compute {} from the mapped subject scores",
                    field.display_name
                ),
                target_field: field.key.clone(),
                priority: Importance::Optional.rank(),
            });
        }

        analysis.missing_fields.push(MissingFieldInfo {
            field: field.key.clone(),
            display_name: field.display_name.clone(),
            importance: field.importance,
            suggested_source_headers,
            deferrable: field.importance != Importance::Critical,
            default_value: None,
        });
    }

    analysis.follow_ups.sort_by_key(|action| action.priority);
    analysis
}

fn has_subject_scores(registry: &SchemaRegistry, mapping: &ColumnMapping) -> bool {
    registry
        .fields_of_kind(FieldKind::Score)
        .filter(|field| field.key != TOTAL_SCORE && field.is_recognizable())
        .any(|field| mapping.contains_target(&field.key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn nice_to_have_fields_are_not_reported() {
        let registry = SchemaRegistry::standard();
        let mut mapping = ColumnMapping::new();
        mapping.insert("姓名", "name").unwrap();
        let analysis = analyze(&registry, &mapping, &headers(&["姓名"]));
        let keys: Vec<&str> = analysis
            .missing_fields
            .iter()
            .map(|info| info.field.as_str())
            .collect();
        assert_eq!(
            keys,
            vec![
                "student_id",
                "class_name",
                "total_score",
                "chinese_score",
                "math_score",
                "english_score",
                "rank_in_class"
            ]
        );
        assert!(analysis.missing_fields.iter().all(|info| info.deferrable));
    }

    #[test]
    fn suggestions_come_from_unmapped_headers() {
        let registry = SchemaRegistry::standard();
        let mapping = ColumnMapping::new();
        let analysis = analyze(
            &registry,
            &mapping,
            &headers(&["班级名", "Class Code", "班别", "所在班", "其他"]),
        );
        let class = analysis
            .missing_fields
            .iter()
            .find(|info| info.field == "class_name")
            .unwrap();
        assert_eq!(
            class.suggested_source_headers,
            headers(&["班级名", "Class Code", "班别"])
        );
        let name = &analysis.missing_fields[0];
        assert_eq!(name.field, "name");
        assert!(!name.deferrable);
    }

    #[test]
    fn follow_ups_sorted_by_priority() {
        let registry = SchemaRegistry::standard();
        let mut mapping = ColumnMapping::new();
        mapping.insert("数学", "math_score").unwrap();
        let analysis = analyze(&registry, &mapping, &headers(&["数学"]));
        let summary: Vec<(&str, u8)> = analysis
            .follow_ups
            .iter()
            .map(|action| (action.target_field.as_str(), action.priority))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("name", 1),
                ("student_id", 2),
                ("class_name", 2),
                ("total_score", 3)
            ]
        );
        assert_eq!(analysis.follow_ups[3].kind, FollowUpKind::CalculateDerived);
    }
}
