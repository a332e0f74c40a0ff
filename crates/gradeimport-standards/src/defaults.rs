//! Built-in target field table.

use gradeimport_model::{FieldKind, Importance, SchemaField};

/// `(key, display name, importance, kind, recognition patterns)`.
type FieldRow = (
    &'static str,
    &'static str,
    Importance,
    FieldKind,
    &'static [&'static str],
);

const DEFAULT_FIELDS: &[FieldRow] = &[
    (
        "name",
        "学生姓名",
        Importance::Critical,
        FieldKind::Text,
        &["姓名", "学生姓名", "考生姓名", "name", "学生", "考生"],
    ),
    (
        "student_id",
        "学号",
        Importance::Important,
        FieldKind::Identifier,
        &["学号", "考生号", "学生号", "id", "student_id", "编号", "考号"],
    ),
    (
        "class_name",
        "班级",
        Importance::Important,
        FieldKind::Text,
        &["班级", "所在班级", "现班", "class", "班", "年班"],
    ),
    (
        "total_score",
        "总分",
        Importance::Optional,
        FieldKind::Score,
        &["总分", "总成绩", "合计", "total", "总计", "总得分"],
    ),
    (
        "chinese_score",
        "语文成绩",
        Importance::Optional,
        FieldKind::Score,
        &["语文", "chinese", "语", "语文成绩"],
    ),
    (
        "math_score",
        "数学成绩",
        Importance::Optional,
        FieldKind::Score,
        &["数学", "math", "数", "数学成绩"],
    ),
    (
        "english_score",
        "英语成绩",
        Importance::Optional,
        FieldKind::Score,
        &["英语", "english", "英", "英语成绩"],
    ),
    (
        "rank_in_class",
        "班级排名",
        Importance::Optional,
        FieldKind::Rank,
        &["班级排名", "班排名", "班内排名", "排名", "rank"],
    ),
    (
        "physics_score",
        "物理成绩",
        Importance::NiceToHave,
        FieldKind::Score,
        &["物理", "physics", "理", "物理成绩"],
    ),
    (
        "chemistry_score",
        "化学成绩",
        Importance::NiceToHave,
        FieldKind::Score,
        &["化学", "chemistry", "化", "化学成绩"],
    ),
    (
        "biology_score",
        "生物成绩",
        Importance::NiceToHave,
        FieldKind::Score,
        &["生物", "biology", "生", "生物成绩"],
    ),
    (
        "politics_score",
        "政治成绩",
        Importance::NiceToHave,
        FieldKind::Score,
        &["政治", "politics", "政", "道法", "政治成绩"],
    ),
    (
        "history_score",
        "历史成绩",
        Importance::NiceToHave,
        FieldKind::Score,
        &["历史", "history", "史", "历史成绩"],
    ),
    (
        "geography_score",
        "地理成绩",
        Importance::NiceToHave,
        FieldKind::Score,
        &["地理", "geography", "地", "地理成绩"],
    ),
    (
        "rank_in_grade",
        "年级排名",
        Importance::NiceToHave,
        FieldKind::Rank,
        &["年级排名", "年排名", "级排名", "全年级排名"],
    ),
    (
        "rank_in_school",
        "学校排名",
        Importance::NiceToHave,
        FieldKind::Rank,
        &["学校排名", "校排名", "全校排名"],
    ),
    (
        "original_grade",
        "成绩等级",
        Importance::NiceToHave,
        FieldKind::Grade,
        &["等级", "评级", "成绩等级", "grade", "级别"],
    ),
    // Long-format targets; only reachable through an explicit mapping.
    ("subject", "科目", Importance::NiceToHave, FieldKind::Text, &[]),
    ("score", "成绩", Importance::NiceToHave, FieldKind::Score, &[]),
];

/// The built-in field table in registry order.
pub fn default_fields() -> Vec<SchemaField> {
    DEFAULT_FIELDS
        .iter()
        .map(|(key, display, importance, kind, patterns)| {
            SchemaField::new(*key, *display, *importance, *kind, patterns)
        })
        .collect()
}
