//! Independent per-row checks.
//!
//! Each check looks at one projected row and returns the issues it finds.
//! Only [`identifier::repair`] mutates the row.

use std::collections::BTreeMap;

use gradeimport_model::FieldKind;
use gradeimport_standards::SchemaRegistry;

pub mod class_name;
pub mod grade;
pub mod identifier;
pub mod numeric;
pub mod required;

pub(crate) const NAME: &str = "name";
pub(crate) const STUDENT_ID: &str = "student_id";
pub(crate) const CLASS_NAME: &str = "class_name";

/// Issue field used for "no score at all".
pub(crate) const SCORE: &str = "score";

/// Field kinds as the checks see them: the schema, plus the kinds a
/// resolution assigned to its custom targets.
#[derive(Debug, Clone, Copy)]
pub struct FieldKinds<'a> {
    registry: &'a SchemaRegistry,
    custom: &'a BTreeMap<String, FieldKind>,
}

impl<'a> FieldKinds<'a> {
    pub fn new(registry: &'a SchemaRegistry, custom: &'a BTreeMap<String, FieldKind>) -> Self {
        Self { registry, custom }
    }

    pub fn kind_of(&self, key: &str) -> FieldKind {
        self.custom
            .get(key)
            .copied()
            .unwrap_or_else(|| self.registry.kind_of(key))
    }

    pub fn display_name(&self, key: &str) -> String {
        self.registry.display_name(key)
    }
}
