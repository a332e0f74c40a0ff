#![deny(unsafe_code)]

use std::collections::BTreeMap;
use std::path::Path;

use gradeimport_model::{CUSTOM_PREFIX, FieldKind, Importance, SchemaField, is_custom_key};

use crate::defaults::default_fields;
use crate::error::SchemaError;

/// Key of the field every upload must resolve.
pub const PRIMARY_FIELD: &str = "name";

/// Immutable table of target fields, kept in registry order.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    fields: Vec<SchemaField>,
    index: BTreeMap<String, usize>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl SchemaRegistry {
    /// Registry over the built-in field table.
    pub fn standard() -> Self {
        let fields = default_fields();
        let index = build_index(&fields);
        Self { fields, index }
    }

    /// Registry over a caller-supplied table.
    pub fn new(fields: Vec<SchemaField>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut index = BTreeMap::new();
        for (position, field) in fields.iter().enumerate() {
            validate_key(&field.key)?;
            if index.insert(field.key.clone(), position).is_some() {
                return Err(SchemaError::DuplicateKey {
                    key: field.key.clone(),
                });
            }
        }
        let primary_ok = index
            .get(PRIMARY_FIELD)
            .is_some_and(|&pos| fields[pos].importance == Importance::Critical);
        if !primary_ok {
            return Err(SchemaError::MissingPrimary {
                key: PRIMARY_FIELD.to_string(),
            });
        }
        Ok(Self { fields, index })
    }

    /// Load an override table: a JSON array of field objects.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let fields: Vec<SchemaField> =
            serde_json::from_str(json).map_err(|source| SchemaError::Json { source })?;
        Self::new(fields)
    }

    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
        Self::from_json(&json)
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&SchemaField> {
        self.index.get(key).map(|&pos| &self.fields[pos])
    }

    /// Importance of a target key; custom and unknown keys are nice-to-have.
    pub fn importance_of(&self, key: &str) -> Importance {
        self.get(key)
            .map_or(Importance::NiceToHave, |field| field.importance)
    }

    pub fn weight_of(&self, key: &str) -> u32 {
        self.importance_of(key).weight()
    }

    /// Kind of a target key; custom and unknown keys are plain text.
    pub fn kind_of(&self, key: &str) -> FieldKind {
        self.get(key).map_or(FieldKind::Text, |field| field.kind)
    }

    /// Display label of a target key.
    ///
    /// Custom keys show their label part; unknown keys show themselves.
    pub fn display_name(&self, key: &str) -> String {
        if let Some(field) = self.get(key) {
            return field.display_name.clone();
        }
        key.strip_prefix(CUSTOM_PREFIX)
            .filter(|_| is_custom_key(key))
            .unwrap_or(key)
            .to_string()
    }

    /// Schema key or synthesized `custom_*` key.
    pub fn is_known_target(&self, key: &str) -> bool {
        self.index.contains_key(key) || is_custom_key(key)
    }

    /// Fields that can be found by pattern matching, in registry order.
    pub fn recognizable_fields(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.iter().filter(|field| field.is_recognizable())
    }

    /// Sum of the weights of all recognizable fields.
    pub fn recognizable_weight(&self) -> u32 {
        self.recognizable_fields().map(SchemaField::weight).sum()
    }

    pub fn fields_of_kind(&self, kind: FieldKind) -> impl Iterator<Item = &SchemaField> {
        self.fields.iter().filter(move |field| field.kind == kind)
    }

    /// Synthesize the custom key for a label.
    pub fn custom_key(&self, label: &str) -> String {
        gradeimport_model::custom_key(label)
    }

    pub fn primary_field(&self) -> &str {
        PRIMARY_FIELD
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn build_index(fields: &[SchemaField]) -> BTreeMap<String, usize> {
    fields
        .iter()
        .enumerate()
        .map(|(pos, field)| (field.key.clone(), pos))
        .collect()
}

fn validate_key(key: &str) -> Result<(), SchemaError> {
    let invalid = |message: &str| SchemaError::InvalidKey {
        key: key.to_string(),
        message: message.to_string(),
    };
    if key.trim().is_empty() {
        return Err(invalid("empty key"));
    }
    if key.starts_with(CUSTOM_PREFIX) {
        return Err(invalid("the custom_ prefix is reserved"));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(invalid("keys cannot contain whitespace"));
    }
    Ok(())
}
