//! Column mapping types.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::MappingError;
use crate::value::{CellValue, SourceRow};

/// Prefix of synthesized target keys for columns outside the schema.
pub const CUSTOM_PREFIX: &str = "custom_";

/// True when `key` is a synthesized custom target.
pub fn is_custom_key(key: &str) -> bool {
    key.starts_with(CUSTOM_PREFIX) && key.len() > CUSTOM_PREFIX.len()
}

/// Build a `custom_<slug>` key from a free-form label.
///
/// Letters and digits are kept (including CJK), everything else collapses
/// into single underscores.
pub fn custom_key(label: &str) -> String {
    let mut slug = String::new();
    let mut pending_sep = false;
    for ch in label.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("field");
    }
    format!("{CUSTOM_PREFIX}{slug}")
}

/// Upload header to target key assignment.
///
/// Stored ordered by header. [`ColumnMapping::insert`] keeps targets
/// unique; mappings deserialized from untrusted input can still carry
/// duplicates, see [`ColumnMapping::duplicate_targets`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    entries: BTreeMap<String, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `header` to `target`.
    ///
    /// Re-mapping a header replaces its previous target. A target already
    /// claimed by a different header is rejected.
    pub fn insert(
        &mut self,
        header: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<(), MappingError> {
        let header = header.into();
        let target = target.into();
        if let Some(owner) = self.header_for(&target)
            && owner != header
        {
            return Err(MappingError::TargetAlreadyMapped {
                target,
                header: owner.to_string(),
            });
        }
        self.entries.insert(header, target);
        Ok(())
    }

    pub fn remove(&mut self, header: &str) -> Option<String> {
        self.entries.remove(header)
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.entries.get(header).map(String::as_str)
    }

    /// Header currently mapped to `target`.
    pub fn header_for(&self, target: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, mapped)| mapped.as_str() == target)
            .map(|(header, _)| header.as_str())
    }

    pub fn contains_header(&self, header: &str) -> bool {
        self.entries.contains_key(header)
    }

    pub fn contains_target(&self, target: &str) -> bool {
        self.entries.values().any(|mapped| mapped == target)
    }

    pub fn targets(&self) -> BTreeSet<&str> {
        self.entries.values().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(header, target)| (header.as_str(), target.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Target keys claimed by more than one header.
    pub fn duplicate_targets(&self) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for target in self.entries.values() {
            *counts.entry(target.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(target, _)| target.to_string())
            .collect()
    }

    /// `(custom key, source header)` pairs.
    pub fn custom_targets(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .filter(|(_, target)| is_custom_key(target))
            .map(|(header, target)| (target.clone(), header.clone()))
            .collect()
    }

    /// Project a source row onto target keys. Absent cells become empty.
    pub fn project(&self, row: &SourceRow) -> BTreeMap<String, CellValue> {
        self.entries
            .iter()
            .map(|(header, target)| {
                let value = row.get(header).cloned().unwrap_or_default();
                (target.clone(), value)
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a ColumnMapping {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Mapping suggested by an external text-analysis service.
///
/// Both parts are optional; the engine treats a missing confidence as 0.5.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalSuggestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_mappings: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ExternalSuggestion {
    pub fn new(field_mappings: BTreeMap<String, String>, confidence: f64) -> Self {
        Self {
            field_mappings: Some(field_mappings),
            confidence: Some(confidence),
        }
    }
}
