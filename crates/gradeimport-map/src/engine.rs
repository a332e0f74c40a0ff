//! Resolution engine: runs the fallback ladder and shapes its result.

use gradeimport_model::{
    EngineError, ExternalSuggestion, FollowUpAction, FollowUpKind, Importance, MissingFieldInfo,
    ResolutionResult, Result, SourceRow, StrategyTag, UploadedSheet,
};
use gradeimport_standards::SchemaRegistry;

use crate::analyzer::analyze;
use crate::matcher::DEFAULT_MATCH_THRESHOLD;
use crate::strategies::{Candidate, LADDER, LadderInput};

/// Default value offered for the class of a forced import.
pub const UNASSIGNED_CLASS: &str = "Unassigned class";

const FORCED_DEFERRED_FIELDS: [&str; 2] = ["student_id", "class_name"];
const MANY_MISSING_FIELDS: usize = 3;

/// Acceptance thresholds of the ladder rungs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderThresholds {
    /// Minimum confidence of an external suggestion (default: 0.7).
    pub external_min: f64,
    /// Minimum weighted pattern coverage (default: 0.6).
    pub pattern_min: f64,
    /// Minimum guess-weighted coverage (default: 0.4).
    pub guess_min: f64,
    /// Per-field matcher threshold for the pattern pass (default: 0.5).
    pub match_threshold: f64,
    /// Matcher threshold when hunting for the primary field alone (default: 0.1).
    pub minimal_threshold: f64,
    /// Reported confidence of a minimal mapping (default: 0.3).
    pub minimal_confidence: f64,
    /// Reported confidence of a forced mapping (default: 0.2).
    pub forced_confidence: f64,
    /// Results below this confidence carry a review warning (default: 0.6).
    pub low_confidence_warning: f64,
}

impl Default for LadderThresholds {
    fn default() -> Self {
        Self {
            external_min: 0.7,
            pattern_min: 0.6,
            guess_min: 0.4,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            minimal_threshold: 0.1,
            minimal_confidence: 0.3,
            forced_confidence: 0.2,
            low_confidence_warning: 0.6,
        }
    }
}

/// Maps upload headers onto the schema, degrading gracefully.
///
/// Constructed explicitly and shared by reference; holds no per-upload
/// state, so one engine can resolve any number of uploads.
///
/// # Example
///
/// ```
/// use gradeimport_map::ResolutionEngine;
/// use gradeimport_model::{CellValue, SourceRow};
///
/// let engine = ResolutionEngine::default();
/// let headers = vec!["姓名".to_string(), "学号".to_string(), "班级".to_string()];
/// let row: SourceRow = [("姓名".to_string(), CellValue::from("张三"))].into();
/// let result = engine.resolve(&headers, &[row], None).unwrap();
/// assert!(result.can_proceed);
/// assert_eq!(result.mapping.get("姓名"), Some("name"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResolutionEngine {
    registry: SchemaRegistry,
    thresholds: LadderThresholds,
}

impl ResolutionEngine {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            thresholds: LadderThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: LadderThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn thresholds(&self) -> &LadderThresholds {
        &self.thresholds
    }

    /// Resolve a parsed sheet.
    pub fn resolve_sheet(
        &self,
        sheet: &UploadedSheet,
        external: Option<&ExternalSuggestion>,
    ) -> Result<ResolutionResult> {
        self.resolve(&sheet.headers, &sheet.rows, external)
    }

    /// Run the ladder over `headers` and `rows`.
    ///
    /// Fails only on an empty upload. Any non-empty upload resolves, in
    /// the worst case to a forced mapping of the first header.
    pub fn resolve(
        &self,
        headers: &[String],
        rows: &[SourceRow],
        external: Option<&ExternalSuggestion>,
    ) -> Result<ResolutionResult> {
        if headers.is_empty() {
            return Err(EngineError::NoHeaders);
        }
        if rows.is_empty() {
            return Err(EngineError::NoDataRows);
        }

        let _span = tracing::info_span!(
            "resolve",
            headers = headers.len(),
            rows = rows.len(),
            external = external.is_some()
        )
        .entered();

        let input = LadderInput::new(&self.registry, &self.thresholds, headers, rows, external);
        for (tag, strategy) in LADDER {
            match strategy(&input) {
                Some(candidate) => {
                    tracing::info!(
                        strategy = %tag,
                        confidence = candidate.confidence,
                        mapped = candidate.mapping.len(),
                        "mapping resolved"
                    );
                    return Ok(self.finish(candidate, headers));
                }
                None => tracing::debug!(strategy = %tag, "strategy declined"),
            }
        }

        // The last rung accepts any non-empty header list.
        Err(EngineError::NoHeaders)
    }

    fn finish(&self, candidate: Candidate, headers: &[String]) -> ResolutionResult {
        let Candidate {
            strategy,
            confidence,
            mapping,
            custom_kinds,
            mut warnings,
        } = candidate;

        let analysis = analyze(&self.registry, &mapping, headers);
        let mut missing_fields = analysis.missing_fields;
        let mut follow_ups = analysis.follow_ups;

        let forced = strategy == StrategyTag::ForceSuccess;
        if forced {
            self.defer_forced_fields(&mut missing_fields, &mut follow_ups, headers);
            warnings.push("Forced import: data may be incomplete".to_string());
        }
        if confidence < self.thresholds.low_confidence_warning {
            warnings.push(format!(
                "Low mapping confidence ({:.0}%): review the column mapping before importing",
                confidence * 100.0
            ));
        }
        for info in missing_fields
            .iter()
            .filter(|info| info.importance == Importance::Critical)
        {
            warnings.push(format!(
                "Missing critical field {} ({})",
                info.display_name, info.field
            ));
        }
        if missing_fields.len() > MANY_MISSING_FIELDS {
            warnings.push(format!(
                "{} fields are missing; consider completing them after import",
                missing_fields.len()
            ));
        }

        ResolutionResult {
            strategy,
            confidence,
            custom_fields: mapping.custom_targets(),
            custom_kinds,
            mapping,
            missing_fields,
            warnings,
            can_proceed: true,
            follow_ups,
        }
    }

    /// A forced mapping leaves id and class to be filled in later.
    fn defer_forced_fields(
        &self,
        missing_fields: &mut Vec<MissingFieldInfo>,
        follow_ups: &mut Vec<FollowUpAction>,
        headers: &[String],
    ) {
        let fallback_headers: Vec<String> = headers.iter().skip(1).take(2).cloned().collect();
        for key in FORCED_DEFERRED_FIELDS {
            let Some(field) = self.registry.get(key) else {
                continue;
            };
            let position = match missing_fields.iter().position(|info| info.field == key) {
                Some(position) => position,
                None => {
                    missing_fields.push(MissingFieldInfo {
                        field: field.key.clone(),
                        display_name: field.display_name.clone(),
                        importance: field.importance,
                        suggested_source_headers: Vec::new(),
                        deferrable: true,
                        default_value: None,
                    });
                    missing_fields.len() - 1
                }
            };
            let info = &mut missing_fields[position];
            info.deferrable = true;
            info.suggested_source_headers = fallback_headers.clone();
            if key == "class_name" {
                info.default_value = Some(UNASSIGNED_CLASS.to_string());
                follow_ups.push(FollowUpAction {
                    kind: FollowUpKind::PromptManualInput,
                    description: format!(
                        "Enter {} or keep the default \"{UNASSIGNED_CLASS}\"",
                        field.display_name
                    ),
                    target_field: field.key.clone(),
                    priority: field.importance.rank(),
                });
            }
        }
        follow_ups.sort_by_key(|action| action.priority);
    }
}
