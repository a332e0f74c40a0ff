//! The five rungs of the fallback ladder.
//!
//! Each strategy inspects the upload and either proposes a mapping or
//! declines. The engine tries them in [`LADDER`] order and keeps the first
//! proposal.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

use gradeimport_model::{
    ColumnMapping, ExternalSuggestion, FieldKind, Importance, SchemaField, SourceRow, StrategyTag,
    is_custom_key,
};
use gradeimport_standards::SchemaRegistry;

use crate::classifier::{classify, column_samples};
use crate::engine::LadderThresholds;
use crate::matcher::{best_match, match_header};

/// Confidence assumed for an external suggestion that carries none.
pub const DEFAULT_EXTERNAL_CONFIDENCE: f64 = 0.5;

/// Inputs shared by every strategy of one `resolve` call.
pub struct LadderInput<'a> {
    pub registry: &'a SchemaRegistry,
    pub thresholds: &'a LadderThresholds,
    pub headers: &'a [String],
    pub rows: &'a [SourceRow],
    pub external: Option<&'a ExternalSuggestion>,
    pattern_pass: OnceCell<PatternPass>,
}

impl<'a> LadderInput<'a> {
    pub fn new(
        registry: &'a SchemaRegistry,
        thresholds: &'a LadderThresholds,
        headers: &'a [String],
        rows: &'a [SourceRow],
        external: Option<&'a ExternalSuggestion>,
    ) -> Self {
        Self {
            registry,
            thresholds,
            headers,
            rows,
            external,
            pattern_pass: OnceCell::new(),
        }
    }

    /// Pattern assignment, computed once and shared by the
    /// pattern and guess strategies.
    fn pattern_pass(&self) -> &PatternPass {
        self.pattern_pass.get_or_init(|| PatternPass::run(self))
    }
}

/// A strategy's proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub strategy: StrategyTag,
    pub confidence: f64,
    pub mapping: ColumnMapping,
    /// Kinds of the custom targets this strategy synthesized.
    pub custom_kinds: BTreeMap<String, FieldKind>,
    pub warnings: Vec<String>,
}

impl Candidate {
    fn new(strategy: StrategyTag, confidence: f64, mapping: ColumnMapping) -> Self {
        Self {
            strategy,
            confidence,
            mapping,
            custom_kinds: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }
}

/// Strategy signature: propose or decline.
pub type StrategyFn = fn(&LadderInput<'_>) -> Option<Candidate>;

/// Ladder order. The last rung never declines.
pub const LADDER: [(StrategyTag, StrategyFn); 5] = [
    (StrategyTag::AiSuccess, external_mapping),
    (StrategyTag::PatternMatch, pattern_match),
    (StrategyTag::IntelligentGuess, intelligent_guess),
    (StrategyTag::MinimalViable, minimal_viable),
    (StrategyTag::ForceSuccess, force_success),
];

/// Result of assigning recognizable fields to headers by pattern.
#[derive(Debug, Clone, Default)]
struct PatternPass {
    mapping: ColumnMapping,
    /// Match confidence per mapped header.
    scores: BTreeMap<String, f64>,
    confidence: f64,
}

impl PatternPass {
    /// Assign headers pair by pair, strongest match first.
    ///
    /// Every (field, header) pair at or above the match threshold is
    /// scored; ties fall back to registry order, then upload order. A
    /// field or header already taken is skipped.
    fn run(input: &LadderInput<'_>) -> Self {
        let threshold = input.thresholds.match_threshold;
        let mut pairs: Vec<(f64, usize, usize)> = Vec::new();
        let fields: Vec<&SchemaField> = input.registry.recognizable_fields().collect();
        for (field_pos, field) in fields.iter().enumerate() {
            for (header_pos, header) in input.headers.iter().enumerate() {
                let confidence = match_header(header, &field.patterns);
                if confidence > 0.0 && confidence >= threshold {
                    pairs.push((confidence, field_pos, header_pos));
                }
            }
        }
        pairs.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        let mut pass = PatternPass::default();
        let mut taken_fields: BTreeSet<usize> = BTreeSet::new();
        let mut weighted = 0.0;
        for (confidence, field_pos, header_pos) in pairs {
            let field = fields[field_pos];
            let header = &input.headers[header_pos];
            if taken_fields.contains(&field_pos) || pass.mapping.contains_header(header) {
                continue;
            }
            if pass.mapping.insert(header.clone(), field.key.clone()).is_err() {
                continue;
            }
            taken_fields.insert(field_pos);
            weighted += f64::from(field.weight()) * confidence;
            pass.scores.insert(header.clone(), confidence);
        }

        let max_weight = input.registry.recognizable_weight();
        if max_weight > 0 {
            pass.confidence = weighted / f64::from(max_weight);
        }
        pass
    }
}

/// Accept a sanitized external mapping that covers a critical field with
/// enough confidence.
pub fn external_mapping(input: &LadderInput<'_>) -> Option<Candidate> {
    let external = input.external?;
    let proposed = external.field_mappings.as_ref()?;
    let confidence = external
        .confidence
        .map_or(DEFAULT_EXTERNAL_CONFIDENCE, |value| {
            if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 }
        });

    let mut mapping = ColumnMapping::new();
    let mut warnings = Vec::new();

    for (header, target) in proposed {
        if !input.headers.contains(header) {
            warnings.push(format!(
                "Ignored suggested mapping for unknown column '{header}'"
            ));
        }
    }
    // Upload order decides which header keeps a contested target.
    for header in input.headers {
        let Some(target) = proposed.get(header) else {
            continue;
        };
        if !input.registry.is_known_target(target) {
            warnings.push(format!(
                "Ignored suggested mapping '{header}' -> '{target}': unknown target field"
            ));
            continue;
        }
        if let Err(err) = mapping.insert(header.clone(), target.clone()) {
            warnings.push(format!("Ignored suggested mapping for '{header}': {err}"));
        }
    }

    let covers_critical = mapping
        .iter()
        .any(|(_, target)| input.registry.importance_of(target) == Importance::Critical);
    if !covers_critical || confidence < input.thresholds.external_min {
        tracing::debug!(
            covers_critical,
            confidence,
            "external mapping rejected"
        );
        return None;
    }

    let mut candidate = Candidate::new(StrategyTag::AiSuccess, confidence, mapping);
    candidate.warnings = warnings;
    Some(candidate)
}

/// Weighted pattern coverage over recognizable fields.
pub fn pattern_match(input: &LadderInput<'_>) -> Option<Candidate> {
    let pass = input.pattern_pass();
    if pass.confidence < input.thresholds.pattern_min {
        tracing::debug!(confidence = pass.confidence, "pattern match below threshold");
        return None;
    }
    Some(Candidate::new(
        StrategyTag::PatternMatch,
        pass.confidence,
        pass.mapping.clone(),
    ))
}

/// Pattern result topped up with content-based guesses.
pub fn intelligent_guess(input: &LadderInput<'_>) -> Option<Candidate> {
    let pass = input.pattern_pass();
    let mut mapping = pass.mapping.clone();
    let mut scores = pass.scores.clone();
    let mut custom_kinds = BTreeMap::new();

    for header in input.headers {
        if mapping.contains_header(header) {
            continue;
        }
        let samples = column_samples(input.rows, header);
        let guess = classify(header, &samples);
        let Some(target) = guess.target else {
            continue;
        };
        // Content guesses only synthesize custom targets for subject scores.
        let kind = is_custom_key(&target).then_some(FieldKind::Score);
        if mapping.insert(header.clone(), target.clone()).is_ok() {
            scores.insert(header.clone(), guess.confidence);
            if let Some(kind) = kind {
                custom_kinds.insert(target, kind);
            }
        }
    }

    let header_count = input.headers.len().max(1) as f64;
    let coverage: f64 = scores.values().sum::<f64>() / header_count;
    let critical_bonus = if mapping
        .iter()
        .any(|(_, target)| input.registry.importance_of(target) == Importance::Critical)
    {
        1.0
    } else {
        0.0
    };
    let confidence = (0.7 * coverage + 0.3 * critical_bonus).min(1.0);

    if mapping.is_empty() || confidence < input.thresholds.guess_min {
        tracing::debug!(confidence, "intelligent guess below threshold");
        return None;
    }
    let mut candidate = Candidate::new(StrategyTag::IntelligentGuess, confidence, mapping);
    candidate.custom_kinds = custom_kinds;
    Some(candidate)
}

/// Find anything that passes for the primary field.
pub fn minimal_viable(input: &LadderInput<'_>) -> Option<Candidate> {
    let primary = input.registry.get(input.registry.primary_field())?;
    let found = best_match(
        input.headers,
        &primary.patterns,
        input.thresholds.minimal_threshold,
    );
    let header = found.header?;
    let mut mapping = ColumnMapping::new();
    mapping.insert(header, primary.key.clone()).ok()?;
    Some(Candidate::new(
        StrategyTag::MinimalViable,
        input.thresholds.minimal_confidence,
        mapping,
    ))
}

/// Map the first header to the primary field, no questions asked.
pub fn force_success(input: &LadderInput<'_>) -> Option<Candidate> {
    let mut mapping = ColumnMapping::new();
    if let Some(first) = input.headers.first() {
        mapping
            .insert(first.clone(), input.registry.primary_field())
            .ok()?;
    }
    Some(Candidate::new(
        StrategyTag::ForceSuccess,
        input.thresholds.forced_confidence,
        mapping,
    ))
}
