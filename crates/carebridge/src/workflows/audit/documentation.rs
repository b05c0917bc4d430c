use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::domain::{DocumentationAnalysisResult, RejectionNature};
use crate::llm::{
    extract_structured, generate_within, prompts, string_field, GenerationOptions, Generator,
};
use crate::sanitize::clean;
use crate::workflows::grading::Level;

pub const DOCUMENTATION_KEYS: [&str; 6] = [
    "missing_documents",
    "documentation_gap_severity",
    "rejection_nature",
    "medical_ambiguity_detected",
    "explanation",
    "confidence",
];

const MAX_NEW_TOKENS: u32 = 384;
const ATTEMPTS: usize = 2;

const POLICY_CHARS: usize = 3000;
const REJECTION_CHARS: usize = 1000;
const MEDICAL_CHARS: usize = 2000;
const CONTEXT_CHARS: usize = 400;

/// Validate generator output against the documentation schema, filling absent keys
/// from the neutral default.
pub fn parse_documentation(raw: &str) -> Option<DocumentationAnalysisResult> {
    let output = extract_structured(raw, &DOCUMENTATION_KEYS)?;
    let object = &output.object;
    let defaults = DocumentationAnalysisResult::default();

    let missing_documents = match object.get("missing_documents") {
        None | Some(Value::Null) => defaults.missing_documents,
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(|doc| doc.trim().to_string()))
            .collect::<Option<Vec<_>>>()?
            .into_iter()
            .filter(|doc| !doc.is_empty())
            .collect(),
        Some(_) => return None,
    };
    let documentation_gap_severity = string_field(
        object,
        "documentation_gap_severity",
        defaults.documentation_gap_severity,
        Level::parse,
    )?;
    let rejection_nature = string_field(
        object,
        "rejection_nature",
        defaults.rejection_nature,
        RejectionNature::parse,
    )?;
    let medical_ambiguity_detected = match object.get("medical_ambiguity_detected") {
        None | Some(Value::Null) => defaults.medical_ambiguity_detected,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(raw)) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => true,
            "false" | "no" => false,
            _ => return None,
        },
        Some(_) => return None,
    };
    let explanation = string_field(object, "explanation", defaults.explanation, |raw| {
        Some(raw.trim().to_string())
    })?;
    let confidence = string_field(object, "confidence", defaults.confidence, Level::parse)?;

    debug!(strategy = ?output.strategy, "documentation analysis recovered");

    Some(DocumentationAnalysisResult {
        missing_documents,
        documentation_gap_severity,
        rejection_nature,
        medical_ambiguity_detected,
        explanation,
        confidence,
    })
}

/// Generator-backed documentation analysis with up to two attempts and a neutral
/// default.
pub async fn analyze_documentation(
    generator: &Arc<dyn Generator>,
    policy_text: &str,
    rejection_text: &str,
    medical_text: &str,
    user_context: &str,
    limit: Duration,
) -> DocumentationAnalysisResult {
    let prompt = prompts::documentation_analysis(
        &clean(policy_text, POLICY_CHARS),
        &clean(rejection_text, REJECTION_CHARS),
        &clean(medical_text, MEDICAL_CHARS),
        &clean(user_context, CONTEXT_CHARS),
    );

    for attempt in 1..=ATTEMPTS {
        let raw = generate_within(
            generator,
            prompt.clone(),
            GenerationOptions::json(MAX_NEW_TOKENS),
            limit,
        )
        .await;
        debug!(attempt, raw = %raw, "documentation analyzer output");

        if raw.trim().is_empty() {
            continue;
        }
        if let Some(result) = parse_documentation(&raw) {
            info!(attempt, nature = ?result.rejection_nature, "documentation analyzed");
            return result;
        }
        warn!(attempt, "documentation output failed validation");
    }

    warn!("documentation analysis fell back to neutral default");
    DocumentationAnalysisResult::default()
}

struct OverridePatterns {
    missing: Regex,
    incomplete_form: Regex,
    excluded: Regex,
    outside_coverage: Regex,
    ambiguity: Regex,
}

fn patterns() -> &'static OverridePatterns {
    static PATTERNS: OnceLock<OverridePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| OverridePatterns {
        missing: Regex::new(r"documents?.{0,20}not submitted|missing document|not.*provid")
            .expect("missing-document pattern is valid"),
        incomplete_form: Regex::new(
            r"incomplete.{0,20}form|form.{0,20}incomplete|unsigned|not signed",
        )
        .expect("incomplete-form pattern is valid"),
        excluded: Regex::new(r"excluded.{0,30}(condition|procedure|treatment)|not covered")
            .expect("exclusion pattern is valid"),
        outside_coverage: Regex::new(r"policy.{0,20}does not cover|outside.{0,20}coverage")
            .expect("coverage pattern is valid"),
        ambiguity: Regex::new(
            r"unclear.{0,20}(diagnosis|condition)|ambiguous.{0,20}(report|record|finding)",
        )
        .expect("ambiguity pattern is valid"),
    })
}

/// Deterministic corrections from the rejection wording. Procedural phrasing wins over
/// substantive phrasing; ambiguity is checked independently.
pub fn apply_documentation_overrides(
    result: &DocumentationAnalysisResult,
    rejection_text: &str,
) -> DocumentationAnalysisResult {
    let text = rejection_text.to_lowercase();
    let patterns = patterns();
    let mut updated = result.clone();

    if patterns.missing.is_match(&text) {
        updated.rejection_nature = RejectionNature::Procedural;
        updated.documentation_gap_severity = Level::High;
        updated.confidence = Level::High;
    } else if patterns.incomplete_form.is_match(&text) {
        updated.rejection_nature = RejectionNature::Procedural;
        updated.documentation_gap_severity = Level::Medium;
    } else if patterns.excluded.is_match(&text) || patterns.outside_coverage.is_match(&text) {
        updated.rejection_nature = RejectionNature::Substantive;
    }

    if patterns.ambiguity.is_match(&text) {
        updated.medical_ambiguity_detected = true;
    }

    updated
}
