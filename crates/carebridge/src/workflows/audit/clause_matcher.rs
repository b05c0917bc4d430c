use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::classifier::classify_rejection;
use super::domain::{Alignment, ClauseCategory, ClauseMatchResult, MatchOrigin, UNCLEAR_CLAUSE};
use crate::llm::{
    extract_structured, generate_within, prompts, string_field, GenerationOptions, Generator,
};
use crate::workflows::grading::Level;

pub const CLAUSE_KEYS: [&str; 6] = [
    "clause_category",
    "clause_detected",
    "clause_clarity",
    "rejection_alignment",
    "explanation",
    "confidence",
];

const MAX_NEW_TOKENS: u32 = 300;
const ATTEMPTS: usize = 2;

/// Validate generator output against the clause-match schema. Absent fields take their
/// neutral defaults; present fields with values outside the allowed sets reject the
/// whole record.
pub fn parse_clause_match(raw: &str) -> Option<ClauseMatchResult> {
    let output = extract_structured(raw, &CLAUSE_KEYS)?;
    let object = &output.object;

    let clause_category = string_field(
        object,
        "clause_category",
        ClauseCategory::OtherUnclear,
        ClauseCategory::parse,
    )?;
    let clause_detected = string_field(
        object,
        "clause_detected",
        UNCLEAR_CLAUSE.to_string(),
        |raw| Some(raw.trim().to_string()),
    )?;
    let clause_clarity = string_field(object, "clause_clarity", Level::Low, Level::parse)?;
    let mut rejection_alignment =
        string_field(object, "rejection_alignment", Alignment::Partial, Alignment::parse)?;
    let explanation = string_field(
        object,
        "explanation",
        "No explanation available.".to_string(),
        |raw| Some(raw.trim().to_string()),
    )?;
    let confidence = string_field(object, "confidence", Level::Low, Level::parse)?;

    if clause_detected.eq_ignore_ascii_case(UNCLEAR_CLAUSE)
        && rejection_alignment == Alignment::Strong
    {
        rejection_alignment = Alignment::Partial;
    }

    debug!(strategy = ?output.strategy, "clause match recovered");

    Some(ClauseMatchResult {
        clause_category,
        clause_detected,
        clause_clarity,
        rejection_alignment,
        explanation,
        confidence,
        origin: MatchOrigin::Generator,
    })
}

/// Rule fast path first; otherwise ask the generator, retrying once, and fall back to the
/// fixed unclear result.
pub async fn match_clause(
    generator: &Arc<dyn Generator>,
    policy_text: &str,
    rejection_text: &str,
    user_context: &str,
    limit: Duration,
) -> ClauseMatchResult {
    if let Some(category) = classify_rejection(rejection_text) {
        info!(%category, "clause matched by keyword rule");
        return ClauseMatchResult::from_rule(category);
    }

    let prompt = prompts::clause_matching(policy_text, rejection_text, user_context);
    for attempt in 1..=ATTEMPTS {
        let raw = generate_within(
            generator,
            prompt.clone(),
            GenerationOptions::json(MAX_NEW_TOKENS),
            limit,
        )
        .await;
        debug!(attempt, raw = %raw, "clause matcher output");

        if let Some(result) = parse_clause_match(&raw) {
            info!(attempt, category = %result.clause_category, "clause matched by generator");
            return result;
        }
        warn!(attempt, "clause matcher output failed validation");
    }

    warn!("clause matcher fell back to unclear default");
    ClauseMatchResult::fallback()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_generator_output() {
        let raw = r#"{"clause_category": "Policy exclusion", "clause_detected": "Dental treatment is excluded.",
            "clause_clarity": "High", "rejection_alignment": "Strong",
            "explanation": "Dental exclusion applies.", "confidence": "High"}"#;
        let result = parse_clause_match(raw).expect("valid record");
        assert_eq!(result.clause_category, ClauseCategory::PolicyExclusion);
        assert_eq!(result.rejection_alignment, Alignment::Strong);
        assert_eq!(result.confidence, Level::High);
        assert_eq!(result.origin, MatchOrigin::Generator);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let result = parse_clause_match(r#"{"clause_category": "Co-payment"}"#).expect("valid");
        assert_eq!(result.clause_detected, UNCLEAR_CLAUSE);
        assert_eq!(result.clause_clarity, Level::Low);
        assert_eq!(result.rejection_alignment, Alignment::Partial);
    }

    #[test]
    fn out_of_set_values_fail_validation() {
        assert!(parse_clause_match(r#"{"clause_category": "Maternity"}"#).is_none());
        assert!(parse_clause_match(r#"{"confidence": "Very sure"}"#).is_none());
        assert!(parse_clause_match("no json here").is_none());
    }

    #[test]
    fn unclear_detection_cannot_be_strong() {
        let raw = r#"{"clause_detected": "Unclear", "rejection_alignment": "Strong"}"#;
        let result = parse_clause_match(raw).expect("valid");
        assert_eq!(result.rejection_alignment, Alignment::Partial);
    }
}
