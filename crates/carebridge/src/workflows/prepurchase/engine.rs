use std::sync::Arc;

use tracing::{debug, info, warn};

use super::broker::{analyze_broker_risk, apply_structural_adjustment};
use super::compliance::evaluate_irdai_compliance;
use super::domain::{ClauseField, ClauseRiskAssessment, PolicyScoreBreakdown, PrePurchaseReport};
use super::features::extract_features;
use super::overrides::apply_clause_overrides;
use super::scoring::{compute_policy_score, rating_for, risk_index};
use crate::config::{PipelineConfig, ScoringConfig};
use crate::llm::{extract_risk_map, generate_within, prompts, GenerationOptions, Generator};
use crate::llm::{ExtractionStrategy, RiskExtraction};
use crate::sanitize::{sanitize_policy, truncate_chars};
use crate::workflows::grading::Level;

const PROMPT_POLICY_LIMIT: usize = 3000;
const MAX_NEW_TOKENS: u32 = 300;
const ATTEMPTS: usize = 2;

pub const SUMMARY: &str =
    "Hybrid deterministic + LLM + IRDAI compliance + structural risk assessment completed.";

const BUYER_CHECKLIST: [&str; 6] = [
    "Ask about waiting period duration clearly.",
    "Confirm pre-existing disease coverage timeline.",
    "Check if room rent has caps.",
    "Verify disease-specific sublimits.",
    "Confirm co-payment percentage.",
    "Clarify exclusions before purchase.",
];

/// Confidence from how many of the ten clauses resolved to a grade.
pub fn detection_confidence(detected: usize) -> Level {
    match detected {
        8.. => Level::High,
        5..=7 => Level::Medium,
        _ => Level::Low,
    }
}

fn is_unusable(extraction: &RiskExtraction) -> bool {
    extraction.strategy == ExtractionStrategy::Defaulted || extraction.detected() == 0
}

/// Pre-purchase screening pipeline for a single policy document.
#[derive(Clone)]
pub struct PrePurchaseEngine {
    generator: Arc<dyn Generator>,
    config: Arc<ScoringConfig>,
    pipeline: PipelineConfig,
}

impl PrePurchaseEngine {
    pub fn new(
        generator: Arc<dyn Generator>,
        config: Arc<ScoringConfig>,
        pipeline: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            config,
            pipeline,
        }
    }

    async fn classify(&self, policy_text: &str) -> RiskExtraction {
        let keys = ClauseField::keys();
        let mut extraction = extract_risk_map("", &keys);
        for attempt in 1..=ATTEMPTS {
            let raw = generate_within(
                &self.generator,
                prompts::prepurchase_risk(policy_text),
                GenerationOptions::json(MAX_NEW_TOKENS),
                self.pipeline.generation_timeout,
            )
            .await;
            debug!(attempt, raw = %raw, "pre-purchase generator output");

            extraction = extract_risk_map(&raw, &keys);
            if !is_unusable(&extraction) {
                debug!(attempt, strategy = ?extraction.strategy, "clause risk recovered");
                break;
            }
            warn!(attempt, "pre-purchase classification unusable");
        }
        extraction
    }

    pub async fn run(&self, policy_text: &str) -> PrePurchaseReport {
        let sanitized = sanitize_policy(policy_text);
        let text = truncate_chars(&sanitized, PROMPT_POLICY_LIMIT);

        let features = extract_features(text);
        let extraction = self.classify(text).await;
        let (clause_risk, applied) =
            apply_clause_overrides(ClauseRiskAssessment::from_extraction(&extraction), &features);
        for change in &applied {
            debug!(field = %change.field, from = %change.from, to = %change.to, "clause override");
        }

        let confidence = detection_confidence(clause_risk.detected());
        let irdai_compliance = evaluate_irdai_compliance(text, &self.config.compliance);
        let broker_risk_analysis =
            analyze_broker_risk(&clause_risk, irdai_compliance.compliance_score, &self.config);
        let scored = compute_policy_score(
            &clause_risk,
            irdai_compliance.compliance_score,
            &self.config,
        );

        let adjusted = apply_structural_adjustment(
            scored.breakdown.adjusted_score,
            &broker_risk_analysis,
            &self.config.broker,
        );
        let rating = rating_for(adjusted, &self.config);

        info!(
            detected = clause_risk.detected(),
            overrides = applied.len(),
            base = scored.breakdown.adjusted_score,
            adjusted,
            rating = %rating,
            structural = broker_risk_analysis.structural_risk_level.as_str(),
            "pre-purchase report built"
        );

        PrePurchaseReport {
            clause_risk,
            score_breakdown: PolicyScoreBreakdown {
                base_score: scored.breakdown.base_score,
                adjusted_score: adjusted,
                rating,
                risk_index: risk_index(adjusted),
            },
            overall_policy_rating: rating,
            summary: SUMMARY.to_string(),
            checklist_for_buyer: BUYER_CHECKLIST.iter().map(|item| item.to_string()).collect(),
            confidence,
            red_flags: scored.red_flags,
            positive_flags: scored.positive_flags,
            irdai_compliance,
            broker_risk_analysis,
        }
    }
}
