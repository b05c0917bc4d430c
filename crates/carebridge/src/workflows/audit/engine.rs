use std::sync::Arc;

use tracing::{debug, info, warn};

use super::calibration::calibrate;
use super::clause_matcher::match_clause;
use super::contradiction::{apply_contradictions, apply_waiting_period_override};
use super::documentation::{analyze_documentation, apply_documentation_overrides};
use super::domain::{AuditRequest, FinalReport};
use super::report::{build_final_report, early_fallback_report, low_confidence_report};
use super::scoring::score_appeal;
use crate::config::{PipelineConfig, ScoringConfig};
use crate::llm::Generator;
use crate::retrieval::{retrieve_within, RegulatoryRetriever};
use crate::sanitize::sanitize_audit;
use crate::workflows::grading::Level;

const DEFAULT_TOP_K: usize = 5;

/// Post-rejection audit pipeline. Each stage is a pure function except the generator and
/// retriever calls, which are deadline-bounded and degrade to placeholders.
pub struct PostRejectionEngine {
    generator: Arc<dyn Generator>,
    retriever: Arc<dyn RegulatoryRetriever>,
    config: Arc<ScoringConfig>,
    pipeline: PipelineConfig,
    top_k: usize,
}

impl PostRejectionEngine {
    pub fn new(
        generator: Arc<dyn Generator>,
        retriever: Arc<dyn RegulatoryRetriever>,
        config: Arc<ScoringConfig>,
        pipeline: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            retriever,
            config,
            pipeline,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub async fn run(&self, request: &AuditRequest) -> FinalReport {
        let input = sanitize_audit(request);
        if input.input_quality == Level::Low {
            warn!("audit input quality low; returning early fallback report");
            return early_fallback_report();
        }

        let clause = match_clause(
            &self.generator,
            &input.policy_text,
            &input.rejection_text,
            &input.user_explanation,
            self.pipeline.generation_timeout,
        )
        .await;
        let clause = apply_contradictions(&clause, &input.policy_text, &input.medical_text);
        let clause =
            apply_waiting_period_override(&clause, &input.policy_text, &input.medical_text);

        let documentation = analyze_documentation(
            &self.generator,
            &input.policy_text,
            &input.rejection_text,
            &input.medical_text,
            &input.user_explanation,
            self.pipeline.generation_timeout,
        )
        .await;
        let documentation = apply_documentation_overrides(&documentation, &input.rejection_text);

        let regulatory_context = retrieve_within(
            &self.retriever,
            input.rejection_text.clone(),
            self.top_k,
            self.pipeline.retrieval_timeout,
        )
        .await;

        if clause.confidence == Level::Low && documentation.confidence == Level::Low {
            warn!("both analyzers low confidence; returning conservative report");
            return low_confidence_report(&regulatory_context);
        }

        let evaluation = score_appeal(&clause, &documentation, &self.config.appeal);
        debug!(components = ?evaluation.components, "appeal components");

        let confidence = calibrate(&clause, &documentation);
        let report = build_final_report(
            &clause.with_confidence(confidence),
            &documentation,
            evaluation.strength,
            &regulatory_context,
        );

        info!(
            category = %clause.clause_category,
            origin = ?clause.origin,
            appeal = report.appeal_strength.percentage,
            confidence = %report.confidence,
            "audit report built"
        );
        report
    }
}
