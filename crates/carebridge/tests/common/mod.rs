#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use carebridge::config::{PipelineConfig, ScoringConfig};
use carebridge::llm::{GenerationOptions, Generator};
use carebridge::retrieval::KeywordRegulatoryRetriever;
use carebridge::workflows::audit::PostRejectionEngine;
use carebridge::workflows::prepurchase::PrePurchaseEngine;

pub const CLAUSE_PROMPT: &str = "structured insurance claim audit AI";
pub const DOCUMENTATION_PROMPT: &str = "structured insurance documentation audit AI";
pub const PREPURCHASE_PROMPT: &str = "Classify 10 health insurance policy clauses";

/// Answers each prompt family from its own queue, so tests do not depend on call order
/// across analyzers. Unscripted prompts get the generator's fallback output.
#[derive(Default)]
pub struct RoutedGenerator {
    routes: Mutex<Vec<(&'static str, VecDeque<String>)>>,
    prompts: Mutex<Vec<String>>,
}

impl RoutedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, marker: &'static str, outputs: &[&str]) -> Self {
        self.routes
            .lock()
            .expect("routes poisoned")
            .push((marker, outputs.iter().map(|o| o.to_string()).collect()));
        self
    }

    pub fn calls_matching(&self, marker: &str) -> usize {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .iter()
            .filter(|prompt| prompt.contains(marker))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.prompts.lock().expect("prompt log poisoned").len()
    }
}

impl Generator for RoutedGenerator {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> String {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());
        let mut routes = self.routes.lock().expect("routes poisoned");
        routes
            .iter_mut()
            .find(|(marker, _)| prompt.contains(marker))
            .and_then(|(_, outputs)| outputs.pop_front())
            .unwrap_or_else(|| options.fallback_output().to_string())
    }
}

pub fn pipeline() -> PipelineConfig {
    PipelineConfig {
        generation_timeout: Duration::from_secs(5),
        retrieval_timeout: Duration::from_secs(5),
    }
}

pub fn regulations() -> Arc<KeywordRegulatoryRetriever> {
    Arc::new(KeywordRegulatoryRetriever::from_documents([
        "Pre-existing disease exclusions cannot be applied after sixty months of continuous \
         coverage under the IRDAI moratorium provisions for health insurance policies.",
        "Every repudiation of a claim must be communicated in writing with the specific \
         policy clause relied upon, as required by the Policyholders' Protection Regulations.",
    ]))
}

pub fn audit_engine(generator: Arc<RoutedGenerator>) -> PostRejectionEngine {
    PostRejectionEngine::new(
        generator,
        regulations(),
        Arc::new(ScoringConfig::default()),
        pipeline(),
    )
}

pub fn prepurchase_engine(generator: Arc<RoutedGenerator>) -> PrePurchaseEngine {
    PrePurchaseEngine::new(generator, Arc::new(ScoringConfig::default()), pipeline())
}

pub fn policy_wording() -> String {
    "Section 2: Pre-existing diseases are covered after a waiting period of 36 months of \
     continuous coverage. Section 3: A 20% co-payment applies to every admissible claim. \
     Section 4: Room rent is limited to 2% of the sum insured per day. Section 5: Cosmetic \
     treatment is excluded. Grievance redressal through the insurer grievance cell and the \
     Insurance Ombudsman. Registered with IRDAI."
        .to_string()
}

pub const ALL_MODERATE: &str = r#"{"waiting_period": "Moderate Risk",
    "pre_existing_disease": "Moderate Risk", "room_rent_sublimit": "Moderate Risk",
    "disease_specific_caps": "Moderate Risk", "co_payment": "Moderate Risk",
    "exclusions_clarity": "Moderate Risk", "claim_procedure_complexity": "Moderate Risk",
    "sublimits_and_caps": "Moderate Risk", "restoration_benefit": "Moderate Risk",
    "transparency_of_terms": "Moderate Risk"}"#;
