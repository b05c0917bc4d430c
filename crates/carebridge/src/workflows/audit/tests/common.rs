use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{PipelineConfig, ScoringConfig};
use crate::llm::{GenerationOptions, Generator};
use crate::retrieval::RegulatoryRetriever;
use crate::workflows::audit::{AuditRequest, PostRejectionEngine};

/// Replays canned outputs in order, then falls back to the empty placeholder.
#[derive(Default)]
pub(super) struct ScriptedGenerator {
    outputs: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    pub(super) fn new(outputs: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            outputs: Mutex::new(outputs.iter().map(|o| o.to_string()).collect()),
            ..Self::default()
        })
    }

    pub(super) fn stalled(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, _prompt: &str, options: &GenerationOptions) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.outputs
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| options.fallback_output().to_string())
    }
}

pub(super) struct FixedRetriever {
    pub passages: &'static str,
    pub delay: Option<Duration>,
}

impl RegulatoryRetriever for FixedRetriever {
    fn retrieve(&self, _query: &str, _top_k: usize) -> String {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.passages.to_string()
    }
}

pub(super) const PASSAGES: &str =
    "IRDAI Policyholders' Protection Regulations require reasons for repudiation in writing.";

pub(super) fn fixed_retriever() -> Arc<FixedRetriever> {
    Arc::new(FixedRetriever {
        passages: PASSAGES,
        delay: None,
    })
}

pub(super) fn fast_pipeline() -> PipelineConfig {
    PipelineConfig {
        generation_timeout: Duration::from_secs(5),
        retrieval_timeout: Duration::from_secs(5),
    }
}

pub(super) fn engine_with(
    generator: Arc<ScriptedGenerator>,
    retriever: Arc<FixedRetriever>,
    pipeline: PipelineConfig,
) -> PostRejectionEngine {
    PostRejectionEngine::new(
        generator,
        retriever,
        Arc::new(ScoringConfig::default()),
        pipeline,
    )
}

pub(super) fn engine(generator: Arc<ScriptedGenerator>) -> PostRejectionEngine {
    engine_with(generator, fixed_retriever(), fast_pipeline())
}

pub(super) fn policy_text() -> String {
    "Section 4.1: Any pre-existing disease is covered only after 36 months of continuous \
     coverage. Section 4.2: A waiting period of 30 days applies to all illnesses except \
     accidents. Section 5: Cosmetic treatment, dental care and consumables are excluded. \
     Room rent is limited to 1% of the sum insured per day."
        .to_string()
}

pub(super) fn request(rejection: &str, medical: Option<&str>) -> AuditRequest {
    AuditRequest {
        policy_text: policy_text(),
        rejection_text: rejection.to_string(),
        user_explanation: Some("I was admitted for the first time for this illness.".to_string()),
        medical_documents_text: medical.map(str::to_string),
    }
}
