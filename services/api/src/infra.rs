use carebridge::config::{AppConfig, PipelineConfig, RetrievalConfig, ScoringConfig};
use carebridge::llm::{Generator, HttpGenerator};
use carebridge::retrieval::{KeywordRegulatoryRetriever, RegulatoryRetriever};
use carebridge::workflows::audit::PostRejectionEngine;
use carebridge::workflows::chat::{InMemorySessionStore, ReportChatService};
use carebridge::workflows::comparison::PolicyComparisonEngine;
use carebridge::workflows::prepurchase::PrePurchaseEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Engines shared by every request handler and CLI command.
#[derive(Clone)]
pub(crate) struct Pipelines {
    pub(crate) audit: Arc<PostRejectionEngine>,
    pub(crate) prepurchase: PrePurchaseEngine,
    pub(crate) comparison: PolicyComparisonEngine,
    pub(crate) chat: ReportChatService,
}

impl Pipelines {
    pub(crate) fn from_config(config: &AppConfig) -> Self {
        let generator: Arc<dyn Generator> = Arc::new(HttpGenerator::new(
            &config.generator,
            config.pipeline.generation_timeout,
        ));
        let retriever = load_retriever(&config.retrieval);
        Self::assemble(
            generator,
            retriever,
            config.pipeline,
            config.retrieval.top_k,
            config.sessions.ttl,
        )
    }

    pub(crate) fn assemble(
        generator: Arc<dyn Generator>,
        retriever: Arc<dyn RegulatoryRetriever>,
        pipeline: PipelineConfig,
        top_k: usize,
        session_ttl: Duration,
    ) -> Self {
        let scoring = Arc::new(ScoringConfig::default());
        let audit = PostRejectionEngine::new(
            generator.clone(),
            retriever,
            scoring.clone(),
            pipeline,
        )
        .with_top_k(top_k);
        let prepurchase = PrePurchaseEngine::new(generator.clone(), scoring, pipeline);
        let chat = ReportChatService::new(
            generator,
            Arc::new(InMemorySessionStore::new(session_ttl)),
            pipeline.generation_timeout,
        );

        Self {
            audit: Arc::new(audit),
            comparison: PolicyComparisonEngine::new(prepurchase.clone()),
            prepurchase,
            chat,
        }
    }
}

/// A missing or unreadable corpus leaves the audit running with the "not available"
/// placeholder instead of blocking startup.
fn load_retriever(config: &RetrievalConfig) -> Arc<dyn RegulatoryRetriever> {
    match KeywordRegulatoryRetriever::load(&config.documents_dir) {
        Ok(retriever) => {
            info!(
                dir = %config.documents_dir.display(),
                chunks = retriever.len(),
                "regulatory corpus indexed"
            );
            Arc::new(retriever)
        }
        Err(err) => {
            warn!(error = %err, "regulatory corpus unavailable; continuing without it");
            Arc::new(KeywordRegulatoryRetriever::default())
        }
    }
}
