//! Generative-model boundary: the [`Generator`] capability, its HTTP adapter, prompt
//! builders, and the repair ladder that turns free text back into structured values.

pub mod extract;
mod http;
pub mod prompts;

pub use extract::{
    extract_risk_map, extract_structured, string_field, ExtractionStrategy, RiskExtraction,
    StructuredOutput,
};
pub use http::{GeneratorError, HttpGenerator};

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::deadline;

/// Decoding controls passed through to the model runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub json_mode: bool,
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl GenerationOptions {
    /// Deterministic decoding for structured output.
    pub fn json(max_new_tokens: u32) -> Self {
        Self {
            json_mode: true,
            max_new_tokens,
            temperature: 0.0,
        }
    }

    pub fn text(max_new_tokens: u32, temperature: f32) -> Self {
        Self {
            json_mode: false,
            max_new_tokens,
            temperature,
        }
    }

    /// What a generator returns when it cannot produce anything.
    pub fn fallback_output(&self) -> &'static str {
        if self.json_mode {
            "{}"
        } else {
            ""
        }
    }
}

/// Black-box text generator.
///
/// Implementations block the calling thread and must never panic or return an error to
/// the caller: on internal failure they return [`GenerationOptions::fallback_output`].
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> String;
}

/// Call the generator on the blocking pool, degrading to the fallback output when the
/// deadline passes. The abandoned call keeps running detached; see [`crate::deadline`].
pub async fn generate_within(
    generator: &Arc<dyn Generator>,
    prompt: String,
    options: GenerationOptions,
    limit: Duration,
) -> String {
    let generator = Arc::clone(generator);
    match deadline::run_blocking("generator", limit, move || {
        generator.generate(&prompt, &options)
    })
    .await
    {
        Ok(output) => {
            debug!(chars = output.len(), json_mode = options.json_mode, "generator output");
            output
        }
        Err(_) => options.fallback_output().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slow;

    impl Generator for Slow {
        fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> String {
            std::thread::sleep(Duration::from_millis(250));
            "{\"late\": true}".to_string()
        }
    }

    #[tokio::test]
    async fn timeout_degrades_to_json_placeholder() {
        let generator: Arc<dyn Generator> = Arc::new(Slow);
        let output = generate_within(
            &generator,
            "prompt".to_string(),
            GenerationOptions::json(64),
            Duration::from_millis(10),
        )
        .await;
        assert_eq!(output, "{}");
    }

    #[tokio::test]
    async fn timeout_degrades_to_empty_text() {
        let generator: Arc<dyn Generator> = Arc::new(Slow);
        let output = generate_within(
            &generator,
            "prompt".to_string(),
            GenerationOptions::text(64, 0.35),
            Duration::from_millis(10),
        )
        .await;
        assert!(output.is_empty());
    }
}
