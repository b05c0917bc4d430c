use std::sync::OnceLock;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{GenerationOptions, Generator};
use crate::config::GeneratorConfig;

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("generator request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("generator returned status {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: DecodeOptions,
}

#[derive(Debug, Serialize)]
struct DecodeOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// [`Generator`] backed by an Ollama-compatible `/api/generate` endpoint.
///
/// The blocking client is created lazily on the first call so it is always built on a
/// blocking-pool thread rather than inside the async runtime.
#[derive(Debug)]
pub struct HttpGenerator {
    endpoint: String,
    model: String,
    request_timeout: Duration,
    client: OnceLock<Client>,
}

impl HttpGenerator {
    pub fn new(config: &GeneratorConfig, request_timeout: Duration) -> Self {
        Self {
            endpoint: format!("{}/api/generate", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            request_timeout,
            client: OnceLock::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn client(&self) -> Result<&Client, GeneratorError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(GeneratorError::Client)?;
        Ok(self.client.get_or_init(|| client))
    }

    fn request(&self, prompt: &str, options: &GenerationOptions) -> Result<String, GeneratorError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: options.json_mode.then_some("json"),
            options: DecodeOptions {
                temperature: options.temperature,
                num_predict: options.max_new_tokens,
            },
        };

        let response = self.client()?.post(&self.endpoint).json(&body).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json()?;
        Ok(parsed.response.trim().to_string())
    }
}

impl Generator for HttpGenerator {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> String {
        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            max_new_tokens = options.max_new_tokens,
            "calling generator"
        );
        match self.request(prompt, options) {
            Ok(output) => output,
            Err(error) => {
                warn!(
                    %error,
                    endpoint = %self.endpoint,
                    "generation failed; returning placeholder"
                );
                options.fallback_output().to_string()
            }
        }
    }
}
