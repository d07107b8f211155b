//! Ollama backend for local model serving.
//!
//! Requires a running Ollama instance. Structured calls use Ollama's JSON
//! mode (`format: "json"`), which constrains decoding to a single JSON value.

use crate::backend::{LlmBackend, LlmConfig, LlmError, LlmResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Ollama API request.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama API response.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    done: bool,
}

/// Backend for a local Ollama server.
///
/// # Example
///
/// ```rust,ignore
/// use trellis_llm::{LlmBackend, OllamaBackend};
///
/// let backend = OllamaBackend::localhost();
/// let answer = backend.complete("Summarize the findings.").await?;
/// ```
pub struct OllamaBackend {
    endpoint: String,
    config: LlmConfig,
    client: reqwest::Client,
}

impl OllamaBackend {
    /// Create a backend with the default configuration.
    pub fn new(endpoint: &str) -> Self {
        Self::with_config(endpoint, LlmConfig::default())
    }

    /// Create a backend with an explicit configuration.
    pub fn with_config(endpoint: &str, config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("HTTP client construction failed");

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            config,
            client,
        }
    }

    /// Connect to the default localhost port.
    pub fn localhost() -> Self {
        Self::new("http://localhost:11434")
    }

    /// Set the model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.config.model = model.to_string();
        self
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_connect() {
            LlmError::ConnectionFailed(format!(
                "cannot reach Ollama at {} (is it running?)",
                self.endpoint
            ))
        } else if e.is_timeout() {
            LlmError::Timeout(self.config.timeout_secs)
        } else {
            LlmError::Api(e.to_string())
        }
    }

    /// Issue one generation request.
    async fn request(
        &self,
        prompt: &str,
        system: Option<&str>,
        format: Option<&str>,
    ) -> LlmResult<String> {
        let request = OllamaRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            system: system.map(str::to_string),
            format: format.map(str::to_string),
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 404 {
                return Err(LlmError::ModelNotFound(format!(
                    "model '{}' is not installed, try: ollama pull {}",
                    self.config.model, self.config.model
                )));
            }

            return Err(LlmError::Api(format!("Ollama returned {status}: {body}")));
        }

        let resp: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(resp.response)
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        self.request(prompt, None, None).await
    }

    async fn complete_structured(&self, prompt: &str, system: Option<&str>) -> LlmResult<String> {
        self.request(prompt, system, Some("json")).await
    }

    async fn health_check(&self) -> LlmResult<bool> {
        let url = format!("{}/api/tags", self.endpoint);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}
