//! Core LLM backend trait.

use crate::prompt::{ExtractionProfile, PromptTemplate, RelationPrompt};
use crate::types::{parse_relation_graph, StructuredOutcome};
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;

/// LLM-related errors.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("timed out after {0}s")]
    Timeout(u64),
}

/// Shorthand for results carrying [`LlmError`].
pub type LlmResult<T> = Result<T, LlmError>;

impl LlmError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Api(_) | Self::ConnectionFailed(_) | Self::Timeout(_)
        )
    }
}

/// Generation parameters shared by all backends.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name/identifier.
    pub model: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature, clamped to 0.0..=2.0 by the builder.
    pub temperature: f32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemma3:12b".to_string(),
            max_tokens: 2048,
            temperature: 0.2,
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Interface every LLM backend implements.
///
/// Two generation modes: free-form completion for answers, and
/// JSON-constrained completion for structured extraction.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Backend name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Active generation parameters.
    fn config(&self) -> &LlmConfig;

    /// Complete a free-form prompt.
    async fn complete(&self, prompt: &str) -> LlmResult<String>;

    /// Generate a completion constrained to emit a single JSON value.
    async fn complete_structured(&self, prompt: &str, system: Option<&str>) -> LlmResult<String>;

    /// Extract relation triples from text as a validated structure.
    ///
    /// Validation problems surface as [`StructuredOutcome::Malformed`] rather
    /// than `Err`, so callers can apply their own retry policy; transport
    /// failures still return `Err`.
    async fn extract_relations(
        &self,
        text: &str,
        profile: ExtractionProfile,
    ) -> LlmResult<StructuredOutcome> {
        let prompt = RelationPrompt::new(text).with_profile(profile);
        let response = self
            .complete_structured(&prompt.generate(), prompt.system_prompt().as_deref())
            .await?;
        Ok(parse_relation_graph(&response))
    }

    /// Probe whether the backend is reachable.
    async fn health_check(&self) -> LlmResult<bool> {
        match self.complete("ping").await {
            Ok(_) => Ok(true),
            Err(LlmError::ConnectionFailed(_)) => Ok(false),
            Err(_) => Ok(true),
        }
    }
}

/// Test double for [`LlmBackend`].
///
/// Scripted responses (if any) are served first, in order, regardless of the
/// prompt; after that, pattern-matched canned responses; finally the default
/// response. Call counters let tests assert which pipeline stages ran.
pub struct MockBackend {
    config: LlmConfig,
    responses: HashMap<String, String>,
    default_response: String,
    script: Mutex<VecDeque<String>>,
    complete_calls: AtomicUsize,
    structured_calls: AtomicUsize,
}

impl MockBackend {
    /// Mock that answers every prompt with `"Mock response"`.
    pub fn new() -> Self {
        Self {
            config: LlmConfig::default(),
            responses: HashMap::new(),
            default_response: "Mock response".to_string(),
            script: Mutex::new(VecDeque::new()),
            complete_calls: AtomicUsize::new(0),
            structured_calls: AtomicUsize::new(0),
        }
    }

    /// Serve `response` whenever the prompt contains `pattern`.
    pub fn with_response(mut self, pattern: &str, response: &str) -> Self {
        self.responses
            .insert(pattern.to_string(), response.to_string());
        self
    }

    /// Replace the fallback response.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = response.to_string();
        self
    }

    /// Queue responses served in order before any pattern matching.
    pub fn with_script(self, responses: &[&str]) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            for response in responses {
                script.push_back(response.to_string());
            }
        }
        self
    }

    /// Number of `complete` calls made so far.
    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    /// Number of `complete_structured` calls made so far.
    pub fn structured_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, prompt: &str) -> String {
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        for (pattern, response) in &self.responses {
            if prompt.contains(pattern) {
                return response.clone();
            }
        }
        self.default_response.clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.lookup(prompt))
    }

    async fn complete_structured(&self, prompt: &str, _system: Option<&str>) -> LlmResult<String> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.lookup(prompt))
    }
}
