//! Configuration management for the trellis CLI.
//!
//! Settings come from `trellis.toml`, discovered by walking up from the
//! current directory, with endpoint and credential overrides from the
//! environment. Every field has a default, so the CLI runs with no config
//! file at all (in-memory backends, local Ollama).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use trellis_graph::GraphBackendConfig;
use trellis_rag::{IngestConfig, RetrieveConfig};
use trellis_vectors::{VectorBackendConfig, VectorStoreConfig};

/// Trellis project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrellisConfig {
    pub llm: LlmSection,
    pub embedding: EmbeddingSection,
    pub graph: GraphBackendConfig,
    pub vectors: VectorStoreConfig,
    pub ingestion: IngestConfig,
    pub retrieval: RetrieveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSection {
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_generation_model() -> String {
    "gemma3:12b".to_string()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_llm_timeout() -> u64 {
    120
}
fn default_embedding_model() -> String {
    "bge-m3".to_string()
}
fn default_dimension() -> usize {
    1024
}
fn default_embedding_timeout() -> u64 {
    30
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            endpoint: default_ollama_endpoint(),
            model: default_generation_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for EmbeddingSection {
    fn default() -> Self {
        Self {
            endpoint: default_ollama_endpoint(),
            model: default_embedding_model(),
            dimension: default_dimension(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

impl TrellisConfig {
    /// Load config from trellis.toml in the current or parent directories,
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = if let Some(path) = find_config_file() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply endpoint and credential overrides from the environment.
    ///
    /// `OLLAMA_URL` overrides both LLM and embedding endpoints; the store
    /// overrides only apply when that backend is configured.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            self.llm.endpoint = url.clone();
            self.embedding.endpoint = url;
        }
        if let GraphBackendConfig::Neo4j {
            url,
            username,
            password,
            ..
        } = &mut self.graph
        {
            if let Ok(value) = std::env::var("NEO4J_URI") {
                *url = value;
            }
            if let Ok(value) = std::env::var("NEO4J_USERNAME") {
                *username = value;
            }
            if let Ok(value) = std::env::var("NEO4J_PASSWORD") {
                *password = value;
            }
        }
        if let VectorBackendConfig::Qdrant { url, .. } = &mut self.vectors.backend {
            if let Ok(value) = std::env::var("QDRANT_URL") {
                *url = value;
            }
        }
    }
}

/// Find trellis.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join("trellis.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// The annotated config `trellis init` writes. Every key matches a default,
/// so the file is documentation until something gets uncommented.
pub const DEFAULT_CONFIG: &str = r#"# Trellis configuration.
# Every key is optional; the values below are the defaults.

[llm]
endpoint = "http://localhost:11434"
model = "gemma3:12b"
temperature = 0.2
max_tokens = 2048
timeout_secs = 120

[embedding]
endpoint = "http://localhost:11434"
model = "bge-m3"
dimension = 1024
timeout_secs = 30

# Graph store. type = "memory" keeps the graph in-process (lost on exit);
# switch to "neo4j" for persistence.
[graph]
type = "memory"
# type = "neo4j"
# url = "http://localhost:7474"
# database = "neo4j"
# username = "neo4j"
# password = "password"

# Vector store. The dimension must match the embedding model.
[vectors]
dimension = 1024
collection = "trellis"
metric = "cosine"

[vectors.backend]
type = "memory"
# type = "qdrant"
# url = "http://localhost:6334"

[ingestion]
profile = "general"       # or "clinical"
write_concurrency = 8

[ingestion.retry]
max_attempts = 3
base_delay_ms = 250
max_delay_ms = 5000

[retrieval]
top_k = 5
hops = "two"              # or "one"

[retrieval.limits]
fanout_per_hop = 16
max_triples = 256

[retrieval.retry]
max_attempts = 3
base_delay_ms = 250
max_delay_ms = 5000
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_graph::Hops;
    use trellis_llm::ExtractionProfile;

    #[test]
    fn test_default_config_template_parses_to_defaults() {
        let parsed: TrellisConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        let defaults = TrellisConfig::default();

        assert_eq!(parsed.llm.endpoint, defaults.llm.endpoint);
        assert_eq!(parsed.llm.model, defaults.llm.model);
        assert_eq!(parsed.embedding.model, defaults.embedding.model);
        assert_eq!(parsed.embedding.dimension, defaults.embedding.dimension);
        assert_eq!(parsed.vectors.dimension, defaults.vectors.dimension);
        assert_eq!(parsed.vectors.collection, defaults.vectors.collection);
        assert_eq!(parsed.ingestion, defaults.ingestion);
        assert_eq!(parsed.retrieval, defaults.retrieval);
        assert!(matches!(parsed.graph, GraphBackendConfig::Memory));
        assert!(matches!(
            parsed.vectors.backend,
            VectorBackendConfig::Memory
        ));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let parsed: TrellisConfig = toml::from_str("").unwrap();
        assert_eq!(parsed.llm.model, "gemma3:12b");
        assert_eq!(parsed.embedding.dimension, 1024);
        assert_eq!(parsed.retrieval.top_k, 5);
        assert_eq!(parsed.retrieval.hops, Hops::Two);
        assert_eq!(parsed.ingestion.profile, ExtractionProfile::General);
    }

    #[test]
    fn test_partial_config_overrides_one_section() {
        let parsed: TrellisConfig = toml::from_str(
            r#"
            [graph]
            type = "neo4j"
            url = "http://graph:7474"
            username = "neo4j"
            password = "secret"

            [retrieval]
            top_k = 3
            "#,
        )
        .unwrap();

        match &parsed.graph {
            GraphBackendConfig::Neo4j { url, database, .. } => {
                assert_eq!(url, "http://graph:7474");
                assert_eq!(database, "neo4j");
            }
            other => panic!("unexpected backend: {other:?}"),
        }
        assert_eq!(parsed.retrieval.top_k, 3);
        assert_eq!(parsed.retrieval.hops, Hops::Two);
        assert_eq!(parsed.llm.model, "gemma3:12b");
    }
}
