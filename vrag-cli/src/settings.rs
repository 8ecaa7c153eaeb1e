//! Pipeline configuration and provider wiring from files and the environment.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;
use vrag_core::openai::{OpenAIEmbedder, OpenAIGenerator};
use vrag_core::{RagConfig, RagPipeline};

/// Command-line settings applied on top of the config file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub no_rerank: bool,
    pub rerank_top_k: Option<usize>,
}

/// Reads `path` (or starts from defaults), applies `overrides` and validates.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<RagConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config '{}'", path.display()))?;
            serde_json::from_str::<RagConfig>(&raw)
                .with_context(|| format!("invalid config '{}'", path.display()))?
        }
        None => RagConfig::default(),
    };

    if overrides.no_rerank {
        config.reranking_enabled = false;
    }
    if let Some(k) = overrides.rerank_top_k {
        config.rerank_top_k = k;
    }
    config.validate()?;
    debug!(?config, "loaded pipeline config");
    Ok(config)
}

/// Provider endpoint settings read from the environment.
#[derive(Debug, Default, Clone)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub chat_model: Option<String>,
    pub embedding_model: Option<String>,
}

impl ProviderSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            api_key: non_empty("OPENAI_API_KEY"),
            base_url: non_empty("VRAG_BASE_URL"),
            chat_model: non_empty("VRAG_CHAT_MODEL"),
            embedding_model: non_empty("VRAG_EMBEDDING_MODEL"),
        }
    }

    fn embedder(&self, api_key: &str) -> Result<OpenAIEmbedder> {
        let mut embedder = OpenAIEmbedder::new(api_key)?;
        if let Some(url) = &self.base_url {
            embedder = embedder.with_base_url(url);
        }
        if let Some(model) = &self.embedding_model {
            embedder = embedder.with_model(model);
        }
        Ok(embedder)
    }

    fn generator(&self, api_key: &str) -> Result<OpenAIGenerator> {
        let mut generator = OpenAIGenerator::new(api_key)?;
        if let Some(url) = &self.base_url {
            generator = generator.with_base_url(url);
        }
        if let Some(model) = &self.chat_model {
            generator = generator.with_model(model);
        }
        Ok(generator)
    }

    /// Builds a pipeline backed by the configured OpenAI-compatible endpoint.
    pub fn pipeline(&self, config: RagConfig) -> Result<RagPipeline> {
        let api_key = self.api_key.as_deref().context("OPENAI_API_KEY is not set")?;
        let pipeline = RagPipeline::builder()
            .config(config)
            .embedder(Arc::new(self.embedder(api_key)?))
            .generator(Arc::new(self.generator(api_key)?))
            .build()?;
        Ok(pipeline)
    }
}
