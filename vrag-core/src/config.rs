//! Configuration for the RAG pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chunking::BreakpointThreshold;
use crate::error::{RagError, Result};
use crate::vectorstore::SearchMode;

/// Number of regenerations after a failed validation. Not configurable.
pub const MAX_REGENERATIONS: usize = 1;

/// Number of retrieval-order chunks used per sub-question when reranking is disabled.
pub const UNRERANKED_CONTEXT_SIZE: usize = 5;

/// Configuration parameters for the RAG pipeline.
///
/// Deserialising fills missing fields from [`RagConfig::default`]; call
/// [`RagConfig::validate`] on configs that did not come from the builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    /// How chunk breakpoints are detected. Defaults to the 85th percentile.
    pub breakpoint: BreakpointThreshold,
    /// Number of candidates retrieved per sub-question.
    pub retrieval_k: usize,
    /// Plain similarity or maximal-marginal-relevance selection.
    pub search_mode: SearchMode,
    /// Number of reranked chunks kept per sub-question.
    pub rerank_top_k: usize,
    /// When false, the first [`UNRERANKED_CONTEXT_SIZE`] retrieved chunks are used unscored.
    pub reranking_enabled: bool,
    /// Sampling temperature for answer generation.
    pub answer_temperature: f32,
    /// Sampling temperature for the validator.
    pub validation_temperature: f32,
    pub answer_max_tokens: u32,
    pub validation_max_tokens: u32,
    pub decomposition_max_tokens: u32,
    /// Upper bound on one sub-question's retrieve-and-rerank pipeline, in
    /// seconds. Fractions are allowed.
    pub sub_question_timeout_secs: f64,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            breakpoint: BreakpointThreshold::default(),
            retrieval_k: 10,
            search_mode: SearchMode::default(),
            rerank_top_k: 5,
            reranking_enabled: true,
            answer_temperature: 0.4,
            validation_temperature: 0.0,
            answer_max_tokens: 5000,
            validation_max_tokens: 200,
            decomposition_max_tokens: 5000,
            sub_question_timeout_secs: 60.0,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// The sub-question timeout as a [`Duration`].
    ///
    /// Out-of-range values, which [`validate`](Self::validate) rejects, map to
    /// [`Duration::MAX`].
    pub fn sub_question_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.sub_question_timeout_secs).unwrap_or(Duration::MAX)
    }

    /// Check that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - the breakpoint parameter is out of range
    /// - `retrieval_k == 0` or `rerank_top_k == 0`
    /// - MMR `fetch_k < retrieval_k` or `lambda` is outside `[0, 1]`
    /// - a temperature is outside `[0, 2]`
    /// - a max token count or the timeout is zero
    pub fn validate(&self) -> Result<()> {
        self.breakpoint.validate()?;
        if self.retrieval_k == 0 {
            return Err(RagError::ConfigError("retrieval_k must be greater than zero".to_string()));
        }
        if self.rerank_top_k == 0 {
            return Err(RagError::ConfigError("rerank_top_k must be greater than zero".to_string()));
        }
        if let SearchMode::Mmr { fetch_k, lambda } = self.search_mode {
            if fetch_k < self.retrieval_k {
                return Err(RagError::ConfigError(format!(
                    "fetch_k ({fetch_k}) must be at least retrieval_k ({})",
                    self.retrieval_k
                )));
            }
            if !(0.0..=1.0).contains(&lambda) {
                return Err(RagError::ConfigError(format!(
                    "lambda ({lambda}) must be within [0, 1]"
                )));
            }
        }
        for (name, value) in [
            ("answer_temperature", self.answer_temperature),
            ("validation_temperature", self.validation_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(RagError::ConfigError(format!("{name} ({value}) must be within [0, 2]")));
            }
        }
        for (name, value) in [
            ("answer_max_tokens", self.answer_max_tokens),
            ("validation_max_tokens", self.validation_max_tokens),
            ("decomposition_max_tokens", self.decomposition_max_tokens),
        ] {
            if value == 0 {
                return Err(RagError::ConfigError(format!("{name} must be greater than zero")));
            }
        }
        let timeout = self.sub_question_timeout_secs;
        if !(timeout.is_finite() && timeout > 0.0) {
            return Err(RagError::ConfigError(format!(
                "sub_question_timeout_secs ({timeout}) must be a positive number"
            )));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the breakpoint threshold strategy.
    pub fn breakpoint(mut self, breakpoint: BreakpointThreshold) -> Self {
        self.config.breakpoint = breakpoint;
        self
    }

    /// Set the number of candidates retrieved per sub-question.
    pub fn retrieval_k(mut self, k: usize) -> Self {
        self.config.retrieval_k = k;
        self
    }

    /// Set the retrieval selection mode.
    pub fn search_mode(mut self, mode: SearchMode) -> Self {
        self.config.search_mode = mode;
        self
    }

    /// Set the number of reranked chunks kept per sub-question.
    pub fn rerank_top_k(mut self, k: usize) -> Self {
        self.config.rerank_top_k = k;
        self
    }

    /// Enable or disable reranking.
    pub fn reranking_enabled(mut self, enabled: bool) -> Self {
        self.config.reranking_enabled = enabled;
        self
    }

    pub fn answer_temperature(mut self, temperature: f32) -> Self {
        self.config.answer_temperature = temperature;
        self
    }

    pub fn validation_temperature(mut self, temperature: f32) -> Self {
        self.config.validation_temperature = temperature;
        self
    }

    pub fn answer_max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.answer_max_tokens = max_tokens;
        self
    }

    pub fn validation_max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.validation_max_tokens = max_tokens;
        self
    }

    pub fn decomposition_max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.decomposition_max_tokens = max_tokens;
        self
    }

    /// Set the per-sub-question timeout.
    pub fn sub_question_timeout(mut self, timeout: Duration) -> Self {
        self.config.sub_question_timeout_secs = timeout.as_secs_f64();
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
