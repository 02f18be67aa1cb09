//! LLM Client abstractions and provider management
//!
//! The relay only needs a model for one job: picking which remote agent should
//! answer a request. This module provides a small provider-neutral interface
//! for that:
//! - **OpenAI**: any OpenAI-compatible chat completions endpoint, including
//!   hosted "compatible mode" gateways
//! - **Ollama**: local inference through the Ollama chat API

use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// # Supported Providers
///
/// | Provider | Feature | Endpoint |
/// |----------|---------|----------|
/// | OpenAI | `openai` | `async-openai` against `{api_base}` |
/// | Ollama | `ollama` | `ollama-rs` against `{base_url}` |
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API provider (including compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string(),
    ///     model: "qwen-plus".to_string(),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama3.2".to_string(),
    /// };
    /// ```
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's cargo feature is disabled, the
    /// provider URL is invalid, or the HTTP client cannot be built.
    pub fn create_client(&self, timeout: Duration) -> Result<Box<dyn LLMClient>> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::LLM(format!("Failed to build HTTP client: {}", e)))?;

        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                http,
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            ))),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(http, base_url, model.clone())?,
            )),

            #[allow(unreachable_patterns)]
            other => Err(AppError::Configuration(format!(
                "{} provider support is not compiled in; enable the '{}' feature",
                other.name(),
                other.feature()
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// Cargo feature gating this provider
    pub fn feature(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "openai",
            Provider::Ollama { .. } => "ollama",
        }
    }

    /// Model identifier requested from the provider
    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}

/// Configuration-based client factory
///
/// Holds the provider and request timeout chosen at startup so handlers and
/// the CLI can build clients without re-reading configuration.
pub struct LLMClientFactory {
    default_provider: Provider,
    timeout: Duration,
}

impl LLMClientFactory {
    /// Create a new factory with the specified default provider
    pub fn new(default_provider: Provider, timeout: Duration) -> Self {
        Self {
            default_provider,
            timeout,
        }
    }

    /// Create a client using the default provider
    pub fn create_default(&self) -> Result<Box<dyn LLMClient>> {
        self.default_provider.create_client(self.timeout)
    }

    /// Get a reference to the default provider
    pub fn default_provider(&self) -> &Provider {
        &self.default_provider
    }
}
