//! # Relay - Multi-agent streaming relay
//!
//! Routes a user's natural-language request to one of several remote agents
//! and relays that agent's incrementally produced answer back to the caller as
//! a live server-sent-events stream.
//!
//! ## Overview
//!
//! The relay can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `relay-server` binary
//! 2. **As a library** - Import the registry, selector and relay into your own service
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use relay::{AgentQueryService, AgentRegistry, LlmAgentSelector, Provider, Query, RelayOptions};
//! use futures::StreamExt;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let http = relay::a2a::build_http_client(Duration::from_secs(30))?;
//! let registry = Arc::new(AgentRegistry::new(http, "/.well-known/agent.json"));
//! registry.register("http://localhost:10050").await?;
//!
//! let provider = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "qwen2.5:3b".to_string(),
//! };
//! let selector = Arc::new(LlmAgentSelector::new(provider.create_client(Duration::from_secs(30))?, vec![]));
//!
//! let service = AgentQueryService::new(registry, selector, RelayOptions::default());
//! let mut events = service.stream(Query::new("Tell me a joke", "session-1"));
//! while let Some(event) = events.next().await {
//!     println!("{}", serde_json::to_string(&event)?);
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama selection model (default) |
//! | `openai` | OpenAI-compatible selection model (default) |
//!
//! ## Modules
//!
//! - [`a2a`] - HTTP client for remote agents (card fetch, streaming calls)
//! - [`agents`] - Agent registry and selection
//! - [`relay`] - Per-request orchestration and frame normalization
//! - [`api`] - HTTP gateway handlers and routes
//! - [`llm`] - LLM clients used for selection
//! - [`types`] - Common types and error handling
//!
//! ## Configuration
//!
//! A single TOML file (`relay.toml`) describes the gateway, the selection
//! model and the remote agents. It is hot-reloaded; newly added agents are
//! discovered without a restart.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Remote agent transport (A2A over HTTP).
pub mod a2a;
/// Agent registry and selection.
pub mod agents;
/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Streaming relay between callers and remote agents.
pub mod relay;
/// Core types (requests, events, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use agents::{AgentRegistry, AgentSelector, DiscoveryReport, LlmAgentSelector};
pub use llm::{LLMClient, LLMClientFactory, Provider};
pub use relay::{AgentQueryService, RelayOptions};
pub use types::{AppError, Query, Result, StreamEvent};
pub use utils::toml_config::{RelayConfig, RelayConfigManager};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<RelayConfigManager>,
    /// Registered remote agents
    pub registry: Arc<AgentRegistry>,
    /// Per-request relay
    pub query_service: Arc<AgentQueryService>,
}

impl AppState {
    /// Wire up registry, selector and relay from the current configuration
    ///
    /// The registry starts empty; run [`AgentRegistry::discover`] to populate it.
    pub fn from_config(config_manager: Arc<RelayConfigManager>) -> Result<Self> {
        let config = config_manager.config();
        let timeout = config.server.timeout();

        let http = a2a::build_http_client(timeout)
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        let registry = Arc::new(AgentRegistry::new(http, config.relay.card_path.clone()));

        let provider = config
            .selection_provider()
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        let llm = LLMClientFactory::new(provider, timeout).create_default()?;
        let selector: Arc<dyn AgentSelector> =
            Arc::new(LlmAgentSelector::new(llm, config.selector.rules.clone()));

        let query_service = Arc::new(AgentQueryService::new(
            Arc::clone(&registry),
            selector,
            RelayOptions::from(&config.relay),
        ));

        Ok(Self {
            config_manager,
            registry,
            query_service,
        })
    }
}
