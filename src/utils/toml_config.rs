//! TOML-based configuration for the relay
//!
//! This module provides declarative configuration for the gateway, the
//! selection model and the table of remote agents via a TOML file
//! (`relay.toml`).
//!
//! # Hot Reloading
//!
//! Configuration changes are automatically detected and applied at runtime.
//! Use `RelayConfigManager` for thread-safe access to the current configuration
//! and `subscribe` to react to reloads (the server re-runs agent discovery).

use crate::llm::Provider;
use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

/// Root configuration structure loaded from relay.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub selector: SelectorConfig,

    #[serde(default)]
    pub relay: RelaySettings,

    /// Remote agents to discover at startup, keyed by a logical name
    #[serde(default)]
    pub agents: BTreeMap<String, RemoteAgentConfig>,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect/read timeout for outbound HTTP, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9001
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============= Selector Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        model: String,
    },
    OpenAI {
        /// Environment variable containing API key
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        model: String,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

/// One row of the routing table given to the selection model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRule {
    /// Task category, e.g. "coding"
    pub category: String,
    /// Agent name the category maps to, exactly as advertised on its card
    pub agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub provider: ProviderConfig,

    #[serde(default)]
    pub rules: Vec<SelectionRule>,
}

// ============= Relay Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySettings {
    /// Emit a placeholder status when a non-final frame carries no text
    #[serde(default = "default_true")]
    pub emit_processing_placeholder: bool,

    /// Path of the agent card relative to each endpoint URL
    #[serde(default = "default_card_path")]
    pub card_path: String,
}

fn default_true() -> bool {
    true
}

fn default_card_path() -> String {
    a2a_protocol::AGENT_CARD_PATH.to_string()
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            emit_processing_placeholder: true,
            card_path: default_card_path(),
        }
    }
}

// ============= Remote Agent Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteAgentConfig {
    pub host: String,

    pub port: u16,

    /// Used when the agent's own card has no description
    #[serde(default)]
    pub description: String,

    #[serde(default = "default_scheme")]
    pub scheme: String,
}

fn default_scheme() -> String {
    "http".to_string()
}

impl RemoteAgentConfig {
    /// Base URL the agent is registered from.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl RelayConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: RelayConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.server.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "server.timeout_secs must be non-zero".to_string(),
            ));
        }

        if let ProviderConfig::OpenAI { api_key_env, .. } = &self.selector.provider {
            self.validate_env_var(api_key_env)?;
        }

        for (index, rule) in self.selector.rules.iter().enumerate() {
            if rule.category.trim().is_empty() || rule.agent.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "selector.rules[{}] needs both a category and an agent",
                    index
                )));
            }
        }

        for (key, agent) in &self.agents {
            if agent.host.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "agents.{} has an empty host",
                    key
                )));
            }
            if agent.port == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "agents.{} port must be non-zero",
                    key
                )));
            }
            if agent.scheme != "http" && agent.scheme != "https" {
                return Err(ConfigError::ValidationError(format!(
                    "agents.{} scheme must be http or https, got '{}'",
                    key, agent.scheme
                )));
            }
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Resolve the selection model provider, reading secrets from the environment
    pub fn selection_provider(&self) -> Result<Provider, ConfigError> {
        match &self.selector.provider {
            ProviderConfig::Ollama { base_url, model } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
            }),
            ProviderConfig::OpenAI {
                api_key_env,
                api_base,
                model,
            } => {
                let api_key = std::env::var(api_key_env)
                    .map_err(|_| ConfigError::MissingEnvVar(api_key_env.clone()))?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.clone(),
                })
            }
        }
    }

    /// Socket address string the gateway binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct RelayConfigManager {
    config: Arc<ArcSwap<RelayConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
    updates: Arc<watch::Sender<Arc<RelayConfig>>>,
}

impl RelayConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Convert to absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = RelayConfig::load(&path)?;
        Ok(Self::build(config, path))
    }

    /// Create a config manager directly from a config (useful for testing)
    /// This won't have file watching capabilities.
    pub fn from_config(config: RelayConfig) -> Self {
        Self::build(config, PathBuf::from("test-config.toml"))
    }

    fn build(config: RelayConfig, config_path: PathBuf) -> Self {
        let config = Arc::new(config);
        let (tx, _rx) = watch::channel(Arc::clone(&config));
        Self {
            config: Arc::new(ArcSwap::new(config)),
            config_path,
            watcher: RwLock::new(None),
            updates: Arc::new(tx),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<RelayConfig> {
        self.config.load_full()
    }

    /// Receive every configuration accepted after this call
    pub fn subscribe(&self) -> watch::Receiver<Arc<RelayConfig>> {
        self.updates.subscribe()
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = RelayConfig::load(&self.config_path)?;
        Self::publish(&self.config, &self.updates, new_config);

        info!("Configuration reloaded successfully");
        Ok(())
    }

    fn publish(
        config: &ArcSwap<RelayConfig>,
        updates: &watch::Sender<Arc<RelayConfig>>,
        new_config: RelayConfig,
    ) {
        let new_config = Arc::new(new_config);
        config.store(Arc::clone(&new_config));
        updates.send_replace(new_config);
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);
        let updates = Arc::clone(&self.updates);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        // Send reload signal (debounced in the receiver)
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the config file's parent directory
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let mut last_reload: Option<std::time::Instant> = None;
            let debounce_duration = Duration::from_millis(500);

            while rx.recv().await.is_some() {
                if last_reload.is_some_and(|at| at.elapsed() < debounce_duration) {
                    continue;
                }

                // Wait a bit for file write to complete
                tokio::time::sleep(Duration::from_millis(100)).await;

                match RelayConfig::load(&config_path) {
                    Ok(new_config) => {
                        Self::publish(&config_arc, &updates, new_config);
                        info!("Configuration hot-reloaded successfully");
                        last_reload = Some(std::time::Instant::now());
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}
