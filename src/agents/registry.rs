//! Registry of remote agents
//!
//! Remote agents are registered by URL: the registry fetches the agent card,
//! binds an [`A2AClient`] to the endpoint and stores both under the card's
//! name. Reads go through an immutable snapshot so a request never observes a
//! half-applied registration.
//!
//! ## Name collisions
//!
//! Registering the same name again from the same URL refreshes the entry. A
//! name already held by a different URL is rejected with
//! [`RegistrationError::DuplicateName`] and the first registration stays.

use crate::a2a::{A2AClient, AgentCardResolver, RemoteAgentClient};
use crate::types::{AgentDescriptor, AgentInfo, AgentSummary, RegistrationError};
use crate::utils::toml_config::RemoteAgentConfig;
use a2a_protocol::AgentCard;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One registered agent: its descriptor and the client bound to it.
#[derive(Clone)]
pub struct RegisteredAgent {
    pub descriptor: AgentDescriptor,
    pub client: Arc<dyn RemoteAgentClient>,
    /// Card as fetched at registration; absent for pre-bound clients
    pub card: Option<AgentCard>,
    pub registered_at: DateTime<Utc>,
}

impl RegisteredAgent {
    fn info(&self) -> AgentInfo {
        AgentInfo {
            summary: AgentSummary::from(&self.descriptor),
            streaming: self
                .card
                .as_ref()
                .map(|card| card.capabilities.streaming)
                .unwrap_or(true),
            registered_at: self.registered_at,
        }
    }
}

/// Immutable view of the registry at one point in time.
pub type RegistrySnapshot = Arc<HashMap<String, RegisteredAgent>>;

/// Outcome of registering a batch of configured endpoints.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub registered: Vec<AgentDescriptor>,
    pub failed: Vec<RegistrationError>,
}

impl DiscoveryReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Registry of remote agents keyed by advertised name
pub struct AgentRegistry {
    http: reqwest::Client,
    resolver: AgentCardResolver,
    agents: ArcSwap<HashMap<String, RegisteredAgent>>,
    /// Serializes writers; readers never take it
    write_lock: Mutex<()>,
}

impl AgentRegistry {
    /// Create an empty registry that fetches cards from `card_path` under each endpoint
    pub fn new(http: reqwest::Client, card_path: impl Into<String>) -> Self {
        Self {
            resolver: AgentCardResolver::new(http.clone(), card_path),
            http,
            agents: ArcSwap::from_pointee(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Fetch the card at `url`, bind a client to it and store both under the card's name
    pub async fn register(&self, url: &str) -> Result<AgentDescriptor, RegistrationError> {
        self.register_with_fallback(url, None).await
    }

    async fn register_with_fallback(
        &self,
        url: &str,
        fallback_description: Option<&str>,
    ) -> Result<AgentDescriptor, RegistrationError> {
        let url = url.trim_end_matches('/');
        let card = self.resolver.get_agent_card(url).await?;

        let description = match (card.description.trim(), fallback_description) {
            ("", Some(fallback)) => fallback.to_string(),
            (description, _) => description.to_string(),
        };

        let descriptor = AgentDescriptor {
            name: card.name.clone(),
            description,
            endpoint_url: url.to_string(),
        };

        let client: Arc<dyn RemoteAgentClient> = Arc::new(A2AClient::new(self.http.clone(), url));

        self.insert(RegisteredAgent {
            descriptor,
            client,
            card: Some(card),
            registered_at: Utc::now(),
        })
    }

    /// Store a pre-bound client without fetching a card
    pub fn register_client(
        &self,
        descriptor: AgentDescriptor,
        client: Arc<dyn RemoteAgentClient>,
    ) -> Result<AgentDescriptor, RegistrationError> {
        self.insert(RegisteredAgent {
            descriptor,
            client,
            card: None,
            registered_at: Utc::now(),
        })
    }

    fn insert(&self, agent: RegisteredAgent) -> Result<AgentDescriptor, RegistrationError> {
        let _guard = self.write_lock.lock();
        let current = self.agents.load_full();
        let name = agent.descriptor.name.clone();

        if let Some(existing) = current.get(&name) {
            if existing.descriptor.endpoint_url != agent.descriptor.endpoint_url {
                warn!(
                    agent = %name,
                    existing_url = %existing.descriptor.endpoint_url,
                    rejected_url = %agent.descriptor.endpoint_url,
                    "Agent name already registered from another endpoint"
                );
                return Err(RegistrationError::DuplicateName {
                    name,
                    existing_url: existing.descriptor.endpoint_url.clone(),
                });
            }
            debug!(agent = %name, "Refreshing agent registration");
        }

        let descriptor = agent.descriptor.clone();
        let mut next = (*current).clone();
        next.insert(name, agent);
        self.agents.store(Arc::new(next));

        info!(
            agent = %descriptor.name,
            url = %descriptor.endpoint_url,
            "Registered remote agent"
        );
        Ok(descriptor)
    }

    /// Register every configured endpoint in key order
    ///
    /// Failures are logged and collected; they never stop the remaining
    /// endpoints from being tried.
    pub async fn discover(
        &self,
        endpoints: &BTreeMap<String, RemoteAgentConfig>,
    ) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();

        for (key, endpoint) in endpoints {
            let url = endpoint.url();
            let fallback = Some(endpoint.description.as_str()).filter(|d| !d.is_empty());

            match self.register_with_fallback(&url, fallback).await {
                Ok(descriptor) => report.registered.push(descriptor),
                Err(e) => {
                    warn!(key = %key, url = %url, error = %e, "Failed to register agent");
                    report.failed.push(e);
                }
            }
        }

        info!(
            registered = report.registered.len(),
            failed = report.failed.len(),
            "Agent discovery finished"
        );
        report
    }

    /// Current snapshot of all registrations
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.agents.load_full()
    }

    /// Candidates for selection. Order is not meaningful.
    pub fn list_available(&self) -> Vec<AgentSummary> {
        let mut agents: Vec<AgentSummary> = self
            .agents
            .load()
            .values()
            .map(|agent| AgentSummary::from(&agent.descriptor))
            .collect();
        agents.sort_by(|a, b| a.name.cmp(&b.name));
        agents
    }

    /// Registry listing with bookkeeping fields
    pub fn agents(&self) -> Vec<AgentInfo> {
        let mut agents: Vec<AgentInfo> = self
            .agents
            .load()
            .values()
            .map(RegisteredAgent::info)
            .collect();
        agents.sort_by(|a, b| a.summary.name.cmp(&b.summary.name));
        agents
    }

    /// Client bound to `name`, if registered
    pub fn client_for(&self, name: &str) -> Option<Arc<dyn RemoteAgentClient>> {
        self.agents
            .load()
            .get(name)
            .map(|agent| Arc::clone(&agent.client))
    }

    pub fn len(&self) -> usize {
        self.agents.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.load().is_empty()
    }
}
