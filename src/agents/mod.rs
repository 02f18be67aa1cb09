pub mod registry;
pub mod selector;

// Re-export commonly used types
pub use registry::{AgentRegistry, DiscoveryReport, RegisteredAgent, RegistrySnapshot};
pub use selector::{AgentSelector, LlmAgentSelector};
