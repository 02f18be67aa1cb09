//! LLM Provider Clients and Abstractions
//!
//! The selector treats the model as a black-box classifier: it sends one
//! system prompt plus the user's request and gets back free text. This module
//! hides the provider behind [`LLMClient`] so that classifier can be any
//! supported backend, or a mock in tests.
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `openai` - OpenAI API and compatible endpoints
//! - `ollama` - Local Ollama server
//!
//! # Example
//!
//! ```ignore
//! use relay::llm::{LLMClientFactory, Provider};
//! use std::time::Duration;
//!
//! let factory = LLMClientFactory::new(provider, Duration::from_secs(30));
//! let client = factory.create_default()?;
//!
//! let answer = client.generate_with_system("Answer tersely.", "What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, LLMClientFactory, Provider};
