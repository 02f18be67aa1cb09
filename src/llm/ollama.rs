use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
};

const DEFAULT_PORT: u16 = 11434;

pub struct OllamaClient {
    client: Ollama,
    model: String,
}

impl OllamaClient {
    /// Connect to the Ollama server at `base_url` (scheme, host and optional port)
    pub fn new(http: reqwest::Client, base_url: &str, model: String) -> Result<Self> {
        let url = reqwest::Url::parse(base_url).map_err(|e| {
            AppError::Configuration(format!("Invalid Ollama base URL '{}': {}", base_url, e))
        })?;
        let host = url.host_str().ok_or_else(|| {
            AppError::Configuration(format!("Ollama base URL '{}' has no host", base_url))
        })?;
        let port = url.port().unwrap_or(DEFAULT_PORT);

        let client = Ollama::new_with_client(format!("{}://{}", url.scheme(), host), port, http);

        Ok(Self { client, model })
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let messages = vec![
            ChatMessage::system(system.to_string()),
            ChatMessage::user(prompt.to_string()),
        ];

        let request = ChatMessageRequest::new(self.model.clone(), messages);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
