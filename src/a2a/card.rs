use crate::types::RegistrationError;
use a2a_protocol::AgentCard;

/// Fetches agent cards from the well-known path under an endpoint URL.
#[derive(Clone)]
pub struct AgentCardResolver {
    http: reqwest::Client,
    card_path: String,
}

impl AgentCardResolver {
    pub fn new(http: reqwest::Client, card_path: impl Into<String>) -> Self {
        let card_path = card_path.into();
        let card_path = if card_path.starts_with('/') {
            card_path
        } else {
            format!("/{}", card_path)
        };
        Self { http, card_path }
    }

    /// Full URL of the card for an endpoint.
    pub fn card_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.card_path)
    }

    /// Fetch and parse the card advertised by `base_url`.
    ///
    /// Network failures and non-2xx statuses are `Unreachable`; a body that
    /// is not a card, or a card without a name, is `MalformedDescriptor`.
    pub async fn get_agent_card(&self, base_url: &str) -> Result<AgentCard, RegistrationError> {
        let card_url = self.card_url(base_url);

        let response = self.http.get(&card_url).send().await.map_err(|e| {
            RegistrationError::Unreachable {
                url: base_url.to_string(),
                reason: e.to_string(),
            }
        })?;

        if !response.status().is_success() {
            return Err(RegistrationError::Unreachable {
                url: base_url.to_string(),
                reason: format!("GET {} returned {}", card_url, response.status()),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RegistrationError::Unreachable {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        let card: AgentCard =
            serde_json::from_slice(&body).map_err(|e| RegistrationError::MalformedDescriptor {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        if card.name.trim().is_empty() {
            return Err(RegistrationError::MalformedDescriptor {
                url: base_url.to_string(),
                reason: "card has an empty name".to_string(),
            });
        }

        Ok(card)
    }
}
