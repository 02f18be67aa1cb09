use crate::llm::LLMClient;
use crate::types::AgentSummary;
use crate::utils::toml_config::SelectionRule;
use async_trait::async_trait;
use std::fmt::Write;

/// Picks the remote agent that should answer a request.
#[async_trait]
pub trait AgentSelector: Send + Sync {
    /// Return the name of exactly one candidate, or `None` when no candidate fits.
    ///
    /// A returned name is always one of `candidates`.
    async fn select(&self, query: &str, candidates: &[AgentSummary]) -> Option<String>;
}

/// Selector that asks an LLM to classify the request against the candidates.
///
/// The model's answer is untrusted: it must equal one candidate name exactly
/// after trimming surrounding whitespace.
pub struct LlmAgentSelector {
    llm: Box<dyn LLMClient>,
    rules: Vec<SelectionRule>,
}

impl LlmAgentSelector {
    /// Creates a new selector with the given LLM client and routing table.
    pub fn new(llm: Box<dyn LLMClient>, rules: Vec<SelectionRule>) -> Self {
        Self { llm, rules }
    }

    /// Instruction prompt listing the candidates and the routing table
    fn system_prompt(&self, candidates: &[AgentSummary]) -> String {
        let mut prompt = String::from(
            "You are a routing assistant. Decide which of the available agents should \
             handle the user's request.\n\nAvailable agents:\n",
        );

        for candidate in candidates {
            let _ = writeln!(prompt, "- {}: {}", candidate.name, candidate.description);
        }

        if !self.rules.is_empty() {
            prompt.push_str("\nRouting rules:\n");
            for rule in &self.rules {
                let _ = writeln!(prompt, "- {} → {}", rule.category, rule.agent);
            }
        }

        prompt.push_str(
            "\nRespond with ONLY the agent name exactly as listed above, nothing else. \
             Do not add punctuation, quotes or explanations.",
        );
        prompt
    }

    /// Accept the model output only if it is exactly one candidate name
    fn validate_selection(output: &str, candidates: &[AgentSummary]) -> Option<String> {
        let trimmed = output.trim();
        candidates
            .iter()
            .find(|candidate| candidate.name == trimmed)
            .map(|candidate| candidate.name.clone())
    }
}

#[async_trait]
impl AgentSelector for LlmAgentSelector {
    async fn select(&self, query: &str, candidates: &[AgentSummary]) -> Option<String> {
        if candidates.is_empty() {
            return None;
        }

        let system_prompt = self.system_prompt(candidates);
        let prompt = format!("User request: {}", query);

        let output = match self.llm.generate_with_system(&system_prompt, &prompt).await {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(model = %self.llm.model_name(), error = %e, "Agent selection call failed");
                return None;
            }
        };

        match Self::validate_selection(&output, candidates) {
            Some(name) => {
                tracing::debug!(agent = %name, "Selected agent");
                Some(name)
            }
            None => {
                tracing::warn!(
                    output = %output,
                    "Selector output does not name an available agent"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AppError, Result};
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct ScriptedLLM {
        response: Result<String>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl LLMClient for ScriptedLLM {
        async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
            self.prompts.lock().push(format!("{}\n{}", system, prompt));
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(AppError::LLM(e.to_string())),
            }
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn selector(response: Result<String>) -> (LlmAgentSelector, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let llm = ScriptedLLM {
            response,
            prompts: Arc::clone(&prompts),
        };
        let rules = vec![SelectionRule {
            category: "coding".to_string(),
            agent: "Coding Agent".to_string(),
        }];
        (LlmAgentSelector::new(Box::new(llm), rules), prompts)
    }

    fn candidates() -> Vec<AgentSummary> {
        vec![
            AgentSummary {
                name: "Coding Agent".to_string(),
                description: "An Agent for Coding".to_string(),
                url: "http://localhost:10010".to_string(),
            },
            AgentSummary {
                name: "Chat Agent".to_string(),
                description: "An Agent for other chatting".to_string(),
                url: "http://localhost:10050".to_string(),
            },
        ]
    }

    #[test]
    fn test_validate_selection_exact_match() {
        let candidates = candidates();
        assert_eq!(
            LlmAgentSelector::validate_selection("Coding Agent", &candidates),
            Some("Coding Agent".to_string())
        );
        assert_eq!(
            LlmAgentSelector::validate_selection("  Chat Agent\n", &candidates),
            Some("Chat Agent".to_string())
        );
    }

    #[test]
    fn test_validate_selection_rejects_near_misses() {
        let candidates = candidates();
        for output in [
            "coding agent",
            "Coding Agent.",
            "I would pick Coding Agent",
            "\"Coding Agent\"",
            "Loan Agent",
            "",
        ] {
            assert_eq!(
                LlmAgentSelector::validate_selection(output, &candidates),
                None,
                "accepted {:?}",
                output
            );
        }
    }

    #[test]
    fn test_prompt_lists_candidates_and_rules() {
        let (selector, _) = selector(Ok(String::new()));
        let prompt = selector.system_prompt(&candidates());

        assert!(prompt.contains("- Coding Agent: An Agent for Coding"));
        assert!(prompt.contains("- Chat Agent: An Agent for other chatting"));
        assert!(prompt.contains("- coding → Coding Agent"));
    }

    #[test]
    fn test_prompt_without_rules_has_no_rule_table() {
        let selector = LlmAgentSelector::new(
            Box::new(ScriptedLLM {
                response: Ok(String::new()),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }),
            Vec::new(),
        );
        assert!(!selector.system_prompt(&candidates()).contains("Routing rules"));
    }

    #[tokio::test]
    async fn test_select_returns_candidate_name() {
        let (selector, prompts) = selector(Ok(" Coding Agent \n".to_string()));
        let selected = selector
            .select("write me a quicksort", &candidates())
            .await;

        assert_eq!(selected.as_deref(), Some("Coding Agent"));
        assert!(prompts.lock()[0].contains("write me a quicksort"));
    }

    #[tokio::test]
    async fn test_select_hallucinated_name_is_none() {
        let (selector, _) = selector(Ok("Weather Agent".to_string()));
        assert_eq!(selector.select("weather?", &candidates()).await, None);
    }

    #[tokio::test]
    async fn test_select_llm_failure_is_none() {
        let (selector, _) = selector(Err(AppError::LLM("connection refused".to_string())));
        assert_eq!(selector.select("hello", &candidates()).await, None);
    }

    #[tokio::test]
    async fn test_select_without_candidates_skips_model() {
        let (selector, prompts) = selector(Ok("Chat Agent".to_string()));
        assert_eq!(selector.select("hello", &[]).await, None);
        assert!(prompts.lock().is_empty());
    }
}
