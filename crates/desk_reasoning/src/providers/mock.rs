//! Mock LLM provider: deterministic responses for testing without a backend.

use crate::api_types::{Message, MessagesResponse};
use crate::llm::{CompletionParams, LlmClient};
use anyhow::Result;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
    delay: Duration,
}

impl MockProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            delay: Duration::ZERO,
        }
    }

    /// Respond only after `delay`, to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl LlmClient for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        messages: Vec<Message>,
        _params: CompletionParams,
    ) -> Result<MessagesResponse> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        // Echo the action line so callers can tell which tick was explained
        let actions = messages
            .iter()
            .rev()
            .flat_map(|m| m.content.lines())
            .find_map(|l| l.strip_prefix("Actions: "))
            .unwrap_or("none");
        Ok(MessagesResponse {
            text: format!("(Mock {} Response) Actions taken: {}.", self.model, actions),
            stop_reason: Some("end_turn".to_string()),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_complete() {
        let provider = MockProvider::new("test-model");
        let resp = provider
            .complete(
                "system",
                vec![Message::user("Reading: ...\nActions: turn_on_fan")],
                CompletionParams::default(),
            )
            .await
            .unwrap();
        assert!(resp.text.contains("Mock"));
        assert!(resp.text.contains("test-model"));
        assert!(resp.text.contains("turn_on_fan"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_delay() {
        let provider = MockProvider::new("slow").with_delay(Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        provider
            .complete("system", vec![], CompletionParams::default())
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
