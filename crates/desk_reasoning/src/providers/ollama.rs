//! Ollama LLM Provider
//!
//! Ollama exposes an OpenAI-compatible API at localhost:11434/v1,
//! so we reuse the OpenAI payload and response handling.

use super::http_client;
use super::openai::{build_chat_payload, parse_openai_response};
use crate::api_types::{Message, MessagesResponse};
use crate::llm::{CompletionParams, LlmClient};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(model: &str, base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let base_url = base_url
            .map(str::to_string)
            .or_else(|| env::var("OLLAMA_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: http_client(&base_url, timeout)?,
            base_url,
            model: model.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    #[tracing::instrument(skip(self, system, messages, params), fields(model = %self.model))]
    async fn complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        params: CompletionParams,
    ) -> Result<MessagesResponse> {
        let payload = build_chat_payload(&self.model, system, &messages, &params);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API Error ({}): {}", status, error_text);
        }

        let resp_json: Value = response
            .json()
            .await
            .context("Ollama response body is not JSON")?;
        parse_openai_response(&resp_json)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new("llama3", Some("http://localhost:11434/v1/"), Duration::from_secs(1)).unwrap();
        assert_eq!(client.model, "llama3");
        assert_eq!(client.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_explicit_endpoint_wins() {
        let client = OllamaClient::new("llama3", Some("http://gpu-box:11434/v1"), Duration::from_secs(1)).unwrap();
        assert!(client.base_url.contains("gpu-box"));
    }
}
