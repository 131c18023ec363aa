use super::http_client;
use crate::api_types::{Message, MessagesResponse, Role};
use crate::llm::{CompletionParams, LlmClient};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const API_VERSION: &str = "2023-06-01";
/// The messages API requires max_tokens; explanations are one sentence.
const DEFAULT_MAX_TOKENS: u32 = 256;

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(
        model: &str,
        base_url: Option<&str>,
        api_key_env: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        let key_var = api_key_env.unwrap_or(DEFAULT_API_KEY_ENV);
        let api_key = env::var(key_var).with_context(|| format!("{key_var} is not set"))?;
        let base_url = base_url
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: http_client(&base_url, timeout)?,
            api_key,
            base_url,
            model: model.to_string(),
        })
    }
}

pub(crate) fn build_messages_payload(
    model: &str,
    system: &str,
    messages: &[Message],
    params: &CompletionParams,
) -> Value {
    let messages: Vec<Value> = messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            json!({"role": role, "content": m.content})
        })
        .collect();

    json!({
        "model": model,
        "system": system,
        "messages": messages,
        "max_tokens": params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "temperature": params.temperature,
    })
}

/// Concatenate every `text` content block.
pub(crate) fn parse_messages_response(resp_json: &Value) -> Result<MessagesResponse> {
    let blocks = resp_json["content"]
        .as_array()
        .context("Response has no content array")?;
    let text = blocks
        .iter()
        .filter(|b| b["type"] == "text")
        .filter_map(|b| b["text"].as_str())
        .collect::<Vec<_>>()
        .join("");
    let stop_reason = resp_json["stop_reason"].as_str().map(|s| s.to_string());

    Ok(MessagesResponse { text, stop_reason })
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    #[tracing::instrument(skip(self, system, messages, params), fields(model = %self.model))]
    async fn complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        params: CompletionParams,
    ) -> Result<MessagesResponse> {
        let url = format!("{}/v1/messages", self.base_url);
        let payload = build_messages_payload(&self.model, system, &messages, &params);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to Anthropic")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API Error ({}): {}", status, error_text);
        }

        let json: Value = response
            .json()
            .await
            .context("Anthropic response body is not JSON")?;
        parse_messages_response(&json)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
