//! OpenAI-compatible chat completions provider.
//!
//! Also used for any server that speaks `/chat/completions` (vLLM,
//! llama.cpp, LM Studio). The API key is optional for local servers.

use super::http_client;
use crate::api_types::{Message, MessagesResponse, Role};
use crate::llm::{CompletionParams, LlmClient};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        model: &str,
        base_url: Option<&str>,
        api_key_env: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = env::var(api_key_env.unwrap_or(DEFAULT_API_KEY_ENV))
            .ok()
            .filter(|k| !k.trim().is_empty());
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

/// Chat payload in OpenAI format; the system prompt becomes the first message.
pub(crate) fn build_chat_payload(
    model: &str,
    system: &str,
    messages: &[Message],
    params: &CompletionParams,
) -> Value {
    let mut chat = vec![json!({"role": "system", "content": system})];
    chat.extend(messages.iter().map(|m| {
        let role = match m.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        json!({"role": role, "content": m.content})
    }));

    let mut payload = json!({
        "model": model,
        "messages": chat,
        "temperature": params.temperature,
        "stream": false,
    });
    if let Some(max_tokens) = params.max_tokens {
        payload["max_tokens"] = json!(max_tokens);
    }
    payload
}

/// Parse a non-streaming OpenAI-compatible JSON response.
pub(crate) fn parse_openai_response(resp_json: &Value) -> Result<MessagesResponse> {
    let choice = &resp_json["choices"][0];
    let text = choice["message"]["content"]
        .as_str()
        .context("Response has no choices[0].message.content string")?
        .to_string();
    let stop_reason = choice["finish_reason"].as_str().map(|s| s.to_string());

    Ok(MessagesResponse { text, stop_reason })
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    #[tracing::instrument(skip(self, system, messages, params), fields(model = %self.model))]
    async fn complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        params: CompletionParams,
    ) -> Result<MessagesResponse> {
        let payload = build_chat_payload(&self.model, system, &messages, &params);
        let url = format!("{}/chat/completions", self.base_url);

        let mut request = self.client.post(&url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .context("Failed to send request to OpenAI-compatible endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "OpenAI API Error ({}): {}",
                status,
                error_text.chars().take(200).collect::<String>()
            );
        }

        let resp_json: Value = response
            .json()
            .await
            .context("OpenAI response body is not JSON")?;
        parse_openai_response(&resp_json)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
