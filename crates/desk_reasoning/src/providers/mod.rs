pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;

use crate::llm::LlmClient;
use anyhow::{Context, Result};
use desk_core::LlmConfig;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

pub use anthropic::AnthropicClient;
pub use mock::MockProvider;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// Providers the explanation engine knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Ollama,
    Anthropic,
    Mock,
}

impl LlmProvider {
    /// Case-insensitive; anything unrecognised is `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "ollama" => Some(Self::Ollama),
            "anthropic" => Some(Self::Anthropic),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }

    pub fn build_client(self, cfg: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
        let endpoint = cfg.endpoint.as_deref();
        let key_env = cfg.api_key_env.as_deref();
        let timeout = cfg.request_timeout();
        Ok(match self {
            Self::OpenAi => Arc::new(OpenAiClient::new(&cfg.model, endpoint, key_env, timeout)?),
            Self::Ollama => Arc::new(OllamaClient::new(&cfg.model, endpoint, timeout)?),
            Self::Anthropic => {
                Arc::new(AnthropicClient::new(&cfg.model, endpoint, key_env, timeout)?)
            }
            Self::Mock => Arc::new(MockProvider::new(&cfg.model)),
        })
    }
}

/// HTTP client bounded by `timeout`. Loopback endpoints bypass any system proxy.
pub(crate) fn http_client(base_url: &str, timeout: Duration) -> Result<Client> {
    let mut builder = Client::builder().timeout(timeout);
    if is_loopback(base_url) {
        builder = builder.no_proxy();
    }
    builder.build().context("Failed to build HTTP client")
}

fn is_loopback(base_url: &str) -> bool {
    reqwest::Url::parse(base_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]")
}
