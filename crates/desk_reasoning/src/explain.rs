//! Explanation engine: one human-readable sentence per tick.
//!
//! Tries the configured LLM once, bounded by `request_timeout`, and falls
//! back to [`explain_fallback`] on any failure. Nothing here ever returns
//! an error to the control loop.

use crate::api_types::Message;
use crate::fallback::explain_fallback;
use crate::llm::{CompletionParams, LlmClient};
use crate::prompts::{ContextAssembler, SYSTEM_PROMPT};
use crate::providers::LlmProvider;
use desk_core::{Action, LlmConfig, SensorReading};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplanationSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub text: String,
    pub source: ExplanationSource,
}

pub struct ExplanationEngine {
    client: Option<Arc<dyn LlmClient>>,
    params: CompletionParams,
    timeout: Duration,
}

impl ExplanationEngine {
    /// Fallback-only engine.
    pub fn disabled() -> Self {
        let cfg = LlmConfig::default();
        Self {
            client: None,
            params: CompletionParams::from(&cfg),
            timeout: cfg.request_timeout(),
        }
    }

    pub fn with_client(
        client: Arc<dyn LlmClient>,
        params: CompletionParams,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Some(client),
            params,
            timeout,
        }
    }

    /// Remote calls only when `enabled` and the provider is recognised and constructible.
    pub fn from_config(cfg: &LlmConfig) -> Self {
        let mut engine = Self {
            client: None,
            params: CompletionParams::from(cfg),
            timeout: cfg.request_timeout(),
        };
        if !cfg.enabled {
            tracing::debug!("LLM explanations disabled, using rule-based fallback");
            return engine;
        }
        let Some(provider) = LlmProvider::parse(&cfg.provider) else {
            tracing::warn!(
                "Unknown LLM provider '{}', using rule-based explanations",
                cfg.provider
            );
            return engine;
        };
        match provider.build_client(cfg) {
            Ok(client) => {
                tracing::info!(
                    "LLM explanations via {} (model {}, timeout {:?})",
                    client.name(),
                    cfg.model,
                    engine.timeout
                );
                engine.client = Some(client);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not initialise {:?} client ({:#}), using rule-based explanations",
                    provider,
                    e
                );
            }
        }
        engine
    }

    pub fn is_remote(&self) -> bool {
        self.client.is_some()
    }

    /// Always returns non-empty text.
    pub async fn explain(&self, reading: &SensorReading, actions: &[Action]) -> String {
        self.explain_detailed(reading, actions).await.text
    }

    pub async fn explain_detailed(
        &self,
        reading: &SensorReading,
        actions: &[Action],
    ) -> Explanation {
        match self.try_remote(reading, actions).await {
            Some(text) => Explanation {
                text,
                source: ExplanationSource::Remote,
            },
            None => Explanation {
                text: explain_fallback(reading, actions),
                source: ExplanationSource::Fallback,
            },
        }
    }

    /// Run the explanation on the runtime so the caller can keep working.
    ///
    /// Use [`join_explanation`] to collect the result.
    pub fn spawn(
        self: &Arc<Self>,
        reading: SensorReading,
        actions: Vec<Action>,
    ) -> PendingExplanation {
        let engine = Arc::clone(self);
        let (fallback_reading, fallback_actions) = (reading.clone(), actions.clone());
        let handle =
            tokio::spawn(async move { engine.explain_detailed(&reading, &actions).await });
        PendingExplanation {
            handle,
            reading: fallback_reading,
            actions: fallback_actions,
        }
    }

    async fn try_remote(&self, reading: &SensorReading, actions: &[Action]) -> Option<String> {
        let client = self.client.as_ref()?;
        let prompt = ContextAssembler::build_prompt(reading, actions);
        let request = client.complete(SYSTEM_PROMPT, vec![Message::user(prompt)], self.params.clone());

        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(resp)) => {
                let text = resp.text.trim();
                if text.is_empty() {
                    tracing::debug!("{} returned empty text, using fallback", client.name());
                    None
                } else {
                    Some(text.to_string())
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("{} explanation failed ({:#}), using fallback", client.name(), e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "{} explanation timed out after {:?}, using fallback",
                    client.name(),
                    self.timeout
                );
                None
            }
        }
    }
}

/// An explanation running on the tokio runtime.
pub struct PendingExplanation {
    handle: JoinHandle<Explanation>,
    reading: SensorReading,
    actions: Vec<Action>,
}

/// Wait for a spawned explanation; a panicked task degrades to the fallback text.
pub async fn join_explanation(pending: PendingExplanation) -> Explanation {
    match pending.handle.await {
        Ok(explanation) => explanation,
        Err(e) => {
            tracing::warn!("Explanation task failed ({}), using fallback", e);
            Explanation {
                text: explain_fallback(&pending.reading, &pending.actions),
                source: ExplanationSource::Fallback,
            }
        }
    }
}
