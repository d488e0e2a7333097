//! OpenRouter provider (OpenAI-compatible chat completions).
//!
//! Secondary in the default ladder. Some routed models return the message
//! content wrapped in prose or markdown, and reasoning-capable models attach
//! an optional `reasoning` field; both are handled here rather than trusted
//! to be well-formed.

use super::{extract_json, map_transport_error, AnswerProvider, GenerationOptions, ProviderError};
use crate::config::OpenRouterConfig;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::info;
use tutor_common::ProviderResult;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

pub struct OpenRouterProvider {
    config: OpenRouterConfig,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    pub fn new(config: OpenRouterConfig, timeout_secs: u64) -> Self {
        Self {
            config,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    fn require_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ProviderError::InvalidKey)
    }

    fn parse_response(&self, v: &Value) -> Result<ProviderResult, ProviderError> {
        let message = v
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| ProviderError::Malformed("no choices[0].message".to_string()))?;

        let answer = message
            .get("content")
            .and_then(|c| c.as_str())
            .unwrap_or("")
            .trim()
            .to_string();
        if answer.is_empty() {
            return Err(ProviderError::Empty);
        }

        let mut result = ProviderResult::new(answer, self.name());

        // Reasoning-capable models attach their trace as one text blob.
        if let Some(reasoning) = message.get("reasoning").and_then(|r| r.as_str()) {
            result.thoughts = reasoning
                .split('\n')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(result)
    }
}

#[async_trait]
impl AnswerProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn is_configured(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .map(|k| !k.is_empty())
            .unwrap_or(false)
    }

    async fn generate(
        &self,
        prompt: &str,
        opts: &GenerationOptions,
    ) -> Result<ProviderResult, ProviderError> {
        let key = self.require_key()?;
        let url = format!("{}/chat/completions", self.config.endpoint);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: opts.max_tokens,
        };

        info!(
            "[>]  openrouter [{}] ({} chars, max {} tokens)",
            self.config.model,
            prompt.len(),
            opts.max_tokens
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream { status, body });
        }

        // Parse tolerantly: body should be JSON, but some routed models have
        // been seen wrapping it in prose.
        let text = response.text().await.map_err(map_transport_error)?;
        let value: Value = serde_json::from_str(&text)
            .or_else(|_| serde_json::from_str(extract_json(&text)))
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let result = self.parse_response(&value)?;
        info!("[<]  openrouter answered ({} chars)", result.answer.len());
        Ok(result)
    }
}
