//! Google Gemini provider.
//!
//! Talks to the native `generateContent` API. Responses are parsed through
//! `serde_json::Value` rather than a rigid struct: candidates may carry
//! several parts, thought parts are optional, and safety-blocked responses
//! omit content entirely.

use super::{map_transport_error, AnswerProvider, GenerationOptions, ProviderError};
use crate::config::GeminiConfig;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::info;
use tutor_common::ProviderResult;

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

pub struct GeminiProvider {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig, timeout_secs: u64) -> Self {
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

    /// Pull answer text and optional thought parts out of a response value.
    fn parse_response(&self, v: &Value) -> Result<ProviderResult, ProviderError> {
        let parts = v
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| ProviderError::Malformed("no candidates[0].content.parts".to_string()))?;

        let mut answer = String::new();
        let mut thoughts = Vec::new();
        for part in parts {
            let text = part.get("text").and_then(|t| t.as_str()).unwrap_or("");
            if text.is_empty() {
                continue;
            }
            if part.get("thought").and_then(|t| t.as_bool()).unwrap_or(false) {
                thoughts.push(text.to_string());
            } else {
                if !answer.is_empty() {
                    answer.push('\n');
                }
                answer.push_str(text);
            }
        }

        if answer.trim().is_empty() {
            return Err(ProviderError::Empty);
        }

        let mut result = ProviderResult::new(answer, self.name());
        result.thoughts = thoughts;
        Ok(result)
    }
}

#[async_trait]
impl AnswerProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
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
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint, self.config.model
        );

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: opts.max_tokens,
            },
        };

        info!(
            "[>]  gemini [{}] ({} chars, max {} tokens)",
            self.config.model,
            prompt.len(),
            opts.max_tokens
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream { status, body });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let result = self.parse_response(&value)?;
        info!(
            "[<]  gemini answered ({} chars, {} thought parts)",
            result.answer.len(),
            result.thoughts.len()
        );
        Ok(result)
    }
}
