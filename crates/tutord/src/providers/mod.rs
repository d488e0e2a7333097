//! AI provider abstraction.
//!
//! Each provider module exposes a struct implementing [`AnswerProvider`].
//! Providers are loosely trusted: their JSON is parsed tolerantly at this
//! boundary (wrapped prose, missing optional fields) and anything still
//! unusable becomes a [`ProviderError`], which the orchestrator treats as
//! "try the next provider".

pub mod gemini;
pub mod openrouter;

use crate::config::TutordConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;
use tutor_common::ProviderResult;

pub use gemini::GeminiProvider;
pub use openrouter::OpenRouterProvider;

/// Per-request generation parameters handed to a provider.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Output cap derived from the query type.
    pub max_tokens: u32,
    /// Ask the provider for an explicit reasoning trace if it supports one.
    pub thinking_mode: bool,
    /// A live-search snippet is present in the prompt context.
    pub search_required: bool,
}

/// Errors a provider call may produce. Transport and content-quality
/// failures are deliberately one enum: the orchestrator reacts to both the
/// same way.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("missing or invalid API key")]
    InvalidKey,

    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("empty response")]
    Empty,
}

/// Unified interface for AI text-generation backends.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Identifier reported in results and logs.
    fn name(&self) -> &str;

    /// Quick local check (configured key, endpoint set).
    fn is_configured(&self) -> bool;

    /// One generation attempt. No internal retries: a failure here moves the
    /// orchestrator to the next provider.
    async fn generate(
        &self,
        prompt: &str,
        opts: &GenerationOptions,
    ) -> Result<ProviderResult, ProviderError>;
}

/// Build the provider ladder in configured priority order, skipping names
/// with no usable configuration.
pub fn from_config(config: &TutordConfig) -> Vec<Arc<dyn AnswerProvider>> {
    let mut providers: Vec<Arc<dyn AnswerProvider>> = Vec::new();

    for name in &config.pipeline.provider_priority {
        match name.as_str() {
            "gemini" => {
                let p = GeminiProvider::new(
                    config.providers.gemini.clone(),
                    config.pipeline.provider_timeout_secs,
                );
                if p.is_configured() {
                    providers.push(Arc::new(p));
                } else {
                    warn!("[-]  Provider 'gemini' has no API key, skipping");
                }
            }
            "openrouter" => {
                let p = OpenRouterProvider::new(
                    config.providers.openrouter.clone(),
                    config.pipeline.provider_timeout_secs,
                );
                if p.is_configured() {
                    providers.push(Arc::new(p));
                } else {
                    warn!("[-]  Provider 'openrouter' has no API key, skipping");
                }
            }
            other => warn!("[-]  Unknown provider '{}' in priority list, skipping", other),
        }
    }

    providers
}

/// Map a reqwest failure onto the provider error taxonomy.
pub(crate) fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Extract the JSON object from text that may have prose around it.
pub(crate) fn extract_json(text: &str) -> &str {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return &text[start..=end];
        }
    }
    text
}
