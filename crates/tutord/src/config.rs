//! Configuration management for tutord.
//!
//! Loads settings from /etc/tutord/config.toml or uses defaults. Every
//! threshold that changes pipeline behavior lives here as a named field;
//! in particular `min_acceptable_answer_chars` controls how short a provider
//! answer may be before the orchestrator advances to the next provider, and
//! its production-observed value is 50.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/tutord/config.toml";

/// Default config file path for fallback
pub const FALLBACK_CONFIG_PATH: &str = "/var/lib/tutord/config.toml";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    // Localhost only; TLS and public exposure are handled upstream.
    "127.0.0.1:7870".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Pipeline thresholds and pacing constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// A provider answer at or below this many characters is rejected and
    /// the next provider is tried, even if the call itself succeeded.
    #[serde(default = "default_min_acceptable_answer_chars")]
    pub min_acceptable_answer_chars: usize,

    /// Size of each `content` chunk on the stream, in characters.
    #[serde(default = "default_content_chunk_chars")]
    pub content_chunk_chars: usize,

    /// Fixed delay between `content` chunks, in milliseconds.
    #[serde(default = "default_content_chunk_delay_ms")]
    pub content_chunk_delay_ms: u64,

    /// Fixed delay between `thinking` events, in milliseconds.
    #[serde(default = "default_thinking_step_delay_ms")]
    pub thinking_step_delay_ms: u64,

    /// Web-search timeout; search failure is non-fatal.
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,

    /// Per-provider HTTP timeout.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Providers are attempted strictly in this order.
    #[serde(default = "default_provider_priority")]
    pub provider_priority: Vec<String>,
}

fn default_min_acceptable_answer_chars() -> usize {
    50
}

fn default_content_chunk_chars() -> usize {
    6
}

fn default_content_chunk_delay_ms() -> u64 {
    20
}

fn default_thinking_step_delay_ms() -> u64 {
    400
}

fn default_search_timeout_secs() -> u64 {
    5
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_provider_priority() -> Vec<String> {
    vec!["gemini".to_string(), "openrouter".to_string()]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_acceptable_answer_chars: default_min_acceptable_answer_chars(),
            content_chunk_chars: default_content_chunk_chars(),
            content_chunk_delay_ms: default_content_chunk_delay_ms(),
            thinking_step_delay_ms: default_thinking_step_delay_ms(),
            search_timeout_secs: default_search_timeout_secs(),
            provider_timeout_secs: default_provider_timeout_secs(),
            provider_priority: default_provider_priority(),
        }
    }
}

/// Gemini provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            endpoint: default_gemini_endpoint(),
        }
    }
}

/// OpenRouter (OpenAI-compatible) provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openrouter_model")]
    pub model: String,
    #[serde(default = "default_openrouter_endpoint")]
    pub endpoint: String,
}

fn default_openrouter_model() -> String {
    "meta-llama/llama-3.1-70b-instruct".to_string()
}

fn default_openrouter_endpoint() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openrouter_model(),
            endpoint: default_openrouter_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
}

/// Top-level daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutordConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl TutordConfig {
    /// Load configuration, falling back to defaults when no file exists or
    /// the file does not parse. A bad config file must not stop the daemon.
    pub fn load(explicit_path: Option<&Path>) -> Self {
        let candidates: Vec<&Path> = match explicit_path {
            Some(p) => vec![p],
            None => vec![Path::new(CONFIG_PATH), Path::new(FALLBACK_CONFIG_PATH)],
        };

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match fs::read_to_string(path) {
                Ok(contents) => match toml::from_str::<TutordConfig>(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Failed to parse {}: {} - using defaults", path.display(), e);
                        return Self::default();
                    }
                },
                Err(e) => {
                    warn!("Failed to read {}: {} - trying next", path.display(), e);
                }
            }
        }

        info!("No config file found, using defaults");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TutordConfig::default();
        assert_eq!(config.pipeline.min_acceptable_answer_chars, 50);
        assert_eq!(
            config.pipeline.provider_priority,
            vec!["gemini".to_string(), "openrouter".to_string()]
        );
        assert_eq!(config.server.listen_addr, "127.0.0.1:7870");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TutordConfig = toml::from_str(
            r#"
            [pipeline]
            min_acceptable_answer_chars = 80

            [providers.gemini]
            api_key = "k"
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.min_acceptable_answer_chars, 80);
        assert_eq!(config.pipeline.content_chunk_chars, 6);
        assert_eq!(config.providers.gemini.api_key.as_deref(), Some("k"));
        assert_eq!(config.providers.gemini.model, "gemini-2.0-flash");
        assert!(config.providers.openrouter.api_key.is_none());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = TutordConfig::load(Some(Path::new("/nonexistent/tutord.toml")));
        assert_eq!(config.pipeline.min_acceptable_answer_chars, 50);
    }
}
