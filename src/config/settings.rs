// Configuration structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration, read from `~/.mindaura/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub chat: ChatConfig,
    pub gemini: GeminiConfig,
    pub analysis: AnalysisConfig,
}

/// Configuration for the HTTP server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000")
    pub bind_address: String,
    /// Maximum number of concurrent sessions
    pub max_sessions: usize,
    /// Session timeout in minutes
    pub session_timeout_minutes: u64,
    /// Enable API key authentication
    pub auth_enabled: bool,
    /// Valid API keys for authentication
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            max_sessions: 100,
            session_timeout_minutes: 30,
            auth_enabled: false,
            api_keys: vec![],
        }
    }
}

/// Which responder answers chat turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatProvider {
    /// Offline keyword-cued replies
    Scripted,
    /// Gemini API, with the scripted replies as fallback
    Gemini,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub provider: ChatProvider,
    /// Pause before the first word of a reply
    pub thinking_delay_ms: u64,
    /// Random extra pause, up to this many milliseconds
    pub thinking_jitter_ms: u64,
    pub word_delay_ms: u64,
    pub word_jitter_ms: u64,
    /// Optional JSON file replacing the built-in crisis keywords
    pub crisis_keywords_path: Option<PathBuf>,
    /// Seed for reproducible phrase selection
    pub phrase_seed: Option<u64>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: ChatProvider::Scripted,
            thinking_delay_ms: 1000,
            thinking_jitter_ms: 2000,
            word_delay_ms: 50,
            word_jitter_ms: 100,
            crisis_keywords_path: None,
            phrase_seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// User turns required before a conversation can be analyzed
    pub min_user_messages: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_user_messages: 2,
        }
    }
}
