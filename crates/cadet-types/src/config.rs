//! Configuration types for cadet.
//!
//! `AppConfig` represents the optional `config.toml` that tunes flag
//! resolution, the conversation backend and the chat loop. Every field has a
//! default, so an empty or missing file yields a working configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration, loaded from `~/.cadet/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub flags: FlagSettings,

    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub chat: ChatSettings,
}

/// Which flags to resolve, their fallbacks, and how long to wait for the
/// flag service to become ready.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagSettings {
    /// Targeting key of the evaluation context.
    pub targeting_key: String,
    pub prompt_key: String,
    pub prompt_default: String,
    pub model_key: String,
    pub model_default: String,
    /// Number of readiness polls before giving up. `0` disables waiting.
    pub readiness_attempts: u32,
    pub readiness_interval_ms: u64,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl FlagSettings {
    pub fn readiness_interval(&self) -> Duration {
        Duration::from_millis(self.readiness_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The configuration used when no flag could be resolved at all.
    pub fn defaults(&self) -> ResolvedConfig {
        ResolvedConfig {
            system_prompt: self.prompt_default.clone(),
            model_name: self.model_default.clone(),
        }
    }
}

impl Default for FlagSettings {
    fn default() -> Self {
        Self {
            targeting_key: "your-user-id".to_string(),
            prompt_key: "system-prompt".to_string(),
            prompt_default: "You are an unhelpful copilot. Respond in the style of Q from Star Trek the Next Generation.".to_string(),
            model_key: "model".to_string(),
            model_default: "GPT-4o Chat Model".to_string(),
            readiness_attempts: 10,
            readiness_interval_ms: 500,
            base_url: "https://bucketing-api.devcycle.com".to_string(),
            request_timeout_secs: 5,
        }
    }
}

/// Where the conversation backend lives and how long calls may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
    /// Human-readable name given to the conversation.
    pub session_name: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Longest gap allowed between two envelopes of a streaming call.
    /// `0` disables the idle limit.
    pub stream_idle_timeout_secs: u64,
}

impl BackendSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stream_idle_timeout(&self) -> Option<Duration> {
        (self.stream_idle_timeout_secs > 0).then(|| Duration::from_secs(self.stream_idle_timeout_secs))
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1000".to_string(),
            session_name: "Star Trek Co-Pilot Chat".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            stream_idle_timeout_secs: 120,
        }
    }
}

/// Behavior of the interactive loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Question streamed before the first prompt. Empty disables it.
    pub opening_question: String,
}

impl ChatSettings {
    pub fn opening_question(&self) -> Option<&str> {
        let question = self.opening_question.trim();
        (!question.is_empty()).then_some(self.opening_question.as_str())
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            opening_question: "Hello, who are you?".to_string(),
        }
    }
}

/// Values resolved from the flag service at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub system_prompt: String,
    pub model_name: String,
}
