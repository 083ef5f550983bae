//! Generator settings, validated once at start-up

use crate::errors::ConfigError;
use crate::mock::MockConfig;
use crate::types::ModelParameters;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-4-turbo";
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;

/// Which generator backs the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Mock,
    OpenRouter,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Mock => write!(f, "mock"),
            ProviderKind::OpenRouter => write!(f, "openrouter"),
        }
    }
}

/// Everything needed to build a generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub provider: ProviderKind,
    /// Gateway credential; absent means the mock generator is used
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Total number of attempts per request
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub sampling: ModelParameters,
    /// Optional attribution headers
    pub referer: Option<String>,
    pub app_title: Option<String>,
    pub mock: MockConfig,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Mock,
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            sampling: ModelParameters::default(),
            referer: None,
            app_title: Some("Flashcard Generator".to_string()),
            mock: MockConfig::default(),
        }
    }
}

impl GeneratorSettings {
    /// Reject settings that cannot work, before anything is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sampling.validate()?;

        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be greater than zero".to_string()));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid("max_retries must be at least 1".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Missing("model"));
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ConfigError::Invalid(
                "api_url must start with http:// or https://".to_string(),
            ));
        }

        self.mock.validate()
    }

    /// Non-empty API key, if configured
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Copy safe for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.api_key.is_some() {
            copy.api_key = Some("********".to_string());
        }
        copy
    }
}
