//! Configuration for OpenRouter connector

use flashgen_core::config::{
    GeneratorSettings, DEFAULT_API_URL, DEFAULT_MAX_RETRIES, DEFAULT_MODEL,
    DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_TIMEOUT_MS,
};
use flashgen_core::errors::GatewayError;
use flashgen_core::types::ModelParameters;

/// OpenRouter API configuration
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// OpenRouter API key
    pub api_key: String,
    /// Full chat-completions endpoint URL
    pub api_url: String,
    /// Model used unless overridden with `set_model`
    pub default_model: String,
    /// Sampling parameters used unless overridden
    pub default_params: ModelParameters,
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Total number of attempts per request
    pub max_retries: u32,
    /// First backoff delay; doubles on each further attempt
    pub retry_base_delay_ms: u64,
    /// Sent as `HTTP-Referer`
    pub referer: Option<String>,
    /// Sent as `X-Title`
    pub app_title: Option<String>,
}

impl OpenRouterConfig {
    /// Create a new OpenRouter config with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            default_params: ModelParameters::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            referer: None,
            app_title: None,
        }
    }

    /// Build from validated generator settings
    pub fn from_settings(settings: &GeneratorSettings) -> Result<Self, GatewayError> {
        let api_key = settings
            .credential()
            .ok_or_else(|| GatewayError::Config("OpenRouter API key is required".to_string()))?;

        Ok(Self {
            api_key: api_key.to_string(),
            api_url: settings.api_url.clone(),
            default_model: settings.model.clone(),
            default_params: settings.sampling,
            timeout_ms: settings.timeout_ms,
            max_retries: settings.max_retries,
            retry_base_delay_ms: settings.retry_base_delay_ms,
            referer: settings.referer.clone(),
            app_title: settings.app_title.clone(),
        })
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the endpoint URL (for proxies or compatible services)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set sampling parameters
    pub fn with_params(mut self, params: ModelParameters) -> Self {
        self.default_params = params;
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set maximum attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base backoff delay
    pub fn with_retry_base_delay(mut self, retry_base_delay_ms: u64) -> Self {
        self.retry_base_delay_ms = retry_base_delay_ms;
        self
    }

    /// Set attribution headers
    pub fn with_attribution(mut self, referer: Option<String>, app_title: Option<String>) -> Self {
        self.referer = referer;
        self.app_title = app_title;
        self
    }

    /// Fail fast on settings the client cannot work with
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.api_key.trim().is_empty() {
            return Err(GatewayError::Config("OpenRouter API key is required".to_string()));
        }
        if self.default_model.trim().is_empty() {
            return Err(GatewayError::Config("model name cannot be empty".to_string()));
        }
        if self.max_retries == 0 {
            return Err(GatewayError::Config("max_retries must be at least 1".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(GatewayError::Config("timeout must be greater than zero".to_string()));
        }
        self.default_params.validate()?;
        Ok(())
    }
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self::new("") // Empty API key - must be set by user
    }
}
