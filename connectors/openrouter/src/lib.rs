//! OpenRouter connector for Flashgen flashcard generation

use flashgen_core::prelude::*;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

mod config;
mod generator;
mod models;

pub use config::OpenRouterConfig;
pub use generator::{OpenRouterGenerator, FLASHCARD_SYSTEM_PROMPT};
use models::*;

/// Chat-completion client with structured output and retry handling.
///
/// Prompt and schema setters take `&mut self`, so a client cannot be
/// reconfigured while a request borrowed from it is in flight.
pub struct OpenRouterClient {
    client: Client,
    config: OpenRouterConfig,
    model: String,
    params: ModelParameters,
    base_system_prompt: Option<String>,
    system_prompt: Option<String>,
    response_schema: Option<Value>,
}

impl OpenRouterClient {
    /// Create a new OpenRouter client
    pub fn new(config: OpenRouterConfig) -> Result<Self, GatewayError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "OpenRouter client initialized with model: {}, timeout: {}ms, maxRetries: {}",
            config.default_model, config.timeout_ms, config.max_retries
        );

        Ok(Self {
            client,
            model: config.default_model.clone(),
            params: config.default_params,
            config,
            base_system_prompt: None,
            system_prompt: None,
            response_schema: None,
        })
    }

    /// Model used for the next request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sampling parameters used for the next request
    pub fn params(&self) -> ModelParameters {
        self.params
    }

    /// Effective system prompt, including format instructions
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Whether replies are decoded as JSON
    pub fn is_structured(&self) -> bool {
        self.response_schema.is_some()
    }

    /// Set the system prompt for subsequent requests
    pub fn set_system_prompt(&mut self, text: &str) -> Result<(), GatewayError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GatewayError::InvalidRequest("System message cannot be empty".to_string()));
        }
        self.base_system_prompt = Some(text.to_string());
        self.compose_system_prompt();
        debug!("System message set");
        Ok(())
    }

    /// Switch to structured output, describing `schema` to the model
    pub fn set_structured_output(&mut self, schema: Value) {
        self.response_schema = Some(schema);
        self.compose_system_prompt();
        debug!("Response format configured");
    }

    /// Return to plain-text replies
    pub fn clear_structured_output(&mut self) {
        self.response_schema = None;
        self.compose_system_prompt();
    }

    /// Change the model and optionally merge new sampling parameters
    pub fn set_model(&mut self, name: &str, params: Option<ModelParameters>) -> Result<(), GatewayError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatewayError::InvalidRequest("Model name cannot be empty".to_string()));
        }
        if let Some(params) = params {
            params.validate()?;
            self.params = params;
        }
        self.model = name.to_string();
        info!("Model set to: {}", self.model);
        Ok(())
    }

    /// Clear the system prompt
    pub fn reset_messages(&mut self) {
        self.base_system_prompt = None;
        self.system_prompt = None;
        debug!("Messages reset");
    }

    /// Restore model, parameters and prompts to the configured defaults
    pub fn reset_all(&mut self) {
        self.model = self.config.default_model.clone();
        self.params = self.config.default_params;
        self.base_system_prompt = None;
        self.system_prompt = None;
        self.response_schema = None;
        debug!("All configuration reset to defaults");
    }

    fn compose_system_prompt(&mut self) {
        let instructions = self.response_schema.as_ref().map(format_instructions);
        self.system_prompt = match (&self.base_system_prompt, instructions) {
            (Some(base), Some(instructions)) => Some(format!("{}\n\n{}", base, instructions)),
            (Some(base), None) => Some(base.clone()),
            (None, Some(instructions)) => Some(instructions),
            (None, None) => None,
        };
    }

    /// Build the request that `send` would dispatch
    pub fn build_request(&self, user_message: &str) -> Result<ChatRequest, GatewayError> {
        let user_message = user_message.trim();
        if user_message.is_empty() {
            return Err(GatewayError::InvalidRequest("User message cannot be empty".to_string()));
        }

        let mut request = ChatRequest::new(self.model.clone(), self.params)
            .with_structured_output(self.is_structured());
        if let Some(system_prompt) = &self.system_prompt {
            request = request.with_message(ChatMessage::system(system_prompt.clone()));
        }
        request = request.with_message(ChatMessage::user(user_message));

        request.validate()?;
        Ok(request)
    }

    /// Send a message and return the decoded reply without interpreting it
    pub async fn send_raw(&self, user_message: &str) -> Result<GatewayResponse, GatewayError> {
        let request = self.build_request(user_message)?;
        self.execute_with_retry(&request).await
    }

    /// Send a message and decode the first candidate into `T`.
    ///
    /// In structured mode the candidate text is parsed as JSON; otherwise it
    /// is decoded as a JSON string, so `T = String` yields the raw text.
    pub async fn send<T: DeserializeOwned>(&self, user_message: &str) -> Result<T, GatewayError> {
        let response = self.send_raw(user_message).await?;
        let content = response.first_content().unwrap_or_default();

        if self.is_structured() {
            let cleaned = strip_code_fences(content);
            serde_json::from_str(cleaned).map_err(|e| {
                error!("Failed to parse JSON response: {}", e);
                GatewayError::Decode(format!("Failed to parse JSON response: {}", e))
            })
        } else {
            serde_json::from_value(Value::String(content.to_string()))
                .map_err(|e| GatewayError::Decode(e.to_string()))
        }
    }

    /// Run the attempt loop: retry transient failures with exponential backoff
    async fn execute_with_retry(&self, request: &ChatRequest) -> Result<GatewayResponse, GatewayError> {
        let max_attempts = self.config.max_retries;
        let mut attempt = 1;

        loop {
            debug!("Request attempt {}/{}", attempt, max_attempts);

            let err = match self.execute_once(request).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            warn!("Attempt {} failed: {}", attempt, err);

            if !err.is_retryable() {
                return Err(err);
            }

            if attempt >= max_attempts {
                return Err(GatewayError::MaxRetriesExceeded {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.backoff_delay(attempt);
            info!("Retrying in {}ms...", delay.as_millis());
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Delay after the `attempt`-th failure: base * 2^(attempt-1)
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let multiplier = 2_u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.config.retry_base_delay_ms.saturating_mul(multiplier))
    }

    /// One HTTP round trip, classified into the gateway error taxonomy
    async fn execute_once(&self, request: &ChatRequest) -> Result<GatewayResponse, GatewayError> {
        debug!("Sending request to {} with model {}", self.config.api_url, request.model);

        let mut builder = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json");
        if let Some(referer) = &self.config.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.config.app_title {
            builder = builder.header("X-Title", title);
        }

        let response = builder
            .json(&ChatCompletionRequest::from(request))
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        if !status.is_success() {
            return Err(classify_status(status, body));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::Transient(
                TransientError::new(
                    TransientKind::InvalidResponse,
                    format!("Invalid API response - malformed body: {}", e),
                )
                .with_status(status.as_u16())
                .with_body(body.clone()),
            )
        })?;

        let response = GatewayResponse::from(parsed);
        if response.candidates.is_empty() {
            return Err(GatewayError::Transient(
                TransientError::new(
                    TransientKind::InvalidResponse,
                    "Invalid API response - no choices returned",
                )
                .with_status(status.as_u16())
                .with_body(body),
            ));
        }

        info!(
            "Request successful, tokens used: {}",
            response
                .usage
                .map(|u| u.total_tokens.to_string())
                .unwrap_or_else(|| "N/A".to_string())
        );

        Ok(response)
    }

    fn classify_transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout { timeout_ms: self.config.timeout_ms }
        } else {
            GatewayError::Transient(TransientError::new(
                TransientKind::Network,
                format!("Network error: {}", err),
            ))
        }
    }
}

/// Map a non-2xx reply to its error class
fn classify_status(status: StatusCode, body: String) -> GatewayError {
    match status {
        StatusCode::UNAUTHORIZED => GatewayError::Auth { body: Some(body) },
        StatusCode::TOO_MANY_REQUESTS => GatewayError::Transient(
            TransientError::new(TransientKind::RateLimit, "Rate limit exceeded")
                .with_status(status.as_u16())
                .with_body(body),
        ),
        _ => {
            let message = OpenRouterError::message_from_body(&body)
                .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
                .unwrap_or_else(|| format!("API request failed with status {}", status.as_u16()));
            GatewayError::Transient(
                TransientError::new(TransientKind::ApiError, message)
                    .with_status(status.as_u16())
                    .with_body(body),
            )
        }
    }
}

/// Format instructions appended to the system prompt in structured mode
fn format_instructions(schema: &Value) -> String {
    let mut text = String::from(
        "CRITICAL: Respond with actual JSON DATA, not a schema definition. Your response must be \
         valid JSON following this structure (but with real values, not schema syntax):\n\n",
    );

    if schema.pointer("/properties/flashcards").is_some() {
        text.push_str("Example format:\n");
        text.push_str(SchemaContract::prompt_example());
        text.push_str("\n\nDo NOT respond with type definitions, schema, or metadata. Only actual data.");
    } else {
        text.push_str(&serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string()));
    }

    text
}

/// Remove a surrounding markdown code fence, if the model added one
fn strip_code_fences(content: &str) -> &str {
    content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, max_retries: u32) -> OpenRouterConfig {
        OpenRouterConfig::new("test-key")
            .with_api_url(format!("{}/chat/completions", server.uri()))
            .with_max_retries(max_retries)
            .with_retry_base_delay(1)
            .with_timeout(2_000)
    }

    fn completion(content: &str) -> Value {
        json!({
            "id": "gen-123",
            "model": "openai/gpt-4-turbo",
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        })
    }

    async fn request_count(server: &MockServer) -> usize {
        server.received_requests().await.map(|r| r.len()).unwrap_or(0)
    }

    #[test]
    fn test_client_requires_api_key() {
        assert!(matches!(
            OpenRouterClient::new(OpenRouterConfig::new("  ")),
            Err(GatewayError::Config(_))
        ));
        assert!(OpenRouterClient::new(OpenRouterConfig::new("test-key")).is_ok());
    }

    #[test]
    fn test_backoff_doubles() {
        let client = OpenRouterClient::new(
            OpenRouterConfig::new("test-key").with_retry_base_delay(1_000),
        )
        .unwrap();
        assert_eq!(client.backoff_delay(1), Duration::from_millis(1_000));
        assert_eq!(client.backoff_delay(2), Duration::from_millis(2_000));
        assert_eq!(client.backoff_delay(3), Duration::from_millis(4_000));
    }

    #[test]
    fn test_structured_prompt_uses_example() {
        let mut client = OpenRouterClient::new(OpenRouterConfig::new("test-key")).unwrap();
        client.set_system_prompt("  Generate flashcards.  ").unwrap();
        assert_eq!(client.system_prompt(), Some("Generate flashcards."));

        client.set_structured_output(SchemaContract::new().describe());
        let prompt = client.system_prompt().unwrap();
        assert!(prompt.starts_with("Generate flashcards."));
        assert!(prompt.contains("actual question text here"));
        assert!(!prompt.contains("maxLength"));

        client.set_structured_output(json!({ "type": "object", "properties": { "answer": { "type": "string" } } }));
        assert!(client.system_prompt().unwrap().contains("\"answer\""));

        client.clear_structured_output();
        assert_eq!(client.system_prompt(), Some("Generate flashcards."));
    }

    #[test]
    fn test_build_request_ordering() {
        let mut client = OpenRouterClient::new(OpenRouterConfig::new("test-key")).unwrap();
        assert!(client.build_request("   ").is_err());

        let request = client.build_request("hello").unwrap();
        assert_eq!(request.messages.len(), 1);
        assert!(!request.structured_output);

        client.set_system_prompt("sys").unwrap();
        client.set_structured_output(SchemaContract::new().describe());
        let request = client.build_request("hello").unwrap();
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1], ChatMessage::user("hello"));
        assert!(request.structured_output);
    }

    #[test]
    fn test_set_model_and_reset() {
        let mut client = OpenRouterClient::new(OpenRouterConfig::new("test-key")).unwrap();
        assert!(client.set_model("", None).is_err());
        assert!(client
            .set_model("other/model", Some(ModelParameters::default().with_top_p(1.5)))
            .is_err());

        client
            .set_model("other/model", Some(ModelParameters::default().with_temperature(0.2)))
            .unwrap();
        client.set_system_prompt("sys").unwrap();
        assert_eq!(client.model(), "other/model");
        assert_eq!(client.params().temperature, 0.2);

        client.reset_messages();
        assert_eq!(client.system_prompt(), None);
        assert_eq!(client.model(), "other/model");

        client.reset_all();
        assert_eq!(client.model(), "openai/gpt-4-turbo");
        assert_eq!(client.params(), ModelParameters::default());
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, String::new()),
            GatewayError::Auth { .. }
        ));
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, String::new()).error_code(),
            "rate_limit"
        );

        let err = classify_status(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error":{"message":"Provider overloaded","code":503}}"#.to_string(),
        );
        match err {
            GatewayError::Transient(e) => {
                assert_eq!(e.kind, TransientKind::ApiError);
                assert_eq!(e.status, Some(503));
                assert_eq!(e.message, "Provider overloaded");
                assert!(e.body.unwrap().contains("overloaded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        match classify_status(StatusCode::BAD_GATEWAY, String::new()) {
            GatewayError::Transient(e) => assert_eq!(e.message, "API request failed with status 502"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_send_plain_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("2 + 2 = 4.")))
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(config_for(&server, 3)).unwrap();
        let reply: String = client.send("What is 2+2?").await.unwrap();
        assert_eq!(reply, "2 + 2 = 4.");
    }

    #[tokio::test]
    async fn test_send_structured() {
        #[derive(Debug, Deserialize)]
        struct Reply {
            flashcards: Vec<Value>,
        }

        let server = MockServer::start().await;
        let content = r#"{"flashcards":[{"front":"Q","back":"A"}]}"#;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({ "response_format": { "type": "json_object" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
            .mount(&server)
            .await;

        let mut client = OpenRouterClient::new(config_for(&server, 3)).unwrap();
        client.set_system_prompt("Generate flashcards.").unwrap();
        client.set_structured_output(SchemaContract::new().describe());

        let reply: Reply = client.send("Some text").await.unwrap();
        assert_eq!(reply.flashcards.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_structured_reply_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("not json at all")))
            .mount(&server)
            .await;

        let mut client = OpenRouterClient::new(config_for(&server, 3)).unwrap();
        client.set_structured_output(SchemaContract::new().describe());

        let err = client.send::<Value>("Some text").await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
        assert_eq!(request_count(&server).await, 1);
    }

    #[tokio::test]
    async fn test_always_transient_exhausts_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(config_for(&server, 4)).unwrap();
        let err = client.send::<String>("hello").await.unwrap_err();

        match err {
            GatewayError::MaxRetriesExceeded { attempts, last } => {
                assert_eq!(attempts, 4);
                assert_eq!(last.error_code(), "api_error");
                assert_eq!(last.status(), Some(500));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(request_count(&server).await, 4);
    }

    #[tokio::test]
    async fn test_auth_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "No auth credentials found", "code": 401 }
            })))
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(config_for(&server, 3)).unwrap();
        let err = client.send::<String>("hello").await.unwrap_err();

        assert!(matches!(err, GatewayError::Auth { .. }));
        assert_eq!(request_count(&server).await, 1);
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(config_for(&server, 3).with_timeout(50)).unwrap();
        let err = client.send::<String>("hello").await.unwrap_err();

        assert!(matches!(err, GatewayError::Timeout { timeout_ms: 50 }));
        assert_eq!(request_count(&server).await, 1);
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(config_for(&server, 3)).unwrap();
        let reply: String = client.send("hello").await.unwrap();

        assert_eq!(reply, "ok");
        assert_eq!(request_count(&server).await, 3);
    }

    #[tokio::test]
    async fn test_empty_choices_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "x", "choices": [] })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("recovered")))
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(config_for(&server, 2)).unwrap();
        let response = client.send_raw("hello").await.unwrap();

        assert_eq!(response.first_content(), Some("recovered"));
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(15));
        assert_eq!(request_count(&server).await, 2);
    }

    #[tokio::test]
    async fn test_network_error_is_transient() {
        // Port 9 (discard) is closed on test hosts
        let config = OpenRouterConfig::new("test-key")
            .with_api_url("http://127.0.0.1:9/chat/completions")
            .with_max_retries(2)
            .with_retry_base_delay(1);

        let client = OpenRouterClient::new(config).unwrap();
        let err = client.send::<String>("hello").await.unwrap_err();
        assert_eq!(err.error_code(), "max_retries_exceeded:network_error");
    }
}
