//! OpenRouter API data models

use flashgen_core::types::{Candidate, ChatMessage, ChatRequest, GatewayResponse, TokenUsage};
use serde::{Deserialize, Serialize};

/// Chat Completion Request
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl<'a> From<&'a ChatRequest> for ChatCompletionRequest<'a> {
    fn from(request: &'a ChatRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            temperature: request.params.temperature,
            top_p: request.params.top_p,
            frequency_penalty: request.params.frequency_penalty,
            presence_penalty: request.params.presence_penalty,
            response_format: request.structured_output.then(ResponseFormat::json_object),
        }
    }
}

/// Response format specification for JSON mode
#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    pub r#type: &'static str,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self { r#type: "json_object" }
    }
}

/// Chat Completion Response
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

/// Individual choice in the response
#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    pub finish_reason: Option<String>,
}

/// Message in a choice
#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl From<ChatCompletionResponse> for GatewayResponse {
    fn from(response: ChatCompletionResponse) -> Self {
        Self {
            model: response.model,
            candidates: response
                .choices
                .into_iter()
                .map(|choice| Candidate {
                    content: choice.message.content.unwrap_or_default(),
                    finish_reason: choice.finish_reason,
                })
                .collect(),
            usage: response.usage.map(|usage| TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            }),
        }
    }
}

/// OpenRouter Error Response
#[derive(Debug, Deserialize)]
pub struct OpenRouterError {
    pub error: ErrorDetails,
}

/// Error details
#[derive(Debug, Deserialize)]
pub struct ErrorDetails {
    pub message: Option<String>,
    pub code: Option<serde_json::Value>,
}

impl OpenRouterError {
    /// Provider message from an error body, if it has the usual envelope
    pub fn message_from_body(body: &str) -> Option<String> {
        serde_json::from_str::<OpenRouterError>(body)
            .ok()
            .and_then(|envelope| envelope.error.message)
            .filter(|message| !message.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashgen_core::types::ModelParameters;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest::new("openai/gpt-4-turbo", ModelParameters::default())
            .with_message(ChatMessage::system("sys"))
            .with_message(ChatMessage::user("hello"))
            .with_structured_output(true);

        let body = serde_json::to_value(ChatCompletionRequest::from(&request)).unwrap();
        assert_eq!(body["model"], "openai/gpt-4-turbo");
        assert_eq!(body["messages"][0], json!({ "role": "system", "content": "sys" }));
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["top_p"], 1.0);
    }

    #[test]
    fn test_plain_request_omits_response_format() {
        let request = ChatRequest::new("m", ModelParameters::default())
            .with_message(ChatMessage::user("hello"));
        let body = serde_json::to_value(ChatCompletionRequest::from(&request)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error": {"message": "Insufficient credits", "code": 402}}"#;
        assert_eq!(
            OpenRouterError::message_from_body(body).as_deref(),
            Some("Insufficient credits")
        );
        assert_eq!(OpenRouterError::message_from_body("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_response_conversion() {
        let raw = json!({
            "id": "gen-1",
            "model": "openai/gpt-4-turbo",
            "choices": [{ "message": { "role": "assistant", "content": "hi" }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4 }
        });
        let parsed: ChatCompletionResponse = serde_json::from_value(raw).unwrap();
        let response = GatewayResponse::from(parsed);
        assert_eq!(response.first_content(), Some("hi"));
        assert_eq!(response.usage.unwrap().total_tokens, 4);
    }
}
