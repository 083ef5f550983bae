//! Core data types for Flashgen

use crate::errors::{ConfigError, GatewayError, GenerationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum accepted source text length, in characters
pub const MIN_SOURCE_TEXT_LENGTH: usize = 1000;
/// Maximum accepted source text length, in characters
pub const MAX_SOURCE_TEXT_LENGTH: usize = 10_000;

/// Identity of the user requesting a generation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequesterId(pub String);

impl RequesterId {
    /// Create a new RequesterId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequesterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sampling configuration sent with every chat request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    /// 0.0 to 2.0
    pub temperature: f32,
    /// 0.0 to 1.0
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

impl ModelParameters {
    /// Reject out-of-range sampling values
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        Ok(())
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set top_p
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_nan() || value < min || value > max {
        return Err(ConfigError::OutOfRange { field, min, max, value });
    }
    Ok(())
}

/// Role of a chat message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single role-tagged message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A fully built chat-completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub params: ModelParameters,
    /// Ask the provider for a JSON object reply
    pub structured_output: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, params: ModelParameters) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            params,
            structured_output: false,
        }
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_structured_output(mut self, enabled: bool) -> Self {
        self.structured_output = enabled;
        self
    }

    /// Check the message ordering rules before dispatch.
    ///
    /// At most one system message, and only in first position; the last
    /// message must be the single trailing user turn.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.model.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("model name cannot be empty".to_string()));
        }

        for (index, message) in self.messages.iter().enumerate() {
            if message.role == Role::System && index != 0 {
                return Err(GatewayError::InvalidRequest(
                    "system message must be the first message".to_string(),
                ));
            }
        }

        match self.messages.last() {
            Some(last) if last.role == Role::User => {}
            _ => {
                return Err(GatewayError::InvalidRequest(
                    "user message must be set before sending chat request".to_string(),
                ))
            }
        }

        let trailing = self.messages.len();
        if trailing >= 2 && self.messages[trailing - 2].role == Role::User {
            return Err(GatewayError::InvalidRequest(
                "exactly one trailing user message is allowed".to_string(),
            ));
        }

        Ok(())
    }
}

/// Token counters reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One candidate completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub content: String,
    pub finish_reason: Option<String>,
}

/// Decoded gateway reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub model: Option<String>,
    pub candidates: Vec<Candidate>,
    pub usage: Option<TokenUsage>,
}

impl GatewayResponse {
    /// Text of the first candidate; only the first one is ever used
    pub fn first_content(&self) -> Option<&str> {
        self.candidates.first().map(|c| c.content.as_str())
    }
}

/// Origin tag of a flashcard proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalSource {
    #[serde(rename = "ai-generated")]
    AiGenerated,
}

impl std::fmt::Display for ProposalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProposalSource::AiGenerated => write!(f, "ai-generated"),
        }
    }
}

/// A validated question/answer pair proposed by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardProposal {
    pub front: String,
    pub back: String,
    pub source: ProposalSource,
}

impl FlashcardProposal {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            source: ProposalSource::AiGenerated,
        }
    }
}

/// Metadata persisted for every successful generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub requester_id: RequesterId,
    pub model: String,
    pub generated_count: usize,
    pub source_text_hash: String,
    pub source_text_length: usize,
    pub duration_ms: u64,
}

/// Metadata persisted for every failed generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationErrorRecord {
    pub requester_id: RequesterId,
    pub error_code: String,
    pub error_message: String,
    pub model: String,
    pub source_text_hash: String,
    pub source_text_length: usize,
    pub duration_ms: u64,
}

/// Successful orchestrator result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub generation_id: Uuid,
    pub record: GenerationRecord,
    pub proposals: Vec<FlashcardProposal>,
}

/// A flashcard saved after the user accepted a proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFlashcard {
    pub id: Uuid,
    pub front: String,
    pub back: String,
    pub source: ProposalSource,
    pub generation_id: Uuid,
    pub requester_id: RequesterId,
    pub created_at: DateTime<Utc>,
}

/// Command to generate flashcards from user-provided text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateFlashcardsCommand {
    pub source_text: String,
}

impl GenerateFlashcardsCommand {
    pub fn new(source_text: impl Into<String>) -> Self {
        Self { source_text: source_text.into() }
    }

    /// Enforce the accepted source text length, counted in characters
    pub fn validate(&self) -> Result<(), GenerationError> {
        let length = self.source_text.chars().count();
        if length < MIN_SOURCE_TEXT_LENGTH {
            return Err(GenerationError::InvalidInput(format!(
                "Source text must be at least {} characters long",
                MIN_SOURCE_TEXT_LENGTH
            )));
        }
        if length > MAX_SOURCE_TEXT_LENGTH {
            return Err(GenerationError::InvalidInput(format!(
                "Source text must not exceed {} characters",
                MAX_SOURCE_TEXT_LENGTH
            )));
        }
        Ok(())
    }
}
