//! Flashcard generator backed by the OpenRouter gateway

use crate::{OpenRouterClient, OpenRouterConfig};
use async_trait::async_trait;
use flashgen_core::prelude::*;
use serde_json::Value;
use tracing::debug;

/// Instructions given to the model for every generation
pub const FLASHCARD_SYSTEM_PROMPT: &str = "You are an expert educational content creator specializing in creating high-quality flashcards.
Generate flashcards that focus on key concepts. Each flashcard should have:
- front: A clear question (max 200 characters)
- back: A concise answer (max 500 characters)

Return your response as a JSON object with an array of flashcards.";

/// [`Generator`] that asks a hosted model for flashcards
pub struct OpenRouterGenerator {
    client: OpenRouterClient,
}

impl OpenRouterGenerator {
    pub fn new(config: OpenRouterConfig) -> Result<Self, GatewayError> {
        let mut client = OpenRouterClient::new(config)?;
        client.set_system_prompt(FLASHCARD_SYSTEM_PROMPT)?;
        client.set_structured_output(SchemaContract::new().describe());
        Ok(Self { client })
    }

    pub fn from_settings(settings: &GeneratorSettings) -> Result<Self, GatewayError> {
        Self::new(OpenRouterConfig::from_settings(settings)?)
    }

    /// Underlying client, e.g. to inspect the effective prompt
    pub fn client(&self) -> &OpenRouterClient {
        &self.client
    }
}

#[async_trait]
impl Generator for OpenRouterGenerator {
    fn model(&self) -> &str {
        self.client.model()
    }

    async fn generate(&self, source_text: &str) -> Result<Value, GatewayError> {
        debug!("Requesting flashcards for {} characters of text", source_text.chars().count());
        self.client
            .send::<Value>(&format!(
                "Generate flashcards from the following text:\n\n{}",
                source_text
            ))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_is_structured() {
        let generator = OpenRouterGenerator::new(OpenRouterConfig::new("test-key")).unwrap();
        let client = generator.client();

        assert!(client.is_structured());
        let prompt = client.system_prompt().unwrap();
        assert!(prompt.starts_with("You are an expert educational content creator"));
        assert!(prompt.contains("CRITICAL: Respond with actual JSON DATA"));
        assert_eq!(generator.model(), "openai/gpt-4-turbo");
    }

    #[test]
    fn test_from_settings_requires_key() {
        assert!(matches!(
            OpenRouterGenerator::from_settings(&GeneratorSettings::default()),
            Err(GatewayError::Config(_))
        ));
    }
}
