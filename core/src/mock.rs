//! Mock generator used when no gateway credential is configured

use crate::errors::{ConfigError, GatewayError, TransientError, TransientKind};
use crate::schema::{MAX_ITEMS, MIN_ITEMS};
use crate::traits::{Generator, RandomSource, ThreadRandom};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const MOCK_MODEL: &str = "mock-ai-v1";

/// One extra card per this many characters of source text
const CHARS_PER_BONUS_CARD: usize = 2000;

/// Tuning knobs for the mock generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Probability of a simulated transient failure, 0.0 to 1.0
    pub failure_rate: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            failure_rate: 0.05,
            min_latency_ms: 200,
            max_latency_ms: 500,
        }
    }
}

impl MockConfig {
    /// No latency and no failures
    pub fn instant() -> Self {
        Self {
            failure_rate: 0.0,
            min_latency_ms: 0,
            max_latency_ms: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(ConfigError::OutOfRange {
                field: "mock.failure_rate",
                min: 0.0,
                max: 1.0,
                value: self.failure_rate as f32,
            });
        }
        if self.min_latency_ms > self.max_latency_ms {
            return Err(ConfigError::Invalid(
                "mock.min_latency_ms must not exceed mock.max_latency_ms".to_string(),
            ));
        }
        Ok(())
    }
}

/// Number of placeholder cards produced for a text of `length` characters
pub fn mock_card_count(length: usize) -> usize {
    (MIN_ITEMS + length / CHARS_PER_BONUS_CARD).min(MAX_ITEMS)
}

/// Produces placeholder flashcards without calling any remote service
pub struct MockGenerator {
    config: MockConfig,
    random: Arc<dyn RandomSource>,
}

impl MockGenerator {
    pub fn new(config: MockConfig) -> Self {
        Self::with_random(config, Arc::new(ThreadRandom))
    }

    pub fn with_random(config: MockConfig, random: Arc<dyn RandomSource>) -> Self {
        Self { config, random }
    }

    fn simulated_latency(&self) -> Duration {
        // an inverted range collapses to min_latency_ms
        let span = self.config.max_latency_ms.saturating_sub(self.config.min_latency_ms);
        let offset = (self.random.next_f64() * span as f64) as u64;
        Duration::from_millis(self.config.min_latency_ms + offset)
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

#[async_trait]
impl Generator for MockGenerator {
    fn model(&self) -> &str {
        MOCK_MODEL
    }

    async fn generate(&self, source_text: &str) -> Result<Value, GatewayError> {
        let latency = self.simulated_latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.config.failure_rate > 0.0 && self.random.next_f64() < self.config.failure_rate {
            return Err(GatewayError::Transient(TransientError::new(
                TransientKind::ApiError,
                "Simulated AI service temporary failure",
            )));
        }

        let count = mock_card_count(source_text.chars().count());
        debug!("Mock generator producing {} flashcards", count);

        let flashcards: Vec<Value> = (1..=count)
            .map(|i| {
                json!({
                    "front": format!("Mock Question {} based on provided text", i),
                    "back": format!("Mock Answer {} extracted from source material", i),
                })
            })
            .collect();

        Ok(json!({ "flashcards": flashcards }))
    }
}
