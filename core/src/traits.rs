//! Core traits defining the seams between the orchestrator and its collaborators

use crate::errors::{GatewayError, StoreError};
use crate::types::{FlashcardProposal, GenerationErrorRecord, GenerationRecord, RequesterId};
use async_trait::async_trait;
use rand::Rng;
use std::time::Instant;
use uuid::Uuid;

/// Source of raw flashcard replies (real gateway or mock)
#[async_trait]
pub trait Generator: Send + Sync {
    /// Model name recorded in generation metadata
    fn model(&self) -> &str;

    /// Produce an undecoded `{"flashcards": [...]}` payload for the given text
    async fn generate(&self, source_text: &str) -> Result<serde_json::Value, GatewayError>;
}

/// Persistence port for generation metadata and accepted flashcards
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Persist a successful generation and return its id
    async fn save_generation(&self, record: GenerationRecord) -> Result<Uuid, StoreError>;

    /// Persist a failed generation
    async fn save_generation_error(&self, record: GenerationErrorRecord) -> Result<(), StoreError>;

    /// Persist proposals the user accepted
    async fn save_flashcards(
        &self,
        proposals: &[FlashcardProposal],
        generation_id: Uuid,
        requester_id: &RequesterId,
    ) -> Result<Vec<Uuid>, StoreError>;
}

/// Monotonic time source
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `Instant::now`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Uniform random numbers in `[0, 1)`
pub trait RandomSource: Send + Sync {
    fn next_f64(&self) -> f64;
}

/// Random source backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Always returns the same value; useful for deterministic runs
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_f64(&self) -> f64 {
        self.0
    }
}
