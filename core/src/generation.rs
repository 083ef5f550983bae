//! Generation orchestrator: turns source text into persisted flashcard proposals

use crate::errors::{GenerationError, StoreError};
use crate::schema::SchemaContract;
use crate::traits::{Clock, GenerationStore, Generator, SystemClock};
use crate::types::{
    FlashcardProposal, GenerationErrorRecord, GenerationOutcome, GenerationRecord, RequesterId,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Stable hex digest of the source text, for traceability only
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Drives a [`Generator`], validates its output and records the outcome
pub struct GenerationOrchestrator {
    generator: Arc<dyn Generator>,
    store: Arc<dyn GenerationStore>,
    clock: Arc<dyn Clock>,
    schema: SchemaContract,
}

impl GenerationOrchestrator {
    pub fn new(generator: Arc<dyn Generator>, store: Arc<dyn GenerationStore>) -> Self {
        Self::with_clock(generator, store, Arc::new(SystemClock))
    }

    pub fn with_clock(
        generator: Arc<dyn Generator>,
        store: Arc<dyn GenerationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            generator,
            store,
            clock,
            schema: SchemaContract::new(),
        }
    }

    /// Model name of the underlying generator
    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// Generate proposals for `source_text` on behalf of `requester_id`.
    ///
    /// Exactly one record is written: a generation record on success, or an
    /// error record on failure. The error record write is best-effort and
    /// never replaces the error returned to the caller.
    pub async fn generate(
        &self,
        source_text: &str,
        requester_id: &RequesterId,
    ) -> Result<GenerationOutcome, GenerationError> {
        let started = self.clock.now();
        let source_text_length = source_text.chars().count();
        info!(
            "Starting generation for requester {}, text length: {}",
            requester_id, source_text_length
        );

        let source_text_hash = content_hash(source_text);

        match self
            .call_and_record(source_text, requester_id, &source_text_hash, source_text_length, started)
            .await
        {
            Ok(outcome) => {
                info!(
                    "Generation successful: id={}, count={}, duration={}ms, hash={}...",
                    outcome.generation_id,
                    outcome.record.generated_count,
                    outcome.record.duration_ms,
                    &source_text_hash[..8]
                );
                Ok(outcome)
            }
            Err(err) => {
                let record = GenerationErrorRecord {
                    requester_id: requester_id.clone(),
                    error_code: err.error_code(),
                    error_message: err.to_string(),
                    model: self.model().to_string(),
                    source_text_hash,
                    source_text_length,
                    duration_ms: self.elapsed_ms(started),
                };
                error!(
                    "Generation failed for requester {} after {}ms: [{}] {}",
                    requester_id, record.duration_ms, record.error_code, record.error_message
                );
                self.log_failure(record).await;
                Err(err)
            }
        }
    }

    /// Every step whose failure must end in an error record, including the final write
    async fn call_and_record(
        &self,
        source_text: &str,
        requester_id: &RequesterId,
        source_text_hash: &str,
        source_text_length: usize,
        started: Instant,
    ) -> Result<GenerationOutcome, GenerationError> {
        let proposals = self.call_and_validate(source_text).await?;

        let record = GenerationRecord {
            requester_id: requester_id.clone(),
            model: self.model().to_string(),
            generated_count: proposals.len(),
            source_text_hash: source_text_hash.to_string(),
            source_text_length,
            duration_ms: self.elapsed_ms(started),
        };

        let generation_id = self.store.save_generation(record.clone()).await?;

        Ok(GenerationOutcome {
            generation_id,
            record,
            proposals,
        })
    }

    async fn call_and_validate(&self, source_text: &str) -> Result<Vec<FlashcardProposal>, GenerationError> {
        let raw = self.generator.generate(source_text).await?;
        let validated = self.schema.validate(&raw)?;
        if validated.dropped > 0 {
            warn!(
                "Model returned {} extra flashcards, keeping the first {}",
                validated.dropped,
                validated.proposals.len()
            );
        }
        debug!("Validated {} flashcard proposals", validated.proposals.len());
        Ok(validated.proposals)
    }

    /// Persist the error record; failures only reach the local log
    async fn log_failure(&self, record: GenerationErrorRecord) {
        if let Err(log_err) = self.store.save_generation_error(record).await {
            error!("Failed to log generation error: {}", log_err);
        }
    }

    fn elapsed_ms(&self, started: Instant) -> u64 {
        self.clock.now().saturating_duration_since(started).as_millis() as u64
    }
}

/// Save the proposals a user accepted from an earlier generation
pub async fn accept_proposals(
    store: &dyn GenerationStore,
    generation_id: Uuid,
    requester_id: &RequesterId,
    proposals: &[FlashcardProposal],
) -> Result<Vec<Uuid>, GenerationError> {
    if proposals.is_empty() {
        return Err(GenerationError::Persistence(StoreError::InvalidRecord(
            "no proposals to save".to_string(),
        )));
    }

    let ids = store.save_flashcards(proposals, generation_id, requester_id).await?;
    info!(
        "Saved {} flashcards from generation {} for requester {}",
        ids.len(),
        generation_id,
        requester_id
    );
    Ok(ids)
}
