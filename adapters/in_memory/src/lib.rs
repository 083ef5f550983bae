//! In-memory implementation of GenerationStore for testing and development

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flashgen_core::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Configuration for in-memory store
#[derive(Debug, Clone)]
pub struct InMemoryConfig {
    /// Maximum number of generation records to store
    pub max_generations: Option<usize>,
    /// Maximum number of saved flashcards
    pub max_flashcards: Option<usize>,
    /// Whether to enable verbose logging
    pub verbose: bool,
    /// Reject every error-log write (exercises the best-effort logging path)
    pub fail_error_writes: bool,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            max_generations: Some(100_000),
            max_flashcards: Some(500_000),
            verbose: false,
            fail_error_writes: false,
        }
    }
}

/// A generation record with its storage metadata
#[derive(Debug, Clone)]
pub struct StoredGeneration {
    pub id: Uuid,
    pub record: GenerationRecord,
    pub created_at: DateTime<Utc>,
}

/// An error record with its storage metadata
#[derive(Debug, Clone)]
pub struct StoredGenerationError {
    pub id: Uuid,
    pub record: GenerationErrorRecord,
    pub created_at: DateTime<Utc>,
}

/// Counters describing the store contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub generations: usize,
    pub errors: usize,
    pub flashcards: usize,
}

/// In-memory data store
#[derive(Debug, Default)]
struct MemoryStore {
    /// Generations indexed by id
    generations: HashMap<Uuid, StoredGeneration>,
    /// Error log, in insertion order
    errors: Vec<StoredGenerationError>,
    /// Flashcards indexed by id
    flashcards: HashMap<Uuid, SavedFlashcard>,
    /// Index: requester -> generation ids
    generations_by_requester: HashMap<RequesterId, Vec<Uuid>>,
    /// Index: generation id -> flashcard ids, in save order
    flashcards_by_generation: HashMap<Uuid, Vec<Uuid>>,
}

impl MemoryStore {
    fn insert_generation(&mut self, id: Uuid, record: GenerationRecord) {
        self.generations_by_requester
            .entry(record.requester_id.clone())
            .or_default()
            .push(id);

        self.generations.insert(
            id,
            StoredGeneration {
                id,
                record,
                created_at: Utc::now(),
            },
        );
    }

    fn insert_flashcard(&mut self, flashcard: SavedFlashcard) {
        self.flashcards_by_generation
            .entry(flashcard.generation_id)
            .or_default()
            .push(flashcard.id);
        self.flashcards.insert(flashcard.id, flashcard);
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            generations: self.generations.len(),
            errors: self.errors.len(),
            flashcards: self.flashcards.len(),
        }
    }
}

/// In-memory GenerationStore implementation
pub struct InMemoryStore {
    store: Arc<RwLock<MemoryStore>>,
    config: InMemoryConfig,
}

impl InMemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::new_with_config(InMemoryConfig::default())
    }

    /// Create a new in-memory store with configuration
    pub fn new_with_config(config: InMemoryConfig) -> Self {
        info!("Creating in-memory store with config: {:?}", config);
        Self {
            store: Arc::new(RwLock::new(MemoryStore::default())),
            config,
        }
    }

    /// Get statistics about the store
    pub async fn stats(&self) -> StoreStats {
        let store = self.store.read().await;
        store.stats()
    }

    /// Look up a generation by id
    pub async fn generation(&self, id: Uuid) -> Option<StoredGeneration> {
        let store = self.store.read().await;
        store.generations.get(&id).cloned()
    }

    /// All generations of one requester, oldest first
    pub async fn generations_for(&self, requester_id: &RequesterId) -> Vec<StoredGeneration> {
        let store = self.store.read().await;
        store
            .generations_by_requester
            .get(requester_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| store.generations.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The full error log, oldest first
    pub async fn error_logs(&self) -> Vec<StoredGenerationError> {
        let store = self.store.read().await;
        store.errors.clone()
    }

    /// Flashcards saved from one generation, in save order
    pub async fn flashcards_for(&self, generation_id: Uuid) -> Vec<SavedFlashcard> {
        let store = self.store.read().await;
        store
            .flashcards_by_generation
            .get(&generation_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| store.flashcards.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Clear all data from the store
    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        *store = MemoryStore::default();
        info!("Cleared in-memory store");
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationStore for InMemoryStore {
    async fn save_generation(&self, record: GenerationRecord) -> Result<Uuid, StoreError> {
        let mut store = self.store.write().await;

        if let Some(max) = self.config.max_generations {
            if store.generations.len() >= max {
                return Err(StoreError::CapacityExceeded(format!(
                    "generation limit of {} reached",
                    max
                )));
            }
        }

        let id = Uuid::new_v4();
        if self.config.verbose {
            debug!(
                "Saving generation {} for requester {}: {} proposals",
                id, record.requester_id, record.generated_count
            );
        }
        store.insert_generation(id, record);
        Ok(id)
    }

    async fn save_generation_error(&self, record: GenerationErrorRecord) -> Result<(), StoreError> {
        if self.config.fail_error_writes {
            return Err(StoreError::Backend("error log writes are disabled".to_string()));
        }

        let mut store = self.store.write().await;
        if self.config.verbose {
            debug!(
                "Logging generation error for requester {}: {}",
                record.requester_id, record.error_code
            );
        }
        store.errors.push(StoredGenerationError {
            id: Uuid::new_v4(),
            record,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn save_flashcards(
        &self,
        proposals: &[FlashcardProposal],
        generation_id: Uuid,
        requester_id: &RequesterId,
    ) -> Result<Vec<Uuid>, StoreError> {
        let mut store = self.store.write().await;

        let generation = store
            .generations
            .get(&generation_id)
            .ok_or_else(|| StoreError::NotFound(format!("generation {}", generation_id)))?;

        // Generation exists but belongs to someone else
        if generation.record.requester_id != *requester_id {
            return Err(StoreError::Forbidden(format!(
                "generation {} does not belong to requester {}",
                generation_id, requester_id
            )));
        }

        if let Some(max) = self.config.max_flashcards {
            if store.flashcards.len() + proposals.len() > max {
                return Err(StoreError::CapacityExceeded(format!(
                    "flashcard limit of {} reached",
                    max
                )));
            }
        }

        let now = Utc::now();
        let mut ids = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            let flashcard = SavedFlashcard {
                id: Uuid::new_v4(),
                front: proposal.front.clone(),
                back: proposal.back.clone(),
                source: proposal.source,
                generation_id,
                requester_id: requester_id.clone(),
                created_at: now,
            };
            ids.push(flashcard.id);
            store.insert_flashcard(flashcard);
        }

        if self.config.verbose {
            debug!("Saved {} flashcards for generation {}", ids.len(), generation_id);
        }

        Ok(ids)
    }
}
