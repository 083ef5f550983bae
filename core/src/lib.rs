//! # Flashgen Core
//!
//! Core types, traits, and generation logic for the Flashgen flashcard system.
//! This crate defines the output contract for AI-generated flashcards, the
//! seams that gateway connectors and persistence adapters implement, and the
//! orchestrator that ties them together.

pub mod types;
pub mod traits;
pub mod errors;
pub mod schema;
pub mod config;
pub mod mock;

// Re-export commonly used types and traits
pub use types::{FlashcardProposal, GenerationRecord, GenerationErrorRecord, RequesterId};
pub use traits::{Clock, GenerationStore, Generator, RandomSource};
pub use errors::{GatewayError, GenerationError, SchemaError, StoreError};

pub mod generation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::types::*;
    pub use crate::traits::*;
    pub use crate::errors::*;
    pub use crate::schema::*;
    pub use crate::config::*;
    pub use crate::mock::*;
    pub use crate::generation::*;
    pub use async_trait::async_trait;
    pub use uuid::Uuid;
    pub use chrono::{DateTime, Utc};
}
