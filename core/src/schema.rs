//! Output contract for flashcard proposals

use crate::errors::SchemaError;
use crate::types::FlashcardProposal;
use serde_json::{json, Value};

pub const FRONT_MAX_CHARS: usize = 200;
pub const BACK_MAX_CHARS: usize = 500;
pub const MIN_ITEMS: usize = 3;
pub const MAX_ITEMS: usize = 7;

/// Proposals that passed the contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProposals {
    pub proposals: Vec<FlashcardProposal>,
    /// Number of items dropped because the reply exceeded `MAX_ITEMS`
    pub dropped: usize,
}

/// Shape of the flashcard reply expected from the model
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaContract;

impl SchemaContract {
    pub fn new() -> Self {
        Self
    }

    /// JSON schema used to instruct the model
    pub fn describe(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "flashcards": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "front": { "type": "string", "maxLength": FRONT_MAX_CHARS },
                            "back": { "type": "string", "maxLength": BACK_MAX_CHARS }
                        },
                        "required": ["front", "back"]
                    },
                    "minItems": MIN_ITEMS,
                    "maxItems": MAX_ITEMS
                }
            },
            "required": ["flashcards"]
        })
    }

    /// Worked example appended to the system prompt in place of the raw schema
    pub fn prompt_example() -> &'static str {
        r#"{
  "flashcards": [
    {
      "front": "actual question text here",
      "back": "actual answer text here"
    },
    {
      "front": "another question",
      "back": "another answer"
    }
  ]
}"#
    }

    /// Normalise a decoded reply into proposals.
    ///
    /// Items beyond `MAX_ITEMS` are dropped, keeping the first ones in order.
    pub fn validate(&self, raw: &Value) -> Result<ValidatedProposals, SchemaError> {
        let items = raw
            .get("flashcards")
            .and_then(Value::as_array)
            .ok_or(SchemaError::MissingField)?;

        if items.len() < MIN_ITEMS {
            return Err(SchemaError::TooFew { found: items.len(), min: MIN_ITEMS });
        }

        let dropped = items.len().saturating_sub(MAX_ITEMS);
        let mut proposals = Vec::with_capacity(items.len().min(MAX_ITEMS));

        for (index, item) in items.iter().take(MAX_ITEMS).enumerate() {
            let front = normalize_field(item, "front", FRONT_MAX_CHARS)
                .ok_or(SchemaError::EmptyField { index, field: "front" })?;
            let back = normalize_field(item, "back", BACK_MAX_CHARS)
                .ok_or(SchemaError::EmptyField { index, field: "back" })?;
            proposals.push(FlashcardProposal::new(front, back));
        }

        if proposals.len() < MIN_ITEMS {
            return Err(SchemaError::TooFew { found: proposals.len(), min: MIN_ITEMS });
        }

        Ok(ValidatedProposals { proposals, dropped })
    }
}

/// Trim and cut to `max_chars` characters; `None` when missing or blank
fn normalize_field(item: &Value, field: &str, max_chars: usize) -> Option<String> {
    let text = item.get(field)?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(max_chars).collect())
}
