//! Output formatting utilities for flashctl

use crate::cli::OutputFormat;
use crate::errors::CliError;
use colored::*;
use flashgen_core::types::{FlashcardProposal, GenerationOutcome};
use serde::Serialize;
use serde_json::{json, Value};
use tabled::{Table, Tabled};
use uuid::Uuid;

/// Display a generation: its metadata followed by the proposals
pub fn display_outcome(outcome: &GenerationOutcome, format: &OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => {
            let record = &outcome.record;
            println!("{}", "Generation".bold().blue());
            println!("{:<15} {}", "ID:".bold(), outcome.generation_id);
            println!("{:<15} {}", "Requester:".bold(), record.requester_id);
            println!("{:<15} {}", "Model:".bold(), record.model);
            println!("{:<15} {}", "Cards:".bold(), record.generated_count);
            println!("{:<15} {} chars", "Source:".bold(), record.source_text_length);
            println!("{:<15} {}", "Hash:".bold(), record.source_text_hash);
            println!("{:<15} {}ms", "Duration:".bold(), record.duration_ms);
            println!();
            display_proposals(&outcome.proposals);
        }
        OutputFormat::Json => print_json(outcome)?,
    }
    Ok(())
}

/// Display the ids of flashcards saved from a generation
pub fn display_saved(ids: &[Uuid], format: &OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => {
            println!("{}", format!("✓ Saved {} flashcards", ids.len()).green().bold());
        }
        OutputFormat::Json => print_json(&json!({ "saved": ids }))?,
    }
    Ok(())
}

/// Display a content hash with the length it was computed over
pub fn display_hash(hash: &str, length: usize, format: &OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => {
            println!("{:<10} {}", "SHA-256:".bold(), hash);
            println!("{:<10} {}", "Length:".bold(), length);
        }
        OutputFormat::Json => print_json(&json!({ "hash": hash, "length": length }))?,
    }
    Ok(())
}

/// Display the flashcard output schema: one row per card field, or the raw JSON
pub fn display_schema(schema: &Value, format: &OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => {
            let flashcards = &schema["properties"]["flashcards"];
            println!("{}", "Flashcard schema".bold().blue());
            println!(
                "{:<15} {}..={}",
                "Cards:".bold(),
                flashcards["minItems"],
                flashcards["maxItems"]
            );
            println!("{}", Table::new(schema_rows(schema)));
        }
        OutputFormat::Json => println!("{}", pretty_value(schema)),
    }
    Ok(())
}

fn schema_rows(schema: &Value) -> Vec<SchemaTableRow> {
    let items = &schema["properties"]["flashcards"]["items"];
    let required: Vec<&str> = items["required"]
        .as_array()
        .map(|fields| fields.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    items["properties"]
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .map(|(name, definition)| SchemaTableRow {
                    field: name.clone(),
                    kind: definition["type"].as_str().unwrap_or("-").to_string(),
                    max_length: definition["maxLength"]
                        .as_u64()
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    required: if required.contains(&name.as_str()) { "yes" } else { "no" }.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Print any value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Pretty JSON for schema-like values, compact when it cannot be indented
pub fn pretty_value(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn display_proposals(proposals: &[FlashcardProposal]) {
    if proposals.is_empty() {
        println!("No proposals generated");
        return;
    }

    let rows: Vec<ProposalTableRow> = proposals
        .iter()
        .enumerate()
        .map(|(i, p)| ProposalTableRow {
            index: i + 1,
            front: p.front.clone(),
            back: p.back.clone(),
            source: p.source.to_string(),
        })
        .collect();

    println!("{}", Table::new(rows));
}

/// Table row for schema display
#[derive(Tabled)]
struct SchemaTableRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Max length")]
    max_length: String,
    #[tabled(rename = "Required")]
    required: String,
}

/// Table row for proposal display
#[derive(Tabled)]
struct ProposalTableRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Front")]
    front: String,
    #[tabled(rename = "Back")]
    back: String,
    #[tabled(rename = "Source")]
    source: String,
}
