//! Flashcard generation command implementation

use crate::cli::GenerateArgs;
use crate::commands::read_source;
use crate::config::FlashctlConfig;
use crate::errors::CliError;
use crate::output;
use crate::runtime::build_generator;
use colored::*;
use flashgen_adapter_in_memory::InMemoryStore;
use flashgen_core::prelude::*;
use std::sync::Arc;
use tracing::info;

/// Handle the generate command
pub async fn handle_generate_command(args: GenerateArgs, config: &FlashctlConfig) -> Result<(), CliError> {
    let format = config.cli.default_format;

    match generate(&args, config).await {
        Ok((outcome, saved)) => {
            output::display_outcome(&outcome, &format)?;
            if let Some(ids) = saved {
                output::display_saved(&ids, &format)?;
            }
            Ok(())
        }
        Err(CliError::Generation(e)) => {
            eprintln!("{}", "✗ Flashcard generation failed".red().bold());
            eprintln!("{}", e.user_message().red());
            Err(CliError::Generation(e))
        }
        Err(e) => Err(e),
    }
}

/// Validate the input, run one generation and optionally accept every proposal
async fn generate(
    args: &GenerateArgs,
    config: &FlashctlConfig,
) -> Result<(GenerationOutcome, Option<Vec<Uuid>>), CliError> {
    let command = GenerateFlashcardsCommand::new(read_source(&args.input)?);
    command.validate()?;

    let requester = RequesterId::new(config.requester(&args.requester));
    let generator = build_generator(&config.generator)?;
    let store = Arc::new(InMemoryStore::new());
    let orchestrator = GenerationOrchestrator::new(generator, store.clone());

    info!("Generating flashcards with model {}", orchestrator.model());
    let outcome = orchestrator.generate(&command.source_text, &requester).await?;

    let saved = if args.accept {
        let ids = accept_proposals(
            store.as_ref(),
            outcome.generation_id,
            &requester,
            &outcome.proposals,
        )
        .await?;
        Some(ids)
    } else {
        None
    };

    Ok((outcome, saved))
}
