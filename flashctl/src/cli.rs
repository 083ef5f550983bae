//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use flashgen_core::config::ProviderKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flashctl")]
#[command(about = "Generate study flashcards from text with a hosted language model")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Generator backend
    #[arg(short, long, global = true, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Model name passed to the gateway
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate flashcard proposals from source text
    Generate(GenerateArgs),
    /// Print the flashcard output schema
    Schema,
    /// Print the content hash of a source text
    Hash {
        #[command(flatten)]
        input: SourceInput,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub input: SourceInput,

    /// Requester recorded with the generation
    #[arg(short, long)]
    pub requester: Option<String>,

    /// Save every proposal after generating
    #[arg(long)]
    pub accept: bool,
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceInput {
    /// Read the source text from a file
    #[arg(short = 'i', long = "file")]
    pub file: Option<PathBuf>,

    /// Source text given inline
    #[arg(short, long)]
    pub text: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderArg {
    Mock,
    Openrouter,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Mock => ProviderKind::Mock,
            ProviderArg::Openrouter => ProviderKind::OpenRouter,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_args() {
        let cli = Cli::try_parse_from([
            "flashctl", "-p", "mock", "generate", "--text", "abc", "-r", "alice", "--accept",
        ])
        .unwrap();

        assert_eq!(cli.provider, Some(ProviderArg::Mock));
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.input.text.as_deref(), Some("abc"));
                assert_eq!(args.requester.as_deref(), Some("alice"));
                assert!(args.accept);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_source_input_is_exclusive() {
        assert!(Cli::try_parse_from(["flashctl", "hash", "--text", "a", "--file", "b.txt"]).is_err());
        assert!(Cli::try_parse_from(["flashctl", "hash"]).is_err());
    }

    #[test]
    fn test_provider_mapping() {
        assert_eq!(ProviderKind::from(ProviderArg::Openrouter), ProviderKind::OpenRouter);
    }
}
