//! Content hash command implementation

use crate::cli::SourceInput;
use crate::commands::read_source;
use crate::config::FlashctlConfig;
use crate::errors::CliError;
use crate::output;
use flashgen_core::generation::content_hash;

/// Handle the hash command
pub fn handle_hash_command(input: SourceInput, config: &FlashctlConfig) -> Result<(), CliError> {
    let text = read_source(&input)?;
    output::display_hash(&content_hash(&text), text.chars().count(), &config.cli.default_format)
}
