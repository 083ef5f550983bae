//! Command implementations

pub mod config;
pub mod generate;
pub mod hash;
pub mod schema;

use crate::cli::SourceInput;
use crate::errors::CliError;

/// Source text from `--file` or `--text`
pub fn read_source(input: &SourceInput) -> Result<String, CliError> {
    match (&input.file, &input.text) {
        (Some(path), _) => std::fs::read_to_string(path).map_err(|source| CliError::Input {
            path: path.display().to_string(),
            source,
        }),
        (None, Some(text)) => Ok(text.clone()),
        (None, None) => Err(CliError::Config(
            "No source text given. Use --file or --text".to_string(),
        )),
    }
}
