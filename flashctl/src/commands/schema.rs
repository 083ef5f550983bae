//! Output schema command implementation

use crate::config::FlashctlConfig;
use crate::errors::CliError;
use crate::output;
use flashgen_core::schema::SchemaContract;

/// Print the schema replies are validated against
pub fn handle_schema_command(config: &FlashctlConfig) -> Result<(), CliError> {
    output::display_schema(&SchemaContract::new().describe(), &config.cli.default_format)
}
