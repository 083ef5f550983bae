//! Effective configuration command implementation

use crate::cli::OutputFormat;
use crate::config::FlashctlConfig;
use crate::errors::CliError;
use crate::output;
use colored::*;

/// Print the merged configuration with the API key redacted
pub fn handle_config_command(config: &FlashctlConfig) -> Result<(), CliError> {
    let shown = config.redacted();

    match config.cli.default_format {
        OutputFormat::Json => output::print_json(&shown)?,
        OutputFormat::Table => {
            let settings = &shown.generator;
            println!("{}", "Generator".bold().blue());
            println!("{:<20} {}", "Provider:".bold(), settings.provider);
            println!("{:<20} {}", "API key:".bold(), settings.api_key.as_deref().unwrap_or("-"));
            println!("{:<20} {}", "API URL:".bold(), settings.api_url);
            println!("{:<20} {}", "Model:".bold(), settings.model);
            println!("{:<20} {}ms", "Timeout:".bold(), settings.timeout_ms);
            println!("{:<20} {}", "Max retries:".bold(), settings.max_retries);
            println!("{:<20} {}ms", "Retry base delay:".bold(), settings.retry_base_delay_ms);
            println!(
                "{:<20} temperature={} top_p={} frequency_penalty={} presence_penalty={}",
                "Sampling:".bold(),
                settings.sampling.temperature,
                settings.sampling.top_p,
                settings.sampling.frequency_penalty,
                settings.sampling.presence_penalty
            );
            println!(
                "{:<20} failure_rate={} latency={}..{}ms",
                "Mock:".bold(),
                settings.mock.failure_rate,
                settings.mock.min_latency_ms,
                settings.mock.max_latency_ms
            );
            println!();
            println!("{}", "CLI".bold().blue());
            println!("{:<20} {}", "Requester:".bold(), shown.cli.default_requester);
            println!("{:<20} {}", "Format:".bold(), shown.cli.default_format);
        }
    }
    Ok(())
}
