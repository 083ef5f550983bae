//! Configuration management for flashctl

use crate::cli::{Cli, OutputFormat};
use crate::errors::CliError;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use flashgen_core::config::GeneratorSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings that only matter to the command-line front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliDefaults {
    /// Requester recorded when `--requester` is not given
    pub default_requester: String,
    pub default_format: OutputFormat,
}

impl Default for CliDefaults {
    fn default() -> Self {
        Self {
            default_requester: "local".to_string(),
            default_format: OutputFormat::Table,
        }
    }
}

/// Configuration for flashctl CLI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashctlConfig {
    pub generator: GeneratorSettings,
    pub cli: CliDefaults,
}

impl Default for FlashctlConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorSettings::default(),
            cli: CliDefaults::default(),
        }
    }
}

impl FlashctlConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: &Option<PathBuf>) -> Result<Self, CliError> {
        let figment = Self::figment(config_path)?;

        // Both views read the same flat key space
        let generator: GeneratorSettings = figment
            .extract()
            .map_err(|e| CliError::Config(format!("Failed to parse configuration: {}", e)))?;
        let cli: CliDefaults = figment
            .extract()
            .map_err(|e| CliError::Config(format!("Failed to parse configuration: {}", e)))?;

        generator.validate()?;
        Ok(Self { generator, cli })
    }

    fn figment(config_path: &Option<PathBuf>) -> Result<Figment, CliError> {
        let mut figment = Figment::new();

        // Load from default config file if it exists
        let default_config_paths = ["flashctl.yaml", "flashctl.yml", ".flashctl.yaml", ".flashctl.yml"];

        for path in &default_config_paths {
            if Path::new(path).exists() {
                figment = figment.merge(Yaml::file(path));
                break;
            }
        }

        // Load from specified config file
        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Yaml::file(path));
            } else {
                return Err(CliError::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
        }

        // The gateway's conventional variable, then FLASHGEN_* which wins
        figment = figment
            .merge(Env::raw().only(&["OPENROUTER_API_KEY"]).map(|_| "api_key".into()))
            .merge(Env::prefixed("FLASHGEN_").split("__"));

        Ok(figment)
    }

    /// Apply CLI argument overrides to the configuration
    pub fn with_overrides(mut self, args: &Cli) -> Self {
        if let Some(provider) = args.provider {
            self.generator.provider = provider.into();
        }

        if let Some(ref model) = args.model {
            self.generator.model = model.clone();
        }

        if let Some(format) = args.format {
            self.cli.default_format = format;
        }

        self
    }

    /// Requester to record, preferring the command-line value
    pub fn requester(&self, override_requester: &Option<String>) -> String {
        override_requester
            .as_ref()
            .filter(|r| !r.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| self.cli.default_requester.clone())
    }

    /// Copy safe to print
    pub fn redacted(&self) -> Self {
        Self {
            generator: self.generator.redacted(),
            cli: self.cli.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashgen_core::config::ProviderKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = FlashctlConfig::default();
        assert_eq!(config.generator.provider, ProviderKind::Mock);
        assert_eq!(config.cli.default_requester, "local");
        assert_eq!(config.cli.default_format, OutputFormat::Table);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "provider: openrouter").unwrap();
        writeln!(temp_file, "model: anthropic/claude-3.5-haiku").unwrap();
        writeln!(temp_file, "max_retries: 5").unwrap();
        writeln!(temp_file, "default_format: json").unwrap();
        writeln!(temp_file, "sampling:").unwrap();
        writeln!(temp_file, "  temperature: 0.2").unwrap();
        writeln!(temp_file, "mock:").unwrap();
        writeln!(temp_file, "  failure_rate: 0.0").unwrap();

        let config = FlashctlConfig::load(&Some(temp_file.path().to_path_buf())).unwrap();
        assert_eq!(config.generator.provider, ProviderKind::OpenRouter);
        assert_eq!(config.generator.model, "anthropic/claude-3.5-haiku");
        assert_eq!(config.generator.max_retries, 5);
        assert_eq!(config.generator.sampling.temperature, 0.2);
        assert_eq!(config.generator.sampling.top_p, 1.0);
        assert_eq!(config.generator.mock.failure_rate, 0.0);
        assert_eq!(config.generator.mock.max_latency_ms, 500);
        assert_eq!(config.cli.default_format, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_sampling_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "sampling:").unwrap();
        writeln!(temp_file, "  top_p: 1.5").unwrap();

        let result = FlashctlConfig::load(&Some(temp_file.path().to_path_buf()));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = FlashctlConfig::load(&Some(PathBuf::from("/nonexistent/flashctl.yaml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_requester_fallback() {
        let config = FlashctlConfig::default();
        assert_eq!(config.requester(&Some("alice".to_string())), "alice");
        assert_eq!(config.requester(&Some("  ".to_string())), "local");
        assert_eq!(config.requester(&None), "local");
    }

    #[test]
    fn test_redacted_hides_key() {
        let mut config = FlashctlConfig::default();
        config.generator.api_key = Some("sk-or-secret".to_string());
        let shown = serde_json::to_string(&config.redacted()).unwrap();
        assert!(!shown.contains("sk-or-secret"));
    }
}
