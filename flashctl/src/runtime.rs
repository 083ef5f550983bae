//! Generator selection, done once at start-up

use crate::errors::CliError;
use flashgen_connector_openrouter::OpenRouterGenerator;
use flashgen_core::prelude::*;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the generator named by `settings.provider`.
///
/// `openrouter` without a credential falls back to the mock generator.
pub fn build_generator(settings: &GeneratorSettings) -> Result<Arc<dyn Generator>, CliError> {
    match settings.provider {
        ProviderKind::OpenRouter if settings.credential().is_some() => {
            let generator = OpenRouterGenerator::from_settings(settings)?;
            info!("Using OpenRouter generator with model {}", generator.model());
            Ok(Arc::new(generator))
        }
        ProviderKind::OpenRouter => {
            warn!("No OpenRouter API key configured, falling back to the mock generator");
            Ok(Arc::new(MockGenerator::new(settings.mock.clone())))
        }
        ProviderKind::Mock => {
            info!("Using mock generator");
            Ok(Arc::new(MockGenerator::new(settings.mock.clone())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_by_default() {
        let generator = build_generator(&GeneratorSettings::default()).unwrap();
        assert_eq!(generator.model(), MOCK_MODEL);
    }

    #[test]
    fn test_openrouter_without_key_falls_back() {
        let settings = GeneratorSettings {
            provider: ProviderKind::OpenRouter,
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(build_generator(&settings).unwrap().model(), MOCK_MODEL);
    }

    #[test]
    fn test_openrouter_with_key() {
        let settings = GeneratorSettings {
            provider: ProviderKind::OpenRouter,
            api_key: Some("sk-or-test".to_string()),
            model: "openai/gpt-4o-mini".to_string(),
            ..Default::default()
        };
        assert_eq!(build_generator(&settings).unwrap().model(), "openai/gpt-4o-mini");
    }
}
