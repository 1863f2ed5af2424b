//! Speech synthesis provider implementations

mod google;
pub mod mock;

pub use google::GoogleTtsProvider;
pub use mock::MockSynthesizer;

use crate::config::ProviderConfig;
use crate::error::{Result, TtsError};
use crate::synthesizer::SpeechSynthesizer;

/// Environment variable consulted when no API key is configured
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_TTS_API_KEY";

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Google,
    Mock,
}

impl ProviderKind {
    /// Parse provider kind from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" | "google-cloud" | "gcloud" => Ok(Self::Google),
            "mock" => Ok(Self::Mock),
            _ => Err(TtsError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }
}

/// Create a provider instance from configuration
pub fn get_provider(config: &ProviderConfig) -> Result<Box<dyn SpeechSynthesizer>> {
    match ProviderKind::from_str(&config.provider)? {
        ProviderKind::Google => {
            let api_key = get_api_key(config, GOOGLE_API_KEY_ENV, "Google Cloud TTS")?;
            Ok(Box::new(GoogleTtsProvider::new(
                api_key,
                config.base_url.clone(),
            )))
        }
        ProviderKind::Mock => Ok(Box::new(MockSynthesizer::new())),
    }
}

/// Get API key from config or environment variable
fn get_api_key(config: &ProviderConfig, env_var: &str, provider_name: &str) -> Result<String> {
    // Check config first
    if let Some(key) = config.api_key.clone().filter(|k| !k.is_empty()) {
        return Ok(key);
    }

    // Fall back to environment variable
    std::env::var(env_var).map_err(|_| TtsError::MissingApiKey {
        provider: provider_name.to_string(),
        env_var: env_var.to_string(),
    })
}
