use serde::{Deserialize, Serialize};

/// Provider-specific configuration, embedded in the application's config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider identifier (google, mock)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// API key (optional, can use env var instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Custom base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_provider() -> String {
    "google".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::google()
    }
}

impl ProviderConfig {
    /// Configuration for the default provider with no overrides
    pub fn google() -> Self {
        Self {
            provider: default_provider(),
            api_key: None,
            base_url: None,
        }
    }
}
