//! Provider configuration and classifier client construction.

use std::sync::Arc;

use komando_common::{KomandoError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ClassifierClient;
use crate::gemini::GeminiClient;
use crate::openai::OpenAiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider type: "gemini" or "openai"
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// If not set, read from the provider's environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_provider() -> String {
    "gemini".into()
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

// Low temperature keeps delegation decisions stable.
fn default_temperature() -> f32 {
    0.2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            api_url: None,
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

impl LlmConfig {
    /// Environment variables consulted for the credential, in priority order.
    pub fn credential_env_vars(&self) -> &'static [&'static str] {
        match self.provider.as_str() {
            "gemini" => &["GEMINI_API_KEY", "API_KEY"],
            "openai" => &["OPENAI_API_KEY"],
            _ => &[],
        }
    }

    /// Resolve the API key from config or environment variables.
    ///
    /// Priority:
    /// 1. Explicit, non-empty `api_key` in config
    /// 2. The provider's environment variables (see [`Self::credential_env_vars`])
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    pub fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }

        self.credential_env_vars()
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.is_empty())
    }
}

/// Create the classifier client described by `config`.
///
/// Fails with [`KomandoError::Config`] when the provider is unknown or no
/// credential can be resolved.
pub fn build_classifier_client(config: &LlmConfig) -> Result<Arc<dyn ClassifierClient>> {
    build_classifier_client_with_key(config, config.resolve_api_key())
}

pub fn build_classifier_client_with_key(
    config: &LlmConfig,
    api_key: Option<String>,
) -> Result<Arc<dyn ClassifierClient>> {
    let missing_key = || {
        KomandoError::Config(format!(
            "{} requires an API key (set api_key or one of {:?})",
            config.provider,
            config.credential_env_vars()
        ))
    };

    let client: Arc<dyn ClassifierClient> = match config.provider.as_str() {
        "gemini" => {
            let api_key = api_key.ok_or_else(missing_key)?;
            Arc::new(GeminiClient::new(
                config.api_url.clone(),
                config.model.clone(),
                api_key,
            ))
        }
        "openai" => {
            let api_key = api_key.ok_or_else(missing_key)?;
            Arc::new(OpenAiClient::new(
                config.api_url.clone(),
                config.model.clone(),
                api_key,
            ))
        }
        other => {
            return Err(KomandoError::Config(format!(
                "Unknown LLM provider: {other}"
            )));
        }
    };

    info!(provider = %config.provider, model = %config.model, "Classifier client created");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML_CONFIG: &str = r#"
provider = "openai"
model = "gpt-4o-mini"
api_url = "http://localhost:11434"
temperature = 0.1
max_tokens = 256
"#;

    #[test]
    fn deserialize_config_from_toml() {
        let config: LlmConfig = toml::from_str(TOML_CONFIG).unwrap();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:11434"));
        assert!(config.api_key.is_none());
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.max_tokens, Some(256));
    }

    #[test]
    fn deserialize_config_defaults() {
        let config: LlmConfig = toml::from_str("").unwrap();
        assert_eq!(config.provider, "gemini");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn explicit_key_wins_over_environment() {
        let config = LlmConfig {
            api_key: Some("from-config".to_string()),
            ..Default::default()
        };
        let key = config.resolve_api_key_with(|_| Some("from-env".to_string()));
        assert_eq!(key.as_deref(), Some("from-config"));
    }

    #[test]
    fn gemini_key_falls_back_through_env_vars() {
        let config = LlmConfig::default();
        let key = config.resolve_api_key_with(|name| {
            (name == "API_KEY").then(|| "legacy-key".to_string())
        });
        assert_eq!(key.as_deref(), Some("legacy-key"));

        let key = config.resolve_api_key_with(|name| match name {
            "GEMINI_API_KEY" => Some("primary".to_string()),
            _ => Some("secondary".to_string()),
        });
        assert_eq!(key.as_deref(), Some("primary"));
    }

    #[test]
    fn empty_values_are_ignored() {
        let config = LlmConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(config.resolve_api_key_with(|_| Some(String::new())).is_none());
    }

    #[test]
    fn build_gemini_client() {
        let client =
            build_classifier_client_with_key(&LlmConfig::default(), Some("key".to_string()))
                .unwrap();
        assert_eq!(client.model_name(), "gemini-2.5-flash");
    }

    #[test]
    fn build_openai_client() {
        let config = LlmConfig {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            ..Default::default()
        };
        let client = build_classifier_client_with_key(&config, Some("sk".to_string())).unwrap();
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn build_without_key_is_config_error() {
        let result = build_classifier_client_with_key(&LlmConfig::default(), None);
        assert!(matches!(result, Err(KomandoError::Config(_))));
    }

    #[test]
    fn build_unknown_provider_fails() {
        let config = LlmConfig {
            provider: "anthropic".to_string(),
            ..Default::default()
        };
        let result = build_classifier_client_with_key(&config, Some("key".to_string()));
        assert!(matches!(result, Err(KomandoError::Config(ref m)) if m.contains("anthropic")));
    }
}
