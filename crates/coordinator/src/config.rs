//! Configuration for the coordinator.
//!
//! Loaded from TOML; every section has defaults so an empty file (or no file)
//! yields a working Gemini-backed coordinator once a credential is present in
//! the environment.

use komando_agents::ExecutorConfig;
use komando_llm::LlmConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::conversation::DEFAULT_WELCOME_MESSAGE;

/// Main coordinator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Classifier provider configuration
    #[serde(default)]
    pub provider: LlmConfig,

    /// Sub-agent executor latency
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Text of the seeded coordinator turn
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
}

fn default_welcome_message() -> String {
    DEFAULT_WELCOME_MESSAGE.into()
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            provider: LlmConfig::default(),
            executor: ExecutorConfig::default(),
            welcome_message: default_welcome_message(),
        }
    }
}

impl CoordinatorConfig {
    /// Load configuration from a TOML file.
    ///
    /// On Unix the file must be a regular file, and must not be world-readable
    /// when it stores an API key.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Self = toml::from_str(&content)?;

        if config.provider.api_key.is_some() {
            #[cfg(unix)]
            validate_config_file_permissions(path)?;

            warn!(
                "API key found in config file '{}'. For better security, \
                 use environment variables instead ({}).",
                path.display(),
                config.provider.credential_env_vars().join(", ")
            );
        }

        Ok(config)
    }
}

#[cfg(unix)]
fn validate_config_file_permissions(path: &std::path::Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::symlink_metadata(path)?;
    if !metadata.is_file() {
        anyhow::bail!(
            "Config path '{}' is not a regular file. Symlinks and directories are not allowed.",
            path.display()
        );
    }

    let permission_bits = metadata.permissions().mode() & 0o777;
    if permission_bits & 0o004 != 0 {
        anyhow::bail!(
            "Config file '{}' contains an API key but is world-readable (mode {:04o}). \
             Fix with: chmod 600 {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    Ok(())
}
