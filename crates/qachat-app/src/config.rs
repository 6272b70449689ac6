//! Startup configuration from the process environment.

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const MODEL_VAR: &str = "QACHAT_MODEL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing API key: set the {API_KEY_VAR} environment variable")]
    MissingApiKey,
}

/// Resolved application configuration. Read once at startup; a missing
/// credential is fatal before any session starts.
pub struct AppConfig {
    pub api_key: String,
    pub model: Option<String>,
}

impl AppConfig {
    /// Read configuration from the environment. `model_override` (from the
    /// CLI) wins over `QACHAT_MODEL`; neither being set leaves the client's
    /// default model in effect.
    pub fn from_env(model_override: Option<String>) -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let model = model_override.or_else(|| std::env::var(MODEL_VAR).ok());

        Ok(Self { api_key, model })
    }
}
