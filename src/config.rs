//! Typed configuration, read once from the process environment.
//!
//! | Variable         | Default               |
//! |------------------|-----------------------|
//! | `region`         | `us-east-1`           |
//! | `bucket`         | unset (not used yet)  |
//! | `model_id`       | `anthropic.claude-v2` |
//! | `on_model_error` | `silent`              |
//!
//! Names are matched case-insensitively, so `MODEL_ID` works as well.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridge::FailurePolicy;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-v2";

const ENV_KEYS: [&str; 4] = ["region", "bucket", "model_id", "on_model_error"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("configuration value `{field}` must not be empty")]
    Empty { field: &'static str },
}

/// Process-wide settings for the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub region: String,
    /// Output bucket. Declared for deployments that set it; nothing reads it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    pub model_id: String,
    pub on_model_error: FailurePolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_owned(),
            bucket: None,
            model_id: DEFAULT_MODEL_ID.to_owned(),
            on_model_error: FailurePolicy::default(),
        }
    }
}

impl BridgeConfig {
    /// Defaults overlaid with the environment.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::raw().only(&ENV_KEYS))
    }

    /// Loads and validates the configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Load`] when a variable has the wrong shape (for example
    /// an unknown `on_model_error`), [`ConfigError::Empty`] when `region` or
    /// `model_id` is set to an empty string.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region.trim().is_empty() {
            return Err(ConfigError::Empty { field: "region" });
        }
        if self.model_id.trim().is_empty() {
            return Err(ConfigError::Empty { field: "model_id" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_environment() {
        Jail::expect_with(|_jail| {
            let config = BridgeConfig::from_env().map_err(|e| e.to_string())?;
            assert_eq!(config.region, DEFAULT_REGION);
            assert_eq!(config.model_id, DEFAULT_MODEL_ID);
            assert_eq!(config.bucket, None);
            assert_eq!(config.on_model_error, FailurePolicy::Silent);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("region", "eu-west-2");
            jail.set_env("bucket", "transcripts");
            jail.set_env("MODEL_ID", "anthropic.claude-instant-v1");
            jail.set_env("on_model_error", "apologize");

            let config = BridgeConfig::from_env().map_err(|e| e.to_string())?;
            assert_eq!(config.region, "eu-west-2");
            assert_eq!(config.bucket.as_deref(), Some("transcripts"));
            assert_eq!(config.model_id, "anthropic.claude-instant-v1");
            assert_eq!(config.on_model_error, FailurePolicy::Apologize);
            Ok(())
        });
    }

    #[test]
    fn unknown_policy_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("on_model_error", "retry");
            assert!(matches!(
                BridgeConfig::from_env(),
                Err(ConfigError::Load(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn empty_model_id_is_rejected() {
        let config = BridgeConfig {
            model_id: " ".into(),
            ..BridgeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Empty { field: "model_id" })
        ));
    }
}
