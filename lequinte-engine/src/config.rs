use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Impossible de lire la configuration {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Configuration JSON invalide dans {path}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Configuration invalide : {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Nombre de combinaisons proposées.
    pub top_k: usize,
    /// Bonus per remaining position: the winner of an L-horse result gets `bonus_step * L`.
    pub bonus_step: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            bonus_step: 0.3,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::Invalid("top_k doit être >= 1".to_string()));
        }
        if !self.bonus_step.is_finite() || self.bonus_step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "bonus_step doit être > 0 (reçu {})",
                self.bonus_step
            )));
        }
        Ok(())
    }
}

/// Reads a JSON config; fields left out keep their default value.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: EngineConfig = serde_json::from_str(&json).map_err(|source| ConfigError::Json {
        path: path.display().to_string(),
        source,
    })?;
    config.validate()?;
    log::debug!("Configuration chargée depuis {}: {:?}", path.display(), config);
    Ok(config)
}
