// config.rs — Runtime configuration
//
// Resolution order for the config path: --config flag, CERTLEDGER_CONFIG,
// then ./certledger.json. A missing file is created with defaults so the
// operator has something to edit.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{AdminAllowList, Authorizer};
use crate::cert::issue::DEFAULT_FRAUD_THRESHOLD;
use crate::error::ConfigError;
use crate::fraud::MAX_SCORE;

pub const CONFIG_ENV: &str = "CERTLEDGER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "certledger.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Root of the JSON-directory store.
    pub data_dir: PathBuf,
    /// Accounts with these emails are always ADMIN/ACTIVE.
    pub super_admins: Vec<String>,
    /// Suspicious reports scoring strictly above this block issuance.
    pub fraud_block_threshold: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("certledger-data"),
            super_admins: Vec::new(),
            fraud_block_threshold: DEFAULT_FRAUD_THRESHOLD,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fraud_block_threshold > MAX_SCORE {
            return Err(ConfigError::Invalid(format!(
                "fraudBlockThreshold {} exceeds {}",
                self.fraud_block_threshold, MAX_SCORE
            )));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("dataDir must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn authorizer(&self) -> Authorizer {
        Authorizer::new(AdminAllowList::new(&self.super_admins))
    }
}

/// Pick the config path from an explicit flag or the environment.
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var(CONFIG_ENV) {
        Ok(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

pub fn load_or_create(path: &Path) -> Result<Config, ConfigError> {
    let config = if path.exists() {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        info!(path = %path.display(), "no config found, writing defaults");
        let config = Config::default();
        write_config(path, &config)?;
        config
    };
    config.validate()?;
    Ok(config)
}

fn write_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(io_err)
}
