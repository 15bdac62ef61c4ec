//! Ledger configuration, loaded from TOML with CLI/env overrides on top.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use billchain_contract::{BillContract, BillQueries, Dispatcher, TransitionPolicy};
use billchain_store_lmdb::{DEFAULT_MAP_SIZE, DEFAULT_MAX_DBS};
use billchain_utils::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("failed to render config: {0}")]
    Render(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    #[serde(default = "default_max_dbs")]
    pub max_dbs: u32,

    /// Filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Reject lifecycle operations the intended state diagram forbids.
    #[serde(default)]
    pub strict_transitions: bool,

    /// Keep the owner/phase composite-key history queries reachable.
    #[serde(default = "default_true")]
    pub legacy_owner_phase_queries: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./billchain_data")
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

fn default_max_dbs() -> u32 {
    DEFAULT_MAX_DBS
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            max_dbs: default_max_dbs(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            strict_transitions: false,
            legacy_owner_phase_queries: default_true(),
        }
    }
}

impl LedgerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Render(e.to_string()))
    }

    pub fn transition_policy(&self) -> TransitionPolicy {
        if self.strict_transitions {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Permissive
        }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            BillContract::new(self.transition_policy()),
            BillQueries::new(self.legacy_owner_phase_queries),
        )
    }
}

/// Values supplied on the command line or through `BILLCHAIN_*` variables.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub map_size: Option<usize>,
    pub max_dbs: Option<u32>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub strict_transitions: Option<bool>,
    pub legacy_owner_phase_queries: Option<bool>,
}

impl ConfigOverrides {
    pub fn apply(self, base: LedgerConfig) -> LedgerConfig {
        LedgerConfig {
            data_dir: self.data_dir.unwrap_or(base.data_dir),
            map_size: self.map_size.unwrap_or(base.map_size),
            max_dbs: self.max_dbs.unwrap_or(base.max_dbs),
            log_level: self.log_level.unwrap_or(base.log_level),
            log_format: self.log_format.unwrap_or(base.log_format),
            strict_transitions: self.strict_transitions.unwrap_or(base.strict_transitions),
            legacy_owner_phase_queries: self
                .legacy_owner_phase_queries
                .unwrap_or(base.legacy_owner_phase_queries),
        }
    }
}
