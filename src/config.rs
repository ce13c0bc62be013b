//! Host configuration.
//!
//! Loaded from a small TOML file. Every key is optional:
//!
//! ```toml
//! byte_order = "native"        # "native" | "little" | "big"
//! max_to_browser = 1048576     # host -> browser cap, bytes
//! max_from_browser = 67108864  # browser -> host cap, bytes
//! read_chunk_size = 8192
//!
//! [log]
//! level = "info"               # overridden by RUST_LOG
//! format = "text"              # "text" | "json"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::codec::ByteOrder;
use crate::error::ConfigError;

/// Host -> browser limit documented by Chromium and Firefox (1 MiB).
pub const MAX_TO_BROWSER: usize = 1_048_576;

/// Browser -> host limit documented by Chromium (64 MiB).
pub const MAX_FROM_BROWSER: usize = 64 * 1_048_576;

pub const DEFAULT_READ_CHUNK_SIZE: usize = 8 * 1024;

/// Environment variable naming a config file for [`HostConfig::from_env`].
pub const CONFIG_ENV_VAR: &str = "NATIVE_EDITOR_HOST_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub byte_order: ByteOrder,
    pub max_to_browser: usize,
    pub max_from_browser: usize,
    pub read_chunk_size: usize,
    pub log: LogConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Native,
            max_to_browser: MAX_TO_BROWSER,
            max_from_browser: MAX_FROM_BROWSER,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"debug"` or `"native_editor_host=trace"`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl HostConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: HostConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Load the file named by [`CONFIG_ENV_VAR`], or defaults when it is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::load_or_default(path.as_deref())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_to_browser == 0 {
            return Err(ConfigError::Invalid("max_to_browser must be > 0".into()));
        }
        if self.max_from_browser == 0 {
            return Err(ConfigError::Invalid("max_from_browser must be > 0".into()));
        }
        if self.read_chunk_size == 0 {
            return Err(ConfigError::Invalid("read_chunk_size must be > 0".into()));
        }
        Ok(())
    }
}
