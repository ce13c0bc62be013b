//! Log setup for hosts.
//!
//! Stdout belongs to the protocol, so every subscriber installed here writes to stderr.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogConfig, LogFormat};
use crate::error::{NmError, Result};

/// Install a global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` wins over `config.level` when set. Calling this twice returns
/// [`NmError::Logging`].
pub fn init(config: &LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| NmError::Logging(e.to_string()))?;
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    match config.format {
        LogFormat::Json => subscriber.json().try_init(),
        LogFormat::Text => subscriber.try_init(),
    }
    .map_err(|e| NmError::Logging(e.to_string()))
}
