use std::path::PathBuf;

/// Errors raised while turning one frame into a message, or one message into a frame.
///
/// Each variant concerns a single frame. A [`crate::codec::Decoder`] that reports one of
/// these keeps decoding the frames that follow it.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload bytes are not valid UTF-8.
    #[error("frame payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The payload is UTF-8 but not a JSON document.
    #[error("frame payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The value handed to the encoder cannot be serialized.
    #[error("value cannot be encoded as JSON: {0}")]
    Unencodable(#[source] serde_json::Error),

    /// The payload exceeds what the length prefix or the configured limit allows.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

/// Errors raised while loading a [`crate::config::HostConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Host-level error: anything that can stop the stdio loop.
#[derive(Debug, thiserror::Error)]
pub enum NmError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("host I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to install log subscriber: {0}")]
    Logging(String),

    /// The browser closed the pipe. Hosts treat this as a normal shutdown.
    #[error("browser disconnected")]
    Disconnected,

    #[error("background task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, NmError>;
