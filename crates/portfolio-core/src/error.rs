//! Error taxonomy for the chat gateway and configuration loading.

use thiserror::Error;

/// Failure of a single chat turn. Every variant is recovered at the gateway
/// boundary; none is fatal to the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyInput,

    #[error("upstream returned HTTP {status}")]
    Upstream { status: u16 },

    #[error("upstream request timed out")]
    Timeout,

    #[error("unexpected failure: {0}")]
    Unknown(String),
}

impl ChatError {
    /// HTTP status the gateway answers with for this failure.
    pub fn http_status(&self) -> u16 {
        match self {
            ChatError::EmptyInput => 400,
            ChatError::Upstream { .. } => 500,
            ChatError::Timeout => 504,
            ChatError::Unknown(_) => 500,
        }
    }

    /// Client-facing text. `Unknown` details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ChatError::EmptyInput => "Message cannot be empty".to_string(),
            ChatError::Upstream { status } => format!("API Error: {}", status),
            ChatError::Timeout => "Request timeout. Please try again.".to_string(),
            ChatError::Unknown(_) => "An error occurred. Please try again.".to_string(),
        }
    }
}

/// Errors raised while loading configuration or the portfolio override file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config source: {0}")]
    Source(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("portfolio TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
