use thiserror::Error;

/// Errors raised while validating simulation input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid roulette number: {0} (expected 0-36)")]
    InvalidNumber(u8),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
