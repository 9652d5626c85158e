//! Error handling and custom error types
//!
//! Provides unified error handling across the proxies and the client
//! controller using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Generic error: {0}")]
    Generic(String),
}

impl Error {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Upstream {
            status,
            message: message.into(),
        }
    }

    /// HTTP status this error should be reported with.
    ///
    /// Upstream errors keep the provider's status when it is a valid error
    /// code; everything without a status is a 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Upstream {
                status: Some(status),
                ..
            } if (400..=599).contains(status) => *status,
            _ => 500,
        }
    }

    /// Client-facing classification reported in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "configuration_error",
            Error::Validation(_) => "invalid_request_error",
            _ => "unknown_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
