use std::{error::Error as _, fmt, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation service host is empty")]
    MissingHost,
    #[error("unsupported scheme '{0}': expected http or https")]
    UnsupportedScheme(String),
    #[error("validation service port must be non-zero")]
    InvalidPort,
    #[error("invalid validation service url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("validation service url '{0}' must not contain a path, query or fragment")]
    UnexpectedPath(String),
}

/// No response was obtained from the validation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let prefix = if err.is_timeout() {
            "request timed out"
        } else if err.is_connect() {
            "could not connect to validation service"
        } else {
            "request failed"
        };

        // reqwest keeps the useful part (refused, dns, tls) in the source chain.
        let mut message = format!("{prefix}: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(&format!(": {cause}"));
            source = cause.source();
        }
        Self { message }
    }
}

/// Why a submission ended in the `Failed` lifecycle state.
///
/// A well-formed `fail` outcome is not a `SubmitError`: it is data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Network error: {0}")]
    Transport(TransportError),
    #[error("HTTP error! Status: {status}{}", DetailSuffix(.detail))]
    Protocol { status: u16, detail: Option<String> },
    #[error("Unexpected response from validation service")]
    Decoding,
    #[error("Validation request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<TransportError> for SubmitError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

struct DetailSuffix<'a>(&'a Option<String>);

impl fmt::Display for DetailSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(detail) => write!(f, " ({detail})"),
            None => Ok(()),
        }
    }
}
