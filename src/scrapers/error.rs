//! Fetch error taxonomy.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Why a request failed before producing a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportReason {
    Timeout,
    Connection,
    Protocol,
}

impl fmt::Display for TransportReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportReason::Timeout => write!(f, "timeout"),
            TransportReason::Connection => write!(f, "connection"),
            TransportReason::Protocol => write!(f, "protocol"),
        }
    }
}

/// Errors produced by a single outbound request or file write.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{reason} error fetching {url}: {message}")]
    Transport {
        url: String,
        reason: TransportReason,
        message: String,
    },
    #[error("HTTP {status}: {url}")]
    Http { status: u16, url: String },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Classify a reqwest error into the transport taxonomy.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            };
        }
        let reason = if err.is_timeout() {
            TransportReason::Timeout
        } else if err.is_connect() {
            TransportReason::Connection
        } else {
            TransportReason::Protocol
        };
        FetchError::Transport {
            url: url.to_string(),
            reason,
            message: err.to_string(),
        }
    }

    pub fn write(path: &Path, source: io::Error) -> Self {
        FetchError::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The transport reason, if this is a transport failure.
    pub fn transport_reason(&self) -> Option<TransportReason> {
        match self {
            FetchError::Transport { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// HTTP status of a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
