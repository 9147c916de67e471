use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error taxonomy shared by the engine, the store, and the mint client.
///
/// Every error that crosses a crate boundary in this workspace eventually
/// becomes one of these kinds so the HTTP facade can map it to a status code
/// without inspecting the originating layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorKind {
    Connection,
    Database,
    Validation,
    Unknown,
    Timeout,
    NotFound,
    AlreadyExists,
    Unauthorized,
    Server,
    Limit,
}

impl ErrorKind {
    /// The HTTP status this kind maps to by default. `AppError::status_code`
    /// is the source of truth when a call site needs a non-default mapping
    /// (e.g. a melt timeout is 202, not the kind's usual 408).
    pub fn default_status(self) -> u16 {
        match self {
            ErrorKind::Validation | ErrorKind::Limit => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::AlreadyExists => 409,
            ErrorKind::Timeout => 408,
            ErrorKind::Connection | ErrorKind::Database | ErrorKind::Server => 500,
            ErrorKind::Unknown => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Connection => "CONNECTION",
            ErrorKind::Database => "DATABASE",
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::Unknown => "UNKNOWN",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::NotFound => "NOTFOUND",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Server => "SERVER",
            ErrorKind::Limit => "LIMIT",
        };
        f.write_str(s)
    }
}

/// Application-level error carrying its own HTTP status, distinct from the
/// process's ordinary failure channel. The facade branches on `kind`/
/// `status_code`, never on a type hierarchy.
#[derive(Debug, Error, Clone)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub status_code: u16,
    pub kind: ErrorKind,
    pub message: String,
    pub params: HashMap<String, String>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status_code: kind.default_status(),
            kind,
            message: message.into(),
            params: HashMap::new(),
        }
    }

    /// Override the default status for this kind (e.g. a melt TIMEOUT is
    /// reported as 202 Accepted, not 408).
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Limit, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// TIMEOUT is reported to callers as 202 Accepted: the request is not a
    /// failure, it means "still pending, check back later".
    pub fn timeout_pending(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message).with_status(202)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }
}
