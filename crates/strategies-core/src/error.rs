use crate::request::Method;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the request router.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No mock handler is registered for the request (mock mode only).
    #[error("no mock route for {method} {path}")]
    RouteNotFound { method: Method, path: String },

    /// The caller aborted the request before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// A typed call received a non-success status.
    #[error("request failed with status {status}")]
    Status { status: u16, body: Value },

    /// Transport failure talking to the live backend.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RouterError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RouterError::Status { status, .. } => Some(*status),
            RouterError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RouterError>;
