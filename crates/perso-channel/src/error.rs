//! Error type for the command channel.
//!
//! There is one error type. Callers tell failures apart by [`ErrorKind`] or
//! by the numeric `code`, mirroring the HTTP-ish codes the bot reports.

use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Authentication handshake rejected.
pub const CODE_UNAUTHORIZED: u16 = 401;
/// Truncated frame, oversized frame or exchange timeout.
pub const CODE_REQUEST_TIMEOUT: u16 = 408;
/// Backend could not be reached.
pub const CODE_SERVICE_UNAVAILABLE: u16 = 503;

/// Broad class of a channel failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport could not be established.
    Connection,
    /// Frame truncated, oversized, or the exchange timed out.
    Protocol,
    /// Handshake rejected by the server.
    Authentication,
    /// Anything else; the original cause is kept in `details`.
    Unexpected,
}

/// Structured channel error.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[ChannelError] {message}{}", render_suffix(.code, .details))]
pub struct ChannelError {
    /// Failure class.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Optional numeric code (401, 408, 503).
    pub code: Option<u16>,
    /// Diagnostic detail.
    pub details: Map<String, Value>,
}

/// Result type alias using ChannelError.
pub type ChannelResult<T> = Result<T, ChannelError>;

impl ChannelError {
    /// Build an error with no details.
    pub fn new(kind: ErrorKind, message: impl Into<String>, code: Option<u16>) -> Self {
        Self {
            kind,
            message: message.into(),
            code,
            details: Map::new(),
        }
    }

    /// Attach a single detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// The backend refused or could not be reached.
    pub fn connection(cause: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::Connection,
            "Could not connect to the backend",
            Some(CODE_SERVICE_UNAVAILABLE),
        )
        .with_detail("exception", cause.to_string())
    }

    /// The peer closed the stream before a full frame arrived.
    pub fn truncated() -> Self {
        Self::new(
            ErrorKind::Protocol,
            "Connection interrupted or invalid response from server",
            Some(CODE_REQUEST_TIMEOUT),
        )
    }

    /// The peer announced a frame larger than we accept.
    pub fn oversized(declared: usize, max: usize) -> Self {
        Self::new(
            ErrorKind::Protocol,
            "Frame length exceeds limit",
            Some(CODE_REQUEST_TIMEOUT),
        )
        .with_detail("declared_len", declared)
        .with_detail("max_len", max)
    }

    /// The whole exchange did not finish within the configured budget.
    pub fn timeout(limit: Duration) -> Self {
        Self::new(
            ErrorKind::Protocol,
            "Timed out waiting for the backend",
            Some(CODE_REQUEST_TIMEOUT),
        )
        .with_detail("timeout_ms", limit.as_millis() as u64)
    }

    /// The handshake was answered with anything other than `status == "OK"`.
    ///
    /// The server's `msg` becomes the message; the full reply is kept as
    /// details.
    pub fn authentication(reply: &Value) -> Self {
        let message = match reply.get("msg") {
            Some(Value::String(msg)) => msg.clone(),
            Some(other) => other.to_string(),
            None => "Authentication failed".to_string(),
        };

        let details = match reply {
            Value::Object(map) => map.clone(),
            other => {
                let mut map = Map::new();
                map.insert("response".to_string(), other.clone());
                map
            }
        };

        Self {
            kind: ErrorKind::Authentication,
            message,
            code: Some(CODE_UNAUTHORIZED),
            details,
        }
    }

    /// Catch-all wrapping the original failure's description.
    pub fn unexpected(cause: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Unexpected, "Unexpected error", None)
            .with_detail("exception", cause.to_string())
    }

    /// Whether a caller may reasonably retry (with backoff).
    pub fn is_transient(&self) -> bool {
        matches!(self.kind, ErrorKind::Connection | ErrorKind::Protocol)
    }
}

fn render_suffix(code: &Option<u16>, details: &Map<String, Value>) -> String {
    let mut out = String::new();
    if let Some(code) = code {
        out.push_str(&format!(" (Code {})", code));
    }
    if !details.is_empty() {
        out.push_str(&format!(" | Details: {}", Value::Object(details.clone())));
    }
    out
}
