use thiserror::Error;

/// Top-level error type for the `npmctl-api` crate.
///
/// Covers every failure mode of the management API: login, transport,
/// unexpected status codes and malformed payloads.
/// `npmctl-core` folds these into its three reconciliation error kinds.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, missing token field, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Only `http` and `https` endpoints exist.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// The server answered with a status other than the one the call expects.
    /// `body` is the raw response text, kept as opaque diagnostics.
    #[error("Unexpected HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// The HTTP status of the failed call, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(e) => e.status().as_ref().map(reqwest::StatusCode::as_u16),
            _ => None,
        }
    }

    /// Diagnostic detail: the raw response body for status failures,
    /// the rendered error otherwise.
    pub fn detail(&self) -> String {
        match self {
            Self::UnexpectedStatus { body, .. } => body.clone(),
            Self::Authentication { message } => message.clone(),
            other => other.to_string(),
        }
    }
}
