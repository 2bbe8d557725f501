// ── Core error types ──
//
// The three ways a reconciliation can fail. Every error is terminal for
// the current invocation: nothing is retried and nothing is rolled back.
// API errors are folded in with a context string naming the step that
// failed; the raw response body travels along as `detail`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Missing or contradictory input. Raised before any remote call
    /// whenever the input alone is enough to know.
    #[error("{message}")]
    Validation { message: String },

    /// Login rejected, or a login response without a token.
    #[error("{message}")]
    Auth { message: String },

    /// A CRUD call failed or answered with an unexpected status.
    #[error("{context}: {detail}")]
    Transport {
        context: &'static str,
        /// Raw response body, or the transport failure rendered as text.
        detail: String,
        /// HTTP status when the server answered at all.
        status: Option<u16>,
    },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Wrap an API error that happened during `context`.
    pub fn transport(context: &'static str, err: &npmctl_api::Error) -> Self {
        Self::Transport {
            context,
            detail: err.detail(),
            status: err.status(),
        }
    }

    /// Translate a login failure: rejected credentials are `Auth`,
    /// anything that never reached a verdict is `Transport`.
    pub fn from_login(err: &npmctl_api::Error) -> Self {
        match err {
            npmctl_api::Error::Authentication { message } => Self::Auth {
                message: message.clone(),
            },
            other => Self::transport("error on fetching API token", other),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transport {
            context: "error on encoding payload",
            detail: err.to_string(),
            status: None,
        }
    }
}
