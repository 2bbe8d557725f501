//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use npmctl_config::ConfigError;
use npmctl_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(npmctl::invalid_input),
        help("Nothing was sent to the server. Fix the arguments and run again.")
    )]
    InvalidInput { message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(npmctl::validation))]
    Validation { field: String, reason: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("{context}: {detail}")]
    #[diagnostic(
        code(npmctl::connection_failed),
        help(
            "Check that Nginx Proxy Manager is running and reachable.\n\
             For a self-signed admin interface use --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { context: String, detail: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(npmctl::auth_failed),
        help(
            "Verify the user and password of profile '{profile}'.\n\
             Run: npmctl config set-password {profile}"
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(npmctl::no_credentials),
        help(
            "Configure credentials with: npmctl config init\n\
             Or pass --user/--password, or set NPMCTL_USER and NPMCTL_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{context}: {detail}")]
    #[diagnostic(code(npmctl::api_error))]
    ApiError {
        context: String,
        detail: String,
        status: Option<u16>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(npmctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: npmctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No management API configured")]
    #[diagnostic(
        code(npmctl::no_config),
        help(
            "Create a profile with: npmctl config init (expected at {path})\n\
             Or pass --url, or --host with --protocol/--port."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(npmctl::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to render JSON: {0}")]
    #[diagnostic(code(npmctl::json))]
    Json(#[from] serde_json::Error),

    #[error("failed to render YAML: {0}")]
    #[diagnostic(code(npmctl::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile name to authentication failures.
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                message,
                profile: name.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => CliError::InvalidInput { message },

            CoreError::Auth { message } => CliError::AuthFailed {
                message,
                profile: "default".into(),
            },

            // No status means the server never answered.
            CoreError::Transport {
                context,
                detail,
                status: None,
            } => CliError::ConnectionFailed {
                context: context.into(),
                detail,
            },

            CoreError::Transport {
                context,
                detail,
                status,
            } => CliError::ApiError {
                context: context.into(),
                detail,
                status,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            other => CliError::Config(other),
        }
    }
}
