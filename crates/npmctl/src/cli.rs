//! Clap derive structures for the `npmctl` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};
use npmctl_core::{CertificateProvider, ForwardScheme, TargetState};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// npmctl -- idempotent certificates and proxy hosts for Nginx Proxy Manager
#[derive(Debug, Parser)]
#[command(
    name = "npmctl",
    version,
    about = "Converge Nginx Proxy Manager certificates and proxy hosts",
    long_about = "Brings certificates and proxy hosts of an Nginx Proxy Manager instance\n\
        to a desired state through its management API.\n\n\
        Every run is idempotent: re-running with the same arguments changes nothing.\n\
        Use --dry-run to see what would change without changing it.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "NPMCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Full base URL of the management API (overrides protocol/host/port)
    #[arg(long, env = "NPMCTL_URL", global = true)]
    pub url: Option<String>,

    /// Protocol used to reach the management API
    #[arg(long, env = "NPMCTL_PROTOCOL", global = true)]
    pub protocol: Option<ProtocolArg>,

    /// Host of the management API
    #[arg(long, env = "NPMCTL_HOST", global = true)]
    pub host: Option<String>,

    /// Port of the management API [default: 81]
    #[arg(long, env = "NPMCTL_PORT", global = true)]
    pub port: Option<u16>,

    /// Login identity (email address)
    #[arg(long, short = 'u', env = "NPMCTL_USER", global = true)]
    pub user: Option<String>,

    /// Login password
    #[arg(long, env = "NPMCTL_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Pre-issued API token; skips the login
    #[arg(long, env = "NPMCTL_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NPMCTL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "NPMCTL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds [default: 30]
    #[arg(long, env = "NPMCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
}

impl OutputFormat {
    /// Formats meant for machines rather than people.
    pub fn is_structured(self) -> bool {
        !matches!(self, Self::Table)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProtocolArg {
    Http,
    Https,
}

impl ProtocolArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and print the API token
    Token,

    /// Ensure a certificate is present or absent
    #[command(alias = "cert")]
    Certificate(CertificateArgs),

    /// Ensure a proxy host is present or absent
    #[command(alias = "proxy-host")]
    Proxy(ProxyArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Reconcile commands ───────────────────────────────────────────────

/// Flags shared by every reconcile command.
#[derive(Debug, Args)]
pub struct ReconcileOpts {
    /// Whether the resource should exist [possible values: present, absent]
    #[arg(long, default_value_t = TargetState::Present)]
    pub state: TargetState,

    /// Report what would change without changing anything
    #[arg(long, alias = "check")]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct CertificateArgs {
    /// Domain the certificate is for; `*.<domain>` is covered too
    pub domain_name: String,

    /// DNS provider for the challenge [possible values: domainoffensive, other]
    #[arg(long, default_value_t = CertificateProvider::Other)]
    pub provider: CertificateProvider,

    /// Provider API token, needed only when a certificate gets created
    #[arg(
        long,
        env = "NPMCTL_PROVIDER_CREDENTIALS",
        hide_env_values = true,
        default_value = ""
    )]
    pub provider_credentials: String,

    #[command(flatten)]
    pub reconcile: ReconcileOpts,
}

#[derive(Debug, Args)]
pub struct ProxyArgs {
    /// Domain the proxy host serves
    pub domain_name: String,

    /// Backend host; required unless --state absent
    #[arg(long)]
    pub forward_host: Option<String>,

    /// Backend scheme [possible values: http, https]
    #[arg(long, default_value_t = ForwardScheme::Http)]
    pub forward_scheme: ForwardScheme,

    /// Backend port
    #[arg(long, default_value_t = 80)]
    pub forward_port: u16,

    /// Enable asset caching
    #[arg(long)]
    pub enable_caching: bool,

    /// Allow websocket upgrades
    #[arg(long)]
    pub allow_websockets: bool,

    /// Certificate to serve (0 = none)
    #[arg(long, default_value_t = 0)]
    pub certificate_id: i64,

    /// Redirect plain HTTP to HTTPS
    #[arg(long)]
    pub force_ssl: bool,

    /// Enable HTTP/2
    #[arg(long)]
    pub http2_support: bool,

    #[command(flatten)]
    pub reconcile: ReconcileOpts,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets redacted)
    Show,

    /// Print the config file location
    Path,

    /// Set a value on the active profile
    Set {
        /// Profile key, e.g. "host" or "timeout"
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile to store the password for (defaults to the active one)
        name: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }
}
