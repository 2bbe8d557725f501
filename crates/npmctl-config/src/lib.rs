//! Configuration for the `npmctl` binary.
//!
//! TOML profiles layered with figment (defaults, file, `NPMCTL_` env vars),
//! credential resolution (env, keyring, plaintext) and translation into the
//! endpoint, credentials and transport settings the API client needs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use npmctl_api::{Credentials, Endpoint, Protocol, TlsMode, TransportConfig};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Keyring service all secrets are stored under.
pub const KEYRING_SERVICE: &str = "npmctl";

/// Env var consulted for the password when the profile names none.
pub const PASSWORD_ENV: &str = "NPMCTL_PASSWORD";

/// Env var consulted for the login identity when the profile has none.
pub const USER_ENV: &str = "NPMCTL_USER";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named management API profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    TransportConfig::DEFAULT_TIMEOUT_SECS
}

/// A named management API profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Full base URL (e.g. "http://192.168.0.5:81"). Wins over
    /// `protocol`/`host`/`port` when set.
    pub url: Option<String>,

    /// "http" or "https".
    #[serde(default = "default_protocol")]
    pub protocol: String,

    pub host: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Login identity (an email address for NPM).
    pub user: Option<String>,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Pre-issued API token; skips the login when set.
    pub token: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            url: None,
            protocol: default_protocol(),
            host: None,
            port: default_port(),
            user: None,
            password: None,
            password_env: None,
            token: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

fn default_protocol() -> String {
    "http".into()
}
fn default_port() -> u16 {
    Endpoint::DEFAULT_PORT
}

impl Profile {
    /// Where this profile's management API listens.
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        if let Some(ref raw) = self.url {
            return parse_url_endpoint(raw);
        }

        let protocol = Protocol::from_str(&self.protocol).map_err(|_| ConfigError::Validation {
            field: "protocol".into(),
            reason: format!("expected 'http' or 'https', got '{}'", self.protocol),
        })?;
        let host = self
            .host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ConfigError::Validation {
                field: "host".into(),
                reason: "either 'url' or 'host' must be set".into(),
            })?;
        Ok(Endpoint::new(protocol, host, self.port))
    }

    /// TLS and timeout settings, falling back to the global defaults.
    pub fn transport(&self, defaults: &Defaults) -> TransportConfig {
        let tls = TlsMode::select(
            self.insecure.unwrap_or(defaults.insecure),
            self.ca_cert.as_deref(),
        );
        TransportConfig::new(tls, self.timeout.unwrap_or(defaults.timeout))
    }
}

/// Parse a full base URL into an [`Endpoint`].
pub fn parse_url_endpoint(raw: &str) -> Result<Endpoint, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    Endpoint::try_from(&url).map_err(|e| ConfigError::Validation {
        field: "url".into(),
        reason: e.to_string(),
    })
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "npmctl", "npmctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("npmctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// Nested keys come from double underscores, e.g.
/// `NPMCTL_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NPMCTL_").split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), profiles = config.profiles.len(), "config loaded");
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the login identity: profile, then `NPMCTL_USER`.
pub fn resolve_user(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .user
        .clone()
        .or_else(|| std::env::var(USER_ENV).ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Resolve the password from the credential chain (no CLI flag step).
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    resolve_password_with(profile, profile_name, keyring_password)
}

/// Credential chain with a pluggable keyring lookup:
/// `password_env` → `NPMCTL_PASSWORD` → keyring → plaintext.
pub fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    keyring: impl FnOnce(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Well-known env var
    if let Ok(val) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Some(secret) = keyring(profile_name) {
        return Ok(SecretString::from(secret));
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve everything needed to log in with `profile`.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Credentials, ConfigError> {
    Ok(Credentials {
        endpoint: profile.endpoint()?,
        user: resolve_user(profile, profile_name)?,
        password: resolve_password(profile, profile_name)?,
    })
}

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Password stored in the system keyring for `profile_name`, if any.
pub fn keyring_password(profile_name: &str) -> Option<String> {
    keyring_entry(profile_name)
        .and_then(|entry| entry.get_password())
        .ok()
}

/// Store the password for `profile_name` in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn no_keyring(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn endpoint_from_host_uses_default_port() {
        let profile = Profile {
            host: Some("192.168.0.5".into()),
            ..Profile::default()
        };
        let endpoint = profile.endpoint().unwrap();
        assert_eq!(endpoint.to_string(), "http://192.168.0.5:81");
    }

    #[test]
    fn endpoint_url_wins_over_host() {
        let profile = Profile {
            url: Some("https://npm.example.com:8443".into()),
            host: Some("ignored".into()),
            ..Profile::default()
        };
        let endpoint = profile.endpoint().unwrap();
        assert_eq!(endpoint, Endpoint::new(Protocol::Https, "npm.example.com", 8443));
    }

    #[test]
    fn endpoint_url_keeps_path_prefix() {
        let profile = Profile {
            url: Some("https://proxy.example.com/npm".into()),
            ..Profile::default()
        };
        let endpoint = profile.endpoint().unwrap();
        assert_eq!(endpoint.base_path, "/npm");
        assert_eq!(endpoint.url().unwrap().as_str(), "https://proxy.example.com/npm");
    }

    #[test]
    fn endpoint_requires_host_or_url() {
        let err = Profile::default().endpoint().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "host"));
    }

    #[test]
    fn endpoint_rejects_unknown_protocol() {
        let profile = Profile {
            protocol: "gopher".into(),
            host: Some("npm.local".into()),
            ..Profile::default()
        };
        assert!(profile.endpoint().is_err());
    }

    #[test]
    fn transport_prefers_insecure_over_ca() {
        let profile = Profile {
            insecure: Some(true),
            ca_cert: Some(PathBuf::from("/etc/ca.pem")),
            timeout: Some(5),
            ..Profile::default()
        };
        let transport = profile.transport(&Defaults::default());
        assert_eq!(transport.tls, TlsMode::DangerAcceptInvalid);
        assert_eq!(transport.timeout, Duration::from_secs(5));
    }

    #[test]
    fn transport_falls_back_to_defaults() {
        let transport = Profile::default().transport(&Defaults::default());
        assert_eq!(transport.tls, TlsMode::System);
        assert_eq!(transport.timeout, Duration::from_secs(30));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                host: Some("192.168.0.5".into()),
                user: Some("admin@example.com".into()),
                ..Profile::default()
            },
        );

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        let home = &loaded.profiles["home"];
        assert_eq!(home.host.as_deref(), Some("192.168.0.5"));
        assert_eq!(home.port, 81);
        assert_eq!(home.protocol, "http");
        assert_eq!(loaded.default_profile.as_deref(), Some("default"));
    }

    #[test]
    fn env_overrides_file_values() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "home"

                [defaults]
                timeout = 10

                [profiles.home]
                host = "npm.local"
                "#,
            )?;
            jail.set_env("NPMCTL_DEFAULTS__TIMEOUT", "60");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.defaults.timeout, 60);
            assert_eq!(cfg.default_profile.as_deref(), Some("home"));
            assert_eq!(cfg.profiles["home"].host.as_deref(), Some("npm.local"));
            Ok(())
        });
    }

    #[test]
    fn password_chain_order() {
        Jail::expect_with(|jail| {
            let profile = Profile {
                password_env: Some("HOME_NPM_PASSWORD".into()),
                password: Some("plaintext".into()),
                ..Profile::default()
            };

            // Nothing set in the environment: keyring beats plaintext.
            let pw = resolve_password_with(&profile, "home", |_| Some("from-keyring".into()))
                .unwrap();
            assert_eq!(pw.expose_secret(), "from-keyring");

            let pw = resolve_password_with(&profile, "home", no_keyring).unwrap();
            assert_eq!(pw.expose_secret(), "plaintext");

            jail.set_env(PASSWORD_ENV, "from-global-env");
            let pw = resolve_password_with(&profile, "home", no_keyring).unwrap();
            assert_eq!(pw.expose_secret(), "from-global-env");

            jail.set_env("HOME_NPM_PASSWORD", "from-profile-env");
            let pw = resolve_password_with(&profile, "home", no_keyring).unwrap();
            assert_eq!(pw.expose_secret(), "from-profile-env");
            Ok(())
        });
    }

    #[test]
    fn missing_password_names_profile() {
        Jail::expect_with(|_| {
            let err = resolve_password_with(&Profile::default(), "home", no_keyring).unwrap_err();
            assert_eq!(
                err.to_string(),
                "no credentials configured for profile 'home'"
            );
            Ok(())
        });
    }

    #[test]
    fn user_falls_back_to_env() {
        Jail::expect_with(|jail| {
            assert!(resolve_user(&Profile::default(), "home").is_err());
            jail.set_env(USER_ENV, "admin@example.com");
            assert_eq!(
                resolve_user(&Profile::default(), "home").unwrap(),
                "admin@example.com"
            );
            Ok(())
        });
    }
}
