//! CLI configuration: a thin wrapper around `npmctl_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--url,
//! --host, --user, --token, ...) on top of the selected profile.

use npmctl_api::{Credentials, Endpoint, TlsMode, Token, TransportConfig};
use secrecy::SecretString;
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use npmctl_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

/// How this invocation authenticates.
#[derive(Debug)]
pub enum Auth {
    /// A pre-issued token, used as-is.
    Token(SecretString),
    /// Credentials to log in with first.
    Login(Credentials),
}

/// Everything needed to talk to one management API.
#[derive(Debug)]
pub struct Connection {
    pub profile_name: String,
    pub endpoint: Endpoint,
    pub transport: TransportConfig,
    pub auth: Auth,
}

impl Connection {
    /// Turn the resolved auth into a token, logging in if needed.
    pub async fn token(&self) -> Result<Token, CliError> {
        match &self.auth {
            Auth::Token(bearer) => {
                let base = self.endpoint.url().map_err(|e| CliError::Validation {
                    field: "url".into(),
                    reason: e.to_string(),
                })?;
                Ok(Token::new(base, bearer.clone()))
            }
            Auth::Login(credentials) => npmctl_core::fetch_token(credentials, &self.transport)
                .await
                .map_err(|e| CliError::from(e).for_profile(&self.profile_name)),
        }
    }
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Apply connection flags on top of a profile.
fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref url) = global.url {
        profile.url = Some(url.clone());
    }
    if let Some(protocol) = global.protocol {
        profile.protocol = protocol.as_str().into();
    }
    if let Some(ref host) = global.host {
        // An explicit host beats a URL inherited from the profile.
        if global.url.is_none() {
            profile.url = None;
        }
        profile.host = Some(host.clone());
    }
    if let Some(port) = global.port {
        profile.port = port;
    }
    if let Some(ref user) = global.user {
        profile.user = Some(user.clone());
    }
    if let Some(ref token) = global.token {
        profile.token = Some(token.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}

/// Build a [`Connection`] from the config file, profile, and CLI overrides.
pub fn resolve_connection(global: &GlobalOpts) -> Result<Connection, CliError> {
    let cfg = load_config_or_default();
    resolve_connection_from(&cfg, global)
}

pub fn resolve_connection_from(cfg: &Config, global: &GlobalOpts) -> Result<Connection, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // An explicitly requested profile has to exist.
        None if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None if global.url.is_none() && global.host.is_none() => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
        None => Profile::default(),
    };
    apply_overrides(&mut profile, global);

    let endpoint = profile.endpoint()?;
    let transport = profile.transport(&cfg.defaults);
    if transport.tls == TlsMode::DangerAcceptInvalid {
        debug!("TLS certificate verification disabled");
    }

    let auth = if let Some(ref token) = profile.token {
        Auth::Token(SecretString::from(token.clone()))
    } else {
        let user = npmctl_config::resolve_user(&profile, &profile_name)?;
        let password = match global.password {
            Some(ref pw) => SecretString::from(pw.clone()),
            None => npmctl_config::resolve_password(&profile, &profile_name)?,
        };
        Auth::Login(Credentials {
            endpoint: endpoint.clone(),
            user,
            password,
        })
    };

    debug!(profile = %profile_name, endpoint = %endpoint, "connection resolved");
    Ok(Connection {
        profile_name,
        endpoint,
        transport,
        auth,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["npmctl"];
        argv.extend_from_slice(args);
        argv.push("token");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_home() -> Config {
        let mut cfg = Config::default();
        cfg.default_profile = Some("home".into());
        cfg.profiles.insert(
            "home".into(),
            Profile {
                url: Some("https://npm.home.lan:8443".into()),
                user: Some("admin@example.com".into()),
                token: Some("profile-token".into()),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn profile_token_skips_login() {
        let conn = resolve_connection_from(&config_with_home(), &global(&[])).unwrap();
        assert_eq!(conn.endpoint.to_string(), "https://npm.home.lan:8443");
        assert!(matches!(conn.auth, Auth::Token(_)));
    }

    #[test]
    fn host_flag_replaces_profile_url() {
        let conn = resolve_connection_from(
            &config_with_home(),
            &global(&["--host", "10.0.0.2", "--port", "8181"]),
        )
        .unwrap();
        assert_eq!(conn.endpoint.to_string(), "http://10.0.0.2:8181");
    }

    #[test]
    fn flags_alone_are_enough_without_profile() {
        let conn = resolve_connection_from(
            &Config::default(),
            &global(&["--url", "http://npm.local:81", "--token", "t", "-k"]),
        )
        .unwrap();
        assert_eq!(conn.endpoint.to_string(), "http://npm.local:81");
        assert_eq!(conn.transport.tls, TlsMode::DangerAcceptInvalid);
    }

    #[test]
    fn unknown_explicit_profile_is_reported() {
        let err =
            resolve_connection_from(&config_with_home(), &global(&["-p", "work"])).unwrap_err();
        assert!(
            matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "home")
        );
    }

    #[test]
    fn nothing_configured_is_no_config() {
        let err = resolve_connection_from(&Config::default(), &global(&[])).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }
}
