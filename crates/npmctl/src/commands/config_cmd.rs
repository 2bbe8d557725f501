//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Mask every secret a config may hold in plaintext.
fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
        if profile.token.is_some() {
            profile.token = Some(REDACTED.into());
        }
    }
}

/// Render an already redacted config as the TOML it is stored as.
fn format_config(cfg: &Config) -> Result<String, CliError> {
    Ok(toml::to_string_pretty(cfg).map_err(npmctl_config::ConfigError::from)?)
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn keyring_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "keyring".into(),
        reason: format!("failed to store password in keyring: {e}"),
    }
}

fn prompt_password() -> Result<String, CliError> {
    let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(pass)
}

/// Offer to store the password in the system keyring.
///
/// Returns `Some(password)` if the user chose plaintext, `None` if stored
/// in the keyring.
fn prompt_keyring_storage(password: &str, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        npmctl_config::store_password(profile_name, password).map_err(keyring_err)?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password.to_owned()))
    }
}

fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    let parse_err = |field: &str, reason: &str| CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    };
    match key {
        "url" => profile.url = Some(value),
        "protocol" => {
            if !matches!(value.as_str(), "http" | "https") {
                return Err(parse_err("protocol", "must be 'http' or 'https'"));
            }
            profile.protocol = value;
        }
        "host" => profile.host = Some(value),
        "port" => {
            profile.port = value
                .parse()
                .map_err(|_| parse_err("port", "must be a port number"))?;
        }
        "user" => profile.user = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "insecure" => {
            profile.insecure = Some(
                value
                    .parse()
                    .map_err(|_| parse_err("insecure", "must be 'true' or 'false'"))?,
            );
        }
        "timeout" => {
            profile.timeout = Some(
                value
                    .parse()
                    .map_err(|_| parse_err("timeout", "must be a number (seconds)"))?,
            );
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: url, protocol, host, port, \
                     user, password_env, insecure, timeout, ca_cert"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("npmctl configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let url: String = Input::new()
                .with_prompt("Management API URL")
                .default("http://127.0.0.1:81".into())
                .interact_text()
                .map_err(prompt_err)?;
            npmctl_config::parse_url_endpoint(&url)?;

            let user: String = Input::new()
                .with_prompt("User (email)")
                .interact_text()
                .map_err(prompt_err)?;
            if user.is_empty() {
                return Err(CliError::Validation {
                    field: "user".into(),
                    reason: "user cannot be empty".into(),
                });
            }

            let pass = prompt_password()?;
            let password = prompt_keyring_storage(&pass, &profile_name)?;

            let profile = Profile {
                url: Some(url),
                user: Some(user),
                password,
                ..Profile::default()
            };

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Defaults::default(),
                profiles,
            };
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: npmctl token");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default();
            redact(&mut cfg);
            let table = format_config(&cfg)?;
            let out = output::render_single(global.output, &cfg, |_| table.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: npmctl config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: available_profiles(&cfg),
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { name } => {
            let cfg = config::load_config_or_default();
            let profile_name = name.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(&cfg),
                });
            }

            let pass = prompt_password()?;
            npmctl_config::store_password(&profile_name, &pass).map_err(keyring_err)?;
            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn show_never_prints_secrets() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                host: Some("npm.local".into()),
                password: Some("hunter2".into()),
                token: Some("eyJ.secret".into()),
                ..Profile::default()
            },
        );

        redact(&mut cfg);
        let shown = format_config(&cfg).unwrap();

        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("eyJ.secret"));
        assert!(shown.contains("password = \"****\""));
        assert!(shown.contains("host = \"npm.local\""));
    }

    #[test]
    fn show_output_stays_valid_toml_with_quotes_in_values() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                url: Some("http://npm.local:81/a\"b".into()),
                user: Some("ad\"min@example.com".into()),
                ..Profile::default()
            },
        );

        let shown = format_config(&cfg).unwrap();
        let parsed: Config = toml::from_str(&shown).unwrap();

        assert_eq!(parsed.profiles["home"].user.as_deref(), Some("ad\"min@example.com"));
        assert_eq!(parsed.profiles["home"].url.as_deref(), Some("http://npm.local:81/a\"b"));
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_port() {
        let mut profile = Profile::default();
        assert!(set_profile_key(&mut profile, "controller", "x".into()).is_err());
        assert!(set_profile_key(&mut profile, "port", "eighty".into()).is_err());

        set_profile_key(&mut profile, "port", "8181".into()).unwrap();
        assert_eq!(profile.port, 8181);
    }
}
