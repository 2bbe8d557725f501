// HTTP transport for the management API.
//
// Nginx Proxy Manager admin interfaces are often served on a LAN address
// with a self-signed or private-CA certificate, so the TLS mode is chosen
// per profile. Every call goes through one client built here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::error::Error;

/// TLS verification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Trust an extra CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed admin interfaces).
    DangerAcceptInvalid,
}

impl TlsMode {
    /// Pick the mode from profile settings. Disabling verification beats a
    /// custom CA, which beats the system store.
    pub fn select(insecure: bool, ca_cert: Option<&Path>) -> Self {
        match (insecure, ca_cert) {
            (true, _) => Self::DangerAcceptInvalid,
            (false, Some(path)) => Self::CustomCa(path.to_path_buf()),
            (false, None) => Self::System,
        }
    }
}

/// TLS and timeout settings shared by login and the resource clients.
///
/// The timeout here is the only timeout in the system; reconcilers
/// never impose their own.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl TransportConfig {
    /// Per-request timeout when nothing else is configured.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn new(tls: TlsMode, timeout_secs: u64) -> Self {
        Self {
            tls,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Build the `reqwest::Client` every API call goes through.
    ///
    /// The API only speaks JSON, so `Accept` is fixed on the client.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .user_agent(concat!("npmctl/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => builder = builder.add_root_certificate(load_ca(path)?),
            TlsMode::DangerAcceptInvalid => builder = builder.danger_accept_invalid_certs(true),
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new(TlsMode::System, Self::DEFAULT_TIMEOUT_SECS)
    }
}

fn load_ca(path: &Path) -> Result<reqwest::Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("failed to read CA cert {}: {e}", path.display())))?;
    reqwest::Certificate::from_pem(&pem)
        .map_err(|e| Error::Tls(format!("invalid CA cert {}: {e}", path.display())))
}
