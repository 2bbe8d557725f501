// ── Desired specs ──
//
// What the caller wants a remote resource to look like. Built once per
// invocation at the boundary and validated before any reconciler logic
// runs.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;

/// Whether the resource should exist.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TargetState {
    #[default]
    Present,
    Absent,
}

/// DNS provider used to validate a certificate request.
///
/// Only `domainoffensive` certificates can be created; `other` is
/// read-only and can only be found, never issued.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CertificateProvider {
    Domainoffensive,
    #[default]
    Other,
}

/// Scheme the proxy uses to reach its backend.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ForwardScheme {
    #[default]
    Http,
    Https,
}

/// Desired state of a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSpec {
    pub domain_name: String,
    pub provider: CertificateProvider,
    /// Only needed when a certificate gets created.
    pub provider_credentials: String,
    pub state: TargetState,
}

impl CertificateSpec {
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            provider: CertificateProvider::default(),
            provider_credentials: String::new(),
            state: TargetState::default(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        require_domain(&self.domain_name)
    }
}

/// Desired state of a proxy host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySpec {
    pub domain_name: String,
    /// Required when `state` is present.
    pub forward_host: Option<String>,
    pub forward_scheme: ForwardScheme,
    pub forward_port: u16,
    pub enable_caching: bool,
    pub allow_websockets: bool,
    pub certificate_id: i64,
    pub force_ssl: bool,
    pub http2_support: bool,
    pub state: TargetState,
}

impl ProxySpec {
    pub const DEFAULT_FORWARD_PORT: u16 = 80;

    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            forward_host: None,
            forward_scheme: ForwardScheme::default(),
            forward_port: Self::DEFAULT_FORWARD_PORT,
            enable_caching: false,
            allow_websockets: false,
            certificate_id: 0,
            force_ssl: false,
            http2_support: false,
            state: TargetState::default(),
        }
    }

    /// The backend host, if one is set and non-empty.
    pub fn forward_host(&self) -> Option<&str> {
        self.forward_host.as_deref().filter(|h| !h.is_empty())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        require_domain(&self.domain_name)?;
        if self.state == TargetState::Present && self.forward_host().is_none() {
            return Err(CoreError::validation(
                r#""forward_host" is required if "state" is "present""#,
            ));
        }
        Ok(())
    }
}

/// A desired spec for either supported resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesiredSpec {
    Certificate(CertificateSpec),
    Proxy(ProxySpec),
}

impl DesiredSpec {
    pub fn domain_name(&self) -> &str {
        match self {
            Self::Certificate(spec) => &spec.domain_name,
            Self::Proxy(spec) => &spec.domain_name,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Certificate(spec) => spec.validate(),
            Self::Proxy(spec) => spec.validate(),
        }
    }
}

fn require_domain(domain_name: &str) -> Result<(), CoreError> {
    if domain_name.trim().is_empty() {
        return Err(CoreError::validation("\"domain_name\" must not be empty"));
    }
    Ok(())
}
