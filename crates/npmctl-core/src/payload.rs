// ── Typed request payloads ──
//
// Bodies sent to the create and update endpoints. Proxy payloads always
// carry the complete field set; there is no partial update.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::spec::{CertificateSpec, ForwardScheme, ProxySpec};

// ── Certificate ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificatePayload {
    pub domain_names: Vec<String>,
    pub provider: String,
    pub meta: CertificateMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateMeta {
    pub dns_challenge: bool,
    pub dns_provider: String,
    pub dns_provider_credentials: String,
}

impl CertificatePayload {
    /// Let's Encrypt wildcard certificate validated through the
    /// domainoffensive DNS challenge. Always covers `domain` and `*.domain`.
    pub fn domainoffensive(spec: &CertificateSpec) -> Self {
        Self {
            domain_names: vec![
                spec.domain_name.clone(),
                format!("*.{}", spec.domain_name),
            ],
            provider: "letsencrypt".into(),
            meta: CertificateMeta {
                dns_challenge: true,
                dns_provider: "domainoffensive".into(),
                dns_provider_credentials: format!(
                    "dns_domainoffensive_api_token = {}",
                    spec.provider_credentials
                ),
            },
        }
    }
}

// ── Proxy host ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyHostPayload {
    pub domain_names: Vec<String>,
    pub forward_scheme: ForwardScheme,
    pub forward_host: String,
    pub forward_port: u16,
    pub caching_enabled: bool,
    pub allow_websocket_upgrade: bool,
    pub certificate_id: i64,
    pub ssl_forced: bool,
    pub http2_support: bool,
    pub hsts_enabled: bool,
    pub hsts_subdomains: bool,
    pub advanced_config: String,
    pub block_exploits: bool,
    pub access_list_id: i64,
    pub locations: Vec<Value>,
    pub meta: Map<String, Value>,
}

impl ProxyHostPayload {
    /// Build the full payload for `spec` with the fixed security defaults.
    /// `None` if the spec has no usable forward host.
    pub fn from_spec(spec: &ProxySpec) -> Option<Self> {
        let forward_host = spec.forward_host()?.to_owned();
        Some(Self {
            domain_names: vec![spec.domain_name.clone()],
            forward_scheme: spec.forward_scheme,
            forward_host,
            forward_port: spec.forward_port,
            caching_enabled: spec.enable_caching,
            allow_websocket_upgrade: spec.allow_websockets,
            certificate_id: spec.certificate_id,
            ssl_forced: spec.force_ssl,
            http2_support: spec.http2_support,
            hsts_enabled: false,
            hsts_subdomains: false,
            advanced_config: String::new(),
            block_exploits: false,
            access_list_id: 0,
            locations: Vec::new(),
            meta: Map::new(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::spec::CertificateProvider;

    #[test]
    fn certificate_payload_is_wildcard_letsencrypt() {
        let spec = CertificateSpec {
            provider: CertificateProvider::Domainoffensive,
            provider_credentials: "s3cr3t".into(),
            ..CertificateSpec::new("some.domain")
        };

        assert_eq!(
            serde_json::to_value(CertificatePayload::domainoffensive(&spec)).unwrap(),
            json!({
                "domain_names": ["some.domain", "*.some.domain"],
                "provider": "letsencrypt",
                "meta": {
                    "dns_challenge": true,
                    "dns_provider": "domainoffensive",
                    "dns_provider_credentials": "dns_domainoffensive_api_token = s3cr3t"
                }
            })
        );
    }

    #[test]
    fn proxy_payload_carries_security_defaults() {
        let spec = ProxySpec {
            forward_host: Some("192.168.1.234".into()),
            forward_port: 81,
            ..ProxySpec::new("some.domain")
        };

        assert_eq!(
            serde_json::to_value(ProxyHostPayload::from_spec(&spec).unwrap()).unwrap(),
            json!({
                "domain_names": ["some.domain"],
                "forward_scheme": "http",
                "forward_host": "192.168.1.234",
                "forward_port": 81,
                "caching_enabled": false,
                "allow_websocket_upgrade": false,
                "certificate_id": 0,
                "ssl_forced": false,
                "http2_support": false,
                "hsts_enabled": false,
                "hsts_subdomains": false,
                "advanced_config": "",
                "block_exploits": false,
                "access_list_id": 0,
                "locations": [],
                "meta": {}
            })
        );
    }

    #[test]
    fn proxy_payload_needs_forward_host() {
        assert!(ProxyHostPayload::from_spec(&ProxySpec::new("some.domain")).is_none());
    }
}
