// ── Proxy hosts ──
//
// Proxy hosts are created, replaced as a whole, or left alone when the
// caller-controlled fields already match.

use npmctl_api::{Collection, RemoteItem};
use serde_json::{Map, Value};
use tracing::debug;

use super::Reconciler;
use crate::decision::Decision;
use crate::diff::{PROXY_HOST_KEYS, differing_keys};
use crate::error::CoreError;
use crate::payload::ProxyHostPayload;
use crate::spec::{ProxySpec, TargetState};

/// Reconciler for `/api/nginx/proxy-hosts`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxyReconciler;

impl Reconciler for ProxyReconciler {
    type Spec = ProxySpec;
    type Payload = ProxyHostPayload;

    const COLLECTION: Collection = Collection::ProxyHosts;
    const NOOP_MESSAGE: &'static str = "item is already as expected";

    fn domain_name(spec: &ProxySpec) -> &str {
        &spec.domain_name
    }

    fn validate(spec: &ProxySpec) -> Result<(), CoreError> {
        spec.validate()
    }

    fn decide(
        spec: &ProxySpec,
        existing: Option<RemoteItem>,
    ) -> Result<Decision<ProxyHostPayload>, CoreError> {
        if spec.state == TargetState::Absent {
            return Ok(existing.map_or(Decision::AlreadyAbsent, Decision::Delete));
        }

        let payload = ProxyHostPayload::from_spec(spec).ok_or_else(|| {
            CoreError::validation(r#""forward_host" is required if "state" is "present""#)
        })?;

        let Some(existing) = existing else {
            return Ok(Decision::Create(payload));
        };

        let desired = match serde_json::to_value(&payload)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        let differing = differing_keys(&desired, existing.fields(), &PROXY_HOST_KEYS);
        if differing.is_empty() {
            return Ok(Decision::Noop(existing));
        }

        debug!(id = existing.id, ?differing, "proxy host differs");
        Ok(Decision::Update { existing, payload })
    }
}
