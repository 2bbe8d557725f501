// ── Certificates ──
//
// Certificates are created or left alone, never updated: an existing
// certificate for the domain is authoritative whatever its fields say.

use npmctl_api::{Collection, RemoteItem};

use super::Reconciler;
use crate::decision::Decision;
use crate::error::CoreError;
use crate::payload::CertificatePayload;
use crate::spec::{CertificateProvider, CertificateSpec, TargetState};

/// Reconciler for `/api/nginx/certificates`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CertificateReconciler;

impl Reconciler for CertificateReconciler {
    type Spec = CertificateSpec;
    type Payload = CertificatePayload;

    const COLLECTION: Collection = Collection::Certificates;
    const NOOP_MESSAGE: &'static str = "found item is already present";

    fn domain_name(spec: &CertificateSpec) -> &str {
        &spec.domain_name
    }

    fn validate(spec: &CertificateSpec) -> Result<(), CoreError> {
        spec.validate()
    }

    fn decide(
        spec: &CertificateSpec,
        existing: Option<RemoteItem>,
    ) -> Result<Decision<CertificatePayload>, CoreError> {
        match (spec.state, existing) {
            (TargetState::Present, Some(item)) => Ok(Decision::Noop(item)),
            (TargetState::Present, None) => match spec.provider {
                CertificateProvider::Domainoffensive => {
                    Ok(Decision::Create(CertificatePayload::domainoffensive(spec)))
                }
                // `other` providers are read-only: found or fail.
                CertificateProvider::Other => {
                    Err(CoreError::validation("no item found for other provider"))
                }
            },
            (TargetState::Absent, Some(item)) => Ok(Decision::Delete(item)),
            (TargetState::Absent, None) => Ok(Decision::AlreadyAbsent),
        }
    }
}
