// ── Reconciliation driver ──
//
// search → decide → act. Deciding is a pure function of the desired spec
// and the search result; acting is the only place that touches the
// mutating half of the API, and it is skipped entirely under dry run.

pub mod certificate;
pub mod proxy;

#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;

use npmctl_api::{Collection, RemoteItem, ResourceClient, Token, TransportConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::decision::Decision;
use crate::error::CoreError;
use crate::spec::DesiredSpec;

pub use certificate::CertificateReconciler;
pub use proxy::ProxyReconciler;

// ── Seams ───────────────────────────────────────────────────────────

/// The CRUD surface reconcilers need from a resource collection.
///
/// Implemented by [`ResourceClient`]; tests substitute an in-memory
/// collection that counts calls.
pub trait ResourceApi {
    fn search(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Option<RemoteItem>, npmctl_api::Error>> + Send;

    fn create<B: Serialize + Sync>(
        &self,
        payload: &B,
    ) -> impl Future<Output = Result<RemoteItem, npmctl_api::Error>> + Send;

    fn update<B: Serialize + Sync>(
        &self,
        id: i64,
        payload: &B,
    ) -> impl Future<Output = Result<RemoteItem, npmctl_api::Error>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<Value, npmctl_api::Error>> + Send;
}

impl ResourceApi for ResourceClient {
    fn search(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Option<RemoteItem>, npmctl_api::Error>> + Send {
        ResourceClient::search(self, domain)
    }

    fn create<B: Serialize + Sync>(
        &self,
        payload: &B,
    ) -> impl Future<Output = Result<RemoteItem, npmctl_api::Error>> + Send {
        ResourceClient::create(self, payload)
    }

    fn update<B: Serialize + Sync>(
        &self,
        id: i64,
        payload: &B,
    ) -> impl Future<Output = Result<RemoteItem, npmctl_api::Error>> + Send {
        ResourceClient::update(self, id, payload)
    }

    fn delete(&self, id: i64) -> impl Future<Output = Result<Value, npmctl_api::Error>> + Send {
        ResourceClient::delete(self, id)
    }
}

/// Resource-specific half of a reconciliation.
pub trait Reconciler {
    type Spec;
    type Payload: Serialize + Sync;

    /// Collection the resource lives in.
    const COLLECTION: Collection;
    /// Message prefix reported when the existing item already fits.
    const NOOP_MESSAGE: &'static str;

    fn domain_name(spec: &Self::Spec) -> &str;

    /// Reject input that can be judged without the remote side.
    fn validate(spec: &Self::Spec) -> Result<(), CoreError>;

    /// Pure decision over the desired spec and the search result.
    fn decide(
        spec: &Self::Spec,
        existing: Option<RemoteItem>,
    ) -> Result<Decision<Self::Payload>, CoreError>;
}

// ── Result ──────────────────────────────────────────────────────────

/// Outcome of one reconciliation, returned for every successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileResult {
    pub changed: bool,
    /// The found, created or updated item; the would-be payload under
    /// dry run; `None` after deletion or when nothing exists.
    pub item: Option<Value>,
    pub message: String,
}

impl ReconcileResult {
    pub fn changed(item: Option<Value>, message: impl Into<String>) -> Self {
        Self {
            changed: true,
            item,
            message: message.into(),
        }
    }

    pub fn unchanged(item: Option<Value>, message: impl Into<String>) -> Self {
        Self {
            changed: false,
            item,
            message: message.into(),
        }
    }
}

// ── Driver ──────────────────────────────────────────────────────────

/// Bring the resource described by `spec` to its target state.
///
/// Validation happens before the search; at most one mutating call
/// follows the search, and none under `dry_run`. Safe to re-run after a
/// crash: the next search finds whatever the last run created.
pub async fn reconcile<R, A>(api: &A, spec: &R::Spec, dry_run: bool) -> Result<ReconcileResult, CoreError>
where
    R: Reconciler,
    A: ResourceApi,
{
    R::validate(spec)?;

    let collection = R::COLLECTION;
    let domain = R::domain_name(spec);
    let existing = api
        .search(domain)
        .await
        .map_err(|e| CoreError::transport("error on searching for item", &e))?;
    debug!(
        collection = %collection,
        domain,
        found = existing.as_ref().map(|item| item.id),
        "search finished"
    );

    let decision = R::decide(spec, existing)?;
    info!(
        collection = %collection,
        domain,
        decision = %decision.kind(),
        dry_run,
        "reconciling"
    );

    execute::<R, A>(api, decision, dry_run).await
}

/// Carry out `decision`, or under `dry_run` report what it would do.
///
/// This is the single gate between deciding and mutating; both modes
/// share every step up to here.
pub async fn execute<R, A>(
    api: &A,
    decision: Decision<R::Payload>,
    dry_run: bool,
) -> Result<ReconcileResult, CoreError>
where
    R: Reconciler,
    A: ResourceApi,
{
    match decision {
        Decision::Noop(item) => Ok(ReconcileResult::unchanged(
            Some(item.raw()),
            format!("{}: {}", R::NOOP_MESSAGE, item.id),
        )),
        Decision::AlreadyAbsent => Ok(ReconcileResult::unchanged(None, "item is already deleted")),
        Decision::Create(payload) => {
            if dry_run {
                return Ok(ReconcileResult::changed(
                    Some(serde_json::to_value(&payload)?),
                    "would have created item",
                ));
            }
            let item = api
                .create(&payload)
                .await
                .map_err(|e| CoreError::transport("error on creating new item", &e))?;
            Ok(ReconcileResult::changed(
                Some(item.raw()),
                format!("created item: {}", item.id),
            ))
        }
        Decision::Update { existing, payload } => {
            if dry_run {
                return Ok(ReconcileResult::changed(
                    Some(serde_json::to_value(&payload)?),
                    format!("would have updated item: {}", existing.id),
                ));
            }
            let item = api
                .update(existing.id, &payload)
                .await
                .map_err(|e| CoreError::transport("error on updating existing item", &e))?;
            Ok(ReconcileResult::changed(
                Some(item.raw()),
                format!("updated item: {}", item.id),
            ))
        }
        Decision::Delete(existing) => {
            if dry_run {
                return Ok(ReconcileResult::changed(
                    None,
                    format!("would have deleted item: {}", existing.id),
                ));
            }
            api.delete(existing.id)
                .await
                .map_err(|e| CoreError::transport("error on deleting item", &e))?;
            Ok(ReconcileResult::changed(
                None,
                format!("deleted item: {}", existing.id),
            ))
        }
    }
}

/// Reconcile any [`DesiredSpec`] against the API behind `token`.
///
/// Validates first, so invalid input never opens a connection.
pub async fn reconcile_desired(
    token: Token,
    transport: &TransportConfig,
    desired: &DesiredSpec,
    dry_run: bool,
) -> Result<ReconcileResult, CoreError> {
    desired.validate()?;

    match desired {
        DesiredSpec::Certificate(spec) => {
            let client = client_for::<CertificateReconciler>(token, transport)?;
            reconcile::<CertificateReconciler, _>(&client, spec, dry_run).await
        }
        DesiredSpec::Proxy(spec) => {
            let client = client_for::<ProxyReconciler>(token, transport)?;
            reconcile::<ProxyReconciler, _>(&client, spec, dry_run).await
        }
    }
}

fn client_for<R: Reconciler>(
    token: Token,
    transport: &TransportConfig,
) -> Result<ResourceClient, CoreError> {
    ResourceClient::new(token, R::COLLECTION, transport)
        .map_err(|e| CoreError::transport("error on preparing HTTP client", &e))
}
