//! Idempotent reconciliation of Nginx Proxy Manager resources.
//!
//! Each reconcile call moves one certificate or proxy host towards a
//! desired state in three steps:
//!
//! - **search** the collection for an item serving the domain,
//! - **decide** purely from the desired [`spec`] and the search result
//!   ([`Decision`]),
//! - **execute** the decision, or under dry run report what it would do.
//!
//! [`fetch_token`] turns credentials into the [`Token`](npmctl_api::Token)
//! the reconcilers take. All calls are sequential; the only timeout is the
//! one carried by [`TransportConfig`](npmctl_api::TransportConfig).

pub mod auth;
pub mod decision;
pub mod diff;
pub mod error;
pub mod payload;
pub mod reconcile;
pub mod spec;

pub use auth::fetch_token;
pub use decision::{Decision, DecisionKind};
pub use error::CoreError;
pub use payload::{CertificateMeta, CertificatePayload, ProxyHostPayload};
pub use reconcile::{
    CertificateReconciler, ProxyReconciler, ReconcileResult, Reconciler, ResourceApi, reconcile,
    reconcile_desired,
};
pub use spec::{
    CertificateProvider, CertificateSpec, DesiredSpec, ForwardScheme, ProxySpec, TargetState,
};
