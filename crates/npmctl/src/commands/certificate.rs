//! `certificate`: converge one certificate.

use npmctl_core::{CertificateSpec, DesiredSpec};

use crate::cli::{CertificateArgs, GlobalOpts};
use crate::error::CliError;

impl From<CertificateArgs> for CertificateSpec {
    fn from(args: CertificateArgs) -> Self {
        Self {
            domain_name: args.domain_name,
            provider: args.provider,
            provider_credentials: args.provider_credentials,
            state: args.reconcile.state,
        }
    }
}

pub async fn handle(args: CertificateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let dry_run = args.reconcile.dry_run;
    super::reconcile(DesiredSpec::Certificate(args.into()), dry_run, global).await
}
