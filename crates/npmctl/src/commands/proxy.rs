//! `proxy`: converge one proxy host.

use npmctl_core::{DesiredSpec, ProxySpec};

use crate::cli::{GlobalOpts, ProxyArgs};
use crate::error::CliError;

impl From<ProxyArgs> for ProxySpec {
    fn from(args: ProxyArgs) -> Self {
        Self {
            domain_name: args.domain_name,
            forward_host: args.forward_host,
            forward_scheme: args.forward_scheme,
            forward_port: args.forward_port,
            enable_caching: args.enable_caching,
            allow_websockets: args.allow_websockets,
            certificate_id: args.certificate_id,
            force_ssl: args.force_ssl,
            http2_support: args.http2_support,
            state: args.reconcile.state,
        }
    }
}

pub async fn handle(args: ProxyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let dry_run = args.reconcile.dry_run;
    super::reconcile(DesiredSpec::Proxy(args.into()), dry_run, global).await
}
