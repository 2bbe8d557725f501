//! Command handlers.

pub mod certificate;
pub mod config_cmd;
pub mod proxy;
pub mod token;

use npmctl_core::{DesiredSpec, ReconcileResult};
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

/// Validate, connect, reconcile, report.
///
/// Input is validated before the config is read or the server contacted,
/// so bad arguments fail the same way with or without a reachable API.
pub async fn reconcile(
    desired: DesiredSpec,
    dry_run: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    desired.validate()?;

    let conn = config::resolve_connection(global)?;
    let token = conn.token().await?;
    debug!(domain = desired.domain_name(), dry_run, "reconciling");

    let result = npmctl_core::reconcile_desired(token, &conn.transport, &desired, dry_run).await?;
    report(&result, global)
}

fn report(result: &ReconcileResult, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let out = output::render_single(global.output, result, |r| {
        let status = output::status_line(r.changed, &r.message, color);
        match r.item {
            Some(ref item) => format!("{status}\n{}", output::render_fields(item)),
            None => status,
        }
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
