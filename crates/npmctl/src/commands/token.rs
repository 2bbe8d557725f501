//! `token`: log in and print the bearer token.

use secrecy::ExposeSecret;
use serde::Serialize;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct TokenReport {
    url: String,
    token: String,
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let conn = config::resolve_connection(global)?;
    let token = conn.token().await?;

    let report = TokenReport {
        url: token.base_url().to_string(),
        token: token.bearer().expose_secret().to_owned(),
    };
    let out = output::render_single(global.output, &report, |r| r.token.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
