// ── Token acquisition ──

use npmctl_api::{Credentials, Token, TransportConfig};
use tracing::info;

use crate::error::CoreError;

/// Log in once and return the token every reconcile call needs.
///
/// A rejected login (non-200, or a 200 without a `token`) is
/// [`CoreError::Auth`]; failing to reach the server at all is
/// [`CoreError::Transport`].
pub async fn fetch_token(
    credentials: &Credentials,
    transport: &TransportConfig,
) -> Result<Token, CoreError> {
    let http = transport
        .build_client()
        .map_err(|e| CoreError::transport("error on preparing HTTP client", &e))?;
    let token = credentials
        .login(&http)
        .await
        .map_err(|e| CoreError::from_login(&e))?;
    info!(endpoint = %credentials.endpoint, user = %credentials.user, "obtained API token");
    Ok(token)
}
