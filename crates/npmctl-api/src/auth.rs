// Token login
//
// The management API uses bearer tokens. `POST /api/tokens` trades an
// identity/secret pair for a token, which every other call then carries
// in its `Authorization` header.

use std::fmt;
use std::str::FromStr;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use strum::{Display, EnumString};
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Scheme used to reach the management API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

/// Where the management API listens: `{protocol}://{host}:{port}{base_path}`.
///
/// `base_path` is empty unless the admin UI sits behind a path prefix
/// (`https://host/npm`). It never ends in `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    pub base_path: String,
}

impl Endpoint {
    /// Default admin port of Nginx Proxy Manager.
    pub const DEFAULT_PORT: u16 = 81;

    pub fn new(protocol: Protocol, host: impl Into<String>, port: u16) -> Self {
        Self {
            protocol,
            host: host.into(),
            port,
            base_path: String::new(),
        }
    }

    /// Serve the API below `path` instead of the server root.
    #[must_use]
    pub fn with_base_path(mut self, path: &str) -> Self {
        self.base_path = path.trim_end_matches('/').to_owned();
        self
    }

    /// The base URL every API path is appended to.
    pub fn url(&self) -> Result<Url, Error> {
        Ok(Url::parse(&self.to_string())?)
    }
}

/// `{base}/api/{path}`, keeping any prefix already on `base`.
fn api_url(base: &Url, path: &str) -> Result<Url, Error> {
    let base = base.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}/api/{path}"))?)
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}:{}{}",
            self.protocol, self.host, self.port, self.base_path
        )
    }
}

impl TryFrom<&Url> for Endpoint {
    type Error = Error;

    fn try_from(url: &Url) -> Result<Self, Self::Error> {
        let protocol = Protocol::from_str(url.scheme())
            .map_err(|_| Error::UnsupportedScheme(url.scheme().to_owned()))?;
        let host = url
            .host_str()
            .ok_or(Error::InvalidUrl(url::ParseError::EmptyHost))?;
        let port = url.port_or_known_default().unwrap_or(Self::DEFAULT_PORT);
        Ok(Self::new(protocol, host, port).with_base_path(url.path()))
    }
}

/// Login material. Used once to obtain a [`Token`] and never persisted.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub endpoint: Endpoint,
    pub user: String,
    pub password: SecretString,
}

/// An authenticated handle on one management API instance.
///
/// Opaque to the reconcilers. There is no expiry handling: a token is
/// assumed valid for the lifetime of one reconcile call.
#[derive(Debug, Clone)]
pub struct Token {
    base_url: Url,
    bearer: SecretString,
}

impl Token {
    pub fn new(base_url: Url, bearer: SecretString) -> Self {
        Self { base_url, bearer }
    }

    /// The API root (e.g. `http://192.168.0.5:81`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn bearer(&self) -> &SecretString {
        &self.bearer
    }

    /// Value for the `Authorization` header.
    pub(crate) fn authorization(&self) -> String {
        format!("Bearer {}", self.bearer.expose_secret())
    }

    /// Build an absolute URL below `{base}/api/`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        api_url(&self.base_url, path)
    }
}

impl Credentials {
    /// Log in with these credentials and return a fresh token.
    ///
    /// `POST /api/tokens` with `{"identity", "secret"}`. Anything but
    /// HTTP 200 is an authentication failure carrying the response body,
    /// and so is a 200 whose body lacks a `token` string.
    pub async fn login(&self, http: &reqwest::Client) -> Result<Token, Error> {
        let base_url = self.endpoint.url()?;
        let url = api_url(&base_url, "tokens")?;

        debug!("logging in at {url}");

        let body = json!({
            "identity": self.user,
            "secret": self.password.expose_secret(),
        });

        let resp = http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if status != StatusCode::OK {
            return Err(Error::Authentication {
                message: format!("error on fetching API token: {text}"),
            });
        }

        let token = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v.get("token").and_then(|t| t.as_str()).map(String::from))
            .ok_or_else(|| Error::Authentication {
                message: "API response not containing a token".into(),
            })?;

        debug!("login successful");
        Ok(Token::new(base_url, SecretString::from(token)))
    }
}
