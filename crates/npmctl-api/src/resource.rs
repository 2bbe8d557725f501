// Resource collection HTTP client
//
// Generic authenticated CRUD against one collection endpoint below
// `/api/nginx/`. Knows nothing about certificates or proxy hosts beyond
// the collection path; payloads go out as whatever the caller serializes.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use strum::Display;
use tracing::debug;
use url::Url;

use crate::auth::Token;
use crate::error::Error;
use crate::model::{RemoteItem, domain_names_of};
use crate::transport::TransportConfig;

/// A remote collection of same-typed items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Collection {
    #[strum(serialize = "certificates")]
    Certificates,
    #[strum(serialize = "proxy-hosts")]
    ProxyHosts,
}

/// Authenticated CRUD client for one [`Collection`].
///
/// Every mutating call hits the server exactly once; nothing is retried.
/// A response with any status other than the one the call expects fails
/// with [`Error::UnexpectedStatus`] carrying the raw body.
pub struct ResourceClient {
    http: reqwest::Client,
    token: Token,
    collection: Collection,
}

impl ResourceClient {
    /// Create a client with its own `reqwest::Client` built from `transport`.
    pub fn new(
        token: Token,
        collection: Collection,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, token, collection))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, token: Token, collection: Collection) -> Self {
        Self {
            http,
            token,
            collection,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn collection_url(&self) -> Result<Url, Error> {
        self.token.api_url(&format!("nginx/{}", self.collection))
    }

    fn item_url(&self, id: i64) -> Result<Url, Error> {
        self.token.api_url(&format!("nginx/{}/{id}", self.collection))
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn request(
        &self,
        method: reqwest::Method,
        url: Url,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let mut auth = HeaderValue::from_str(&self.token.authorization()).map_err(|e| {
            Error::Authentication {
                message: format!("invalid token header value: {e}"),
            }
        })?;
        auth.set_sensitive(true);
        Ok(self
            .http
            .request(method, url)
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, "application/json"))
    }

    /// Check the status against `expected`, then decode the body as JSON.
    async fn expect_json(resp: reqwest::Response, expected: StatusCode) -> Result<Value, Error> {
        let status = resp.status();
        let body = resp.text().await?;
        if status != expected {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch the full collection listing. `GET /api/nginx/{collection}`
    pub async fn list(&self) -> Result<Vec<Value>, Error> {
        let url = self.collection_url()?;
        debug!("GET {url}");

        let resp = self.request(reqwest::Method::GET, url)?.send().await?;
        match Self::expect_json(resp, StatusCode::OK).await? {
            Value::Array(items) => Ok(items),
            other => Err(Error::Deserialization {
                message: "expected a JSON array listing".into(),
                body: other.to_string(),
            }),
        }
    }

    /// Find the item serving `domain`.
    ///
    /// Linear scan in listing order; the first entry whose `domain_names`
    /// contains `domain` wins. Duplicates further down are ignored.
    pub async fn search(&self, domain: &str) -> Result<Option<RemoteItem>, Error> {
        let items = self.list().await?;
        let mut matching = items
            .into_iter()
            .filter(|item| domain_names_of(item).iter().any(|d| d == domain));
        let first = matching.next();
        debug!(
            collection = %self.collection,
            domain,
            matches = usize::from(first.is_some()) + matching.count(),
            "searched collection"
        );

        first.map(RemoteItem::try_from).transpose()
    }

    /// `POST /api/nginx/{collection}`, expecting `201 Created`.
    pub async fn create<B: Serialize + Sync>(&self, payload: &B) -> Result<RemoteItem, Error> {
        let url = self.collection_url()?;
        debug!("POST {url}");

        let resp = self
            .request(reqwest::Method::POST, url)?
            .json(payload)
            .send()
            .await?;
        RemoteItem::try_from(Self::expect_json(resp, StatusCode::CREATED).await?)
    }

    /// `PUT /api/nginx/{collection}/{id}`, expecting `200 OK`.
    pub async fn update<B: Serialize + Sync>(
        &self,
        id: i64,
        payload: &B,
    ) -> Result<RemoteItem, Error> {
        let url = self.item_url(id)?;
        debug!("PUT {url}");

        let resp = self
            .request(reqwest::Method::PUT, url)?
            .json(payload)
            .send()
            .await?;
        RemoteItem::try_from(Self::expect_json(resp, StatusCode::OK).await?)
    }

    /// `DELETE /api/nginx/{collection}/{id}`, expecting `200 OK`.
    ///
    /// Returns the decoded response body as-is; depending on the server
    /// version that is the deleted object or a bare `true`.
    pub async fn delete(&self, id: i64) -> Result<Value, Error> {
        let url = self.item_url(id)?;
        debug!("DELETE {url}");

        let resp = self.request(reqwest::Method::DELETE, url)?.send().await?;
        Self::expect_json(resp, StatusCode::OK).await
    }
}
