// npmctl-api: Async Rust client for the Nginx Proxy Manager management API

pub mod auth;
pub mod error;
pub mod model;
pub mod resource;
pub mod transport;

pub use auth::{Credentials, Endpoint, Protocol, Token};
pub use error::Error;
pub use model::RemoteItem;
pub use resource::{Collection, ResourceClient};
pub use transport::{TlsMode, TransportConfig};
