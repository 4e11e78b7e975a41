//! Remote resource client - the network boundary.
//!
//! Every backend call goes through [`RemoteClient::call`]: one request in,
//! one decoded JSON body or one [`ClientError`] out. Implementations attach
//! credentials but never cache and never retry.

mod error;
#[cfg(feature = "http")]
mod http;
mod request;
mod session;

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

pub use error::ClientError;
#[cfg(feature = "http")]
pub use http::HttpClient;
pub use request::{ApiMethod, ApiRequest};
pub use session::{Session, SessionError};

/// Performs one network operation against a backend microservice.
pub trait RemoteClient: Send + Sync + 'static {
    fn call(&self, request: ApiRequest) -> impl Future<Output = Result<Value, ClientError>> + Send;
}

impl<C: RemoteClient> RemoteClient for Arc<C> {
    fn call(&self, request: ApiRequest) -> impl Future<Output = Result<Value, ClientError>> + Send {
        (**self).call(request)
    }
}
