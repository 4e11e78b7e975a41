//! reqwest transport for the remote client.
//!
//! Requires the `http` feature.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use super::error::ClientError;
use super::request::{ApiMethod, ApiRequest};
use super::session::Session;
use super::RemoteClient;
use crate::config::ClientConfig;

/// HTTP client bound to one reverse-proxied API base URL.
///
/// Attaches the session's bearer token when one is present. Issues exactly
/// one request per call and never retries.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<RwLock<Session>>,
}

impl HttpClient {
    /// Build the reqwest client from `config`. Each request reads the
    /// bearer token from `session`.
    pub fn new(config: &ClientConfig, session: Arc<RwLock<Session>>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<RwLock<Session>> {
        &self.session
    }

    fn bearer_token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .bearer_token()
            .map(str::to_string)
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn method(method: ApiMethod) -> reqwest::Method {
    match method {
        ApiMethod::Get => reqwest::Method::GET,
        ApiMethod::Post => reqwest::Method::POST,
        ApiMethod::Put => reqwest::Method::PUT,
        ApiMethod::Delete => reqwest::Method::DELETE,
    }
}

impl RemoteClient for HttpClient {
    async fn call(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let mut builder = self
            .http
            .request(method(request.method), self.url(&request.path));
        if let Some(token) = self.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(%request, "api.call");
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(body) => body,
                Err(e) if status.is_success() => return Err(e.into()),
                Err(_) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
            }
        };

        match ClientError::from_status(status.as_u16(), &body) {
            Some(err) => {
                tracing::debug!(%request, status = status.as_u16(), error = %err, "api.call failed");
                Err(err)
            }
            None => Ok(body),
        }
    }
}
