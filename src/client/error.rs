use serde_json::Value;

/// Transport-level failures, translated into a small taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The request could not complete: offline, timeout, or a 5xx.
    #[error("network error: {0}")]
    Network(String),
    /// The server rejected the request (4xx other than 409).
    #[error("validation error ({status}): {message}")]
    Validation { status: u16, message: String },
    /// The server reports the action was redundant (409).
    #[error("already in desired state: {0}")]
    AlreadyInDesiredState(String),
    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ClientError {
    /// Map an HTTP status and its (possibly empty) body to a client error.
    /// Returns `None` for success statuses.
    pub fn from_status(status: u16, body: &Value) -> Option<Self> {
        let message = body_message(body).unwrap_or_else(|| format!("status {}", status));
        match status {
            200..=399 => None,
            409 => Some(ClientError::AlreadyInDesiredState(message)),
            400..=499 => Some(ClientError::Validation { status, message }),
            _ => Some(ClientError::Network(message)),
        }
    }

    /// Whether a retry could plausibly succeed. Informational only: nothing
    /// in this crate retries automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }
}

fn body_message(body: &Value) -> Option<String> {
    match body {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
