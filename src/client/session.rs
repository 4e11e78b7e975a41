//! Auth session persisted on the device.
//!
//! The app keeps its login state in a small JSON document:
//!
//! ```json
//! {
//!   "accessToken": "eyJhbGciOi...",
//!   "userId": "user-42"
//! }
//! ```
//!
//! The session is handed to the HTTP client explicitly; nothing reads it
//! from a global.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

const ACCESS_TOKEN: &str = "accessToken";
const USER_ID: &str = "userId";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to read session file: {0}")]
    Io(#[from] io::Error),
    #[error("malformed session file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Session variables (access token, user id, anything else the app stores).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    variables: HashMap<String, String>,
}

impl Session {
    /// An anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap variables already read from elsewhere.
    pub fn from_map(variables: HashMap<String, String>) -> Self {
        Self { variables }
    }

    /// Load a persisted session. A missing file is an anonymous session.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let raw = match fs::read_to_string(path.as_ref()) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Self::new());
        }
        Ok(Self::from_map(serde_json::from_str(&raw)?))
    }

    /// Write the session back as pretty JSON, replacing the file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let raw = serde_json::to_string_pretty(&self.variables)?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// The bearer token, if the user is logged in.
    pub fn bearer_token(&self) -> Option<&str> {
        self.get(ACCESS_TOKEN).filter(|t| !t.is_empty())
    }

    /// The logged-in user, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.get(USER_ID)
    }

    /// Store the user id and access token together.
    pub fn login(&mut self, user_id: impl Into<String>, token: impl Into<String>) {
        self.set(USER_ID, user_id);
        self.set(ACCESS_TOKEN, token);
    }

    /// Forget the token and user id. Other variables stay.
    pub fn logout(&mut self) {
        self.variables.remove(ACCESS_TOKEN);
        self.variables.remove(USER_ID);
    }

    /// A raw session variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|v| v.as_str())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }
}
