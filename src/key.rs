//! Resource identity - the normalized key addressing one cache entry.
//!
//! Two logically identical queries must produce the same key, otherwise an
//! optimistic write or an invalidation would miss one of the views showing
//! that data. Scope parameters are kept in a sorted map, values are trimmed,
//! and empty values are dropped.
//!
//! ```ignore
//! let a = ResourceKey::new(kind::FEED_LIST).with("userId", "u1").with("filter", "");
//! let b = ResourceKey::feed_list("u1", None);
//! assert_eq!(a, b);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Resource kinds served by the backend microservices.
pub mod kind {
    pub const FEED_LIST: &str = "feedList";
    pub const FEED_DETAIL: &str = "feedDetail";
    pub const COMMENTS: &str = "comments";
    pub const PETMATE_CANDIDATES: &str = "petmateCandidates";
    pub const PETMATE_REQUESTS: &str = "petmateRequests";
    pub const PETMATE_MATCHES: &str = "petmateMatches";
}

/// A composite cache key: resource kind plus normalized scope parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    kind: String,
    scope: BTreeMap<String, String>,
}

impl ResourceKey {
    /// A key with no scope.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into().trim().to_string(),
            scope: BTreeMap::new(),
        }
    }

    /// Add a scope parameter. Blank values are dropped so that "no filter"
    /// and "empty filter" address the same entry.
    pub fn with(mut self, name: impl Into<String>, value: impl AsRef<str>) -> Self {
        let value = value.as_ref().trim();
        let name = name.into().trim().to_string();
        if !value.is_empty() && !name.is_empty() {
            self.scope.insert(name, value.to_string());
        }
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn scope(&self, name: &str) -> Option<&str> {
        self.scope.get(name).map(|v| v.as_str())
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// The home feed of `user_id`, optionally filtered.
    pub fn feed_list(user_id: &str, filter: Option<&str>) -> Self {
        Self::new(kind::FEED_LIST)
            .with("userId", user_id)
            .with("filter", filter.unwrap_or_default())
    }

    pub fn feed_detail(feed_id: &str) -> Self {
        Self::new(kind::FEED_DETAIL).with("feedId", feed_id)
    }

    /// Comments under one post.
    pub fn comments(feed_id: &str) -> Self {
        Self::new(kind::COMMENTS).with("feedId", feed_id)
    }

    /// Pet candidates shown to `user_id`.
    pub fn petmate_candidates(user_id: &str) -> Self {
        Self::new(kind::PETMATE_CANDIDATES).with("userId", user_id)
    }

    pub fn petmate_requests(user_id: &str) -> Self {
        Self::new(kind::PETMATE_REQUESTS).with("userId", user_id)
    }

    pub fn petmate_matches(user_id: &str) -> Self {
        Self::new(kind::PETMATE_MATCHES).with("userId", user_id)
    }

    /// Parse the `kind?k1=v1&k2=v2` form produced by `Display`.
    pub fn parse(raw: &str) -> Result<Self, KeyParseError> {
        let (kind, query) = match raw.split_once('?') {
            Some((kind, query)) => (kind, Some(query)),
            None => (raw, None),
        };
        if kind.trim().is_empty() {
            return Err(KeyParseError::EmptyKind);
        }

        let mut key = Self::new(kind);
        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            if pair.is_empty() {
                continue;
            }
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| KeyParseError::MalformedPair(pair.to_string()))?;
            key = key.with(name, value);
        }
        Ok(key)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)?;
        for (i, (name, value)) in self.scope.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, name, value)?;
        }
        Ok(())
    }
}

impl FromStr for ResourceKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("resource key has no kind")]
    EmptyKind,
    #[error("malformed scope parameter: {0}")]
    MalformedPair(String),
}
