use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::feed::{is_feed_key, FEED_ID};
use crate::client::ApiRequest;
use crate::key::{kind, ResourceKey};
use crate::mutation::{node, Mutation};

const COMMENT_ID: &str = "id";
const COMMENT_COUNT: &str = "commentCount";

/// A comment under a feed post. `pending` marks a provisional comment the
/// server has not confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub feed_id: String,
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub pending: bool,
}

fn is_comments_of(key: &ResourceKey, feed_id: &str) -> bool {
    key.is_kind(kind::COMMENTS) && key.scope("feedId") == Some(feed_id)
}

/// Post a comment. A provisional comment with a `temp-` id shows up at
/// once and is swapped for the server's copy (real id, timestamp) on
/// success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateComment {
    pub feed_id: String,
    pub user_id: String,
    pub content: String,
    pub temp_id: String,
}

impl CreateComment {
    pub fn new(
        feed_id: impl Into<String>,
        user_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            feed_id: feed_id.into(),
            user_id: user_id.into(),
            content: content.into(),
            temp_id: format!("temp-{}", Uuid::new_v4()),
        }
    }

    fn provisional(&self) -> Comment {
        Comment {
            id: self.temp_id.clone(),
            feed_id: self.feed_id.clone(),
            user_id: self.user_id.clone(),
            content: self.content.clone(),
            created_at: None,
            pending: true,
        }
    }

    /// The created comment, whether the server returns it bare or wrapped.
    pub fn created(response: &Value) -> Option<&Value> {
        let comment = response.get("comment").unwrap_or(response);
        comment.get(COMMENT_ID).map(|_| comment)
    }
}

impl Mutation for CreateComment {
    fn name(&self) -> &'static str {
        "comment.create"
    }

    fn entity_id(&self) -> String {
        format!("feed:{}", self.feed_id)
    }

    fn affects(&self, key: &ResourceKey) -> bool {
        is_comments_of(key, &self.feed_id) || is_feed_key(key)
    }

    fn apply(&self, key: &ResourceKey, value: &Value) -> Option<Value> {
        if key.is_kind(kind::COMMENTS) {
            let mut next = value.clone();
            let comment = serde_json::to_value(self.provisional()).ok()?;
            node::list_mut(&mut next)?.push(comment);
            return Some(next);
        }
        node::update(value, FEED_ID, &self.feed_id, |post| {
            node::adjust_counter(post, COMMENT_COUNT, 1)
        })
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::post(format!("/feeds/{}/comments", self.feed_id))
            .json(&json!({ "userId": self.user_id, "content": self.content }))
    }

    fn restore(&self, key: &ResourceKey, current: &Value, snapshot: &Value) -> Value {
        if key.is_kind(kind::COMMENTS) {
            return node::remove(current, COMMENT_ID, &self.temp_id)
                .unwrap_or_else(|| current.clone());
        }
        node::restore(current, snapshot, FEED_ID, &self.feed_id)
    }

    /// A success without the created comment leaves nothing to swap the
    /// provisional one for.
    fn rejected(&self, response: &Value) -> Option<String> {
        match Self::created(response) {
            Some(_) => None,
            None => Some("response carries no comment".into()),
        }
    }

    fn reconcile(&self, key: &ResourceKey, current: &Value, response: &Value) -> Option<Value> {
        if !key.is_kind(kind::COMMENTS) {
            return None;
        }
        let created = Self::created(response)?;
        node::update(current, COMMENT_ID, &self.temp_id, |comment| {
            *comment = created.clone();
            true
        })
    }
}

/// Delete one comment and decrement the post's comment count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteComment {
    pub feed_id: String,
    pub comment_id: String,
    pub user_id: String,
}

impl DeleteComment {
    pub fn new(
        feed_id: impl Into<String>,
        comment_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            feed_id: feed_id.into(),
            comment_id: comment_id.into(),
            user_id: user_id.into(),
        }
    }
}

impl Mutation for DeleteComment {
    fn name(&self) -> &'static str {
        "comment.delete"
    }

    fn entity_id(&self) -> String {
        format!("feed:{}", self.feed_id)
    }

    fn affects(&self, key: &ResourceKey) -> bool {
        is_comments_of(key, &self.feed_id) || is_feed_key(key)
    }

    fn apply(&self, key: &ResourceKey, value: &Value) -> Option<Value> {
        if key.is_kind(kind::COMMENTS) {
            return node::remove(value, COMMENT_ID, &self.comment_id);
        }
        node::update(value, FEED_ID, &self.feed_id, |post| {
            node::adjust_counter(post, COMMENT_COUNT, -1)
        })
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::delete(format!(
            "/feeds/{}/comments/{}",
            self.feed_id, self.comment_id
        ))
    }

    fn restore(&self, key: &ResourceKey, current: &Value, snapshot: &Value) -> Value {
        if key.is_kind(kind::COMMENTS) {
            return node::reinsert(current, snapshot, COMMENT_ID, &self.comment_id);
        }
        node::restore(current, snapshot, FEED_ID, &self.feed_id)
    }
}
