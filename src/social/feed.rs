use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::ApiRequest;
use crate::key::{kind, ResourceKey};
use crate::mutation::{node, Mutation};

pub(crate) const FEED_ID: &str = "id";
const IS_LIKED: &str = "isLiked";
const LIKE_COUNT: &str = "likeCount";

/// A feed post as the social service serves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub comment_count: u64,
}

pub(crate) fn is_feed_key(key: &ResourceKey) -> bool {
    key.is_kind(kind::FEED_LIST) || key.is_kind(kind::FEED_DETAIL)
}

/// Like or unlike one feed post.
///
/// The prediction flips `isLiked` and moves `likeCount` by exactly one.
/// A post already in the target state is left alone, so a retried intent
/// never counts twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleFeedLike {
    pub feed_id: String,
    pub user_id: String,
    pub like: bool,
}

impl ToggleFeedLike {
    pub fn like(feed_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            feed_id: feed_id.into(),
            user_id: user_id.into(),
            like: true,
        }
    }

    pub fn unlike(feed_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            like: false,
            ..Self::like(feed_id, user_id)
        }
    }
}

impl Mutation for ToggleFeedLike {
    fn name(&self) -> &'static str {
        if self.like {
            "feed.like"
        } else {
            "feed.unlike"
        }
    }

    fn entity_id(&self) -> String {
        format!("feed:{}", self.feed_id)
    }

    fn affects(&self, key: &ResourceKey) -> bool {
        is_feed_key(key)
    }

    fn apply(&self, _key: &ResourceKey, value: &Value) -> Option<Value> {
        let delta = if self.like { 1 } else { -1 };
        node::update(value, FEED_ID, &self.feed_id, |post| {
            if node::get_bool(post, IS_LIKED) == self.like {
                return false;
            }
            node::set_field(post, IS_LIKED, Value::Bool(self.like));
            node::adjust_counter(post, LIKE_COUNT, delta);
            true
        })
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::post(format!("/feeds/{}/like", self.feed_id))
            .json(&json!({ "userId": self.user_id }))
    }

    fn restore(&self, _key: &ResourceKey, current: &Value, snapshot: &Value) -> Value {
        node::restore(current, snapshot, FEED_ID, &self.feed_id)
    }

    /// Adopt the server's count and flag when the response carries them.
    fn reconcile(&self, _key: &ResourceKey, current: &Value, response: &Value) -> Option<Value> {
        if self.already_applied(response) {
            return None;
        }
        let count = response.get(LIKE_COUNT).and_then(Value::as_u64)?;
        let liked = response
            .get(IS_LIKED)
            .or_else(|| response.get("liked"))
            .and_then(Value::as_bool)
            .unwrap_or(self.like);
        node::update(current, FEED_ID, &self.feed_id, |post| {
            let a = node::set_field(post, LIKE_COUNT, Value::from(count));
            let b = node::set_field(post, IS_LIKED, Value::Bool(liked));
            a || b
        })
    }

    fn already_applied(&self, response: &Value) -> bool {
        let field = if self.like {
            "alreadyLiked"
        } else {
            "alreadyUnliked"
        };
        node::get_bool(response, field)
    }
}
