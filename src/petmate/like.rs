use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::ApiRequest;
use crate::key::{kind, ResourceKey};
use crate::mutation::{node, Mutation};

pub(crate) const CANDIDATE_ID: &str = "userId";
const IS_LIKED: &str = "isLiked";
const IS_MATCHED: &str = "isMatched";
const CHAT_ROOM_ID: &str = "chatRoomId";

/// Another user's pet as shown in the swipe deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetCandidate {
    pub user_id: String,
    #[serde(default)]
    pub pet_name: String,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_matched: bool,
    #[serde(default)]
    pub chat_room_id: Option<String>,
}

/// Body of `POST /petmate/like`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    #[serde(default)]
    pub is_matched: bool,
    #[serde(default)]
    pub already_liked: bool,
    #[serde(default)]
    pub chat_room_id: Option<String>,
}

impl LikeResponse {
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

fn is_deck_of(key: &ResourceKey, user_id: &str) -> bool {
    key.is_kind(kind::PETMATE_CANDIDATES) && key.scope("userId") == Some(user_id)
}

fn like_body(from: &str, to: &str) -> Value {
    json!({ "fromUserId": from, "toUserId": to })
}

/// Like another user's pet.
///
/// Only `isLiked` is predicted. Whether the like completes a match depends
/// on the reverse edge, which only the server knows, so `isMatched` and
/// the chat room are written from the response and never guessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikePet {
    pub from_user_id: String,
    pub to_user_id: String,
}

impl LikePet {
    pub fn new(from_user_id: impl Into<String>, to_user_id: impl Into<String>) -> Self {
        Self {
            from_user_id: from_user_id.into(),
            to_user_id: to_user_id.into(),
        }
    }
}

impl Mutation for LikePet {
    fn name(&self) -> &'static str {
        "petmate.like"
    }

    fn entity_id(&self) -> String {
        format!("pet:{}:{}", self.from_user_id, self.to_user_id)
    }

    fn affects(&self, key: &ResourceKey) -> bool {
        is_deck_of(key, &self.from_user_id)
    }

    fn apply(&self, _key: &ResourceKey, value: &Value) -> Option<Value> {
        node::update(value, CANDIDATE_ID, &self.to_user_id, |candidate| {
            if node::get_bool(candidate, IS_MATCHED) {
                return false;
            }
            node::set_field(candidate, IS_LIKED, Value::Bool(true))
        })
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::post("/petmate/like").json(&like_body(&self.from_user_id, &self.to_user_id))
    }

    fn restore(&self, _key: &ResourceKey, current: &Value, snapshot: &Value) -> Value {
        node::restore(current, snapshot, CANDIDATE_ID, &self.to_user_id)
    }

    fn reconcile(&self, _key: &ResourceKey, current: &Value, response: &Value) -> Option<Value> {
        let response = LikeResponse::from_value(response);
        if !response.is_matched {
            return None;
        }
        node::update(current, CANDIDATE_ID, &self.to_user_id, |candidate| {
            let mut changed = node::set_field(candidate, IS_LIKED, Value::Bool(true));
            changed |= node::set_field(candidate, IS_MATCHED, Value::Bool(true));
            if let Some(room) = &response.chat_room_id {
                changed |= node::set_field(candidate, CHAT_ROOM_ID, Value::from(room.as_str()));
            }
            changed
        })
    }

    fn already_applied(&self, response: &Value) -> bool {
        LikeResponse::from_value(response).already_liked
    }

    fn invalidates(&self, response: &Value) -> Vec<ResourceKey> {
        if LikeResponse::from_value(response).is_matched {
            vec![ResourceKey::petmate_matches(&self.from_user_id)]
        } else {
            Vec::new()
        }
    }
}

/// Withdraw a like. A match is terminal and is never undone here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlikePet {
    pub from_user_id: String,
    pub to_user_id: String,
}

impl UnlikePet {
    pub fn new(from_user_id: impl Into<String>, to_user_id: impl Into<String>) -> Self {
        Self {
            from_user_id: from_user_id.into(),
            to_user_id: to_user_id.into(),
        }
    }
}

impl Mutation for UnlikePet {
    fn name(&self) -> &'static str {
        "petmate.unlike"
    }

    fn entity_id(&self) -> String {
        format!("pet:{}:{}", self.from_user_id, self.to_user_id)
    }

    fn affects(&self, key: &ResourceKey) -> bool {
        is_deck_of(key, &self.from_user_id)
    }

    fn apply(&self, _key: &ResourceKey, value: &Value) -> Option<Value> {
        node::update(value, CANDIDATE_ID, &self.to_user_id, |candidate| {
            if node::get_bool(candidate, IS_MATCHED) {
                return false;
            }
            node::set_field(candidate, IS_LIKED, Value::Bool(false))
        })
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::delete("/petmate/like").json(&like_body(&self.from_user_id, &self.to_user_id))
    }

    fn restore(&self, _key: &ResourceKey, current: &Value, snapshot: &Value) -> Value {
        node::restore(current, snapshot, CANDIDATE_ID, &self.to_user_id)
    }

    fn rejected(&self, response: &Value) -> Option<String> {
        match response {
            Value::Bool(false) => Some("unlike was not applied".into()),
            _ => None,
        }
    }
}
