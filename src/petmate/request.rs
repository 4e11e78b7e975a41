use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::ApiRequest;
use crate::key::{kind, ResourceKey};
use crate::mutation::{node, Mutation};

const MATCH_ID: &str = "matchId";

/// A pending match request addressed to the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub match_id: String,
    pub from_user_id: String,
    #[serde(default)]
    pub pet_name: String,
}

/// Accept or reject a match request. The request leaves the pending list
/// at once; accepting refreshes the match list once the server agrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespondToRequest {
    pub match_id: String,
    pub user_id: String,
    pub accept: bool,
}

impl RespondToRequest {
    pub fn new(match_id: impl Into<String>, user_id: impl Into<String>, accept: bool) -> Self {
        Self {
            match_id: match_id.into(),
            user_id: user_id.into(),
            accept,
        }
    }
}

impl Mutation for RespondToRequest {
    fn name(&self) -> &'static str {
        if self.accept {
            "petmate.accept"
        } else {
            "petmate.reject"
        }
    }

    fn entity_id(&self) -> String {
        format!("match:{}", self.match_id)
    }

    fn affects(&self, key: &ResourceKey) -> bool {
        key.is_kind(kind::PETMATE_REQUESTS) && key.scope("userId") == Some(self.user_id.as_str())
    }

    fn apply(&self, _key: &ResourceKey, value: &Value) -> Option<Value> {
        node::remove(value, MATCH_ID, &self.match_id)
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::post(format!("/petmate/requests/{}/respond", self.match_id)).json(&json!({
            "matchId": self.match_id,
            "userId": self.user_id,
            "accept": self.accept,
        }))
    }

    fn restore(&self, _key: &ResourceKey, current: &Value, snapshot: &Value) -> Value {
        node::reinsert(current, snapshot, MATCH_ID, &self.match_id)
    }

    fn invalidates(&self, _response: &Value) -> Vec<ResourceKey> {
        if self.accept {
            vec![
                ResourceKey::petmate_matches(&self.user_id),
                ResourceKey::petmate_requests(&self.user_id),
            ]
        } else {
            vec![ResourceKey::petmate_requests(&self.user_id)]
        }
    }
}
