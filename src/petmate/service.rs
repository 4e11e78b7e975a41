use super::like::{LikePet, LikeResponse, PetCandidate, UnlikePet};
use super::relationship::EdgeState;
use super::request::{MatchRequest, RespondToRequest};
use crate::cache::{CacheStore, InMemoryCacheStore};
use crate::client::{ApiRequest, ClientError, RemoteClient};
use crate::key::ResourceKey;
use crate::mutation::{Mutation, MutationController, MutationError, Outcome, Settled};
use crate::social::decode_list;

/// What the liking user learns from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeOutcome {
    pub is_matched: bool,
    pub already_liked: bool,
    pub chat_room_id: Option<String>,
}

/// Typed entry point for pet-mate matching.
pub struct PetmateService<C, S = InMemoryCacheStore> {
    controller: MutationController<C, S>,
}

impl<C, S> PetmateService<C, S>
where
    C: RemoteClient,
    S: CacheStore + Clone + 'static,
{
    pub fn new(controller: MutationController<C, S>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &MutationController<C, S> {
        &self.controller
    }

    /// Load the candidates shown to `user_id`.
    pub async fn load_candidates(&self, user_id: &str) -> Result<Vec<PetCandidate>, ClientError> {
        let key = ResourceKey::petmate_candidates(user_id);
        let request = ApiRequest::get(format!("/petmate/candidates?userId={}", user_id));
        decode_list(self.controller.query().ensure(&key, request).await?)
    }

    pub async fn load_requests(&self, user_id: &str) -> Result<Vec<MatchRequest>, ClientError> {
        let key = ResourceKey::petmate_requests(user_id);
        let request = ApiRequest::get(format!("/petmate/requests?userId={}", user_id));
        decode_list(self.controller.query().ensure(&key, request).await?)
    }

    pub async fn load_matches(&self, user_id: &str) -> Result<Vec<PetCandidate>, ClientError> {
        let key = ResourceKey::petmate_matches(user_id);
        let request = ApiRequest::get(format!("/petmate/matches?userId={}", user_id));
        decode_list(self.controller.query().ensure(&key, request).await?)
    }

    /// Like `to_user_id`'s pet. The match flag in the result is the server's
    /// answer; nothing about a match is shown before it arrives.
    pub async fn like(&self, from_user_id: &str, to_user_id: &str) -> Result<LikeOutcome, MutationError> {
        let settled = self
            .controller
            .run(&LikePet::new(from_user_id, to_user_id))
            .await?;
        let response = LikeResponse::from_value(&settled.response);
        if response.is_matched {
            tracing::info!(from = from_user_id, to = to_user_id, "petmate.matched");
        }
        Ok(LikeOutcome {
            is_matched: response.is_matched,
            already_liked: response.already_liked || settled.outcome == Outcome::AlreadyApplied,
            chat_room_id: response.chat_room_id,
        })
    }

    /// Withdraw a like. A refusal rolls back and returns `Rejected`.
    pub async fn unlike(&self, from_user_id: &str, to_user_id: &str) -> Result<bool, MutationError> {
        self.controller
            .run(&UnlikePet::new(from_user_id, to_user_id))
            .await?;
        Ok(true)
    }

    pub async fn respond(
        &self,
        match_id: &str,
        user_id: &str,
        accept: bool,
    ) -> Result<Settled, MutationError> {
        self.controller
            .run(&RespondToRequest::new(match_id, user_id, accept))
            .await
    }

    /// Current edge state towards one candidate, from the cache alone.
    pub fn edge_state(&self, from_user_id: &str, to_user_id: &str) -> Option<EdgeState> {
        let key = ResourceKey::petmate_candidates(from_user_id);
        let entry = self.controller.store().read(&key)?;
        let deck: Vec<PetCandidate> = decode_list(entry.value?).ok()?;
        let candidate = deck.into_iter().find(|c| c.user_id == to_user_id)?;
        let pending = self
            .controller
            .is_pending(&LikePet::new(from_user_id, to_user_id).entity_id());
        Some(EdgeState::observe(&candidate, pending))
    }
}
