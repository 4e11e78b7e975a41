//! View models - what the UI renders, derived from the cache and nothing
//! else.
//!
//! A view never keeps its own copy of a like count or flag. It observes one
//! entry, decodes the entity it shows from it, and asks the controller
//! whether an intent is in flight to disable its controls.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::cache::{CacheEvent, CacheStore, Observer};
use crate::key::ResourceKey;
use crate::mutation::node;
use crate::petmate::PetCandidate;
use crate::social::FeedItem;

/// One entity inside one observed cache entry.
pub struct EntityView<T> {
    observer: Observer,
    id_field: &'static str,
    id: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> EntityView<T> {
    /// Observe `key` and pick out the entity whose `id_field` equals `id`.
    pub fn bind<S: CacheStore + ?Sized>(
        store: &S,
        key: &ResourceKey,
        id_field: &'static str,
        id: impl Into<String>,
    ) -> Self {
        Self {
            observer: store.observe(key),
            id_field,
            id: id.into(),
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> &ResourceKey {
        self.observer.key()
    }

    /// The entity as the cache holds it right now.
    pub fn snapshot(&self) -> Option<T> {
        let entry = self.observer.current()?;
        let value = entry.value?;
        let found = node::find(&value, self.id_field, &self.id)?;
        serde_json::from_value(found.clone()).ok()
    }

    /// Wait until the observed entry changes.
    pub async fn changed(&mut self) -> Option<CacheEvent> {
        self.observer.changed().await
    }
}

pub type FeedCardView = EntityView<FeedItem>;
pub type CandidateView = EntityView<PetCandidate>;

impl FeedCardView {
    /// A card for one post, from a feed list or detail entry.
    pub fn observe<S: CacheStore + ?Sized>(store: &S, key: &ResourceKey, feed_id: &str) -> Self {
        Self::bind(store, key, "id", feed_id)
    }

    /// `pending` comes from `MutationController::is_pending` for the post.
    pub fn like_button(&self, pending: bool) -> Option<LikeButton> {
        self.snapshot().map(|item| LikeButton::for_feed(&item, pending))
    }
}

impl CandidateView {
    pub fn observe<S: CacheStore + ?Sized>(store: &S, key: &ResourceKey, user_id: &str) -> Self {
        Self::bind(store, key, "userId", user_id)
    }

    /// The banner, once the server has confirmed the match.
    pub fn match_banner(&self) -> Option<MatchBanner> {
        self.snapshot().as_ref().and_then(MatchBanner::for_candidate)
    }
}

/// Render state of a like control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeButton {
    pub liked: bool,
    pub count: u64,
    /// Disabled while an intent for the post is in flight.
    pub disabled: bool,
}

impl LikeButton {
    pub fn for_feed(item: &FeedItem, pending: bool) -> Self {
        Self {
            liked: item.is_liked,
            count: item.like_count,
            disabled: pending,
        }
    }
}

/// The "it's a match" celebration. Only exists for server-confirmed matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchBanner {
    pub user_id: String,
    pub pet_name: String,
    pub chat_room_id: Option<String>,
}

impl MatchBanner {
    pub fn for_candidate(candidate: &PetCandidate) -> Option<Self> {
        candidate.is_matched.then(|| Self {
            user_id: candidate.user_id.clone(),
            pet_name: candidate.pet_name.clone(),
            chat_room_id: candidate.chat_room_id.clone(),
        })
    }
}
