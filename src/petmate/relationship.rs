//! Client-observed state of one like edge between two pet-mate users.
//!
//! ```text
//! Unliked --like--> Provisional --confirm(false)--> Liked
//!                        |       --confirm(true)---> Matched (terminal)
//!                        +--rollback--> Unliked
//! Liked --unlike--> Unliked
//! ```

use super::like::PetCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeState {
    Unliked,
    /// Liked locally, waiting for the server.
    Provisional,
    Liked,
    /// Mutual like confirmed by the server.
    Matched,
}

impl EdgeState {
    /// Derive the state from the cached candidate and whether a mutation
    /// for it is in flight.
    pub fn observe(candidate: &PetCandidate, pending: bool) -> Self {
        match (candidate.is_matched, candidate.is_liked, pending) {
            (true, _, _) => EdgeState::Matched,
            (false, true, true) => EdgeState::Provisional,
            (false, true, false) => EdgeState::Liked,
            (false, false, _) => EdgeState::Unliked,
        }
    }

    pub fn like(self) -> Self {
        match self {
            EdgeState::Unliked => EdgeState::Provisional,
            other => other,
        }
    }

    /// Apply the server's answer. Only a confirmation can produce `Matched`.
    pub fn confirm(self, matched: bool) -> Self {
        match self {
            EdgeState::Provisional | EdgeState::Liked if matched => EdgeState::Matched,
            EdgeState::Provisional => EdgeState::Liked,
            other => other,
        }
    }

    pub fn rollback(self) -> Self {
        match self {
            EdgeState::Provisional => EdgeState::Unliked,
            other => other,
        }
    }

    pub fn unlike(self) -> Self {
        match self {
            EdgeState::Liked | EdgeState::Provisional => EdgeState::Unliked,
            other => other,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == EdgeState::Matched
    }
}

/// A directed like edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeEdge {
    pub from_user_id: String,
    pub to_user_id: String,
    pub liked: bool,
}

impl LikeEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, liked: bool) -> Self {
        Self {
            from_user_id: from.into(),
            to_user_id: to.into(),
            liked,
        }
    }

    pub fn is_reverse_of(&self, other: &LikeEdge) -> bool {
        self.from_user_id == other.to_user_id && self.to_user_id == other.from_user_id
    }

    /// Two edges form a match when they point at each other and both like.
    pub fn is_mutual(&self, other: &LikeEdge) -> bool {
        self.is_reverse_of(other) && self.liked && other.liked
    }
}
