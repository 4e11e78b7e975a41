use super::mutation::Mutation;
use crate::petmate::{LikePet, RespondToRequest, UnlikePet};
use crate::social::{CreateComment, DeleteComment, ToggleFeedLike};

/// What the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentKind {
    LikeFeed,
    UnlikeFeed,
    /// Target is the feed the comment goes under.
    CreateComment { content: String },
    /// Target is the comment.
    DeleteComment { feed_id: String },
    /// Target is the other pet-mate user.
    LikePet,
    UnlikePet,
    /// Target is the match request.
    AcceptRequest,
    RejectRequest,
}

/// A single user action, created by a view's event handler and consumed
/// once by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationIntent {
    pub kind: IntentKind,
    pub target_id: String,
    pub actor_id: String,
}

impl MutationIntent {
    pub fn new(kind: IntentKind, target_id: impl Into<String>, actor_id: impl Into<String>) -> Self {
        Self {
            kind,
            target_id: target_id.into(),
            actor_id: actor_id.into(),
        }
    }

    pub fn into_mutation(self) -> Box<dyn Mutation> {
        let MutationIntent {
            kind,
            target_id,
            actor_id,
        } = self;
        match kind {
            IntentKind::LikeFeed => Box::new(ToggleFeedLike::like(target_id, actor_id)),
            IntentKind::UnlikeFeed => Box::new(ToggleFeedLike::unlike(target_id, actor_id)),
            IntentKind::CreateComment { content } => {
                Box::new(CreateComment::new(target_id, actor_id, content))
            }
            IntentKind::DeleteComment { feed_id } => {
                Box::new(DeleteComment::new(feed_id, target_id, actor_id))
            }
            IntentKind::LikePet => Box::new(LikePet::new(actor_id, target_id)),
            IntentKind::UnlikePet => Box::new(UnlikePet::new(actor_id, target_id)),
            IntentKind::AcceptRequest => Box::new(RespondToRequest::new(target_id, actor_id, true)),
            IntentKind::RejectRequest => {
                Box::new(RespondToRequest::new(target_id, actor_id, false))
            }
        }
    }
}
