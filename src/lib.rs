mod cache;
mod client;
mod config;
mod key;
pub mod mutation;
pub mod petmate;
mod query;
pub mod social;
pub mod view;

pub use cache::{
    CacheEntry, CacheEvent, CacheStore, Change, EntryStatus, InMemoryCacheStore, Observer,
    Snapshot, SnapshotRecord,
};
#[cfg(feature = "http")]
pub use client::HttpClient;
pub use client::{ApiMethod, ApiRequest, ClientError, RemoteClient, Session, SessionError};
pub use config::{ClientConfig, ConfigError};
pub use key::{kind, KeyParseError, ResourceKey};
pub use mutation::{
    IntentKind, Mutation, MutationController, MutationError, MutationIntent, MutationQueue,
    Outcome, QueueSlot, Settled, Surface,
};
pub use petmate::{
    EdgeState, LikeEdge, LikeOutcome, LikePet, LikeResponse, MatchRequest, PetCandidate,
    PetmateService, RespondToRequest, UnlikePet,
};
pub use query::QueryClient;
pub use social::{Comment, CreateComment, DeleteComment, FeedItem, FeedService, ToggleFeedLike};
pub use view::{CandidateView, EntityView, FeedCardView, LikeButton, MatchBanner};
