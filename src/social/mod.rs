//! Social feed - posts, likes, and comments.

mod comment;
mod feed;
mod service;

pub use comment::{Comment, CreateComment, DeleteComment};
pub use feed::{FeedItem, ToggleFeedLike};
pub use service::FeedService;

pub(crate) use service::decode_list;
