//! Pet-mate matching - swipe likes, mutual matches, and match requests.
//!
//! A match is bidirectional and terminal. The server is the only authority
//! on it: the liking client predicts its own like and waits for the
//! response to learn whether the other side liked back.

mod like;
mod relationship;
mod request;
mod service;

pub use like::{LikePet, LikeResponse, PetCandidate, UnlikePet};
pub use relationship::{EdgeState, LikeEdge};
pub use request::{MatchRequest, RespondToRequest};
pub use service::{LikeOutcome, PetmateService};
