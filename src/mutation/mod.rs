//! Optimistic mutations - predict locally, send, then confirm or roll back.
//!
//! Views describe what the user did as a [`MutationIntent`]; the
//! [`MutationController`] turns it into a [`Mutation`], writes the predicted
//! state into the cache at once, and settles it when the server answers.
//!
//! ## Example
//!
//! ```ignore
//! use pawcache::{IntentKind, MutationController, MutationIntent, QueryClient};
//!
//! let controller = MutationController::new(QueryClient::new(client));
//! let intent = MutationIntent::new(IntentKind::LikeFeed, "feed-1", "user-42");
//! match controller.mutate(intent).await {
//!     Ok(settled) => { /* optimistic state stands */ }
//!     Err(err) => { /* already rolled back; show err.surface() */ }
//! }
//! ```

mod controller;
mod error;
mod intent;
#[allow(clippy::module_inception)]
mod mutation;
pub mod node;
mod queue;

pub use controller::{MutationController, Outcome, Settled};
pub use error::{MutationError, Surface};
pub use intent::{IntentKind, MutationIntent};
pub use mutation::Mutation;
pub use queue::{MutationQueue, QueueSlot};
