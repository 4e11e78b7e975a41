use serde_json::Value;

use super::comment::{Comment, CreateComment, DeleteComment};
use super::feed::{FeedItem, ToggleFeedLike};
use crate::cache::{CacheStore, InMemoryCacheStore};
use crate::client::{ApiRequest, ClientError, RemoteClient};
use crate::key::ResourceKey;
use crate::mutation::{MutationController, MutationError, Settled};

/// Typed entry point for the social feed: reads go through the query
/// client, writes through the mutation controller.
pub struct FeedService<C, S = InMemoryCacheStore> {
    controller: MutationController<C, S>,
}

impl<C, S> FeedService<C, S>
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

    /// Load a user's feed and remember how to refetch it.
    pub async fn load_feed_list(
        &self,
        user_id: &str,
        filter: Option<&str>,
    ) -> Result<Vec<FeedItem>, ClientError> {
        let key = ResourceKey::feed_list(user_id, filter);
        let mut path = format!("/feeds?userId={}", user_id);
        if let Some(filter) = filter.filter(|f| !f.trim().is_empty()) {
            path.push_str(&format!("&filter={}", filter.trim()));
        }
        let value = self.controller.query().ensure(&key, ApiRequest::get(path)).await?;
        decode_list(value)
    }

    pub async fn load_feed(&self, feed_id: &str) -> Result<FeedItem, ClientError> {
        let key = ResourceKey::feed_detail(feed_id);
        let request = ApiRequest::get(format!("/feeds/{}", feed_id));
        let value = self.controller.query().ensure(&key, request).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn load_comments(&self, feed_id: &str) -> Result<Vec<Comment>, ClientError> {
        let key = ResourceKey::comments(feed_id);
        let request = ApiRequest::get(format!("/feeds/{}/comments", feed_id));
        let value = self.controller.query().ensure(&key, request).await?;
        decode_list(value)
    }

    /// Like a post. The list and detail entries update together.
    pub async fn like(&self, feed_id: &str, user_id: &str) -> Result<Settled, MutationError> {
        self.controller
            .run(&ToggleFeedLike::like(feed_id, user_id))
            .await
    }

    pub async fn unlike(&self, feed_id: &str, user_id: &str) -> Result<Settled, MutationError> {
        self.controller
            .run(&ToggleFeedLike::unlike(feed_id, user_id))
            .await
    }

    /// Post a comment and return the server's copy.
    pub async fn comment(
        &self,
        feed_id: &str,
        user_id: &str,
        content: &str,
    ) -> Result<Comment, MutationError> {
        let settled = self
            .controller
            .run(&CreateComment::new(feed_id, user_id, content))
            .await?;
        let created = CreateComment::created(&settled.response)
            .cloned()
            .ok_or_else(|| MutationError::Decode("response carries no comment".into()))?;
        Ok(serde_json::from_value(created)?)
    }

    pub async fn delete_comment(
        &self,
        feed_id: &str,
        comment_id: &str,
        user_id: &str,
    ) -> Result<Settled, MutationError> {
        self.controller
            .run(&DeleteComment::new(feed_id, comment_id, user_id))
            .await
    }
}

/// A list response, bare or in a paged envelope.
pub(crate) fn decode_list<T: serde::de::DeserializeOwned>(mut value: Value) -> Result<Vec<T>, ClientError> {
    let items = match crate::mutation::node::list_mut(&mut value) {
        Some(items) => std::mem::take(items),
        None => Vec::new(),
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(ClientError::from))
        .collect()
}
