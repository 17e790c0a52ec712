use crate::{
    error::{CoreError, Result},
    model::{Id, post::Post, user::UserMarker},
    store::{EntityStore, PostFilter},
};
use tracing::debug;

/// Builds the personal feed of a viewer from the authors they follow.
#[derive(Debug)]
pub struct FeedComposer<'store, S> {
    store: &'store S,
}

impl<'store, S: EntityStore> FeedComposer<'store, S> {
    #[must_use]
    pub fn new(store: &'store S) -> Self {
        Self { store }
    }

    /// Posts of every author `viewer` follows, newest first.
    ///
    /// The followed authors are never collected up front: the store joins
    /// posts against the follow relation. Following nobody yields an empty
    /// feed.
    pub async fn compose_feed(&self, viewer: Id<UserMarker>) -> Result<Vec<Post>, S::Error> {
        let posts = self
            .store
            .find_posts_by(PostFilter::followed_by(viewer))
            .await
            .map_err(CoreError::Store)?;

        debug!(%viewer, posts = posts.len(), "Composed feed");
        Ok(posts)
    }
}
