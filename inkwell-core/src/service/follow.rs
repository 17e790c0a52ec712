use crate::{
    error::{CoreError, NotFound, Result},
    model::{Id, follow::Follow, user::UserMarker},
    store::{EntityStore, FollowFilter},
};
use tracing::{debug, info};

/// Owns every mutation of the follow relation and answers follow queries.
#[derive(Debug)]
pub struct FollowManager<'store, S> {
    store: &'store S,
}

impl<'store, S: EntityStore> FollowManager<'store, S> {
    #[must_use]
    pub fn new(store: &'store S) -> Self {
        Self { store }
    }

    async fn require_user(&self, user: Id<UserMarker>) -> Result<(), S::Error> {
        self.store
            .fetch_user(user)
            .await
            .map_err(CoreError::Store)?
            .ok_or(NotFound::UserById(user))?;
        Ok(())
    }

    /// Makes `follower` follow `target`. Both users must exist.
    ///
    /// The existence check and the insert are separate steps. When a
    /// concurrent request inserts the same pair in between, the store reports
    /// nothing written and the call still ends in [`CoreError::AlreadyFollowing`].
    pub async fn follow(
        &self,
        follower: Id<UserMarker>,
        target: Id<UserMarker>,
    ) -> Result<(), S::Error> {
        let follow = Follow::new(follower, target);
        if follow.is_self_follow() {
            return Err(CoreError::SelfFollow(follower));
        }
        self.require_user(follower).await?;
        self.require_user(target).await?;

        let already_following = || CoreError::AlreadyFollowing {
            user: follower,
            author: target,
        };

        if self.is_following(follower, target).await? {
            return Err(already_following());
        }
        if !self
            .store
            .insert_follow(follow)
            .await
            .map_err(CoreError::Store)?
        {
            debug!(%follower, %target, "Lost follow insert race");
            return Err(already_following());
        }

        info!(%follower, %target, "User followed author");
        Ok(())
    }

    /// Removes the follow if there is one. Unfollowing someone not followed
    /// is not an error.
    pub async fn unfollow(
        &self,
        follower: Id<UserMarker>,
        target: Id<UserMarker>,
    ) -> Result<(), S::Error> {
        let removed = self
            .store
            .delete_follow(Follow::new(follower, target))
            .await
            .map_err(CoreError::Store)?;

        if removed {
            info!(%follower, %target, "User unfollowed author");
        }
        Ok(())
    }

    pub async fn is_following(
        &self,
        follower: Id<UserMarker>,
        target: Id<UserMarker>,
    ) -> Result<bool, S::Error> {
        self.store
            .exists_follow(Follow::new(follower, target))
            .await
            .map_err(CoreError::Store)
    }

    /// Number of authors `user` follows.
    pub async fn following_count(&self, user: Id<UserMarker>) -> Result<u64, S::Error> {
        self.store
            .count_follows(user)
            .await
            .map_err(CoreError::Store)
    }

    /// Follows of `user`, one per followed author.
    pub async fn following(&self, user: Id<UserMarker>) -> Result<Vec<Follow>, S::Error> {
        self.store
            .find_follows_by(FollowFilter {
                user: Some(user),
                author: None,
            })
            .await
            .map_err(CoreError::Store)
    }

    /// Number of users following `author`.
    pub async fn followers_count(&self, author: Id<UserMarker>) -> Result<u64, S::Error> {
        let followers = self.followers(author).await?;
        Ok(u64::try_from(followers.len()).unwrap_or(u64::MAX))
    }

    /// Follows targeting `author`, one per follower.
    pub async fn followers(&self, author: Id<UserMarker>) -> Result<Vec<Follow>, S::Error> {
        self.store
            .find_follows_by(FollowFilter {
                user: None,
                author: Some(author),
            })
            .await
            .map_err(CoreError::Store)
    }
}
