//! The persistence contract the core services are written against.

pub mod memory;

use crate::model::{
    Id,
    comment::{Comment, NewComment},
    follow::Follow,
    group::{Group, GroupMarker, GroupSlug, NewGroup},
    post::{NewPost, Post, PostMarker, PostUpdate},
    user::{NewUser, User, UserHandle, UserMarker},
};
use std::future::Future;

/// Selects posts for a listing. Unset criteria do not restrict the result.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostFilter {
    pub author: Option<Id<UserMarker>>,
    pub group: Option<Id<GroupMarker>>,
    /// Only posts whose author is followed by this user.
    pub followed_by: Option<Id<UserMarker>>,
}

impl PostFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn by_author(author: Id<UserMarker>) -> Self {
        Self {
            author: Some(author),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_group(group: Id<GroupMarker>) -> Self {
        Self {
            group: Some(group),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn followed_by(user: Id<UserMarker>) -> Self {
        Self {
            followed_by: Some(user),
            ..Self::default()
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct FollowFilter {
    pub user: Option<Id<UserMarker>>,
    pub author: Option<Id<UserMarker>>,
}

/// Durable records of users, groups, posts, comments and follows.
///
/// Every post query returns posts in [`Post::listing_order`]. Comments are
/// returned oldest first.
pub trait EntityStore: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn insert_user(&self, user: &NewUser) -> impl Future<Output = Result<User, Self::Error>> + Send;

    fn fetch_user(
        &self,
        user_id: Id<UserMarker>,
    ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send;

    fn fetch_user_by_handle(
        &self,
        handle: &UserHandle,
    ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send;

    fn insert_group(
        &self,
        group: &NewGroup,
    ) -> impl Future<Output = Result<Group, Self::Error>> + Send;

    fn fetch_group_by_slug(
        &self,
        slug: &GroupSlug,
    ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send;

    fn insert_post(&self, post: &NewPost) -> impl Future<Output = Result<Post, Self::Error>> + Send;

    /// Replaces the editable fields of a post. `None` if the post does not exist.
    fn update_post(
        &self,
        post_id: Id<PostMarker>,
        update: &PostUpdate,
    ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send;

    fn fetch_post(
        &self,
        post_id: Id<PostMarker>,
    ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send;

    fn find_posts_by(
        &self,
        filter: PostFilter,
    ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send;

    fn insert_comment(
        &self,
        comment: &NewComment,
    ) -> impl Future<Output = Result<Comment, Self::Error>> + Send;

    fn find_comments(
        &self,
        post_id: Id<PostMarker>,
    ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send;

    /// Returns whether a record was written; `false` if the pair already existed.
    fn insert_follow(&self, follow: Follow)
    -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Returns whether a record was removed.
    fn delete_follow(&self, follow: Follow)
    -> impl Future<Output = Result<bool, Self::Error>> + Send;

    fn find_follows_by(
        &self,
        filter: FollowFilter,
    ) -> impl Future<Output = Result<Vec<Follow>, Self::Error>> + Send;

    fn exists_follow(&self, follow: Follow)
    -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Number of authors `user` follows.
    fn count_follows(
        &self,
        user: Id<UserMarker>,
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send;
}
