use crate::model::{
    Id,
    group::GroupSlug,
    post::PostMarker,
    user::{UserHandle, UserMarker},
};
use thiserror::Error;

pub type Result<T, E> = std::result::Result<T, CoreError<E>>;

/// Failures of the core services, generic over the error of the backing store.
#[derive(Debug, Error)]
pub enum CoreError<E> {
    #[error("User {0} cannot follow themselves")]
    SelfFollow(Id<UserMarker>),
    #[error("User {user} already follows {author}")]
    AlreadyFollowing {
        user: Id<UserMarker>,
        author: Id<UserMarker>,
    },
    #[error(transparent)]
    NotFound(#[from] NotFound),
    #[error("User {editor} is not the author of post {post}")]
    NotAuthor {
        editor: Id<UserMarker>,
        post: Id<PostMarker>,
    },
    #[error("Entity store failed: {0}")]
    Store(#[source] E),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum NotFound {
    #[error("User with handle {0} was not found")]
    UserByHandle(UserHandle),
    #[error("User with id {0} was not found")]
    UserById(Id<UserMarker>),
    #[error("Group with slug {0} was not found")]
    GroupBySlug(GroupSlug),
    #[error("Post with id {0} was not found")]
    PostById(Id<PostMarker>),
}
