use crate::model::{
    Id,
    bounded::bounded_string,
    post::PostMarker,
    serialize_timestamp,
    user::{User, UserMarker},
};
use serde::Serialize;
use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub post: Id<PostMarker>,
    pub author: User,
    pub text: CommentText,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: UtcDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct NewComment {
    pub post: Id<PostMarker>,
    pub author: Id<UserMarker>,
    pub text: CommentText,
    pub created_at: UtcDateTime,
}

bounded_string!(CommentText, InvalidCommentTextError, "comment text", max_len = 200);
