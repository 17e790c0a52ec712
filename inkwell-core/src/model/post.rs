use crate::model::{
    Id,
    bounded::bounded_string,
    group::{Group, GroupMarker, GroupSlug},
    serialize_timestamp,
    user::{User, UserMarker},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub author: User,
    pub text: PostText,
    #[serde(serialize_with = "serialize_timestamp")]
    pub published_at: UtcDateTime,
    pub group: Option<Group>,
    pub image: Option<ImagePath>,
}

impl Post {
    /// Order of every post listing: newest first, later ids first on equal
    /// timestamps.
    #[must_use]
    pub fn listing_order(&self, other: &Self) -> Ordering {
        other
            .published_at
            .cmp(&self.published_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// What an author submits when publishing or editing a post.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct PostDraft {
    pub text: PostText,
    #[serde(default)]
    pub group: Option<GroupSlug>,
    #[serde(default)]
    pub image: Option<ImagePath>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct NewPost {
    pub author: Id<UserMarker>,
    pub text: PostText,
    pub published_at: UtcDateTime,
    pub group: Option<Id<GroupMarker>>,
    pub image: Option<ImagePath>,
}

/// The editable part of a post. Author and publication time never change.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct PostUpdate {
    pub text: PostText,
    pub group: Option<Id<GroupMarker>>,
    pub image: Option<ImagePath>,
}

bounded_string!(PostText, InvalidPostTextError, "post text", max_len = 600);

bounded_string!(
    /// Location of an uploaded image relative to the media root.
    ImagePath,
    InvalidImagePathError,
    "image path",
    max_len = 100
);
