mod bounded;

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

use crate::model::{
    comment::InvalidCommentTextError,
    group::{InvalidGroupSlugError, InvalidGroupTitleError},
    post::{InvalidImagePathError, InvalidPostTextError},
    user::InvalidUserHandleError,
};
use derive_where::derive_where;
use serde::{Deserialize, Serialize, Serializer};
use std::{fmt::Display, marker::PhantomData};
use thiserror::Error;
use time::{OffsetDateTime, UtcDateTime};

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    UserHandle(#[from] InvalidUserHandleError),
    #[error(transparent)]
    PostText(#[from] InvalidPostTextError),
    #[error(transparent)]
    ImagePath(#[from] InvalidImagePathError),
    #[error(transparent)]
    CommentText(#[from] InvalidCommentTextError),
    #[error(transparent)]
    GroupTitle(#[from] InvalidGroupTitleError),
    #[error(transparent)]
    GroupSlug(#[from] InvalidGroupSlugError),
}

/// Identifier of a stored entity, tagged with the kind of entity it refers to.
///
/// Ids are handed out by the store and grow with insertion order, which makes
/// them usable as the tie breaker between posts published at the same instant.
#[derive_where(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Debug,
    Default,
    Hash,
    Serialize,
    Deserialize
)]
#[serde(transparent)]
pub struct Id<Marker>(u64, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id, PhantomData)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> From<u64> for Id<Marker> {
    fn from(value: u64) -> Self {
        Id::new(value)
    }
}

impl<Marker> From<Id<Marker>> for u64 {
    fn from(value: Id<Marker>) -> Self {
        value.get()
    }
}

/// Serializes timestamps as RFC 3339 strings.
pub(crate) fn serialize_timestamp<S>(value: &UtcDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    time::serde::rfc3339::serialize(&OffsetDateTime::from(*value), serializer)
}
