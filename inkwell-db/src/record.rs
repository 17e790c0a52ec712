use inkwell_core::model::{
    ModelValidationError,
    comment::{Comment, CommentText},
    follow::Follow,
    group::{Group, GroupSlug, GroupTitle},
    post::{ImagePath, Post, PostText},
    user::{User, UserHandle},
};
use sqlx::FromRow;
use time::{PrimitiveDateTime, UtcDateTime};

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct UserRecord {
    pub user_id: i64,
    pub handle: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct GroupRecord {
    pub group_id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// A post joined with its author and, if filed under one, its group.
#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct FullPostRecord {
    pub post_id: i64,
    pub text: String,
    pub published_at: PrimitiveDateTime,
    pub image: Option<String>,
    pub user_id: i64,
    pub handle: String,
    pub group_id: Option<i64>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct FullCommentRecord {
    pub comment_id: i64,
    pub post_id: i64,
    pub text: String,
    pub created_at: PrimitiveDateTime,
    pub user_id: i64,
    pub handle: String,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct FollowRecord {
    pub user_id: i64,
    pub author_id: i64,
}

/// Timestamps are stored as UTC in `TIMESTAMP` columns.
pub(crate) fn to_primitive(value: UtcDateTime) -> PrimitiveDateTime {
    PrimitiveDateTime::new(value.date(), value.time())
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.user_id.cast_unsigned().into(),
            handle: UserHandle::new(value.handle)?,
        })
    }
}

impl TryFrom<GroupRecord> for Group {
    type Error = ModelValidationError;

    fn try_from(value: GroupRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.group_id.cast_unsigned().into(),
            title: GroupTitle::new(value.title)?,
            slug: GroupSlug::new(value.slug)?,
            description: value.description,
        })
    }
}

impl TryFrom<FullPostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: FullPostRecord) -> Result<Self, Self::Error> {
        let group = match (value.group_id, value.title, value.slug, value.description) {
            (Some(group_id), Some(title), Some(slug), Some(description)) => Some(
                GroupRecord {
                    group_id,
                    title,
                    slug,
                    description,
                }
                .try_into()?,
            ),
            _ => None,
        };

        Ok(Self {
            id: value.post_id.cast_unsigned().into(),
            author: UserRecord {
                user_id: value.user_id,
                handle: value.handle,
            }
            .try_into()?,
            text: PostText::new(value.text)?,
            published_at: value.published_at.as_utc(),
            group,
            image: value.image.map(ImagePath::new).transpose()?,
        })
    }
}

impl TryFrom<FullCommentRecord> for Comment {
    type Error = ModelValidationError;

    fn try_from(value: FullCommentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.comment_id.cast_unsigned().into(),
            post: value.post_id.cast_unsigned().into(),
            author: UserRecord {
                user_id: value.user_id,
                handle: value.handle,
            }
            .try_into()?,
            text: CommentText::new(value.text)?,
            created_at: value.created_at.as_utc(),
        })
    }
}

impl From<FollowRecord> for Follow {
    fn from(value: FollowRecord) -> Self {
        Self::new(
            value.user_id.cast_unsigned().into(),
            value.author_id.cast_unsigned().into(),
        )
    }
}
