use crate::model::{Id, bounded::bounded_string};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct GroupMarker;

/// A topical community posts can be filed under.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Group {
    pub id: Id<GroupMarker>,
    pub title: GroupTitle,
    pub slug: GroupSlug,
    pub description: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct NewGroup {
    pub title: GroupTitle,
    pub slug: GroupSlug,
    pub description: String,
}

bounded_string!(GroupTitle, InvalidGroupTitleError, "group title", max_len = 200);

bounded_string!(
    /// Stable url identifier of a group.
    GroupSlug,
    InvalidGroupSlugError,
    "group slug",
    max_len = 50,
    allowed = |c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_')
);
