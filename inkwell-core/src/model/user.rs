use crate::model::{Id, bounded::bounded_string};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub handle: UserHandle,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct NewUser {
    pub handle: UserHandle,
}

bounded_string!(
    /// The unique public name of a user, as it appears in profile urls.
    UserHandle,
    InvalidUserHandleError,
    "user handle",
    max_len = 150,
    allowed = |c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
);
