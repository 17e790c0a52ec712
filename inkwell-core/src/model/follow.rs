use crate::model::{Id, user::UserMarker};
use serde::{Deserialize, Serialize};

/// `user` follows `author`. The pair is the whole identity of a follow.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Deserialize, Serialize,
)]
pub struct Follow {
    pub user: Id<UserMarker>,
    pub author: Id<UserMarker>,
}

impl Follow {
    #[must_use]
    pub fn new(user: Id<UserMarker>, author: Id<UserMarker>) -> Self {
        Self { user, author }
    }

    #[must_use]
    pub fn is_self_follow(self) -> bool {
        self.user == self.author
    }
}
