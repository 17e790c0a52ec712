use crate::{
    model::{
        group::{Group, NewGroup},
        post::{NewPost, Post},
        user::{NewUser, User},
    },
    store::{EntityStore, memory::MemoryStore},
};
use time::{Duration, UtcDateTime, macros::utc_datetime};

pub(crate) const START: UtcDateTime = utc_datetime!(2025-06-01 00:00);

/// A fresh in-memory store with helpers for seeding it.
pub(crate) struct Fixture {
    pub store: MemoryStore,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
        }
    }

    pub async fn user(&self, handle: &str) -> User {
        self.store
            .insert_user(&NewUser {
                handle: handle.try_into().unwrap(),
            })
            .await
            .unwrap()
    }

    pub async fn group(&self, slug: &str) -> Group {
        self.store
            .insert_group(&NewGroup {
                title: slug.try_into().unwrap(),
                slug: slug.try_into().unwrap(),
                description: format!("All about {slug}"),
            })
            .await
            .unwrap()
    }

    /// Publishes a post `minute` minutes after [`START`].
    pub async fn post(&self, author: &User, minute: i64) -> Post {
        self.post_in(author, None, minute).await
    }

    pub async fn post_in(&self, author: &User, group: Option<&Group>, minute: i64) -> Post {
        self.store
            .insert_post(&NewPost {
                author: author.id,
                text: format!("{} at minute {minute}", author.handle)
                    .try_into()
                    .unwrap(),
                published_at: START + Duration::minutes(minute),
                group: group.map(|group| group.id),
                image: None,
            })
            .await
            .unwrap()
    }
}

pub(crate) fn ids(posts: &[Post]) -> Vec<u64> {
    posts.iter().map(|post| post.id.get()).collect()
}
