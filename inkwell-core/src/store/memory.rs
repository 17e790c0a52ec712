//! An [`EntityStore`] kept entirely in process memory.
//!
//! Rows reference each other by id and are joined on read, the way the
//! relational store does it, so both stores hand out identical entities.

use crate::{
    model::{
        Id,
        comment::{Comment, CommentMarker, CommentText, NewComment},
        follow::Follow,
        group::{Group, GroupMarker, GroupSlug, NewGroup},
        post::{ImagePath, NewPost, Post, PostMarker, PostText, PostUpdate},
        user::{NewUser, User, UserHandle, UserMarker},
    },
    store::{EntityStore, FollowFilter, PostFilter},
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Mutex, MutexGuard, PoisonError},
};
use thiserror::Error;
use time::UtcDateTime;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum MemoryStoreError {
    #[error("A user with handle {0} already exists")]
    DuplicateHandle(UserHandle),
    #[error("A group with slug {0} already exists")]
    DuplicateSlug(GroupSlug),
    #[error("Referenced user {0} does not exist")]
    UnknownUser(Id<UserMarker>),
    #[error("Referenced group {0} does not exist")]
    UnknownGroup(Id<GroupMarker>),
    #[error("Referenced post {0} does not exist")]
    UnknownPost(Id<PostMarker>),
}

type Result<T, E = MemoryStoreError> = std::result::Result<T, E>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    last_id: u64,
    users: BTreeMap<Id<UserMarker>, User>,
    groups: BTreeMap<Id<GroupMarker>, Group>,
    posts: BTreeMap<Id<PostMarker>, PostRow>,
    comments: BTreeMap<Id<CommentMarker>, CommentRow>,
    follows: BTreeSet<Follow>,
}

#[derive(Clone, Debug)]
struct PostRow {
    author: Id<UserMarker>,
    text: PostText,
    published_at: UtcDateTime,
    group: Option<Id<GroupMarker>>,
    image: Option<ImagePath>,
}

#[derive(Clone, Debug)]
struct CommentRow {
    post: Id<PostMarker>,
    author: Id<UserMarker>,
    text: CommentText,
    created_at: UtcDateTime,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Every mutation completes before the guard drops, so a poisoned lock
        // still protects consistent tables.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Tables {
    fn next_id<Marker>(&mut self) -> Id<Marker> {
        self.last_id += 1;
        Id::new(self.last_id)
    }

    fn user(&self, user_id: Id<UserMarker>) -> Result<&User> {
        self.users
            .get(&user_id)
            .ok_or(MemoryStoreError::UnknownUser(user_id))
    }

    fn check_group(&self, group: Option<Id<GroupMarker>>) -> Result<()> {
        match group {
            Some(group_id) if !self.groups.contains_key(&group_id) => {
                Err(MemoryStoreError::UnknownGroup(group_id))
            }
            _ => Ok(()),
        }
    }

    fn join_post(&self, post_id: Id<PostMarker>, row: &PostRow) -> Result<Post> {
        let group = row
            .group
            .map(|group_id| {
                self.groups
                    .get(&group_id)
                    .cloned()
                    .ok_or(MemoryStoreError::UnknownGroup(group_id))
            })
            .transpose()?;

        Ok(Post {
            id: post_id,
            author: self.user(row.author)?.clone(),
            text: row.text.clone(),
            published_at: row.published_at,
            group,
            image: row.image.clone(),
        })
    }

    fn join_comment(&self, comment_id: Id<CommentMarker>, row: &CommentRow) -> Result<Comment> {
        Ok(Comment {
            id: comment_id,
            post: row.post,
            author: self.user(row.author)?.clone(),
            text: row.text.clone(),
            created_at: row.created_at,
        })
    }

    fn matches(&self, filter: PostFilter, row: &PostRow) -> bool {
        filter.author.is_none_or(|author| row.author == author)
            && filter.group.is_none_or(|group| row.group == Some(group))
            && filter
                .followed_by
                .is_none_or(|user| self.follows.contains(&Follow::new(user, row.author)))
    }
}

impl EntityStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn insert_user(&self, user: &NewUser) -> Result<User> {
        let mut tables = self.tables();
        if tables.users.values().any(|known| known.handle == user.handle) {
            return Err(MemoryStoreError::DuplicateHandle(user.handle.clone()));
        }

        let user = User {
            id: tables.next_id(),
            handle: user.handle.clone(),
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        Ok(self.tables().users.get(&user_id).cloned())
    }

    async fn fetch_user_by_handle(&self, handle: &UserHandle) -> Result<Option<User>> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|user| &user.handle == handle)
            .cloned())
    }

    async fn insert_group(&self, group: &NewGroup) -> Result<Group> {
        let mut tables = self.tables();
        if tables.groups.values().any(|known| known.slug == group.slug) {
            return Err(MemoryStoreError::DuplicateSlug(group.slug.clone()));
        }

        let group = Group {
            id: tables.next_id(),
            title: group.title.clone(),
            slug: group.slug.clone(),
            description: group.description.clone(),
        };
        tables.groups.insert(group.id, group.clone());

        Ok(group)
    }

    async fn fetch_group_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>> {
        Ok(self
            .tables()
            .groups
            .values()
            .find(|group| &group.slug == slug)
            .cloned())
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Post> {
        let mut tables = self.tables();
        tables.user(post.author)?;
        tables.check_group(post.group)?;

        let post_id = tables.next_id();
        let row = PostRow {
            author: post.author,
            text: post.text.clone(),
            published_at: post.published_at,
            group: post.group,
            image: post.image.clone(),
        };
        let post = tables.join_post(post_id, &row)?;
        tables.posts.insert(post_id, row);

        Ok(post)
    }

    async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        update: &PostUpdate,
    ) -> Result<Option<Post>> {
        let mut tables = self.tables();
        tables.check_group(update.group)?;

        let Some(row) = tables.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        row.text = update.text.clone();
        row.group = update.group;
        row.image = update.image.clone();

        let row = row.clone();
        tables.join_post(post_id, &row).map(Some)
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let tables = self.tables();
        tables
            .posts
            .get(&post_id)
            .map(|row| tables.join_post(post_id, row))
            .transpose()
    }

    async fn find_posts_by(&self, filter: PostFilter) -> Result<Vec<Post>> {
        let tables = self.tables();
        let mut posts = tables
            .posts
            .iter()
            .filter(|(_, row)| tables.matches(filter, row))
            .map(|(&post_id, row)| tables.join_post(post_id, row))
            .collect::<Result<Vec<_>>>()?;
        posts.sort_by(Post::listing_order);

        Ok(posts)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        let mut tables = self.tables();
        tables.user(comment.author)?;
        if !tables.posts.contains_key(&comment.post) {
            return Err(MemoryStoreError::UnknownPost(comment.post));
        }

        let comment_id = tables.next_id();
        let row = CommentRow {
            post: comment.post,
            author: comment.author,
            text: comment.text.clone(),
            created_at: comment.created_at,
        };
        let comment = tables.join_comment(comment_id, &row)?;
        tables.comments.insert(comment_id, row);

        Ok(comment)
    }

    async fn find_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<Comment>> {
        let tables = self.tables();
        let mut comments = tables
            .comments
            .iter()
            .filter(|(_, row)| row.post == post_id)
            .map(|(&comment_id, row)| tables.join_comment(comment_id, row))
            .collect::<Result<Vec<_>>>()?;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(comments)
    }

    async fn insert_follow(&self, follow: Follow) -> Result<bool> {
        let mut tables = self.tables();
        tables.user(follow.user)?;
        tables.user(follow.author)?;

        Ok(tables.follows.insert(follow))
    }

    async fn delete_follow(&self, follow: Follow) -> Result<bool> {
        Ok(self.tables().follows.remove(&follow))
    }

    async fn find_follows_by(&self, filter: FollowFilter) -> Result<Vec<Follow>> {
        Ok(self
            .tables()
            .follows
            .iter()
            .filter(|follow| filter.user.is_none_or(|user| follow.user == user))
            .filter(|follow| filter.author.is_none_or(|author| follow.author == author))
            .copied()
            .collect())
    }

    async fn exists_follow(&self, follow: Follow) -> Result<bool> {
        Ok(self.tables().follows.contains(&follow))
    }

    async fn count_follows(&self, user: Id<UserMarker>) -> Result<u64> {
        let count = self
            .tables()
            .follows
            .iter()
            .filter(|follow| follow.user == user)
            .count();

        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}
