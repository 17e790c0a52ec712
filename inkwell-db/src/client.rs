use crate::{
    MIGRATOR,
    record::{
        FollowRecord, FullCommentRecord, FullPostRecord, GroupRecord, UserRecord, to_primitive,
    },
};
use inkwell_core::{
    model::{
        Id, ModelValidationError,
        comment::{Comment, NewComment},
        follow::Follow,
        group::{Group, GroupSlug, NewGroup},
        post::{ImagePath, NewPost, Post, PostMarker, PostUpdate},
        user::{NewUser, User, UserHandle, UserMarker},
    },
    store::{EntityStore, FollowFilter, PostFilter},
};
use sqlx::{PgPool, migrate::MigrateError, query, query_as, query_scalar};
use thiserror::Error;
use tracing::debug;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("Running migrations failed: {0}")]
    Migrate(#[from] MigrateError),
}

/// Columns of a post joined with its author (`author`) and group (`grp`).
const POST_COLUMNS: &str = "
    post.post_id,
    post.text,
    post.published_at,
    post.image,
    author.user_id,
    author.handle,
    grp.group_id,
    grp.title,
    grp.slug,
    grp.description";

const POST_JOINS: &str = "
    JOIN users.users AS author ON author.user_id = post.author_id
    LEFT JOIN posts.groups AS grp ON grp.group_id = post.group_id";

const COMMENT_COLUMNS: &str = "
    comment.comment_id,
    comment.post_id,
    comment.text,
    comment.created_at,
    author.user_id,
    author.handle";

const COMMENT_JOINS: &str = "
    JOIN users.users AS author ON author.user_id = comment.author_id";

fn bind_id<Marker>(id: Id<Marker>) -> i64 {
    id.get().cast_signed()
}

#[derive(Clone, Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        debug!("Database migrations applied");
        Ok(())
    }
}

impl EntityStore for DbClient {
    type Error = DbError;

    async fn insert_user(&self, user: &NewUser) -> Result<User> {
        let record = query_as::<_, UserRecord>(
            "
            INSERT INTO users.users (handle)
            VALUES ($1)
            RETURNING users.user_id, users.handle
            ",
        )
        .bind(user.handle.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(record.try_into()?)
    }

    async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT
                users.user_id,
                users.handle
            FROM
                users.users
            WHERE
                users.user_id = $1
            ",
        )
        .bind(bind_id(user_id))
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    async fn fetch_user_by_handle(&self, handle: &UserHandle) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT
                users.user_id,
                users.handle
            FROM
                users.users
            WHERE
                users.handle = $1
            ",
        )
        .bind(handle.get())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    async fn insert_group(&self, group: &NewGroup) -> Result<Group> {
        let record = query_as::<_, GroupRecord>(
            "
            INSERT INTO posts.groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING groups.group_id, groups.title, groups.slug, groups.description
            ",
        )
        .bind(group.title.get())
        .bind(group.slug.get())
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.try_into()?)
    }

    async fn fetch_group_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>> {
        let record = query_as::<_, GroupRecord>(
            "
            SELECT
                groups.group_id,
                groups.title,
                groups.slug,
                groups.description
            FROM
                posts.groups
            WHERE
                groups.slug = $1
            ",
        )
        .bind(slug.get())
        .fetch_optional(&self.pool)
        .await?;

        let group = record.map(Group::try_from).transpose()?;
        Ok(group)
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Post> {
        let sql = format!(
            "
            WITH post AS (
                INSERT INTO posts.posts (text, published_at, author_id, group_id, image)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT {POST_COLUMNS}
            FROM post {POST_JOINS}
            "
        );
        let record = query_as::<_, FullPostRecord>(&sql)
            .bind(post.text.get())
            .bind(to_primitive(post.published_at))
            .bind(bind_id(post.author))
            .bind(post.group.map(bind_id))
            .bind(post.image.as_ref().map(ImagePath::get))
            .fetch_one(&self.pool)
            .await?;

        Ok(record.try_into()?)
    }

    async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        update: &PostUpdate,
    ) -> Result<Option<Post>> {
        let sql = format!(
            "
            WITH post AS (
                UPDATE posts.posts
                SET text = $2, group_id = $3, image = $4
                WHERE posts.post_id = $1
                RETURNING *
            )
            SELECT {POST_COLUMNS}
            FROM post {POST_JOINS}
            "
        );
        let record = query_as::<_, FullPostRecord>(&sql)
            .bind(bind_id(post_id))
            .bind(update.text.get())
            .bind(update.group.map(bind_id))
            .bind(update.image.as_ref().map(ImagePath::get))
            .fetch_optional(&self.pool)
            .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let sql = format!(
            "
            SELECT {POST_COLUMNS}
            FROM posts.posts AS post {POST_JOINS}
            WHERE post.post_id = $1
            "
        );
        let record = query_as::<_, FullPostRecord>(&sql)
            .bind(bind_id(post_id))
            .fetch_optional(&self.pool)
            .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    async fn find_posts_by(&self, filter: PostFilter) -> Result<Vec<Post>> {
        // The follow criterion is a semi-join, so authors followed by the
        // viewer are never materialized.
        let sql = format!(
            "
            SELECT {POST_COLUMNS}
            FROM posts.posts AS post {POST_JOINS}
            WHERE
                ($1::BIGINT IS NULL OR post.author_id = $1)
                AND ($2::BIGINT IS NULL OR post.group_id = $2)
                AND ($3::BIGINT IS NULL OR EXISTS (
                    SELECT 1
                    FROM posts.follows
                    WHERE follows.user_id = $3 AND follows.author_id = post.author_id
                ))
            ORDER BY post.published_at DESC, post.post_id DESC
            "
        );
        let records = query_as::<_, FullPostRecord>(&sql)
            .bind(filter.author.map(bind_id))
            .bind(filter.group.map(bind_id))
            .bind(filter.followed_by.map(bind_id))
            .fetch_all(&self.pool)
            .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        let sql = format!(
            "
            WITH comment AS (
                INSERT INTO posts.comments (post_id, author_id, text, created_at)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}
            FROM comment {COMMENT_JOINS}
            "
        );
        let record = query_as::<_, FullCommentRecord>(&sql)
            .bind(bind_id(comment.post))
            .bind(bind_id(comment.author))
            .bind(comment.text.get())
            .bind(to_primitive(comment.created_at))
            .fetch_one(&self.pool)
            .await?;

        Ok(record.try_into()?)
    }

    async fn find_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<Comment>> {
        let sql = format!(
            "
            SELECT {COMMENT_COLUMNS}
            FROM posts.comments AS comment {COMMENT_JOINS}
            WHERE comment.post_id = $1
            ORDER BY comment.created_at, comment.comment_id
            "
        );
        let records = query_as::<_, FullCommentRecord>(&sql)
            .bind(bind_id(post_id))
            .fetch_all(&self.pool)
            .await?;

        let comments = records
            .into_iter()
            .map(Comment::try_from)
            .collect::<Result<_, _>>()?;
        Ok(comments)
    }

    async fn insert_follow(&self, follow: Follow) -> Result<bool> {
        let result = query(
            "
            INSERT INTO posts.follows (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(bind_id(follow.user))
        .bind(bind_id(follow.author))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_follow(&self, follow: Follow) -> Result<bool> {
        let result = query(
            "
            DELETE FROM posts.follows
            WHERE follows.user_id = $1 AND follows.author_id = $2
            ",
        )
        .bind(bind_id(follow.user))
        .bind(bind_id(follow.author))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_follows_by(&self, filter: FollowFilter) -> Result<Vec<Follow>> {
        let records = query_as::<_, FollowRecord>(
            "
            SELECT
                follows.user_id,
                follows.author_id
            FROM
                posts.follows
            WHERE
                ($1::BIGINT IS NULL OR follows.user_id = $1)
                AND ($2::BIGINT IS NULL OR follows.author_id = $2)
            ORDER BY follows.user_id, follows.author_id
            ",
        )
        .bind(filter.user.map(bind_id))
        .bind(filter.author.map(bind_id))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Follow::from).collect())
    }

    async fn exists_follow(&self, follow: Follow) -> Result<bool> {
        let exists = query_scalar::<_, bool>(
            "
            SELECT EXISTS (
                SELECT 1
                FROM posts.follows
                WHERE follows.user_id = $1 AND follows.author_id = $2
            )
            ",
        )
        .bind(bind_id(follow.user))
        .bind(bind_id(follow.author))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_follows(&self, user: Id<UserMarker>) -> Result<u64> {
        let count = query_scalar::<_, i64>(
            "
            SELECT COUNT(*)
            FROM posts.follows
            WHERE follows.user_id = $1
            ",
        )
        .bind(bind_id(user))
        .fetch_one(&self.pool)
        .await?;

        Ok(count.cast_unsigned())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::DbClient;
    use inkwell_core::{
        model::{follow::Follow, post::NewPost, user::NewUser},
        store::{EntityStore, PostFilter},
    };
    use sqlx::PgPool;
    use time::{Duration, macros::utc_datetime};

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    #[ignore = "requires a Postgres database in DATABASE_URL"]
    async fn feed_semi_join(pool: PgPool) {
        let db = DbClient::new(pool);
        let author = db
            .insert_user(&NewUser {
                handle: "author".try_into().unwrap(),
            })
            .await
            .unwrap();
        let reader = db
            .insert_user(&NewUser {
                handle: "reader".try_into().unwrap(),
            })
            .await
            .unwrap();

        let start = utc_datetime!(2025-06-01 00:00);
        let mut published = Vec::new();
        for minute in 0..3 {
            let post = db
                .insert_post(&NewPost {
                    author: author.id,
                    text: "text".try_into().unwrap(),
                    published_at: start + Duration::minutes(minute),
                    group: None,
                    image: None,
                })
                .await
                .unwrap();
            published.push(post);
        }

        assert!(
            db.find_posts_by(PostFilter::followed_by(reader.id))
                .await
                .unwrap()
                .is_empty()
        );

        let follow = Follow::new(reader.id, author.id);
        assert!(db.insert_follow(follow).await.unwrap());
        assert!(!db.insert_follow(follow).await.unwrap());
        assert_eq!(db.count_follows(reader.id).await.unwrap(), 1);

        published.reverse();
        let feed = db
            .find_posts_by(PostFilter::followed_by(reader.id))
            .await
            .unwrap();
        assert_eq!(feed, published);

        assert!(db.delete_follow(follow).await.unwrap());
        assert!(!db.exists_follow(follow).await.unwrap());
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    #[ignore = "requires a Postgres database in DATABASE_URL"]
    async fn self_follow_violates_check(pool: PgPool) {
        let db = DbClient::new(pool);
        let user = db
            .insert_user(&NewUser {
                handle: "narcissus".try_into().unwrap(),
            })
            .await
            .unwrap();

        assert!(db.insert_follow(Follow::new(user.id, user.id)).await.is_err());
    }
}
