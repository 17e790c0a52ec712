use crate::{
    error::{CoreError, NotFound, Result},
    model::{
        Id,
        comment::{Comment, CommentText, NewComment},
        group::{GroupMarker, GroupSlug},
        post::{NewPost, Post, PostDraft, PostMarker, PostUpdate},
        user::UserMarker,
    },
    store::EntityStore,
};
use time::UtcDateTime;
use tracing::info;

/// Creation and editing of posts and comments.
#[derive(Debug)]
pub struct Publisher<'store, S> {
    store: &'store S,
}

impl<'store, S: EntityStore> Publisher<'store, S> {
    #[must_use]
    pub fn new(store: &'store S) -> Self {
        Self { store }
    }

    async fn resolve_group(
        &self,
        slug: Option<&GroupSlug>,
    ) -> Result<Option<Id<GroupMarker>>, S::Error> {
        let Some(slug) = slug else {
            return Ok(None);
        };

        let group = self
            .store
            .fetch_group_by_slug(slug)
            .await
            .map_err(CoreError::Store)?
            .ok_or_else(|| NotFound::GroupBySlug(slug.clone()))?;
        Ok(Some(group.id))
    }

    /// Publishes a new post by `author`, stamped with the current time.
    pub async fn publish_post(
        &self,
        author: Id<UserMarker>,
        draft: PostDraft,
    ) -> Result<Post, S::Error> {
        let group = self.resolve_group(draft.group.as_ref()).await?;

        let post = self
            .store
            .insert_post(&NewPost {
                author,
                text: draft.text,
                published_at: UtcDateTime::now(),
                group,
                image: draft.image,
            })
            .await
            .map_err(CoreError::Store)?;

        info!(%author, post = %post.id, "Published post");
        Ok(post)
    }

    /// Replaces text, group and image of a post. Only its author may do so.
    pub async fn edit_post(
        &self,
        editor: Id<UserMarker>,
        post_id: Id<PostMarker>,
        draft: PostDraft,
    ) -> Result<Post, S::Error> {
        let post = self
            .store
            .fetch_post(post_id)
            .await
            .map_err(CoreError::Store)?
            .ok_or(NotFound::PostById(post_id))?;
        if post.author.id != editor {
            return Err(CoreError::NotAuthor {
                editor,
                post: post_id,
            });
        }

        let update = PostUpdate {
            text: draft.text,
            group: self.resolve_group(draft.group.as_ref()).await?,
            image: draft.image,
        };
        let post = self
            .store
            .update_post(post_id, &update)
            .await
            .map_err(CoreError::Store)?
            .ok_or(NotFound::PostById(post_id))?;

        info!(%editor, post = %post_id, "Edited post");
        Ok(post)
    }

    pub async fn add_comment(
        &self,
        author: Id<UserMarker>,
        post_id: Id<PostMarker>,
        text: CommentText,
    ) -> Result<Comment, S::Error> {
        let exists = self
            .store
            .fetch_post(post_id)
            .await
            .map_err(CoreError::Store)?
            .is_some();
        if !exists {
            return Err(NotFound::PostById(post_id).into());
        }

        let comment = self
            .store
            .insert_comment(&NewComment {
                post: post_id,
                author,
                text,
                created_at: UtcDateTime::now(),
            })
            .await
            .map_err(CoreError::Store)?;

        info!(%author, post = %post_id, comment = %comment.id, "Added comment");
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::{CoreError, NotFound},
        model::post::PostDraft,
        service::{fixtures::Fixture, publish::Publisher},
        store::EntityStore,
    };
    use assert_matches::assert_matches;

    fn draft(text: &str, group: Option<&str>) -> PostDraft {
        PostDraft {
            text: text.try_into().unwrap(),
            group: group.map(|slug| slug.try_into().unwrap()),
            image: None,
        }
    }

    #[tokio::test]
    async fn publish_files_post_under_group() {
        let fixture = Fixture::new();
        let author = fixture.user("author").await;
        let cats = fixture.group("cats").await;

        let post = Publisher::new(&fixture.store)
            .publish_post(author.id, draft("Meow", Some("cats")))
            .await
            .unwrap();

        assert_eq!(post.author, author);
        assert_eq!(post.group, Some(cats));
        assert_eq!(post.text.get(), "Meow");
        assert_eq!(fixture.store.fetch_post(post.id).await.unwrap(), Some(post));
    }

    #[tokio::test]
    async fn publish_into_unknown_group_fails() {
        let fixture = Fixture::new();
        let author = fixture.user("author").await;

        assert_matches!(
            Publisher::new(&fixture.store)
                .publish_post(author.id, draft("Meow", Some("cats")))
                .await,
            Err(CoreError::NotFound(NotFound::GroupBySlug(_)))
        );
    }

    #[tokio::test]
    async fn only_author_edits() {
        let fixture = Fixture::new();
        let author = fixture.user("author").await;
        let intruder = fixture.user("intruder").await;
        let original = fixture.post(&author, 1).await;
        let publisher = Publisher::new(&fixture.store);

        assert_matches!(
            publisher
                .edit_post(intruder.id, original.id, draft("Hijacked", None))
                .await,
            Err(CoreError::NotAuthor { editor, post }) if editor == intruder.id && post == original.id
        );

        let edited = publisher
            .edit_post(author.id, original.id, draft("Revised", None))
            .await
            .unwrap();
        assert_eq!(edited.text.get(), "Revised");
        assert_eq!(edited.published_at, original.published_at);
        assert_eq!(edited.id, original.id);
    }

    #[tokio::test]
    async fn editing_missing_post_is_not_found() {
        let fixture = Fixture::new();
        let author = fixture.user("author").await;

        assert_matches!(
            Publisher::new(&fixture.store)
                .edit_post(author.id, 77.into(), draft("Revised", None))
                .await,
            Err(CoreError::NotFound(NotFound::PostById(_)))
        );
    }

    #[tokio::test]
    async fn comments_attach_to_existing_posts() {
        let fixture = Fixture::new();
        let author = fixture.user("author").await;
        let reader = fixture.user("reader").await;
        let post = fixture.post(&author, 1).await;
        let publisher = Publisher::new(&fixture.store);

        let comment = publisher
            .add_comment(reader.id, post.id, "Nice".try_into().unwrap())
            .await
            .unwrap();
        assert_eq!(comment.post, post.id);
        assert_eq!(comment.author, reader);
        assert_eq!(fixture.store.find_comments(post.id).await.unwrap(), [comment]);

        assert_matches!(
            publisher
                .add_comment(reader.id, 77.into(), "Nice".try_into().unwrap())
                .await,
            Err(CoreError::NotFound(NotFound::PostById(_)))
        );
    }
}
