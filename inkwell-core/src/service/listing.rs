//! Assembly of the paginated post listings.
//!
//! Decoration flags are computed next to the listing and never influence
//! which posts end up on a page.

use crate::{
    error::{CoreError, NotFound, Result},
    model::{
        Id,
        comment::Comment,
        group::{Group, GroupSlug},
        post::{Post, PostMarker},
        user::{User, UserHandle, UserMarker},
    },
    pagination::{PAGE_SIZE, Page, PageNumber, paginate},
    service::{feed::FeedComposer, follow::FollowManager},
    store::{EntityStore, PostFilter},
};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct IndexListing {
    pub page: Page<Post>,
    /// Whether the viewer follows anybody, i.e. has a feed worth linking to.
    pub has_any_follows: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct GroupListing {
    pub group: Group,
    pub page: Page<Post>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProfileListing {
    pub author: User,
    pub page: Page<Post>,
    pub is_following: bool,
    pub post_count: usize,
    pub followers_count: u64,
    pub following_count: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct FeedListing {
    pub page: Page<Post>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PostView {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub comment_count: usize,
    pub author_post_count: usize,
}

#[derive(Debug)]
pub struct Listings<'store, S> {
    store: &'store S,
}

impl<'store, S: EntityStore> Listings<'store, S> {
    #[must_use]
    pub fn new(store: &'store S) -> Self {
        Self { store }
    }

    fn follows(&self) -> FollowManager<'store, S> {
        FollowManager::new(self.store)
    }

    async fn posts(&self, filter: PostFilter) -> Result<Vec<Post>, S::Error> {
        self.store
            .find_posts_by(filter)
            .await
            .map_err(CoreError::Store)
    }

    async fn author(&self, handle: &UserHandle) -> Result<User, S::Error> {
        self.store
            .fetch_user_by_handle(handle)
            .await
            .map_err(CoreError::Store)?
            .ok_or_else(|| NotFound::UserByHandle(handle.clone()).into())
    }

    /// Every post on the platform.
    pub async fn index(
        &self,
        viewer: Option<Id<UserMarker>>,
        page: PageNumber,
    ) -> Result<IndexListing, S::Error> {
        let posts = self.posts(PostFilter::all()).await?;

        let has_any_follows = match viewer {
            Some(viewer) => self.follows().following_count(viewer).await? > 0,
            None => false,
        };

        Ok(IndexListing {
            page: paginate(posts, PAGE_SIZE, page),
            has_any_follows,
        })
    }

    pub async fn group(&self, slug: &GroupSlug, page: PageNumber) -> Result<GroupListing, S::Error> {
        let group = self
            .store
            .fetch_group_by_slug(slug)
            .await
            .map_err(CoreError::Store)?
            .ok_or_else(|| NotFound::GroupBySlug(slug.clone()))?;
        let posts = self.posts(PostFilter::in_group(group.id)).await?;

        Ok(GroupListing {
            group,
            page: paginate(posts, PAGE_SIZE, page),
        })
    }

    pub async fn profile(
        &self,
        viewer: Option<Id<UserMarker>>,
        handle: &UserHandle,
        page: PageNumber,
    ) -> Result<ProfileListing, S::Error> {
        let author = self.author(handle).await?;
        let posts = self.posts(PostFilter::by_author(author.id)).await?;
        let follows = self.follows();

        let is_following = match viewer {
            Some(viewer) if viewer != author.id => follows.is_following(viewer, author.id).await?,
            _ => false,
        };
        let followers_count = follows.followers_count(author.id).await?;
        let following_count = follows.following_count(author.id).await?;

        Ok(ProfileListing {
            post_count: posts.len(),
            page: paginate(posts, PAGE_SIZE, page),
            author,
            is_following,
            followers_count,
            following_count,
        })
    }

    /// Posts of the authors `viewer` follows.
    pub async fn feed(
        &self,
        viewer: Id<UserMarker>,
        page: PageNumber,
    ) -> Result<FeedListing, S::Error> {
        let posts = FeedComposer::new(self.store).compose_feed(viewer).await?;

        Ok(FeedListing {
            page: paginate(posts, PAGE_SIZE, page),
        })
    }

    /// A single post with its comments. The post must be authored by `handle`.
    pub async fn post_view(
        &self,
        handle: &UserHandle,
        post_id: Id<PostMarker>,
    ) -> Result<PostView, S::Error> {
        let author = self.author(handle).await?;
        let post = self
            .store
            .fetch_post(post_id)
            .await
            .map_err(CoreError::Store)?
            .filter(|post| post.author.id == author.id)
            .ok_or(NotFound::PostById(post_id))?;

        let comments = self
            .store
            .find_comments(post_id)
            .await
            .map_err(CoreError::Store)?;
        let author_post_count = self.posts(PostFilter::by_author(author.id)).await?.len();

        Ok(PostView {
            post,
            comment_count: comments.len(),
            comments,
            author_post_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::{CoreError, NotFound},
        model::{comment::NewComment, post::Post},
        pagination::PageNumber,
        service::{
            fixtures::{Fixture, START, ids},
            follow::FollowManager,
            listing::Listings,
        },
        store::EntityStore,
    };
    use assert_matches::assert_matches;
    use time::Duration;

    fn page(number: usize) -> PageNumber {
        PageNumber::new(number).unwrap()
    }

    #[tokio::test]
    async fn index_paginates_all_posts() {
        let fixture = Fixture::new();
        let author = fixture.user("author").await;
        let mut posts = Vec::new();
        for minute in 0..25 {
            posts.push(fixture.post(&author, minute).await);
        }
        posts.sort_by(Post::listing_order);

        let listings = Listings::new(&fixture.store);
        let third = listings.index(None, page(3)).await.unwrap().page;

        assert_eq!(ids(third.items()), ids(&posts[20..]));
        assert_eq!(third.total_pages(), 3);
        assert!(!third.has_next());

        let beyond = listings.index(None, page(9)).await.unwrap().page;
        assert_eq!(beyond, third);

        let first = listings.index(None, PageNumber::parse(Some("0"))).await.unwrap().page;
        assert_eq!(ids(first.items()), ids(&posts[..10]));
    }

    #[tokio::test]
    async fn index_reports_whether_viewer_follows_anybody() {
        let fixture = Fixture::new();
        let author = fixture.user("author").await;
        let reader = fixture.user("reader").await;
        fixture.post(&author, 1).await;
        let listings = Listings::new(&fixture.store);

        assert!(!listings.index(None, page(1)).await.unwrap().has_any_follows);
        assert!(!listings.index(Some(reader.id), page(1)).await.unwrap().has_any_follows);

        FollowManager::new(&fixture.store)
            .follow(reader.id, author.id)
            .await
            .unwrap();

        let listing = listings.index(Some(reader.id), page(1)).await.unwrap();
        assert!(listing.has_any_follows);
        assert_eq!(listing.page.total_items(), 1);
    }

    #[tokio::test]
    async fn group_listing_holds_only_group_posts() {
        let fixture = Fixture::new();
        let author = fixture.user("author").await;
        let cats = fixture.group("cats").await;
        let dogs = fixture.group("dogs").await;
        let cat_post = fixture.post_in(&author, Some(&cats), 1).await;
        fixture.post_in(&author, Some(&dogs), 2).await;
        fixture.post(&author, 3).await;

        let listing = Listings::new(&fixture.store)
            .group(&cats.slug, page(1))
            .await
            .unwrap();

        assert_eq!(listing.group, cats);
        assert_eq!(listing.page.items(), [cat_post]);
    }

    #[tokio::test]
    async fn unknown_group_is_not_found() {
        let fixture = Fixture::new();
        let slug = "missing".try_into().unwrap();

        assert_matches!(
            Listings::new(&fixture.store).group(&slug, page(1)).await,
            Err(CoreError::NotFound(NotFound::GroupBySlug(missing))) if missing == slug
        );
    }

    #[tokio::test]
    async fn profile_decorations() {
        let fixture = Fixture::new();
        let author = fixture.user("author").await;
        let reader = fixture.user("reader").await;
        let other = fixture.user("other").await;
        for minute in 0..12 {
            fixture.post(&author, minute).await;
        }
        fixture.post(&reader, 20).await;
        let follows = FollowManager::new(&fixture.store);
        follows.follow(reader.id, author.id).await.unwrap();
        follows.follow(author.id, other.id).await.unwrap();
        let listings = Listings::new(&fixture.store);

        let seen_by_reader = listings
            .profile(Some(reader.id), &author.handle, page(2))
            .await
            .unwrap();
        assert_eq!(seen_by_reader.author, author);
        assert!(seen_by_reader.is_following);
        assert_eq!(seen_by_reader.post_count, 12);
        assert_eq!(seen_by_reader.followers_count, 1);
        assert_eq!(seen_by_reader.following_count, 1);
        assert_eq!(seen_by_reader.page.items().len(), 2);
        assert!(
            seen_by_reader
                .page
                .items()
                .iter()
                .all(|post| post.author.id == author.id)
        );

        let seen_by_other = listings
            .profile(Some(other.id), &author.handle, page(1))
            .await
            .unwrap();
        assert!(!seen_by_other.is_following);

        let seen_by_self = listings
            .profile(Some(author.id), &author.handle, page(1))
            .await
            .unwrap();
        assert!(!seen_by_self.is_following);

        let anonymous = listings.profile(None, &author.handle, page(1)).await.unwrap();
        assert!(!anonymous.is_following);
        assert_eq!(ids(anonymous.page.items()), ids(seen_by_self.page.items()));
    }

    #[tokio::test]
    async fn unknown_profile_is_not_found() {
        let fixture = Fixture::new();
        let handle = "nobody".try_into().unwrap();

        assert_matches!(
            Listings::new(&fixture.store).profile(None, &handle, page(1)).await,
            Err(CoreError::NotFound(NotFound::UserByHandle(_)))
        );
    }

    #[tokio::test]
    async fn feed_listing_paginates_feed() {
        let fixture = Fixture::new();
        let author = fixture.user("author").await;
        let reader = fixture.user("reader").await;
        for minute in 0..11 {
            fixture.post(&author, minute).await;
        }
        let listings = Listings::new(&fixture.store);

        let empty = listings.feed(reader.id, page(1)).await.unwrap().page;
        assert!(empty.items().is_empty());
        assert_eq!(empty.total_pages(), 1);

        FollowManager::new(&fixture.store)
            .follow(reader.id, author.id)
            .await
            .unwrap();

        let second = listings.feed(reader.id, page(2)).await.unwrap().page;
        assert_eq!(second.items().len(), 1);
        assert_eq!(second.items()[0].published_at, START);
        assert!(second.has_previous());
    }

    #[tokio::test]
    async fn post_view_lists_comments_oldest_first() {
        let fixture = Fixture::new();
        let author = fixture.user("author").await;
        let reader = fixture.user("reader").await;
        let post = fixture.post(&author, 1).await;
        fixture.post(&author, 2).await;

        for (minute, text) in [(10, "second"), (5, "first")] {
            fixture
                .store
                .insert_comment(&NewComment {
                    post: post.id,
                    author: reader.id,
                    text: text.try_into().unwrap(),
                    created_at: START + Duration::minutes(minute),
                })
                .await
                .unwrap();
        }

        let view = Listings::new(&fixture.store)
            .post_view(&author.handle, post.id)
            .await
            .unwrap();

        assert_eq!(view.post, post);
        assert_eq!(view.comment_count, 2);
        assert_eq!(view.author_post_count, 2);
        let texts: Vec<&str> = view.comments.iter().map(|comment| comment.text.get()).collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[tokio::test]
    async fn post_view_requires_matching_author() {
        let fixture = Fixture::new();
        let author = fixture.user("author").await;
        let impostor = fixture.user("impostor").await;
        let post = fixture.post(&author, 1).await;
        let listings = Listings::new(&fixture.store);

        assert_matches!(
            listings.post_view(&impostor.handle, post.id).await,
            Err(CoreError::NotFound(NotFound::PostById(id))) if id == post.id
        );
        assert_matches!(
            listings.post_view(&author.handle, 999.into()).await,
            Err(CoreError::NotFound(NotFound::PostById(_)))
        );
    }
}
