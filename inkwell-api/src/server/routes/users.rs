use crate::server::{
    Result, ServerError, ServerRouter, ServerState,
    extract::{Json, PageQuery, Query, Viewer},
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use inkwell_core::{
    error::{CoreError, NotFound},
    model::user::{User, UserHandle},
    service::{
        follow::FollowManager,
        listing::{Listings, ProfileListing},
    },
    store::EntityStore,
};
use serde::{Deserialize, Serialize};

pub fn routes<St: EntityStore>() -> ServerRouter<St> {
    ServerRouter::new()
        .typed_get(get_profile::<St>)
        .typed_post(follow::<St>)
        .typed_post(unfollow::<St>)
}

async fn find_user<St: EntityStore>(store: &St, handle: UserHandle) -> Result<User> {
    store
        .fetch_user_by_handle(&handle)
        .await
        .map_err(ServerError::store)?
        .ok_or_else(|| NotFound::UserByHandle(handle).into())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{handle}", rejection(ServerError))]
struct GetProfilePath {
    handle: UserHandle,
}

async fn get_profile<St: EntityStore>(
    GetProfilePath { handle }: GetProfilePath,
    State(state): State<ServerState<St>>,
    viewer: Option<Viewer>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ProfileListing>> {
    let listing = Listings::new(&*state.store)
        .profile(
            viewer.map(|viewer| viewer.id()),
            &handle,
            query.page_number(),
        )
        .await?;

    Ok(Json(listing))
}

/// Follow state between the viewer and an author after a follow or unfollow.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
struct FollowState {
    follower: User,
    author: User,
    following: bool,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{handle}/follow", rejection(ServerError))]
struct FollowPath {
    handle: UserHandle,
}

/// Following an author twice is reported as success; the follow exists either way.
async fn follow<St: EntityStore>(
    FollowPath { handle }: FollowPath,
    State(state): State<ServerState<St>>,
    viewer: Viewer,
) -> Result<Json<FollowState>> {
    let author = find_user(&*state.store, handle).await?;

    match FollowManager::new(&*state.store)
        .follow(viewer.id(), author.id)
        .await
    {
        Ok(()) | Err(CoreError::AlreadyFollowing { .. }) => {}
        Err(err) => return Err(err.into()),
    }

    Ok(Json(FollowState {
        follower: viewer.user().clone(),
        author,
        following: true,
    }))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{handle}/unfollow", rejection(ServerError))]
struct UnfollowPath {
    handle: UserHandle,
}

async fn unfollow<St: EntityStore>(
    UnfollowPath { handle }: UnfollowPath,
    State(state): State<ServerState<St>>,
    viewer: Viewer,
) -> Result<Json<FollowState>> {
    let author = find_user(&*state.store, handle).await?;

    FollowManager::new(&*state.store)
        .unfollow(viewer.id(), author.id)
        .await?;

    Ok(Json(FollowState {
        follower: viewer.user().clone(),
        author,
        following: false,
    }))
}
