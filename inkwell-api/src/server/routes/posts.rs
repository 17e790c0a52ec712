use crate::server::{
    Result, ServerError, ServerRouter, ServerState,
    extract::{Json, PageQuery, Query, Viewer},
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use inkwell_core::{
    error::NotFound,
    model::{
        Id,
        comment::{Comment, CommentText},
        post::{Post, PostDraft, PostMarker},
        user::UserHandle,
    },
    service::{
        listing::{IndexListing, Listings, PostView},
        publish::Publisher,
    },
    store::EntityStore,
};
use serde::Deserialize;

pub fn routes<St: EntityStore>() -> ServerRouter<St> {
    ServerRouter::new()
        .typed_get(get_index::<St>)
        .typed_post(create_post::<St>)
        .typed_get(get_post::<St>)
        .typed_post(edit_post::<St>)
        .typed_post(create_comment::<St>)
}

/// Fetches a post, insisting that `handle` wrote it.
async fn authored_post<St: EntityStore>(
    store: &St,
    handle: &UserHandle,
    id: Id<PostMarker>,
) -> Result<Post> {
    store
        .fetch_post(id)
        .await
        .map_err(ServerError::store)?
        .filter(|post| &post.author.handle == handle)
        .ok_or(ServerError::NotFound(NotFound::PostById(id)))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts", rejection(ServerError))]
struct PostsPath();

async fn get_index<St: EntityStore>(
    PostsPath(): PostsPath,
    State(state): State<ServerState<St>>,
    viewer: Option<Viewer>,
    Query(query): Query<PageQuery>,
) -> Result<Json<IndexListing>> {
    let listing = Listings::new(&*state.store)
        .index(viewer.map(|viewer| viewer.id()), query.page_number())
        .await?;

    Ok(Json(listing))
}

async fn create_post<St: EntityStore>(
    PostsPath(): PostsPath,
    State(state): State<ServerState<St>>,
    viewer: Viewer,
    Json(draft): Json<PostDraft>,
) -> Result<(StatusCode, Json<Post>)> {
    let post = Publisher::new(&*state.store)
        .publish_post(viewer.id(), draft)
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{handle}/posts/{id}", rejection(ServerError))]
struct GetPostPath {
    handle: UserHandle,
    id: Id<PostMarker>,
}

async fn get_post<St: EntityStore>(
    GetPostPath { handle, id }: GetPostPath,
    State(state): State<ServerState<St>>,
) -> Result<Json<PostView>> {
    let view = Listings::new(&*state.store).post_view(&handle, id).await?;

    Ok(Json(view))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{handle}/posts/{id}/edit", rejection(ServerError))]
struct EditPostPath {
    handle: UserHandle,
    id: Id<PostMarker>,
}

async fn edit_post<St: EntityStore>(
    EditPostPath { handle, id }: EditPostPath,
    State(state): State<ServerState<St>>,
    viewer: Viewer,
    Json(draft): Json<PostDraft>,
) -> Result<Json<Post>> {
    authored_post(&*state.store, &handle, id).await?;

    let post = Publisher::new(&*state.store)
        .edit_post(viewer.id(), id, draft)
        .await?;

    Ok(Json(post))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{handle}/posts/{id}/comments", rejection(ServerError))]
struct CreateCommentPath {
    handle: UserHandle,
    id: Id<PostMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct CommentDraft {
    text: CommentText,
}

async fn create_comment<St: EntityStore>(
    CreateCommentPath { handle, id }: CreateCommentPath,
    State(state): State<ServerState<St>>,
    viewer: Viewer,
    Json(draft): Json<CommentDraft>,
) -> Result<(StatusCode, Json<Comment>)> {
    authored_post(&*state.store, &handle, id).await?;

    let comment = Publisher::new(&*state.store)
        .add_comment(viewer.id(), id, draft.text)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}
