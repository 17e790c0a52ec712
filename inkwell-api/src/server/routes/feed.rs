use crate::server::{
    Result, ServerError, ServerRouter, ServerState,
    extract::{Json, PageQuery, Query, Viewer},
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use inkwell_core::{
    service::listing::{FeedListing, Listings},
    store::EntityStore,
};
use serde::Deserialize;

pub fn routes<St: EntityStore>() -> ServerRouter<St> {
    ServerRouter::new().typed_get(get_feed::<St>)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/feed", rejection(ServerError))]
struct GetFeedPath();

async fn get_feed<St: EntityStore>(
    GetFeedPath(): GetFeedPath,
    State(state): State<ServerState<St>>,
    viewer: Viewer,
    Query(query): Query<PageQuery>,
) -> Result<Json<FeedListing>> {
    let listing = Listings::new(&*state.store)
        .feed(viewer.id(), query.page_number())
        .await?;

    Ok(Json(listing))
}
