use crate::server::{
    Result, ServerError, ServerRouter, ServerState,
    extract::{Json, PageQuery, Query},
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use inkwell_core::{
    model::group::GroupSlug,
    service::listing::{GroupListing, Listings},
    store::EntityStore,
};
use serde::Deserialize;

pub fn routes<St: EntityStore>() -> ServerRouter<St> {
    ServerRouter::new().typed_get(get_group::<St>)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/groups/{slug}", rejection(ServerError))]
struct GetGroupPath {
    slug: GroupSlug,
}

async fn get_group<St: EntityStore>(
    GetGroupPath { slug }: GetGroupPath,
    State(state): State<ServerState<St>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<GroupListing>> {
    let listing = Listings::new(&*state.store)
        .group(&slug, query.page_number())
        .await?;

    Ok(Json(listing))
}
