use crate::server::{ServerError, ServerState};
use axum::{
    Json as AxumJson,
    extract::{
        FromRequest, FromRequestParts, OptionalFromRequestParts, Query as AxumQuery,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use headers::{ContentType, Header, HeaderMapExt, HeaderName, HeaderValue};
use inkwell_core::{
    model::{
        Id,
        user::{User, UserMarker},
    },
    pagination::PageNumber,
    store::EntityStore,
};
use serde::{Deserialize, Serialize};
use std::iter;

#[derive(FromRequest, Debug, Clone, Copy, Default)]
#[from_request(via(AxumJson), rejection(ServerError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(json) => (TypedHeader(ContentType::json()), json).into_response(),
            Err(err) => ServerError::JsonResponse(err).into_response(),
        }
    }
}

#[derive(FromRequestParts, Debug, Clone, Copy, Default)]
#[from_request(via(AxumQuery), rejection(ServerError))]
pub struct Query<T>(pub T);

/// The `?page=` parameter of the listings. Any value is accepted.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    #[must_use]
    pub fn page_number(&self) -> PageNumber {
        PageNumber::parse(self.page.as_deref())
    }
}

static VIEWER_ID: HeaderName = HeaderName::from_static("x-viewer-id");

/// `X-Viewer-Id`: the user the authenticating gateway vouches for.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct XViewerId(pub Id<UserMarker>);

impl Header for XViewerId {
    fn name() -> &'static HeaderName {
        &VIEWER_ID
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        values
            .next()
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(|id| Self(id.into()))
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        values.extend(iter::once(HeaderValue::from(self.0.get())));
    }
}

/// The user on whose behalf a request is made.
///
/// Extracting `Viewer` rejects anonymous requests; `Option<Viewer>` accepts
/// them. A header naming an unknown user is rejected either way.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Viewer {
    user: User,
}

impl Viewer {
    #[must_use]
    pub fn id(&self) -> Id<UserMarker> {
        self.user.id
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }
}

impl<St: EntityStore> OptionalFromRequestParts<ServerState<St>> for Viewer {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState<St>,
    ) -> Result<Option<Self>, Self::Rejection> {
        let Some(XViewerId(viewer_id)) = parts
            .headers
            .typed_try_get::<XViewerId>()
            .map_err(ServerError::InvalidViewerHeader)?
        else {
            return Ok(None);
        };

        let user = state
            .store
            .fetch_user(viewer_id)
            .await
            .map_err(ServerError::store)?
            .ok_or(ServerError::UnknownViewer(viewer_id))?;

        Ok(Some(Self { user }))
    }
}

impl<St: EntityStore> FromRequestParts<ServerState<St>> for Viewer {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState<St>,
    ) -> Result<Self, Self::Rejection> {
        <Self as OptionalFromRequestParts<_>>::from_request_parts(parts, state)
            .await?
            .ok_or(ServerError::MissingViewer)
    }
}
