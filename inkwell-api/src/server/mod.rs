use axum::{
    Router,
    extract::{
        Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use extract::Json;
use inkwell_core::{
    error::{CoreError, NotFound},
    model::{Id, post::PostMarker, user::UserMarker},
    store::EntityStore,
};
use serde::{Deserialize, Serialize};
use std::{error::Error, sync::Arc};
use thiserror::Error;
use tracing::{debug, error};

mod extract;
mod routes;

pub type ServerRouter<St> = Router<ServerState<St>>;

#[derive(Debug)]
pub struct ServerState<St> {
    pub store: Arc<St>,
}

impl<St> ServerState<St> {
    #[must_use]
    pub fn new(store: Arc<St>) -> Self {
        Self { store }
    }
}

impl<St> Clone for ServerState<St> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

pub fn routes<St: EntityStore>() -> ServerRouter<St> {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Query string rejected: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Viewer header was invalid: {0}")]
    InvalidViewerHeader(headers::Error),
    #[error("The request needs a viewer")]
    MissingViewer,
    #[error("Viewer {0} does not exist")]
    UnknownViewer(Id<UserMarker>),
    #[error("User {0} tried to follow themselves")]
    SelfFollow(Id<UserMarker>),
    /// The follow routes answer a repeated follow with success and never
    /// return this; it covers any other caller of the follow service.
    #[error("User {user} already follows {author}")]
    AlreadyFollowing {
        user: Id<UserMarker>,
        author: Id<UserMarker>,
    },
    #[error("User {editor} may not edit post {post}")]
    NotAuthor {
        editor: Id<UserMarker>,
        post: Id<PostMarker>,
    },
    #[error(transparent)]
    NotFound(#[from] NotFound),
    #[error("Entity store failed: {0}")]
    Store(Box<dyn Error + Send + Sync>),
}

impl ServerError {
    pub fn store<E: Error + Send + Sync + 'static>(err: E) -> Self {
        ServerError::Store(Box::new(err))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::MissingViewer | ServerError::UnknownViewer(_) => StatusCode::UNAUTHORIZED,
            ServerError::NotAuthor { .. } => StatusCode::FORBIDDEN,
            ServerError::AlreadyFollowing { .. } => StatusCode::CONFLICT,
            ServerError::QueryRejection(_)
            | ServerError::JsonRejection(_)
            | ServerError::InvalidViewerHeader(_)
            | ServerError::SelfFollow(_) => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_) | ServerError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl<E: Error + Send + Sync + 'static> From<CoreError<E>> for ServerError {
    fn from(value: CoreError<E>) -> Self {
        match value {
            CoreError::SelfFollow(user) => ServerError::SelfFollow(user),
            CoreError::AlreadyFollowing { user, author } => {
                ServerError::AlreadyFollowing { user, author }
            }
            CoreError::NotFound(not_found) => ServerError::NotFound(not_found),
            CoreError::NotAuthor { editor, post } => ServerError::NotAuthor { editor, post },
            CoreError::Store(err) => ServerError::store(err),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    status: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(error = %self, %status, "Replying with error");
        } else {
            debug!(error = %self, %status, "Rejecting request");
        }

        let error_response = ErrorResponse {
            status: status.as_u16(),
        };
        (status, Json(error_response)).into_response()
    }
}
