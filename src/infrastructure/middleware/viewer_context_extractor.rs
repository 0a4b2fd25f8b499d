// Extractors over the request-scoped ViewerContext

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::Response,
};
use std::sync::Arc;

use crate::{
    app_state::AppState,
    infrastructure::viewer::viewer::ViewerContext,
    models::Author,
    render::{found, login_redirect_location},
};

/// Cheap handle on the ViewerContext installed by the middleware.
/// Derefs to `ViewerContext`, so `vc.author()` and friends work directly.
#[derive(Debug, Clone)]
pub struct Vc(Arc<ViewerContext>);

impl std::ops::Deref for Vc {
    type Target = ViewerContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Vc
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let vc = parts
            .extensions
            .get::<Arc<ViewerContext>>()
            .map(|vc| Vc(vc.clone()))
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR);

        async move { vc }
    }
}

/// The signed-in author. Anonymous requests are answered with a redirect to
/// the login page carrying the original path and query as `next`.
#[derive(Debug, Clone)]
pub struct CurrentAuthor(pub Author);

impl FromRequestParts<AppState> for CurrentAuthor {
    type Rejection = Response;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let author = parts
            .extensions
            .get::<Arc<ViewerContext>>()
            .and_then(|vc| vc.author().cloned());

        let result = match author {
            Some(author) => Ok(CurrentAuthor(author)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                Err(found(login_redirect_location(
                    &state.config.auth.login_url,
                    next,
                )))
            }
        };

        async move { result }
    }
}
