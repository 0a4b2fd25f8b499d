// ViewerContext middleware - resolves the session of every request and
// injects the resulting ViewerContext into request extensions

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    infrastructure::{database::DatabaseInterface, viewer::viewer::ViewerContext},
};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "sessionid";

/// Application state that can resolve session tokens
pub trait HasDatabase {
    fn database(&self) -> &Arc<dyn DatabaseInterface>;
}

impl HasDatabase for AppState {
    fn database(&self) -> &Arc<dyn DatabaseInterface> {
        &self.db
    }
}

/// Where the session token of a request came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSource {
    Bearer(String),
    Cookie(String),
}

impl AuthSource {
    pub fn token(&self) -> &str {
        match self {
            AuthSource::Bearer(token) | AuthSource::Cookie(token) => token,
        }
    }
}

pub async fn viewer_context_middleware<T>(
    State(app_state): State<T>,
    mut request: Request,
    next: Next,
) -> Response
where
    T: HasDatabase + Clone + Send + Sync + 'static,
{
    let request_id = format!("req-{}", Uuid::new_v4());

    let viewer_context = match extract_auth_from_request(request.headers()) {
        Some(source) => match app_state.database().get_author_by_session(source.token()).await {
            Ok(Some(author)) => {
                debug!("{} authenticated as {}", request_id, author.username);
                ViewerContext::authenticated(author, request_id)
            }
            Ok(None) => {
                debug!("{} presented an unknown session token", request_id);
                ViewerContext::anonymous(request_id)
            }
            Err(err) => return err.into_response(),
        },
        None => ViewerContext::anonymous(request_id),
    };

    request.extensions_mut().insert(Arc::new(viewer_context));
    next.run(request).await
}

/// Pick the session token from `Authorization: Bearer` or the session cookie.
/// The header wins when both are present.
pub fn extract_auth_from_request(headers: &HeaderMap) -> Option<AuthSource> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        return Some(AuthSource::Bearer(token.to_string()));
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| AuthSource::Cookie(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_auth_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer token123"));

        assert_eq!(
            extract_auth_from_request(&headers),
            Some(AuthSource::Bearer("token123".to_string()))
        );
    }

    #[test]
    fn test_extract_auth_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("csrftoken=abc; sessionid=tok-42; theme=dark"),
        );

        let source = extract_auth_from_request(&headers).unwrap();
        assert_eq!(source, AuthSource::Cookie("tok-42".to_string()));
        assert_eq!(source.token(), "tok-42");
    }

    #[test]
    fn test_bearer_takes_precedence_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer header"));
        headers.insert("cookie", HeaderValue::from_static("sessionid=cookie"));

        assert_eq!(
            extract_auth_from_request(&headers),
            Some(AuthSource::Bearer("header".to_string()))
        );
    }

    #[test]
    fn test_extract_auth_anonymous() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_auth_from_request(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        headers.insert("cookie", HeaderValue::from_static("sessionid="));
        assert_eq!(extract_auth_from_request(&headers), None);
    }
}
