// Whole-response cache for the home feed

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::{
    app_state::AppState,
    error::AppError,
    infrastructure::cache::CachedPage,
};

pub const INDEX_PAGE_KEY_PREFIX: &str = "index_page";

/// Cache key for the home feed: prefix plus the path and query of the request
pub fn index_page_key(uri: &Uri) -> String {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    format!("{}:{}", INDEX_PAGE_KEY_PREFIX, path_and_query)
}

pub async fn cache_index_page(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = index_page_key(request.uri());
    if let Some(page) = state.page_cache.get(&key).await {
        debug!("Page cache hit for {}", key);
        return cached_response(page);
    }

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!("Failed to buffer response for {}: {}", key, err);
            return AppError::Internal(format!("failed to buffer {}", key)).into_response();
        }
    };

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let page = CachedPage {
        status: parts.status.as_u16(),
        content_type,
        body: bytes.to_vec(),
    };
    state
        .page_cache
        .insert(key, page, state.config.cache.index_ttl())
        .await;

    Response::from_parts(parts, Body::from(bytes))
}

fn cached_response(page: CachedPage) -> Response {
    let mut response = Response::new(Body::from(page.body));
    *response.status_mut() = StatusCode::from_u16(page.status).unwrap_or(StatusCode::OK);
    if let Some(value) = page
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
    {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_page_key_includes_query() {
        let uri: Uri = "/?page=2".parse().unwrap();
        assert_eq!(index_page_key(&uri), "index_page:/?page=2");

        let uri: Uri = "/".parse().unwrap();
        assert_eq!(index_page_key(&uri), "index_page:/");
    }

    #[tokio::test]
    async fn test_cached_response_restores_headers() {
        let response = cached_response(CachedPage {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: b"{}".to_vec(),
        });
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"{}");
    }
}
