// Cross-site request check for writes authenticated by the session cookie

use axum::{
    extract::Request,
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::viewer_context_middleware::{extract_auth_from_request, AuthSource};
use crate::error::AppError;

/// Unsafe requests that ride on the `sessionid` cookie must come from the
/// site itself: `Origin`, or failing that `Referer`, has to name the `Host`
/// the request was sent to. Bearer-token clients are not subject to this.
pub async fn csrf_middleware(request: Request, next: Next) -> Response {
    if is_safe_method(request.method()) {
        return next.run(request).await;
    }

    if let Some(AuthSource::Cookie(_)) = extract_auth_from_request(request.headers()) {
        if !is_same_origin(request.headers()) {
            warn!(
                "Rejected cross-site {} {}",
                request.method(),
                request.uri().path()
            );
            return AppError::Forbidden("CSRF verification failed".to_string()).into_response();
        }
    }

    next.run(request).await
}

fn is_safe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

pub fn is_same_origin(headers: &HeaderMap) -> bool {
    let Some(host) = header_str(headers, header::HOST) else {
        return false;
    };

    let source = header_str(headers, header::ORIGIN)
        .filter(|origin| *origin != "null")
        .or_else(|| header_str(headers, header::REFERER));

    match source.and_then(authority) {
        Some(authority) => authority.eq_ignore_ascii_case(host),
        None => false,
    }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// `host[:port]` part of an absolute http(s) URL
fn authority(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    (!authority.is_empty()).then_some(authority)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_matching_origin_is_same_origin() {
        let h = headers(&[
            (header::HOST, "testserver"),
            (header::ORIGIN, "http://testserver"),
        ]);
        assert!(is_same_origin(&h));

        let h = headers(&[
            (header::HOST, "blog.example:8000"),
            (header::ORIGIN, "https://blog.example:8000"),
        ]);
        assert!(is_same_origin(&h));
    }

    #[test]
    fn test_foreign_origin_is_rejected() {
        let h = headers(&[
            (header::HOST, "testserver"),
            (header::ORIGIN, "https://evil.example"),
        ]);
        assert!(!is_same_origin(&h));

        let h = headers(&[
            (header::HOST, "testserver"),
            (header::ORIGIN, "https://evil.example"),
            (header::REFERER, "http://testserver/create/"),
        ]);
        assert!(!is_same_origin(&h));
    }

    #[test]
    fn test_referer_used_without_origin() {
        let h = headers(&[
            (header::HOST, "testserver"),
            (header::REFERER, "http://testserver/posts/1/"),
        ]);
        assert!(is_same_origin(&h));

        let h = headers(&[
            (header::HOST, "testserver"),
            (header::ORIGIN, "null"),
            (header::REFERER, "http://testserver.evil.example/"),
        ]);
        assert!(!is_same_origin(&h));
    }

    #[test]
    fn test_missing_headers_are_rejected() {
        assert!(!is_same_origin(&headers(&[(header::HOST, "testserver")])));
        assert!(!is_same_origin(&headers(&[(
            header::ORIGIN,
            "http://testserver"
        )])));
    }

    #[test]
    fn test_safe_methods() {
        assert!(is_safe_method(&Method::GET));
        assert!(is_safe_method(&Method::HEAD));
        assert!(!is_safe_method(&Method::POST));
        assert!(!is_safe_method(&Method::DELETE));
    }
}
