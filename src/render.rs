// Rendering boundary - handlers hand a template name and a context to the
// renderer; the renderer used here serializes both as JSON.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct Rendered {
    pub template: &'static str,
    pub context: Value,
    pub status: StatusCode,
}

impl Rendered {
    pub fn new(template: &'static str, context: Value) -> Self {
        Self {
            template,
            context,
            status: StatusCode::OK,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "template": self.template,
            "context": self.context,
        }));
        (self.status, body).into_response()
    }
}

/// `302 Found` to `location`.
pub fn found(location: impl AsRef<str>) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.as_ref().to_string())],
    )
        .into_response()
}

/// Build `<login_url>?next=<path>`; slashes in the return path stay literal.
pub fn login_redirect_location(login_url: &str, next: &str) -> String {
    let encoded = urlencoding::encode(next).replace("%2F", "/");
    format!("{}?next={}", login_url, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_keeps_slashes() {
        assert_eq!(
            login_redirect_location("/auth/login/", "/posts/3/edit/"),
            "/auth/login/?next=/posts/3/edit/"
        );
    }

    #[test]
    fn test_login_redirect_encodes_query() {
        assert_eq!(
            login_redirect_location("/auth/login/", "/follow/?page=2"),
            "/auth/login/?next=/follow/%3Fpage%3D2"
        );
    }

    #[test]
    fn test_found_sets_location() {
        let response = found("/profile/leo/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/profile/leo/");
    }
}
