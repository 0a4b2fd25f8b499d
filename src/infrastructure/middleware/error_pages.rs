// Fills the request path into error pages rendered further down the stack

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{error::ErrorPage, render::Rendered};

pub async fn error_page_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    match response.extensions().get::<ErrorPage>().copied() {
        Some(page) => Rendered::new(page.template, json!({ "path": path }))
            .with_status(response.status())
            .into_response(),
        None => response,
    }
}
