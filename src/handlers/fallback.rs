use axum::http::Uri;

use crate::error::AppError;

pub async fn page_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
