use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::render::Rendered;

#[derive(Debug)]
pub enum AppError {
    Database(anyhow::Error),
    DatabaseError(String),
    // Unique/check/foreign-key violations reported by the storage engine
    ConstraintViolation(String),
    NotFound(String),
    BadRequest(String),
    Internal(String),
    ConfigurationError(String),
    Forbidden(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(err) => write!(f, "Database error: {}", err),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::ConstraintViolation(msg) => write!(f, "Constraint violation: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Classify a sqlx error, keeping constraint violations distinguishable from
    /// connection or query failures.
    pub fn from_sqlx(context: &str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::CheckViolation
                | sqlx::error::ErrorKind::ForeignKeyViolation
                | sqlx::error::ErrorKind::NotNullViolation => {
                    return AppError::ConstraintViolation(format!("{}: {}", context, db_err));
                }
                _ => {}
            }
        }
        AppError::DatabaseError(format!("{}: {}", context, err))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_)
            | AppError::DatabaseError(_)
            | AppError::ConstraintViolation(_)
            | AppError::Internal(_)
            | AppError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Marker left on error responses so the error-page middleware can fill in the
/// request path.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPage {
    pub template: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let template = match status {
            StatusCode::NOT_FOUND => "core/404.html",
            StatusCode::FORBIDDEN => "core/403.html",
            StatusCode::BAD_REQUEST => "core/400.html",
            _ => "core/500.html",
        };

        match &self {
            AppError::NotFound(msg) => tracing::debug!("Not found: {}", msg),
            AppError::BadRequest(msg) | AppError::Forbidden(msg) => {
                tracing::warn!("{}: {}", status, msg)
            }
            other => tracing::error!("{}", other),
        }

        let mut response = Rendered::new(template, json!({ "path": null }))
            .with_status(status)
            .into_response();
        response.extensions_mut().insert(ErrorPage { template });
        response
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Database(err)
    }
}

pub type AppResult<T> = Result<T, AppError>;
