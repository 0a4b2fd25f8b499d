use axum::extract::Query;
use serde::Deserialize;
use serde_json::json;

use crate::render::Rendered;

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Login page; anonymous requests to protected pages are sent here with `next`
pub async fn login(Query(query): Query<LoginQuery>) -> Rendered {
    Rendered::new("users/login.html", json!({ "next": query.next }))
}
