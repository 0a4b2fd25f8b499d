use axum::{
    extract::{Path, State},
    response::Response,
};
use serde_json::json;

use super::{feed, page_json, post_service, posts::find_author, profile_location, PageNumber};
use crate::{
    app_state::AppState,
    error::AppResult,
    infrastructure::middleware::CurrentAuthor,
    models::PostFilter,
    render::{found, Rendered},
};

pub async fn follow_index(
    State(state): State<AppState>,
    CurrentAuthor(user): CurrentAuthor,
    PageNumber(page_number): PageNumber,
) -> AppResult<Rendered> {
    let page = feed(&state)
        .page(PostFilter::FollowedBy(user.id), page_number)
        .await?;
    Ok(Rendered::new(
        "posts/follow.html",
        json!({ "page_obj": page_json(&page) }),
    ))
}

pub async fn profile_follow(
    State(state): State<AppState>,
    CurrentAuthor(user): CurrentAuthor,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let author = find_author(&state, &username).await?;
    post_service(&state).follow(&user, &author).await?;
    Ok(found(profile_location(&author.username)))
}

pub async fn profile_unfollow(
    State(state): State<AppState>,
    CurrentAuthor(user): CurrentAuthor,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let author = find_author(&state, &username).await?;
    post_service(&state).unfollow(&user, &author).await?;
    Ok(found(profile_location(&author.username)))
}
