// HTTP surface of the blog

pub mod about;
pub mod auth;
pub mod fallback;
pub mod follow;
pub mod posts;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    middleware,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::convert::Infallible;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    app_state::AppState,
    infrastructure::middleware::{
        cache_index_page, csrf_middleware, error_page_middleware, viewer_context_middleware,
    },
    models::{Author, Comment, PostView},
    pagination::{page_from_query, Page},
    services::{FeedService, PostService},
};

pub fn create_router(state: AppState) -> Router {
    let media = ServeDir::new(&state.config.media.root);

    Router::new()
        .route(
            "/",
            get(posts::index).layer(middleware::from_fn_with_state(
                state.clone(),
                cache_index_page,
            )),
        )
        .route("/group/{slug}/", get(posts::group_posts))
        .route("/profile/{username}/", get(posts::profile))
        .route("/posts/{post_id}/", get(posts::post_detail))
        .route(
            "/create/",
            get(posts::post_create_form).post(posts::post_create),
        )
        .route(
            "/posts/{post_id}/edit/",
            get(posts::post_edit_form).post(posts::post_edit),
        )
        .route("/posts/{post_id}/comment/", post(posts::add_comment))
        .route("/follow/", get(follow::follow_index))
        .route("/profile/{username}/follow", get(follow::profile_follow))
        .route("/profile/{username}/follow/", get(follow::profile_follow))
        .route("/profile/{username}/unfollow", get(follow::profile_unfollow))
        .route("/profile/{username}/unfollow/", get(follow::profile_unfollow))
        .route("/about/author/", get(about::author))
        .route("/about/tech/", get(about::tech))
        .route("/auth/login/", get(auth::login))
        .nest_service("/media", media)
        .fallback(fallback::page_not_found)
        .layer(middleware::from_fn(csrf_middleware))
        .layer(middleware::from_fn(error_page_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            viewer_context_middleware::<AppState>,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `?page=` query parameter of every listing. Never rejects: anything that
/// is not a page number means the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumber(pub i64);

impl<S> FromRequestParts<S> for PageNumber
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let number = page_from_query(parts.uri.query());
        async move { Ok(PageNumber(number)) }
    }
}

pub(crate) fn feed(state: &AppState) -> FeedService {
    FeedService::new(state.db.clone(), state.paginator)
}

pub(crate) fn post_service(state: &AppState) -> PostService {
    PostService::new(state.db.clone(), state.images.clone())
}

pub(crate) fn profile_location(username: &str) -> String {
    format!("/profile/{}/", username)
}

pub(crate) fn post_location(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

/// Post as exposed to templates, with the image as a public URL
pub(crate) fn post_json(post: &PostView) -> Value {
    json!({
        "id": post.id,
        "text": post.text,
        "pub_date": post.pub_date,
        "image": post.image_url(),
        "author": post.author,
        "group": post.group,
    })
}

pub(crate) fn page_json(page: &Page<PostView>) -> Value {
    let mut value = json!(page.meta);
    value["object_list"] = Value::Array(page.object_list.iter().map(post_json).collect());
    value
}

pub(crate) fn author_json(author: &Author) -> Value {
    json!({
        "id": author.id,
        "username": author.username,
        "full_name": author.full_name,
    })
}

pub(crate) fn comments_json(comments: &[Comment]) -> Value {
    json!(comments)
}
