use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form,
};
use serde_json::json;

use super::{
    author_json, comments_json, feed, page_json, post_json, post_location, post_service,
    profile_location, PageNumber,
};
use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    forms::{
        comment_form_context, post_form_context, validate_comment, validate_post,
        CommentFormData, FormErrors, PostFormData,
    },
    infrastructure::middleware::{CurrentAuthor, Vc},
    models::{Author, Group, PostFilter, PostId, PostView},
    render::{found, Rendered},
};

pub async fn index(
    State(state): State<AppState>,
    PageNumber(page_number): PageNumber,
) -> AppResult<Rendered> {
    let page = feed(&state).page(PostFilter::All, page_number).await?;
    Ok(Rendered::new(
        "posts/index.html",
        json!({ "page_obj": page_json(&page) }),
    ))
}

pub async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    PageNumber(page_number): PageNumber,
) -> AppResult<Rendered> {
    let group = state
        .db
        .get_group_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group {} not found", slug)))?;
    let page = feed(&state)
        .page(PostFilter::Group(group.id), page_number)
        .await?;

    Ok(Rendered::new(
        "posts/group_list.html",
        json!({ "group": group, "page_obj": page_json(&page) }),
    ))
}

pub async fn profile(
    State(state): State<AppState>,
    vc: Vc,
    Path(username): Path<String>,
    PageNumber(page_number): PageNumber,
) -> AppResult<Rendered> {
    let author = find_author(&state, &username).await?;
    let page = feed(&state)
        .page(PostFilter::Author(author.id), page_number)
        .await?;
    let following = match vc.author() {
        Some(viewer) => post_service(&state).is_following(viewer, &author).await?,
        None => false,
    };

    Ok(Rendered::new(
        "posts/profile.html",
        json!({
            "author": author_json(&author),
            "following": following,
            "page_obj": page_json(&page),
        }),
    ))
}

pub async fn post_detail(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Rendered> {
    let post = find_post(&state, &post_id).await?;
    let comments = state.db.list_comments(post.id).await?;

    Ok(Rendered::new(
        "posts/post_detail.html",
        json!({
            "post": post_json(&post),
            "comments": comments_json(&comments),
            "form": comment_form_context(&CommentFormData::default(), &FormErrors::default()),
        }),
    ))
}

pub async fn post_create_form(
    State(state): State<AppState>,
    CurrentAuthor(_author): CurrentAuthor,
) -> AppResult<Rendered> {
    let groups = state.db.list_groups().await?;
    Ok(Rendered::new(
        "posts/create_post.html",
        json!({
            "form": post_form_context(&PostFormData::default(), &FormErrors::default(), &groups),
        }),
    ))
}

pub async fn post_create(
    State(state): State<AppState>,
    CurrentAuthor(author): CurrentAuthor,
    Form(data): Form<PostFormData>,
) -> AppResult<Response> {
    let groups = state.db.list_groups().await?;
    match validate_post(&data, &groups) {
        Ok(valid) => {
            post_service(&state).publish(&author, valid).await?;
            Ok(found(profile_location(&author.username)))
        }
        Err(errors) => Ok(Rendered::new(
            "posts/create_post.html",
            json!({ "form": post_form_context(&data, &errors, &groups) }),
        )
        .into_response()),
    }
}

pub async fn post_edit_form(
    State(state): State<AppState>,
    CurrentAuthor(author): CurrentAuthor,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post = find_post(&state, &post_id).await?;
    if !post.is_owned_by(&author) {
        return Ok(found(post_location(post.id)));
    }

    let groups = state.db.list_groups().await?;
    Ok(edit_page(&post, &PostFormData::from_post(&post), &FormErrors::default(), &groups))
}

pub async fn post_edit(
    State(state): State<AppState>,
    CurrentAuthor(author): CurrentAuthor,
    Path(post_id): Path<String>,
    Form(data): Form<PostFormData>,
) -> AppResult<Response> {
    let post = find_post(&state, &post_id).await?;
    if !post.is_owned_by(&author) {
        return Ok(found(post_location(post.id)));
    }

    let groups = state.db.list_groups().await?;
    match validate_post(&data, &groups) {
        Ok(valid) => {
            post_service(&state).edit(&post, valid).await?;
            Ok(found(post_location(post.id)))
        }
        Err(errors) => Ok(edit_page(&post, &data, &errors, &groups)),
    }
}

pub async fn add_comment(
    State(state): State<AppState>,
    CurrentAuthor(author): CurrentAuthor,
    Path(post_id): Path<String>,
    Form(data): Form<CommentFormData>,
) -> AppResult<Response> {
    let post = find_post(&state, &post_id).await?;
    if let Ok(text) = validate_comment(&data) {
        post_service(&state).comment(post.id, &author, &text).await?;
    }
    Ok(found(post_location(post.id)))
}

fn edit_page(
    post: &PostView,
    data: &PostFormData,
    errors: &FormErrors,
    groups: &[Group],
) -> Response {
    Rendered::new(
        "posts/create_post.html",
        json!({
            "is_edit": true,
            "post": post_json(post),
            "form": post_form_context(data, errors, groups),
        }),
    )
    .into_response()
}

pub(crate) async fn find_author(state: &AppState, username: &str) -> AppResult<Author> {
    state
        .db
        .get_author_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", username)))
}

/// Post ids in URLs that are not integers name no post at all
async fn find_post(state: &AppState, raw_id: &str) -> AppResult<PostView> {
    let post_id: PostId = raw_id
        .parse()
        .map_err(|_| AppError::NotFound(format!("Post {} not found", raw_id)))?;
    state
        .db
        .get_post(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))
}
