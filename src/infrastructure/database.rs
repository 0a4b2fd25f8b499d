// Database Interface - storage operations for the blog schema
// Handlers and services only see this trait; SQL lives in the implementations

use async_trait::async_trait;
use base64::Engine;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use crate::error::{AppError, AppResult};
use crate::models::{
    Author, AuthorId, Comment, Group, GroupId, NewPost, Post, PostChanges, PostFilter, PostId,
    PostView,
};

/// Maximum length of a group title
pub const GROUP_TITLE_MAX_CHARS: usize = 200;

static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap());

/// Database interface trait for the blog schema
#[async_trait]
pub trait DatabaseInterface: Send + Sync {
    // Authors and sessions
    async fn create_author(&self, username: &str, full_name: &str) -> AppResult<Author>;
    async fn get_author_by_username(&self, username: &str) -> AppResult<Option<Author>>;
    async fn delete_author(&self, id: AuthorId) -> AppResult<bool>;
    /// Mint a session token for `author_id`
    async fn create_session(&self, author_id: AuthorId) -> AppResult<String>;
    async fn get_author_by_session(&self, token: &str) -> AppResult<Option<Author>>;

    // Groups
    async fn create_group(&self, title: &str, slug: &str, description: &str) -> AppResult<Group>;
    async fn get_group_by_slug(&self, slug: &str) -> AppResult<Option<Group>>;
    async fn list_groups(&self) -> AppResult<Vec<Group>>;
    /// Posts of a deleted group stay, with no group
    async fn delete_group(&self, id: GroupId) -> AppResult<bool>;

    // Posts
    async fn create_post(&self, post: NewPost) -> AppResult<Post>;
    async fn update_post(&self, id: PostId, changes: PostChanges) -> AppResult<Post>;
    async fn delete_post(&self, id: PostId) -> AppResult<bool>;
    async fn get_post(&self, id: PostId) -> AppResult<Option<PostView>>;
    async fn count_posts(&self, filter: PostFilter) -> AppResult<i64>;
    /// Newest first
    async fn list_posts(&self, filter: PostFilter, limit: i64, offset: i64)
        -> AppResult<Vec<PostView>>;

    // Comments
    async fn create_comment(&self, post_id: PostId, author_id: AuthorId, text: &str)
        -> AppResult<Comment>;
    /// Oldest first
    async fn list_comments(&self, post_id: PostId) -> AppResult<Vec<Comment>>;

    // Follows
    /// Returns false when the pair already existed. `author_id == user_id` is a
    /// constraint violation.
    async fn create_follow(&self, author_id: AuthorId, user_id: AuthorId) -> AppResult<bool>;
    /// Returns false when there was nothing to delete
    async fn delete_follow(&self, author_id: AuthorId, user_id: AuthorId) -> AppResult<bool>;
    async fn follow_exists(&self, author_id: AuthorId, user_id: AuthorId) -> AppResult<bool>;
}

pub fn validate_slug(slug: &str) -> AppResult<()> {
    if SLUG_PATTERN.is_match(slug) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Slug '{}' may only contain letters, digits, hyphens and underscores",
            slug
        )))
    }
}

pub fn validate_group_title(title: &str) -> AppResult<()> {
    let len = title.chars().count();
    if len == 0 || len > GROUP_TITLE_MAX_CHARS {
        return Err(AppError::BadRequest(format!(
            "Group title must be between 1 and {} characters",
            GROUP_TITLE_MAX_CHARS
        )));
    }
    Ok(())
}

/// Random URL-safe session token
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
