// Yatube - a small blogging service: authors, groups, posts, comments, follows

// Infrastructure - storage, caching, media and request middleware
pub mod infrastructure;

// Domain entities and the page slicing shared by every listing
pub mod models;
pub mod pagination;

// Input validation and response rendering
pub mod forms;
pub mod render;

// Business operations and the HTTP surface
pub mod services;
pub mod handlers;

// Application wiring
pub mod app_state;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
