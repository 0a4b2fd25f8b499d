// Request middleware: viewer resolution, cross-site checks, error pages and
// the home feed cache

pub mod csrf;
pub mod error_pages;
pub mod page_cache;
pub mod viewer_context_extractor;
pub mod viewer_context_middleware;

pub use csrf::csrf_middleware;
pub use error_pages::error_page_middleware;
pub use page_cache::{cache_index_page, index_page_key};
pub use viewer_context_extractor::{CurrentAuthor, Vc};
pub use viewer_context_middleware::{viewer_context_middleware, HasDatabase, SESSION_COOKIE};
