// Infrastructure modules
pub mod database;              // Storage interface and validation helpers
pub mod sqlite_database;       // SQLite implementation of the storage interface
pub mod cache;                 // LRU/TTL page cache
pub mod media;                 // Uploaded image storage
pub mod viewer;                // Viewer context
pub mod middleware;            // Request middleware and extractors

pub use cache::{CachedPage, PageCache};
pub use database::DatabaseInterface;
pub use media::{FsImageStore, ImageStore};
pub use sqlite_database::SqliteDatabase;
pub use viewer::ViewerContext;
