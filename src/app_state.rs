use std::sync::Arc;

use crate::{
    config::Config,
    infrastructure::{
        cache::PageCache,
        database::DatabaseInterface,
        media::{FsImageStore, ImageStore},
        sqlite_database::SqliteDatabase,
    },
    pagination::Paginator,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseInterface>,
    pub images: Arc<dyn ImageStore>,
    pub page_cache: Arc<PageCache>,
    pub paginator: Paginator,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        if let Some(dir) = sqlite_parent_dir(&config.database.url) {
            std::fs::create_dir_all(dir)?;
        }
        let database = SqliteDatabase::new(&config.database.url).await?;
        Ok(Self::with_database(config, Arc::new(database)))
    }

    /// Assemble the state around an already opened database
    pub fn with_database(config: Config, db: Arc<dyn DatabaseInterface>) -> Self {
        let images: Arc<dyn ImageStore> = Arc::new(FsImageStore::new(&config.media.root));
        Self {
            db,
            images,
            page_cache: Arc::new(PageCache::new(config.cache.capacity)),
            paginator: Paginator::new(config.pagination.posts_per_page),
            config,
        }
    }
}

fn sqlite_parent_dir(url: &str) -> Option<&std::path::Path> {
    let path = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    if path.starts_with(':') {
        return None;
    }
    let path = path.split('?').next()?;
    std::path::Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir("sqlite:data/yatube.db"),
            Some(std::path::Path::new("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_parent_dir("sqlite:yatube.db"), None);
    }
}
