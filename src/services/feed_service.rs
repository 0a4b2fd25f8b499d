// FeedService - paginated post listings for every feed page

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    error::AppResult,
    infrastructure::database::DatabaseInterface,
    models::{PostFilter, PostView},
    pagination::{Page, Paginator},
};

#[derive(Clone)]
pub struct FeedService {
    db: Arc<dyn DatabaseInterface>,
    paginator: Paginator,
}

impl FeedService {
    pub fn new(db: Arc<dyn DatabaseInterface>, paginator: Paginator) -> Self {
        Self { db, paginator }
    }

    /// One page of the posts selected by `filter`, newest first
    #[instrument(skip(self))]
    pub async fn page(&self, filter: PostFilter, requested: i64) -> AppResult<Page<PostView>> {
        let count = self.db.count_posts(filter).await?;
        let meta = self.paginator.bounds(count, requested);
        let object_list = self
            .db
            .list_posts(filter, meta.limit(), meta.offset())
            .await?;

        debug!(
            "Feed {:?}: page {}/{} with {} posts",
            filter,
            meta.number,
            meta.num_pages,
            object_list.len()
        );
        Ok(Page { object_list, meta })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{infrastructure::sqlite_database::SqliteDatabase, models::NewPost};

    async fn seeded(posts: usize) -> (Arc<dyn DatabaseInterface>, i64) {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let author = db.create_author("leo", "Leo").await.unwrap();
        for i in 0..posts {
            db.create_post(NewPost {
                text: format!("post {}", i),
                author_id: author.id,
                group_id: None,
                image: None,
            })
            .await
            .unwrap();
        }
        (Arc::new(db), author.id)
    }

    #[tokio::test]
    async fn test_thirteen_posts_over_two_pages() {
        let (db, author_id) = seeded(13).await;
        let feed = FeedService::new(db, Paginator::new(10));

        let first = feed.page(PostFilter::Author(author_id), 1).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first.meta.num_pages, 2);
        assert_eq!(first.object_list[0].text, "post 12");

        let second = feed.page(PostFilter::Author(author_id), 2).await.unwrap();
        assert_eq!(second.len(), 3);
        assert_eq!(second.object_list[2].text, "post 0");
    }

    #[tokio::test]
    async fn test_out_of_range_page_lands_on_last() {
        let (db, _) = seeded(13).await;
        let feed = FeedService::new(db, Paginator::new(10));

        let page = feed.page(PostFilter::All, 99).await.unwrap();
        assert_eq!(page.meta.number, 2);
        assert_eq!(page.len(), 3);

        let page = feed.page(PostFilter::All, 0).await.unwrap();
        assert_eq!(page.meta.number, 1);
    }

    #[tokio::test]
    async fn test_empty_feed_has_one_page() {
        let (db, author_id) = seeded(0).await;
        let feed = FeedService::new(db, Paginator::new(10));

        let page = feed.page(PostFilter::FollowedBy(author_id), 1).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(page.meta.num_pages, 1);
    }
}
