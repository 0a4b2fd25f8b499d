use async_trait::async_trait;
use sqlx::{
    sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    QueryBuilder, Row,
};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{
    generate_session_token, validate_group_title, validate_slug, DatabaseInterface,
};
use crate::models::{
    current_time_millis, millis_to_datetime, Author, AuthorId, AuthorRef, Comment, Group,
    GroupId, GroupRef, NewPost, Post, PostChanges, PostFilter, PostId, PostView,
};

const POST_VIEW_SELECT: &str = "SELECT p.id, p.text, p.pub_date, p.image, p.author_id, \
     a.username AS author_username, p.group_id, g.title AS group_title, g.slug AS group_slug \
     FROM posts p \
     JOIN authors a ON a.id = p.author_id \
     LEFT JOIN post_groups g ON g.id = p.group_id";

const COMMENT_SELECT: &str = "SELECT c.id, c.post_id, c.text, c.pub_date, c.author_id, \
     a.username AS author_username \
     FROM comments c \
     JOIN authors a ON a.id = c.author_id";

/// SQLite implementation of the blog database interface
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                AppError::ConfigurationError(format!(
                    "Invalid database url {}: {}",
                    database_url, e
                ))
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to {}: {}", database_url, e))
            })?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    /// Single-connection in-memory database; the connection is never recycled
    /// so the schema lives as long as the pool.
    pub async fn new_in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::ConfigurationError(format!("Invalid in-memory url: {}", e)))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to in-memory SQLite: {}", e))
            })?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    /// Create the blog tables and indexes if they do not exist yet
    pub async fn initialize(&self) -> AppResult<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS authors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL DEFAULT '',
                time_created INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
                time_created INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS post_groups (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL CHECK (length(title) <= 200),
                slug TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL CHECK (length(trim(text)) > 0),
                pub_date INTEGER NOT NULL,
                author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
                group_id INTEGER REFERENCES post_groups(id) ON DELETE SET NULL,
                image TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
                text TEXT NOT NULL,
                pub_date INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS follows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
                user_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
                CONSTRAINT unique_follow UNIQUE (author_id, user_id),
                CONSTRAINT author_not_user CHECK (author_id <> user_id)
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_posts_pub_date ON posts(pub_date DESC, id DESC)",
            "CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id, pub_date DESC)",
            "CREATE INDEX IF NOT EXISTS idx_posts_group ON posts(group_id, pub_date DESC)",
            "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, pub_date)",
            "CREATE INDEX IF NOT EXISTS idx_follows_user ON follows(user_id)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to initialize schema: {}", e)))?;
        }
        Ok(())
    }

    async fn get_comment(&self, id: i64) -> AppResult<Option<Comment>> {
        let row = sqlx::query(&format!("{} WHERE c.id = ?", COMMENT_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx(&format!("Failed to get comment {}", id), e))?;
        Ok(row.as_ref().map(comment_from_row))
    }

    async fn get_post_record(&self, id: PostId) -> AppResult<Option<Post>> {
        let row = sqlx::query(
            "SELECT id, text, pub_date, author_id, group_id, image FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx(&format!("Failed to get post {}", id), e))?;

        Ok(row.map(|row| Post {
            id: row.get("id"),
            text: row.get("text"),
            pub_date: millis_to_datetime(row.get("pub_date")),
            author_id: row.get("author_id"),
            group_id: row.get("group_id"),
            image: row.get("image"),
        }))
    }
}

fn author_from_row(row: &SqliteRow) -> Author {
    Author {
        id: row.get("id"),
        username: row.get("username"),
        full_name: row.get("full_name"),
    }
}

fn group_from_row(row: &SqliteRow) -> Group {
    Group {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
    }
}

fn post_view_from_row(row: &SqliteRow) -> PostView {
    let group_id: Option<GroupId> = row.get("group_id");
    PostView {
        id: row.get("id"),
        text: row.get("text"),
        pub_date: millis_to_datetime(row.get("pub_date")),
        image: row.get("image"),
        author: AuthorRef {
            id: row.get("author_id"),
            username: row.get("author_username"),
        },
        group: group_id.map(|id| GroupRef {
            id,
            title: row.get("group_title"),
            slug: row.get("group_slug"),
        }),
    }
}

fn comment_from_row(row: &SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        text: row.get("text"),
        pub_date: millis_to_datetime(row.get("pub_date")),
        author: AuthorRef {
            id: row.get("author_id"),
            username: row.get("author_username"),
        },
    }
}

fn push_post_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: PostFilter) {
    match filter {
        PostFilter::All => {}
        PostFilter::Group(group_id) => {
            qb.push(" WHERE p.group_id = ");
            qb.push_bind(group_id);
        }
        PostFilter::Author(author_id) => {
            qb.push(" WHERE p.author_id = ");
            qb.push_bind(author_id);
        }
        PostFilter::FollowedBy(user_id) => {
            qb.push(" WHERE p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = ");
            qb.push_bind(user_id);
            qb.push(")");
        }
    }
}

#[async_trait]
impl DatabaseInterface for SqliteDatabase {
    async fn create_author(&self, username: &str, full_name: &str) -> AppResult<Author> {
        let result = sqlx::query(
            "INSERT INTO authors (username, full_name, time_created) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(full_name)
        .bind(current_time_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx(&format!("Failed to create author {}", username), e))?;

        Ok(Author {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            full_name: full_name.to_string(),
        })
    }

    async fn get_author_by_username(&self, username: &str) -> AppResult<Option<Author>> {
        let row = sqlx::query("SELECT id, username, full_name FROM authors WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx(&format!("Failed to get author {}", username), e))?;
        Ok(row.as_ref().map(author_from_row))
    }

    async fn delete_author(&self, id: AuthorId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx(&format!("Failed to delete author {}", id), e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_session(&self, author_id: AuthorId) -> AppResult<String> {
        let token = generate_session_token();
        sqlx::query("INSERT INTO sessions (token, author_id, time_created) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(author_id)
            .bind(current_time_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::from_sqlx(&format!("Failed to create session for author {}", author_id), e)
            })?;
        Ok(token)
    }

    async fn get_author_by_session(&self, token: &str) -> AppResult<Option<Author>> {
        let row = sqlx::query(
            "SELECT a.id, a.username, a.full_name FROM sessions s \
             JOIN authors a ON a.id = s.author_id WHERE s.token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to resolve session", e))?;
        Ok(row.as_ref().map(author_from_row))
    }

    async fn create_group(&self, title: &str, slug: &str, description: &str) -> AppResult<Group> {
        validate_group_title(title)?;
        validate_slug(slug)?;

        let result =
            sqlx::query("INSERT INTO post_groups (title, slug, description) VALUES (?, ?, ?)")
                .bind(title)
                .bind(slug)
                .bind(description)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::from_sqlx(&format!("Failed to create group {}", slug), e))?;

        Ok(Group {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
        })
    }

    async fn get_group_by_slug(&self, slug: &str) -> AppResult<Option<Group>> {
        let row =
            sqlx::query("SELECT id, title, slug, description FROM post_groups WHERE slug = ?")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::from_sqlx(&format!("Failed to get group {}", slug), e))?;
        Ok(row.as_ref().map(group_from_row))
    }

    async fn list_groups(&self) -> AppResult<Vec<Group>> {
        let rows = sqlx::query("SELECT id, title, slug, description FROM post_groups ORDER BY title")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to list groups", e))?;
        Ok(rows.iter().map(group_from_row).collect())
    }

    async fn delete_group(&self, id: GroupId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM post_groups WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx(&format!("Failed to delete group {}", id), e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_post(&self, post: NewPost) -> AppResult<Post> {
        let now = current_time_millis();
        let result = sqlx::query(
            "INSERT INTO posts (text, pub_date, author_id, group_id, image) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&post.text)
        .bind(now)
        .bind(post.author_id)
        .bind(post.group_id)
        .bind(&post.image)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_sqlx(&format!("Failed to create post for author {}", post.author_id), e)
        })?;

        Ok(Post {
            id: result.last_insert_rowid(),
            text: post.text,
            pub_date: millis_to_datetime(now),
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image,
        })
    }

    async fn update_post(&self, id: PostId, changes: PostChanges) -> AppResult<Post> {
        let result = sqlx::query(
            "UPDATE posts SET text = ?, group_id = ?, image = COALESCE(?, image) WHERE id = ?",
        )
        .bind(&changes.text)
        .bind(changes.group_id)
        .bind(&changes.image)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx(&format!("Failed to update post {}", id), e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post {} not found", id)));
        }

        self.get_post_record(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))
    }

    async fn delete_post(&self, id: PostId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx(&format!("Failed to delete post {}", id), e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_post(&self, id: PostId) -> AppResult<Option<PostView>> {
        let row = sqlx::query(&format!("{} WHERE p.id = ?", POST_VIEW_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx(&format!("Failed to get post {}", id), e))?;
        Ok(row.as_ref().map(post_view_from_row))
    }

    async fn count_posts(&self, filter: PostFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS count FROM posts p");
        push_post_filter(&mut qb, filter);

        let row = qb
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to count posts", e))?;
        Ok(row.get("count"))
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<PostView>> {
        let mut qb = QueryBuilder::<Sqlite>::new(POST_VIEW_SELECT);
        push_post_filter(&mut qb, filter);
        qb.push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to list posts", e))?;
        Ok(rows.iter().map(post_view_from_row).collect())
    }

    async fn create_comment(
        &self,
        post_id: PostId,
        author_id: AuthorId,
        text: &str,
    ) -> AppResult<Comment> {
        let result = sqlx::query(
            "INSERT INTO comments (post_id, author_id, text, pub_date) VALUES (?, ?, ?, ?)",
        )
        .bind(post_id)
        .bind(author_id)
        .bind(text)
        .bind(current_time_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_sqlx(&format!("Failed to create comment on post {}", post_id), e)
        })?;

        let id = result.last_insert_rowid();
        self.get_comment(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Comment {} vanished after insert", id)))
    }

    async fn list_comments(&self, post_id: PostId) -> AppResult<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "{} WHERE c.post_id = ? ORDER BY c.pub_date, c.id",
            COMMENT_SELECT
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx(&format!("Failed to list comments of post {}", post_id), e))?;
        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn create_follow(&self, author_id: AuthorId, user_id: AuthorId) -> AppResult<bool> {
        // Only the uniqueness conflict is absorbed; author_not_user still fails.
        let result = sqlx::query(
            "INSERT INTO follows (author_id, user_id) VALUES (?, ?) \
             ON CONFLICT (author_id, user_id) DO NOTHING",
        )
        .bind(author_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_sqlx(
                &format!("Failed to create follow {} -> {}", user_id, author_id),
                e,
            )
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_follow(&self, author_id: AuthorId, user_id: AuthorId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE author_id = ? AND user_id = ?")
            .bind(author_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::from_sqlx(
                    &format!("Failed to delete follow {} -> {}", user_id, author_id),
                    e,
                )
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn follow_exists(&self, author_id: AuthorId, user_id: AuthorId) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM follows WHERE author_id = ? AND user_id = ?")
            .bind(author_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to check follow existence", e))?;
        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (SqliteDatabase, Author, Author) {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let leo = db.create_author("leo", "Leo").await.unwrap();
        let tiger = db.create_author("tiger", "").await.unwrap();
        (db, leo, tiger)
    }

    fn new_post(author: &Author, text: &str, group_id: Option<GroupId>) -> NewPost {
        NewPost {
            text: text.to_string(),
            author_id: author.id,
            group_id,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_username_is_unique() {
        let (db, _, _) = setup().await;
        let err = db.create_author("leo", "Other Leo").await.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_group_slug_is_unique_and_validated() {
        let (db, _, _) = setup().await;
        db.create_group("Cats", "cats", "About cats").await.unwrap();

        let dup = db.create_group("More cats", "cats", "").await.unwrap_err();
        assert!(matches!(dup, AppError::ConstraintViolation(_)));

        let bad = db.create_group("Dogs", "dogs and more", "").await.unwrap_err();
        assert!(matches!(bad, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_self_follow_is_rejected() {
        let (db, leo, _) = setup().await;
        let err = db.create_follow(leo.id, leo.id).await.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
        assert!(!db.follow_exists(leo.id, leo.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_follow_is_noop() {
        let (db, leo, tiger) = setup().await;
        assert!(db.create_follow(leo.id, tiger.id).await.unwrap());
        assert!(!db.create_follow(leo.id, tiger.id).await.unwrap());
        assert!(db.follow_exists(leo.id, tiger.id).await.unwrap());
        // Direction matters
        assert!(!db.follow_exists(tiger.id, leo.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unfollow_missing_is_noop() {
        let (db, leo, tiger) = setup().await;
        assert!(!db.delete_follow(leo.id, tiger.id).await.unwrap());
        db.create_follow(leo.id, tiger.id).await.unwrap();
        assert!(db.delete_follow(leo.id, tiger.id).await.unwrap());
        assert!(!db.follow_exists(leo.id, tiger.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_group_deletion_keeps_posts() {
        let (db, leo, _) = setup().await;
        let group = db.create_group("Cats", "cats", "").await.unwrap();
        let post = db.create_post(new_post(&leo, "Meow", Some(group.id))).await.unwrap();

        assert!(db.delete_group(group.id).await.unwrap());

        let view = db.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(view.group, None);
        assert_eq!(view.text, "Meow");
    }

    #[tokio::test]
    async fn test_blank_post_text_is_rejected() {
        let (db, leo, _) = setup().await;
        let err = db.create_post(new_post(&leo, "   ", None)).await.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_posts_listed_newest_first() {
        let (db, leo, tiger) = setup().await;
        let group = db.create_group("Cats", "cats", "").await.unwrap();
        let first = db.create_post(new_post(&leo, "first", Some(group.id))).await.unwrap();
        let second = db.create_post(new_post(&tiger, "second", None)).await.unwrap();
        let third = db.create_post(new_post(&leo, "third", None)).await.unwrap();

        let all = db.list_posts(PostFilter::All, 10, 0).await.unwrap();
        let ids: Vec<_> = all.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        assert_eq!(db.count_posts(PostFilter::Author(leo.id)).await.unwrap(), 2);
        assert_eq!(db.count_posts(PostFilter::Group(group.id)).await.unwrap(), 1);

        let in_group = db.list_posts(PostFilter::Group(group.id), 10, 0).await.unwrap();
        assert_eq!(in_group[0].group.as_ref().map(|g| g.slug.as_str()), Some("cats"));
    }

    #[tokio::test]
    async fn test_followed_feed_only_has_followed_authors() {
        let (db, leo, tiger) = setup().await;
        let me = db.create_author("me", "").await.unwrap();
        db.create_post(new_post(&tiger, "tiger post", None)).await.unwrap();
        let mine = db.create_post(new_post(&me, "my post", None)).await.unwrap();

        db.create_follow(me.id, leo.id).await.unwrap();

        let feed = db.list_posts(PostFilter::FollowedBy(leo.id), 10, 0).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, mine.id);

        let empty = db.list_posts(PostFilter::FollowedBy(tiger.id), 10, 0).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_update_post_keeps_image_and_date() {
        let (db, leo, _) = setup().await;
        let post = db
            .create_post(NewPost {
                text: "with image".into(),
                author_id: leo.id,
                group_id: None,
                image: Some("posts/small.gif".into()),
            })
            .await
            .unwrap();

        let updated = db
            .update_post(
                post.id,
                PostChanges {
                    text: "edited".into(),
                    group_id: None,
                    image: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.text, "edited");
        assert_eq!(updated.image.as_deref(), Some("posts/small.gif"));
        assert_eq!(updated.pub_date, post.pub_date);
        assert_eq!(updated.author_id, leo.id);
    }

    #[tokio::test]
    async fn test_update_missing_post() {
        let (db, _, _) = setup().await;
        let err = db
            .update_post(
                404,
                PostChanges {
                    text: "x".into(),
                    group_id: None,
                    image: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_comments_and_cascade() {
        let (db, leo, tiger) = setup().await;
        let post = db.create_post(new_post(&leo, "post", None)).await.unwrap();
        let comment = db.create_comment(post.id, tiger.id, "Nice").await.unwrap();
        assert_eq!(comment.author.username, "tiger");

        let comments = db.list_comments(post.id).await.unwrap();
        assert_eq!(comments, vec![comment]);

        db.delete_post(post.id).await.unwrap();
        assert!(db.list_comments(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sessions_resolve_author() {
        let (db, leo, _) = setup().await;
        let token = db.create_session(leo.id).await.unwrap();
        assert_eq!(db.get_author_by_session(&token).await.unwrap(), Some(leo.clone()));
        assert_eq!(db.get_author_by_session("bogus").await.unwrap(), None);

        db.delete_author(leo.id).await.unwrap();
        assert_eq!(db.get_author_by_session(&token).await.unwrap(), None);
    }
}
