// PostService - writes performed on behalf of the signed-in author

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    error::AppResult,
    forms::ValidPost,
    infrastructure::{database::DatabaseInterface, media::ImageStore},
    models::{Author, Comment, NewPost, Post, PostChanges, PostId, PostView},
};

#[derive(Clone)]
pub struct PostService {
    db: Arc<dyn DatabaseInterface>,
    images: Arc<dyn ImageStore>,
}

impl PostService {
    pub fn new(db: Arc<dyn DatabaseInterface>, images: Arc<dyn ImageStore>) -> Self {
        Self { db, images }
    }

    async fn store_image(&self, form: &ValidPost) -> AppResult<Option<String>> {
        match &form.image {
            Some(upload) => Ok(Some(self.images.save(&upload.name, &upload.data).await?)),
            None => Ok(None),
        }
    }

    /// Drop an image stored for a write that did not go through
    async fn discard_image(&self, image: Option<String>) {
        if let Some(path) = image {
            if let Err(err) = self.images.delete(&path).await {
                warn!("Could not discard image {}: {}", path, err);
            }
        }
    }

    #[instrument(skip_all, fields(author = %author.username))]
    pub async fn publish(&self, author: &Author, form: ValidPost) -> AppResult<Post> {
        let image = self.store_image(&form).await?;
        let result = self
            .db
            .create_post(NewPost {
                text: form.text,
                author_id: author.id,
                group_id: form.group_id,
                image: image.clone(),
            })
            .await;

        match result {
            Ok(post) => {
                info!("Published post {}", post.id);
                Ok(post)
            }
            Err(err) => {
                self.discard_image(image).await;
                Err(err)
            }
        }
    }

    /// Apply an edit; the author and publication date never change, and the
    /// image is only replaced when a new one was uploaded.
    #[instrument(skip_all, fields(post_id = post.id))]
    pub async fn edit(&self, post: &PostView, form: ValidPost) -> AppResult<Post> {
        let image = self.store_image(&form).await?;
        let result = self
            .db
            .update_post(
                post.id,
                PostChanges {
                    text: form.text,
                    group_id: form.group_id,
                    image: image.clone(),
                },
            )
            .await;

        match result {
            Ok(updated) => {
                info!("Edited post {}", updated.id);
                Ok(updated)
            }
            Err(err) => {
                self.discard_image(image).await;
                Err(err)
            }
        }
    }

    #[instrument(skip_all, fields(post_id = post_id, author = %author.username))]
    pub async fn comment(&self, post_id: PostId, author: &Author, text: &str) -> AppResult<Comment> {
        self.db.create_comment(post_id, author.id, text).await
    }

    /// Subscribe `user` to `author`. Following yourself is skipped and an
    /// existing subscription is left alone; returns whether a row was created.
    #[instrument(skip_all, fields(user = %user.username, author = %author.username))]
    pub async fn follow(&self, user: &Author, author: &Author) -> AppResult<bool> {
        if user.id == author.id {
            return Ok(false);
        }
        self.db.create_follow(author.id, user.id).await
    }

    #[instrument(skip_all, fields(user = %user.username, author = %author.username))]
    pub async fn unfollow(&self, user: &Author, author: &Author) -> AppResult<bool> {
        self.db.delete_follow(author.id, user.id).await
    }

    pub async fn is_following(&self, user: &Author, author: &Author) -> AppResult<bool> {
        self.db.follow_exists(author.id, user.id).await
    }
}
