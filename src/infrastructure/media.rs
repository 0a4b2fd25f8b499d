// Storage for uploaded post images

use async_trait::async_trait;
use rand::{distr::Alphanumeric, Rng};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Directory (relative to the media root) holding post images
pub const POST_IMAGE_DIR: &str = "posts";

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `data` and return its path relative to the media root
    async fn save(&self, file_name: &str, data: &[u8]) -> AppResult<String>;

    /// Remove a previously saved image; a missing file is not an error
    async fn delete(&self, path: &str) -> AppResult<()>;
}

/// Filesystem-backed image store rooted at the media directory
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Reduce an uploaded file name to a safe single path component
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

fn with_random_suffix(file_name: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect();
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, suffix, ext),
        None => format!("{}_{}", file_name, suffix),
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, file_name: &str, data: &[u8]) -> AppResult<String> {
        let dir = self.root.join(POST_IMAGE_DIR);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Internal(format!("Failed to create media dir {}: {}", dir.display(), e))
        })?;

        let mut name = sanitize_file_name(file_name);
        while tokio::fs::metadata(dir.join(&name)).await.is_ok() {
            name = with_random_suffix(&sanitize_file_name(file_name));
        }

        let path = dir.join(&name);
        tokio::fs::write(&path, data).await.map_err(|e| {
            AppError::Internal(format!("Failed to write image {}: {}", path.display(), e))
        })?;

        info!("Stored image {} ({} bytes)", path.display(), data.len());
        Ok(format!("{}/{}", POST_IMAGE_DIR, name))
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let Some(name) = path.strip_prefix(POST_IMAGE_DIR).and_then(|rest| rest.strip_prefix('/'))
        else {
            return Err(AppError::BadRequest(format!("Not a post image path: {}", path)));
        };
        let full = self.root.join(POST_IMAGE_DIR).join(sanitize_file_name(name));
        match tokio::fs::remove_file(&full).await {
            Ok(()) => {
                info!("Removed image {}", full.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Image {} already gone", full.display());
                Ok(())
            }
            Err(e) => Err(AppError::Internal(format!(
                "Failed to remove image {}: {}",
                full.display(),
                e
            ))),
        }
    }
}
