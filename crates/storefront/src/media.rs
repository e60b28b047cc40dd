//! Uploaded product images.
//!
//! Images are written to `<media_dir>/products/<uuid>.<ext>` and the path
//! relative to `media_dir` is what gets stored on the product row. The
//! router serves `media_dir` at `/media`.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use uuid::Uuid;

/// Subdirectory of the media dir holding product images.
pub const PRODUCT_IMAGE_DIR: &str = "products";

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Message for a file that is not an image we accept.
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// A file taken from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Lowercased extension if the upload looks like an accepted image.
    ///
    /// # Errors
    ///
    /// Returns [`INVALID_IMAGE`] for an empty file, a non-image content type
    /// or an extension outside jpg, jpeg, png, gif and webp.
    pub fn extension(&self) -> Result<String, &'static str> {
        if self.bytes.is_empty() {
            return Err(INVALID_IMAGE);
        }
        if let Some(content_type) = &self.content_type
            && !content_type.starts_with("image/")
        {
            return Err(INVALID_IMAGE);
        }
        let ext = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or(INVALID_IMAGE)?;
        if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(INVALID_IMAGE)
        }
    }
}

/// Write an upload under the media dir and return its stored relative path.
///
/// # Errors
///
/// Returns an I/O error if the directory or file cannot be written.
pub async fn save_product_image(
    media_dir: &Path,
    upload: &ImageUpload,
    ext: &str,
) -> std::io::Result<String> {
    let dir = media_dir.join(PRODUCT_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let file_name = format!("{}.{ext}", Uuid::new_v4());
    tokio::fs::write(dir.join(&file_name), &upload.bytes).await?;

    let relative = format!("{PRODUCT_IMAGE_DIR}/{file_name}");
    tracing::info!(path = %relative, size = upload.bytes.len(), "product image saved");
    Ok(relative)
}

/// Best-effort delete of a stored image, for rollback after a failed write.
pub async fn remove_product_image(media_dir: &Path, relative: &str) {
    let path: PathBuf = media_dir.join(relative);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove product image");
    }
}
