//! Object storage port for cover images.

use async_trait::async_trait;

use crate::media::ImageUpload;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Durable delivery URL.
    pub url: String,
    /// Provider identifier, used for deletion.
    pub public_id: String,
}

/// Image storage backend (Cloudinary, in-memory).
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `image` as `<folder>/<key>`, normalized to the provider's web format.
    async fn upload(
        &self,
        folder: &str,
        key: &str,
        image: &ImageUpload,
    ) -> Result<UploadedImage, MediaError>;

    /// Remove a previously uploaded image.
    async fn destroy(&self, public_id: &str) -> Result<(), MediaError>;
}

/// Media errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Invalid file type. Only images allowed.")]
    InvalidType,

    #[error("File too large. Max 5MB allowed.")]
    TooLarge,

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Delete failed: {0}")]
    Delete(String),
}
