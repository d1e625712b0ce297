//! Cover image upload and best-effort cleanup.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::media::{ImageUpload, UPLOAD_FOLDER, is_default_cover, public_id_from_url, storage_key};
use crate::ports::{MediaError, MediaStore, UploadedImage};

/// Uploads cover images and discards the ones nothing references any more.
#[derive(Clone)]
pub struct MediaPipeline {
    store: Arc<dyn MediaStore>,
}

impl MediaPipeline {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self { store }
    }

    /// Validate and upload an image under a fresh storage key.
    pub async fn upload(&self, image: &ImageUpload) -> Result<UploadedImage, MediaError> {
        image.validate()?;
        let key = storage_key(&image.file_name, Utc::now());
        let uploaded = self.store.upload(UPLOAD_FOLDER, &key, image).await?;
        tracing::info!(public_id = %uploaded.public_id, bytes = image.bytes.len(), "Cover image uploaded");
        Ok(uploaded)
    }

    /// Delete an image in a detached task. Failures are logged and dropped.
    pub fn discard(&self, public_id: String) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move {
            match store.destroy(&public_id).await {
                Ok(()) => tracing::debug!(public_id = %public_id, "Image deleted"),
                Err(e) => tracing::warn!(public_id = %public_id, error = %e, "Image cleanup failed"),
            }
        })
    }

    /// Discard the image behind a delivery URL, unless it is the shared placeholder
    /// or no identifier can be recovered from it.
    pub fn discard_url(&self, url: &str) -> Option<JoinHandle<()>> {
        if url.is_empty() || is_default_cover(url) {
            return None;
        }
        match public_id_from_url(url) {
            Some(public_id) => Some(self.discard(public_id)),
            None => {
                tracing::warn!(url = %url, "Could not derive image id from URL");
                None
            }
        }
    }
}
