//! In-memory image store - used when no Cloudinary credentials are configured.

use async_trait::async_trait;
use tokio::sync::RwLock;

use blogify_core::media::ImageUpload;
use blogify_core::ports::{MediaError, MediaStore, UploadedImage};

const LOCAL_BASE: &str = "https://res.cloudinary.com/local/image/upload/v1";

/// Keeps track of what was uploaded and destroyed; bytes are dropped.
#[derive(Default)]
pub struct InMemoryMediaStore {
    uploaded: RwLock<Vec<String>>,
    destroyed: RwLock<Vec<String>>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Public ids currently stored.
    pub async fn uploaded(&self) -> Vec<String> {
        self.uploaded.read().await.clone()
    }

    /// Public ids removed so far, in order.
    pub async fn destroyed(&self) -> Vec<String> {
        self.destroyed.read().await.clone()
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn upload(
        &self,
        folder: &str,
        key: &str,
        image: &ImageUpload,
    ) -> Result<UploadedImage, MediaError> {
        let public_id = format!("{folder}/{key}");
        tracing::debug!(%public_id, bytes = image.bytes.len(), "Stored image in memory");

        self.uploaded.write().await.push(public_id.clone());
        Ok(UploadedImage {
            url: format!("{LOCAL_BASE}/{public_id}.webp"),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        self.uploaded.write().await.retain(|id| id != public_id);
        self.destroyed.write().await.push(public_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogify_core::media::public_id_from_url;

    #[tokio::test]
    async fn test_uploaded_url_resolves_back_to_public_id() {
        let store = InMemoryMediaStore::new();
        let image = ImageUpload::new(vec![1, 2, 3], "cat.png", "image/png");

        let uploaded = store.upload("blogify_uploads", "1_cat", &image).await.unwrap();

        assert_eq!(uploaded.public_id, "blogify_uploads/1_cat");
        assert_eq!(
            public_id_from_url(&uploaded.url).as_deref(),
            Some("blogify_uploads/1_cat")
        );

        store.destroy(&uploaded.public_id).await.unwrap();
        assert!(store.uploaded().await.is_empty());
        assert_eq!(store.destroyed().await, vec!["blogify_uploads/1_cat"]);
    }
}
