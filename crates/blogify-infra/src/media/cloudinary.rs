//! Cloudinary image storage over the signed upload API.

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use blogify_core::media::ImageUpload;
use blogify_core::ports::{MediaError, MediaStore, UploadedImage};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Digest used for request signatures. Must match the account's setting;
/// Cloudinary accounts sign with SHA-1 unless switched to SHA-256.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    fn hex_digest(self, payload: &[u8]) -> String {
        match self {
            SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload)),
            SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload)),
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sha1" => Ok(SignatureAlgorithm::Sha1),
            "sha256" => Ok(SignatureAlgorithm::Sha256),
            other => Err(format!("unsupported signature algorithm `{other}`")),
        }
    }
}

/// Cloudinary credentials.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub signature_algorithm: SignatureAlgorithm,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Uploads are converted to WebP on the provider side.
pub struct CloudinaryMediaStore {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryMediaStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{API_BASE}/{}/image/{action}", self.config.cloud_name)
    }

    /// `digest("k1=v1&k2=v2..." + secret)` over the parameters sorted by key.
    fn sign(&self, params: &BTreeMap<&str, String>) -> String {
        let mut payload = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        payload.push_str(&self.config.api_secret);

        self.config.signature_algorithm.hex_digest(payload.as_bytes())
    }

    fn signed_form(&self, params: BTreeMap<&str, String>) -> Form {
        let signature = self.sign(&params);
        let mut form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (k, v) in params {
            form = form.text(k.to_string(), v);
        }
        form
    }
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(
        &self,
        folder: &str,
        key: &str,
        image: &ImageUpload,
    ) -> Result<UploadedImage, MediaError> {
        let params = BTreeMap::from([
            ("folder", folder.to_string()),
            ("format", "webp".to_string()),
            ("public_id", key.to_string()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ]);

        let file = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| MediaError::Upload(e.to_string()))?;
        let form = self.signed_form(params).part("file", file);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Upload(format!("{status}: {body}")));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Upload(e.to_string()))?;

        tracing::debug!(public_id = %uploaded.public_id, "Image uploaded");
        Ok(UploadedImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        let params = BTreeMap::from([
            ("public_id", public_id.to_string()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ]);

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .multipart(self.signed_form(params))
            .send()
            .await
            .map_err(|e| MediaError::Delete(e.to_string()))?;

        let outcome: DestroyResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Delete(e.to_string()))?;

        match outcome.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(MediaError::Delete(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_signing_with(signature_algorithm: SignatureAlgorithm) -> CloudinaryMediaStore {
        CloudinaryMediaStore::new(CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
            signature_algorithm,
        })
    }

    fn store() -> CloudinaryMediaStore {
        store_signing_with(SignatureAlgorithm::default())
    }

    fn upload_params() -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("timestamp", "1700000000".to_string()),
            ("folder", "blogify_uploads".to_string()),
        ])
    }

    const SIGNED_PAYLOAD: &[u8] = b"folder=blogify_uploads&timestamp=1700000000secret";

    #[test]
    fn test_default_signature_is_sha1_over_sorted_params_and_secret() {
        let expected = hex::encode(Sha1::digest(SIGNED_PAYLOAD));

        assert_eq!(store().sign(&upload_params()), expected);
        assert_eq!(expected.len(), 40);
    }

    #[test]
    fn test_sha256_signature_when_configured() {
        let store = store_signing_with(SignatureAlgorithm::Sha256);
        let expected = hex::encode(Sha256::digest(SIGNED_PAYLOAD));

        assert_eq!(store.sign(&upload_params()), expected);
    }

    #[test]
    fn test_parse_signature_algorithm() {
        assert_eq!("SHA256".parse(), Ok(SignatureAlgorithm::Sha256));
        assert_eq!(" sha1 ".parse(), Ok(SignatureAlgorithm::Sha1));
        assert!("md5".parse::<SignatureAlgorithm>().is_err());
    }

    #[test]
    fn test_endpoint_includes_cloud_name() {
        assert_eq!(
            store().endpoint("destroy"),
            "https://api.cloudinary.com/v1_1/demo/image/destroy"
        );
    }
}
