//! Cover image rules: upload validation, storage keys, and URL handling.

use chrono::{DateTime, Utc};

use crate::ports::MediaError;

/// Logical folder every cover image is stored under.
pub const UPLOAD_FOLDER: &str = "blogify_uploads";

/// Largest accepted upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Substring identifying the shared placeholder cover, which is never deleted.
pub const DEFAULT_COVER_MARKER: &str = "default-cover";

/// An image received from a client, held in memory.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    /// Reject wrong types and oversized files before anything leaves the process.
    pub fn validate(&self) -> Result<(), MediaError> {
        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(MediaError::InvalidType);
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(MediaError::TooLarge);
        }
        Ok(())
    }
}

/// Build a collision-resistant storage key: `<millis>_<sanitized stem>`.
pub fn storage_key(file_name: &str, now: DateTime<Utc>) -> String {
    let stem = match file_name.rfind('.') {
        Some(pos) if pos + 1 < file_name.len() && !file_name[pos + 1..].contains('/') => {
            &file_name[..pos]
        }
        _ => file_name,
    };

    let safe: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{}_{}", now.timestamp_millis(), safe)
}

/// Recover the provider's storage identifier from a delivery URL.
///
/// `https://res.cloudinary.com/demo/image/upload/v1712/blogify_uploads/abc.webp`
/// yields `blogify_uploads/abc`. URLs without an `/upload/` marker fall back to
/// `<second-to-last segment>/<last segment stem>`.
pub fn public_id_from_url(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }

    if let Some(id) = parse_upload_path(url) {
        return Some(id);
    }

    let mut parts = url.rsplit('/');
    let file_name = parts.next()?;
    let folder = parts.next()?;
    let stem = file_name.split('.').next().unwrap_or(file_name);
    if stem.is_empty() {
        return None;
    }
    Some(format!("{folder}/{stem}"))
}

fn parse_upload_path(url: &str) -> Option<String> {
    let start = url.find("/upload/")? + "/upload/".len();
    let mut rest = &url[start..];

    if let Some(after_v) = rest.strip_prefix('v') {
        if let Some(slash) = after_v.find('/') {
            let is_version = slash > 0 && after_v[..slash].bytes().all(|b| b.is_ascii_digit());
            if is_version && slash + 1 < after_v.len() {
                rest = &after_v[slash + 1..];
            }
        }
    }

    let dot = rest.rfind('.')?;
    let (id, ext) = (&rest[..dot], &rest[dot + 1..]);
    let ext_ok = !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if id.is_empty() || !ext_ok {
        return None;
    }
    Some(id.to_string())
}

pub fn is_default_cover(url: &str) -> bool {
    url.contains(DEFAULT_COVER_MARKER)
}

/// Delivery size presets for rendered cover images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageVariant {
    Card,
    Detail,
    Mobile,
    Auto,
}

impl ImageVariant {
    pub fn from_name(name: &str) -> Self {
        match name {
            "card" => ImageVariant::Card,
            "detail" => ImageVariant::Detail,
            "mobile" => ImageVariant::Mobile,
            _ => ImageVariant::Auto,
        }
    }

    fn transformation(&self) -> &'static str {
        match self {
            ImageVariant::Card => "w_800,c_fill,q_auto:good,f_auto,e_sharpen:20",
            ImageVariant::Detail => "w_1920,c_limit,q_auto:good,f_auto,e_sharpen:20",
            ImageVariant::Mobile => "w_800,c_limit,q_auto:good,f_auto",
            ImageVariant::Auto => "q_auto,f_auto",
        }
    }
}

/// Insert a CDN transformation after `/upload/`. Foreign URLs pass through.
pub fn optimize_image_url(url: &str, variant: ImageVariant) -> String {
    if !url.contains("cloudinary.com") {
        return url.to_string();
    }
    match url.find("/upload/") {
        Some(idx) => {
            let split = idx + "/upload/".len();
            format!("{}{}/{}", &url[..split], variant.transformation(), &url[split..])
        }
        None => url.to_string(),
    }
}
