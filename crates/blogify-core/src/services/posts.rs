//! Post publishing: create, edit, delete and list, with cover image rollback.

use std::sync::Arc;

use uuid::Uuid;

use super::MediaPipeline;
use crate::domain::{Post, PostStatus, Role, normalize_slug};
use crate::error::{DomainError, RepoError};
use crate::media::ImageUpload;
use crate::ports::{CommentRepository, MediaError, PostQuery, PostRepository};

/// Number of posts shown on the home page.
pub const TRENDING_LIMIT: u64 = 6;

/// Validated author input for a post.
#[derive(Debug, Clone)]
pub struct PostInput {
    pub title: String,
    pub body: String,
    pub slug: String,
    /// `None` keeps the current status on edit and means `active` on create.
    pub status: Option<PostStatus>,
}

impl PostInput {
    pub fn parse(
        title: Option<&str>,
        body: Option<&str>,
        slug: Option<&str>,
        status: Option<&str>,
    ) -> Result<Self, DomainError> {
        let title = title.map(str::trim).unwrap_or_default();
        let body = body.unwrap_or_default();
        if title.is_empty() || body.trim().is_empty() {
            return Err(DomainError::Validation("Title and Body are required.".into()));
        }

        let slug = normalize_slug(slug.unwrap_or_default());
        if slug.is_empty() {
            return Err(DomainError::Validation("Slug is missing.".into()));
        }

        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<PostStatus>()?),
            None => None,
        };

        Ok(Self {
            title: title.to_string(),
            body: body.to_string(),
            slug,
            status,
        })
    }
}

fn media_error(err: MediaError) -> DomainError {
    match err {
        MediaError::InvalidType | MediaError::TooLarge => DomainError::Validation(err.to_string()),
        other => DomainError::Upstream(other.to_string()),
    }
}

fn slug_conflict(err: RepoError, message: &str) -> DomainError {
    match err {
        RepoError::Constraint(_) => DomainError::Duplicate(message.to_string()),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    media: MediaPipeline,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        media: MediaPipeline,
    ) -> Self {
        Self {
            posts,
            comments,
            media,
        }
    }

    /// Upload the cover, then store the post. A failed insert discards the upload.
    pub async fn create(
        &self,
        owner_id: Uuid,
        input: PostInput,
        image: Option<ImageUpload>,
    ) -> Result<Post, DomainError> {
        let image =
            image.ok_or_else(|| DomainError::Validation("Cover image is required.".into()))?;
        let uploaded = self.media.upload(&image).await.map_err(media_error)?;

        let post = Post::new(
            owner_id,
            input.title,
            input.body,
            &input.slug,
            input.status.unwrap_or_default(),
            uploaded.url,
        );

        match self.posts.insert(post).await {
            Ok(post) => {
                tracing::info!(post_id = %post.id, slug = %post.slug, "Post created");
                Ok(post)
            }
            Err(e) => {
                self.media.discard(uploaded.public_id);
                Err(slug_conflict(e, "This URL Slug is taken."))
            }
        }
    }

    /// Load a post for its owner's edit form.
    pub async fn editable(&self, post_id: Uuid, actor_id: Uuid) -> Result<Post, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        if !post.is_owned_by(actor_id) {
            return Err(DomainError::Forbidden);
        }
        Ok(post)
    }

    /// Apply an edit. A replaced cover is deleted after the save succeeds;
    /// a freshly uploaded cover is deleted if the save fails.
    pub async fn update(
        &self,
        post_id: Uuid,
        actor_id: Uuid,
        input: PostInput,
        image: Option<ImageUpload>,
    ) -> Result<Post, DomainError> {
        let mut post = self.editable(post_id, actor_id).await?;
        let old_cover = post.cover_image_url.clone();

        post.title = input.title;
        post.body = input.body;
        post.slug = input.slug;
        post.status = input.status.unwrap_or(post.status);
        post.updated_at = chrono::Utc::now();

        let uploaded = match image {
            Some(image) => {
                let uploaded = self.media.upload(&image).await.map_err(media_error)?;
                post.cover_image_url = uploaded.url.clone();
                Some(uploaded)
            }
            None => None,
        };

        match self.posts.update_content(&post).await {
            Ok(saved) => {
                if uploaded.is_some() {
                    self.media.discard_url(&old_cover);
                }
                tracing::info!(post_id = %saved.id, "Post updated");
                Ok(saved)
            }
            Err(e) => {
                if let Some(uploaded) = uploaded {
                    self.media.discard(uploaded.public_id);
                }
                Err(slug_conflict(e, "Slug is already taken."))
            }
        }
    }

    /// Delete a post with its comments and cover image.
    pub async fn delete(
        &self,
        post_id: Uuid,
        actor_id: Uuid,
        actor_role: Role,
    ) -> Result<Post, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        if !post.can_be_deleted_by(actor_id, actor_role) {
            return Err(DomainError::Forbidden);
        }

        self.media.discard_url(&post.cover_image_url);
        self.posts.delete(post.id).await?;
        let removed = self.comments.delete_by_post(post.id).await?;
        tracing::info!(post_id = %post.id, comments_removed = removed, "Post deleted");

        Ok(post)
    }

    pub async fn by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        Ok(self.posts.find_by_slug(&normalize_slug(slug)).await?)
    }

    pub async fn by_id(&self, post_id: Uuid) -> Result<Option<Post>, DomainError> {
        Ok(self.posts.find_by_id(post_id).await?)
    }

    pub async fn by_owner(&self, owner_id: Uuid) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_owner(owner_id).await?)
    }

    /// Home page ranking.
    pub async fn trending(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list_active(&PostQuery::trending(TRENDING_LIMIT)).await?)
    }

    /// Public listing, newest first, optionally narrowed by a search term.
    pub async fn browse(&self, search: Option<&str>) -> Result<Vec<Post>, DomainError> {
        let query = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => PostQuery::search(term),
            None => PostQuery::recent(),
        };
        Ok(self.posts.list_active(&query).await?)
    }
}
