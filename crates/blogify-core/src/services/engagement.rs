//! Views, likes, comments and the trending score that summarizes them.
//!
//! Every path that changes a counter ends in `PostRepository::refresh_engagement`,
//! which recomputes the score from the stored counts.

use std::sync::Arc;

use chrono::TimeDelta;
use uuid::Uuid;

use crate::domain::{Comment, Post, ViewRecord};
use crate::error::DomainError;
use crate::ports::{CommentRepository, PostRepository, ViewRecordRepository};

/// Result of reading a post.
#[derive(Debug, Clone)]
pub struct ViewOutcome {
    /// Whether this read incremented the view counter.
    pub counted: bool,
    pub post: Post,
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub likes: i64,
    pub is_liked: bool,
}

/// What a comment deletion request ended up doing.
#[derive(Debug, Clone)]
pub enum CommentRemoval {
    Removed(Post),
    /// The caller is neither the comment's author nor the post's owner.
    NotPermitted,
    NotFound,
}

#[derive(Clone)]
pub struct EngagementService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    views: Arc<dyn ViewRecordRepository>,
    window: TimeDelta,
}

impl EngagementService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        views: Arc<dyn ViewRecordRepository>,
    ) -> Self {
        Self {
            posts,
            comments,
            views,
            window: ViewRecord::default_window(),
        }
    }

    pub fn with_window(mut self, window: TimeDelta) -> Self {
        self.window = window;
        self
    }

    /// Count a view of `post` unless this (IP, account) pair already viewed it
    /// within the dedup window. A guest is matched on IP alone.
    ///
    /// The marker is claimed first; the store's uniqueness guard decides which of
    /// two concurrent readers gets to increment.
    pub async fn record_view(
        &self,
        post: Post,
        ip_address: &str,
        account_id: Option<Uuid>,
    ) -> Result<ViewOutcome, DomainError> {
        let record = ViewRecord::new(post.id, ip_address, account_id);
        let claimed = self.views.claim(record, self.window).await?;

        if !claimed {
            tracing::debug!(post_id = %post.id, "View already counted in window");
            return Ok(ViewOutcome {
                counted: false,
                post,
            });
        }

        if let Err(e) = self.posts.increment_views(post.id).await {
            // The marker stays, so this reader is not counted again until it expires.
            tracing::warn!(post_id = %post.id, error = %e, "View claimed but not counted");
            return Err(e.into());
        }
        let post = self.posts.refresh_engagement(post.id).await?;
        tracing::debug!(post_id = %post.id, views = post.views, score = post.trending_score, "View counted");

        Ok(ViewOutcome {
            counted: true,
            post,
        })
    }

    /// Like if not liked, unlike otherwise.
    pub async fn toggle_like(
        &self,
        post_id: Uuid,
        account_id: Uuid,
    ) -> Result<LikeOutcome, DomainError> {
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::not_found("post", post_id));
        }

        let is_liked = self.posts.toggle_like(post_id, account_id).await?;
        let post = self.posts.refresh_engagement(post_id).await?;

        Ok(LikeOutcome {
            likes: post.like_count,
            is_liked,
        })
    }

    pub async fn is_liked_by(&self, post_id: Uuid, account_id: Uuid) -> Result<bool, DomainError> {
        Ok(self.posts.has_liked(post_id, account_id).await?)
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<(Comment, Post), DomainError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::Validation("Comment cannot be empty.".into()));
        }
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::not_found("post", post_id));
        }

        let comment = self
            .comments
            .insert(Comment::new(post_id, author_id, content.to_string()))
            .await?;
        let post = self.posts.refresh_engagement(post_id).await?;

        Ok((comment, post))
    }

    pub async fn remove_comment(
        &self,
        comment_id: Uuid,
        actor_id: Uuid,
    ) -> Result<CommentRemoval, DomainError> {
        let Some(comment) = self.comments.find_by_id(comment_id).await? else {
            return Ok(CommentRemoval::NotFound);
        };
        let Some(post) = self.posts.find_by_id(comment.post_id).await? else {
            return Ok(CommentRemoval::NotFound);
        };

        if !comment.can_be_deleted_by(actor_id, post.owner_id) {
            tracing::warn!(comment_id = %comment_id, actor_id = %actor_id, "Comment deletion refused");
            return Ok(CommentRemoval::NotPermitted);
        }

        self.comments.delete(comment_id).await?;
        let post = self.posts.refresh_engagement(post.id).await?;
        Ok(CommentRemoval::Removed(post))
    }

    pub async fn comments_for(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        Ok(self.comments.find_by_post(post_id).await?)
    }
}
