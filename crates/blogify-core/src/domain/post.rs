use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;
use crate::error::DomainError;

pub const VIEW_WEIGHT: i64 = 1;
pub const LIKE_WEIGHT: i64 = 5;
pub const COMMENT_WEIGHT: i64 = 10;

/// Ranking score derived from a post's engagement counters.
///
/// Always computed from the full counts; callers must never adjust a stored
/// score by a delta.
pub fn trending_score(views: i64, likes: i64, comments: i64) -> i64 {
    views * VIEW_WEIGHT + likes * LIKE_WEIGHT + comments * COMMENT_WEIGHT
}

/// Canonical form of a URL slug.
pub fn normalize_slug(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Publication status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Active,
    Draft,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Active => "active",
            PostStatus::Draft => "draft",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(PostStatus::Active),
            "draft" => Ok(PostStatus::Draft),
            other => Err(DomainError::Validation(format!(
                "Status must be 'active' or 'draft', got '{other}'."
            ))),
        }
    }
}

/// Listing order. Recency and trending are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    #[default]
    Recent,
    Trending,
}

/// Post entity - a blog article with its engagement counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub body: String,
    pub slug: String,
    pub cover_image_url: String,
    pub status: PostStatus,
    pub views: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub trending_score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with zeroed engagement.
    pub fn new(
        owner_id: Uuid,
        title: String,
        body: String,
        slug: &str,
        status: PostStatus,
        cover_image_url: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title,
            body,
            slug: normalize_slug(slug),
            cover_image_url,
            status,
            views: 0,
            like_count: 0,
            comment_count: 0,
            trending_score: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PostStatus::Active
    }

    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.owner_id == account_id
    }

    /// Owners and administrators may delete a post.
    pub fn can_be_deleted_by(&self, account_id: Uuid, role: Role) -> bool {
        self.is_owned_by(account_id) || role == Role::Admin
    }

    pub fn recompute_trending(&mut self) {
        self.trending_score = trending_score(self.views, self.like_count, self.comment_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post::new(
            Uuid::new_v4(),
            "Title".into(),
            "Body".into(),
            "  My-First-Post ",
            PostStatus::Active,
            "https://img/cover.webp".into(),
        )
    }

    #[test]
    fn test_trending_score_weights() {
        assert_eq!(trending_score(0, 0, 0), 0);
        assert_eq!(trending_score(7, 0, 0), 7);
        assert_eq!(trending_score(3, 2, 1), 3 + 10 + 10);
    }

    #[test]
    fn test_recompute_trending_uses_all_counters() {
        let mut post = sample_post();
        post.views = 10;
        post.like_count = 4;
        post.comment_count = 2;
        post.recompute_trending();
        assert_eq!(post.trending_score, 10 + 20 + 20);
    }

    #[test]
    fn test_new_post_normalizes_slug() {
        let post = sample_post();
        assert_eq!(post.slug, "my-first-post");
        assert_eq!(post.trending_score, 0);
    }

    #[test]
    fn test_delete_permissions() {
        let post = sample_post();
        let stranger = Uuid::new_v4();
        assert!(post.can_be_deleted_by(post.owner_id, Role::User));
        assert!(post.can_be_deleted_by(stranger, Role::Admin));
        assert!(!post.can_be_deleted_by(stranger, Role::User));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("draft".parse::<PostStatus>().unwrap(), PostStatus::Draft);
        assert!("published".parse::<PostStatus>().is_err());
    }
}
