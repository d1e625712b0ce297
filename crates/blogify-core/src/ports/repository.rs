use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::domain::{Account, Comment, Post, PostSort, ViewRecord};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Unique-key collisions surface as `RepoError::Constraint`.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Account repository with domain-specific methods.
#[async_trait]
pub trait AccountRepository: BaseRepository<Account, Uuid> {
    /// Find an account by its email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepoError>;

    /// Load several accounts at once (authors of a listing).
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Account>, RepoError>;
}

/// Filter for public post listings. Only active posts are ever returned.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    /// Full-text search over title and body.
    pub search: Option<String>,
    pub sort: PostSort,
    pub limit: Option<u64>,
}

impl PostQuery {
    pub fn recent() -> Self {
        Self::default()
    }

    pub fn trending(limit: u64) -> Self {
        Self {
            search: None,
            sort: PostSort::Trending,
            limit: Some(limit),
        }
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// All posts of one owner, drafts included, newest first.
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Active posts only.
    async fn list_active(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError>;

    /// Persist title, body, slug, status, cover and `updated_at`.
    /// Engagement columns are left untouched.
    async fn update_content(&self, post: &Post) -> Result<Post, RepoError>;

    async fn increment_views(&self, post_id: Uuid) -> Result<(), RepoError>;

    /// Flip the account's membership in the like set; returns the new state.
    async fn toggle_like(&self, post_id: Uuid, account_id: Uuid) -> Result<bool, RepoError>;

    async fn has_liked(&self, post_id: Uuid, account_id: Uuid) -> Result<bool, RepoError>;

    /// Re-count likes and comments, recompute the trending score and persist it.
    async fn refresh_engagement(&self, post_id: Uuid) -> Result<Post, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments of a post, oldest first.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64, RepoError>;
}

/// Store of time-windowed view markers.
#[async_trait]
pub trait ViewRecordRepository: Send + Sync {
    /// Insert `record` unless a live record already covers it: any record for
    /// the same (post, IP) when `record` is a guest view, the same
    /// (post, IP, viewer) otherwise. Returns `true` when this call created the record.
    async fn claim(&self, record: ViewRecord, window: TimeDelta) -> Result<bool, RepoError>;

    /// Drop records created before `cutoff`.
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, RepoError>;
}
