//! In-memory content store - used as fallback when no database is configured.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use blogify_core::domain::{Account, Comment, Post, PostSort, ViewRecord, trending_score};
use blogify_core::error::RepoError;
use blogify_core::ports::{
    AccountRepository, BaseRepository, CommentRepository, PostQuery, PostRepository,
    ViewRecordRepository,
};

#[derive(Default)]
struct Tables {
    accounts: HashMap<Uuid, Account>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    likes: HashSet<(Uuid, Uuid)>,
    views: Vec<ViewRecord>,
}

impl Tables {
    fn recount(&mut self, post_id: Uuid) -> Result<Post, RepoError> {
        let likes = self.likes.iter().filter(|(p, _)| *p == post_id).count() as i64;
        let comments = self
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .count() as i64;

        let post = self.posts.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        post.like_count = likes;
        post.comment_count = comments;
        post.trending_score = trending_score(post.views, likes, comments);
        Ok(post.clone())
    }
}

/// Every repository port over a single lock.
///
/// Unique email and slug are enforced the same way the database indexes do.
/// Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Naive token match standing in for Postgres full-text search.
fn matches_search(post: &Post, term: &str) -> bool {
    let haystack = format!("{} {}", post.title, post.body).to_lowercase();
    term.split_whitespace()
        .all(|word| haystack.contains(&word.to_lowercase()))
}

#[async_trait]
impl BaseRepository<Account, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, RepoError> {
        Ok(self.tables.read().await.accounts.get(&id).cloned())
    }

    async fn insert(&self, account: Account) -> Result<Account, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.accounts.values().any(|a| a.email == account.email) {
            return Err(RepoError::Constraint("accounts_email_key".into()));
        }
        tables.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.tables
            .write()
            .await
            .accounts
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Account>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.accounts.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.values().any(|p| p.slug == post.slug) {
            return Err(RepoError::Constraint("posts_slug_key".into()));
        }
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.posts.remove(&id).ok_or(RepoError::NotFound)?;
        tables.likes.retain(|(post_id, _)| *post_id != id);
        tables.views.retain(|v| v.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.values().find(|p| p.slug == slug).cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn list_active(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.is_active())
            .filter(|p| {
                query
                    .search
                    .as_deref()
                    .is_none_or(|term| matches_search(p, term))
            })
            .cloned()
            .collect();

        match query.sort {
            PostSort::Recent => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            PostSort::Trending => posts.sort_by(|a, b| b.trending_score.cmp(&a.trending_score)),
        }
        if let Some(limit) = query.limit {
            posts.truncate(limit as usize);
        }
        Ok(posts)
    }

    async fn update_content(&self, post: &Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .posts
            .values()
            .any(|p| p.id != post.id && p.slug == post.slug)
        {
            return Err(RepoError::Constraint("posts_slug_key".into()));
        }

        let stored = tables.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        stored.title = post.title.clone();
        stored.body = post.body.clone();
        stored.slug = post.slug.clone();
        stored.cover_image_url = post.cover_image_url.clone();
        stored.status = post.status;
        stored.updated_at = post.updated_at;
        Ok(stored.clone())
    }

    async fn increment_views(&self, post_id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let post = tables.posts.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        post.views += 1;
        Ok(())
    }

    async fn toggle_like(&self, post_id: Uuid, account_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post_id) {
            return Err(RepoError::NotFound);
        }
        let key = (post_id, account_id);
        if tables.likes.remove(&key) {
            Ok(false)
        } else {
            tables.likes.insert(key);
            Ok(true)
        }
    }

    async fn has_liked(&self, post_id: Uuid, account_id: Uuid) -> Result<bool, RepoError> {
        Ok(self
            .tables
            .read()
            .await
            .likes
            .contains(&(post_id, account_id)))
    }

    async fn refresh_engagement(&self, post_id: Uuid) -> Result<Post, RepoError> {
        self.tables.write().await.recount(post_id)
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Query("comment references a missing post".into()));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.tables
            .write()
            .await
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|_, c| c.post_id != post_id);
        Ok((before - tables.comments.len()) as u64)
    }
}

#[async_trait]
impl ViewRecordRepository for InMemoryStore {
    async fn claim(&self, record: ViewRecord, window: TimeDelta) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        let now = record.created_at;

        if tables
            .views
            .iter()
            .any(|v| v.covers(&record) && !v.is_expired_at(window, now))
        {
            return Ok(false);
        }

        tables.views.retain(|v| !v.same_key(&record));
        tables.views.push(record);
        Ok(true)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.views.len();
        tables.views.retain(|v| v.created_at > cutoff);
        Ok((before - tables.views.len()) as u64)
    }
}
