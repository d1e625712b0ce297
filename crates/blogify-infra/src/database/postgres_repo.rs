//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use blogify_core::domain::{Account, Comment, Post, PostSort, ViewRecord, trending_score};
use blogify_core::error::RepoError;
use blogify_core::ports::{
    AccountRepository, CommentRepository, PostQuery, PostRepository, ViewRecordRepository,
};

use super::entity::account::{self, Entity as AccountEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity, StatusColumn};
use super::entity::post_like::{self, Entity as PostLikeEntity};
use super::entity::view_record::{self, Entity as ViewRecordEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL account repository.
pub type PostgresAccountRepository = PostgresBaseRepository<AccountEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL view record store.
pub type PostgresViewRecordRepository = PostgresBaseRepository<ViewRecordEntity>;

/// Full-text match over title and body, backed by the GIN index of the same expression.
const SEARCH_EXPR: &str =
    "to_tsvector('english', title || ' ' || body) @@ plainto_tsquery('english', $1)";

/// Insert a view marker unless a live one covers it. `$7` marks a guest view,
/// which any marker on the same (post, IP) covers; the unique key settles races
/// between identical viewers.
const CLAIM_VIEW_SQL: &str = r#"
INSERT INTO view_records (id, post_id, viewer_id, ip_address, created_at)
SELECT $1, $2, $3, $4, $5
WHERE NOT EXISTS (
    SELECT 1 FROM view_records
    WHERE post_id = $2 AND ip_address = $4 AND created_at > $6
      AND ($7 OR viewer_id = $3)
)
ON CONFLICT (post_id, ip_address, viewer_id) DO NOTHING
"#;

/// Mask an email for logging to avoid PII in logs.
pub(crate) fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}{domain}")
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepoError> {
        tracing::debug!(account_email = %mask_email(email), "Finding account by email");

        let result = AccountEntity::find()
            .filter(account::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Account>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = AccountEntity::find()
            .filter(account::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::OwnerId.eq(owner_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_active(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        let mut select = PostEntity::find().filter(post::Column::Status.eq(StatusColumn::Active));

        if let Some(term) = &query.search {
            select = select.filter(Expr::cust_with_values(SEARCH_EXPR, [term.clone()]));
        }

        select = match query.sort {
            PostSort::Recent => select.order_by_desc(post::Column::CreatedAt),
            PostSort::Trending => select.order_by_desc(post::Column::TrendingScore),
        };

        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        let result = select.all(&self.db).await.map_err(map_db_err)?;
        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn update_content(&self, post: &Post) -> Result<Post, RepoError> {
        let active = post::ActiveModel {
            id: ActiveValue::Unchanged(post.id),
            title: Set(post.title.clone()),
            body: Set(post.body.clone()),
            slug: Set(post.slug.clone()),
            cover_image_url: Set(post.cover_image_url.clone()),
            status: Set(post.status.into()),
            updated_at: Set(post.updated_at.into()),
            ..Default::default()
        };

        let model = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn increment_views(&self, post_id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::Views, Expr::cust("views + 1"))
            .filter(post::Column::Id.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn toggle_like(&self, post_id: Uuid, account_id: Uuid) -> Result<bool, RepoError> {
        let removed = PostLikeEntity::delete_many()
            .filter(post_like::Column::PostId.eq(post_id))
            .filter(post_like::Column::AccountId.eq(account_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if removed.rows_affected > 0 {
            return Ok(false);
        }

        let like = post_like::ActiveModel {
            post_id: Set(post_id),
            account_id: Set(account_id),
            created_at: Set(Utc::now().into()),
        };

        PostLikeEntity::insert(like)
            .on_conflict(
                OnConflict::columns([post_like::Column::PostId, post_like::Column::AccountId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(true)
    }

    async fn has_liked(&self, post_id: Uuid, account_id: Uuid) -> Result<bool, RepoError> {
        let count = PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .filter(post_like::Column::AccountId.eq(account_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }

    async fn refresh_engagement(&self, post_id: Uuid) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        // Row lock keeps a concurrent view increment from slipping between read and write.
        let current = PostEntity::find_by_id(post_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let likes = PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&txn)
            .await
            .map_err(map_db_err)? as i64;
        let comments = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .count(&txn)
            .await
            .map_err(map_db_err)? as i64;

        let active = post::ActiveModel {
            id: ActiveValue::Unchanged(post_id),
            like_count: Set(likes),
            comment_count: Set(comments),
            trending_score: Set(trending_score(current.views, likes, comments)),
            ..Default::default()
        };
        let model = active.update(&txn).await.map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;
        Ok(model.into())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let result = CommentEntity::delete_many()
            .filter(comment::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }
}

#[async_trait]
impl ViewRecordRepository for PostgresViewRecordRepository {
    async fn claim(&self, record: ViewRecord, window: TimeDelta) -> Result<bool, RepoError> {
        let cutoff = record.created_at - window;

        // An expired marker for this key would otherwise block the insert below.
        ViewRecordEntity::delete_many()
            .filter(view_record::Column::PostId.eq(record.post_id))
            .filter(view_record::Column::IpAddress.eq(record.ip_address.clone()))
            .filter(view_record::Column::ViewerId.eq(record.viewer_id()))
            .filter(view_record::Column::CreatedAt.lte(cutoff))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        let guest = record.account_id.is_none();
        let viewer_id = record.viewer_id();
        let inserted = self
            .db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                CLAIM_VIEW_SQL,
                [
                    record.id.into(),
                    record.post_id.into(),
                    viewer_id.into(),
                    record.ip_address.into(),
                    record.created_at.into(),
                    cutoff.into(),
                    guest.into(),
                ],
            ))
            .await
            .map_err(map_db_err)?
            .rows_affected();

        Ok(inserted == 1)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, RepoError> {
        let result = ViewRecordEntity::delete_many()
            .filter(view_record::Column::CreatedAt.lte(cutoff))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }
}
