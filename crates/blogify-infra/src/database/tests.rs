use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use blogify_core::domain::{Post, ViewRecord};
use blogify_core::ports::{BaseRepository, PostRepository, ViewRecordRepository};

use crate::database::entity::post::{self, StatusColumn};
use crate::database::postgres_repo::{PostgresPostRepository, PostgresViewRecordRepository};

fn post_model(id: Uuid, views: i64) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        owner_id: Uuid::new_v4(),
        title: "Test Post".to_owned(),
        body: "Content".to_owned(),
        slug: "test-post".to_owned(),
        cover_image_url: "https://res.cloudinary.com/demo/image/upload/v1/blogify_uploads/a.webp"
            .to_owned(),
        status: StatusColumn::Active,
        views,
        like_count: 0,
        comment_count: 0,
        trending_score: views,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, 3)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.views, 3);
}

#[tokio::test]
async fn test_increment_views_on_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(0)])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let err = repo.increment_views(Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(err, blogify_core::error::RepoError::NotFound));
}

#[tokio::test]
async fn test_claim_counts_only_when_marker_inserted() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // first claim: purge stale marker, insert succeeds
        .append_exec_results([exec(0), exec(1)])
        // second claim: a live marker covers it, nothing is inserted
        .append_exec_results([exec(0), exec(0)])
        .into_connection();

    let repo = PostgresViewRecordRepository::new(db);
    let post_id = Uuid::new_v4();
    let window = ViewRecord::default_window();

    let first = repo
        .claim(ViewRecord::new(post_id, "10.0.0.1", None), window)
        .await
        .unwrap();
    let second = repo
        .claim(ViewRecord::new(post_id, "10.0.0.1", None), window)
        .await
        .unwrap();

    assert!(first);
    assert!(!second);
}

#[tokio::test]
async fn test_toggle_like_removes_existing_like() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(1)])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let liked = repo
        .toggle_like(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();

    assert!(!liked);
}

#[tokio::test]
async fn test_toggle_like_adds_missing_like() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(0), exec(1)])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let liked = repo
        .toggle_like(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();

    assert!(liked);
}
