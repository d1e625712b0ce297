use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use blogify_core::DomainError;
use blogify_core::domain::{PostStatus, Role};
use blogify_core::media::ImageUpload;
use blogify_core::ports::{CommentRepository, MediaStore, PostRepository};
use blogify_core::services::{EngagementService, MediaPipeline, PostInput, PostService};
use blogify_infra::{InMemoryMediaStore, InMemoryStore};

struct Fixture {
    media: Arc<InMemoryMediaStore>,
    posts: PostService,
    engagement: EngagementService,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let media = Arc::new(InMemoryMediaStore::new());
    let post_repo: Arc<dyn PostRepository> = store.clone();
    let comment_repo: Arc<dyn CommentRepository> = store.clone();
    let media_store: Arc<dyn MediaStore> = media.clone();

    Fixture {
        posts: PostService::new(
            post_repo.clone(),
            comment_repo.clone(),
            MediaPipeline::new(media_store),
        ),
        engagement: EngagementService::new(post_repo, comment_repo, store),
        media,
    }
}

fn input(slug: &str, status: Option<&str>) -> PostInput {
    PostInput::parse(Some("A title"), Some("Body text about ferris"), Some(slug), status).unwrap()
}

fn cover(name: &str) -> Option<ImageUpload> {
    Some(ImageUpload::new(vec![0u8; 64], name, "image/png"))
}

/// Cleanup runs detached; give it a few scheduler turns.
async fn destroyed_after_cleanup(media: &InMemoryMediaStore, expected: usize) -> Vec<String> {
    for _ in 0..50 {
        let destroyed = media.destroyed().await;
        if destroyed.len() >= expected {
            return destroyed;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    media.destroyed().await
}

#[tokio::test]
async fn create_requires_cover_image() {
    let f = fixture();

    let err = f
        .posts
        .create(Uuid::new_v4(), input("no-cover", None), None)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation(msg) if msg == "Cover image is required."));
}

#[tokio::test]
async fn create_rejects_non_image_before_upload() {
    let f = fixture();
    let pdf = ImageUpload::new(vec![1], "doc.pdf", "application/pdf");

    let err = f
        .posts
        .create(Uuid::new_v4(), input("pdf", None), Some(pdf))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation(msg) if msg == "Invalid file type. Only images allowed."));
    assert!(f.media.uploaded().await.is_empty());
}

#[tokio::test]
async fn duplicate_slug_discards_the_new_upload() {
    let f = fixture();
    let owner = Uuid::new_v4();

    let first = f
        .posts
        .create(owner, input("taken", None), cover("one.png"))
        .await
        .unwrap();
    let err = f
        .posts
        .create(owner, input("Taken", None), cover("two.png"))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Duplicate(msg) if msg == "This URL Slug is taken."));

    let destroyed = destroyed_after_cleanup(&f.media, 1).await;
    assert_eq!(destroyed.len(), 1);
    assert!(destroyed[0].ends_with("_two"));
    assert!(first.cover_image_url.contains("_one"));
}

#[tokio::test]
async fn update_by_non_owner_is_forbidden() {
    let f = fixture();
    let post = f
        .posts
        .create(Uuid::new_v4(), input("mine", None), cover("c.png"))
        .await
        .unwrap();

    let err = f
        .posts
        .update(post.id, Uuid::new_v4(), input("mine", None), None)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Forbidden));
}

#[tokio::test]
async fn update_with_new_cover_discards_old_one() {
    let f = fixture();
    let owner = Uuid::new_v4();
    let post = f
        .posts
        .create(owner, input("swap", None), cover("old.png"))
        .await
        .unwrap();

    let updated = f
        .posts
        .update(post.id, owner, input("swap", Some("draft")), cover("new.png"))
        .await
        .unwrap();

    assert_eq!(updated.status, PostStatus::Draft);
    assert!(updated.cover_image_url.contains("_new"));
    let destroyed = destroyed_after_cleanup(&f.media, 1).await;
    assert!(destroyed[0].ends_with("_old"));
}

#[tokio::test]
async fn update_to_taken_slug_is_duplicate() {
    let f = fixture();
    let owner = Uuid::new_v4();
    f.posts
        .create(owner, input("first", None), cover("a.png"))
        .await
        .unwrap();
    let second = f
        .posts
        .create(owner, input("second", None), cover("b.png"))
        .await
        .unwrap();

    let err = f
        .posts
        .update(second.id, owner, input("first", None), None)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Duplicate(msg) if msg == "Slug is already taken."));
}

#[tokio::test]
async fn delete_removes_comments_and_cover() {
    let f = fixture();
    let owner = Uuid::new_v4();
    let post = f
        .posts
        .create(owner, input("doomed", None), cover("doomed.png"))
        .await
        .unwrap();
    f.engagement
        .add_comment(post.id, Uuid::new_v4(), "bye")
        .await
        .unwrap();

    f.posts.delete(post.id, owner, Role::User).await.unwrap();

    assert!(f.posts.by_id(post.id).await.unwrap().is_none());
    assert!(f.engagement.comments_for(post.id).await.unwrap().is_empty());
    let destroyed = destroyed_after_cleanup(&f.media, 1).await;
    assert!(destroyed[0].ends_with("_doomed"));
}

#[tokio::test]
async fn admin_may_delete_any_post_but_others_may_not() {
    let f = fixture();
    let post = f
        .posts
        .create(Uuid::new_v4(), input("guarded", None), cover("g.png"))
        .await
        .unwrap();

    let err = f
        .posts
        .delete(post.id, Uuid::new_v4(), Role::User)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden));

    f.posts
        .delete(post.id, Uuid::new_v4(), Role::Admin)
        .await
        .unwrap();
}

#[tokio::test]
async fn drafts_stay_out_of_listings_and_search() {
    let f = fixture();
    let owner = Uuid::new_v4();
    f.posts
        .create(owner, input("live", None), cover("l.png"))
        .await
        .unwrap();
    f.posts
        .create(owner, input("hidden", Some("draft")), cover("h.png"))
        .await
        .unwrap();

    let listed = f.posts.browse(None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].slug, "live");

    let found = f.posts.browse(Some("ferris")).await.unwrap();
    assert_eq!(found.len(), 1);

    let trending = f.posts.trending().await.unwrap();
    assert!(trending.iter().all(|p| p.is_active()));

    assert_eq!(f.posts.by_owner(owner).await.unwrap().len(), 2);
}
