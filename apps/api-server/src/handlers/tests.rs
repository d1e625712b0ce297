use std::sync::Arc;

use actix_web::{App, cookie::Cookie, http::header, test, web};
use serde_json::{Value, json};

use blogify_core::domain::{Account, Post, PostStatus};
use blogify_core::media::ImageUpload;
use blogify_core::ports::{Mailer, SessionIdentity};
use blogify_core::services::{MailSettings, PostInput};
use blogify_infra::{InMemoryMailer, InMemoryMediaStore, JwtConfig};

use super::{configure_routes, json_config, multipart_config};
use crate::config::AppConfig;
use crate::middleware::auth::CheckAuthentication;
use crate::state::{AppState, Stores};
use crate::views;

fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        database: None,
        jwt: JwtConfig {
            secret: "handler-test-secret".into(),
            expiration_hours: 1,
            issuer: "blogify".into(),
        },
        session_cookie: "uid".into(),
        cloudinary: None,
        resend_api_key: None,
        mail: MailSettings {
            from: "Blogify Team <team@blogify.test>".into(),
            contact_inbox: "inbox@blogify.test".into(),
            base_url: "http://localhost:8000".into(),
        },
        templates_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/templates").into(),
        tinymce_api_key: "test-key".into(),
        scheduler_enabled: false,
        json_logs: false,
        production: false,
    }
}

fn build_state(media: Arc<InMemoryMediaStore>, mailer: Option<Arc<dyn Mailer>>) -> AppState {
    let config = test_config();
    let templates = views::load_templates(&config.templates_glob()).unwrap();
    AppState::assemble(&config, Stores::in_memory(), media, mailer, templates)
}

fn test_state(mailer: Option<Arc<dyn Mailer>>) -> AppState {
    build_state(Arc::new(InMemoryMediaStore::new()), mailer)
}

fn test_state_with_media(media: Arc<InMemoryMediaStore>) -> AppState {
    build_state(media, None)
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(CheckAuthentication::new(
                    $state.tokens.clone(),
                    &$state.site.session_cookie,
                ))
                .app_data(web::Data::new($state.clone()))
                .app_data(multipart_config())
                .app_data(json_config())
                .configure(configure_routes),
        )
        .await
    };
}

async fn register(state: &AppState, name: &str, email: &str) -> (Account, Cookie<'static>) {
    let account = Account::new(name.into(), email.into(), "unused-hash".into());
    let account = state.accounts.insert(account).await.unwrap();
    let token = state
        .tokens
        .generate_token(&SessionIdentity::from(&account))
        .unwrap();
    (account, Cookie::new("uid", token))
}

async fn publish(state: &AppState, owner: &Account, slug: &str, status: &str) -> Post {
    let input = PostInput::parse(
        Some("A Day in the Hills"),
        Some("<p>Fog, then sun.</p>"),
        Some(slug),
        Some(status),
    )
    .unwrap();
    let image = ImageUpload::new(vec![0u8; 32], "hills.png", "image/png");
    state.posts.create(owner.id, input, Some(image)).await.unwrap()
}

#[actix_web::test]
async fn test_health_reports_active() {
    let state = test_state(None);
    let app = app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({"status": "active", "server": "Blogify"}));
}

#[actix_web::test]
async fn test_duplicate_signup_is_rejected() {
    let state = test_state(None);
    let app = app!(state);
    let payload = json!({"fullName": "Ada", "email": "ada@example.com", "password": "pw-123456"});

    let req = test::TestRequest::post()
        .uri("/user/signup")
        .set_json(&payload)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 201);
    assert!(res.response().cookies().any(|c| c.name() == "uid"));

    let req = test::TestRequest::post()
        .uri("/user/signup")
        .set_json(&payload)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 400);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({"error": "Email is already registered."}));
}

#[actix_web::test]
async fn test_signup_requires_every_field() {
    let state = test_state(None);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/user/signup")
        .set_json(json!({"fullName": "Ada", "email": "ada@example.com"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 400);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "All fields are required.");
}

#[actix_web::test]
async fn test_login_after_signup() {
    let state = test_state(None);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/user/signup")
        .set_json(json!({"fullName": "Ada", "email": "ada@example.com", "password": "pw-123456"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/user/login")
        .set_json(json!({"email": "ada@example.com", "password": "wrong"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 401);

    let req = test::TestRequest::post()
        .uri("/user/login")
        .set_json(json!({"email": "ada@example.com", "password": "pw-123456"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 200);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({"status": "success", "redirect": "/"}));
}

#[actix_web::test]
async fn test_guest_like_gets_json_401() {
    let state = test_state(None);
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/blog/like/{}", uuid::Uuid::new_v4()))
        .insert_header((header::ACCEPT, "application/json"))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 401);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body,
        json!({"error": "Please log in to continue.", "redirect": "/user/login"})
    );
}

#[actix_web::test]
async fn test_guest_add_blog_redirects_to_login() {
    let state = test_state(None);
    let app = app!(state);

    let req = test::TestRequest::get().uri("/blog/add-blog").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 302);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/user/login");
}

#[actix_web::test]
async fn test_non_owner_edit_redirects_home() {
    let state = test_state(None);
    let (owner, _) = register(&state, "Owner", "owner@example.com").await;
    let (_, intruder) = register(&state, "Intruder", "intruder@example.com").await;
    let post = publish(&state, &owner, "hills", "active").await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/blog/edit/{}", post.id))
        .cookie(intruder.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 302);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/");

    let req = test::TestRequest::get()
        .uri(&format!("/blog/delete/{}", post.id))
        .cookie(intruder)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 302);

    let unchanged = state.posts.by_id(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, post.title);
}

#[actix_web::test]
async fn test_guest_double_visit_counts_once() {
    let state = test_state(None);
    let (owner, _) = register(&state, "Owner", "owner@example.com").await;
    publish(&state, &owner, "hills", "active").await;
    let app = app!(state);

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/blog/hills")
            .peer_addr("127.0.0.1:4242".parse().unwrap())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
    }

    let post = state.posts.by_slug("hills").await.unwrap().unwrap();
    assert_eq!(post.views, 1);
    assert_eq!(post.trending_score, 1);
}

#[actix_web::test]
async fn test_like_toggles_for_member() {
    let state = test_state(None);
    let (owner, cookie) = register(&state, "Owner", "owner@example.com").await;
    let post = publish(&state, &owner, "hills", "active").await;
    let app = app!(state);

    let mut seen = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri(&format!("/blog/like/{}", post.id))
            .cookie(cookie.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        seen.push(body);
    }

    assert_eq!(seen[0], json!({"status": "success", "likes": 1, "isLiked": true}));
    assert_eq!(seen[1], json!({"status": "success", "likes": 0, "isLiked": false}));
}

#[actix_web::test]
async fn test_comment_redirects_back_to_post() {
    let state = test_state(None);
    let (owner, cookie) = register(&state, "Owner", "owner@example.com").await;
    let post = publish(&state, &owner, "hills", "active").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/blog/comment/{}", post.id))
        .cookie(cookie)
        .set_form([("content", "Lovely walk.")])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 302);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/blog/hills");
    let post = state.posts.by_id(post.id).await.unwrap().unwrap();
    assert_eq!(post.comment_count, 1);
    assert_eq!(post.trending_score, 10);
}

#[actix_web::test]
async fn test_drafts_stay_out_of_listing() {
    let state = test_state(None);
    let (owner, _) = register(&state, "Owner", "owner@example.com").await;
    let draft = publish(&state, &owner, "secret-plans", "draft").await;
    assert_eq!(draft.status, PostStatus::Draft);
    let app = app!(state);

    let req = test::TestRequest::get().uri("/blog/all").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8_lossy(&body);

    assert!(!html.contains("/blog/secret-plans"));
}

#[actix_web::test]
async fn test_unknown_route_renders_404_page() {
    let state = test_state(None);
    let app = app!(state);

    let req = test::TestRequest::get().uri("/no/such/page").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 404);

    let req = test::TestRequest::get().uri("/blog/missing-post").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 404);
}

#[actix_web::test]
async fn test_contact_without_mailer_reports_missing_config() {
    let state = test_state(None);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/contact")
        .set_json(json!({"name": "Ada", "email": "ada@example.com", "topic": "Hi", "message": "Hello"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 500);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "Server Email Configuration Missing");
}

#[actix_web::test]
async fn test_subscribe_sends_welcome_mail() {
    let mailer = Arc::new(InMemoryMailer::new());
    let state = test_state(Some(mailer.clone() as Arc<dyn Mailer>));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/subscribe")
        .set_json(json!({"email": "reader@example.com"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({"status": "success", "message": "Subscribed successfully!"}));
    let outbox = mailer.outbox().await;
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].to, "reader@example.com");
}

#[actix_web::test]
async fn test_logout_clears_cookie() {
    let state = test_state(None);
    let (_, cookie) = register(&state, "Ada", "ada@example.com").await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/user/logout")
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 302);
    let removal = res.response().cookies().find(|c| c.name() == "uid").unwrap();
    assert_eq!(removal.value(), "");
}

const BOUNDARY: &str = "blogify-form-boundary";

struct CoverFile<'a> {
    name: &'a str,
    content_type: &'a str,
    bytes: Vec<u8>,
}

/// Encode text fields plus an optional `coverImage` part as `multipart/form-data`.
fn post_form(fields: &[(&str, &str)], cover: Option<CoverFile<'_>>) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = cover {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"coverImage\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

fn png(name: &str, size: usize) -> Option<CoverFile<'_>> {
    Some(CoverFile {
        name,
        content_type: "image/png",
        bytes: vec![7u8; size],
    })
}

const MEADOW_FIELDS: [(&str, &str); 4] = [
    ("title", "Meadow Notes"),
    ("body", "<p>Clover everywhere.</p>"),
    ("slug", "meadow-notes"),
    ("status", "active"),
];

async fn destroyed_soon(media: &InMemoryMediaStore, expected: usize) -> Vec<String> {
    for _ in 0..50 {
        let destroyed = media.destroyed().await;
        if destroyed.len() >= expected {
            return destroyed;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    media.destroyed().await
}

#[actix_web::test]
async fn test_add_blog_uploads_cover_and_publishes() {
    let media = Arc::new(InMemoryMediaStore::new());
    let state = test_state_with_media(media.clone());
    let (author, cookie) = register(&state, "Author", "author@example.com").await;
    let app = app!(state);

    let (content_type, body) = post_form(&MEADOW_FIELDS, png("meadow.png", 1024));
    let req = test::TestRequest::post()
        .uri("/blog/add-blog")
        .cookie(cookie)
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 201);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({"status": "success", "redirect": "/blog/meadow-notes"}));

    let post = state.posts.by_slug("meadow-notes").await.unwrap().unwrap();
    assert_eq!(post.owner_id, author.id);
    let uploaded = media.uploaded().await;
    assert_eq!(uploaded.len(), 1);
    assert!(uploaded[0].starts_with("blogify_uploads/"));
    assert!(uploaded[0].ends_with("_meadow"));
    assert!(post.cover_image_url.contains(&uploaded[0]));
}

#[actix_web::test]
async fn test_add_blog_rejects_oversized_cover() {
    let media = Arc::new(InMemoryMediaStore::new());
    let state = test_state_with_media(media.clone());
    let (_, cookie) = register(&state, "Author", "author@example.com").await;
    let app = app!(state);

    // Past the 5 MiB image rule but under the field cap, then past the field cap.
    for size in [5 * 1024 * 1024 + 512 * 1024, 7 * 1024 * 1024] {
        let (content_type, body) = post_form(&MEADOW_FIELDS, png("huge.png", size));
        let req = test::TestRequest::post()
            .uri("/blog/add-blog")
            .cookie(cookie.clone())
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 400, "size {size}");
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({"error": "File too large. Max 5MB allowed."}));
    }

    assert!(media.uploaded().await.is_empty());
    assert!(state.posts.by_slug("meadow-notes").await.unwrap().is_none());
}

#[actix_web::test]
async fn test_add_blog_rejects_non_image_cover() {
    let media = Arc::new(InMemoryMediaStore::new());
    let state = test_state_with_media(media.clone());
    let (_, cookie) = register(&state, "Author", "author@example.com").await;
    let app = app!(state);

    let notes = Some(CoverFile {
        name: "notes.txt",
        content_type: "text/plain",
        bytes: b"not a picture".to_vec(),
    });
    let (content_type, body) = post_form(&MEADOW_FIELDS, notes);
    let req = test::TestRequest::post()
        .uri("/blog/add-blog")
        .cookie(cookie)
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 400);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({"error": "Invalid file type. Only images allowed."}));
    assert!(media.uploaded().await.is_empty());
}

#[actix_web::test]
async fn test_edit_swaps_cover_and_discards_old_one() {
    let media = Arc::new(InMemoryMediaStore::new());
    let state = test_state_with_media(media.clone());
    let (author, cookie) = register(&state, "Author", "author@example.com").await;
    let post = publish(&state, &author, "hills", "active").await;
    let app = app!(state);

    let fields = [
        ("title", "A Day in the Hills, Revised"),
        ("body", "<p>Fog, then rain.</p>"),
        ("slug", "hills"),
        ("status", "active"),
    ];
    let (content_type, body) = post_form(&fields, png("valley.png", 2048));
    let req = test::TestRequest::post()
        .uri(&format!("/blog/edit/{}", post.id))
        .cookie(cookie)
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 200);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({"status": "success", "redirect": "/blog/hills"}));

    let updated = state.posts.by_id(post.id).await.unwrap().unwrap();
    assert_eq!(updated.title, "A Day in the Hills, Revised");
    assert_ne!(updated.cover_image_url, post.cover_image_url);
    assert!(updated.cover_image_url.contains("_valley"));

    let destroyed = destroyed_soon(&media, 1).await;
    assert_eq!(destroyed.len(), 1);
    assert!(destroyed[0].ends_with("_hills"));
}
