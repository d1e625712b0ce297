//! Server-side rendering: tera setup, the shared page context and view models.

use std::collections::HashMap;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use tera::{Context, Tera, Value};
use uuid::Uuid;

use blogify_core::domain::{Account, Comment, Post};
use blogify_core::media::{ImageVariant, optimize_image_url};

use crate::middleware::auth::Identity;
use crate::middleware::error::PageError;
use crate::state::AppState;

/// Load every template under `glob` and register the helpers they use.
pub fn load_templates(glob: &str) -> Result<Tera, tera::Error> {
    let mut tera = Tera::new(glob)?;
    tera.register_filter("optimize_image", optimize_image_filter);
    tracing::debug!(templates = tera.get_template_names().count(), "Templates loaded");
    Ok(tera)
}

/// `{{ url | optimize_image(variant="card") }}`
fn optimize_image_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let Some(url) = value.as_str() else {
        return Ok(value.clone());
    };
    let variant = args
        .get("variant")
        .and_then(Value::as_str)
        .map(ImageVariant::from_name)
        .unwrap_or(ImageVariant::Auto);

    Ok(Value::String(optimize_image_url(url, variant)))
}

/// Context every page starts from.
pub fn page_context(state: &AppState, user: Option<&Identity>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("user", &user);
    ctx.insert("tinymce_key", &state.site.tinymce_api_key);
    ctx
}

pub fn render(state: &AppState, template: &str, ctx: &Context) -> Result<HttpResponse, PageError> {
    render_with_status(state, template, ctx, StatusCode::OK)
}

pub fn render_with_status(
    state: &AppState,
    template: &str,
    ctx: &Context,
    status: StatusCode,
) -> Result<HttpResponse, PageError> {
    let body = state.templates.render(template, ctx)?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body))
}

pub fn not_found_page(state: &AppState, user: Option<&Identity>) -> Result<HttpResponse, PageError> {
    let ctx = page_context(state, user);
    render_with_status(state, "404.html", &ctx, StatusCode::NOT_FOUND)
}

/// Public author details; never carries credentials.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub full_name: String,
    pub profile_image_url: String,
}

impl From<&Account> for AuthorView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            full_name: account.full_name.clone(),
            profile_image_url: account.profile_image_url.clone(),
        }
    }
}

impl AuthorView {
    fn unknown(id: Uuid) -> Self {
        Self {
            id,
            full_name: "Unknown author".to_string(),
            profile_image_url: blogify_core::domain::DEFAULT_PROFILE_IMAGE.to_string(),
        }
    }
}

/// Author lookup by account id.
pub struct Authors(HashMap<Uuid, AuthorView>);

impl Authors {
    pub fn new(accounts: &[Account]) -> Self {
        Self(accounts.iter().map(|a| (a.id, AuthorView::from(a))).collect())
    }

    pub fn get(&self, id: Uuid) -> AuthorView {
        self.0.get(&id).cloned().unwrap_or_else(|| AuthorView::unknown(id))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author: AuthorView,
    pub published_on: String,
}

impl PostView {
    pub fn new(post: Post, authors: &Authors) -> Self {
        Self {
            author: authors.get(post.owner_id),
            published_on: post.created_at.format("%b %d, %Y").to_string(),
            post,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: AuthorView,
    pub posted_on: String,
}

impl CommentView {
    pub fn new(comment: Comment, authors: &Authors) -> Self {
        Self {
            author: authors.get(comment.author_id),
            posted_on: comment.created_at.format("%b %d, %Y").to_string(),
            comment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimize_filter_applies_variant() {
        let mut args = HashMap::new();
        args.insert("variant".to_string(), Value::String("card".into()));
        let url = Value::String(
            "https://res.cloudinary.com/demo/image/upload/v1/blogify_uploads/a.webp".into(),
        );

        let out = optimize_image_filter(&url, &args).unwrap();

        assert_eq!(
            out.as_str().unwrap(),
            "https://res.cloudinary.com/demo/image/upload/w_800,c_fill,q_auto:good,f_auto,e_sharpen:20/v1/blogify_uploads/a.webp"
        );
    }

    #[test]
    fn test_optimize_filter_passes_null_through() {
        let out = optimize_image_filter(&Value::Null, &HashMap::new()).unwrap();
        assert!(out.is_null());
    }

    #[test]
    fn test_missing_author_gets_placeholder() {
        let authors = Authors::new(&[]);
        assert_eq!(authors.get(Uuid::nil()).full_name, "Unknown author");
    }
}
