//! Blog routes: browsing, reading, publishing, comments and likes.

use actix_multipart::form::{MultipartForm, bytes::Bytes, text::Text};
use actix_web::{HttpRequest, HttpResponse, http::header, web};
use uuid::Uuid;

use blogify_core::DomainError;
use blogify_core::domain::Post;
use blogify_core::media::ImageUpload;
use blogify_core::services::{CommentRemoval, PostInput};
use blogify_shared::dto::{CommentForm, SearchQuery};
use blogify_shared::{LikeResponse, SuccessResponse};

use super::pages::load_authors;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult, PageError, PageResult};
use crate::state::AppState;
use crate::views::{self, CommentView, PostView};

/// Fields of the add and edit forms.
#[derive(MultipartForm)]
pub struct PostForm {
    title: Option<Text<String>>,
    body: Option<Text<String>>,
    slug: Option<Text<String>>,
    status: Option<Text<String>>,
    #[multipart(rename = "coverImage", limit = "6MB")]
    cover_image: Option<Bytes>,
}

fn text(field: &Option<Text<String>>) -> Option<&str> {
    field.as_ref().map(|t| t.as_str())
}

impl PostForm {
    fn input(&self) -> Result<PostInput, DomainError> {
        PostInput::parse(
            text(&self.title),
            text(&self.body),
            text(&self.slug),
            text(&self.status),
        )
    }

    /// The cover image, if a non-empty file was sent.
    fn cover_image(self) -> Option<ImageUpload> {
        let file = self.cover_image?;
        if file.data.is_empty() {
            return None;
        }
        let content_type = file
            .content_type
            .as_ref()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();

        Some(ImageUpload::new(
            file.data.to_vec(),
            file.file_name.unwrap_or_default(),
            content_type,
        ))
    }
}

fn client_ip(req: &HttpRequest) -> String {
    let info = req.connection_info();
    info.realip_remote_addr().unwrap_or("unknown").to_string()
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn post_path(post: &Post) -> String {
    format!("/blog/{}", post.slug)
}

/// GET /blog/all?search=
pub async fn all(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<SearchQuery>,
) -> PageResult<HttpResponse> {
    let search = query.into_inner().search.unwrap_or_default();

    let posts = state.posts.browse(Some(search.as_str())).await?;
    let authors = load_authors(&state, posts.iter().map(|p| p.owner_id)).await?;
    let blogs: Vec<PostView> = posts.into_iter().map(|p| PostView::new(p, &authors)).collect();

    let mut ctx = views::page_context(&state, identity.0.as_ref());
    ctx.insert("blogs", &blogs);
    ctx.insert("search_query", &search);
    views::render(&state, "all_blogs.html", &ctx)
}

/// GET /blog/{slug}
///
/// Counts the view once per (IP, account) per window before rendering.
pub async fn show(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    slug: web::Path<String>,
) -> PageResult<HttpResponse> {
    let user = identity.0;
    let Some(post) = state.posts.by_slug(&slug).await? else {
        return views::not_found_page(&state, user.as_ref());
    };

    let comments = state.engagement.comments_for(post.id).await?;

    let ip = client_ip(&req);
    let outcome = state
        .engagement
        .record_view(post, &ip, user.as_ref().map(|u| u.account_id))
        .await?;
    let post = outcome.post;

    let is_liked = match &user {
        Some(u) => state.engagement.is_liked_by(post.id, u.account_id).await?,
        None => false,
    };

    let authors = load_authors(
        &state,
        std::iter::once(post.owner_id).chain(comments.iter().map(|c| c.author_id)),
    )
    .await?;
    let comments: Vec<CommentView> = comments
        .into_iter()
        .map(|c| CommentView::new(c, &authors))
        .collect();

    let mut ctx = views::page_context(&state, user.as_ref());
    ctx.insert("blog", &PostView::new(post, &authors));
    ctx.insert("comments", &comments);
    ctx.insert("is_liked", &is_liked);
    views::render(&state, "blog.html", &ctx)
}

/// GET /blog/add-blog
pub async fn add_page(state: web::Data<AppState>, identity: Identity) -> PageResult<HttpResponse> {
    let ctx = views::page_context(&state, Some(&identity));
    views::render(&state, "add_blog.html", &ctx)
}

/// POST /blog/add-blog
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    MultipartForm(form): MultipartForm<PostForm>,
) -> AppResult<HttpResponse> {
    let input = form
        .input()
        .map_err(|e| AppError::from_domain(e, "Internal Server Error"))?;
    let image = form.cover_image();

    let post = state
        .posts
        .create(identity.account_id, input, image)
        .await
        .map_err(|e| AppError::from_domain(e, "Failed to publish blog."))?;

    Ok(HttpResponse::Created().json(SuccessResponse::redirect(post_path(&post))))
}

/// GET /blog/edit/{id}
pub async fn edit_page(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<String>,
) -> PageResult<HttpResponse> {
    let post_id = Uuid::parse_str(&id).map_err(|_| PageError::home())?;
    let post = state.posts.editable(post_id, identity.account_id).await?;

    let mut ctx = views::page_context(&state, Some(&identity));
    ctx.insert("blog", &post);
    views::render(&state, "edit_blog.html", &ctx)
}

/// POST /blog/edit/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<String>,
    MultipartForm(form): MultipartForm<PostForm>,
) -> AppResult<HttpResponse> {
    let post_id =
        Uuid::parse_str(&id).map_err(|_| AppError::NotFound("Blog not found".to_string()))?;
    let input = form
        .input()
        .map_err(|e| AppError::from_domain(e, "Update failed."))?;
    let image = form.cover_image();

    let post = state
        .posts
        .update(post_id, identity.account_id, input, image)
        .await
        .map_err(|e| AppError::from_domain(e, "Update failed."))?;

    Ok(HttpResponse::Ok().json(SuccessResponse::redirect(post_path(&post))))
}

/// GET /blog/delete/{id}
///
/// Always lands on the home page; refusals and failures are only logged.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<String>,
) -> HttpResponse {
    let Ok(post_id) = Uuid::parse_str(&id) else {
        return redirect("/");
    };

    match state
        .posts
        .delete(post_id, identity.account_id, identity.role)
        .await
    {
        Ok(_) => {}
        Err(e @ (DomainError::Forbidden | DomainError::NotFound { .. })) => {
            tracing::warn!(post_id = %post_id, error = %e, "Post deletion refused");
        }
        Err(e) => tracing::error!(post_id = %post_id, error = %e, "Post deletion failed"),
    }
    redirect("/")
}

/// POST /blog/comment/{blog_id}
pub async fn comment(
    state: web::Data<AppState>,
    identity: Identity,
    blog_id: web::Path<String>,
    form: web::Form<CommentForm>,
) -> PageResult<HttpResponse> {
    let post_id = Uuid::parse_str(&blog_id).map_err(|_| PageError::home())?;
    let (_, post) = state
        .engagement
        .add_comment(post_id, identity.account_id, &form.content)
        .await?;

    Ok(redirect(&post_path(&post)))
}

/// GET /blog/comment/delete/{comment_id}/{blog_id}
pub async fn delete_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(String, String)>,
) -> PageResult<HttpResponse> {
    let (comment_id, blog_id) = path.into_inner();
    let comment_id = Uuid::parse_str(&comment_id).map_err(|_| PageError::home())?;

    match state
        .engagement
        .remove_comment(comment_id, identity.account_id)
        .await?
    {
        CommentRemoval::Removed(post) => Ok(redirect(&post_path(&post))),
        CommentRemoval::NotPermitted => {
            let post_id = Uuid::parse_str(&blog_id).map_err(|_| PageError::home())?;
            let post = state.posts.by_id(post_id).await?.ok_or_else(PageError::home)?;
            Ok(redirect(&post_path(&post)))
        }
        CommentRemoval::NotFound => {
            let back = req
                .headers()
                .get(header::REFERER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("/");
            Ok(redirect(back))
        }
    }
}

/// GET /blog/like/{blog_id}
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    blog_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id =
        Uuid::parse_str(&blog_id).map_err(|e| AppError::internal("Server error", e))?;
    let outcome = state
        .engagement
        .toggle_like(post_id, identity.account_id)
        .await
        .map_err(|e| AppError::internal("Server error", e))?;

    Ok(HttpResponse::Ok().json(LikeResponse::new(outcome.likes, outcome.is_liked)))
}
