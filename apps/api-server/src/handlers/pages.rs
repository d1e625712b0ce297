//! Site pages and the mail endpoints behind the contact and newsletter forms.

use actix_web::{HttpResponse, web};

use blogify_core::services::{ContactMessage, NotificationError};
use blogify_shared::SuccessResponse;
use blogify_shared::dto::{ContactRequest, SubscribeRequest};

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult, PageResult};
use crate::state::AppState;
use crate::views::{self, Authors, PostView};

/// GET /
pub async fn home(state: web::Data<AppState>, identity: OptionalIdentity) -> PageResult<HttpResponse> {
    let blogs = match trending_views(&state).await {
        Ok(blogs) => blogs,
        Err(e) => {
            // The landing page still renders, just without posts.
            tracing::error!(error = %e, "Failed to load trending posts");
            Vec::new()
        }
    };

    let mut ctx = views::page_context(&state, identity.0.as_ref());
    ctx.insert("blogs", &blogs);
    views::render(&state, "home.html", &ctx)
}

async fn trending_views(state: &AppState) -> Result<Vec<PostView>, blogify_core::error::DomainError> {
    let posts = state.posts.trending().await?;
    let authors = load_authors(state, posts.iter().map(|p| p.owner_id)).await?;
    Ok(posts.into_iter().map(|p| PostView::new(p, &authors)).collect())
}

/// Resolve display details for a set of account ids.
pub(crate) async fn load_authors(
    state: &AppState,
    ids: impl Iterator<Item = uuid::Uuid>,
) -> Result<Authors, blogify_core::error::DomainError> {
    let mut ids: Vec<_> = ids.collect();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(Authors::new(&[]));
    }
    let accounts = state.accounts.find_by_ids(&ids).await?;
    Ok(Authors::new(&accounts))
}

/// GET /about-us
pub async fn about(state: web::Data<AppState>, identity: OptionalIdentity) -> PageResult<HttpResponse> {
    let ctx = views::page_context(&state, identity.0.as_ref());
    views::render(&state, "about.html", &ctx)
}

/// GET /contact
pub async fn contact_page(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> PageResult<HttpResponse> {
    let ctx = views::page_context(&state, identity.0.as_ref());
    views::render(&state, "contact.html", &ctx)
}

fn mail_error(err: NotificationError, failure: &str) -> AppError {
    match err {
        NotificationError::Validation(msg) => AppError::BadRequest(msg),
        NotificationError::NotConfigured => {
            tracing::error!("Mail provider missing; set RESEND_API_KEY");
            AppError::Internal("Server Email Configuration Missing".to_string())
        }
        NotificationError::Delivery(e) => AppError::internal(failure, e),
    }
}

/// POST /contact
pub async fn contact(
    state: web::Data<AppState>,
    body: web::Json<ContactRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let message = ContactMessage {
        name: body.name,
        email: body.email,
        topic: body.topic,
        message: body.message,
    };

    state
        .notifications
        .send_contact(message)
        .await
        .map_err(|e| mail_error(e, "Failed to send email"))?;

    Ok(HttpResponse::Ok().json(SuccessResponse::message("Email sent successfully!")))
}

/// POST /subscribe
pub async fn subscribe(
    state: web::Data<AppState>,
    body: web::Json<SubscribeRequest>,
) -> AppResult<HttpResponse> {
    state
        .notifications
        .send_welcome(&body.email)
        .await
        .map_err(|e| mail_error(e, "Failed to subscribe"))?;

    Ok(HttpResponse::Ok().json(SuccessResponse::message("Subscribed successfully!")))
}
