//! Account routes: signup, login, logout and the author dashboard.

use actix_web::{
    HttpResponse,
    cookie::{Cookie, time::Duration},
    http::header,
    web,
};

use blogify_core::domain::Account;
use blogify_core::error::RepoError;
use blogify_core::ports::SessionIdentity;
use blogify_core::services::ProfileSummary;
use blogify_shared::SuccessResponse;
use blogify_shared::dto::{LoginRequest, SignupRequest};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult, PageResult};
use crate::state::AppState;
use crate::views;

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build(state.site.session_cookie.clone(), token)
        .path("/")
        .http_only(true)
        .max_age(Duration::seconds(state.tokens.expiration_seconds()))
        .finish()
}

fn issue_session(state: &AppState, account: &Account, public: &str) -> AppResult<Cookie<'static>> {
    let token = state
        .tokens
        .generate_token(&SessionIdentity::from(account))
        .map_err(|e| AppError::internal(public, e))?;
    Ok(session_cookie(state, token))
}

/// GET /user/signup
pub async fn signup_page(state: web::Data<AppState>) -> PageResult<HttpResponse> {
    let ctx = views::page_context(&state, None);
    views::render(&state, "signup.html", &ctx)
}

/// GET /user/login
pub async fn login_page(state: web::Data<AppState>) -> PageResult<HttpResponse> {
    let ctx = views::page_context(&state, None);
    views::render(&state, "login.html", &ctx)
}

/// GET /user/get-started
pub async fn get_started(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> PageResult<HttpResponse> {
    let ctx = views::page_context(&state, identity.0.as_ref());
    views::render(&state, "gateway.html", &ctx)
}

/// POST /user/signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    const FAILURE: &str = "Internal Server Error";

    let body = body.into_inner();
    if !body.is_complete() {
        return Err(AppError::BadRequest("All fields are required.".to_string()));
    }

    let password_hash = state
        .passwords
        .hash(&body.password)
        .map_err(|e| AppError::internal(FAILURE, e))?;
    let account = Account::new(
        body.full_name.trim().to_string(),
        body.email.trim().to_string(),
        password_hash,
    );

    let account = state.accounts.insert(account).await.map_err(|e| match e {
        RepoError::Constraint(_) => AppError::BadRequest("Email is already registered.".to_string()),
        other => AppError::internal(FAILURE, other),
    })?;
    tracing::info!(account_id = %account.id, "Account created");

    let cookie = issue_session(&state, &account, FAILURE)?;
    Ok(HttpResponse::Created()
        .cookie(cookie)
        .json(SuccessResponse::redirect("/")))
}

/// POST /user/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    const FAILURE: &str = "Something went wrong.";
    let invalid = || AppError::Unauthorized("Invalid email or password.".to_string());

    let account = state
        .accounts
        .find_by_email(body.email.trim())
        .await
        .map_err(|e| AppError::internal(FAILURE, e))?
        .ok_or_else(invalid)?;

    let verified = state
        .passwords
        .verify(&body.password, &account.password_hash)
        .map_err(|e| AppError::internal(FAILURE, e))?;
    if !verified {
        tracing::debug!(account_id = %account.id, "Password mismatch");
        return Err(invalid());
    }

    let cookie = issue_session(&state, &account, FAILURE)?;
    tracing::info!(account_id = %account.id, "Signed in");
    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(SuccessResponse::redirect("/")))
}

/// GET /user/logout
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    let mut cookie = Cookie::build(state.site.session_cookie.clone(), "")
        .path("/")
        .finish();
    cookie.make_removal();

    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(cookie)
        .finish()
}

/// GET /user/profile
pub async fn profile(state: web::Data<AppState>, identity: Identity) -> PageResult<HttpResponse> {
    let posts = state.posts.by_owner(identity.account_id).await?;
    let summary = ProfileSummary::from_posts(posts);

    let mut ctx = views::page_context(&state, Some(&identity));
    ctx.insert("summary", &summary);
    views::render(&state, "profile.html", &ctx)
}
