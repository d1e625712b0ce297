//! Error types for the two response styles: JSON for API calls, redirects for pages.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use std::fmt;

use blogify_core::error::{DomainError, RepoError};
use blogify_shared::ErrorBody;

/// Error answered with `{"error": "..."}`.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    /// Message shown to the client; the cause is logged where the error is built.
    Internal(String),
}

impl AppError {
    /// Log `cause` and answer 500 with `public` as the message.
    pub fn internal(public: &str, cause: impl fmt::Display) -> Self {
        tracing::error!(error = %cause, "{public}");
        AppError::Internal(public.to_string())
    }

    /// Keep client-facing errors, replace anything server-side with `public`.
    pub fn from_domain(err: DomainError, public: &str) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::Duplicate(msg) => AppError::BadRequest(msg),
            DomainError::NotFound { .. } => AppError::NotFound("Blog not found".to_string()),
            DomainError::Forbidden => AppError::Forbidden("Unauthorized".to_string()),
            DomainError::Unauthorized => {
                AppError::Unauthorized("Please log in to continue.".to_string())
            }
            other @ (DomainError::Upstream(_) | DomainError::Internal(_)) => {
                AppError::internal(public, other)
            }
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.message()))
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::from_domain(err, "Internal Server Error")
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::internal("Internal Server Error", err)
    }
}

/// Result type alias for JSON handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Failure on a browser navigation: logged, then answered with a redirect.
#[derive(Debug)]
pub struct PageError {
    location: String,
}

impl PageError {
    /// Redirect to the home page.
    pub fn home() -> Self {
        Self::to("/")
    }

    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "redirect to {}", self.location)
    }
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, self.location.as_str()))
            .finish()
    }
}

impl From<DomainError> for PageError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::Forbidden | DomainError::NotFound { .. } => {
                tracing::warn!(error = %err, "Page request refused");
            }
            _ => tracing::error!(error = %err, "Page request failed"),
        }
        PageError::home()
    }
}

impl From<RepoError> for PageError {
    fn from(err: RepoError) -> Self {
        tracing::error!(error = %err, "Page request failed");
        PageError::home()
    }
}

impl From<tera::Error> for PageError {
    fn from(err: tera::Error) -> Self {
        tracing::error!(error = ?err, "Template rendering failed");
        PageError::home()
    }
}

/// Result type alias for page handlers.
pub type PageResult<T> = Result<T, PageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_duplicate_maps_to_400_with_message() {
        let err = AppError::from(DomainError::Duplicate("Email is already registered.".into()));
        let res = err.error_response();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(res.into_body()).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Email is already registered."}"#);
    }

    #[actix_web::test]
    async fn test_internal_hides_cause() {
        let err = AppError::from_domain(DomainError::Internal("pool timed out".into()), "Update failed.");
        let res = err.error_response();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(res.into_body()).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Update failed."}"#);
    }

    #[test]
    fn test_page_error_redirects_home() {
        let res = PageError::from(DomainError::Forbidden).error_response();

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/");
    }
}
