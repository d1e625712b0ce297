//! Body extractor limits and the JSON errors they answer with.

use actix_multipart::{MultipartError, form::MultipartFormConfig};
use actix_web::{
    HttpRequest, HttpResponse,
    error::{InternalError, JsonPayloadError, PayloadError},
    web,
};

use blogify_shared::ErrorBody;

/// In-memory buffering limits for multipart forms; the cover image field caps itself lower.
const MULTIPART_MEMORY_LIMIT: usize = 8 * 1024 * 1024;
const MULTIPART_TOTAL_LIMIT: usize = 10 * 1024 * 1024;

pub fn multipart_config() -> MultipartFormConfig {
    MultipartFormConfig::default()
        .memory_limit(MULTIPART_MEMORY_LIMIT)
        .total_limit(MULTIPART_TOTAL_LIMIT)
        .error_handler(multipart_error)
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}

fn multipart_error(err: MultipartError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        MultipartError::Payload(PayloadError::Overflow) => "File too large. Max 5MB allowed.",
        _ => "Invalid form submission.",
    };
    tracing::debug!(error = %err, "Rejected multipart body");
    InternalError::from_response(err, HttpResponse::BadRequest().json(ErrorBody::new(message)))
        .into()
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected JSON body");
    let body = ErrorBody::new("Invalid request body.");
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}
