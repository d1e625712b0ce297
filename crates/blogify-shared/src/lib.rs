//! # Blogify Shared
//!
//! Request bodies and JSON response shapes used by the HTTP layer.

pub mod dto;
pub mod response;

pub use response::{ErrorBody, LikeResponse, SuccessResponse};
