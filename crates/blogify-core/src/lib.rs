//! # Blogify Core
//!
//! The domain layer of Blogify.
//! Entities, ports, and the engagement, publishing and notification rules live here;
//! concrete databases and HTTP clients live in `blogify-infra`.

pub mod domain;
pub mod error;
pub mod media;
pub mod ports;
pub mod services;

pub use error::DomainError;
