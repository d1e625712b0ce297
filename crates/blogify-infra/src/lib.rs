//! # Blogify Infrastructure
//!
//! Concrete implementations of the ports defined in `blogify-core`.
//! This crate contains the database, credential, image storage and mail integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `cloudinary` - Cloudinary image storage
//! - `resend` - Resend transactional email

pub mod database;
pub mod mail;
pub mod media;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use database::InMemoryStore;
pub use mail::InMemoryMailer;
pub use media::InMemoryMediaStore;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::DatabaseConnections;

#[cfg(feature = "cloudinary")]
pub use media::{CloudinaryConfig, CloudinaryMediaStore, SignatureAlgorithm};

#[cfg(feature = "resend")]
pub use mail::{ResendConfig, ResendMailer};
