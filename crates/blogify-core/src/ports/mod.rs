//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod mail;
mod media;
mod repository;

pub use auth::{AuthError, PasswordService, SessionIdentity, TokenClaims, TokenService};
pub use mail::{EmailMessage, MailError, Mailer};
pub use media::{MediaError, MediaStore, UploadedImage};
pub use repository::{
    AccountRepository, BaseRepository, CommentRepository, PostQuery, PostRepository,
    ViewRecordRepository,
};
