//! Domain entities - the core business objects.

mod account;
mod comment;
mod post;
mod view_record;

pub use account::{Account, DEFAULT_PROFILE_IMAGE, Role};
pub use comment::Comment;
pub use post::{
    COMMENT_WEIGHT, LIKE_WEIGHT, Post, PostSort, PostStatus, VIEW_WEIGHT, normalize_slug,
    trending_score,
};
pub use view_record::{VIEW_DEDUP_WINDOW_SECS, ViewRecord};
