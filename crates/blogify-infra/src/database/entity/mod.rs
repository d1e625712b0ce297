//! SeaORM entities mirroring the migration schema.

pub mod account;
pub mod comment;
pub mod post;
pub mod post_like;
pub mod view_record;
