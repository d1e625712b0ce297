//! Persistence: PostgreSQL repositories and the in-memory fallback store.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;
pub use memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use connections::DatabaseConnections;

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresAccountRepository, PostgresCommentRepository, PostgresPostRepository,
    PostgresViewRecordRepository,
};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
