//! Cover image storage.

#[cfg(feature = "cloudinary")]
mod cloudinary;
mod memory;

#[cfg(feature = "cloudinary")]
pub use cloudinary::{CloudinaryConfig, CloudinaryMediaStore, SignatureAlgorithm};
pub use memory::InMemoryMediaStore;
