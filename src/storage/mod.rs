//! Recording storage
//!
//! Lists the recordings a user has in the bucket and signs time-limited
//! download URLs for them.

mod client;
mod directory;

pub use client::{ObjectPage, ObjectStore, S3ObjectStore};
pub use directory::{StorageDirectory, DEFAULT_URL_EXPIRATION, SESSIONS_PREFIX};
