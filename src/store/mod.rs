//! Token store — blob object storage backend for the access token.
//!
//! The object store does all the persistence work. This module only issues
//! put/list/get/delete calls and keeps one logical token under a key prefix.

pub mod memory;
pub mod repository;
pub mod traits;
pub mod vercel;

pub use memory::MemoryBlobStore;
pub use repository::TokenRepository;
pub use traits::{BlobObject, BlobStore};
pub use vercel::VercelBlobStore;
