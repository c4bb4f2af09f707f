//! Durable blob storage for finished media.
//!
//! Thin wrapper over the S3 API pointed at an S3-compatible endpoint
//! (Cloudflare R2 in production, MinIO locally).

pub mod client;
pub mod error;
pub mod keys;

pub use client::{BlobClient, BlobConfig};
pub use error::{StorageError, StorageResult};
pub use keys::{public_media_path, video_key};
