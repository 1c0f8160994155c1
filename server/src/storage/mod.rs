//! Blob storage for recipe photos.
//!
//! Blobs are addressed by slash-separated keys such as
//! `recipes/{recipe_id}/{photo_id}.jpg` and served back to browsers through
//! time-limited signed URLs (see `signing`).

mod fs;
mod memory;
mod signing;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use signing::UrlSigner;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid blob key: {0}")]
    InvalidKey(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Blob store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
    pub content_type: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Blob, StorageError>;

    /// Deleting a missing blob is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Reject keys that could escape the store root or alias another key.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub fn photo_key(recipe_id: Uuid, photo_id: Uuid, extension: &str) -> String {
    format!("recipes/{}/{}.{}", recipe_id, photo_id, extension)
}

pub fn thumbnail_key(recipe_id: Uuid, photo_id: Uuid) -> String {
    format!("recipes/{}/{}_thumb.jpg", recipe_id, photo_id)
}

/// Content type implied by a key's file extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("recipes/abc/def.jpg").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("recipes/../secrets").is_err());
        assert!(validate_key("recipes//x.jpg").is_err());
        assert!(validate_key("recipes\\x.jpg").is_err());
        assert!(validate_key("recipes/x.jpg/").is_err());
    }

    #[test]
    fn test_keys() {
        let recipe_id = Uuid::nil();
        let photo_id = Uuid::nil();
        let key = photo_key(recipe_id, photo_id, "png");
        assert_eq!(
            key,
            "recipes/00000000-0000-0000-0000-000000000000/00000000-0000-0000-0000-000000000000.png"
        );
        assert!(validate_key(&key).is_ok());
        assert!(thumbnail_key(recipe_id, photo_id).ends_with("_thumb.jpg"));
    }

    #[test]
    fn test_content_type_for_key() {
        assert_eq!(content_type_for_key("a/b_thumb.jpg"), "image/jpeg");
        assert_eq!(content_type_for_key("a/b.webp"), "image/webp");
        assert_eq!(content_type_for_key("a/b"), "application/octet-stream");
    }
}
