use super::{validate_key, Blob, BlobStore, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process blob store for tests and `BLOB_STORE=memory`.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Blob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.blobs.write().await.insert(
            key.to_string(),
            Blob {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Blob, StorageError> {
        validate_key(key)?;
        self.blobs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.blobs.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_keeps_content_type() {
        let store = MemoryBlobStore::new();
        store
            .put("recipes/r/p.gif", b"GIF89a".to_vec(), "image/gif")
            .await
            .unwrap();
        let blob = store.get("recipes/r/p.gif").await.unwrap();
        assert_eq!(blob.content_type, "image/gif");
        assert_eq!(store.len().await, 1);

        store.delete("recipes/r/p.gif").await.unwrap();
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_missing_and_invalid() {
        let store = MemoryBlobStore::new();
        assert!(matches!(
            store.get("recipes/none.jpg").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.put("/abs.jpg", vec![], "image/jpeg").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
