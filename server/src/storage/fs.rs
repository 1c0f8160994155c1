use super::{content_type_for_key, validate_key, Blob, BlobStore, StorageError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Blob store backed by a local directory. Keys map to relative paths.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Blob, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Blob {
                data,
                content_type: content_type_for_key(key).to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("potluck-blobs-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let root = temp_root();
        let store = FsBlobStore::new(&root);

        store
            .put("recipes/r1/p1.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        let blob = store.get("recipes/r1/p1.png").await.unwrap();
        assert_eq!(blob.data, vec![1, 2, 3]);
        assert_eq!(blob.content_type, "image/png");

        store.delete("recipes/r1/p1.png").await.unwrap();
        assert!(matches!(
            store.get("recipes/r1/p1.png").await,
            Err(StorageError::NotFound(_))
        ));
        // Second delete is a no-op
        store.delete("recipes/r1/p1.png").await.unwrap();

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let store = FsBlobStore::new(temp_root());
        assert!(matches!(
            store.get("../outside.jpg").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
