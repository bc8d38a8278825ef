//! JSON file storage implementation.
//!
//! Each key is one `<key>.json` file inside the store directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::debug;

use super::{KeyValueStore, Result, StorageError};

/// File-based JSON storage backend.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Directory holding the key files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for JsonStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        read_json(&self.key_path(key)?).await
    }

    async fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        let path = self.key_path(key)?;
        let json = serde_json::to_string_pretty(value)?;

        // Write-then-rename; readers never see a partial file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes()).await?;
        fs::rename(&tmp, &path).await?;

        debug!(key, path = %path.display(), "stored value");
        Ok(())
    }

    async fn remove(&mut self, key: &str) -> Result<()> {
        fs::remove_file(self.key_path(key)?).await.or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
        })?;
        Ok(())
    }
}

async fn read_json(path: &Path) -> Result<Option<Value>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStorage::new(dir.path()).await.unwrap();

        assert!(store.get("civicsense_reports").await.unwrap().is_none());

        store.set("civicsense_reports", &json!([1, 2, 3])).await.unwrap();
        assert_eq!(store.get("civicsense_reports").await.unwrap(), Some(json!([1, 2, 3])));
        assert!(dir.path().join("civicsense_reports.json").exists());

        store.remove("civicsense_reports").await.unwrap();
        assert!(store.get("civicsense_reports").await.unwrap().is_none());

        // Removing twice is fine
        store.remove("civicsense_reports").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStorage::new(dir.path()).await.unwrap();
        let err = store.set("../escape", &json!(null)).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStorage::new(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        assert!(matches!(store.get("broken").await, Err(StorageError::Json(_))));
    }
}
