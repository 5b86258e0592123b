//! Persistent token storage.
//!
//! The guard looks up a previously stored token under [`BEARER_TOKEN_KEY`]
//! before involving the identity provider. Values are plain strings with no
//! expiry metadata; expiry is the provider's concern.

use async_trait::async_trait;
use rootcause::prelude::Report;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::AuthenticationError;

/// Key under which the bearer token is stored.
pub const BEARER_TOKEN_KEY: &str = "bearerToken";

/// Key-value store for tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, Report<AuthenticationError>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), Report<AuthenticationError>>;

    /// Removes the value stored under `key`.
    async fn remove(&self, key: &str) -> Result<(), Report<AuthenticationError>>;
}

/// Token store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding a bearer token.
    #[must_use]
    pub fn with_bearer_token(token: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(BEARER_TOKEN_KEY.to_string(), token.into());
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Report<AuthenticationError>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Report<AuthenticationError>> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Report<AuthenticationError>> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Token store persisted as a JSON object in a file.
///
/// A missing file reads as an empty store. Writes replace the whole file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileTokenStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<HashMap<String, String>, Report<AuthenticationError>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(AuthenticationError::TokenStore {
                    reason: format!("failed to read {}: {e}", self.path.display()),
                }
                .into());
            }
        };

        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            AuthenticationError::TokenStore {
                reason: format!("failed to parse {}: {e}", self.path.display()),
            }
            .into()
        })
    }

    async fn write_entries(
        &self,
        entries: &HashMap<String, String>,
    ) -> Result<(), Report<AuthenticationError>> {
        let contents =
            serde_json::to_string_pretty(entries).map_err(|e| AuthenticationError::TokenStore {
                reason: format!("failed to encode token store: {e}"),
            })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AuthenticationError::TokenStore {
                    reason: format!("failed to create {}: {e}", parent.display()),
                })?;
        }

        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| AuthenticationError::TokenStore {
                reason: format!("failed to write {}: {e}", self.path.display()),
            })?;

        debug!(path = %self.path.display(), "token store written");
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Report<AuthenticationError>> {
        let _guard = self.lock.read().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Report<AuthenticationError>> {
        let _guard = self.lock.write().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), Report<AuthenticationError>> {
        let _guard = self.lock.write().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(BEARER_TOKEN_KEY).await.expect("get"), None);

        store.set(BEARER_TOKEN_KEY, "token-1").await.expect("set");
        assert_eq!(
            store.get(BEARER_TOKEN_KEY).await.expect("get"),
            Some("token-1".to_string())
        );

        store.remove(BEARER_TOKEN_KEY).await.expect("remove");
        assert_eq!(store.get(BEARER_TOKEN_KEY).await.expect("get"), None);
    }

    #[tokio::test]
    async fn memory_store_with_bearer_token() {
        let store = MemoryTokenStore::with_bearer_token("abc");
        assert_eq!(
            store.get(BEARER_TOKEN_KEY).await.expect("get"),
            Some("abc".to_string())
        );
    }

    #[tokio::test]
    async fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileTokenStore::new(dir.path().join("tokens.json"));

        assert_eq!(store.get(BEARER_TOKEN_KEY).await.expect("get"), None);
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("tokens.json");

        FileTokenStore::new(&path)
            .set(BEARER_TOKEN_KEY, "persisted")
            .await
            .expect("set");

        let reopened = FileTokenStore::new(&path);
        assert_eq!(
            reopened.get(BEARER_TOKEN_KEY).await.expect("get"),
            Some("persisted".to_string())
        );

        reopened.remove(BEARER_TOKEN_KEY).await.expect("remove");
        assert_eq!(reopened.get(BEARER_TOKEN_KEY).await.expect("get"), None);
    }

    #[tokio::test]
    async fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "not json").expect("write");

        let store = FileTokenStore::new(&path);
        assert!(store.get(BEARER_TOKEN_KEY).await.is_err());
    }
}
