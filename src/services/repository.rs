use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use std::path::PathBuf;
use std::sync::Arc;
use crate::errors::AppResult;

/// Backing storage for the account collection: one named entry holding the
/// serialized list. `load` returns `None` when nothing has been stored yet.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn load(&self) -> AppResult<Option<String>>;
    async fn save(&self, document: String) -> AppResult<()>;
}

/// Keeps the collection in a single JSON file.
pub struct FileAccountRepository {
    path: PathBuf,
}

impl FileAccountRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AccountRepository for FileAccountRepository {
    async fn load(&self) -> AppResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, document: String) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        // Write beside the target and rename so readers never see half a file
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, document).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        tracing::debug!("Saved account collection to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the collection under a single Redis key.
pub struct RedisAccountRepository {
    client: Arc<Client>,
    key: String,
}

impl RedisAccountRepository {
    pub fn new(client: Arc<Client>, key: impl Into<String>) -> Self {
        Self { client, key: key.into() }
    }
}

#[async_trait]
impl AccountRepository for RedisAccountRepository {
    async fn load(&self) -> AppResult<Option<String>> {
        let mut conn = self.client.get_async_connection().await?;
        let document: Option<String> = conn.get(&self.key).await?;
        Ok(document)
    }

    async fn save(&self, document: String) -> AppResult<()> {
        let mut conn = self.client.get_async_connection().await?;
        let _: () = conn.set(&self.key, document).await?;
        Ok(())
    }
}

#[cfg(test)]
#[derive(Default, Clone)]
pub struct MemoryAccountRepository {
    document: Arc<tokio::sync::Mutex<Option<String>>>,
}

#[cfg(test)]
impl MemoryAccountRepository {
    pub fn with_document(document: &str) -> Self {
        Self { document: Arc::new(tokio::sync::Mutex::new(Some(document.to_string()))) }
    }

    pub async fn document(&self) -> Option<String> {
        self.document.lock().await.clone()
    }
}

#[cfg(test)]
#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn load(&self) -> AppResult<Option<String>> {
        Ok(self.document.lock().await.clone())
    }

    async fn save(&self, document: String) -> AppResult<()> {
        *self.document.lock().await = Some(document);
        Ok(())
    }
}
