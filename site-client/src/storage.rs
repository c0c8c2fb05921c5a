use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use site_persistence::repositories::LocalStorageRepository;

/// String key/value storage that survives restarts.
#[async_trait]
pub trait DurableStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;
    async fn remove_item(&self, key: &str) -> anyhow::Result<()>;
}

#[async_trait]
impl DurableStorage for LocalStorageRepository {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        LocalStorageRepository::get_item(self, key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        LocalStorageRepository::set_item(self, key, value).await
    }

    async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        LocalStorageRepository::remove_item(self, key).await
    }
}

/// Process-local storage for tests and for running without a database.
#[derive(Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DurableStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.items
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        self.items.write().await.remove(key);
        Ok(())
    }
}
