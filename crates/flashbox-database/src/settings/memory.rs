//! In-memory settings store backed by dashmap.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use flashbox_core::result::AppResult;
use flashbox_core::traits::settings::SettingsStore;

/// Process-local settings. Contents are lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemorySettingsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flag_round_trip() {
        let store = MemorySettingsStore::new();
        assert!(!store.flag("dataLoaded").await.unwrap());
        store.set_flag("dataLoaded", true).await.unwrap();
        assert!(store.flag("dataLoaded").await.unwrap());
        store.set_flag("dataLoaded", false).await.unwrap();
        assert_eq!(store.get("dataLoaded").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemorySettingsStore::new();
        let other = store.clone();
        store.set("theme", "dark").await.unwrap();
        assert_eq!(other.get("theme").await.unwrap().as_deref(), Some("dark"));
    }
}
