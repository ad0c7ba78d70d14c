//! Key-value settings store trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Value written for a boolean flag that is set.
pub const FLAG_TRUE: &str = "true";

/// A tiny persisted key-value store, independent of the relational schema.
///
/// Holds process-wide flags such as the "starter data already loaded"
/// marker. Values are plain strings.
#[async_trait]
pub trait SettingsStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key is absent.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Read a boolean flag. Any stored value other than `"true"` reads as unset.
    async fn flag(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key).await?.as_deref() == Some(FLAG_TRUE))
    }

    /// Set or clear a boolean flag.
    async fn set_flag(&self, key: &str, value: bool) -> AppResult<()> {
        if value {
            self.set(key, FLAG_TRUE).await
        } else {
            self.remove(key).await
        }
    }
}
