//! Swappable persistence for the serialized cart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use async_trait::async_trait;
use tokio::sync::{RwLock, watch};

use crate::cart::Cart;
use crate::error::CartError;

/// Key the cart is stored under. File storage uses it as the file stem.
pub const CART_STORAGE_KEY: &str = "food-delivery-cart";

/// Raw string storage for the cart document.
///
/// Backends store and return text verbatim; decoding and recovery from
/// corrupt contents happen in [`crate::CartStore`]. Each backend also owns
/// the change channel, so every [`crate::CartStore`] opened on the same
/// backend hears about every write.
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Returns the stored document, or `None` if nothing was ever written.
    async fn load(&self) -> Result<Option<String>, CartError>;

    /// Replaces the stored document.
    async fn save(&self, raw: &str) -> Result<(), CartError>;

    /// Change channel shared by everything using this backend.
    fn changes(&self) -> Arc<watch::Sender<Cart>>;
}

fn new_channel() -> Arc<watch::Sender<Cart>> {
    Arc::new(watch::channel(Cart::new()).0)
}

/// Process-local storage for tests and headless use.
///
/// Clones share contents and change channel.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    value: Arc<RwLock<Option<String>>>,
    changes: Arc<watch::Sender<Cart>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self {
            value: Arc::default(),
            changes: new_channel(),
        }
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage that already holds `raw`.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            value: Arc::new(RwLock::new(Some(raw.into()))),
            ..Self::default()
        }
    }
}

#[async_trait]
impl CartStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<String>, CartError> {
        Ok(self.value.read().await.clone())
    }

    async fn save(&self, raw: &str) -> Result<(), CartError> {
        *self.value.write().await = Some(raw.to_string());
        Ok(())
    }

    fn changes(&self) -> Arc<watch::Sender<Cart>> {
        self.changes.clone()
    }
}

type ChannelRegistry = Mutex<HashMap<PathBuf, Weak<watch::Sender<Cart>>>>;

/// One change channel per cart file, shared by every `FileStorage` in the
/// process that points at it.
fn file_channel(path: &Path) -> Arc<watch::Sender<Cart>> {
    static CHANNELS: OnceLock<ChannelRegistry> = OnceLock::new();

    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut channels = CHANNELS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    channels.retain(|_, channel| channel.strong_count() > 0);

    if let Some(channel) = channels.get(&key).and_then(Weak::upgrade) {
        return channel;
    }
    let channel = new_channel();
    channels.insert(key, Arc::downgrade(&channel));
    channel
}

/// A JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    changes: Arc<watch::Sender<Cart>>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let changes = file_channel(&path);
        Self { path, changes }
    }

    /// `<dir>/food-delivery-cart.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{CART_STORAGE_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CartStorage for FileStorage {
    async fn load(&self) -> Result<Option<String>, CartError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, raw: &str) -> Result<(), CartError> {
        // Write beside the target and rename so readers never see a torn file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn changes(&self) -> Arc<watch::Sender<Cart>> {
        self.changes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_starts_empty() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load().await.unwrap(), None);

        storage.save("[]").await.unwrap();
        assert_eq!(storage.load().await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_memory_storage_clones_share_contents() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.save("[1]").await.unwrap();
        assert_eq!(other.load().await.unwrap().as_deref(), Some("[1]"));
    }

    #[tokio::test]
    async fn test_file_storage_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path());

        assert_eq!(storage.load().await.unwrap(), None);
        assert!(storage.path().ends_with("food-delivery-cart.json"));
    }

    #[tokio::test]
    async fn test_file_storage_shares_channel_per_path() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileStorage::in_dir(dir.path());
        let second = FileStorage::in_dir(dir.path());
        let elsewhere = FileStorage::new(dir.path().join("other.json"));

        assert!(Arc::ptr_eq(&first.changes(), &second.changes()));
        assert!(!Arc::ptr_eq(&first.changes(), &elsewhere.changes()));
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path());

        storage.save(r#"[{"quantity":1}]"#).await.unwrap();
        let reopened = FileStorage::in_dir(dir.path());
        assert_eq!(
            reopened.load().await.unwrap().as_deref(),
            Some(r#"[{"quantity":1}]"#)
        );
    }
}
