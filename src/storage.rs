use crate::analysis::Profile;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Addresses that already went through onboarding, stored as one JSON array
pub const COMPLETED_ADDRESSES_KEY: &str = "completed_onboarding_addresses";

/// Last derived investor profile (cache only, never authoritative)
pub const INVESTOR_PROFILE_KEY: &str = "investor_profile";

// Custom error type that implements Send
#[derive(Debug, Clone)]
pub struct StorageError(String);

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StorageError {}

impl From<String> for StorageError {
    fn from(s: String) -> Self {
        StorageError(s)
    }
}

impl From<&str> for StorageError {
    fn from(s: &str) -> Self {
        StorageError(s.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError(format!("I/O error: {}", e))
    }
}

/// Device-local key/value storage
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One file per key inside a storage directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            log::error!("❌ Failed to create storage directory {}: {}", self.dir.display(), e);
            StorageError::from(e)
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                log::error!("❌ Failed to read {}: {}", path.display(), e);
                Err(e.into())
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_dir()?;
        let path = self.path_for(key);
        std::fs::write(&path, value)?;
        log::debug!("✅ Saved {} to {}", key, path.display());
        Ok(())
    }
}

/// In-process store, nothing survives a restart
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::from("Memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::from("Memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store rooted at `storage_dir`
pub fn default_store(storage_dir: &str) -> Arc<dyn KeyValueStore> {
    log::info!("📁 Using storage directory: {}", storage_dir);
    Arc::new(FileStore::new(storage_dir))
}

/// Set of wallet addresses that finished onboarding
#[derive(Clone)]
pub struct CompletionStore {
    store: Arc<dyn KeyValueStore>,
}

impl CompletionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All recorded addresses. Absent or corrupt data reads as empty.
    pub fn addresses(&self) -> Vec<String> {
        let raw = match self.store.get(COMPLETED_ADDRESSES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("⚠️ Failed to read completed addresses: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(mut addresses) => {
                let mut seen = std::collections::HashSet::new();
                addresses.retain(|a| seen.insert(a.clone()));
                addresses
            }
            Err(e) => {
                log::warn!("⚠️ Ignoring corrupt completed addresses: {}", e);
                Vec::new()
            }
        }
    }

    pub fn has(&self, address: &str) -> bool {
        self.addresses().iter().any(|a| a == address)
    }

    /// Record `address`. Adding an address twice is a no-op.
    pub fn add(&self, address: &str) {
        let mut addresses = self.addresses();
        if addresses.iter().any(|a| a == address) {
            return;
        }
        addresses.push(address.to_string());

        let result = serde_json::to_string(&addresses)
            .map_err(|e| StorageError::from(format!("Failed to serialize addresses: {}", e)))
            .and_then(|serialized| self.store.set(COMPLETED_ADDRESSES_KEY, &serialized));

        match result {
            Ok(_) => log::info!("✅ Onboarding completed for {}", address),
            Err(e) => log::error!("❌ Failed to record completed onboarding: {}", e),
        }
    }
}

/// Cache the derived profile. Failures are logged and dropped.
pub fn save_profile(store: &dyn KeyValueStore, profile: &Profile) {
    let result = serde_json::to_string(profile)
        .map_err(|e| StorageError::from(format!("Failed to serialize profile: {}", e)))
        .and_then(|serialized| store.set(INVESTOR_PROFILE_KEY, &serialized));

    if let Err(e) = result {
        log::error!("❌ Failed to cache investor profile: {}", e);
    }
}

pub fn load_cached_profile(store: &dyn KeyValueStore) -> Option<Profile> {
    match store.get(INVESTOR_PROFILE_KEY) {
        Ok(Some(data)) => serde_json::from_str(&data).ok(),
        Ok(None) => None,
        Err(e) => {
            log::warn!("⚠️ Failed to read cached profile: {}", e);
            None
        }
    }
}
