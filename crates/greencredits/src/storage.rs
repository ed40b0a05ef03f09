use std::{
    collections::BTreeMap,
    fmt, fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::StorageError;

pub(crate) const ONBOARDING_COMPLETED_KEY: &str = "onboardingCompleted";
pub(crate) const LAST_CONNECTED_WALLET_KEY: &str = "lastConnectedWallet";

/// Durable string key-value storage, the host's equivalent of `localStorage`.
pub(crate) trait KeyValueStore: Send + Sync + fmt::Debug {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Stores every key in a single JSON object on disk.
#[derive(Debug)]
pub(crate) struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens `<dir>/storage.json`, creating the directory if needed. A file
    /// that no longer parses is treated as empty.
    pub(crate) fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        let path = dir.join("storage.json");

        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "Discarding unreadable storage");
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened storage");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file in one rename so readers never see a partial write.
    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|err| err.error)?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let mut updated = entries.clone();
        updated.insert(key.to_owned(), value.to_owned());
        self.persist(&updated)?;
        *entries = updated;

        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_owned(), value.to_owned());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get(ONBOARDING_COMPLETED_KEY).unwrap(), None);
        store.set(ONBOARDING_COMPLETED_KEY, "true").unwrap();
        store.set(LAST_CONNECTED_WALLET_KEY, "0xabc").unwrap();
        drop(store);

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            store.get(ONBOARDING_COMPLETED_KEY).unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(
            store.get(LAST_CONNECTED_WALLET_KEY).unwrap().as_deref(),
            Some("0xabc")
        );
    }

    #[test]
    fn file_store_recovers_from_torn_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set(ONBOARDING_COMPLETED_KEY, "true").unwrap();
        store.set(LAST_CONNECTED_WALLET_KEY, "0xabc").unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        fs::write(store.path(), &contents[..contents.len() / 2]).unwrap();
        drop(store);

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get(ONBOARDING_COMPLETED_KEY).unwrap(), None);

        store.set(ONBOARDING_COMPLETED_KEY, "true").unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            store.get(ONBOARDING_COMPLETED_KEY).unwrap().as_deref(),
            Some("true")
        );
    }

    #[test]
    fn file_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, ["storage.json"]);
    }

    #[test]
    fn file_store_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let store = FileStore::open(&nested).unwrap();
        store.set("k", "v").unwrap();

        assert!(store.path().exists());
    }
}
