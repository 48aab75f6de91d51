//! File-backed JSON key-value store used for UI settings.
//!
//! One store maps to one JSON object on disk. Reads are served from memory;
//! every mutation rewrites the file through a temporary sibling and a rename.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store id '{0}': expected a plain file name")]
    InvalidStoreId(String),
    #[error("failed to access settings file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file '{}' is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("settings file '{}' must contain a JSON object", path.display())]
    NotAnObject { path: PathBuf },
    #[error("failed to encode settings for '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub struct SettingsStore {
    path: PathBuf,
    entries: RwLock<Map<String, Value>>,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Opens the store at `path`. A missing file is an empty store; the file
    /// is created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = read_entries(&path).await?;
        debug!(path = %path.display(), keys = entries.len(), "opened settings store");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn has(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn keys(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    /// Stores `value` under `key` and writes the file before returning.
    /// The new value is visible to `get` even if the write fails.
    pub async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        self.save().await
    }

    pub async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let removed = self.entries.write().await.remove(key).is_some();
        if removed {
            self.save().await?;
        }
        Ok(removed)
    }

    pub async fn save(&self) -> Result<(), StoreError> {
        // Snapshot under the write lock so a later snapshot never lands
        // on disk before an earlier one.
        let _guard = self.write_lock.lock().await;
        let snapshot = Value::Object(self.entries.read().await.clone());
        let bytes = serde_json::to_vec_pretty(&snapshot).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let tmp_path = tmp_path_for(&self.path);
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "saved settings store");
        Ok(())
    }

    /// Replaces the in-memory entries with the file contents.
    pub async fn reload(&self) -> Result<(), StoreError> {
        let entries = read_entries(&self.path).await?;
        *self.entries.write().await = entries;
        Ok(())
    }
}

async fn read_entries(path: &Path) -> Result<Map<String, Value>, StoreError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(&raw) {
        Ok(Value::Object(entries)) => Ok(entries),
        Ok(_) => Err(StoreError::NotAnObject {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(StoreError::Parse {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Process-wide registry handing out one shared [`SettingsStore`] per id.
pub struct StoreRegistry {
    base_dir: PathBuf,
    stores: Mutex<HashMap<String, Arc<OnceCell<Arc<SettingsStore>>>>>,
}

impl StoreRegistry {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Opens `store_id` on first use; later and concurrent calls share the
    /// same handle.
    pub async fn load(&self, store_id: &str) -> Result<Arc<SettingsStore>, StoreError> {
        validate_store_id(store_id)?;

        let cell = {
            let mut stores = self.stores.lock().await;
            stores
                .entry(store_id.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let store = cell
            .get_or_try_init(|| async {
                let path = self.base_dir.join(store_id);
                info!(store_id, path = %path.display(), "loading settings store");
                SettingsStore::open(path).await.map(Arc::new)
            })
            .await?;
        Ok(store.clone())
    }
}

fn validate_store_id(store_id: &str) -> Result<(), StoreError> {
    let is_plain_name = !store_id.is_empty()
        && store_id != "."
        && store_id != ".."
        && !store_id.contains(['/', '\\']);
    if is_plain_name {
        Ok(())
    } else {
        Err(StoreError::InvalidStoreId(store_id.to_string()))
    }
}
