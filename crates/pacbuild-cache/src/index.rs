//! The on-disk cache index: one JSON record per entry, rewritten atomically
//! on every mutation (write to a temp file in the same directory, then
//! rename over the real index).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::Result;

const INDEX_FILE_NAME: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub relative_path: String,
    pub size: u64,
    pub last_access: u64,
    pub access_count: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CacheIndex {
    entries: HashMap<String, CacheEntry>,
    #[serde(default)]
    current_size: u64,
}

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl CacheIndex {
    /// Load the index from `root`, or start with an empty one if no index
    /// file exists yet.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(INDEX_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs_err::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Persist the index to `root`, writing to a temp file first and
    /// renaming it over the real index so a reader never observes a
    /// partially-written file.
    pub fn persist(&self, root: &Path) -> Result<()> {
        let path = root.join(INDEX_FILE_NAME);
        let tmp_path = root.join(format!("{INDEX_FILE_NAME}.tmp"));
        let text = serde_json::to_string_pretty(self)?;
        fs_err::write(&tmp_path, text)?;
        fs_err::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn touch(&mut self, key: &str) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.last_access = now();
            entry.access_count += 1;
        }
    }

    pub fn insert(&mut self, key: String, relative_path: String, size: u64) {
        self.current_size += size;
        self.entries.insert(
            key.clone(),
            CacheEntry {
                key,
                relative_path,
                size,
                last_access: now(),
                access_count: 1,
            },
        );
    }

    /// Delete backing files and entries ordered by oldest `last_access`
    /// first, until `current_size <= 0.80 * max_size` or the index is
    /// empty.
    pub fn evict_if_needed(&mut self, root: &Path, max_size: u64) -> Result<Vec<String>> {
        let mut evicted = Vec::new();
        if self.current_size <= max_size {
            return Ok(evicted);
        }

        let target = (max_size as f64 * 0.80) as u64;
        let mut by_age: Vec<CacheEntry> = self.entries.values().cloned().collect();
        by_age.sort_by_key(|e| e.last_access);

        for entry in by_age {
            if self.current_size <= target {
                break;
            }
            let backing = root.join(&entry.relative_path);
            if backing.exists() {
                fs_err::remove_file(&backing)?;
            }
            self.entries.remove(&entry.key);
            self.current_size = self.current_size.saturating_sub(entry.size);
            evicted.push(entry.key);
        }

        Ok(evicted)
    }

    pub fn relative_path_for(&self, key: &str) -> Option<PathBuf> {
        self.entries.get(key).map(|e| PathBuf::from(&e.relative_path))
    }
}
