//! Content-addressable build cache with LRU eviction.
//!
//! A successful build's source directory is compressed into the cache
//! under a key derived from the recipe body and its source list
//! ([`key::compute_key`]). Later runs of the same recipe with the same
//! sources hit the cache and skip straight past the fetch stage.

pub mod error;
pub mod index;
pub mod key;

use std::fs::File;
use std::path::{Path, PathBuf};

pub use error::{CacheError, Result};
pub use index::CacheEntry;
use index::CacheIndex;

/// A content-addressable store of prior build outputs, rooted at one
/// directory on disk. Operations are serialized per process: callers are
/// expected to hold one `BuildCache` per process, not one per thread.
pub struct BuildCache {
    root: PathBuf,
    max_size: u64,
    index: CacheIndex,
}

impl BuildCache {
    /// Open (or initialize) the cache rooted at `root`, capped at
    /// `max_size` bytes.
    pub fn open(root: impl Into<PathBuf>, max_size: u64) -> Result<Self> {
        let root = root.into();
        fs_err::create_dir_all(&root)?;
        let index = CacheIndex::load(&root)?;
        Ok(Self {
            root,
            max_size,
            index,
        })
    }

    fn archive_relative_path(key: &str) -> String {
        format!("{key}.tar.zst")
    }

    /// Look up `key`. Bumps `last_access` and `access_count` on hit.
    pub fn lookup(&mut self, key: &str) -> Result<Option<PathBuf>> {
        let Some(relative_path) = self.index.relative_path_for(key) else {
            return Ok(None);
        };
        let archive_path = self.root.join(&relative_path);
        if !archive_path.exists() {
            return Ok(None);
        }
        self.index.touch(key);
        self.index.persist(&self.root)?;
        Ok(Some(archive_path))
    }

    /// Compress `source_directory` and record it under `key`, then run
    /// eviction and persist the index.
    pub fn store(&mut self, key: &str, source_directory: &Path) -> Result<PathBuf> {
        let relative_path = Self::archive_relative_path(key);
        let archive_path = self.root.join(&relative_path);

        let file = File::create(&archive_path).map_err(|e| CacheError::ArchiveCreationFailed {
            key: key.to_string(),
            detail: e.to_string(),
        })?;
        let encoder = zstd::Encoder::new(file, 0).map_err(|e| CacheError::ArchiveCreationFailed {
            key: key.to_string(),
            detail: e.to_string(),
        })?;
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_dir_all(".", source_directory)
            .map_err(|e| CacheError::ArchiveCreationFailed {
                key: key.to_string(),
                detail: e.to_string(),
            })?;
        let encoder = builder
            .into_inner()
            .map_err(|e| CacheError::ArchiveCreationFailed {
                key: key.to_string(),
                detail: e.to_string(),
            })?;
        encoder
            .finish()
            .map_err(|e| CacheError::ArchiveCreationFailed {
                key: key.to_string(),
                detail: e.to_string(),
            })?;

        let size = fs_err::metadata(&archive_path)?.len();
        self.index.insert(key.to_string(), relative_path, size);

        let evicted = self.index.evict_if_needed(&self.root, self.max_size)?;
        for evicted_key in &evicted {
            tracing::info!(key = %evicted_key, "evicted cache entry");
        }
        self.index.persist(&self.root)?;

        Ok(archive_path)
    }

    /// Expand `archive_path` into `destination_directory`, creating it
    /// first if needed.
    pub fn extract(&self, archive_path: &Path, destination_directory: &Path) -> Result<()> {
        fs_err::create_dir_all(destination_directory)?;
        let file = File::open(archive_path)?;
        let decoder = zstd::Decoder::new(file)?;
        let mut archive = tar::Archive::new(decoder);
        archive.unpack(destination_directory)?;
        Ok(())
    }

    /// Force an eviction pass without a preceding store, e.g. for a
    /// `clean` CLI verb. Returns the evicted keys.
    pub fn evict_if_needed(&mut self) -> Result<Vec<String>> {
        let evicted = self.index.evict_if_needed(&self.root, self.max_size)?;
        self.index.persist(&self.root)?;
        Ok(evicted)
    }

    pub fn current_size(&self) -> u64 {
        self.index.current_size()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn populate(dir: &Path) {
        fs::write(dir.join("hello.c"), b"int main(void) { return 0; }\n").unwrap();
    }

    #[test]
    fn store_then_lookup_round_trips_the_directory_tree() {
        let cache_dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        populate(source_dir.path());

        let mut cache = BuildCache::open(cache_dir.path(), 10 * 1024 * 1024).unwrap();
        let key = key::compute_key("name=hello\n", &["hello.c".to_string()]);
        cache.store(&key, source_dir.path()).unwrap();

        let archive_path = cache.lookup(&key).unwrap().expect("should hit");

        let extract_dir = tempfile::tempdir().unwrap();
        cache.extract(&archive_path, extract_dir.path()).unwrap();

        let restored = fs::read_to_string(extract_dir.path().join("hello.c")).unwrap();
        assert_eq!(restored, "int main(void) { return 0; }\n");
    }

    #[test]
    fn miss_on_unknown_key_returns_none() {
        let cache_dir = tempfile::tempdir().unwrap();
        let mut cache = BuildCache::open(cache_dir.path(), 10 * 1024 * 1024).unwrap();
        assert!(cache.lookup("0".repeat(64).as_str()).unwrap().is_none());
    }

    #[test]
    fn eviction_keeps_current_size_under_eighty_percent_of_max() {
        let cache_dir = tempfile::tempdir().unwrap();
        // Tiny cap so a handful of small archives forces eviction.
        let mut cache = BuildCache::open(cache_dir.path(), 200).unwrap();

        for i in 0..8 {
            let source_dir = tempfile::tempdir().unwrap();
            fs::write(
                source_dir.path().join("payload"),
                format!("payload-{i}").repeat(20),
            )
            .unwrap();
            let key = key::compute_key(&format!("name=pkg{i}\n"), &[format!("src{i}.c")]);
            cache.store(&key, source_dir.path()).unwrap();
        }

        assert!(cache.current_size() <= (200.0 * 0.80) as u64 || cache.is_empty());
    }

    #[test]
    fn index_persists_across_reopen() {
        let cache_dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        populate(source_dir.path());

        let key = key::compute_key("name=hello\n", &["hello.c".to_string()]);
        {
            let mut cache = BuildCache::open(cache_dir.path(), 10 * 1024 * 1024).unwrap();
            cache.store(&key, source_dir.path()).unwrap();
        }

        let mut reopened = BuildCache::open(cache_dir.path(), 10 * 1024 * 1024).unwrap();
        assert!(reopened.lookup(&key).unwrap().is_some());
    }
}
