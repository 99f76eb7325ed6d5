//! Pipeline-wide configuration: the knobs a single invocation needs,
//! constructed with sensible defaults and a small builder API.

use std::path::PathBuf;
use std::sync::Arc;

use indicatif::MultiProgress;

const DEFAULT_MAX_CACHE_SIZE_BYTES: u64 = 5 * 1024 * 1024 * 1024;
const DEFAULT_MAX_FAN_OUT_CONCURRENCY: usize = 4;

#[derive(Clone)]
pub struct Configuration {
    pub cache_directory: PathBuf,
    pub max_cache_size_bytes: u64,
    pub max_fan_out_concurrency: usize,
    pub no_clean: bool,
    pub signing_key_id: Option<String>,
    pub progress: Arc<MultiProgress>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            cache_directory: default_cache_directory(),
            max_cache_size_bytes: DEFAULT_MAX_CACHE_SIZE_BYTES,
            max_fan_out_concurrency: DEFAULT_MAX_FAN_OUT_CONCURRENCY,
            no_clean: false,
            signing_key_id: None,
            progress: Arc::new(MultiProgress::new()),
        }
    }
}

impl Configuration {
    pub fn with_cache_directory(mut self, cache_directory: impl Into<PathBuf>) -> Self {
        self.cache_directory = cache_directory.into();
        self
    }

    pub fn with_max_cache_size_bytes(mut self, max_cache_size_bytes: u64) -> Self {
        self.max_cache_size_bytes = max_cache_size_bytes;
        self
    }

    pub fn with_max_fan_out_concurrency(mut self, max_fan_out_concurrency: usize) -> Self {
        self.max_fan_out_concurrency = max_fan_out_concurrency.max(1);
        self
    }

    pub fn with_no_clean(mut self, no_clean: bool) -> Self {
        self.no_clean = no_clean;
        self
    }

    pub fn with_signing_key_id(mut self, signing_key_id: Option<String>) -> Self {
        self.signing_key_id = signing_key_id;
        self
    }
}

fn default_cache_directory() -> PathBuf {
    std::env::var_os("PACBUILD_CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs_cache_fallback().join("pacbuild")
        })
}

fn dirs_cache_fallback() -> PathBuf {
    std::env::temp_dir()
}
