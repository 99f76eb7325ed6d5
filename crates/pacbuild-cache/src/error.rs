//! Error types for the build cache.

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache index at {path} refers to a missing or unreadable backing file: {detail}")]
    Corruption { path: String, detail: String },

    #[error("failed to create archive for cache entry {key}: {detail}")]
    ArchiveCreationFailed { key: String, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache index is not valid JSON: {0}")]
    IndexFormat(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;
