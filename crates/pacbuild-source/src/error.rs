//! Error types for source fetching.

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to download {source}: {reason}")]
    DownloadFailed { source: String, reason: String },

    #[error("checksum mismatch for {source}")]
    ChecksumMismatch { source: String },

    #[error("local source file does not exist: {0}")]
    LocalFileMissing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
