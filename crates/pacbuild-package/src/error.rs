//! Error types for archive composition.

#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("failed to create archive: {0}")]
    ArchiveCreationFailed(String),

    #[error("archive verification failed: {0}")]
    ArchiveVerificationFailed(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PackageError>;
