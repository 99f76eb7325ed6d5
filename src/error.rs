//! Top-level error taxonomy. Every per-crate error type converts into a
//! [`PipelineError`] variant, one aggregate enum at the binary boundary.

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("recipe could not be parsed")]
    InvalidRecipeFormat(#[source] pacbuild_recipe::RecipeError),

    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("missing runtime dependency: {0}")]
    MissingDependency(String),

    #[error("conflicting package is installed: {0}")]
    ConflictDetected(String),

    #[error("failed to download {0}")]
    DownloadFailed(String),

    #[error("checksum mismatch for {0}")]
    ChecksumMismatch(String),

    #[error("prepare hook failed with exit code {0}")]
    PrepareFailed(i32),

    #[error("build hook failed with exit code {0}")]
    BuildFailed(i32),

    #[error("package hook failed with exit code {0}")]
    PackageFailed(i32),

    #[error("build cache is corrupted: {0}")]
    CacheCorruption(String),

    #[error("failed to create archive: {0}")]
    ArchiveCreationFailed(String),

    #[error("archive verification failed: {0}")]
    ArchiveVerificationFailed(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// A stable, small exit code so calling scripts can branch on failure
    /// kind without parsing the message.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::InvalidRecipeFormat(_) => 10,
            PipelineError::MissingRequiredField(_) => 11,
            PipelineError::MissingDependency(_) => 20,
            PipelineError::ConflictDetected(_) => 21,
            PipelineError::DownloadFailed(_) => 30,
            PipelineError::ChecksumMismatch(_) => 31,
            PipelineError::PrepareFailed(_) => 40,
            PipelineError::BuildFailed(_) => 41,
            PipelineError::PackageFailed(_) => 42,
            PipelineError::CacheCorruption(_) => 50,
            PipelineError::ArchiveCreationFailed(_) => 60,
            PipelineError::ArchiveVerificationFailed(_) => 61,
            PipelineError::SigningFailed(_) => 62,
            PipelineError::Io(_) => 70,
        }
    }
}

impl From<pacbuild_recipe::RecipeError> for PipelineError {
    fn from(err: pacbuild_recipe::RecipeError) -> Self {
        PipelineError::InvalidRecipeFormat(err)
    }
}

impl From<pacbuild_source::SourceError> for PipelineError {
    fn from(err: pacbuild_source::SourceError) -> Self {
        match err {
            pacbuild_source::SourceError::ChecksumMismatch { source } => {
                PipelineError::ChecksumMismatch(source)
            }
            other => PipelineError::DownloadFailed(other.to_string()),
        }
    }
}

impl From<pacbuild_cache::CacheError> for PipelineError {
    fn from(err: pacbuild_cache::CacheError) -> Self {
        match err {
            pacbuild_cache::CacheError::Corruption { detail, .. } => {
                PipelineError::CacheCorruption(detail)
            }
            pacbuild_cache::CacheError::ArchiveCreationFailed { detail, .. } => {
                PipelineError::ArchiveCreationFailed(detail)
            }
            pacbuild_cache::CacheError::Io(e) => PipelineError::Io(e),
            other => PipelineError::CacheCorruption(other.to_string()),
        }
    }
}

impl From<pacbuild_script::ScriptError> for PipelineError {
    fn from(err: pacbuild_script::ScriptError) -> Self {
        PipelineError::Io(std::io::Error::other(err.to_string()))
    }
}

impl From<pacbuild_package::PackageError> for PipelineError {
    fn from(err: pacbuild_package::PackageError) -> Self {
        match err {
            pacbuild_package::PackageError::ArchiveCreationFailed(detail) => {
                PipelineError::ArchiveCreationFailed(detail)
            }
            pacbuild_package::PackageError::ArchiveVerificationFailed(detail) => {
                PipelineError::ArchiveVerificationFailed(detail)
            }
            pacbuild_package::PackageError::SigningFailed(detail) => {
                PipelineError::SigningFailed(detail)
            }
            pacbuild_package::PackageError::Io(e) => PipelineError::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
