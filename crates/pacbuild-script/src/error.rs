//! Error types for the hook executor.

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("no POSIX-compatible shell interpreter could be located: {0}")]
    ShellNotFound(#[from] which::Error),

    #[error("failed to spawn hook script: {0}")]
    Spawn(std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScriptError>;
