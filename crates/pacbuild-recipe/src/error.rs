//! Error types for recipe parsing and validation.

/// Errors produced while parsing or validating a recipe.
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("recipe could not be parsed: {0}")]
    InvalidFormat(String),

    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("checksums list has {actual} entries but there are {expected} sources")]
    ChecksumCountMismatch { expected: usize, actual: usize },

    #[error("checksum for source {source:?} is not a 64-character lowercase hex digest: {value:?}")]
    InvalidChecksum { source: String, value: String },

    #[error("recipe section [{0}] is not recognized")]
    UnknownSection(String),

    #[error("I/O error reading recipe: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecipeError>;
