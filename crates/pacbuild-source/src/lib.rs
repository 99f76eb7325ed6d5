//! Parallel source fetching with per-item checksum verification.
//!
//! A recipe's `sources` list is fetched independently and concurrently: each
//! entry is either a URL (streamed to the destination directory) or a bare
//! filename (expected to already sit next to the recipe). Once every fetch
//! has landed, each destination file's digest is checked against the
//! recipe's `checksums` list at the same index, unless that entry is `SKIP`.

pub mod digest;
pub mod error;

use std::path::{Path, PathBuf};

pub use error::{Result, SourceError};

/// The outcome of fetching and verifying a single source.
#[derive(Debug, Clone)]
pub enum Outcome {
    Verified,
    Skipped,
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Verified | Outcome::Skipped)
    }
}

/// The result of fetching one entry from a recipe's `sources` list.
#[derive(Debug, Clone)]
pub struct FetchRecord {
    pub requested: String,
    pub destination_path: PathBuf,
    pub outcome: Outcome,
}

fn basename(source: &str) -> &str {
    source.rsplit('/').next().unwrap_or(source)
}

fn is_url(source: &str) -> bool {
    url::Url::parse(source).is_ok()
}

async fn download(url: &str, destination: &Path) -> Result<()> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| SourceError::DownloadFailed {
            source: url.to_string(),
            reason: e.to_string(),
        })?;
    let response = response
        .error_for_status()
        .map_err(|e| SourceError::DownloadFailed {
            source: url.to_string(),
            reason: e.to_string(),
        })?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| SourceError::DownloadFailed {
            source: url.to_string(),
            reason: e.to_string(),
        })?;
    fs_err::write(destination, &bytes)?;
    Ok(())
}

/// Fetch and verify a single source at `index`, writing it under
/// `destination_directory` and checking it against `checksums[index]`.
async fn fetch_one(
    source: String,
    expected_checksum: Option<String>,
    destination_directory: PathBuf,
) -> FetchRecord {
    let destination_path = destination_directory.join(basename(&source));

    let fetch_result = if is_url(&source) {
        download(&source, &destination_path).await
    } else if destination_path.exists() {
        Ok(())
    } else {
        Err(SourceError::LocalFileMissing(
            destination_path.display().to_string(),
        ))
    };

    let outcome = match fetch_result {
        Err(e) => Outcome::Failed(e.to_string()),
        Ok(()) => match expected_checksum.as_deref() {
            None => Outcome::Skipped,
            Some("SKIP") => Outcome::Skipped,
            Some(expected) => match digest::digest_file(&destination_path) {
                Err(e) => Outcome::Failed(e.to_string()),
                Ok(actual) if actual == expected => Outcome::Verified,
                Ok(_) => Outcome::Failed(
                    SourceError::ChecksumMismatch {
                        source: source.clone(),
                    }
                    .to_string(),
                ),
            },
        },
    };

    FetchRecord {
        requested: source,
        destination_path,
        outcome,
    }
}

/// Fetch every entry in `sources`, verifying each against the checksum at
/// the same index in `checksums` (if any), concurrently. Missing entries in
/// `checksums` (a shorter list, or an entirely empty one) are treated as
/// unverified rather than as an error — the recipe crate's own validation is
/// responsible for rejecting a checksum count that disagrees with the
/// source count.
pub async fn fetch_all(
    sources: &[String],
    checksums: &[String],
    destination_directory: &Path,
) -> Vec<FetchRecord> {
    let mut tasks = tokio::task::JoinSet::new();

    for (index, source) in sources.iter().enumerate() {
        let source = source.clone();
        let expected_checksum = checksums.get(index).cloned();
        let destination_directory = destination_directory.to_path_buf();
        tasks.spawn(fetch_one(source, expected_checksum, destination_directory));
    }

    let mut records = Vec::with_capacity(sources.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(record) => records.push(record),
            Err(join_error) => {
                tracing::error!(%join_error, "source fetch task panicked");
            }
        }
    }

    // JoinSet does not preserve spawn order; restore it so callers can zip
    // records back up against the recipe's `sources`/`checksums` lists.
    records.sort_by_key(|r| sources.iter().position(|s| s == &r.requested).unwrap_or(0));
    records
}
