//! Stages sidecars into a package directory, then composes it into a
//! compressed, metadata-bearing archive.

use std::fs::File;
use std::path::{Path, PathBuf};

use pacbuild_recipe::Recipe;

use crate::error::{PackageError, Result};
use crate::{manifest, package_info};

const ARCHIVE_SUFFIX: &str = "zst";

fn regular_file_size_total(package_directory: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in walkdir_simple(package_directory)? {
        let relative = entry
            .strip_prefix(package_directory)
            .expect("entry is under package_directory")
            .to_string_lossy()
            .replace('\\', "/");
        if relative == "package-info" || relative == "manifest" {
            continue;
        }
        total += fs_err::metadata(&entry)?.len();
    }
    Ok(total)
}

fn walkdir_simple(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for item in fs_err::read_dir(&current)? {
            let item = item?;
            let path = item.path();
            if item.file_type()?.is_dir() {
                stack.push(path);
            } else if item.file_type()?.is_file() {
                files.push(path);
            }
        }
    }
    Ok(files)
}

/// Chosen architecture for a recipe: `architectures[0]`, or the literal
/// `any` when the list is empty.
pub fn chosen_architecture(recipe: &Recipe) -> &str {
    recipe.default_architecture()
}

/// Archive file name for a recipe packaged for `architecture`.
pub fn archive_file_name(recipe: &Recipe, architecture: &str) -> String {
    format!(
        "{}-{}-{}-{}.pkg.tar.{}",
        recipe.name, recipe.version, recipe.release, architecture, ARCHIVE_SUFFIX
    )
}

/// Composes a package directory into a compressed archive under
/// `output_directory`.
pub struct ArchiveComposer;

impl ArchiveComposer {
    /// Write the `package-info` and `manifest` sidecars into
    /// `package_directory`, compress the directory into
    /// `output_directory/<archive name>`, then delete the sidecars (they
    /// live only inside the archive, not on the staging directory
    /// afterward).
    pub fn compose(
        &self,
        recipe: &Recipe,
        package_directory: &Path,
        output_directory: &Path,
    ) -> Result<PathBuf> {
        let architecture = chosen_architecture(recipe).to_string();
        let size = regular_file_size_total(package_directory)?;
        let builddate = chrono::Utc::now().timestamp();

        let info_text = package_info::render(recipe, &architecture, size, builddate);
        let manifest_text = manifest::render(package_directory)?;

        let info_path = package_directory.join("package-info");
        let manifest_path = package_directory.join("manifest");
        fs_err::write(&info_path, &info_text)?;
        fs_err::write(&manifest_path, &manifest_text)?;

        fs_err::create_dir_all(output_directory)?;
        let archive_path = output_directory.join(archive_file_name(recipe, &architecture));

        let result = self.write_archive(package_directory, &archive_path);

        // Sidecars are archive-only artifacts; the staging directory must
        // not keep them around regardless of whether compression succeeded.
        let _ = fs_err::remove_file(&info_path);
        let _ = fs_err::remove_file(&manifest_path);

        result?;
        Ok(archive_path)
    }

    fn write_archive(&self, package_directory: &Path, archive_path: &Path) -> Result<()> {
        let file = File::create(archive_path)
            .map_err(|e| PackageError::ArchiveCreationFailed(e.to_string()))?;
        let encoder =
            zstd::Encoder::new(file, 0).map_err(|e| PackageError::ArchiveCreationFailed(e.to_string()))?;
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_dir_all(".", package_directory)
            .map_err(|e| PackageError::ArchiveCreationFailed(e.to_string()))?;
        let encoder = builder
            .into_inner()
            .map_err(|e| PackageError::ArchiveCreationFailed(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| PackageError::ArchiveCreationFailed(e.to_string()))?;
        Ok(())
    }

    /// List the archive's members without extracting, asserting that both
    /// `package-info` and `manifest` are present.
    pub fn verify(&self, archive_path: &Path) -> Result<Vec<String>> {
        let file = File::open(archive_path)?;
        let decoder = zstd::Decoder::new(file)?;
        let mut archive = tar::Archive::new(decoder);

        let mut members = Vec::new();
        for entry in archive
            .entries()
            .map_err(|e| PackageError::ArchiveVerificationFailed(e.to_string()))?
        {
            let entry = entry.map_err(|e| PackageError::ArchiveVerificationFailed(e.to_string()))?;
            let path = entry
                .path()
                .map_err(|e| PackageError::ArchiveVerificationFailed(e.to_string()))?
                .to_string_lossy()
                .replace('\\', "/");
            members.push(path);
        }

        let has_info = members.iter().any(|m| m == "./package-info" || m == "package-info");
        let has_manifest = members.iter().any(|m| m == "./manifest" || m == "manifest");
        if !has_info || !has_manifest {
            return Err(PackageError::ArchiveVerificationFailed(
                "archive is missing package-info or manifest".to_string(),
            ));
        }

        Ok(members)
    }

    /// Invoke an external signer keyed by `key_id`, writing a detached
    /// signature to `<archive_path>.sig`. A missing `key_id` is a skip, not
    /// a failure: signing is opt-in.
    pub async fn sign(&self, archive_path: &Path, key_id: Option<&str>) -> Result<()> {
        let Some(key_id) = key_id else {
            tracing::info!("no signing key configured, skipping signature");
            return Ok(());
        };

        let Ok(signer) = which::which("gpg") else {
            tracing::warn!("signing key configured but no signer binary found, skipping");
            return Ok(());
        };

        let signature_path = archive_path.with_extension(format!(
            "{}.sig",
            archive_path.extension().and_then(|e| e.to_str()).unwrap_or("")
        ));

        let status = tokio::process::Command::new(signer)
            .arg("--local-user")
            .arg(key_id)
            .arg("--detach-sign")
            .arg("--output")
            .arg(&signature_path)
            .arg(archive_path)
            .status()
            .await?;

        if !status.success() {
            return Err(PackageError::SigningFailed(format!(
                "signer exited with {status}"
            )));
        }
        Ok(())
    }
}
