//! The build pipeline: probe, provision, fetch-or-cache-hit, run hooks, and
//! (for [`RunMode::Package`] runs) package and archive. Assembled from the
//! component crates, following the shape "resolve/probe, provision,
//! fetch-or-cache-hit, run script phases, package, clean up on every exit
//! path".

use std::path::{Path, PathBuf};

use pacbuild_cache::BuildCache;
use pacbuild_recipe::{HookKind, Recipe};
use pacbuild_script::{HookExecutor, VariableEnvironment};

use crate::config::Configuration;
use crate::dependency_probe::{self, DependencyProbe, NullDependencyProbe};
use crate::error::{PipelineError, Result};
use crate::state::PipelineState;

/// Directories a single pipeline invocation owns for its lifetime.
pub struct Workspace {
    pub build_directory: PathBuf,
    pub source_directory: PathBuf,
    pub package_directory: PathBuf,
}

impl Workspace {
    pub fn provision(start_directory: &Path) -> std::io::Result<Self> {
        let build_directory = start_directory.join("build");
        let source_directory = start_directory.join("source");
        let package_directory = start_directory.join("pkg");
        fs_err::create_dir_all(&build_directory)?;
        fs_err::create_dir_all(&source_directory)?;
        fs_err::create_dir_all(&package_directory)?;
        Ok(Self {
            build_directory,
            source_directory,
            package_directory,
        })
    }
}

/// How far a pipeline run should proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Stop once the build/check stages have run and the source tree is
    /// cached; no `package` hook, no archive.
    BuildOnly,
    /// Run through archive composition, verification, and (if configured)
    /// signing.
    Package,
}

/// Outcome of a successful pipeline run. `artifact_path` is only ever
/// populated for [`RunMode::Package`] runs.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub artifact_path: Option<PathBuf>,
    pub state: PipelineState,
    pub check_hook_failed: bool,
}

/// Orchestrates one recipe's build, from dependency probing through
/// archive verification.
pub struct Pipeline<'a> {
    configuration: &'a Configuration,
    probe: Box<dyn DependencyProbe>,
}

impl<'a> Pipeline<'a> {
    pub fn new(configuration: &'a Configuration) -> Self {
        Self {
            configuration,
            probe: Box::new(NullDependencyProbe),
        }
    }

    pub fn with_probe(mut self, probe: Box<dyn DependencyProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Run the pipeline for `recipe` (whose original body text is
    /// `recipe_body`, needed verbatim for cache key derivation) inside
    /// `start_directory`, depositing the final archive in
    /// `output_directory` when `mode` is [`RunMode::Package`].
    pub async fn run(
        &self,
        recipe: &Recipe,
        recipe_body: &str,
        start_directory: &Path,
        output_directory: &Path,
        mode: RunMode,
    ) -> Result<PipelineReport> {
        let mut state = PipelineState::Init;
        let result = self
            .run_inner(recipe, recipe_body, start_directory, output_directory, mode, &mut state)
            .await;

        if result.is_err() {
            state = PipelineState::Failed;
        }
        if self.configuration.no_clean {
            return result.map(|(artifact_path, check_hook_failed)| PipelineReport {
                artifact_path,
                state,
                check_hook_failed,
            });
        }

        // Scratch directories are cleaned on every exit path, success or
        // failure; the cache directory and the emitted archive survive.
        let _ = fs_err::remove_dir_all(start_directory.join("build"));
        let _ = fs_err::remove_dir_all(start_directory.join("source"));
        let _ = fs_err::remove_dir_all(start_directory.join("pkg"));

        result.map(|(artifact_path, check_hook_failed)| PipelineReport {
            artifact_path,
            state,
            check_hook_failed,
        })
    }

    async fn run_inner(
        &self,
        recipe: &Recipe,
        recipe_body: &str,
        start_directory: &Path,
        output_directory: &Path,
        mode: RunMode,
        state: &mut PipelineState,
    ) -> Result<(Option<PathBuf>, bool)> {
        // 1. Dependency probe.
        let missing = dependency_probe::missing_dependencies(&recipe.runtime_dependencies, self.probe.as_ref());
        if let Some(first) = missing.first() {
            tracing::error!(dependency = %first, "missing runtime dependency");
            return Err(PipelineError::MissingDependency(first.to_string()));
        }

        // 2. Conflict probe.
        let conflicts = dependency_probe::present_conflicts(&recipe.conflicts, self.probe.as_ref());
        if let Some(first) = conflicts.first() {
            tracing::error!(conflict = %first, "conflicting package is installed");
            return Err(PipelineError::ConflictDetected(first.clone()));
        }
        *state = PipelineState::Probed;

        // 3. Directory provisioning.
        let workspace = Workspace::provision(start_directory)?;
        *state = PipelineState::Provisioned;

        // 4. Cache lookup.
        let mut cache = BuildCache::open(
            self.configuration.cache_directory.clone(),
            self.configuration.max_cache_size_bytes,
        )?;
        let cache_key = pacbuild_cache::key::compute_key(recipe_body, &recipe.sources);
        let cache_hit = cache.lookup(&cache_key)?;

        if let Some(archive_path) = cache_hit {
            tracing::info!(key = %cache_key, "cache hit, skipping fetch");
            cache.extract(&archive_path, &workspace.source_directory)?;
            *state = PipelineState::CacheHit;
        } else {
            tracing::info!(key = %cache_key, "cache miss, fetching sources");
            let records = pacbuild_source::fetch_all(
                &recipe.sources,
                &recipe.checksums,
                &workspace.source_directory,
            )
            .await;
            for record in &records {
                if let pacbuild_source::Outcome::Failed(reason) = &record.outcome {
                    tracing::error!(source = %record.requested, reason = %reason, "fetch failed");
                    if reason.contains("checksum mismatch") {
                        return Err(PipelineError::ChecksumMismatch(record.requested.clone()));
                    }
                    return Err(PipelineError::DownloadFailed(record.requested.clone()));
                }
            }
            *state = PipelineState::Fetched;
        }

        // 6. Build stages.
        let environment = VariableEnvironment::new(
            start_directory.to_path_buf(),
            workspace.source_directory.clone(),
            workspace.package_directory.clone(),
            recipe.name.clone(),
            recipe.version.clone(),
            recipe.release.clone(),
        );
        let executor = HookExecutor::detect().map_err(PipelineError::from)?;

        let prepare_result = executor.run(recipe, HookKind::Prepare, &environment).await?;
        if !prepare_result.success {
            tracing::error!(exit_code = prepare_result.exit_code, "prepare hook failed");
            return Err(PipelineError::PrepareFailed(prepare_result.exit_code));
        }

        let build_result = executor.run(recipe, HookKind::Build, &environment).await?;
        if !build_result.success {
            tracing::error!(exit_code = build_result.exit_code, "build hook failed");
            return Err(PipelineError::BuildFailed(build_result.exit_code));
        }

        let mut check_hook_failed = false;
        let check_result = executor.run(recipe, HookKind::Check, &environment).await?;
        if !check_result.success && !check_result.skipped {
            tracing::warn!(exit_code = check_result.exit_code, "check hook failed, continuing");
            check_hook_failed = true;
        }

        if cache.lookup(&cache_key)?.is_none() {
            cache.store(&cache_key, &workspace.source_directory)?;
        }
        *state = PipelineState::Built;

        if mode == RunMode::BuildOnly {
            *state = PipelineState::Done;
            return Ok((None, check_hook_failed));
        }

        // 7. Package stage.
        let package_result = executor.run(recipe, HookKind::Package, &environment).await?;
        if !package_result.success {
            tracing::error!(exit_code = package_result.exit_code, "package hook failed");
            return Err(PipelineError::PackageFailed(package_result.exit_code));
        }
        *state = PipelineState::Packaged;

        // 8. Archive composition + verification.
        let composer = pacbuild_package::ArchiveComposer;
        let archive_path = composer.compose(recipe, &workspace.package_directory, output_directory)?;
        composer.verify(&archive_path)?;
        if let Some(key_id) = &self.configuration.signing_key_id {
            composer.sign(&archive_path, Some(key_id)).await?;
        }
        *state = PipelineState::Archived;
        *state = PipelineState::Done;

        Ok((Some(archive_path), check_hook_failed))
    }
}
