//! Bounded-concurrency fan-out across multiple build targets: a
//! `tokio::sync::Semaphore` caps how many pipelines run at once, and a
//! `JoinSet` collects per-target results, including panics.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;

use crate::config::Configuration;
use crate::pipeline::{Pipeline, RunMode};

/// One cross-architecture (or otherwise labeled) build target.
#[derive(Debug, Clone)]
pub struct Target {
    pub label: String,
    pub start_directory: PathBuf,
    pub output_directory: PathBuf,
}

/// Per-target outcome of a fan-out run.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub label: String,
    pub success: bool,
    pub artifact_path: Option<PathBuf>,
    pub reason: Option<String>,
    pub build_millis: u128,
    pub artifact_bytes: u64,
}

/// The aggregate report across every target.
#[derive(Debug, Clone)]
pub struct FanOutReport {
    pub targets: Vec<TargetReport>,
}

impl FanOutReport {
    pub fn success_count(&self) -> usize {
        self.targets.iter().filter(|t| t.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.targets.len() - self.success_count()
    }

    pub fn total_build_millis(&self) -> u128 {
        self.targets.iter().map(|t| t.build_millis).sum()
    }

    pub fn mean_build_millis(&self) -> u128 {
        if self.targets.is_empty() {
            0
        } else {
            self.total_build_millis() / self.targets.len() as u128
        }
    }

    pub fn total_artifact_bytes(&self) -> u64 {
        self.targets.iter().map(|t| t.artifact_bytes).sum()
    }

    /// Non-zero when at least one target failed, matching the CLI's
    /// process-exit contract.
    pub fn exit_code(&self) -> i32 {
        if self.failure_count() == 0 {
            0
        } else {
            1
        }
    }
}

/// Runs `recipe` against every target, at most `max_parallel` at once.
/// Targets are drained in input order; completion order is not promised.
/// A worker crash (panic) is converted into a failure record rather than
/// propagated, so sibling targets are never aborted by one failure.
pub async fn run_fan_out(
    configuration: &Configuration,
    recipe: Arc<pacbuild_recipe::Recipe>,
    recipe_body: Arc<String>,
    targets: Vec<Target>,
) -> FanOutReport {
    let semaphore = Arc::new(Semaphore::new(configuration.max_fan_out_concurrency.max(1)));
    let mut tasks = tokio::task::JoinSet::new();

    for target in targets {
        let semaphore = semaphore.clone();
        let recipe = recipe.clone();
        let recipe_body = recipe_body.clone();
        let configuration = configuration.clone();

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
            let started = Instant::now();

            let pipeline = Pipeline::new(&configuration);
            let result = pipeline
                .run(
                    &recipe,
                    &recipe_body,
                    &target.start_directory,
                    &target.output_directory,
                    RunMode::Package,
                )
                .await;
            let build_millis = started.elapsed().as_millis();

            match result {
                Ok(report) => {
                    let artifact_bytes = report
                        .artifact_path
                        .as_deref()
                        .and_then(|p| fs_err::metadata(p).ok())
                        .map(|m| m.len())
                        .unwrap_or(0);
                    TargetReport {
                        label: target.label,
                        success: true,
                        artifact_path: report.artifact_path,
                        reason: None,
                        build_millis,
                        artifact_bytes,
                    }
                }
                Err(e) => TargetReport {
                    label: target.label,
                    success: false,
                    artifact_path: None,
                    reason: Some(e.to_string()),
                    build_millis,
                    artifact_bytes: 0,
                },
            }
        });
    }

    let mut targets_reports = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(report) => targets_reports.push(report),
            Err(join_error) => {
                tracing::error!(%join_error, "fan-out worker crashed");
                targets_reports.push(TargetReport {
                    label: "<crashed worker>".to_string(),
                    success: false,
                    artifact_path: None,
                    reason: Some(join_error.to_string()),
                    build_millis: 0,
                    artifact_bytes: 0,
                });
            }
        }
    }

    FanOutReport {
        targets: targets_reports,
    }
}
