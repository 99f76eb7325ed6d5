//! Thin CLI entry point: parses arguments, wires up logging, builds a
//! `Configuration`, and dispatches to the library core. No business logic
//! lives here.

mod opt;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use opt::{Cli, Commands};
use pacbuild::config::Configuration;
use pacbuild::pipeline::{Pipeline, RunMode};
use pacbuild::{fanout, recipe_io};

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn build_configuration(cli: &Cli) -> Configuration {
    let mut configuration = Configuration::default().with_no_clean(cli.no_clean);
    if let Some(cache_dir) = &cli.cache_dir {
        configuration = configuration.with_cache_directory(cache_dir.clone());
    }
    configuration
}

async fn run() -> i32 {
    let cli = Cli::parse();
    let configuration = build_configuration(&cli);

    match cli.command {
        Commands::Build {
            recipe_path,
            start_directory,
        } => {
            let (recipe, body) = match recipe_io::load(&recipe_path) {
                Ok(v) => v,
                Err(e) => {
                    tracing::error!(%e, "failed to load recipe");
                    return e.exit_code();
                }
            };
            let pipeline = Pipeline::new(&configuration);
            match pipeline
                .run(&recipe, &body, &start_directory, &start_directory, RunMode::BuildOnly)
                .await
            {
                Ok(report) => {
                    tracing::info!(state = ?report.state, "build complete");
                    0
                }
                Err(e) => {
                    tracing::error!(%e, "build failed");
                    e.exit_code()
                }
            }
        }
        Commands::Package {
            recipe_path,
            start_directory,
            output_directory,
            sign_key_id,
        } => {
            let configuration = configuration.with_signing_key_id(sign_key_id);
            let (recipe, body) = match recipe_io::load(&recipe_path) {
                Ok(v) => v,
                Err(e) => {
                    tracing::error!(%e, "failed to load recipe");
                    return e.exit_code();
                }
            };
            let pipeline = Pipeline::new(&configuration);
            match pipeline
                .run(&recipe, &body, &start_directory, &output_directory, RunMode::Package)
                .await
            {
                Ok(report) => {
                    let artifact_path = report
                        .artifact_path
                        .expect("RunMode::Package always produces an artifact on success");
                    println!("{}", artifact_path.display());
                    0
                }
                Err(e) => {
                    tracing::error!(%e, "package failed");
                    e.exit_code()
                }
            }
        }
        Commands::Clean {
            max_cache_size_bytes,
        } => {
            let mut cache = match pacbuild_cache::BuildCache::open(
                configuration.cache_directory.clone(),
                max_cache_size_bytes,
            ) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!(%e, "failed to open cache");
                    return 50;
                }
            };
            match cache.evict_if_needed() {
                Ok(evicted) => {
                    tracing::info!(count = evicted.len(), "evicted cache entries");
                    0
                }
                Err(e) => {
                    tracing::error!(%e, "clean failed");
                    50
                }
            }
        }
        Commands::FanOut {
            recipe_path,
            targets,
            output_directory,
            max_parallel,
        } => {
            let configuration = configuration.with_max_fan_out_concurrency(max_parallel);
            let (recipe, body) = match recipe_io::load(&recipe_path) {
                Ok(v) => v,
                Err(e) => {
                    tracing::error!(%e, "failed to load recipe");
                    return e.exit_code();
                }
            };
            let targets_text = match fs_err::read_to_string(&targets) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(%e, "failed to read targets file");
                    return 70;
                }
            };
            let target_list: Vec<fanout::Target> = targets_text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|label| fanout::Target {
                    label: label.to_string(),
                    start_directory: PathBuf::from(label),
                    output_directory: output_directory.clone(),
                })
                .collect();

            let report =
                fanout::run_fan_out(&configuration, Arc::new(recipe), Arc::new(body), target_list).await;
            for target in &report.targets {
                if target.success {
                    tracing::info!(label = %target.label, "target succeeded");
                } else {
                    tracing::error!(label = %target.label, reason = ?target.reason, "target failed");
                }
            }
            report.exit_code()
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();
    let exit_code = run().await;
    std::process::exit(exit_code);
}
