//! Thin `clap`-derived CLI surface. No business logic lives here: every
//! variant just assembles a [`crate::config::Configuration`] and hands off
//! to the library core.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pacbuild", about = "A recipe-driven package build engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory the content-addressable build cache lives in.
    #[arg(long, global = true, env = "PACBUILD_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Keep the build/source/pkg scratch directories after the run.
    #[arg(long, global = true)]
    pub no_clean: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the pipeline through the build stage (prepare/build/check) and
    /// cache the result, without running the `package` hook or emitting an
    /// archive.
    Build {
        recipe_path: PathBuf,
        #[arg(long, default_value = ".")]
        start_directory: PathBuf,
    },
    /// Run the full pipeline and emit a package archive.
    Package {
        recipe_path: PathBuf,
        #[arg(long, default_value = ".")]
        start_directory: PathBuf,
        #[arg(long, default_value = ".")]
        output_directory: PathBuf,
        #[arg(long)]
        sign_key_id: Option<String>,
    },
    /// Evict cache entries over the size cap without building anything.
    Clean {
        #[arg(long, default_value_t = 5 * 1024 * 1024 * 1024)]
        max_cache_size_bytes: u64,
    },
    /// Build and package a recipe across multiple targets concurrently.
    FanOut {
        recipe_path: PathBuf,
        /// One target label per line.
        #[arg(long)]
        targets: PathBuf,
        #[arg(long, default_value = ".")]
        output_directory: PathBuf,
        #[arg(long, default_value_t = 4)]
        max_parallel: usize,
    },
}
