//! The variable environment injected into every hook invocation.

use std::path::{Path, PathBuf};

/// Paths and identifiers exported into a hook's child process environment.
#[derive(Debug, Clone)]
pub struct VariableEnvironment {
    pub source_directory: PathBuf,
    pub package_directory: PathBuf,
    pub start_directory: PathBuf,
    pub name: String,
    pub version: String,
    pub release: String,
    pub toolchain: ToolchainHints,
}

/// A fixed set of compiler/link/parallelism hints, resolved once per
/// pipeline invocation and exported alongside the recipe-derived variables.
#[derive(Debug, Clone)]
pub struct ToolchainHints {
    pub cc: String,
    pub cxx: String,
    pub ld: String,
    pub jobs: String,
}

impl ToolchainHints {
    /// Resolve toolchain hints from whatever is on `PATH`, falling back to
    /// conventional names when a tool cannot be located — the hint is
    /// advisory, not a hard dependency, so an unresolved `which` lookup is
    /// not an error here.
    pub fn detect() -> Self {
        let cc = which::which("cc")
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "cc".to_string());
        let cxx = which::which("c++")
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "c++".to_string());
        let ld = which::which("ld")
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "ld".to_string());
        let jobs = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .to_string();
        Self { cc, cxx, ld, jobs }
    }
}

impl VariableEnvironment {
    pub fn new(
        start_directory: impl Into<PathBuf>,
        source_directory: impl Into<PathBuf>,
        package_directory: impl Into<PathBuf>,
        name: impl Into<String>,
        version: impl Into<String>,
        release: impl Into<String>,
    ) -> Self {
        Self {
            source_directory: source_directory.into(),
            package_directory: package_directory.into(),
            start_directory: start_directory.into(),
            name: name.into(),
            version: version.into(),
            release: release.into(),
            toolchain: ToolchainHints::detect(),
        }
    }

    /// The `KEY=value` pairs exported into a hook's child process.
    pub fn as_env_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("source_directory".to_string(), path_string(&self.source_directory)),
            ("package_directory".to_string(), path_string(&self.package_directory)),
            ("start_directory".to_string(), path_string(&self.start_directory)),
            ("name".to_string(), self.name.clone()),
            ("version".to_string(), self.version.clone()),
            ("release".to_string(), self.release.clone()),
            ("CC".to_string(), self.toolchain.cc.clone()),
            ("CXX".to_string(), self.toolchain.cxx.clone()),
            ("LD".to_string(), self.toolchain.ld.clone()),
            ("MAKEFLAGS".to_string(), format!("-j{}", self.toolchain.jobs)),
        ]
    }

    /// The working directory a hook should run in: `package_directory` for
    /// the `package` hook, `source_directory` for every other hook.
    pub fn working_directory(&self, hook: pacbuild_recipe::HookKind) -> &Path {
        match hook {
            pacbuild_recipe::HookKind::Package => &self.package_directory,
            _ => &self.source_directory,
        }
    }
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}
