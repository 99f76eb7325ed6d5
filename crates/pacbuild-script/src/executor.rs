//! Staged hook executor: extracts a named hook body from a recipe, runs it
//! inside the variable environment, and captures its output.

use std::process::Stdio;

use pacbuild_recipe::{HookKind, Recipe};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::environment::VariableEnvironment;
use crate::error::Result;

const SAFETY_PREAMBLE: &str = "set -e\nset -u\n";

/// The outcome of running one hook.
#[derive(Debug, Clone)]
pub struct HookResult {
    pub hook: HookKind,
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub skipped: bool,
}

impl HookResult {
    fn skipped(hook: HookKind) -> Self {
        tracing::info!(hook = hook.as_str(), "hook missing, skipping");
        Self {
            hook,
            success: true,
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            skipped: true,
        }
    }
}

/// Runs recipe hooks against a [`VariableEnvironment`] via a POSIX-compatible
/// shell interpreter.
pub struct HookExecutor {
    shell_path: std::path::PathBuf,
}

impl HookExecutor {
    /// Locate a POSIX-compatible shell interpreter on `PATH`.
    pub fn detect() -> Result<Self> {
        let shell_path = which::which("sh")?;
        Ok(Self { shell_path })
    }

    pub fn with_shell(shell_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            shell_path: shell_path.into(),
        }
    }

    /// Run `hook` extracted from `recipe`'s body inside `environment`. A
    /// missing hook is not an error: it returns an immediately-successful,
    /// empty result.
    pub async fn run(
        &self,
        recipe: &Recipe,
        hook: HookKind,
        environment: &VariableEnvironment,
    ) -> Result<HookResult> {
        let body = recipe.hook(hook);
        if body.trim().is_empty() {
            return Ok(HookResult::skipped(hook));
        }

        let script_text = format!("{SAFETY_PREAMBLE}{body}\n");
        let script_file = tempfile::Builder::new()
            .prefix("pacbuild-hook-")
            .suffix(".sh")
            .tempfile()?;
        fs_err::write(script_file.path(), &script_text)?;
        set_executable(script_file.path())?;

        let working_directory = environment.working_directory(hook);
        let mut command = Command::new(&self.shell_path);
        command
            .arg(script_file.path())
            .current_dir(working_directory)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in environment.as_env_pairs() {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(crate::error::ScriptError::Spawn)?;
        let stdout_pipe = child.stdout.take().expect("stdout was piped");
        let stderr_pipe = child.stderr.take().expect("stderr was piped");

        let mut stdout_lines = BufReader::new(stdout_pipe).lines();
        let mut stderr_lines = BufReader::new(stderr_pipe).lines();
        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut stdout_done = false;
        let mut stderr_done = false;

        while !stdout_done || !stderr_done {
            tokio::select! {
                line = stdout_lines.next_line(), if !stdout_done => {
                    match line? {
                        Some(line) => {
                            stdout.push_str(&line);
                            stdout.push('\n');
                        }
                        None => stdout_done = true,
                    }
                }
                line = stderr_lines.next_line(), if !stderr_done => {
                    match line? {
                        Some(line) => {
                            stderr.push_str(&line);
                            stderr.push('\n');
                        }
                        None => stderr_done = true,
                    }
                }
            }
        }

        let status = child.wait().await?;
        let exit_code = status.code().unwrap_or(-1);

        Ok(HookResult {
            hook,
            success: status.success(),
            exit_code,
            stdout,
            stderr,
            skipped: false,
        })
    }
}

#[cfg(unix)]
fn set_executable(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs_err::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs_err::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &std::path::Path) -> Result<()> {
    Ok(())
}
