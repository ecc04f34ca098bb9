//! Running the installed tool as a subprocess.
//!
//! The tool is located on an explicit search path: directories published by
//! the installer come first, followed by the inherited `PATH`. The same path
//! is handed to the child, so tools it spawns see the installed directory too.

use crate::{Error, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tokio::process::Command;
use tracing::debug;

/// Captured result of one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
    /// Captured standard output (lossy UTF-8)
    pub stdout: String,
    /// Captured standard error (lossy UTF-8)
    pub stderr: String,
}

impl ToolOutput {
    /// Successful output with the given stdout.
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr.
    #[must_use]
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs the installed tool.
///
/// Non-zero exit is reported through [`ToolOutput::success`], not as an
/// error; errors mean the tool could not be started.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Name of the program this runner invokes.
    fn program(&self) -> &str;

    /// Run the tool with `args`. `env` is added to the child's environment
    /// only and never logged.
    async fn run(&self, args: &[&str], env: &[(&str, &str)]) -> Result<ToolOutput>;

    /// Put `dir` in front of the search path for later invocations.
    fn prepend_path(&self, dir: &Path);
}

/// [`ToolRunner`] backed by real subprocesses.
#[derive(Debug)]
pub struct SystemToolRunner {
    program: String,
    prepended: RwLock<Vec<PathBuf>>,
    inherited: Option<OsString>,
}

impl SystemToolRunner {
    /// Runner for `program`, searching the inherited `PATH`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_inherited_path(program, std::env::var_os("PATH"))
    }

    /// Runner for `program` with an explicit base search path.
    #[must_use]
    pub fn with_inherited_path(program: impl Into<String>, inherited: Option<OsString>) -> Self {
        Self {
            program: program.into(),
            prepended: RwLock::new(Vec::new()),
            inherited,
        }
    }

    /// The effective search path: prepended directories, then inherited.
    pub fn search_path(&self) -> Result<OsString> {
        let mut dirs: Vec<PathBuf> = self
            .prepended
            .read()
            .map(|dirs| dirs.clone())
            .unwrap_or_default();
        if let Some(inherited) = &self.inherited {
            dirs.extend(std::env::split_paths(inherited));
        }
        std::env::join_paths(dirs)
            .map_err(|e| Error::configuration(format!("Invalid search path entry: {e}")))
    }

    fn locate(&self, search_path: &OsString) -> Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        which::which_in(&self.program, Some(search_path), cwd).map_err(|_| Error::ToolNotFound {
            program: self.program.clone(),
        })
    }
}

#[async_trait]
impl ToolRunner for SystemToolRunner {
    fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, args: &[&str], env: &[(&str, &str)]) -> Result<ToolOutput> {
        let search_path = self.search_path()?;
        let binary = self.locate(&search_path)?;
        debug!(binary = %binary.display(), ?args, "Running tool");

        let output = Command::new(&binary)
            .args(args)
            .envs(env.iter().copied())
            .env("PATH", &search_path)
            .output()
            .await
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        Ok(ToolOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn prepend_path(&self, dir: &Path) {
        if let Ok(mut dirs) = self.prepended.write() {
            dirs.insert(0, dir.to_path_buf());
        }
    }
}
