//! GitHub Actions host.
//!
//! Publishes run results the way the Actions toolkit does: through the
//! environment files (`GITHUB_ENV`, `GITHUB_PATH`, `GITHUB_STATE`) when the
//! runner provides them, and through `::command::` lines on stdout otherwise.
//! Masking and failure reporting always go through stdout commands.

use setup_slv_core::{ActionsHost, Error, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

/// Escape command data (`%`, `\r`, `\n`).
#[must_use]
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a command property value (data escapes plus `:` and `,`).
#[must_use]
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Render a workflow command line, e.g. `::set-env name=FOO::bar`.
#[must_use]
pub fn format_command(command: &str, properties: &[(&str, &str)], message: &str) -> String {
    let mut line = format!("::{command}");
    if !properties.is_empty() {
        let props: Vec<String> = properties
            .iter()
            .map(|(key, value)| format!("{key}={}", escape_property(value)))
            .collect();
        line.push(' ');
        line.push_str(&props.join(","));
    }
    line.push_str("::");
    line.push_str(&escape_data(message));
    line
}

/// Render a `name<<delimiter` block for an environment file.
///
/// Fails when the delimiter occurs in the name or the value, since the
/// runner would then split the entry in the wrong place.
pub fn format_file_entry(name: &str, value: &str, delimiter: &str) -> Result<String> {
    if name.contains(delimiter) {
        return Err(Error::host(
            "file-command",
            format!("Name must not contain the delimiter \"{delimiter}\""),
        ));
    }
    if value.contains(delimiter) {
        return Err(Error::host(
            "file-command",
            format!("Value must not contain the delimiter \"{delimiter}\""),
        ));
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

/// Locations of the runner's environment files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCommands {
    /// `GITHUB_ENV`
    pub env: Option<PathBuf>,
    /// `GITHUB_PATH`
    pub path: Option<PathBuf>,
    /// `GITHUB_STATE`
    pub state: Option<PathBuf>,
}

impl FileCommands {
    /// Read the file locations from the process environment. Unset or empty
    /// variables leave the location unset.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str| {
            std::env::var_os(name)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };
        Self {
            env: var("GITHUB_ENV"),
            path: var("GITHUB_PATH"),
            state: var("GITHUB_STATE"),
        }
    }
}

/// [`ActionsHost`] for GitHub Actions runners.
pub struct GitHubActions {
    files: FileCommands,
    out: Mutex<Box<dyn Write + Send>>,
}

impl GitHubActions {
    /// Host writing commands to stdout, with file locations from the
    /// environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(FileCommands::from_env(), Box::new(std::io::stdout()))
    }

    /// Host with explicit file locations and command output.
    #[must_use]
    pub fn new(files: FileCommands, out: Box<dyn Write + Send>) -> Self {
        Self {
            files,
            out: Mutex::new(out),
        }
    }

    fn issue(&self, command: &str, properties: &[(&str, &str)], message: &str) {
        let line = format_command(command, properties, message);
        let Ok(mut out) = self.out.lock() else {
            warn!(command, "Workflow command output is poisoned");
            return;
        };
        if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            warn!(command, "Failed to issue workflow command: {e}");
        }
    }

    fn append(command: &'static str, file: &Path, content: &str) -> Result<()> {
        let mut handle = OpenOptions::new()
            .append(true)
            .open(file)
            .map_err(|e| Error::host(command, format!("{}: {e}", file.display())))?;
        handle
            .write_all(content.as_bytes())
            .map_err(|e| Error::host(command, format!("{}: {e}", file.display())))
    }

    fn delimiter() -> String {
        format!("ghadelimiter_{}", Uuid::new_v4())
    }
}

impl ActionsHost for GitHubActions {
    fn add_path(&self, dir: &Path) -> Result<()> {
        let dir = dir.to_string_lossy();
        match &self.files.path {
            Some(file) => Self::append("add-path", file, &format!("{dir}\n")),
            None => {
                self.issue("add-path", &[], &dir);
                Ok(())
            }
        }
    }

    fn export_variable(&self, name: &str, value: &str) -> Result<()> {
        match &self.files.env {
            Some(file) => {
                let entry = format_file_entry(name, value, &Self::delimiter())?;
                Self::append("set-env", file, &entry)
            }
            None => {
                self.issue("set-env", &[("name", name)], value);
                Ok(())
            }
        }
    }

    fn set_secret(&self, value: &str) {
        self.issue("add-mask", &[], value);
    }

    fn save_state(&self, name: &str, value: &str) -> Result<()> {
        match &self.files.state {
            Some(file) => {
                let entry = format_file_entry(name, value, &Self::delimiter())?;
                Self::append("save-state", file, &entry)
            }
            None => {
                self.issue("save-state", &[("name", name)], value);
                Ok(())
            }
        }
    }

    fn get_state(&self, name: &str) -> Option<String> {
        std::env::var(format!("STATE_{name}"))
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn set_failed(&self, message: &str) {
        self.issue("error", &[], message);
    }
}
