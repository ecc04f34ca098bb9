//! The CI host surface the run publishes its results through.

use crate::Result;
use std::path::Path;

/// Side effects visible to later steps of the CI job.
///
/// Implemented for GitHub Actions in `setup-slv-github`; tests use the
/// recording host from the `test-utils` feature.
pub trait ActionsHost: Send + Sync {
    /// Prepend `dir` to `PATH` for the remaining steps of the job.
    fn add_path(&self, dir: &Path) -> Result<()>;

    /// Export `name=value` to the environment of the remaining steps.
    fn export_variable(&self, name: &str, value: &str) -> Result<()>;

    /// Mask `value` in all further job log output.
    fn set_secret(&self, value: &str);

    /// Persist a state value for the post-run of this action.
    fn save_state(&self, name: &str, value: &str) -> Result<()>;

    /// Read a state value saved by an earlier run of this action.
    fn get_state(&self, name: &str) -> Option<String>;

    /// Report the run as failed with `message`.
    fn set_failed(&self, message: &str);
}
