//! Core types and utilities for setup-slv.
//!
//! - [`Error`] / [`Result`]: the failure taxonomy of a run
//! - [`PlatformKey`]: host platform and its release-asset vocabulary
//! - [`VersionIdentity`] and [`parse_version_report`]: version comparison
//! - [`RunState`]: per-run cache of version lookups
//! - [`ToolRunner`]: subprocess seam for invoking the installed tool
//! - [`ActionsHost`]: the CI host surface (path, env, masking, state)

pub mod error;
pub mod host;
pub mod platform;
pub mod process;
pub mod state;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{Error, Result};
pub use host::ActionsHost;
pub use platform::PlatformKey;
pub use process::{SystemToolRunner, ToolOutput, ToolRunner};
pub use state::RunState;
pub use version::{VersionIdentity, parse_version_report};

/// Name of the tool binary, and the prefix of its release assets.
pub const TOOL_NAME: &str = "slv";
