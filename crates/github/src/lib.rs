//! GitHub integrations for setup-slv.
//!
//! - [`GitHubReleases`]: the release feed the tool is installed from
//! - [`GitHubActions`]: the Actions runner as an [`setup_slv_core::ActionsHost`]

#![warn(missing_docs)]

pub mod actions;
pub mod release;

pub use actions::{FileCommands, GitHubActions};
pub use release::{GitHubReleases, Release, ReleaseAsset, ReleaseFeed, ReleaseFeedConfig};

/// Owner of the repository publishing the tool.
pub const TOOL_OWNER: &str = "amagioss";

/// Repository publishing the tool.
pub const TOOL_REPO: &str = "slv";
