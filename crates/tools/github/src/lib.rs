//! Installing slv from GitHub Releases.
//!
//! - [`VersionResolver`] decides which version is installed, required and latest
//! - [`AssetLocator`] finds the release archive for the host platform
//! - [`Installer`] downloads, extracts, publishes and verifies an install
//!
//! Supported archives are zip files named `slv_<os>_<arch>.zip` (any extra
//! fragments such as the version are allowed).

pub mod extract;
pub mod installer;
pub mod locator;
pub mod resolver;

pub use extract::extract_zip;
pub use installer::Installer;
pub use locator::{AssetLocator, asset_matches, select_asset};
pub use resolver::{LATEST, VersionResolver, needs_install};
