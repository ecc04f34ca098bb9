//! Host platform identification and release-asset vocabulary.
//!
//! Host labels come from the Rust target (`std::env::consts`). Release assets
//! are named with Go-style tokens (`linux`, `darwin`, `windows`, `amd64`,
//! `386`, `arm64`), so both labels pass through a fixed translation table
//! before asset matching. Labels the tables do not know pass through
//! unchanged.

use serde::{Deserialize, Serialize};

/// Host platform as reported by the running binary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformKey {
    /// Host OS label (e.g. `linux`, `macos`, `windows`)
    pub os: String,
    /// Host architecture label (e.g. `x86_64`, `aarch64`)
    pub arch: String,
}

impl PlatformKey {
    /// Create a platform key from host labels.
    #[must_use]
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Get the current platform.
    #[must_use]
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// OS token as used in release asset names.
    #[must_use]
    pub fn asset_os(&self) -> &str {
        map_os(&self.os)
    }

    /// Architecture token as used in release asset names.
    #[must_use]
    pub fn asset_arch(&self) -> &str {
        map_arch(&self.arch)
    }
}

impl std::fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.asset_os(), self.asset_arch())
    }
}

/// Translate a host architecture label into the release-asset vocabulary.
///
/// `x32`/`x64` are accepted alongside the Rust labels so platform keys built
/// from Node-style runner metadata translate the same way.
#[must_use]
pub fn map_arch(arch: &str) -> &str {
    match arch {
        "x86" | "x32" => "386",
        "x86_64" | "x64" => "amd64",
        "aarch64" => "arm64",
        other => other,
    }
}

/// Translate a host OS label into the release-asset vocabulary.
#[must_use]
pub fn map_os(os: &str) -> &str {
    match os {
        "windows" | "win32" => "windows",
        "macos" => "darwin",
        other => other,
    }
}
