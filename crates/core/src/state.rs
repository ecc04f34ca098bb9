//! Per-run cache of version lookups.
//!
//! A [`RunState`] lives for exactly one orchestrator invocation and is passed
//! explicitly through the call chain. Each slot is filled on first read and
//! is not invalidated afterwards, except that a fresh installed-version
//! detection after an install overwrites the installed slot.

use crate::version::VersionIdentity;

/// Host state key for the installed version.
pub const STATE_INSTALLED_VERSION: &str = "SLV_VERSION_INSTALLED";

/// Host state key for the latest published version.
pub const STATE_LATEST_VERSION: &str = "SLV_VERSION_LATEST";

/// Cached version identities for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    installed: Option<VersionIdentity>,
    latest: Option<VersionIdentity>,
}

impl RunState {
    /// Create an empty run state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slots from previously saved values. Empty values leave a
    /// slot unset.
    #[must_use]
    pub fn seeded(installed: Option<&str>, latest: Option<&str>) -> Self {
        let seed = |raw: Option<&str>| {
            raw.map(VersionIdentity::new)
                .filter(|version| !version.is_empty())
        };
        Self {
            installed: seed(installed),
            latest: seed(latest),
        }
    }

    /// Cached installed version, if a detection has found one.
    #[must_use]
    pub fn installed(&self) -> Option<&VersionIdentity> {
        self.installed.as_ref()
    }

    /// Cached latest version, if it has been fetched.
    #[must_use]
    pub fn latest(&self) -> Option<&VersionIdentity> {
        self.latest.as_ref()
    }

    /// Record the outcome of an installed-version detection.
    pub fn record_installed(&mut self, version: Option<VersionIdentity>) {
        self.installed = version;
    }

    /// Record the latest published version.
    pub fn record_latest(&mut self, version: VersionIdentity) {
        self.latest = Some(version);
    }

    /// Slots with values, as `(state key, version)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &VersionIdentity)> {
        [
            (STATE_INSTALLED_VERSION, self.installed.as_ref()),
            (STATE_LATEST_VERSION, self.latest.as_ref()),
        ]
        .into_iter()
        .filter_map(|(key, version)| version.map(|v| (key, v)))
    }
}
