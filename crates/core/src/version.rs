//! Version identity and the `--version` report grammar.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A tool version, compared as a string with any leading `v` stripped.
///
/// `VersionIdentity::new("v1.2.3") == VersionIdentity::new("1.2.3")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionIdentity(String);

impl VersionIdentity {
    /// Normalize a raw version or tag string.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self(trimmed.strip_prefix('v').unwrap_or(trimmed).to_string())
    }

    /// The normalized version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Release tag for this version (`v{version}`).
    #[must_use]
    pub fn tag(&self) -> String {
        format!("v{}", self.0)
    }

    /// Whether the normalized string is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VersionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionIdentity {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Extract the installed version from `slv --version` output.
///
/// Only the first line that contains `version` (any case) is considered; its
/// value is the text after the first `:`, trimmed, without a leading `v`.
/// Returns `None` when no line matches, or when that line has no `:` or an
/// empty value.
#[must_use]
pub fn parse_version_report(report: &str) -> Option<VersionIdentity> {
    let line = report
        .lines()
        .find(|line| line.to_lowercase().contains("version"))?;
    let (_, value) = line.split_once(':')?;
    let version = VersionIdentity::new(value);
    (!version.is_empty()).then_some(version)
}
