//! Resolving the installed, required and latest tool versions.

use setup_slv_core::{Error, Result, RunState, ToolRunner, VersionIdentity, parse_version_report};
use setup_slv_github::ReleaseFeed;
use tracing::{debug, info};

/// Literal accepted in place of a version to mean "the latest release".
pub const LATEST: &str = "latest";

/// Whether the tool has to be (re)installed to satisfy `required`.
#[must_use]
pub fn needs_install(installed: Option<&VersionIdentity>, required: &VersionIdentity) -> bool {
    installed != Some(required)
}

/// Determines version identities for one run.
pub struct VersionResolver<'a> {
    feed: &'a dyn ReleaseFeed,
    runner: &'a dyn ToolRunner,
}

impl<'a> VersionResolver<'a> {
    /// Resolver using `feed` for releases and `runner` for the installed tool.
    #[must_use]
    pub fn new(feed: &'a dyn ReleaseFeed, runner: &'a dyn ToolRunner) -> Self {
        Self { feed, runner }
    }

    /// Ask the tool for its version, bypassing the run cache.
    ///
    /// A missing tool, a non-zero exit, output on stderr, or a report
    /// without a version line all mean "not installed".
    pub async fn detect_installed_version(&self) -> Option<VersionIdentity> {
        let output = match self.runner.run(&["--version"], &[]).await {
            Ok(output) => output,
            Err(e) => {
                debug!("Tool version detection failed: {e}");
                return None;
            }
        };
        if !output.success || !output.stderr.trim().is_empty() {
            debug!(code = ?output.code, "Tool version command did not succeed cleanly");
            return None;
        }
        parse_version_report(&output.stdout)
    }

    /// Installed version, detected once per run.
    pub async fn resolve_installed_version(&self, state: &mut RunState) -> Option<VersionIdentity> {
        let installed = match state.installed() {
            Some(version) => Some(version.clone()),
            None => {
                let detected = self.detect_installed_version().await;
                state.record_installed(detected.clone());
                detected
            }
        };
        if let Some(version) = &installed {
            info!("Installed version of SLV: {version}");
        }
        installed
    }

    /// Latest published version, fetched once per run.
    pub async fn resolve_latest_version(&self, state: &mut RunState) -> Result<VersionIdentity> {
        if let Some(version) = state.latest() {
            return Ok(version.clone());
        }
        info!("Fetching latest release version from GitHub...");
        let release = self.feed.latest_release().await?;
        let latest = VersionIdentity::new(&release.tag_name);
        if latest.is_empty() {
            return Err(Error::NoReleases {
                repo: self.feed.repository(),
            });
        }
        state.record_latest(latest.clone());
        Ok(latest)
    }

    /// The version the configuration asks for. Absent, empty and `latest`
    /// resolve through the release feed.
    pub async fn resolve_required_version(
        &self,
        requested: Option<&str>,
        state: &mut RunState,
    ) -> Result<VersionIdentity> {
        match requested.map(str::trim) {
            None | Some("" | LATEST) => self.resolve_latest_version(state).await,
            Some(version) => Ok(VersionIdentity::new(version)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use setup_slv_core::ToolOutput;
    use setup_slv_core::test_utils::ScriptedRunner;
    use setup_slv_github::Release;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct LatestFeed {
        tag: &'static str,
        calls: AtomicUsize,
    }

    impl LatestFeed {
        fn new(tag: &'static str) -> Self {
            Self {
                tag,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReleaseFeed for LatestFeed {
        fn repository(&self) -> String {
            "amagioss/slv".to_string()
        }

        async fn latest_release(&self) -> Result<Release> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Release {
                tag_name: self.tag.to_string(),
                assets: Vec::new(),
            })
        }

        async fn release_by_tag(&self, tag: &str) -> Result<Release> {
            Err(Error::ReleaseNotFound {
                repo: self.repository(),
                tag: tag.to_string(),
            })
        }

        async fn download_asset(&self, url: &str) -> Result<Vec<u8>> {
            Err(Error::download(url, "not available"))
        }
    }

    #[test]
    fn test_needs_install() {
        let required = VersionIdentity::new("1.2.3");
        assert!(needs_install(None, &required));
        assert!(needs_install(Some(&VersionIdentity::new("1.2.2")), &required));
        assert!(!needs_install(Some(&VersionIdentity::new("v1.2.3")), &required));
    }

    #[tokio::test]
    async fn test_installed_version_is_detected_once() {
        let feed = LatestFeed::new("v1.0.0");
        let runner = ScriptedRunner::new([Some(ToolOutput::ok("SLV Version : v0.9.2\n"))]);
        let resolver = VersionResolver::new(&feed, &runner);
        let mut state = RunState::new();

        let first = resolver.resolve_installed_version(&mut state).await;
        let second = resolver.resolve_installed_version(&mut state).await;

        assert_eq!(first, Some(VersionIdentity::new("0.9.2")));
        assert_eq!(second, first);
        assert_eq!(runner.invocations().len(), 1);
        assert_eq!(runner.invocations()[0].args, vec!["--version"]);
    }

    #[tokio::test]
    async fn test_seeded_installed_version_skips_detection() {
        let feed = LatestFeed::new("v1.0.0");
        let runner = ScriptedRunner::new([]);
        let resolver = VersionResolver::new(&feed, &runner);
        let mut state = RunState::seeded(Some("v0.9.2"), None);

        let installed = resolver.resolve_installed_version(&mut state).await;

        assert_eq!(installed, Some(VersionIdentity::new("0.9.2")));
        assert!(runner.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_missing_or_failing_tool_is_not_installed() {
        let feed = LatestFeed::new("v1.0.0");
        let runner = ScriptedRunner::new([
            None,
            Some(ToolOutput::failed(1, "unknown flag")),
            Some(ToolOutput {
                stderr: "warning: config missing".to_string(),
                ..ToolOutput::ok("SLV Version : 1.0.0")
            }),
            Some(ToolOutput::ok("no version here")),
        ]);
        let resolver = VersionResolver::new(&feed, &runner);

        for _ in 0..4 {
            assert_eq!(resolver.detect_installed_version().await, None);
        }
    }

    #[tokio::test]
    async fn test_required_version_from_config_is_normalized() {
        let feed = LatestFeed::new("v9.9.9");
        let runner = ScriptedRunner::default();
        let resolver = VersionResolver::new(&feed, &runner);
        let mut state = RunState::new();

        let required = resolver
            .resolve_required_version(Some("v1.2.3"), &mut state)
            .await
            .unwrap();
        assert_eq!(required.as_str(), "1.2.3");
        assert_eq!(feed.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_latest_and_empty_resolve_through_feed_once() {
        let feed = LatestFeed::new("v2.0.1");
        let runner = ScriptedRunner::default();
        let resolver = VersionResolver::new(&feed, &runner);
        let mut state = RunState::new();

        for requested in [None, Some(""), Some("latest"), Some("  latest ")] {
            let required = resolver
                .resolve_required_version(requested, &mut state)
                .await
                .unwrap();
            assert_eq!(required.as_str(), "2.0.1");
        }
        assert_eq!(feed.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.latest().unwrap().as_str(), "2.0.1");
    }

    #[tokio::test]
    async fn test_empty_latest_tag_is_no_releases() {
        let feed = LatestFeed::new("v");
        let runner = ScriptedRunner::default();
        let resolver = VersionResolver::new(&feed, &runner);

        let result = resolver.resolve_latest_version(&mut RunState::new()).await;
        assert!(matches!(result, Err(Error::NoReleases { .. })));
    }
}
