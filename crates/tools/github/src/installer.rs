//! Downloading, extracting and publishing a tool release.

use crate::extract::extract_zip;
use crate::locator::AssetLocator;
use crate::resolver::VersionResolver;
use setup_slv_core::{ActionsHost, Error, PlatformKey, Result, RunState, ToolRunner, VersionIdentity};
use setup_slv_github::ReleaseFeed;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Installs a tool version and verifies the result.
pub struct Installer<'a> {
    feed: &'a dyn ReleaseFeed,
    runner: &'a dyn ToolRunner,
    host: &'a dyn ActionsHost,
    platform: PlatformKey,
    temp_root: PathBuf,
}

impl<'a> Installer<'a> {
    /// Installer for `platform`, downloading into `temp_root`.
    #[must_use]
    pub fn new(
        feed: &'a dyn ReleaseFeed,
        runner: &'a dyn ToolRunner,
        host: &'a dyn ActionsHost,
        platform: PlatformKey,
        temp_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            feed,
            runner,
            host,
            platform,
            temp_root: temp_root.into(),
        }
    }

    /// Install `version` and return the directory added to the path.
    ///
    /// Fails with [`Error::VerificationFailed`] when the freshly installed
    /// tool does not report `version`. There is no retry.
    pub async fn install(&self, version: &VersionIdentity, state: &mut RunState) -> Result<PathBuf> {
        let url = AssetLocator::new(self.feed)
            .locate_download_url(version, &self.platform)
            .await?;

        info!(%version, %url, "Downloading SLV");
        let data = self.feed.download_asset(&url).await?;

        std::fs::create_dir_all(&self.temp_root)?;
        let archive = tempfile::Builder::new()
            .prefix("slv-")
            .suffix(".zip")
            .tempfile_in(&self.temp_root)?;
        tokio::fs::write(archive.path(), &data).await?;

        // The extracted directory must outlive this process: later job steps
        // run the tool from it.
        let dest = tempfile::Builder::new()
            .prefix(&format!("slv-{version}-"))
            .tempdir_in(&self.temp_root)?
            .keep();
        extract_blocking(archive.path(), &dest).await?;
        debug!(dir = %dest.display(), "Extracted SLV archive");

        self.runner.prepend_path(&dest);
        self.host.add_path(&dest)?;

        let detected = VersionResolver::new(self.feed, self.runner)
            .detect_installed_version()
            .await;
        state.record_installed(detected.clone());

        if detected.as_ref() != Some(version) {
            return Err(Error::VerificationFailed {
                version: version.to_string(),
                detected: detected.map(|v| v.to_string()),
            });
        }

        info!("Successfully installed SLV version {version}");
        Ok(dest)
    }
}

async fn extract_blocking(archive: &Path, dest: &Path) -> Result<()> {
    let (archive, dest) = (archive.to_path_buf(), dest.to_path_buf());
    let archive_for_error = archive.clone();
    tokio::task::spawn_blocking(move || extract_zip(&archive, &dest))
        .await
        .map_err(|e| Error::extract(archive_for_error, e.to_string()))?
}
