//! Finding the release asset for the host platform.

use setup_slv_core::{Error, PlatformKey, Result, TOOL_NAME, VersionIdentity};
use setup_slv_github::{ReleaseAsset, ReleaseFeed};
use tracing::debug;

/// Whether `name` is the archive for `platform`.
///
/// The name must contain `slv_`, the OS token and the architecture token,
/// and end with `.zip`.
#[must_use]
pub fn asset_matches(name: &str, platform: &PlatformKey) -> bool {
    name.contains(&format!("{TOOL_NAME}_"))
        && name.contains(platform.asset_os())
        && name.contains(platform.asset_arch())
        && name.ends_with(".zip")
}

/// First asset (in feed order) matching `platform`.
#[must_use]
pub fn select_asset<'a>(assets: &'a [ReleaseAsset], platform: &PlatformKey) -> Option<&'a ReleaseAsset> {
    assets.iter().find(|asset| asset_matches(&asset.name, platform))
}

/// Resolves download URLs from the release feed.
pub struct AssetLocator<'a> {
    feed: &'a dyn ReleaseFeed,
}

impl<'a> AssetLocator<'a> {
    /// Locator reading from `feed`.
    #[must_use]
    pub fn new(feed: &'a dyn ReleaseFeed) -> Self {
        Self { feed }
    }

    /// Download URL of the `version` archive for `platform`.
    ///
    /// A release without any assets fails with [`Error::EmptyRelease`] and
    /// is not reported a second time as a platform mismatch.
    pub async fn locate_download_url(
        &self,
        version: &VersionIdentity,
        platform: &PlatformKey,
    ) -> Result<String> {
        let release = self.feed.release_by_tag(&version.tag()).await?;
        if release.assets.is_empty() {
            return Err(Error::EmptyRelease {
                version: version.to_string(),
            });
        }

        let asset = select_asset(&release.assets, platform).ok_or_else(|| Error::NoMatchingAsset {
            os: platform.asset_os().to_string(),
            arch: platform.asset_arch().to_string(),
            version: version.to_string(),
        })?;

        debug!(asset = %asset.name, %platform, %version, "Located release asset");
        Ok(asset.download_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> ReleaseAsset {
        ReleaseAsset {
            name: name.to_string(),
            download_url: format!("https://dl/{name}"),
        }
    }

    #[test]
    fn test_asset_matches_requires_every_fragment() {
        let linux = PlatformKey::new("linux", "x86_64");

        assert!(asset_matches("slv_linux_amd64.zip", &linux));
        assert!(asset_matches("slv_0.9.2_linux_amd64.zip", &linux));

        assert!(!asset_matches("slvlinux_amd64.zip", &linux));
        assert!(!asset_matches("slv_darwin_amd64.zip", &linux));
        assert!(!asset_matches("slv_linux_arm64.zip", &linux));
        assert!(!asset_matches("slv_linux_amd64.tar.gz", &linux));
        assert!(!asset_matches("slv_linux_amd64.zip.sha256", &linux));
    }

    #[test]
    fn test_select_asset_first_match_wins() {
        let assets = vec![
            asset("checksums.txt"),
            asset("slv_windows_amd64.zip"),
            asset("slv_linux_amd64.zip"),
            asset("slv_linux_amd64_v2.zip"),
        ];
        let selected = select_asset(&assets, &PlatformKey::new("linux", "x86_64")).unwrap();
        assert_eq!(selected.name, "slv_linux_amd64.zip");
    }

    #[test]
    fn test_select_asset_translates_host_labels() {
        let assets = vec![
            asset("slv_darwin_arm64.zip"),
            asset("slv_windows_386.zip"),
        ];
        assert_eq!(
            select_asset(&assets, &PlatformKey::new("macos", "aarch64")).unwrap().name,
            "slv_darwin_arm64.zip"
        );
        assert_eq!(
            select_asset(&assets, &PlatformKey::new("windows", "x86")).unwrap().name,
            "slv_windows_386.zip"
        );
        assert!(select_asset(&assets, &PlatformKey::new("linux", "x86_64")).is_none());
    }
}
