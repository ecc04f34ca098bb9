//! GitHub Releases feed.
//!
//! Reads release metadata from the GitHub REST API and downloads release
//! assets. Only the fields the installer needs are deserialized.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use setup_slv_core::{Error, Result};
use tracing::debug;

/// Default GitHub REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// User agent sent with every feed request.
pub const USER_AGENT: &str = "setup-slv";

const API_ACCEPT: &str = "application/vnd.github+json";

/// GitHub release metadata from the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Tag of the release, e.g. `v1.2.3`
    pub tag_name: String,
    /// Assets attached to the release, in API order
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// GitHub release asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    /// File name of the asset
    pub name: String,
    /// Public download URL
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// Source of published releases for the tool.
#[async_trait]
pub trait ReleaseFeed: Send + Sync {
    /// `owner/repo` the feed reads from.
    fn repository(&self) -> String;

    /// The most recent published release.
    async fn latest_release(&self) -> Result<Release>;

    /// The release tagged `tag`.
    async fn release_by_tag(&self, tag: &str) -> Result<Release>;

    /// Download a release asset.
    async fn download_asset(&self, url: &str) -> Result<Vec<u8>>;
}

/// Settings for [`GitHubReleases`].
#[derive(Debug, Clone)]
pub struct ReleaseFeedConfig {
    /// API base URL, without a trailing slash
    pub api_url: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Optional token for authenticated requests
    pub token: Option<SecretString>,
}

impl ReleaseFeedConfig {
    /// Feed for `owner/repo` on the public GitHub API.
    #[must_use]
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: None,
        }
    }

    /// Use a different API base URL (GitHub Enterprise Server, tests).
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Authenticate requests with `token`.
    #[must_use]
    pub fn with_token(mut self, token: Option<SecretString>) -> Self {
        self.token = token;
        self
    }
}

/// [`ReleaseFeed`] backed by the GitHub REST API.
pub struct GitHubReleases {
    client: Client,
    config: ReleaseFeedConfig,
}

impl GitHubReleases {
    /// Create a feed client.
    pub fn new(config: ReleaseFeedConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn get(&self, url: &str, accept: &str) -> RequestBuilder {
        let request = self.client.get(url).header("Accept", accept);
        match &self.config.token {
            Some(token) => {
                request.header("Authorization", format!("Bearer {}", token.expose_secret()))
            }
            None => request,
        }
    }

    fn releases_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/releases/{}",
            self.config.api_url, self.config.owner, self.config.repo, suffix
        )
    }
}

#[async_trait]
impl ReleaseFeed for GitHubReleases {
    fn repository(&self) -> String {
        format!("{}/{}", self.config.owner, self.config.repo)
    }

    async fn latest_release(&self) -> Result<Release> {
        const WHAT: &str = "latest release version";
        let url = self.releases_url("latest");
        debug!(%url, "Fetching latest GitHub release");

        let response = self
            .get(&url, API_ACCEPT)
            .send()
            .await
            .map_err(|e| Error::feed_unreachable(WHAT, e.to_string()))?;

        // The API answers 404 for a repository without published releases.
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NoReleases {
                repo: self.repository(),
            });
        }
        if !response.status().is_success() {
            return Err(Error::feed_unreachable(
                WHAT,
                format!("HTTP {}", response.status()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| Error::feed_unreachable(WHAT, format!("Failed to parse release: {e}")))
    }

    async fn release_by_tag(&self, tag: &str) -> Result<Release> {
        let what = format!("release {tag}");
        let url = self.releases_url(&format!("tags/{tag}"));
        debug!(%url, "Fetching GitHub release");

        let response = self
            .get(&url, API_ACCEPT)
            .send()
            .await
            .map_err(|e| Error::feed_unreachable(&what, e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::ReleaseNotFound {
                repo: self.repository(),
                tag: tag.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(Error::feed_unreachable(
                &what,
                format!("HTTP {}", response.status()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| Error::feed_unreachable(&what, format!("Failed to parse release: {e}")))
    }

    async fn download_asset(&self, url: &str) -> Result<Vec<u8>> {
        debug!(%url, "Downloading GitHub asset");

        let response = self
            .get(url, "application/octet-stream")
            .send()
            .await
            .map_err(|e| Error::download(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::download(url, format!("HTTP {}", response.status())));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| Error::download(url, format!("Failed to read asset: {e}")))
    }
}
