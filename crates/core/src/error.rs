//! Error types for setup-slv operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for setup-slv operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a setup-slv run.
///
/// A tool that is not installed is not an error here: version detection
/// reports it as `None`.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The release feed could not be reached or answered with a failure.
    #[error("Error retrieving {what} from the release feed: {message}")]
    #[diagnostic(
        code(setup_slv::feed::unreachable),
        help("Check network access to the GitHub API, or pass a github-token to raise rate limits")
    )]
    FeedUnreachable {
        /// What was being fetched (e.g. "latest release version")
        what: String,
        /// Transport or HTTP error text
        message: String,
    },

    /// The release feed has no published releases.
    #[error("No releases published for {repo}")]
    #[diagnostic(code(setup_slv::feed::no_releases))]
    NoReleases {
        /// `owner/repo` of the feed
        repo: String,
    },

    /// No release exists for the requested tag.
    #[error("Release {tag} not found in {repo}")]
    #[diagnostic(
        code(setup_slv::feed::tag_not_found),
        help("Check the requested version against the published releases")
    )]
    ReleaseNotFound {
        /// `owner/repo` of the feed
        repo: String,
        /// The tag that was requested
        tag: String,
    },

    /// The release exists but publishes no assets at all.
    #[error("No assets found in the release version {version}")]
    #[diagnostic(code(setup_slv::feed::empty_release))]
    EmptyRelease {
        /// Normalized version of the release
        version: String,
    },

    /// No asset in the release matches this platform.
    #[error("No assets found for the current platform ({os}-{arch}) in the release version {version}")]
    #[diagnostic(code(setup_slv::feed::no_matching_asset))]
    NoMatchingAsset {
        /// Translated OS token
        os: String,
        /// Translated architecture token
        arch: String,
        /// Normalized version of the release
        version: String,
    },

    /// Downloading a release asset failed.
    #[error("Failed to download {url}: {message}")]
    #[diagnostic(code(setup_slv::install::download))]
    Download {
        /// The asset URL
        url: String,
        /// Transport or HTTP error text
        message: String,
    },

    /// Extracting a downloaded archive failed.
    #[error("Failed to extract {}: {message}", archive.display())]
    #[diagnostic(code(setup_slv::install::extract))]
    Extract {
        /// The archive being extracted
        archive: PathBuf,
        /// Error message
        message: String,
    },

    /// Installation ran but the tool does not report the requested version.
    #[error("Failed to install SLV version {version}")]
    #[diagnostic(
        code(setup_slv::install::verification),
        help("The extracted binary did not report the requested version on `--version`")
    )]
    VerificationFailed {
        /// The version that was requested
        version: String,
        /// What the freshly installed tool reported, if anything
        detected: Option<String>,
    },

    /// The tool could not be started at all.
    #[error("Failed to execute '{program}': {source}")]
    #[diagnostic(code(setup_slv::process::spawn))]
    Spawn {
        /// Program name or path
        program: String,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// The tool was not found on the search path.
    #[error("'{program}' was not found on the search path")]
    #[diagnostic(code(setup_slv::process::not_found))]
    ToolNotFound {
        /// Program name
        program: String,
    },

    /// Exporting the vault failed with both export formats.
    #[error("Failed to get secrets: {stderr}")]
    #[diagnostic(code(setup_slv::vault::export))]
    VaultExport {
        /// Diagnostic text of the last export attempt
        stderr: String,
    },

    /// Required configuration is missing or invalid.
    #[error("{message}")]
    #[diagnostic(code(setup_slv::config))]
    Configuration {
        /// Error message
        message: String,
    },

    /// A command to the CI host could not be delivered.
    #[error("Host command '{command}' failed: {message}")]
    #[diagnostic(code(setup_slv::host))]
    Host {
        /// The workflow command (e.g. "set-env")
        command: &'static str,
        /// Error message
        message: String,
    },

    /// I/O error.
    #[error("IO error: {0}")]
    #[diagnostic(code(setup_slv::io))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a feed error for the given lookup
    #[must_use]
    pub fn feed_unreachable(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FeedUnreachable {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a download error
    #[must_use]
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an extraction error
    #[must_use]
    pub fn extract(archive: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Extract {
            archive: archive.into(),
            message: message.into(),
        }
    }

    /// Create a host command error
    #[must_use]
    pub fn host(command: &'static str, message: impl Into<String>) -> Self {
        Self::Host {
            command,
            message: message.into(),
        }
    }
}
