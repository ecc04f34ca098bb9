//! The two phases of a run: Setup installs the requested tool version,
//! Inject exports vault contents into the job environment.

use crate::cli::ActionInputs;
use setup_slv_core::state::{STATE_INSTALLED_VERSION, STATE_LATEST_VERSION};
use setup_slv_core::{ActionsHost, Error, PlatformKey, Result, RunState, ToolRunner, VersionIdentity};
use setup_slv_github::ReleaseFeed;
use setup_slv_secrets::{InjectionSummary, SecretInjector, SecretRetriever};
use setup_slv_tools_github::{Installer, VersionResolver, needs_install};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Outcome of the Setup phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    /// The required version was already on the path
    AlreadyInstalled(VersionIdentity),
    /// The required version was installed into `dir`
    Installed {
        /// Installed version
        version: VersionIdentity,
        /// Directory added to the path
        dir: PathBuf,
    },
}

/// Runs Setup then Inject against the given collaborators.
pub struct Orchestrator<'a> {
    feed: &'a dyn ReleaseFeed,
    runner: &'a dyn ToolRunner,
    host: &'a dyn ActionsHost,
    platform: PlatformKey,
    temp_root: PathBuf,
}

impl<'a> Orchestrator<'a> {
    /// Orchestrator installing for `platform` under `temp_root`.
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

    /// Setup, then Inject. A Setup failure ends the run before Inject.
    pub async fn run(&self, inputs: &ActionInputs) -> Result<()> {
        let mut state = RunState::seeded(
            self.host.get_state(STATE_INSTALLED_VERSION).as_deref(),
            self.host.get_state(STATE_LATEST_VERSION).as_deref(),
        );
        self.setup(inputs.version.as_deref(), &mut state).await?;
        self.inject(inputs).await?;
        Ok(())
    }

    /// Make `requested` (or the latest release) the tool on the path.
    ///
    /// Resolved versions are saved to the host state whether or not the
    /// phase succeeds. Saving is best effort and never masks the phase result.
    pub async fn setup(&self, requested: Option<&str>, state: &mut RunState) -> Result<SetupOutcome> {
        let outcome = self.install_if_needed(requested, state).await;
        for (key, version) in state.entries() {
            if let Err(e) = self.host.save_state(key, version.as_str()) {
                warn!(key, "Failed to save run state: {e}");
            }
        }
        outcome
    }

    async fn install_if_needed(
        &self,
        requested: Option<&str>,
        state: &mut RunState,
    ) -> Result<SetupOutcome> {
        let resolver = VersionResolver::new(self.feed, self.runner);
        let installed = resolver.resolve_installed_version(state).await;
        let required = resolver.resolve_required_version(requested, state).await?;

        if !needs_install(installed.as_ref(), &required) {
            info!("Required version SLV {required} is already installed");
            return Ok(SetupOutcome::AlreadyInstalled(required));
        }

        let dir = Installer::new(
            self.feed,
            self.runner,
            self.host,
            self.platform.clone(),
            &self.temp_root,
        )
        .install(&required, state)
        .await?;
        Ok(SetupOutcome::Installed {
            version: required,
            dir,
        })
    }

    /// Export the configured vault. Without a vault this does nothing and
    /// returns `None`.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when a vault is set without a secret key;
    /// the tool is not run in that case.
    pub async fn inject(&self, inputs: &ActionInputs) -> Result<Option<InjectionSummary>> {
        let Some(vault) = inputs.vault.as_deref() else {
            debug!("No vault configured, skipping secret export");
            return Ok(None);
        };
        let Some(secret_key) = inputs.env_secret_key.as_ref() else {
            return Err(Error::configuration("SLV environment secret key is required"));
        };

        let entries = SecretRetriever::new(self.runner)
            .retrieve(vault, secret_key)
            .await?;
        let summary = SecretInjector::new(self.host).inject(&entries, &inputs.selection, &inputs.prefix)?;
        info!(
            vault,
            exported = summary.exported,
            masked = summary.masked,
            "Exported vault items to the environment"
        );
        Ok(Some(summary))
    }
}
