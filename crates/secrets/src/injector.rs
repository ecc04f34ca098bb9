//! Publishing vault entries as job environment variables.

use crate::types::{SelectionSet, VaultEntries};
use setup_slv_core::{ActionsHost, Result};
use tracing::debug;

/// Counts of what an injection published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectionSummary {
    /// Variables exported
    pub exported: usize,
    /// Values registered for masking
    pub masked: usize,
}

/// Exports selected vault entries through the CI host.
pub struct SecretInjector<'a> {
    host: &'a dyn ActionsHost,
}

impl<'a> SecretInjector<'a> {
    /// Injector publishing through `host`.
    #[must_use]
    pub fn new(host: &'a dyn ActionsHost) -> Self {
        Self { host }
    }

    /// Export the entries chosen by `selection`, each named `prefix + key`.
    ///
    /// A value that is not plaintext is masked before it is exported, so it
    /// never reaches the job log unmasked.
    ///
    /// # Errors
    ///
    /// Fails when the host rejects an export; entries exported before the
    /// failure stay exported.
    pub fn inject(
        &self,
        entries: &VaultEntries,
        selection: &SelectionSet,
        prefix: &str,
    ) -> Result<InjectionSummary> {
        let mut summary = InjectionSummary::default();
        for (key, entry) in entries {
            let name = format!("{prefix}{key}");
            if !selection.selects(key, &name) {
                debug!(%name, "Skipping unselected vault item");
                continue;
            }
            if entry.needs_mask() {
                self.host.set_secret(entry.value.expose());
                summary.masked += 1;
            }
            self.host.export_variable(&name, entry.value.expose())?;
            summary.exported += 1;
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SecureSecret, VaultSecretEntry};
    use pretty_assertions::assert_eq;
    use setup_slv_core::test_utils::{HostEvent, RecordingHost};

    fn entry(key: &str, value: &str, is_plaintext: bool) -> (String, VaultSecretEntry) {
        (
            key.to_string(),
            VaultSecretEntry {
                key: key.to_string(),
                value: SecureSecret::new(value.to_string()),
                is_secret: !is_plaintext,
                is_plaintext,
            },
        )
    }

    #[test]
    fn mask_precedes_export() {
        let host = RecordingHost::new();
        let entries: VaultEntries = [entry("TOKEN", "t0k", false)].into_iter().collect();

        SecretInjector::new(&host)
            .inject(&entries, &SelectionSet::default(), "")
            .unwrap();

        assert_eq!(
            host.events(),
            vec![
                HostEvent::Mask("t0k".to_string()),
                HostEvent::Export("TOKEN".to_string(), "t0k".to_string()),
            ]
        );
    }

    #[test]
    fn plaintext_is_exported_without_mask() {
        let host = RecordingHost::new();
        let entries: VaultEntries = [entry("REGION", "eu-west-1", true)].into_iter().collect();

        let summary = SecretInjector::new(&host)
            .inject(&entries, &SelectionSet::default(), "")
            .unwrap();

        assert_eq!(summary, InjectionSummary { exported: 1, masked: 0 });
        assert!(host.masks().is_empty());
    }
}
