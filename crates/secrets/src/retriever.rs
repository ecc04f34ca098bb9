//! Vault export through the installed tool.
//!
//! The tool is asked for an export with per-item metadata first. Older tool
//! releases reject `--with-metadata`; for those a plain export is requested
//! and every item is treated as a secret.

use crate::types::{SecureSecret, VaultEntries, VaultSecretEntry};
use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use setup_slv_core::{Error, Result, ToolOutput, ToolRunner};
use tracing::{debug, warn};

/// Child environment variable carrying the vault decryption key.
pub const SECRET_KEY_ENV: &str = "SLV_ENV_SECRET_KEY";

/// Item as reported by `--with-metadata`. Fields the tool omits take their
/// defaults.
#[derive(Debug, Deserialize)]
struct MetadataItem {
    #[serde(default)]
    value: String,
    #[serde(default)]
    secret: bool,
    #[serde(default, rename = "isPlaintext")]
    is_plaintext: bool,
}

/// The two JSON shapes the tool can produce.
#[derive(Debug)]
enum VaultExport {
    WithMetadata(IndexMap<String, MetadataItem>),
    Plain(IndexMap<String, String>),
}

impl VaultExport {
    fn parse(format: ExportFormat, stdout: &str) -> Result<Self> {
        let parsed = match format {
            ExportFormat::WithMetadata => serde_json::from_str(stdout).map(Self::WithMetadata),
            ExportFormat::Plain => serde_json::from_str(stdout).map(Self::Plain),
        };
        parsed.map_err(|e| Error::VaultExport {
            stderr: format!("invalid export output: {e}"),
        })
    }

    fn into_entries(self) -> VaultEntries {
        match self {
            Self::WithMetadata(items) => items
                .into_iter()
                .map(|(key, item)| {
                    let entry = VaultSecretEntry {
                        key: key.clone(),
                        value: SecureSecret::new(item.value),
                        is_secret: item.secret,
                        is_plaintext: item.is_plaintext,
                    };
                    (key, entry)
                })
                .collect(),
            Self::Plain(items) => items
                .into_iter()
                .map(|(key, value)| {
                    let entry = VaultSecretEntry::conservative(key.clone(), value);
                    (key, entry)
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    WithMetadata,
    Plain,
}

impl ExportFormat {
    fn args(self, vault: &str) -> Vec<&str> {
        let mut args = vec!["vault", "export", "-v", vault, "--format", "json"];
        if self == Self::WithMetadata {
            args.push("--with-metadata");
        }
        args
    }
}

/// Exports vault contents by running the installed tool.
pub struct SecretRetriever<'a> {
    runner: &'a dyn ToolRunner,
}

impl<'a> SecretRetriever<'a> {
    /// Retriever that invokes the tool through `runner`.
    #[must_use]
    pub fn new(runner: &'a dyn ToolRunner) -> Self {
        Self { runner }
    }

    /// Export every item of the vault at `vault`, decrypting with `secret_key`.
    ///
    /// Entries keep the order in which the tool printed them.
    ///
    /// # Errors
    ///
    /// [`Error::VaultExport`] when both export attempts fail or the output is
    /// not a JSON object of the expected shape. Errors starting the tool are
    /// returned as-is.
    pub async fn retrieve(&self, vault: &str, secret_key: &SecretString) -> Result<VaultEntries> {
        let env = [(SECRET_KEY_ENV, secret_key.expose_secret())];

        let mut format = ExportFormat::WithMetadata;
        let mut output = self.export(format, vault, &env).await?;
        if !output.success {
            warn!(
                code = ?output.code,
                "Export with metadata failed, retrying without metadata"
            );
            format = ExportFormat::Plain;
            output = self.export(format, vault, &env).await?;
        }

        if !output.success {
            return Err(Error::VaultExport {
                stderr: output.stderr.trim_end().to_string(),
            });
        }

        let entries = VaultExport::parse(format, &output.stdout)?.into_entries();
        debug!(count = entries.len(), ?format, "Exported vault items");
        Ok(entries)
    }

    async fn export(
        &self,
        format: ExportFormat,
        vault: &str,
        env: &[(&str, &str)],
    ) -> Result<ToolOutput> {
        debug!(vault, ?format, "Running vault export");
        self.runner.run(&format.args(vault), env).await
    }
}
