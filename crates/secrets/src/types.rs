//! Vault entry and selection types
//!
//! - [`SecureSecret`]: a string value that is zeroed on drop and redacted in output
//! - [`VaultSecretEntry`]: one exported vault item with its masking classification
//! - [`SelectionSet`]: the optional `selective` key filter

use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashSet;

/// A secret value with automatic memory zeroing on drop.
///
/// `Debug` and `Display` show `[REDACTED]`; the value is only reachable
/// through [`SecureSecret::expose`].
#[derive(Clone)]
pub struct SecureSecret {
    inner: SecretString,
}

impl SecureSecret {
    /// Move `value` into secure storage.
    #[must_use]
    pub fn new(value: String) -> Self {
        Self {
            inner: SecretString::from(value),
        }
    }

    /// Expose the secret value for use.
    ///
    /// The exposed value must not be logged; hand it straight to the host.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }
}

impl std::fmt::Debug for SecureSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl std::fmt::Display for SecureSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// One item exported from a vault.
#[derive(Debug, Clone)]
pub struct VaultSecretEntry {
    /// Item name in the vault
    pub key: String,
    /// Item value
    pub value: SecureSecret,
    /// The tool classifies the item as a secret
    pub is_secret: bool,
    /// The item is known not to be sensitive
    pub is_plaintext: bool,
}

impl VaultSecretEntry {
    /// Entry from an export without metadata: always treated as a secret.
    #[must_use]
    pub fn conservative(key: impl Into<String>, value: String) -> Self {
        Self {
            key: key.into(),
            value: SecureSecret::new(value),
            is_secret: true,
            is_plaintext: false,
        }
    }

    /// Whether the value must be masked in job output.
    #[must_use]
    pub fn needs_mask(&self) -> bool {
        !self.is_plaintext
    }
}

/// Exported entries keyed by item name, in the tool's output order.
pub type VaultEntries = IndexMap<String, VaultSecretEntry>;

/// Keys limiting which entries are exported. Empty means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    keys: HashSet<String>,
}

impl SelectionSet {
    /// Parse a comma-separated list; items are trimmed and blanks dropped.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .collect()
    }

    /// Whether no selection was configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether an entry with `key`, exported as `prefixed_key`, is selected.
    /// Either spelling selects it.
    #[must_use]
    pub fn selects(&self, key: &str, prefixed_key: &str) -> bool {
        self.is_empty() || self.keys.contains(key) || self.keys.contains(prefixed_key)
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}
