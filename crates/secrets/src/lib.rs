//! Exporting slv vault contents into the CI job environment.
//!
//! [`SecretRetriever`] runs the installed tool to decrypt and export a vault;
//! [`SecretInjector`] publishes the selected entries as environment variables,
//! masking every value that is not marked plaintext.

mod injector;
mod retriever;
mod types;

pub use injector::{InjectionSummary, SecretInjector};
pub use retriever::{SECRET_KEY_ENV, SecretRetriever};
pub use types::{SecureSecret, SelectionSet, VaultEntries, VaultSecretEntry};
