//! Command-line and action input parsing.
//!
//! Every action input can be given as a flag or through the `INPUT_*`
//! variable the Actions runner sets for it.

use crate::tracing::{LogLevel, TracingFormat};
use clap::Parser;
use clap::error::ErrorKind;
use secrecy::SecretString;
use setup_slv_core::Error;
use setup_slv_github::release::DEFAULT_API_URL;
use setup_slv_secrets::SelectionSet;
use std::path::PathBuf;

/// Command-line arguments. Action inputs fall back to their `INPUT_*` variables.
#[derive(Parser)]
#[command(name = "setup-slv")]
#[command(about = "Install the slv CLI and export vault secrets into the job environment")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(
        long = "slv-version",
        env = "INPUT_VERSION",
        help = "slv version to install, or `latest`"
    )]
    pub slv_version: Option<String>,

    #[arg(
        long = "github-token",
        env = "INPUT_GITHUB-TOKEN",
        hide_env_values = true,
        help = "Token for GitHub API requests"
    )]
    pub github_token: Option<String>,

    #[arg(long, env = "INPUT_VAULT", help = "Vault file to export")]
    pub vault: Option<String>,

    #[arg(
        long = "env-secret-key",
        env = "INPUT_ENV-SECRET-KEY",
        hide_env_values = true,
        help = "Secret key used to decrypt the vault"
    )]
    pub env_secret_key: Option<String>,

    #[arg(
        long,
        env = "INPUT_SELECTIVE",
        help = "Comma-separated list of vault items to export"
    )]
    pub selective: Option<String>,

    #[arg(long, env = "INPUT_PREFIX", help = "Prefix for exported variable names")]
    pub prefix: Option<String>,

    #[arg(
        long = "api-url",
        env = "GITHUB_API_URL",
        default_value = DEFAULT_API_URL,
        help = "GitHub API base URL"
    )]
    pub api_url: String,

    #[arg(
        long = "temp-dir",
        env = "RUNNER_TEMP",
        help = "Directory for downloads and extracted releases"
    )]
    pub temp_dir: Option<PathBuf>,

    #[arg(
        short = 'l',
        long,
        help = "Set logging level",
        default_value = "info",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long = "log-format",
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,
}

/// Action inputs after trimming, with empty values treated as absent.
#[derive(Debug, Default)]
pub struct ActionInputs {
    /// Requested tool version; `None` means latest
    pub version: Option<String>,
    /// Token for release feed requests
    pub github_token: Option<SecretString>,
    /// Vault to export; `None` skips the secret export
    pub vault: Option<String>,
    /// Vault decryption key
    pub env_secret_key: Option<SecretString>,
    /// Items to export; empty exports everything
    pub selection: SelectionSet,
    /// Prefix for exported variable names
    pub prefix: String,
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Cli {
    /// Split the parsed command line into action inputs.
    #[must_use]
    pub fn inputs(&self) -> ActionInputs {
        ActionInputs {
            version: normalize(self.slv_version.clone()),
            github_token: normalize(self.github_token.clone()).map(SecretString::from),
            vault: normalize(self.vault.clone()),
            env_secret_key: normalize(self.env_secret_key.clone()).map(SecretString::from),
            selection: self
                .selective
                .as_deref()
                .map(SelectionSet::parse)
                .unwrap_or_default(),
            prefix: normalize(self.prefix.clone()).unwrap_or_default(),
        }
    }

    /// Download root: `--temp-dir`/`RUNNER_TEMP`, else the OS temp directory.
    #[must_use]
    pub fn temp_root(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Whether a parse failure is a help or version request rather than bad input.
#[must_use]
pub fn is_informational(error: &clap::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

/// The configuration error reported to the host for invalid input.
#[must_use]
pub fn input_error(error: &clap::Error) -> Error {
    let rendered = error.to_string();
    let summary = rendered.lines().next().unwrap_or_default().trim();
    let summary = summary.strip_prefix("error:").unwrap_or(summary).trim();
    Error::configuration(format!("Invalid input: {summary}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const INPUT_VARS: [&str; 8] = [
        "INPUT_VERSION",
        "INPUT_GITHUB-TOKEN",
        "INPUT_VAULT",
        "INPUT_ENV-SECRET-KEY",
        "INPUT_SELECTIVE",
        "INPUT_PREFIX",
        "GITHUB_API_URL",
        "RUNNER_TEMP",
    ];

    fn without_inputs<R>(f: impl FnOnce() -> R) -> R {
        let cleared: Vec<(&str, Option<&str>)> = INPUT_VARS.iter().map(|k| (*k, None)).collect();
        temp_env::with_vars(cleared, f)
    }

    #[test]
    fn test_cli_default_values() {
        without_inputs(|| {
            let cli = Cli::try_parse_from(["setup-slv"]).unwrap();
            assert!(matches!(cli.level, LogLevel::Info));
            assert_eq!(cli.log_format, TracingFormat::Compact);
            assert_eq!(cli.api_url, DEFAULT_API_URL);

            let inputs = cli.inputs();
            assert!(inputs.version.is_none());
            assert!(inputs.vault.is_none());
            assert!(inputs.selection.is_empty());
            assert_eq!(inputs.prefix, "");
        });
    }

    #[test]
    fn test_inputs_are_read_from_action_environment() {
        temp_env::with_vars(
            [
                ("INPUT_VERSION", Some(" v0.9.2 ")),
                ("INPUT_VAULT", Some("vault.slv.yaml")),
                ("INPUT_ENV-SECRET-KEY", Some("SLV_ESK_abc")),
                ("INPUT_SELECTIVE", Some("A, B")),
                ("INPUT_PREFIX", Some("APP_")),
                ("INPUT_GITHUB-TOKEN", None),
                ("GITHUB_API_URL", Some("https://ghe.example.com/api/v3")),
                ("RUNNER_TEMP", Some("/runner/tmp")),
            ],
            || {
                let cli = Cli::try_parse_from(["setup-slv"]).unwrap();
                let inputs = cli.inputs();
                assert_eq!(inputs.version.as_deref(), Some("v0.9.2"));
                assert_eq!(inputs.vault.as_deref(), Some("vault.slv.yaml"));
                assert_eq!(
                    inputs.env_secret_key.as_ref().map(|k| k.expose_secret()),
                    Some("SLV_ESK_abc")
                );
                assert_eq!(inputs.selection, SelectionSet::parse("A,B"));
                assert_eq!(inputs.prefix, "APP_");
                assert!(inputs.github_token.is_none());
                assert_eq!(cli.api_url, "https://ghe.example.com/api/v3");
                assert_eq!(cli.temp_root(), PathBuf::from("/runner/tmp"));
            },
        );
    }

    #[test]
    fn test_blank_inputs_are_absent() {
        without_inputs(|| {
            let cli = Cli::try_parse_from([
                "setup-slv",
                "--slv-version",
                "  ",
                "--env-secret-key",
                "",
                "--prefix",
                " ",
            ])
            .unwrap();
            let inputs = cli.inputs();
            assert!(inputs.version.is_none());
            assert!(inputs.env_secret_key.is_none());
            assert_eq!(inputs.prefix, "");
        });
    }

    #[test]
    fn test_cli_log_options() {
        without_inputs(|| {
            let cli = Cli::try_parse_from(["setup-slv", "-l", "debug", "--log-format", "json"])
                .unwrap();
            assert!(matches!(cli.level, LogLevel::Debug));
            assert_eq!(cli.log_format, TracingFormat::Json);

            assert!(Cli::try_parse_from(["setup-slv", "--log-format", "xml"]).is_err());
        });
    }

    #[test]
    fn test_invalid_input_becomes_configuration_error() {
        without_inputs(|| {
            let Err(err) = Cli::try_parse_from(["setup-slv", "--log-format", "xml"]) else {
                panic!("expected a parse failure");
            };
            assert!(!is_informational(&err));

            let error = input_error(&err);
            assert!(matches!(error, Error::Configuration { .. }));
            let message = error.to_string();
            assert!(message.starts_with("Invalid input: "));
            assert!(message.contains("xml"));
            assert!(!message.contains('\n'));
        });
    }

    #[test]
    fn test_help_and_version_are_informational() {
        without_inputs(|| {
            for flag in ["--help", "--version"] {
                let Err(err) = Cli::try_parse_from(["setup-slv", flag]) else {
                    panic!("{flag} should stop parsing");
                };
                assert!(is_informational(&err));
            }
        });
    }

    #[test]
    fn test_debug_output_redacts_keys() {
        let inputs = ActionInputs {
            env_secret_key: Some(SecretString::from("SLV_ESK_hidden".to_string())),
            ..ActionInputs::default()
        };
        assert!(!format!("{inputs:?}").contains("SLV_ESK_hidden"));
    }
}
