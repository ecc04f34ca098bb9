//! Retrieval and injection against a scripted tool and a recording host.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use setup_slv_core::test_utils::{HostEvent, RecordingHost, ScriptedRunner};
use setup_slv_core::{Error, ToolOutput};
use setup_slv_secrets::{InjectionSummary, SecretInjector, SecretRetriever, SelectionSet};

const METADATA_EXPORT: &str = r#"{
    "A": {"value": "alpha", "secret": true},
    "B": {"value": "bravo", "isPlaintext": true},
    "C": {"value": "charlie", "secret": true}
}"#;

fn key() -> SecretString {
    SecretString::from("SLV_ESK_test".to_string())
}

async fn retrieve_and_inject(
    outputs: Vec<Option<ToolOutput>>,
    selective: &str,
    prefix: &str,
) -> (RecordingHost, ScriptedRunner, InjectionSummary) {
    let runner = ScriptedRunner::new(outputs);
    let host = RecordingHost::new();
    let entries = SecretRetriever::new(&runner)
        .retrieve("vault.slv.yaml", &key())
        .await
        .unwrap();
    let summary = SecretInjector::new(&host)
        .inject(&entries, &SelectionSet::parse(selective), prefix)
        .unwrap();
    (host, runner, summary)
}

#[tokio::test]
async fn exports_all_items_in_tool_order() {
    let (host, runner, summary) =
        retrieve_and_inject(vec![Some(ToolOutput::ok(METADATA_EXPORT))], "", "").await;

    assert_eq!(
        host.exports(),
        vec![
            ("A".to_string(), "alpha".to_string()),
            ("B".to_string(), "bravo".to_string()),
            ("C".to_string(), "charlie".to_string()),
        ]
    );
    assert_eq!(host.masks(), vec!["alpha".to_string(), "charlie".to_string()]);
    assert_eq!(summary, InjectionSummary { exported: 3, masked: 2 });
    assert_eq!(runner.invocations().len(), 1);
    assert!(
        runner.invocations()[0]
            .args
            .contains(&"--with-metadata".to_string())
    );
}

#[tokio::test]
async fn selection_limits_exports() {
    let (host, _, _) =
        retrieve_and_inject(vec![Some(ToolOutput::ok(METADATA_EXPORT))], "A", "").await;

    assert_eq!(
        host.events(),
        vec![
            HostEvent::Mask("alpha".to_string()),
            HostEvent::Export("A".to_string(), "alpha".to_string()),
        ]
    );
}

#[tokio::test]
async fn prefixed_selection_matches_bare_key() {
    let (host, _, _) =
        retrieve_and_inject(vec![Some(ToolOutput::ok(METADATA_EXPORT))], "APP_A, B", "APP_").await;

    assert_eq!(
        host.exports(),
        vec![
            ("APP_A".to_string(), "alpha".to_string()),
            ("APP_B".to_string(), "bravo".to_string()),
        ]
    );
    assert_eq!(host.masks(), vec!["alpha".to_string()]);
}

#[tokio::test]
async fn falls_back_to_plain_export_and_masks_everything() {
    let (host, runner, summary) = retrieve_and_inject(
        vec![
            Some(ToolOutput::failed(1, "unknown flag: --with-metadata")),
            Some(ToolOutput::ok(r#"{"X": "v1"}"#)),
        ],
        "",
        "",
    )
    .await;

    assert_eq!(
        host.events(),
        vec![
            HostEvent::Mask("v1".to_string()),
            HostEvent::Export("X".to_string(), "v1".to_string()),
        ]
    );
    assert_eq!(summary, InjectionSummary { exported: 1, masked: 1 });

    let calls = runner.invocations();
    assert_eq!(calls.len(), 2);
    assert!(!calls[1].args.contains(&"--with-metadata".to_string()));
    assert_eq!(calls[0].env, calls[1].env);
}

#[tokio::test]
async fn both_attempts_failing_surfaces_last_stderr() {
    let runner = ScriptedRunner::new([
        Some(ToolOutput::failed(1, "unknown flag")),
        Some(ToolOutput::failed(1, "invalid secret key\n")),
    ]);

    let err = SecretRetriever::new(&runner)
        .retrieve("vault.slv.yaml", &key())
        .await
        .unwrap_err();

    match err {
        Error::VaultExport { stderr } => assert_eq!(stderr, "invalid secret key"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err_message("invalid secret key"),
        "Failed to get secrets: invalid secret key"
    );
}

#[tokio::test]
async fn malformed_output_is_an_export_error() {
    let runner = ScriptedRunner::new([Some(ToolOutput::ok("not json"))]);

    let err = SecretRetriever::new(&runner)
        .retrieve("vault.slv.yaml", &key())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::VaultExport { .. }));
}

fn err_message(stderr: &str) -> String {
    Error::VaultExport {
        stderr: stderr.to_string(),
    }
    .to_string()
}
