use super::app::{default_directive, execute};
use super::*;
use purge_core::model::InvalidRunRef;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("artifact-purge").chain(args.iter().copied()))
}

fn cli_for(api_url: &str, config: Option<PathBuf>) -> Cli {
    Cli {
        repo: "octo/widgets".to_string(),
        run_id: "42".to_string(),
        token: "secret".to_string(),
        api_url: api_url.to_string(),
        config,
    }
}

fn fast_config(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("purge.json");
    let settings = json!({
        "check": { "delay_ms": 1, "factor": 2.0, "timeout_ms": 20 },
        "operation": { "delay_ms": 1, "factor": 2.0, "timeout_ms": 20 }
    });
    std::fs::write(&path, settings.to_string()).unwrap();
    path
}

#[test]
fn parses_flags() {
    let cli = parse(&[
        "--repo",
        "octo/widgets",
        "--run-id",
        "42",
        "--token",
        "secret",
        "--api-url",
        "https://ghe.example.com/api/v3",
        "--config",
        "purge.json",
    ])
    .unwrap();
    assert_eq!(cli.repo, "octo/widgets");
    assert_eq!(cli.run_id, "42");
    assert_eq!(cli.api_url, "https://ghe.example.com/api/v3");
    assert_eq!(cli.config, Some(PathBuf::from("purge.json")));
}

#[test]
fn debug_directive_follows_runner_debug() {
    assert_eq!(default_directive(Some("1")), "debug");
    assert_eq!(default_directive(Some("0")), "info");
    assert_eq!(default_directive(None), "info");
}

#[tokio::test]
async fn malformed_repo_fails_before_any_request() {
    let mut cli = cli_for("http://127.0.0.1:9", None);
    cli.repo = "widgets".to_string();
    let err = execute(cli).await.err().unwrap();
    assert_eq!(
        err.downcast_ref::<InvalidRunRef>(),
        Some(&InvalidRunRef::Slug("widgets".to_string()))
    );
}

#[tokio::test]
async fn invalid_backoff_settings_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("purge.json");
    std::fs::write(
        &path,
        r#"{"check": {"delay_ms": 1, "factor": 0, "timeout_ms": 1}}"#,
    )
    .unwrap();
    let err = execute(cli_for("http://127.0.0.1:9", Some(path)))
        .await
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "invalid backoff settings");
}

#[tokio::test]
async fn empty_run_succeeds_without_deleting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/actions/runs/42/artifacts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"total_count": 0, "artifacts": []})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let outcome = execute(cli_for(&server.uri(), Some(fast_config(&dir))))
        .await
        .unwrap();
    assert_eq!(outcome, PurgeOutcome::NothingToDelete);
}

#[tokio::test]
async fn deletes_artifacts_and_confirms_empty_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/actions/runs/42/artifacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "artifacts": [{ "id": 7, "name": "dist", "size_in_bytes": 10, "expired": false }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/actions/runs/42/artifacts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"total_count": 0, "artifacts": []})),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/repos/octo/widgets/actions/artifacts/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let outcome = execute(cli_for(&server.uri(), Some(fast_config(&dir))))
        .await
        .unwrap();
    assert_eq!(outcome, PurgeOutcome::Deleted { count: 1 });
}

#[tokio::test]
async fn persistent_leftovers_end_in_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/actions/runs/42/artifacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "artifacts": [{ "id": 8, "name": "stuck" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/repos/octo/widgets/actions/artifacts/8"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = execute(cli_for(&server.uri(), Some(fast_config(&dir))))
        .await
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "operation timed out after 20ms");
}
