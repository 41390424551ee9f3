//! End-to-end CLI tests for the literature binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Binary command isolated from the user's real config directory.
fn literature(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("literature").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    literature(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Manage a personal literature library"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    literature(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("literature"));
}

#[test]
fn test_binary_without_subcommand_fails() {
    let home = TempDir::new().unwrap();
    literature(&home).assert().failure();
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let home = TempDir::new().unwrap();
    literature(&home)
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_import_rejects_more_than_sixteen_files() {
    let home = TempDir::new().unwrap();
    let files: Vec<String> = (0..17).map(|i| format!("{i}.pdf")).collect();
    literature(&home)
        .arg("import")
        .args(&files)
        .assert()
        .failure();
}

#[test]
fn test_settings_round_trip_masks_keys() {
    let home = TempDir::new().unwrap();

    literature(&home)
        .args(["settings", "set-key", "kimi", "sk-secret-value"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));
    literature(&home)
        .args(["settings", "use", "kimi"])
        .assert()
        .success();

    literature(&home)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("active_provider = kimi"))
        .stdout(predicate::str::contains("kimi = sk-****"))
        .stdout(predicate::str::contains("sk-secret-value").not());

    let stored = home
        .path()
        .join("literature-assistant")
        .join("doc-assistant.settings.json");
    let raw = std::fs::read_to_string(stored).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["activeAiProvider"], "kimi");
    assert_eq!(value["apiKeys"]["kimi"], "sk-secret-value");
}

#[test]
fn test_settings_remove_unknown_provider_reports_no_changes() {
    let home = TempDir::new().unwrap();
    literature(&home)
        .args(["settings", "remove-key", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes."));
}

#[test]
fn test_config_show_reports_file_values() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("literature-assistant");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        "base_url = \"http://papers.internal:9000/\"\npage_size = 20\nimport_timeout_secs = 600\n",
    )
    .unwrap();

    literature(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config_file = loaded"))
        .stdout(predicate::str::contains("base_url = http://papers.internal:9000\n"))
        .stdout(predicate::str::contains("page_size = 20"))
        .stdout(predicate::str::contains("import_timeout_secs = 600"));
}

#[test]
fn test_invalid_config_file_fails_fast() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("literature-assistant");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "page_size = 0\n").unwrap();

    literature(&home)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

#[tokio::test]
async fn test_list_prints_rows_and_footer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/literature/list"))
        .and(query_param("page", "1"))
        .and(query_param("size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "message": "ok",
            "data": {
                "records": [{ "id": 3, "title": "Deep Residual Learning", "category": "cv" }],
                "total": 1
            }
        })))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let uri = server.uri();

    let assert = tokio::task::spawn_blocking(move || {
        literature(&home)
            .args(["--base-url", &uri, "list"])
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("Deep Residual Learning"))
        .stdout(predicate::str::contains("1 total"));
}

#[tokio::test]
async fn test_list_failure_exits_nonzero_with_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/literature/list"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "search index offline"
        })))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let uri = server.uri();

    let assert = tokio::task::spawn_blocking(move || {
        literature(&home)
            .args(["--base-url", &uri, "list"])
            .assert()
    })
    .await
    .unwrap();

    assert
        .failure()
        .stderr(predicate::str::contains("search index offline"));
}
