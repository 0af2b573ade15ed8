use assert_cmd::Command;
use httpmock::prelude::*;
use serde_json::json;

const BIN: &str = "pinfetchctl";

#[test]
fn test_empty_args() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.assert().failure();
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-h").assert().success();
}

#[test]
fn test_bad_keyword() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("bouh").assert().failure();
}

#[test]
fn test_completion() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("completion").arg("bash").assert().success();
}

#[test]
fn test_list_empty() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("list").assert().failure();
}

#[test]
fn test_run_missing_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-d")
        .arg(dir.path())
        .arg("run")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_run_rejected_columns() {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST).path("/ad_accounts/123/reports");
        then.status(400)
            .body("'SPEND_IN_DOLLAR' is not one of ['COL_A', 'COL_B']");
    });

    let dir = tempfile::tempdir().unwrap();
    let cfg = json!({
        "parameters": {
            "input_variant": "report_specification",
            "accounts": ["123"],
            "destination": {"table_name": "perf"},
            "time_range": {
                "granularity": "DAY",
                "date_from": "2024-02-01",
                "date_to": "2024-02-28"
            },
            "report_specification": {
                "level": "CAMPAIGN",
                "columns": ["SPEND_IN_DOLLAR"]
            },
            "#api_token": "FOOBAR",
            "api_url": server.base_url(),
            "poll": {"interval_secs": 0}
        }
    });
    std::fs::write(dir.path().join("config.json"), cfg.to_string()).unwrap();

    // A rejected report specification is an operator problem, exit code 1.
    //
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-d")
        .arg(dir.path())
        .arg("run")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_run_no_accounts() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"parameters": {"input_variant": "report_specification"}}"#,
    )
    .unwrap();
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-d")
        .arg(dir.path())
        .arg("run")
        .assert()
        .failure()
        .code(1);
}
