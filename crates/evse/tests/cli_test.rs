//! Integration tests for the `evse` CLI binary.
//!
//! Argument parsing, help output, completions, and error exit codes run
//! without any device. Device-bound commands talk to a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `evse` binary with env isolation.
///
/// Clears all `EVSE_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn evse_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("evse");
    cmd.env("HOME", "/tmp/evse-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/evse-cli-test-nonexistent")
        .env_remove("EVSE_PROFILE")
        .env_remove("EVSE_DEVICE")
        .env_remove("EVSE_OUTPUT")
        .env_remove("EVSE_COLOR")
        .env_remove("EVSE_DEFAULTS_OUTPUT")
        .env_remove("EVSE_DEFAULTS_COLOR")
        .env_remove("EVSE_TIMEOUT")
        .env_remove("EVSE_DEFAULT_PROFILE")
        .env_remove("RUST_LOG");
    cmd
}

/// A port nothing listens on.
const DEAD_DEVICE: &str = "http://127.0.0.1:1";

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_blocking(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = evse_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    evse_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("charging controller")
            .and(predicate::str::contains("cards"))
            .and(predicate::str::contains("alarms"))
            .and(predicate::str::contains("settings")),
    );
}

#[test]
fn test_version_flag() {
    evse_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("evse"));
}

#[test]
fn test_invalid_subcommand() {
    evse_cmd()
        .arg("reboot")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_interval_requires_watch() {
    evse_cmd()
        .args(["status", "--interval", "5s"])
        .assert()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    evse_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    evse_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("evse"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path() {
    evse_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_without_file() {
    evse_cmd()
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("192.168.4.1"));
}

#[test]
fn test_config_use_unknown_profile() {
    let output = evse_cmd().args(["config", "use", "garage"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("garage"));
}

#[test]
fn test_config_init_writes_profile() {
    let home = tempfile::tempdir().unwrap();
    let home_str = home.path().to_str().unwrap();

    evse_cmd()
        .env("HOME", home_str)
        .env("XDG_CONFIG_HOME", home_str)
        .args(["config", "init", "--name", "garage", "--url", "10.0.0.42"])
        .assert()
        .success();

    evse_cmd()
        .env("HOME", home_str)
        .env("XDG_CONFIG_HOME", home_str)
        .args(["config", "show", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("garage"));
}

#[test]
fn test_config_file_output_default_applies() {
    let home = tempfile::tempdir().unwrap();
    let home_str = home.path().to_str().unwrap();

    let out = evse_cmd()
        .env("HOME", home_str)
        .env("XDG_CONFIG_HOME", home_str)
        .args(["config", "path"])
        .output()
        .unwrap();
    let path = std::path::PathBuf::from(String::from_utf8(out.stdout).unwrap().trim());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "[defaults]\noutput = \"json\"\n").unwrap();

    evse_cmd()
        .env("HOME", home_str)
        .env("XDG_CONFIG_HOME", home_str)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"defaults\""));

    // An explicit flag still wins.
    evse_cmd()
        .env("HOME", home_str)
        .env("XDG_CONFIG_HOME", home_str)
        .args(["config", "show", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"defaults\"").not());
}

#[test]
fn test_unknown_output_default_is_a_usage_error() {
    evse_cmd()
        .env("EVSE_DEFAULTS_OUTPUT", "xml")
        .args(["config", "show"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("defaults.output"));
}

// ── Validation & gating ─────────────────────────────────────────────

#[test]
fn test_short_card_id_is_a_usage_error() {
    evse_cmd()
        .args(["cards", "add", "1234", "--device", DEAD_DEVICE])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Card ID must be 8 digits"));
}

#[test]
fn test_bad_expiry_is_a_usage_error() {
    evse_cmd()
        .args(["cards", "add", "12345678", "-e", "next year", "--device", DEAD_DEVICE])
        .assert()
        .code(2);
}

#[test]
fn test_clear_alarms_without_yes_refuses_off_tty() {
    let output = evse_cmd()
        .args(["alarms", "clear", "--device", DEAD_DEVICE])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[test]
fn test_unknown_profile_is_reported() {
    let output = evse_cmd()
        .args(["ping", "--profile", "nowhere"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("nowhere"));
}

// ── Device-bound commands ───────────────────────────────────────────

#[test]
fn test_ping_unreachable_device() {
    evse_cmd()
        .args(["ping", "--device", DEAD_DEVICE])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("not connected"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ping_connected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let mut cmd = evse_cmd();
    cmd.args(["ping", "--device", &server.uri()]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("connected"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_prints_readings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "voltage": 229.6,
            "current": 15.94,
            "power": 3660.0,
            "charge_status": 5,
            "net_status": 1
        })))
        .mount(&server)
        .await;

    let mut cmd = evse_cmd();
    cmd.args(["status", "--color", "never", "--device", &server.uri()]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("229.6 V"), "stdout:\n{stdout}");
    assert!(stdout.contains("15.9 A"), "stdout:\n{stdout}");
    assert!(stdout.contains("Charging"), "stdout:\n{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cards_list_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut cmd = evse_cmd();
    cmd.args(["cards", "list", "--device", &server.uri()]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No authorized cards"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cards_list_json_is_tagged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "12345678", "expireDate": "2027-03-01" }
        ])))
        .mount(&server)
        .await;

    let mut cmd = evse_cmd();
    cmd.args(["cards", "list", "-o", "json-compact", "--device", &server.uri()]);
    let output = run_blocking(cmd).await;

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["state"], "rows");
    assert_eq!(value["rows"][0]["id"], "12345678");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_delete_exits_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/cards/12345678"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;

    let mut cmd = evse_cmd();
    cmd.args(["cards", "delete", "12345678", "--yes", "--device", &server.uri()]);
    let output = run_blocking(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Delete failed"));
}
