//! Integration tests for the `mistly` CLI binary.
//!
//! Argument parsing, help output, completions, the config subcommands and
//! one report run against a wiremock stand-in for the Mist API. Every test
//! runs in its own temp directory so `Resources/` and `Reports/` never
//! touch the real working tree.
#![allow(clippy::unwrap_used)]

use std::path::Path;
#[cfg(unix)]
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORG: &str = "11111111-2222-3333-4444-555555555555";

// ── Helpers ─────────────────────────────────────────────────────────

/// Variables that would leak the developer's setup into a test run.
const ISOLATED_ENV: &[&str] = &[
    "RUST_LOG",
    "VISUAL",
    "EDITOR",
    "MIST_API_TOKEN",
    "MIST_ORG_ID",
    "MIST_BASE_URL",
    "MIST_CONFIG",
    "MIST_THEME",
    "MIST_DAYS",
    "MIST_TIMEOUT",
    "MIST_CONFIG_PASSWORD",
];

/// Build a [`Command`] for the `mistly` binary with env isolation.
///
/// Clears all `MIST_*` env vars and runs inside `dir`.
fn mistly_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("mistly");
    cmd.current_dir(dir).env("HOME", dir).env("NO_COLOR", "1");
    for var in ISOLATED_ENV {
        cmd.env_remove(var);
    }
    cmd
}

/// Same isolation as [`mistly_cmd`], for runs that need a live child.
#[cfg(unix)]
fn mistly_process(dir: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_mistly"));
    cmd.current_dir(dir).env("HOME", dir).env("NO_COLOR", "1");
    for var in ISOLATED_ENV {
        cmd.env_remove(var);
    }
    cmd
}

/// Start `cmd`, send SIGINT after `delay`, and collect its output.
#[cfg(unix)]
fn run_and_interrupt(mut cmd: std::process::Command, delay: Duration) -> std::process::Output {
    use std::process::Stdio;

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    std::thread::sleep(delay);
    let sent = std::process::Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(sent.success());

    let deadline = Instant::now() + Duration::from_secs(15);
    while child.try_wait().unwrap().is_none() {
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("mistly did not exit after SIGINT");
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    child.wait_with_output().unwrap()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn files_with_extension(dir: &Path, ext: &str) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = mistly_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    mistly_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("report")
            .and(predicate::str::contains("config"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    mistly_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mistly"));
}

#[test]
fn test_completions_zsh() {
    let dir = tempfile::tempdir().unwrap();
    mistly_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_connection_type() {
    let dir = tempfile::tempdir().unwrap();
    let output = mistly_cmd(dir.path())
        .args(["report", "--connection-type", "fibre"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("possible values"));
}

#[test]
fn test_report_without_credentials_fails() {
    let dir = tempfile::tempdir().unwrap();
    mistly_cmd(dir.path())
        .arg("report")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("API token"));
}

#[test]
fn test_report_with_only_unknown_formats_fails() {
    let dir = tempfile::tempdir().unwrap();
    mistly_cmd(dir.path())
        .args(["--token", "t", "--org-id", ORG, "report", "--format", "pdf"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("format"));
}

// ── Config subcommands ──────────────────────────────────────────────

#[test]
fn test_config_create_writes_sample_once() {
    let dir = tempfile::tempdir().unwrap();
    mistly_cmd(dir.path())
        .args(["config", "create"])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("Resources/mist_config.toml")).unwrap();
    assert!(written.contains("[mist]"));
    assert!(written.contains("your_api_token_here"));

    mistly_cmd(dir.path())
        .args(["config", "create"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_show_redacts_token() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[mist]\napi_token = \"abcdefghijklmnopqrstuvwxyz\"\norg_id = \"org\"\n",
    )
    .unwrap();

    mistly_cmd(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("********wxyz")
                .and(predicate::str::contains("abcdefgh").not())
                .and(predicate::str::contains("https://api.mist.com")),
        );
}

#[test]
fn test_key_file_encryption_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    for args in [
        &["config", "create"][..],
        &["config", "create-key"][..],
        &["config", "encrypt", "--delete-plaintext"][..],
    ] {
        mistly_cmd(dir.path()).args(args).assert().success();
    }

    let resources = dir.path().join("Resources");
    assert!(resources.join("encryption.key").exists());
    assert!(resources.join("mist_config.toml.enc").exists());
    assert!(!resources.join("mist_config.toml").exists());

    // The default key file decrypts the preferred `.enc` sibling.
    mistly_cmd(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("your_org_id_here"));
}

#[test]
fn test_wrong_password_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    mistly_cmd(dir.path())
        .args(["config", "create"])
        .assert()
        .success();
    mistly_cmd(dir.path())
        .env("MIST_CONFIG_PASSWORD", "right")
        .args(["config", "encrypt", "--keep-plaintext"])
        .assert()
        .success();

    mistly_cmd(dir.path())
        .env("MIST_CONFIG_PASSWORD", "wrong")
        .args(["config", "decrypt", "--output", "restored.toml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("decryption failed"));
    assert!(!dir.path().join("restored.toml").exists());
}

// ── End to end ──────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_report_against_mock_api() {
    let server = MockServer::start().await;
    let org_path = |endpoint: &str| format!("/api/v1/orgs/{ORG}/{endpoint}");

    Mock::given(method("GET"))
        .and(path(org_path("sites")))
        .and(header("authorization", "Token test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "S1", "name": "HQ" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(org_path("usermacs/search")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "mac": "AA:BB:CC:DD:EE:01", "name": "Laptop1" },
                { "mac": "AA:BB:CC:DD:EE:02", "name": "Spare" }
            ],
            "total": 2
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(org_path("nac_clients/search")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "mac": "aabbccddee01",
                "timestamp": 1_700_000_000,
                "type": "wireless",
                "last_ssid": "Corp",
                "auth_type": "dot1x",
                "site_id": "S1"
            }],
            "total": 1
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = mistly_cmd(dir.path());
    cmd.args([
        "--token",
        "test-token",
        "--org-id",
        ORG,
        "--base-url",
        &server.uri(),
        "report",
        "--format",
        "json,csv,bogus",
        "--output-dir",
        "out",
    ]);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Total Endpoints"));

    let out = dir.path().join("out");
    assert_eq!(files_with_extension(&out, "csv").len(), 1);
    let json_files = files_with_extension(&out, "json");
    assert_eq!(json_files.len(), 1);

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_files[0]).unwrap()).unwrap();
    assert_eq!(doc["metadata"]["total_records"], 2);
    assert_eq!(doc["statistics"]["never_seen"], 1);

    let laptop = &doc["endpoints"][0];
    assert_eq!(laptop["MAC Address"], "AABBCCDDEE01");
    assert_eq!(laptop["Connection Type"], "Wireless");
    assert_eq!(laptop["SSID/Port"], "SSID: Corp");
    assert_eq!(laptop["Auth Type"], "DOT1X");
    assert_eq!(laptop["Site"], "HQ");

    let spare = &doc["endpoints"][1];
    assert_eq!(spare["Last Seen"], "Never");
    assert_eq!(spare["Connection Type"], "Unknown");
}

// ── Interrupts ──────────────────────────────────────────────────────

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_ctrl_c_during_fetch_ends_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/orgs/{ORG}/sites")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(20)),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = mistly_process(dir.path());
    cmd.args([
        "--token",
        "t",
        "--org-id",
        ORG,
        "--base-url",
        &server.uri(),
        "report",
        "--format",
        "json",
    ]);
    let output =
        tokio::task::spawn_blocking(move || run_and_interrupt(cmd, Duration::from_millis(1500)))
            .await
            .unwrap();

    assert_eq!(output.status.code(), Some(1), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Interrupted"));
    assert!(!dir.path().join("Reports").exists());
}

#[cfg(unix)]
#[test]
fn test_ctrl_c_while_editing_still_scrubs_plaintext() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    for args in [
        &["config", "create"][..],
        &["config", "create-key"][..],
        &["config", "encrypt", "--delete-plaintext"][..],
    ] {
        mistly_cmd(dir.path()).args(args).assert().success();
    }

    let editor = dir.path().join("slow-editor.sh");
    std::fs::write(&editor, "#!/bin/sh\nsleep 3\n").unwrap();
    std::fs::set_permissions(&editor, std::fs::Permissions::from_mode(0o755)).unwrap();

    let mut cmd = mistly_process(dir.path());
    cmd.env("EDITOR", &editor).args(["config", "edit"]);
    let output = run_and_interrupt(cmd, Duration::from_millis(1500));

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("No changes"));
    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("Resources"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|name| name.to_string_lossy().starts_with(".mistly-"))
        .collect();
    assert!(leftovers.is_empty(), "plaintext left behind: {leftovers:?}");
}
