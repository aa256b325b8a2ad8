//! Integration tests for the `slotbook` CLI binary.
//!
//! Each test gets its own temp directory for config and state, so runs
//! never touch the user's real files or each other.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `slotbook` binary with env isolation.
fn slotbook_cmd(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("slotbook");
    cmd.env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .env("SLOTBOOK_CONFIG", dir.path().join("config.toml"))
        .env("SLOTBOOK_STATE", dir.path().join("state.json"))
        .env_remove("SLOTBOOK_OUTPUT")
        .env_remove("SLOTBOOK_STATE_FILE")
        .env_remove("SLOTBOOK_WORKFLOW__PROVIDER_SHARE_PERCENT")
        .env_remove("SLOTBOOK_WORKFLOW__PROVISIONING_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

/// Run a command that must succeed and return its trimmed stdout.
fn stdout_of(dir: &TempDir, args: &[&str]) -> String {
    let output = slotbook_cmd(dir).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "{args:?} failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

/// Publish one slot for `mentor-1` and return its id.
fn publish_one(dir: &TempDir) -> String {
    slotbook_cmd(dir)
        .args(["slots", "publish", "--provider", "mentor-1", "--date", "2030-05-14", "02:30 PM"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Published 1 new slot(s)"));
    let ids = stdout_of(dir, &["slots", "list", "--provider", "mentor-1", "-o", "plain"]);
    ids.lines().next().unwrap().to_owned()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = TempDir::new().unwrap();
    let output = slotbook_cmd(&dir).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    slotbook_cmd(&dir).arg("--help").assert().success().stdout(
        predicate::str::contains("slots")
            .and(predicate::str::contains("book"))
            .and(predicate::str::contains("wallet")),
    );
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    slotbook_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("slotbook"));
}

#[test]
fn test_completions_zsh() {
    let dir = TempDir::new().unwrap();
    slotbook_cmd(&dir)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_subcommand() {
    let dir = TempDir::new().unwrap();
    slotbook_cmd(&dir).arg("teleport").assert().failure().code(2);
}

#[test]
fn test_invalid_output_format() {
    let dir = TempDir::new().unwrap();
    slotbook_cmd(&dir)
        .args(["-o", "xml", "prices", "list"])
        .assert()
        .failure()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_defaults() {
    let dir = TempDir::new().unwrap();
    slotbook_cmd(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("provider_share_percent = 70")
                .and(predicate::str::contains("[rooms]").not()),
        );
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    slotbook_cmd(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join("config.toml").exists());

    slotbook_cmd(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("force"));

    slotbook_cmd(&dir)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_path_honours_state_flag() {
    let dir = TempDir::new().unwrap();
    let custom = dir.path().join("elsewhere.json");
    slotbook_cmd(&dir)
        .args(["config", "path", "--state"])
        .arg(&custom)
        .assert()
        .success()
        .stdout(predicate::str::contains("elsewhere.json"));
}

// ── Booking flow ────────────────────────────────────────────────────

#[test]
fn test_book_confirm_flow_persists_between_runs() {
    let dir = TempDir::new().unwrap();
    slotbook_cmd(&dir)
        .args(["wallet", "top-up", "user-1", "1000"])
        .assert()
        .success();
    slotbook_cmd(&dir)
        .args(["prices", "set", "--provider", "mentor-1", "-t", "chat", "3"])
        .assert()
        .success();
    let slot = publish_one(&dir);

    let receipt = stdout_of(
        &dir,
        &[
            "book", "slot", "--consumer", "user-1", "--provider", "mentor-1", "--slot", &slot,
            "-t", "chat", "-d", "30", "-o", "json",
        ],
    );
    let receipt: serde_json::Value = serde_json::from_str(&receipt).unwrap();
    assert_eq!(receipt["charged"], 90);
    assert_eq!(receipt["balance"], 910);
    assert!(receipt["room"]["guest_url"].as_str().unwrap().contains("alterbuddy.com"));

    assert_eq!(stdout_of(&dir, &["wallet", "balance", "user-1", "-o", "plain"]), "910");

    // A booked slot drops out of the default listing.
    assert_eq!(
        stdout_of(&dir, &["slots", "list", "--provider", "mentor-1", "-o", "plain"]),
        ""
    );

    let record = stdout_of(&dir, &["confirm", &slot, "-o", "json"]);
    let record: serde_json::Value = serde_json::from_str(&record).unwrap();
    assert_eq!(record["start"], "2030-05-14T14:30:00Z");
    assert_eq!(record["status"], "PENDING");

    let records = stdout_of(&dir, &["records", "list", "--participant", "mentor-1", "-o", "plain"]);
    assert_eq!(records.lines().count(), 1);

    let history = stdout_of(&dir, &["wallet", "history", "mentor-1", "-o", "json"]);
    let history: serde_json::Value = serde_json::from_str(&history).unwrap();
    assert_eq!(history[0]["provider_share"], 63);
    assert_eq!(history[0]["platform_share"], 27);
}

#[test]
fn test_insufficient_funds_is_rejected() {
    let dir = TempDir::new().unwrap();
    slotbook_cmd(&dir)
        .args(["wallet", "top-up", "user-2", "10"])
        .assert()
        .success();
    slotbook_cmd(&dir)
        .args(["prices", "set", "--provider", "mentor-1", "-t", "chat", "5"])
        .assert()
        .success();
    let slot = publish_one(&dir);

    slotbook_cmd(&dir)
        .args([
            "book", "slot", "--consumer", "user-2", "--provider", "mentor-1", "--slot", &slot,
            "-t", "chat", "-d", "30",
        ])
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("Insufficient balance"));

    assert_eq!(stdout_of(&dir, &["wallet", "balance", "user-2", "-o", "plain"]), "10");
}

#[test]
fn test_video_without_room_service_is_refunded() {
    let dir = TempDir::new().unwrap();
    slotbook_cmd(&dir)
        .args(["wallet", "top-up", "user-3", "500"])
        .assert()
        .success();
    slotbook_cmd(&dir)
        .args(["prices", "set", "--provider", "mentor-1", "-t", "video", "5"])
        .assert()
        .success();

    slotbook_cmd(&dir)
        .args([
            "book", "instant", "--consumer", "user-3", "--provider", "mentor-1", "-t", "video",
            "-d", "20",
        ])
        .assert()
        .failure()
        .code(7)
        .stderr(predicate::str::contains("No room service configured"));

    assert_eq!(stdout_of(&dir, &["wallet", "balance", "user-3", "-o", "plain"]), "500");
}

#[test]
fn test_unknown_slot_is_not_found() {
    let dir = TempDir::new().unwrap();
    slotbook_cmd(&dir)
        .args(["confirm", "no-such-slot"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("slots list"));
}

#[test]
fn test_delete_requires_yes_when_not_interactive() {
    let dir = TempDir::new().unwrap();
    let slot = publish_one(&dir);
    slotbook_cmd(&dir)
        .args(["slots", "delete", &slot])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--yes"));

    slotbook_cmd(&dir)
        .args(["slots", "delete", &slot, "--yes"])
        .assert()
        .success();
    assert_eq!(
        stdout_of(&dir, &["slots", "list", "--provider", "mentor-1", "--all", "-o", "plain"]),
        ""
    );
}
