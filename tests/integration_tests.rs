//! Integration tests for the demoscan CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SUBJECT: &str = "76561199121731119";

fn demoscan() -> Command {
    let mut cmd = Command::cargo_bin("demoscan").unwrap();
    for var in [
        "DEMOSCAN_ROOT_DIRECTORY",
        "DEMOSCAN_SUFFIX",
        "DEMOSCAN_SINCE",
        "DEMOSCAN_SUBJECT",
        "DEMOSCAN_CONCURRENCY_LIMIT",
        "DEMOSCAN_REPORT_PATH",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn recording(map: &str, defuses: &[u32]) -> String {
    let mut log = format!("{{\"event\":\"header\",\"map\":\"{map}\"}}\n");
    for alive in defuses {
        log.push_str("{\"event\":\"round_end\"}\n");
        log.push_str(&format!(
            "{{\"event\":\"bomb_defused\",\"player\":\"{SUBJECT}\",\"terrorists_alive\":{alive}}}\n"
        ));
    }
    log.push_str("{\"event\":\"match_end\",\"ct_score\":13,\"t_score\":7}\n");
    log
}

fn write_replays(dir: &Path) {
    let replays = dir.join("replays");
    fs::create_dir_all(replays.join("2024")).unwrap();
    fs::write(replays.join("a.dem"), recording("de_dust2", &[2])).unwrap();
    fs::write(replays.join("2024/b.dem"), recording("de_nuke", &[1, 0])).unwrap();
    fs::write(replays.join("c.dem"), recording("de_mirage", &[])).unwrap();
    fs::write(replays.join("notes.txt"), "not a recording").unwrap();
}

/// Test CLI binary exists and responds to --help
#[test]
fn test_cli_help() {
    demoscan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extract notable round events"));
}

/// Test CLI responds to --version
#[test]
fn test_cli_version() {
    demoscan()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("demoscan"));
}

/// Test invalid subcommand shows error
#[test]
fn test_invalid_subcommand() {
    demoscan()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_run_writes_report_and_progress() {
    let temp_dir = TempDir::new().unwrap();
    write_replays(temp_dir.path());

    demoscan()
        .current_dir(temp_dir.path())
        .args(["run", "--root", "replays", "--subject", SUBJECT, "-j", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 recording files"))
        .stdout(predicate::str::contains(
            "Map: de_dust2, Final Score: CT 13 - T 7, Round: 1, Enemies Alive: 2",
        ))
        .stdout(predicate::str::contains("File: b.dem"))
        .stdout(predicate::str::contains("Progress: 3/3 files processed"))
        .stdout(predicate::str::contains("Processing complete."));

    let report = fs::read_to_string(temp_dir.path().join("defuse_results.txt")).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().any(|l| l.starts_with("File: a.dem, Date: ")));
    assert!(lines.iter().any(|l| l.starts_with("File: b.dem, Date: ")
        && l.ends_with("Map: de_nuke, Final Score: CT 13 - T 7, Round: 1, Enemies Alive: 1")));
}

#[test]
fn test_run_with_custom_report_and_suffix() {
    let temp_dir = TempDir::new().unwrap();
    let replays = temp_dir.path().join("replays");
    fs::create_dir_all(&replays).unwrap();
    fs::write(replays.join("x.log"), recording("de_ancient", &[3])).unwrap();
    fs::write(replays.join("y.dem"), recording("de_ancient", &[3])).unwrap();
    let report = temp_dir.path().join("out.txt");

    demoscan()
        .current_dir(temp_dir.path())
        .args(["run", "--root", "replays", "--suffix", "log", "--subject", SUBJECT])
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Progress: 1/1 files processed"));

    let contents = fs::read_to_string(report).unwrap();
    assert!(contents.starts_with("File: x.log, "));
    assert_eq!(contents.lines().count(), 1);
}

#[test]
fn test_run_without_matches_creates_no_report() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("old.dem"), recording("de_dust2", &[1])).unwrap();

    demoscan()
        .current_dir(temp_dir.path())
        .args(["run", "--subject", SUBJECT, "--since", "2999-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No recording files found."));

    assert!(!temp_dir.path().join("defuse_results.txt").exists());
}

#[test]
fn test_run_quiet_still_prints_report_lines() {
    let temp_dir = TempDir::new().unwrap();
    write_replays(temp_dir.path());

    demoscan()
        .current_dir(temp_dir.path())
        .args(["--quiet", "run", "--root", "replays", "--subject", SUBJECT])
        .assert()
        .success()
        .stdout(predicate::str::contains("File: a.dem"))
        .stdout(predicate::str::contains("Progress:").not());
}

/// Every console write fails with ENOSPC; the run must still finish its report.
#[cfg(target_os = "linux")]
#[test]
fn test_run_survives_unwritable_stdout() {
    let temp_dir = TempDir::new().unwrap();
    write_replays(temp_dir.path());
    let dev_full = fs::OpenOptions::new().write(true).open("/dev/full").unwrap();

    let status = std::process::Command::new(assert_cmd::cargo::cargo_bin("demoscan"))
        .current_dir(temp_dir.path())
        .env_remove("DEMOSCAN_SUBJECT")
        .args(["run", "--root", "replays", "--subject", SUBJECT])
        .stdout(dev_full)
        .status()
        .unwrap();

    assert!(status.success());
    let report = fs::read_to_string(temp_dir.path().join("defuse_results.txt")).unwrap();
    assert_eq!(report.lines().count(), 2);
}

#[test]
fn test_run_help_explains_utc_dates() {
    demoscan()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("UTC, not local time"));
}

#[test]
fn test_run_missing_root_fails() {
    let temp_dir = TempDir::new().unwrap();

    demoscan()
        .current_dir(temp_dir.path())
        .args(["run", "--root", "does-not-exist", "--subject", SUBJECT])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist"));
}

#[test]
fn test_run_requires_subject() {
    let temp_dir = TempDir::new().unwrap();
    write_replays(temp_dir.path());

    demoscan()
        .current_dir(temp_dir.path())
        .args(["run", "--root", "replays"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("subject"));
}

#[test]
fn test_run_rejects_zero_concurrency() {
    demoscan()
        .args(["run", "--subject", SUBJECT, "-j", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_subject_from_environment() {
    let temp_dir = TempDir::new().unwrap();
    write_replays(temp_dir.path());

    demoscan()
        .current_dir(temp_dir.path())
        .env("DEMOSCAN_SUBJECT", SUBJECT)
        .args(["run", "--root", "replays"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Progress: 3/3 files processed"));
}

#[test]
fn test_config_show_merges_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("scan.toml");
    fs::write(
        &config_path,
        format!("subject = \"{SUBJECT}\"\nconcurrency_limit = 7\nsince = \"2024-11-17\"\n"),
    )
    .unwrap();

    demoscan()
        .current_dir(temp_dir.path())
        .arg("config")
        .arg("show")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("concurrency_limit = 7"))
        .stdout(predicate::str::contains("since = \"2024-11-17\""))
        .stdout(predicate::str::contains("suffix = \".dem\""));
}

#[test]
fn test_config_validate_reports_missing_file() {
    let temp_dir = TempDir::new().unwrap();

    demoscan()
        .current_dir(temp_dir.path())
        .args(["config", "validate", "--config", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.toml"));
}
