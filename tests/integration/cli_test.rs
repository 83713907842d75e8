//! End-to-end tests of the srtp binary

use predicates::prelude::*;

use crate::helpers::{fixtures_dir, srtp_cmd, write_file};

/// Short fallback track length so headless runs finish quickly.
const SHORT_TRACK: &str = "[playback]\ndefault_duration_secs = 1.5\n";

#[test]
fn help_lists_subcommands_and_options() {
    let dir = tempfile::tempdir().unwrap();
    srtp_cmd(dir.path(), "")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("completions"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--headless"))
        .stdout(predicate::str::contains("--offset"));
}

#[test]
fn version_includes_package_version() {
    let dir = tempfile::tempdir().unwrap();
    srtp_cmd(dir.path(), "")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn json_without_headless_flag_runs_headless() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_file(dir.path(), "track.mp3", "");
    srtp_cmd(dir.path(), SHORT_TRACK)
        .args(["--json", "--silent", "-a"])
        .arg(&audio)
        .arg("-s")
        .arg(fixtures_dir().join("basic.srt"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"summary""#))
        .stdout(predicate::str::contains(r#""type":"end_of_media""#));
}

#[test]
fn config_path_honors_env_override() {
    let dir = tempfile::tempdir().unwrap();
    let expected = dir.path().join("config.toml");
    srtp_cmd(dir.path(), "")
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn config_show_prints_effective_values() {
    let dir = tempfile::tempdir().unwrap();
    srtp_cmd(dir.path(), "[sync]\noffset_secs = 0.25\n")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("offset_secs = 0.25"))
        .stdout(predicate::str::contains("poll_interval_ms = 50"));
}

#[test]
fn config_init_keeps_an_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    srtp_cmd(dir.path(), "")
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn config_init_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("srtp.toml");
    let mut cmd = srtp_cmd(dir.path(), "");
    cmd.env("SRTP_CONFIG", &target)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let written = std::fs::read_to_string(&target).unwrap();
    let config = srtp::Config::from_toml(&written).unwrap();
    assert_eq!(config, srtp::Config::default());
}

#[test]
fn invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    srtp_cmd(dir.path(), "[sync\n")
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}

#[test]
fn completions_generate_a_bash_script() {
    let dir = tempfile::tempdir().unwrap();
    srtp_cmd(dir.path(), "")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("srtp"));
}

#[test]
fn headless_without_files_is_not_ready() {
    let dir = tempfile::tempdir().unwrap();
    srtp_cmd(dir.path(), "")
        .args(["--headless", "--silent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Load an audio file"));
}

#[test]
fn headless_warns_about_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.mp3");
    srtp_cmd(dir.path(), "")
        .args(["--headless", "--silent", "-a"])
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("audio file not found"))
        .stderr(predicate::str::contains("Load an audio file"));
}

#[test]
fn headless_run_prints_displayed_subtitles() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_file(dir.path(), "track.mp3", "");
    srtp_cmd(dir.path(), SHORT_TRACK)
        .args(["--headless", "--silent", "-a"])
        .arg(&audio)
        .arg("-s")
        .arg(fixtures_dir().join("basic.srt"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[00:00:01,000 --> 00:00:03,000]\nHello\n",
        ))
        .stdout(predicate::str::contains("Displayed 1 subtitle(s)"))
        .stdout(predicate::str::contains("Second line").not());

    let log = std::fs::read_to_string(dir.path().join("srtp.log")).unwrap();
    assert!(log.contains("Loaded audio"));
}

#[test]
fn headless_json_emits_events_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_file(dir.path(), "track.mp3", "");
    let output = srtp_cmd(dir.path(), SHORT_TRACK)
        .args(["--headless", "--json", "--silent", "-a"])
        .arg(&audio)
        .arg("-s")
        .arg(fixtures_dir().join("basic.srt"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let shown = lines
        .iter()
        .find(|v| v["type"] == "render" && v["transition"]["id"] == "1")
        .expect("no render event for subtitle 1");
    assert_eq!(shown["transition"]["text"], "Hello");
    assert_eq!(
        shown["transition"]["appended"]["timecode"],
        "[00:00:01,000 --> 00:00:03,000]"
    );
    assert!(lines.iter().any(|v| v["type"] == "end_of_media"));

    let summary = lines.last().unwrap();
    assert_eq!(summary["type"], "summary");
    assert_eq!(summary["displayed"], 1);
    assert_eq!(summary["interrupted"], false);
}
