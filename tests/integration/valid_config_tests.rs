//! Valid config files, run in headless mode so no terminal is needed.

use std::fs;

use assert_cmd::prelude::*;
use predicates::prelude::*;

use crate::util::sysgauge_command;

#[test]
fn test_empty() {
    sysgauge_command(&["-C", "./tests/valid_configs/empty_config.toml"])
        .args(["--tick", "50", "--headless", "--count", "1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("cpu "));
}

#[test]
fn test_all_sections() {
    sysgauge_command(&["-C", "./tests/valid_configs/all_sections.toml"])
        .args(["--headless", "--count", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| disk all read").and(predicate::str::contains("| net all ")));
}

#[test]
fn test_creates_missing_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("sysgauge.toml");
    let path_text = path.to_string_lossy().to_string();

    sysgauge_command(&["-C", &path_text])
        .args(["--tick", "50", "--headless", "--count", "1"])
        .assert()
        .success();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# This is a default config file for sysgauge."));
}

#[test]
fn test_selections_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sysgauge.toml");
    fs::write(
        &path,
        "[disk]\ndevice = \"no-such-disk\"\npartition = \"/no/such/mount\"\n\n[network]\ninterface = \"no-such-if\"\n",
    )
    .unwrap();
    let path_text = path.to_string_lossy().to_string();

    sysgauge_command(&["-C", &path_text])
        .args(["--tick", "50", "--headless", "--count", "1"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("| disk no-such-disk read")
                .and(predicate::str::contains("| part /no/such/mount unavailable |"))
                .and(predicate::str::contains("| net no-such-if down")),
        );
}
