//! These tests are mostly here just to ensure that invalid results will be
//! caught when passing arguments.

use assert_cmd::prelude::*;
use predicates::prelude::*;

use crate::util::{no_cfg_sysgauge_command, sysgauge_command};

#[test]
fn test_small_tick() {
    no_cfg_sysgauge_command()
        .arg("--tick")
        .arg("49")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "'--tick' was set with an invalid value",
        ));
}

#[test]
fn test_tick_not_a_number() {
    no_cfg_sysgauge_command()
        .arg("-t")
        .arg("fast")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'fast'"));
}

#[test]
fn test_large_tick() {
    no_cfg_sysgauge_command()
        .arg("--tick")
        .arg("18446744073709551616")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_zero_history() {
    no_cfg_sysgauge_command()
        .arg("--history")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "'--history' was set with an invalid value",
        ));
}

#[test]
fn test_count_without_headless() {
    no_cfg_sysgauge_command()
        .arg("--count")
        .arg("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--headless"));
}

#[test]
fn test_version() {
    sysgauge_command(&["--version"])
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_sections() {
    sysgauge_command(&["--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("General Options")
                .and(predicate::str::contains("View Options"))
                .and(predicate::str::contains("--headless")),
        );
}

#[test]
fn test_headless_count() {
    no_cfg_sysgauge_command()
        .args(["--tick", "50", "--headless", "--count", "2"])
        .assert()
        .success()
        .stdout(predicate::function(|out: &str| {
            out.lines().count() == 2 && out.lines().all(|line| line.starts_with("cpu "))
        }));
}
