//! These tests are for testing some invalid config-file-specific options.

use assert_cmd::prelude::*;
use predicates::prelude::*;

use crate::util::sysgauge_command;

#[test]
fn test_toml_mismatch_type() {
    sysgauge_command(&["-C", "./tests/invalid_configs/toml_mismatch_type.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid type"));
}

/// This test isn't really needed as this is technically covered by TOML spec.
/// However, it's worth checking anyways - not like it takes long.
#[test]
fn test_duplicate_key() {
    sysgauge_command(&["-C", "./tests/invalid_configs/duplicate_key.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate key"));
}

#[test]
fn test_broken_table() {
    sysgauge_command(&["-C", "./tests/invalid_configs/broken_table.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file error"));
}

#[test]
fn test_small_tick() {
    sysgauge_command(&["-C", "./tests/invalid_configs/small_tick.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "'tick' was set with an invalid value, please update it in your config file.",
        ));
}

#[test]
fn test_zero_history() {
    sysgauge_command(&["-C", "./tests/invalid_configs/zero_history.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'history' was set with an invalid value"));
}

#[test]
fn test_arg_fixes_bad_config_tick() {
    sysgauge_command(&["-C", "./tests/invalid_configs/small_tick.toml"])
        .args(["--tick", "50", "--headless", "--count", "1"])
        .assert()
        .success();
}
