//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

fn shelfctl() -> Command {
    let mut cmd = Command::cargo_bin("shelfctl").unwrap();
    // Keep the user's real config and .env out of the way
    cmd.env("SHELFCTL_CONFIG", "/nonexistent/shelfctl/config.toml")
        .env("HOME", "/nonexistent")
        .env_remove("DATABASE_URL")
        .env_remove("SHELFCTL_API_KEY");
    cmd
}

#[test]
fn test_top_level_help_lists_commands() {
    shelfctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("save"))
        .stdout(predicate::str::contains("user"));
}

#[test]
fn test_serve_help() {
    shelfctl()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--ephemeral"))
        .stdout(predicate::str::contains("--cors-permissive"));
}

#[test]
fn test_save_help() {
    shelfctl()
        .args(["save", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--content-file"));
}

#[test]
fn test_user_add_help() {
    shelfctl()
        .args(["user", "add", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Email address"));
}

#[test]
fn test_config_path_honors_override() {
    shelfctl()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/nonexistent/shelfctl/config.toml"));
}

#[test]
fn test_config_show_prints_defaults() {
    shelfctl()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[integrations]"))
        .stdout(predicate::str::contains("readwise_base_url"));
}

#[test]
fn test_save_without_api_key_fails() {
    shelfctl()
        .args(["save", "https://example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API key"));
}

#[test]
fn test_completions_bash() {
    shelfctl()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shelfctl"));
}
