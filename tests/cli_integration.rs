//! CLI integration tests for Cirrus
//!
//! These tests drive the real binary through both addressing modes (flat
//! names and the verb tree), ensuring registration, dispatch, and error
//! classification work together correctly.

use std::path::Path;

use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command instance for the cirrus binary bound to a config dir
fn cirrus_cmd(config_dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("cirrus"));
    cmd.env("CIRRUS_CONFIG_DIR", config_dir);
    cmd
}

/// Create a config dir with one registered target
fn setup_target(label: &str, url: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .args(["target-add", label, url, "--set-current"])
        .assert()
        .success();
    dir
}

// =============================================================================
// Version & Help
// =============================================================================

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cirrus version"));
}

#[test]
fn test_version_shorthand() {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .arg("v")
        .assert()
        .success()
        .stdout(predicate::str::contains("cirrus version"));
}

#[test]
fn test_version_root_flag() {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cirrus version"));
}

#[test]
fn test_root_help_groups_commands_and_hides_flat_names() {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Manage resources:"))
        .stdout(predicate::str::contains("Auth commands:"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("target"))
        .stdout(predicate::str::contains("target-add").not());
}

#[test]
fn test_group_invocation_shows_subcommands() {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .arg("target")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: cirrus target <command>"))
        .stdout(predicate::str::contains("add"));
}

#[test]
fn test_help_for_leaf_includes_usage_and_flags() {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .args(["help", "target", "add"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Usage: cirrus target add <label> <url>",
        ))
        .stdout(predicate::str::contains("--set-current"));
}

// =============================================================================
// Dual Addressing
// =============================================================================

#[test]
fn test_flat_and_tree_addressing_hit_the_same_command() {
    let dir = TempDir::new().unwrap();

    cirrus_cmd(dir.path())
        .args(["target-add", "prod", "https://api.example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("added to target list"));

    cirrus_cmd(dir.path())
        .args(["target", "add", "dev", "http://localhost:8080"])
        .assert()
        .success()
        .stdout(predicate::str::contains("added to target list"));

    cirrus_cmd(dir.path())
        .args(["target", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prod"))
        .stdout(predicate::str::contains("dev"));

    cirrus_cmd(dir.path())
        .arg("target-list")
        .assert()
        .success()
        .stdout(predicate::str::contains("prod"));
}

#[test]
fn test_synonym_resolves_to_the_same_leaf() {
    let dir = setup_target("prod", "https://api.example.com");

    cirrus_cmd(dir.path())
        .args(["target", "delete", "prod", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Target prod removed"));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unknown_command_fails_with_usage_error() {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .arg("bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown command \"bogus\""));
}

#[test]
fn test_unknown_subcommand_names_the_path() {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .args(["target", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown command \"target bogus\""));
}

#[test]
fn test_missing_arguments_print_usage() {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .args(["target", "set"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: cirrus target set <label>"))
        .stderr(predicate::str::contains("requires at least 1 argument(s)"));
}

#[test]
fn test_flagged_command_argument_bounds() {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .args(["target", "add", "only-label"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires at least 2 argument(s)"));
}

#[test]
fn test_unknown_flag_is_rejected() {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .args(["target", "list", "--bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--bogus"));
}

#[test]
fn test_runtime_error_does_not_print_usage() {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .args(["target", "set", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"))
        .stderr(predicate::str::contains("Usage:").not());
}

// =============================================================================
// Deprecation
// =============================================================================

#[test]
fn test_deprecated_spelling_warns_and_delegates() {
    let dir = setup_target("prod", "https://api.example.com");

    cirrus_cmd(dir.path())
        .args(["target-select", "prod"])
        .assert()
        .success()
        .stderr(predicate::str::contains("deprecated"))
        .stderr(predicate::str::contains("cirrus target set"))
        .stdout(predicate::str::contains("New target is prod"));
}

// =============================================================================
// Auth
// =============================================================================

#[test]
fn test_login_and_logout() {
    let dir = setup_target("prod", "https://api.example.com");

    cirrus_cmd(dir.path())
        .args(["login", "--token", "s3cret"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Successfully logged in to https://api.example.com!",
        ));

    cirrus_cmd(dir.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully logged out!"));
}

#[test]
fn test_login_prompts_for_token_on_stdin() {
    let dir = setup_target("prod", "https://api.example.com");

    cirrus_cmd(dir.path())
        .arg("login")
        .write_stdin("typed-token\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully logged in"));
}

// =============================================================================
// Plugins
// =============================================================================

#[test]
fn test_plugin_list_reports_empty() {
    let dir = TempDir::new().unwrap();
    cirrus_cmd(dir.path())
        .env("PATH", dir.path())
        .args(["plugin", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No plugins installed."));
}

#[cfg(unix)]
#[test]
fn test_plugin_run_passes_arguments_through() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let plugins = dir.path().join("plugins");
    std::fs::create_dir_all(&plugins).unwrap();
    let path = plugins.join("cirrus-echo");
    std::fs::write(&path, "#!/bin/sh\necho \"plugin:$1\"\n").unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();

    cirrus_cmd(dir.path())
        .args(["plugin", "run", "echo", "--flag-for-plugin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plugin:--flag-for-plugin"));
}
