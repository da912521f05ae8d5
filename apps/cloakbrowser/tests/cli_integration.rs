#![warn(clippy::pedantic)]

//! Integration tests for the cloakbrowser CLI.
//!
//! These tests spawn the compiled binary with an isolated cache root and
//! check stdout, stderr and exit codes. None of them reach the network:
//! commands that would download are driven through a local binary
//! override or a cache prepared on disk.
//!
//! ## Test Infrastructure
//!
//! - Uses `assert_cmd` for spawning and asserting on command execution
//! - Uses `assert_fs` for temporary cache directories
//! - Uses `predicates` for flexible output matching

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const ENV_VARS: [&str; 5] = [
    "CLOAKBROWSER_CACHE_DIR",
    "CLOAKBROWSER_BINARY_PATH",
    "CLOAKBROWSER_DOWNLOAD_URL",
    "CLOAKBROWSER_AUTO_UPDATE",
    "CLOAKBROWSER_DEBUG",
];

/// Returns a command with every cloakbrowser variable cleared and the cache
/// pointed at `cache`.
fn cloakbrowser(cache: &std::path::Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cloakbrowser"));
    for name in ENV_VARS {
        cmd.env_remove(name);
    }
    cmd.env("CLOAKBROWSER_CACHE_DIR", cache)
        .env("CLOAKBROWSER_AUTO_UPDATE", "false");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let temp = assert_fs::TempDir::new().unwrap();
    cloakbrowser(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("clear-cache"))
        .stdout(predicate::str::contains("CLOAKBROWSER_BINARY_PATH"));
}

#[test]
fn version_flag_prints_version() {
    let temp = assert_fs::TempDir::new().unwrap();
    cloakbrowser(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommand_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    cloakbrowser(temp.path())
        .arg("launch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn install_with_override_prints_path() {
    let temp = assert_fs::TempDir::new().unwrap();
    let chrome = temp.child("my-chrome");
    chrome.write_binary(b"#!/bin/sh\n").unwrap();

    cloakbrowser(&temp.path().join("cache"))
        .env("CLOAKBROWSER_BINARY_PATH", chrome.path())
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains(chrome.path().to_string_lossy()));

    temp.child("cache").assert(predicate::path::missing());
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
#[test]
fn install_from_cache_leaves_update_check_due() {
    use std::os::unix::fs::PermissionsExt;

    let temp = assert_fs::TempDir::new().unwrap();
    let cache = temp.child("cache");
    let chrome = cache
        .child(format!("chromium-{}", cloakbrowser::CHROMIUM_VERSION))
        .child("chrome");
    chrome.write_binary(b"#!/bin/sh\n").unwrap();
    std::fs::set_permissions(chrome.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

    cloakbrowser(cache.path())
        .env_remove("CLOAKBROWSER_AUTO_UPDATE")
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains(chrome.path().to_string_lossy()));

    cache
        .child(".last_update_check")
        .assert(predicate::path::missing());
}

#[test]
fn install_with_missing_override_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    let missing = temp.path().join("nowhere").join("chrome");

    cloakbrowser(temp.path())
        .env("CLOAKBROWSER_BINARY_PATH", &missing)
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[cfg(all(target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64")))]
#[test]
fn info_on_empty_cache() {
    let temp = assert_fs::TempDir::new().unwrap();
    cloakbrowser(temp.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(cloakbrowser::CHROMIUM_VERSION))
        .stdout(predicate::str::contains("Installed:    no"))
        .stdout(predicate::str::contains("cloakbrowser.dev"));
}

#[cfg(all(target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64")))]
#[test]
fn info_json_is_machine_readable() {
    let temp = assert_fs::TempDir::new().unwrap();
    let output = cloakbrowser(temp.path())
        .args(["info", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["version"], cloakbrowser::CHROMIUM_VERSION);
    assert_eq!(info["installed"], false);
    assert!(info["platform"].as_str().unwrap().starts_with("linux-"));
}

#[cfg(all(target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64")))]
#[test]
fn info_honours_custom_download_url() {
    let temp = assert_fs::TempDir::new().unwrap();
    cloakbrowser(temp.path())
        .env("CLOAKBROWSER_DOWNLOAD_URL", "https://mirror.example.com/")
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://mirror.example.com/chromium-v",
        ));
}

#[test]
fn clear_cache_removes_directory() {
    let temp = assert_fs::TempDir::new().unwrap();
    let cache = temp.child("cache");
    cache.child("chromium-1.2.3.4").create_dir_all().unwrap();
    cache.child("latest_version").write_str("1.2.3.4").unwrap();

    cloakbrowser(cache.path())
        .arg("clear-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));

    cache.assert(predicate::path::missing());
}

#[test]
fn clear_cache_on_missing_directory_succeeds() {
    let temp = assert_fs::TempDir::new().unwrap();
    cloakbrowser(&temp.path().join("never-created"))
        .arg("clear-cache")
        .assert()
        .success();
}

#[test]
fn update_with_override_is_noop() {
    let temp = assert_fs::TempDir::new().unwrap();
    let chrome = temp.child("my-chrome");
    chrome.write_binary(b"bin").unwrap();

    cloakbrowser(&temp.path().join("cache"))
        .env("CLOAKBROWSER_BINARY_PATH", chrome.path())
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}
