#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::predicate;

const CREDENTIAL_VARS: [&str; 3] = [
    "LIBTVDB_API_KEY",
    "LIBTVDB_USER_KEY",
    "LIBTVDB_USER_NAME",
];

#[test]
fn test_help_lists_subcommands() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("actors"));
}

#[test]
fn test_search_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--name"))
        .stdout(predicate::str::contains("--api-key"));
}

#[test]
fn test_search_missing_name() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--name"));
}

#[test]
fn test_show_missing_id() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--id"));
}

#[test]
fn test_actors_rejects_non_numeric_id() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.args(["actors", "--id", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_search_empty_name_makes_no_request() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.args(["search", "--name", ""])
        .args(["--api-key", "k", "--user-key", "u", "--user-name", "n"])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 0 shows"));
}

#[test]
fn test_search_missing_credentials() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    cmd.args(["search", "--name", "Game of Thrones"])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to build TVDB client"))
        .stderr(predicate::str::contains("no API key"));
}

#[test]
fn test_credentials_from_environment() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.env("LIBTVDB_API_KEY", "k")
        .env("LIBTVDB_USER_KEY", "u")
        .env("LIBTVDB_USER_NAME", "n")
        .args(["search", "--name", ""])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 0 shows"));
}

#[test]
fn test_config_path_uses_dir() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.args(["config", "path"])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_writes_file() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    // Act
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.args(["config", "init"])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success();

    // Assert
    assert!(path.exists());
}

#[test]
fn test_invalid_config_fails() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[tvdb\n").unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.args(["show", "--id", "1"])
        .args(["--api-key", "k", "--user-key", "u", "--user-name", "n"])
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}
