//! Integration tests for the passordr CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Passwords are passed through `PASSORDR_PASSWORD` and
//! `PASSORDR_NEW_PASSWORD` so nothing waits on an interactive prompt.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: a passordr command rooted in `dir`.
fn passordr(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("passordr").expect("binary should exist");
    cmd.arg("--data-dir")
        .arg(dir.path())
        .env_remove("PASSORDR_PASSWORD")
        .env_remove("PASSORDR_NEW_PASSWORD")
        .env_remove("PASSORDR_LOG");
    cmd
}

#[test]
fn help_flag_shows_usage() {
    let tmp = TempDir::new().unwrap();
    passordr(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted vaults"))
        .stdout(predicate::str::contains("vault"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("backup"))
        .stdout(predicate::str::contains("restore"))
        .stdout(predicate::str::contains("lock-timeout"));
}

#[test]
fn version_flag_shows_version() {
    let tmp = TempDir::new().unwrap();
    passordr(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("passordr"));
}

#[test]
fn no_args_shows_help() {
    let tmp = TempDir::new().unwrap();
    passordr(&tmp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn first_run_seeds_default_vault() {
    let tmp = TempDir::new().unwrap();
    passordr(&tmp)
        .args(["vault", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New vault"))
        .stdout(predicate::str::contains("1 vault(s)"));

    tmp.child("vaults.json").assert(predicate::path::exists());
}

#[test]
fn password_less_add_show_and_history() {
    let tmp = TempDir::new().unwrap();

    passordr(&tmp)
        .args(["hint", "first pet + year"])
        .assert()
        .success();
    passordr(&tmp)
        .args(["add", "mail", "bank"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added service #1: bank"));

    passordr(&tmp)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("first pet + year"))
        .stdout(predicate::str::contains("mail"))
        .stdout(predicate::str::contains("bank"));

    passordr(&tmp)
        .args(["outdate", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("outdated"));

    passordr(&tmp)
        .args(["history", "--last", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("outdated"))
        .stdout(predicate::str::contains("Showing 1 of 3"));
}

#[test]
fn outdating_unknown_service_fails() {
    let tmp = TempDir::new().unwrap();
    passordr(&tmp)
        .args(["outdate", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No service at index 5"));
}

#[test]
fn deleting_the_last_vault_fails() {
    let tmp = TempDir::new().unwrap();
    passordr(&tmp)
        .args(["vault", "delete", "New vault", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("last remaining vault"));
}

#[test]
fn create_select_and_delete_vaults() {
    let tmp = TempDir::new().unwrap();
    passordr(&tmp)
        .args(["vault", "create", "Work", "--select"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created vault 'Work'"));

    passordr(&tmp)
        .args(["vault", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 vault(s)"));

    passordr(&tmp)
        .args(["vault", "rename", "Work", "Office"])
        .assert()
        .success();

    passordr(&tmp)
        .args(["vault", "delete", "Office", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current vault: 'New vault'"));
}

#[test]
fn password_protects_and_wrong_password_fails() {
    let tmp = TempDir::new().unwrap();
    passordr(&tmp)
        .arg("password")
        .env("PASSORDR_NEW_PASSWORD", "correct-horse")
        .assert()
        .success();

    passordr(&tmp)
        .arg("show")
        .env("PASSORDR_PASSWORD", "wrong-horse")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong password"));

    passordr(&tmp)
        .arg("show")
        .env("PASSORDR_PASSWORD", "correct-horse")
        .assert()
        .success();
}

#[test]
fn short_new_password_is_rejected() {
    let tmp = TempDir::new().unwrap();
    passordr(&tmp)
        .arg("password")
        .env("PASSORDR_NEW_PASSWORD", "short")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
}

#[test]
fn local_backup_and_restore() {
    let tmp = TempDir::new().unwrap();
    passordr(&tmp).args(["add", "mail"]).assert().success();
    passordr(&tmp).arg("backup").assert().success();

    tmp.child("backups").assert(predicate::path::is_dir());

    passordr(&tmp).args(["add", "bank"]).assert().success();
    passordr(&tmp)
        .args(["restore", "--force"])
        .assert()
        .success();

    passordr(&tmp)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("mail"))
        .stdout(predicate::str::contains("bank").not());
}

#[test]
fn lock_timeout_roundtrip() {
    let tmp = TempDir::new().unwrap();
    passordr(&tmp)
        .arg("lock-timeout")
        .assert()
        .success()
        .stdout(predicate::str::contains("300000 ms"));

    passordr(&tmp)
        .args(["lock-timeout", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("disabled"));
}

#[test]
fn completions_for_bash() {
    let tmp = TempDir::new().unwrap();
    passordr(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("passordr"));
}

#[test]
fn config_shows_defaults() {
    let tmp = TempDir::new().unwrap();
    passordr(&tmp)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("using defaults"))
        .stdout(predicate::str::contains("vaults.json"))
        .stdout(predicate::str::contains("local-file"));
}
