//! Scenario: Read-Only Commands
//!
//! # Invariant under test
//! `packs`, `quote`, `validate`, `config-hash` and `support` never touch the
//! order log and print stable key=value lines.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn gocredit(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("gocredit").unwrap();
    cmd.current_dir(dir).env_remove("GOCREDIT_CONFIG");
    cmd
}

#[test]
fn packs_lists_table_in_price_order() {
    let dir = tempfile::tempdir().unwrap();
    let out = gocredit(dir.path()).arg("packs").output().unwrap();
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(
        lines[0],
        "data_pack label=\"220 Mo\" price=200 display=\"200 FCFA\""
    );
    assert_eq!(
        lines[5],
        "data_pack label=\"10 Go\" price=7000 display=\"7 000 FCFA\""
    );
    assert_eq!(lines[6], "call_bundle price=500 display=\"500 FCFA\"");
    assert!(!dir.path().join("exports").exists());
}

#[test]
fn quote_prices_without_validating() {
    let dir = tempfile::tempdir().unwrap();
    gocredit(dir.path())
        .args(["quote", "--service", "call"])
        .assert()
        .success()
        .stdout(predicate::str::contains("price=500"));

    gocredit(dir.path())
        .args(["quote", "--amount", "abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("price=0"));
}

#[test]
fn quote_rejects_unknown_pack() {
    let dir = tempfile::tempdir().unwrap();
    gocredit(dir.path())
        .args(["quote", "--service", "data", "--pack", "3 Go"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown data pack '3 Go'"));
}

#[test]
fn validate_reports_success() {
    let dir = tempfile::tempdir().unwrap();
    gocredit(dir.path())
        .args(["validate", "--name", "Awa", "--phone", "0512345678", "--amount", "300"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid=true"));
}

#[test]
fn validate_requires_minimum_credit() {
    let dir = tempfile::tempdir().unwrap();
    gocredit(dir.path())
        .args(["validate", "--name", "Awa", "--phone", "0512345678", "--amount", "299"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("valid=false"))
        .stdout(predicate::str::contains("error field=amount"));
}

#[test]
fn config_hash_prints_hash_and_canonical_json() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    std::fs::write(&base, "support:\n  phone: \"+2250700000000\"\n").unwrap();

    gocredit(dir.path())
        .args(["config-hash", base.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::is_match("config_hash=[0-9a-f]{64}").unwrap())
        .stdout(predicate::str::contains(r#"{"support":{"phone":"+2250700000000"}}"#));
}

#[test]
fn support_uses_defaults_and_config() {
    let dir = tempfile::tempdir().unwrap();
    gocredit(dir.path())
        .arg("support")
        .assert()
        .success()
        .stdout(predicate::str::contains("support_phone=+2250564550796"))
        .stdout(predicate::str::contains(
            "support_whatsapp=https://wa.me/2250564550796",
        ));

    let cfg = dir.path().join("support.yaml");
    std::fs::write(&cfg, "support:\n  phone: \"+2250700000000\"\n").unwrap();
    gocredit(dir.path())
        .env("GOCREDIT_CONFIG", cfg.to_str().unwrap())
        .arg("support")
        .assert()
        .success()
        .stdout(predicate::str::contains("support_phone=+2250700000000"));
}
