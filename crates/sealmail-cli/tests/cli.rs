//! End-to-end tests for the `sealmail` binary.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn testdata(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../sealmail-core/testdata")
        .join(name)
}

/// A scratch directory with a manifest: recipient1 can sign, recipient2 can
/// only receive.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("identities.toml"),
        format!(
            "[[identity]]\ncertificate = {:?}\nkey = {:?}\n\n[[identity]]\ncertificate = {:?}\n",
            testdata("recipient1.cert.pem"),
            testdata("recipient1.key.pem"),
            testdata("recipient2.cert.pem"),
        ),
    )
    .unwrap();
    dir
}

fn sealmail(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sealmail").unwrap();
    cmd.env_remove("SEALMAIL_CONFIG")
        .env_remove("SEALMAIL_IDENTITIES")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.join("config.toml"))
        .arg("--identities")
        .arg(dir.join("identities.toml"));
    cmd
}

#[test]
fn test_fingerprint_prints_sha1() {
    let dir = workspace();
    sealmail(dir.path())
        .arg("fingerprint")
        .arg(testdata("recipient1.cert.pem"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "0C:65:DD:C1:FF:AF:B1:BC:3A:9F:00:0F:D7:50:DA:01:D1:7E:C9:FE",
        ))
        .stdout(predicate::str::contains("recipient1@example.com"));
}

#[test]
fn test_fingerprint_rejects_non_certificate() {
    let dir = workspace();
    sealmail(dir.path())
        .arg("fingerprint")
        .arg(testdata("recipient1.key.pem"))
        .assert()
        .failure();
}

#[test]
fn test_identities_json() {
    let dir = workspace();
    sealmail(dir.path())
        .args(["-o", "json", "identities"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sender_capable\": true"))
        .stdout(predicate::str::contains("recipient2@example.com"))
        .stdout(predicate::str::contains("BEGIN").not());
}

#[test]
fn test_analyze_partitions_recipients() {
    let dir = workspace();
    sealmail(dir.path())
        .args([
            "-o",
            "json",
            "analyze",
            "--to",
            "recipient2@example.com,stranger@example.com",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fully_encryptable\": false"))
        .stdout(predicate::str::contains("\"stranger@example.com\""));
}

#[test]
fn test_encrypt_then_open() {
    let dir = workspace();
    let input = dir.path().join("body.txt");
    let envelope = dir.path().join("body.p7m");
    std::fs::write(&input, "Content-Type: text/plain\n\nhello from the cli\n").unwrap();

    sealmail(dir.path())
        .args(["encrypt", "--from", "recipient1@example.com"])
        .args(["--to", "recipient2@example.com"])
        .arg("--input")
        .arg(&input)
        .arg("--output-file")
        .arg(&envelope)
        .assert()
        .success();
    let entity = std::fs::read_to_string(&envelope).unwrap();
    assert!(entity.contains("Content-Type: application/pkcs7-mime"));
    assert!(!entity.contains("x-pkcs7-mime"));

    sealmail(dir.path())
        .arg("open")
        .arg("--cert")
        .arg(testdata("recipient2.cert.pem"))
        .arg("--key")
        .arg(testdata("recipient2.key.pem"))
        .arg("--trust")
        .arg(testdata("recipient1.cert.pem"))
        .arg("--input")
        .arg(&envelope)
        .assert()
        .success()
        .stdout(predicate::str::contains("hello from the cli"))
        .stderr(predicate::str::contains("0C:65:DD"));
}

#[test]
fn test_encrypt_refuses_unknown_recipient() {
    let dir = workspace();
    let input = dir.path().join("body.txt");
    std::fs::write(&input, "hello").unwrap();

    sealmail(dir.path())
        .args(["encrypt", "--from", "recipient1@example.com"])
        .args(["--to", "stranger@example.com"])
        .arg("--input")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("stranger@example.com"));
}

#[test]
fn test_send_writes_to_file_transport() {
    let dir = workspace();
    let outbox = dir.path().join("outbox");
    std::fs::write(
        dir.path().join("config.toml"),
        format!("[transport]\nkind = \"file\"\ndir = {outbox:?}\n"),
    )
    .unwrap();

    sealmail(dir.path())
        .args(["-o", "json", "send", "--from", "recipient1@example.com"])
        .args(["--to", "recipient2@example.com", "--subject", "Hi"])
        .args(["--body", "sealed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sent\": 1"));

    let written: Vec<_> = std::fs::read_dir(&outbox)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "eml"))
        .collect();
    assert_eq!(written.len(), 1);
    let raw = std::fs::read_to_string(&written[0]).unwrap();
    assert!(raw.contains("application/pkcs7-mime"));
    assert!(!raw.contains("sealed"));
}

#[test]
fn test_send_without_fallback_fails_for_stranger() {
    let dir = workspace();
    let outbox = dir.path().join("outbox");
    std::fs::write(
        dir.path().join("config.toml"),
        format!("[transport]\nkind = \"file\"\ndir = {outbox:?}\n"),
    )
    .unwrap();

    sealmail(dir.path())
        .args(["send", "--from", "recipient1@example.com"])
        .args(["--to", "stranger@example.com", "--body", "x"])
        .assert()
        .failure();

    sealmail(dir.path())
        .args(["send", "--from", "recipient1@example.com", "--plaintext-fallback"])
        .args(["--to", "stranger@example.com", "--body", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 message(s)"));
}
