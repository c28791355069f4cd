//! End-to-end tests for the `pfxchain` binary. None of them reach the network.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata")
        .join(name)
        .canonicalize()
        .unwrap()
}

/// Command isolated from any user config file.
fn pfxchain(dir: &TempDir) -> Command {
    let config = dir.path().join("pfxchain.toml");
    std::fs::write(&config, "").unwrap();

    let mut cmd = Command::cargo_bin("pfxchain").unwrap();
    cmd.env("PFXCHAIN_CONFIG", &config)
        .env_remove("PFXCHAIN_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn resolve_root_prints_it_back_as_pem() {
    let dir = TempDir::new().unwrap();
    pfxchain(&dir)
        .args(["resolve", "--output", "pem"])
        .arg(testdata("root.pem"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("-----BEGIN CERTIFICATE-----"))
        .stdout(predicate::str::contains("-----BEGIN CERTIFICATE-----").count(1));
}

#[test]
fn resolve_complete_input_fetches_nothing() {
    let dir = TempDir::new().unwrap();
    let output = pfxchain(&dir)
        .args(["resolve", "--output", "json"])
        .arg(testdata("leaf.pem"))
        .arg(testdata("int.pem"))
        .arg(testdata("root.der"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["attempts"], 0);
    assert_eq!(json["complete"], true);
    let certs = json["certificates"].as_array().unwrap();
    assert_eq!(certs.len(), 3);
    assert!(certs.iter().all(|c| c["source"] == "input"));
    assert_eq!(certs[0]["subject_key_id"], "4C");
}

#[test]
fn resolve_stops_at_fetch_ceiling() {
    let dir = TempDir::new().unwrap();
    pfxchain(&dir)
        .args(["resolve", "--output", "json", "--max-fetches", "0"])
        .arg(testdata("leaf.pem"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""stopped": "fetch limit reached""#));
}

#[test]
fn resolve_rejects_non_certificates() {
    let dir = TempDir::new().unwrap();
    pfxchain(&dir)
        .arg("resolve")
        .arg(testdata("leaf.key"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("neither PEM nor DER"));
}

#[test]
fn bundle_without_fetch_then_inspect() {
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("cache");

    let output = pfxchain(&dir)
        .args(["bundle", "--no-fetch", "--output", "json", "--password", "secret"])
        .arg("--pfx")
        .arg(testdata("leaf.pfx"))
        .arg("--cache-dir")
        .arg(&cache)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["cache_key"].as_str().unwrap().ends_with("-chain+pkey.pem"));
    assert_eq!(json["key_format"], "PRIVATE KEY");
    assert_eq!(json["certificates"].as_array().unwrap().len(), 2);

    let location = PathBuf::from(json["location"].as_str().unwrap());
    assert!(location.starts_with(&cache));
    assert!(location.is_file());

    pfxchain(&dir)
        .arg("inspect")
        .arg(&location)
        .assert()
        .success()
        .stdout(predicate::str::contains("PRIVATE KEY"))
        .stdout(predicate::str::contains("2 certificate(s)"));
}

#[test]
fn bundle_with_wrong_password_fails() {
    let dir = TempDir::new().unwrap();
    pfxchain(&dir)
        .args(["bundle", "--no-fetch", "--password", "wrong"])
        .arg("--pfx")
        .arg(testdata("leaf.pfx"))
        .arg("--cache-dir")
        .arg(dir.path().join("cache"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("PKCS#12"));
}

#[test]
fn inspect_pem_output_omits_the_key() {
    let dir = TempDir::new().unwrap();
    let bundle = dir.path().join("bundle.pem");
    let mut data = std::fs::read(testdata("leaf.key")).unwrap();
    data.extend(std::fs::read(testdata("leaf.pem")).unwrap());
    std::fs::write(&bundle, data).unwrap();

    pfxchain(&dir)
        .args(["inspect", "--output", "pem"])
        .arg(&bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("BEGIN CERTIFICATE"))
        .stdout(predicate::str::contains("PRIVATE KEY").not());
}

#[test]
fn unknown_output_format_is_rejected() {
    let dir = TempDir::new().unwrap();
    pfxchain(&dir)
        .args(["resolve", "--output", "yaml"])
        .arg(testdata("root.pem"))
        .assert()
        .failure();
}
