use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn autofill() -> Command {
    Command::cargo_bin("autofill").unwrap()
}

#[test]
fn test_help_lists_commands() {
    autofill()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("fill"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_extract_missing_document() {
    autofill()
        .args(["extract", "/nonexistent/aadhaar.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("document not found"));
}

#[test]
fn test_extract_malformed_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.pdf");
    std::fs::write(&path, b"definitely not a pdf").unwrap();

    autofill()
        .args(["extract", "--text-only", "--no-qa"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed document"));
}

#[test]
fn test_fill_requires_a_source() {
    autofill()
        .args(["fill", "--url", "docs.google.com/forms/d/x/viewform"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--data"));
}

#[test]
fn test_fill_sources_conflict() {
    autofill()
        .args(["fill", "--url", "x", "--data", "{}", "--pdf", "scan.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_fill_rejects_invalid_data_before_launch() {
    autofill()
        .args(["fill", "--url", "x", "--data", "[\"name\"]", "--headless", "--no-hold"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Field data must be a JSON object"));
}

#[test]
fn test_config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let path = path.to_str().unwrap();

    autofill()
        .args(["--config", path, "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    autofill()
        .args(["--config", path, "config", "get", "browser.window_width"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1280\n"));

    autofill()
        .args(["--config", path, "config", "set", "form.keystroke_delay_ms", "10"])
        .assert()
        .success();

    autofill()
        .args(["--config", path, "config", "get", "form.keystroke_delay_ms"])
        .assert()
        .success()
        .stdout(predicate::str::diff("10\n"));

    autofill()
        .args(["--config", path, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_unknown_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    autofill()
        .arg("--config")
        .arg(&path)
        .args(["config", "get", "form.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}
