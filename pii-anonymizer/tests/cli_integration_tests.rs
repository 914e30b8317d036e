// pii-anonymizer/tests/cli_integration_tests.rs
//! End-to-end tests for the `pii-anonymizer` binary.
//!
//! Every run points `PII_ANONYMIZER_MODELS_DIR` at an empty temp directory and
//! sets `PII_ANONYMIZER_OFFLINE`, so only the compiled-in packs are used and
//! no test touches the network or the user's cache.

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{tempdir, TempDir};

fn pii_cmd(models_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pii-anonymizer").unwrap();
    cmd.env("PII_ANONYMIZER_MODELS_DIR", models_dir.path())
        .env("PII_ANONYMIZER_OFFLINE", "true")
        .env_remove("PII_ANONYMIZER_MODEL")
        .env_remove("PII_ANONYMIZER_MODEL_URL")
        .env_remove("PII_ANONYMIZER_ALLOW_DEBUG_PII")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_file_input_and_output() -> Result<()> {
    let models = tempdir()?;
    let work = tempdir()?;
    let input = work.path().join("input.txt");
    let output = work.path().join("output.txt");
    fs::write(&input, "My name is Jane Smith and my phone is 555-123-4567")?;

    pii_cmd(&models)
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let result = fs::read_to_string(&output)?;
    assert!(result.contains("My name is"));
    assert!(!result.contains("Jane Smith"));
    assert!(!result.contains("555-123-4567"));
    Ok(())
}

#[test]
fn test_missing_input_file_fails_without_output() -> Result<()> {
    let models = tempdir()?;
    let work = tempdir()?;
    let output = work.path().join("output.txt");

    pii_cmd(&models)
        .arg("--input")
        .arg(work.path().join("non_existent_file.txt"))
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to read input file"));

    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_stdin_to_stdout_exact() -> Result<()> {
    let models = tempdir()?;
    pii_cmd(&models)
        .arg("-q")
        .write_stdin("Hello, my name is John Doe and my email is john@example.com")
        .assert()
        .success()
        .stdout("Hello, my name is <PERSON> and my email is <EMAIL_ADDRESS>");
    Ok(())
}

#[test]
fn test_text_without_pii_passes_through() -> Result<()> {
    let models = tempdir()?;
    let input = "This text contains no personally identifiable information.\n\n  Second line.\n";
    pii_cmd(&models).write_stdin(input).assert().success().stdout(input.to_string());
    Ok(())
}

#[test]
fn test_language_flag_selects_german() -> Result<()> {
    let models = tempdir()?;
    pii_cmd(&models)
        .args(["-l", "de"])
        .write_stdin("Mein Name ist Hans Müller und ich wohne in München.")
        .assert()
        .success()
        .stdout("Mein Name ist <PERSON> und ich wohne in <LOCATION>.");
    Ok(())
}

#[test]
fn test_model_from_environment() -> Result<()> {
    let models = tempdir()?;
    pii_cmd(&models)
        .env("PII_ANONYMIZER_MODEL", "de_core_news_sm")
        .write_stdin("Mein Name ist Hans Müller.")
        .assert()
        .success()
        .stdout("Mein Name ist <PERSON>.");
    Ok(())
}

#[test]
fn test_language_flag_wins_over_model_from_environment() -> Result<()> {
    let models = tempdir()?;
    pii_cmd(&models)
        .env("PII_ANONYMIZER_MODEL", "de_core_news_sm")
        .args(["-l", "en"])
        .arg("--debug")
        .write_stdin("Hello, my name is John Doe")
        .assert()
        .success()
        .stdout("Hello, my name is <PERSON>")
        .stderr(predicate::str::contains("Anonymized with 'en_core_web_sm'"))
        .stderr(predicate::str::contains("de_core_news_sm").not());
    Ok(())
}

#[test]
fn test_model_flag_wins_over_environment() -> Result<()> {
    let models = tempdir()?;
    pii_cmd(&models)
        .env("PII_ANONYMIZER_MODEL", "de_core_news_sm")
        .args(["-m", "en_core_web_sm"])
        .arg("--debug")
        .write_stdin("Hello, my name is John Doe")
        .assert()
        .success()
        .stdout("Hello, my name is <PERSON>")
        .stderr(predicate::str::contains("Anonymized with 'en_core_web_sm'"))
        .stderr(predicate::str::contains("de_core_news_sm").not());
    Ok(())
}

#[test]
fn test_model_and_language_conflict() -> Result<()> {
    let models = tempdir()?;
    pii_cmd(&models)
        .args(["--model", "en_core_web_sm", "--language", "de"])
        .write_stdin("anything")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
    Ok(())
}

#[test]
fn test_unsupported_model_fails() -> Result<()> {
    let models = tempdir()?;
    pii_cmd(&models)
        .args(["--model", "xx_unknown_model"])
        .write_stdin("Jane Smith")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Unsupported model 'xx_unknown_model'"));
    Ok(())
}

#[test]
fn test_unprovisioned_model_fails_offline() -> Result<()> {
    let models = tempdir()?;
    let work = tempdir()?;
    let output = work.path().join("output.txt");
    pii_cmd(&models)
        .args(["--model", "fr_core_news_sm"])
        .arg("--output")
        .arg(&output)
        .write_stdin("Je m'appelle Marie Dupont.")
        .assert()
        .failure()
        .stderr(predicate::str::contains("fr_core_news_sm"));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_list_models() -> Result<()> {
    let models = tempdir()?;
    pii_cmd(&models)
        .arg("--list-models")
        .assert()
        .success()
        .stdout(predicate::str::contains("en_core_web_sm"))
        .stdout(predicate::str::contains("de_core_news_sm"))
        .stdout(predicate::str::contains("nl_core_news_lg"))
        .stdout(predicate::str::contains("available"));
    Ok(())
}

#[test]
fn test_custom_rules_file() -> Result<()> {
    let models = tempdir()?;
    let work = tempdir()?;
    let rules = work.path().join("rules.yaml");
    fs::write(
        &rules,
        r#"rules:
  - name: employee_id
    entity_type: EMPLOYEE_ID
    pattern: '\bEMP-\d{6}\b'
    score: 0.9
"#,
    )?;

    pii_cmd(&models)
        .arg("--rules")
        .arg(&rules)
        .write_stdin("Badge EMP-123456 belongs to john@example.com")
        .assert()
        .success()
        .stdout("Badge <EMPLOYEE_ID> belongs to <EMAIL_ADDRESS>");
    Ok(())
}

#[test]
fn test_invalid_rules_file_fails() -> Result<()> {
    let models = tempdir()?;
    let work = tempdir()?;
    let rules = work.path().join("rules.yaml");
    fs::write(
        &rules,
        "rules:\n  - name: broken\n    entity_type: BROKEN\n    pattern: '(unclosed'\n    score: 0.9\n",
    )?;

    pii_cmd(&models)
        .arg("--rules")
        .arg(&rules)
        .write_stdin("text")
        .assert()
        .failure()
        .code(1);
    Ok(())
}

#[test]
fn test_debug_logs_go_to_stderr() -> Result<()> {
    let models = tempdir()?;
    pii_cmd(&models)
        .arg("--debug")
        .write_stdin("Write to jane@example.com")
        .assert()
        .success()
        .stdout("Write to <EMAIL_ADDRESS>")
        .stderr(predicate::str::contains("[DEBUG]"))
        .stderr(predicate::str::contains("jane@example.com").not());
    Ok(())
}
