use std::fs;

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const INTRO: &str = "Good morning everyone. My name is Meera and I am fourteen years old. \
    I study in grade nine. I live with my family. I enjoy dancing. Thank you.";

fn introscore() -> Result<Command> {
    Ok(Command::cargo_bin("introscore")?)
}

#[test]
fn score_prints_json_report() -> Result<()> {
    let output = introscore()?
        .args(["score", "--transcript", INTRO, "--duration-secs", "15"])
        .output()?;
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["max_total"], 100);
    assert_eq!(report["dimensions"].as_array().map(Vec::len), Some(6));
    assert!(report["total"].as_u64().is_some_and(|total| total <= 100));
    Ok(())
}

#[test]
fn score_reads_transcript_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("intro.txt");
    fs::write(&path, INTRO)?;
    introscore()?
        .arg("score")
        .arg("--transcript-file")
        .arg(&path)
        .args(["--duration-min", "0.25", "--pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\""))
        .stdout(predicate::str::contains("\n  \"max_total\": 100"));
    Ok(())
}

#[test]
fn zero_duration_fails_with_validation_message() -> Result<()> {
    introscore()?
        .args(["score", "--transcript", INTRO, "--duration-secs", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duration must be positive"));
    Ok(())
}

#[test]
fn empty_transcript_is_rejected() -> Result<()> {
    introscore()?
        .args(["score", "--transcript", "  ...  ", "--duration-min", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("transcript is empty"));
    Ok(())
}

#[test]
fn rubric_subcommand_prints_bundled_rubric() -> Result<()> {
    introscore()?
        .arg("rubric")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"vocabulary_clarity\": 25"));
    Ok(())
}

#[test]
fn invalid_rubric_file_is_fatal() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("rubric.json");
    let bundled = introscore()?.arg("rubric").output()?;
    let mut config: serde_json::Value = serde_json::from_slice(&bundled.stdout)?;
    config["maxima"]["content"] = serde_json::json!(40);
    fs::write(&path, serde_json::to_string(&config)?)?;

    introscore()?
        .arg("rubric")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("sum to 110"));
    Ok(())
}
