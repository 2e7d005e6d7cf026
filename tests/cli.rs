use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

struct Context {
    cmd: Command,
    dir: TempDir,
}

fn setup() -> Context {
    let dir = tempfile::Builder::new()
        .prefix("runboard-test")
        .tempdir()
        .unwrap();

    let mut cmd = Command::cargo_bin("runboard").unwrap();
    cmd.current_dir(&dir).env("RUNBOARD_LOG_DIR", dir.path());

    Context { cmd, dir }
}

#[test_log::test]
fn test_prints_defaults_without_a_config_file() {
    let mut context = setup();

    context
        .cmd
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("branch_name = \"main\""))
        .stdout(predicate::str::contains("file_extension = \".py\""))
        .stdout(predicate::str::contains("[endpoints]"));
}

#[test_log::test]
fn test_prints_the_given_config_file() {
    let mut context = setup();
    let path = context.dir.path().join("custom.toml");
    std::fs::write(
        &path,
        "branch_name = \"develop\"\n\n[endpoints]\nexecute = \"http://localhost:9999/execute\"\n",
    )
    .unwrap();

    context
        .cmd
        .arg("--config-path")
        .arg(&path)
        .args(["--print-config", "--timeframe", "week"])
        .assert()
        .success()
        .stdout(predicate::str::contains("branch_name = \"develop\""))
        .stdout(predicate::str::contains("http://localhost:9999/execute"))
        .stdout(predicate::str::contains("default_timeframe = \"week\""));
}

#[test_log::test]
fn test_environment_overrides_the_file() {
    let mut context = setup();
    std::fs::write(
        context.dir.path().join("runboard.toml"),
        "branch_name = \"develop\"\n",
    )
    .unwrap();

    context
        .cmd
        .env("RUNBOARD_BRANCH_NAME", "release")
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("branch_name = \"release\""));
}

#[test_log::test]
fn test_fails_on_a_missing_config_file() {
    let mut context = setup();

    context
        .cmd
        .args(["--config-path", "nope.toml", "--print-config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test_log::test]
fn test_view_code_requires_a_test_name() {
    let mut context = setup();

    context
        .cmd
        .args(["--mode", "view-code"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("testName"));
}

#[test_log::test]
fn test_rejects_unknown_timeframes() {
    let mut context = setup();

    context
        .cmd
        .args(["--timeframe", "decade", "--print-config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("decade"));
}
