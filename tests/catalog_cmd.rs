use std::fs;

use assert_cmd::Command;
use tempfile::TempDir;

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn show_builtin_catalog() {
    let mut cmd = Command::cargo_bin("kira-neurovoice").unwrap();
    cmd.arg("catalog").arg("show");
    let stdout = stdout_of(&mut cmd);
    assert!(stdout.starts_with("indicators (version v5):"));
    assert_eq!(stdout.lines().count(), 108);
}

#[test]
fn show_single_domain() {
    let mut cmd = Command::cargo_bin("kira-neurovoice").unwrap();
    cmd.arg("catalog").arg("show").arg("--domain").arg("lexical");
    let stdout = stdout_of(&mut cmd);
    assert!(stdout.contains("LEX_TTR\tlexical\t0.85\tType-Token Ratio"));
    assert!(!stdout.contains("ACU_JITTER"));
    assert_eq!(stdout.lines().count(), 18);
}

#[test]
fn unknown_domain_fails() {
    let mut cmd = Command::cargo_bin("kira-neurovoice").unwrap();
    cmd.arg("catalog").arg("show").arg("--domain").arg("astrology");
    cmd.assert().failure();
}

#[test]
fn show_user_catalog() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("catalog.tsv");
    fs::write(
        &path,
        "X_ONE\tlexical\t0.5\ttext\talzheimer:-1\talzheimer:0.5\tFirst\n",
    )
    .unwrap();
    let mut cmd = Command::cargo_bin("kira-neurovoice").unwrap();
    cmd.arg("catalog").arg("show").arg("--catalog").arg(&path);
    let stdout = stdout_of(&mut cmd);
    assert!(stdout.contains("version user"));
    assert!(stdout.contains("X_ONE\tlexical\t0.50\tFirst"));
}
