//! Command line tests
//!
//! Each test works on a fresh copy of a small terraform project in a temporary directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MAIN_TF: &str = r#"module "legacy-vpc" {
  source  = "org/net/aws"
  version = "3.0.0"
}

module "vpc-prod" {
  source  = "org/net/aws"
  version = "3.0.0"
}

module "local" {
  source = "./modules/local"
}
"#;

const VERSIONS_TF: &str = r#"terraform {
  required_version = ">= 1.3"

  required_providers {
    aws = {
      source  = "hashicorp/aws"
      version = "~> 4.0"
    }
  }
}
"#;

const NESTED_TF: &str = r#"module "vpc" {
  source  = "org/net/aws"
  version = "4.0.0"
}
"#;

fn project() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "main.tf", MAIN_TF);
    write(dir.path(), "versions.tf", VERSIONS_TF);
    write(dir.path(), "env/prod/main.tf", NESTED_TF);
    dir
}

fn write(root: &Path, file: &str, contents: &str) {
    let path = root.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn read(root: &Path, file: &str) -> String {
    fs::read_to_string(root.join(file)).unwrap()
}

fn tfbump(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tfbump").unwrap();
    cmd.arg("-C").arg(dir.path());
    cmd
}

#[test]
fn module_update_with_ignore_name() {
    let dir = project();

    tfbump(&dir)
        .args(["module", "org/net/aws", "5.0.0", "--ignore-name", "legacy-*"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "main.tf: module vpc-prod: 3.0.0 -> 5.0.0",
        ))
        .stdout(predicate::str::contains("env/prod/main.tf: module vpc: 4.0.0 -> 5.0.0"))
        .stdout(predicate::str::contains("Updated 2 version(s) in 2 of 3 file(s)"));

    let expected = MAIN_TF.replacen(
        "module \"vpc-prod\" {\n  source  = \"org/net/aws\"\n  version = \"3.0.0\"",
        "module \"vpc-prod\" {\n  source  = \"org/net/aws\"\n  version = \"5.0.0\"",
        1,
    );
    assert_eq!(read(dir.path(), "main.tf"), expected);
    assert_eq!(read(dir.path(), "versions.tf"), VERSIONS_TF);
}

#[test]
fn from_filter() {
    let dir = project();

    tfbump(&dir)
        .args(["module", "org/net/aws", "5.0.0", "--from", "4.0.0"])
        .assert()
        .success();

    assert_eq!(read(dir.path(), "main.tf"), MAIN_TF);
    assert_eq!(
        read(dir.path(), "env/prod/main.tf"),
        NESTED_TF.replace("4.0.0", "5.0.0")
    );
}

#[test]
fn dry_run_writes_nothing() {
    let dir = project();

    tfbump(&dir)
        .args(["--dry-run", "provider", "aws", "~> 5.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[dry-run] versions.tf: provider aws: ~> 4.0 -> ~> 5.0",
        ))
        .stdout(predicate::str::contains("Would update 1 version(s)"));

    assert_eq!(read(dir.path(), "versions.tf"), VERSIONS_TF);
}

#[test]
fn terraform_version() {
    let dir = project();

    tfbump(&dir)
        .args(["tf", ">= 1.5", "--files", "*.tf"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "versions.tf: terraform required_version: >= 1.3 -> >= 1.5",
        ));

    assert_eq!(
        read(dir.path(), "versions.tf"),
        VERSIONS_TF.replace(">= 1.3", ">= 1.5")
    );
}

#[test]
fn local_module_warns() {
    let dir = project();

    tfbump(&dir)
        .args(["module", "./modules/local", "1.0.0"])
        .assert()
        .success()
        .stderr(predicate::str::contains("local module source"))
        .stderr(predicate::str::contains("module local has a local source"));

    assert_eq!(read(dir.path(), "main.tf"), MAIN_TF);
}

#[test]
fn verbose_reports_skips() {
    let dir = project();

    tfbump(&dir)
        .args([
            "-v",
            "-n",
            "module",
            "org/net/aws",
            "5.0.0",
            "--ignore-version",
            "3.0.0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "main.tf: skipped module legacy-vpc: version is ignored (3.0.0)",
        ));
}

#[test]
fn batch_file() {
    let dir = project();
    write(
        dir.path(),
        "tfbump.yaml",
        r#"
files: "*.tf"
modules:
  - source: org/net/aws
    version: 6.0.0
    from: [3.0.0]
providers:
  - name: hashicorp/aws
    version: "~> 5.0"
"#,
    );

    tfbump(&dir)
        .args(["batch", "tfbump.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 3 version(s) in 2 of 2 file(s)"));

    assert_eq!(read(dir.path(), "main.tf"), MAIN_TF.replace("3.0.0", "6.0.0"));
    assert_eq!(
        read(dir.path(), "versions.tf"),
        VERSIONS_TF.replace("~> 4.0", "~> 5.0")
    );
    // outside of `*.tf`
    assert_eq!(read(dir.path(), "env/prod/main.tf"), NESTED_TF);
}

#[test]
fn invalid_batch_touches_nothing() {
    let dir = project();
    write(
        dir.path(),
        "tfbump.yaml",
        r#"
modules:
  - source: org/net/aws
    version: 6.0.0
  - source: org/net/gcp
"#,
    );

    tfbump(&dir)
        .args(["batch", "tfbump.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "modules[1]: missing required field `version`",
        ));

    assert_eq!(read(dir.path(), "main.tf"), MAIN_TF);
}

#[test]
fn broken_file_does_not_stop_run() {
    let dir = project();
    write(dir.path(), "broken.tf", "module \"vpc\" {\n");

    tfbump(&dir)
        .args(["module", "org/net/aws", "5.0.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.tf: unable to parse file"));

    assert_eq!(read(dir.path(), "main.tf"), MAIN_TF.replace("3.0.0", "5.0.0"));
}

#[test]
fn json_output() {
    let dir = project();

    let output = tfbump(&dir)
        .args(["-F", "json", "-n", "terraform", ">= 1.5"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["dry_run"], true);

    let changed: Vec<_> = summary["files"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|file| file["changed"] == true)
        .collect();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0]["written"], false);
    assert_eq!(changed[0]["actions"][0]["kind"], "terraform");
    assert_eq!(changed[0]["actions"][0]["from"], ">= 1.3");
}

#[test]
fn no_matching_files() {
    let dir = project();

    tfbump(&dir)
        .args(["--files", "**/*.hcl", "module", "org/net/aws", "5.0.0"])
        .assert()
        .success()
        .stderr(predicate::str::contains("no files match"));
}
