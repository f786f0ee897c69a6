#![allow(deprecated)]
use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// SHA-1 of "abc".
const ABC_SHA1: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";

const DATASET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ddm:DDM xmlns:ddm="http://easy.dans.knaw.nl/schemas/md/ddm/"
         xmlns:dc="http://purl.org/dc/elements/1.1/"
         xmlns:dcterms="http://purl.org/dc/terms/"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <ddm:profile>
    <dc:title>Survey data</dc:title>
    <dcterms:description>Raw survey data.</dcterms:description>
    <dc:creator>J. Jansen</dc:creator>
    <ddm:created>2023-05-01</ddm:created>
    <ddm:available>2023-05-01</ddm:available>
    <ddm:audience>D24000</ddm:audience>
    <ddm:accessRights>OPEN_ACCESS</ddm:accessRights>
  </ddm:profile>
  <ddm:dcmiMetadata>
    <dcterms:license xsi:type="dcterms:URI">http://creativecommons.org/licenses/by/4.0</dcterms:license>
  </ddm:dcmiMetadata>
</ddm:DDM>
"#;

const FILES_XML: &str = r#"<files xmlns="http://easy.dans.knaw.nl/schemas/bag/metadata/files/">
  <file filepath="data/a.txt"/>
</files>
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Compliant standard bag at `<tmp>/bag-1`.
fn compliant_bag() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let bag = dir.path().join("bag-1");
    write(&bag, "bagit.txt", "BagIt-Version: 1.0\nTag-File-Character-Encoding: UTF-8\n");
    write(&bag, "bag-info.txt", "Created: 2024-03-01T10:15:00+01:00\n");
    write(&bag, "data/a.txt", "abc");
    write(&bag, "manifest-sha1.txt", &format!("{}  data/a.txt\n", ABC_SHA1));
    write(&bag, "metadata/dataset.xml", DATASET_XML);
    write(&bag, "metadata/files.xml", FILES_XML);
    (dir, bag)
}

fn bagprofile(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bagprofile").unwrap();
    cmd.current_dir(cwd)
        .env_remove("BAGPROFILE_CONFIG")
        .env_remove("BAGPROFILE_REPOSITORY");
    cmd
}

fn json_stdout(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout must be JSON")
}

#[test]
fn compliant_bag_exits_zero() {
    let (dir, bag) = compliant_bag();
    bagprofile(dir.path())
        .arg("validate")
        .arg(&bag)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Compliant:        yes"));
}

#[test]
fn violations_exit_one_with_json_report() {
    let (dir, bag) = compliant_bag();
    fs::remove_file(bag.join("metadata/dataset.xml")).unwrap();

    let output = bagprofile(dir.path())
        .args(["validate", "--format", "json"])
        .arg(&bag)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report = json_stdout(&output);
    assert_eq!(report["bagName"], "bag-1");
    assert_eq!(report["isCompliant"], false);
    assert_eq!(report["infoPackageType"], "standard");
    assert_eq!(report["ruleViolations"][0]["rule"], "2.2(a)");
    assert_eq!(report["ruleViolations"].as_array().unwrap().len(), 1);
}

#[test]
fn missing_bag_is_rejected() {
    let dir = tempdir().unwrap();
    bagprofile(dir.path())
        .args(["validate", "does-not-exist"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("bag not found"));
}

#[test]
fn external_context_without_repository_is_rejected() {
    let (dir, bag) = compliant_bag();
    bagprofile(dir.path())
        .args(["validate", "--context", "with-external-context"])
        .arg(&bag)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("requires a metadata repository"));
}

#[test]
fn external_context_with_repository_snapshot() {
    let (dir, bag) = compliant_bag();
    write(
        &bag,
        "bag-info.txt",
        "Created: 2024-03-01T10:15:00+01:00\n\
         Is-Version-Of: urn:uuid:6d1b5ba3-7f5c-4a23-9ff1-4b0b6a3b1e33\n\
         Data-Station-User-Account: user001\n",
    );
    write(
        dir.path(),
        "repo.yaml",
        "max_embargo_months: 18\n\
         datasets:\n\
         \x20 - is_version_of: urn:uuid:6d1b5ba3-7f5c-4a23-9ff1-4b0b6a3b1e33\n\
         \x20   persistent_id: doi:10.5072/FK2/ABCDEF\n\
         \x20   role_assignments:\n\
         \x20     - { user: user001, role: curator }\n",
    );

    bagprofile(dir.path())
        .args(["validate", "--context", "with-external-context"])
        .arg(&bag)
        .env("BAGPROFILE_REPOSITORY", dir.path().join("repo.yaml"))
        .assert()
        .code(0);
}

#[test]
fn invalid_config_is_an_internal_error() {
    let (dir, bag) = compliant_bag();
    write(dir.path(), "bagprofile.yaml", "licences: []\n");

    bagprofile(dir.path())
        .arg("validate")
        .arg(&bag)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn config_license_list_is_applied() {
    let (dir, bag) = compliant_bag();
    write(
        dir.path(),
        "bagprofile.yaml",
        "licenses:\n  - http://example.org/house-license\n",
    );

    let output = bagprofile(dir.path())
        .args(["validate", "--format", "json"])
        .arg(&bag)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json_stdout(&output)["ruleViolations"][0]["rule"], "3.1.2");
}

#[test]
fn archive_input_is_extracted() {
    let (dir, bag) = compliant_bag();
    let archive = dir.path().join("bag-1.tar.gz");
    {
        let file = fs::File::create(&archive).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        builder.append_dir_all("bag-1", &bag).unwrap();
        builder.into_inner().unwrap().finish().unwrap();
    }
    fs::remove_dir_all(&bag).unwrap();

    let output = bagprofile(dir.path())
        .args(["validate", "--format", "json"])
        .arg(&archive)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(json_stdout(&output)["bagName"], "bag-1");
}

#[test]
fn rules_lists_the_builtin_catalog() {
    let dir = tempdir().unwrap();
    let output = bagprofile(dir.path())
        .args(["rules", "--format", "json", "--variant", "legacy-migration"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let rules = json_stdout(&output);
    let numbers: Vec<&str> = rules
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers[0], "1.1.1");
    assert!(numbers.contains(&"2.5"));
    assert_eq!(numbers.iter().filter(|n| **n == "2.3").count(), 1);
    assert_eq!(rules[0]["dependsOn"], serde_json::json!([]));
}
