use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

const STRINGS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<resources>
    <string name="naver_client_id">@NAVER_CLIENT_ID@</string>
    <string name="naver_client_secret">@NAVER_CLIENT_SECRET@</string>
    <string name="naver_client_name">@NAVER_CLIENT_NAME@</string>
</resources>
"#;

/// Flutter-style layout: `<root>/.env` next to `<root>/android`
struct Project {
    root: tempfile::TempDir,
}

impl Project {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let project = Self { root };
        fs::create_dir_all(project.strings_xml().parent().unwrap()).unwrap();
        fs::write(project.strings_xml(), STRINGS_XML).unwrap();
        project
    }

    fn android_dir(&self) -> PathBuf {
        self.root.path().join("android")
    }

    fn strings_xml(&self) -> PathBuf {
        self.android_dir().join("app/src/main/res/values/strings.xml")
    }

    fn write_env(&self, content: &str) {
        fs::write(self.root.path().join(".env"), content).unwrap();
    }

    fn read_strings(&self) -> String {
        fs::read_to_string(self.strings_xml()).unwrap()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("envinject-android").unwrap();
        cmd.arg("--project-dir").arg(self.android_dir()).arg("--no-color");
        cmd
    }

    /// Command run from the Flutter root, leaving paths for the caller
    fn cmd_in_root(&self) -> Command {
        let mut cmd = Command::cargo_bin("envinject-android").unwrap();
        cmd.current_dir(self.root.path()).arg("--no-color");
        cmd
    }
}

#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

#[test]
fn inject_replaces_all_tokens() {
    let project = Project::new();
    project.write_env(
        "NAVER_CLIENT_ID=id-123\nNAVER_CLIENT_SECRET=secret-456\nNAVER_CLIENT_NAME=\"Team App\"\n",
    );

    project
        .cmd()
        .arg("inject")
        .assert()
        .success()
        .stdout(predicate::str::contains("Injected 3 credentials"));

    let content = project.read_strings();
    assert!(!content.contains("@NAVER_"));
    assert!(content.contains(">id-123<"));
    assert!(content.contains(">secret-456<"));
    assert!(content.contains(">Team App<"));
}

#[test]
fn inject_without_env_file_warns_and_keeps_file() {
    let project = Project::new();

    project
        .cmd()
        .arg("inject")
        .assert()
        .success()
        .stderr(predicate::str::contains(".env file not found"))
        .stderr(predicate::str::contains("placeholders remain"));

    assert_eq!(project.read_strings(), STRINGS_XML);
}

#[test]
fn inject_env_without_known_keys_keeps_file() {
    let project = Project::new();
    project.write_env("UNRELATED_KEY=value\nANOTHER=1\n");
    let before = fs::read(project.strings_xml()).unwrap();

    project
        .cmd()
        .arg("inject")
        .assert()
        .success()
        .stderr(predicate::str::contains("placeholders remain"))
        .stderr(predicate::str::contains(".env file not found").not());

    assert_eq!(fs::read(project.strings_xml()).unwrap(), before);
}

#[test]
fn inject_keeps_special_characters_verbatim() {
    let project = Project::new();
    project.write_env(
        "NAVER_CLIENT_SECRET=ab$cd9Z\nNAVER_CLIENT_ID=C:\\dir\\n=1\nNAVER_CLIENT_NAME=a=b\n",
    );

    project.cmd().arg("inject").assert().success();

    let content = project.read_strings();
    assert!(content.contains(">ab$cd9Z<"), "secret altered: {content}");
    assert!(content.contains(">C:\\dir\\n=1<"), "backslashes altered: {content}");
    assert!(content.contains(">a=b<"));
}

#[test]
fn inject_skips_malformed_env_lines() {
    let project = Project::new();
    project.write_env("not a pair\nNAVER_CLIENT_ID=still-read\n");

    project
        .cmd()
        .arg("inject")
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipped malformed line"));

    assert!(project.read_strings().contains(">still-read<"));
}

#[test]
fn inject_with_template_keeps_template() {
    let project = Project::new();
    let template = project.strings_xml().with_file_name("strings.xml.template");
    fs::rename(project.strings_xml(), &template).unwrap();
    project.write_env("NAVER_CLIENT_ID=from-template\n");

    project
        .cmd()
        .arg("inject")
        .arg("--template")
        .arg(&template)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&template).unwrap(), STRINGS_XML);
    let content = project.read_strings();
    assert!(content.contains(">from-template<"));
    assert!(content.contains("@NAVER_CLIENT_SECRET@"));
}

#[test]
fn inject_escape_android_escapes_values() {
    let project = Project::new();
    project.write_env("NAVER_CLIENT_NAME=\"Tom & Jerry's\"\n");

    project
        .cmd()
        .args(["inject", "--escape", "android"])
        .assert()
        .success();

    assert!(project.read_strings().contains(">Tom &amp; Jerry\\'s<"));
}

#[test]
fn inject_override_paths_are_relative_to_current_dir() {
    let project = Project::new();
    fs::write(project.root.path().join("ci.env"), "NAVER_CLIENT_ID=from-ci\n").unwrap();

    project
        .cmd_in_root()
        .args(["--project-dir", "android", "inject", "--env-file", "ci.env"])
        .assert()
        .success();

    assert!(project.read_strings().contains(">from-ci<"));
}

#[test]
fn inject_partial_env_reports_missing_keys() {
    let project = Project::new();
    project.write_env("NAVER_CLIENT_ID=only-id\n");

    project
        .cmd()
        .arg("inject")
        .assert()
        .success()
        .stderr(predicate::str::contains("NAVER_CLIENT_SECRET, NAVER_CLIENT_NAME"));

    let content = project.read_strings();
    assert!(content.contains("only-id"));
    assert!(content.contains("@NAVER_CLIENT_SECRET@"));
    assert!(content.contains("@NAVER_CLIENT_NAME@"));
}

#[test]
fn inject_missing_resource_fails_with_path() {
    let project = Project::new();
    project.write_env("NAVER_CLIENT_ID=id\n");
    fs::remove_file(project.strings_xml()).unwrap();

    project
        .cmd()
        .arg("inject")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("E2005"))
        .stderr(predicate::str::contains("strings.xml"));

    assert!(!project.strings_xml().exists());
}

#[test]
fn inject_dry_run_leaves_file() {
    let project = Project::new();
    project.write_env("NAVER_CLIENT_ID=id\n");

    project
        .cmd()
        .args(["inject", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would be rewritten"));

    assert_eq!(project.read_strings(), STRINGS_XML);
}

#[test]
fn check_fails_until_injected() {
    let project = Project::new();
    project.write_env(
        "NAVER_CLIENT_ID=a\nNAVER_CLIENT_SECRET=b\nNAVER_CLIENT_NAME=c\n",
    );

    project
        .cmd()
        .arg("check")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("envinject-android inject"));
    project.cmd().arg("inject").assert().success();
    project
        .cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No placeholders remain"));
}

#[test]
fn check_json_lists_remaining() {
    let project = Project::new();

    let output = project.cmd().args(["check", "--json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["remaining"].as_array().unwrap().len(), 3);
}

#[test]
fn check_json_reports_errors_as_json() {
    let project = Project::new();
    fs::remove_file(project.strings_xml()).unwrap();

    let output = project.cmd().args(["check", "--json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["code_str"], "E2005");
    assert!(report["message"].as_str().unwrap().contains("strings.xml"));
}

#[test]
fn status_masks_values() {
    let project = Project::new();
    project.write_env("NAVER_CLIENT_SECRET=supersecret\n");

    project
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("NAVER_CLIENT_SECRET = su*********"))
        .stdout(predicate::str::contains("supersecret").not())
        .stderr(predicate::str::contains("NAVER_CLIENT_ID not set"));
}

#[test]
fn config_file_overrides_placeholders() {
    let project = Project::new();
    fs::write(
        project.android_dir().join(".envinject.toml"),
        "[[placeholders]]\nkey = \"NAVER_CLIENT_ID\"\n",
    )
    .unwrap();
    project.write_env("NAVER_CLIENT_ID=id\nNAVER_CLIENT_SECRET=secret\n");

    project.cmd().arg("inject").assert().success();

    let content = project.read_strings();
    assert!(content.contains(">id<"));
    assert!(content.contains("@NAVER_CLIENT_SECRET@"));
}

#[test]
fn invalid_config_exits_with_config_error() {
    let project = Project::new();
    fs::write(project.android_dir().join(".envinject.toml"), "placeholders = []\n").unwrap();

    project.cmd().arg("inject").assert().code(3);
}

#[cfg(unix)]
#[test]
fn build_injects_before_gradle() {
    let project = Project::new();
    project.write_env("NAVER_CLIENT_ID=built-id\n");
    write_script(
        &project.android_dir().join("gradlew"),
        "grep -q built-id app/src/main/res/values/strings.xml || exit 9\necho \"task $1\"",
    );

    project
        .cmd()
        .args(["build", "--task", "assembleRelease"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Build succeeded"));
}

#[cfg(unix)]
#[test]
fn build_with_relative_project_dir() {
    let project = Project::new();
    project.write_env("NAVER_CLIENT_ID=relative-id\n");
    write_script(
        &project.android_dir().join("gradlew"),
        "grep -q relative-id app/src/main/res/values/strings.xml || exit 9",
    );

    project
        .cmd_in_root()
        .args(["--project-dir", "android", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Build succeeded"));
}

#[cfg(unix)]
#[test]
fn build_stops_when_injection_fails() {
    let project = Project::new();
    let marker = project.android_dir().join("gradle-ran");
    write_script(
        &project.android_dir().join("gradlew"),
        &format!("touch {}", marker.display()),
    );
    fs::remove_file(project.strings_xml()).unwrap();

    project
        .cmd()
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("replaceStringsXml"));

    assert!(!marker.exists());
}
