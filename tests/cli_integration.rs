//! CLI integration tests for buildplan
//!
//! These tests drive the binary end to end: project initialization,
//! classpath resolution, task execution and dependency update reports.

use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Get a command instance for the buildplan binary
fn buildplan_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("buildplan"))
}

/// Create a temporary directory and initialize a project
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    buildplan_cmd().arg("init").arg(dir.path()).assert().success();
    dir
}

/// Appends TOML to the project's build file
fn append_build(dir: &TempDir, extra: &str) {
    let path = dir.path().join("build.toml");
    let mut content = fs::read_to_string(&path).unwrap();
    content.push('\n');
    content.push_str(extra);
    fs::write(path, content).unwrap();
}

fn json_stdout(assert: &assert_cmd::assert::Assert) -> Value {
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    serde_json::from_str(stdout.trim()).unwrap()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    buildplan_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized buildplan project"));

    assert!(dir.path().join("build.toml").is_file());
    assert!(dir.path().join("versions.toml").is_file());
    assert!(dir.path().join("src/main/java").is_dir());
    assert!(dir.path().join("src/test/java").is_dir());
    assert!(dir.path().join("src/functional-test/java").is_dir());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    buildplan_cmd().arg("init").arg(dir.path()).assert().success();
    buildplan_cmd().arg("init").arg(dir.path()).assert().success();
}

#[test]
fn test_commands_outside_project_fail() {
    let dir = TempDir::new().unwrap();

    buildplan_cmd()
        .current_dir(dir.path())
        .arg("tasks")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a buildplan project"));
}

// =============================================================================
// Task Listing Tests
// =============================================================================

#[test]
fn test_tasks_lists_standard_tasks() {
    let dir = setup_project();

    buildplan_cmd()
        .current_dir(dir.path())
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("compileJava"))
        .stdout(predicate::str::contains("compileFunctionalTestJava"))
        .stdout(predicate::str::contains("functionalTest"))
        .stdout(predicate::str::contains("Runs all checks."));
}

#[test]
fn test_tasks_json_includes_edges() {
    let dir = setup_project();

    let assert = buildplan_cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "tasks"])
        .assert()
        .success();

    let json = json_stdout(&assert);
    let tasks = json.as_array().unwrap();
    let check = tasks.iter().find(|t| t["name"] == "check").unwrap();
    assert_eq!(check["depends_on"], serde_json::json!(["test", "functionalTest"]));

    let functional = tasks.iter().find(|t| t["name"] == "functionalTest").unwrap();
    assert_eq!(functional["should_run_after"], serde_json::json!(["test"]));
    assert_eq!(functional["group"], "verification");
}

// =============================================================================
// Resolution Tests
// =============================================================================

#[test]
fn test_resolve_applies_managed_versions() {
    let dir = setup_project();

    buildplan_cmd()
        .current_dir(dir.path())
        .args(["resolve", "functionalTestImplementation"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "org.springframework.boot:spring-boot-starter-web:3.2.0",
        ))
        .stdout(predicate::str::contains(
            "org.springframework.boot:spring-boot-starter-test:3.2.0",
        ));
}

#[test]
fn test_resolve_unknown_configuration_fails() {
    let dir = setup_project();

    buildplan_cmd()
        .current_dir(dir.path())
        .args(["resolve", "nonsense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration not found: nonsense"));
}

#[test]
fn test_unresolved_version_fails_resolution() {
    let dir = setup_project();
    let path = dir.path().join("build.toml");
    let content = fs::read_to_string(&path)
        .unwrap()
        .replace("implementation = [", "implementation = [\n    \"io.rest-assured:rest-assured\",");
    fs::write(&path, content).unwrap();

    buildplan_cmd()
        .current_dir(dir.path())
        .args(["resolve", "implementation"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not resolve io.rest-assured:rest-assured"));
}

#[test]
fn test_classpath_order() {
    let dir = setup_project();

    let assert = buildplan_cmd()
        .current_dir(dir.path())
        .args(["classpath", "functionalTest"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "build/classes/java/main");
    assert_eq!(lines[1], "build/classes/java/test");
    assert!(lines.contains(&"org.springdoc:springdoc-openapi-starter-webmvc-ui:2.2.0"));
}

#[test]
fn test_runtime_classpath_json() {
    let dir = setup_project();

    let assert = buildplan_cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "classpath", "test", "--runtime"])
        .assert()
        .success();

    let json = json_stdout(&assert);
    let entries = json.as_array().unwrap();
    assert_eq!(entries[0]["kind"], "output");
    assert_eq!(entries[0]["source_set"], "test");
    assert_eq!(entries[1]["source_set"], "main");
}

#[test]
fn test_configuration_cycle_is_reported() {
    let dir = setup_project();
    append_build(
        &dir,
        r#"
[configurations]
implementation = ["testImplementation"]
"#,
    );

    buildplan_cmd()
        .current_dir(dir.path())
        .args(["resolve", "implementation"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycle"));
}

// =============================================================================
// Execution Tests
// =============================================================================

#[test]
fn test_check_dry_run_lists_plan() {
    let dir = setup_project();

    let assert = buildplan_cmd()
        .current_dir(dir.path())
        .args(["check", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("compileJava (compile)"))
        .stdout(predicate::str::contains("check (aggregate)"))
        .stdout(predicate::str::contains("BUILD SUCCESSFUL"));

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let test_pos = stdout.find("test (run-tests)").unwrap();
    let functional_pos = stdout.find("functionalTest (run-tests)").unwrap();
    assert!(test_pos < functional_pos);
}

#[cfg(unix)]
#[test]
fn test_check_runs_configured_commands() {
    let dir = setup_project();
    append_build(
        &dir,
        r#"
[tasks.test]
command = "touch unit.ran"

[tasks.functionalTest]
command = "echo $BUILDPLAN_JAVA_VERSION > functional.ran"
"#,
    );

    buildplan_cmd()
        .current_dir(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("BUILD SUCCESSFUL"));

    assert!(dir.path().join("unit.ran").is_file());
    let java = fs::read_to_string(dir.path().join("functional.ran")).unwrap();
    assert_eq!(java.trim(), "21");
}

#[cfg(unix)]
#[test]
fn test_failing_functional_tests_fail_check() {
    let dir = setup_project();
    append_build(
        &dir,
        r#"
[tasks.functionalTest]
command = "exit 1"
"#,
    );

    buildplan_cmd()
        .current_dir(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAILED"))
        .stderr(predicate::str::contains("task 'functionalTest' failed"));
}

#[cfg(unix)]
#[test]
fn test_failed_build_json_report() {
    let dir = setup_project();
    append_build(
        &dir,
        r#"
[tasks.test]
command = "exit 2"
"#,
    );

    let assert = buildplan_cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "check"])
        .assert()
        .failure();

    let json = json_stdout(&assert);
    assert_eq!(json["first_failure"], "test");
    let results = json["results"].as_array().unwrap();
    let check = results.iter().find(|r| r["task"] == "check").unwrap();
    assert_eq!(check["status"], "skipped");
}

#[test]
fn test_run_unknown_task_fails() {
    let dir = setup_project();

    buildplan_cmd()
        .current_dir(dir.path())
        .args(["run", "deploy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task not found: deploy"));
}

#[test]
fn test_dry_run_only_accepted_by_task_commands() {
    let dir = setup_project();

    buildplan_cmd()
        .current_dir(dir.path())
        .args(["resolve", "implementation", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--dry-run"));

    buildplan_cmd()
        .current_dir(dir.path())
        .args(["--dry-run", "check"])
        .assert()
        .failure();
}

#[cfg(unix)]
#[test]
fn test_run_dry_run_skips_commands() {
    let dir = setup_project();
    append_build(
        &dir,
        r#"
[tasks.test]
command = "touch unit.ran"
"#,
    );

    buildplan_cmd()
        .current_dir(dir.path())
        .args(["run", "test", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("test (run-tests)"));

    assert!(!dir.path().join("unit.ran").exists());
}

#[cfg(unix)]
#[test]
fn test_failure_output_shows_full_stderr() {
    let dir = setup_project();
    append_build(
        &dir,
        r#"
[tasks.test]
command = "echo 'AppTest > health() FAILED' >&2; echo '1 test failed' >&2; exit 1"
"#,
    );

    buildplan_cmd()
        .current_dir(dir.path())
        .arg("test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("AppTest > health() FAILED"))
        .stderr(predicate::str::contains("1 test failed"));
}

#[test]
fn test_compile_runs_every_compile_task() {
    let dir = setup_project();

    buildplan_cmd()
        .current_dir(dir.path())
        .args(["compile", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("compileTestJava"))
        .stdout(predicate::str::contains("compileFunctionalTestJava"))
        .stdout(predicate::str::contains("run-tests").not());
}

// =============================================================================
// Dependency Update Tests
// =============================================================================

#[test]
fn test_dependency_updates_filters_unstable_versions() {
    let dir = setup_project();
    fs::write(
        dir.path().join("versions.toml"),
        r#"
[modules]
"org.springdoc:springdoc-openapi-starter-webmvc-ui" = [
    "2.3.0",
    "2.4.0-RC1",
    { version = "2.5.0", channel = "release-candidate" },
]
"org.springframework.boot:spring-boot-starter-web" = ["3.2.5", "3.3.0-M1"]
"#,
    )
    .unwrap();

    buildplan_cmd()
        .current_dir(dir.path())
        .arg("dependency-updates")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "org.springdoc:springdoc-openapi-starter-webmvc-ui [2.2.0 -> 2.3.0]",
        ))
        .stdout(predicate::str::contains(
            "org.springframework.boot:spring-boot-starter-web [3.2.0 -> 3.2.5]",
        ))
        .stdout(predicate::str::contains("2.4.0-RC1").not());
}

#[test]
fn test_dependency_updates_json() {
    let dir = setup_project();
    fs::write(
        dir.path().join("versions.toml"),
        "[modules]\n\"org.springdoc:springdoc-openapi-starter-webmvc-ui\" = [\"2.3.0\", \"2.4.0-RC1\"]\n",
    )
    .unwrap();

    let assert = buildplan_cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "dependency-updates"])
        .assert()
        .success();

    let json = json_stdout(&assert);
    assert_eq!(json["candidates"].as_array().unwrap().len(), 1);
    assert_eq!(json["candidates"][0]["candidate"], "2.3.0");
    assert_eq!(json["rejected"][0]["version"], "2.4.0-RC1");
}

#[test]
fn test_dependency_updates_channel_override() {
    let dir = setup_project();
    let feed = dir.path().join("preview.toml");
    fs::write(
        &feed,
        "[modules]\n\"org.springdoc:springdoc-openapi-starter-webmvc-ui\" = [{ version = \"2.5.0\", channel = \"release-candidate\" }]\n",
    )
    .unwrap();

    buildplan_cmd()
        .current_dir(dir.path())
        .args(["dependency-updates", "--channel", "release-candidate", "--feed"])
        .arg(&feed)
        .assert()
        .success()
        .stdout(predicate::str::contains("[2.2.0 -> 2.5.0]"));
}

// =============================================================================
// Stability Tests
// =============================================================================

#[test]
fn test_stable_versions_succeed() {
    buildplan_cmd()
        .args(["stable", "2.1.0", "1.0.0.FINAL", "2.3.1-r"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"2\.1\.0\s+stable").unwrap());
}

#[test]
fn test_unstable_version_fails() {
    buildplan_cmd()
        .args(["stable", "2.1.0", "1.0-RC1"])
        .assert()
        .failure()
        .stdout(predicate::str::is_match(r"1\.0-RC1\s+unstable").unwrap())
        .stderr(predicate::str::contains("1 of 2 versions are unstable"));
}

#[test]
fn test_stable_json_output() {
    let assert = buildplan_cmd()
        .args(["--format", "json", "stable", "1.0-alpha-RELEASE"])
        .assert()
        .success();

    let json = json_stdout(&assert);
    assert_eq!(json[0]["version"], "1.0-alpha-RELEASE");
    assert_eq!(json[0]["stable"], true);
}
