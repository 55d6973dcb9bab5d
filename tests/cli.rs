//! End-to-end checks of the `globalize-tasks` binary

mod fixtures;

use fixtures::Project;
use std::process::{Command, Output};

fn globalize(project: &Project, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_globalize-tasks"))
        .current_dir(project.root())
        .args(args)
        .output()
        .expect("run globalize-tasks")
}

#[test]
fn test_run_then_check_is_clean() {
    let project = Project::standard();

    let output = globalize(&project, &["run"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let output = globalize(&project, &["run", "--check"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_check_reports_stale_exit_code() {
    let project = Project::standard();

    let output = globalize(&project, &["extract", "--check", "--json"]);
    assert_eq!(output.status.code(), Some(5));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["mode"], "check");
    assert_eq!(report["files"].as_array().unwrap().len(), 6);
    assert!(!project.exists("translations"));
}

#[test]
fn test_merge_prints_canonical_tree() {
    let project = Project::new("");
    project.write("seed.json", r#"{"pt": {"greeting": "hello", "farewell": "bye"}}"#);
    project.write("pt.json", r#"{"pt": {"greeting": "oi"}}"#);

    let output = globalize(&project, &["merge", "seed.json", "pt.json", "absent.json"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "{\n  \"pt\": {\n    \"farewell\": \"bye\",\n    \"greeting\": \"oi\"\n  }\n}\n"
    );
}

#[test]
fn test_verify_rejects_invalid_options() {
    let project = Project::new("default_locale = \"en\"\nlocales = [\"en\"]\n");

    let output = globalize(&project, &["verify"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("modules"));
}

#[test]
fn test_default_options_file_resolves_globs() {
    // no -c: globalize.toml is found in the working directory
    let project = Project::standard();

    let output = globalize(&project, &["extract"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        project.read_json("translations/app/en.json"),
        serde_json::json!({"en": {
            "farewell": "Bye",
            "greeting": "Hello",
            "nav": {"about": "About", "home": "Home"}
        }})
    );
    assert!(project.exists("translations/admin/zh.json"));
}

#[test]
fn test_explicit_relative_options_path() {
    let project = Project::standard();

    let output = globalize(&project, &["-c", "globalize.toml", "run", "--check"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stdout).contains("stale"));
}

#[test]
fn test_verify_lists_option_sources() {
    let project = Project::standard();

    let output = globalize(&project, &["verify"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let digest = hex::encode(<sha2::Sha256 as sha2::Digest>::digest(
        project.read("globalize.toml").as_bytes(),
    ));
    assert!(stdout.contains("builtin"));
    assert!(stdout.contains(&format!("globalize.toml (sha256 {})", digest)));
}
