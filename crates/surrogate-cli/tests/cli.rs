//! Integration tests for the `surrogate` binary.

use std::io::Write;
use std::process::{Command, Output};

fn surrogate(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_surrogate"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("SURROGATE_LOG")
        .output()
        .expect("failed to run surrogate")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ────────────────────────────────────────────────────────────────────────────
// demo
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_demo_runs_every_forward() {
    let output = surrogate(&["demo"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let text = stdout(&output);
    assert!(text.contains("Demo.TestModel -> Demo.TestModel$Proxy"));
    assert!(text.contains("Run0_2<int>(ref 21)"));
    assert!(text.contains("42 (ref now 42)"));
    assert!(text.contains("[7]"));
    assert!(text.contains("[8]"));
    assert!(text.contains("same instance"));
    assert!(text.contains("A:hello"));
    assert!(text.contains("B:hello"));
    assert!(text.contains("Run0<Demo.Program>"));
}

#[test]
fn test_demo_with_config_suffix() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[proxy]\nproxy_suffix = \"_Fwd\"").unwrap();

    let output = surrogate(&["demo", "--config", file.path().to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Demo.TestModel_Fwd"));
}

#[test]
fn test_invalid_config_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[proxy]\nproxy_suffix = \"\"").unwrap();

    let output = surrogate(&["demo", "--config", file.path().to_str().unwrap()]);
    assert!(!output.status.success());
}

// ────────────────────────────────────────────────────────────────────────────
// inspect
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_inspect_text() {
    let output = surrogate(&["inspect"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Demo.TestModel$Proxy"));
    assert!(text.contains("_object"));
    assert!(text.contains("implements Demo.IWriterA.write"));
    assert!(text.contains("ldfld 0"));
}

#[test]
fn test_inspect_json() {
    let output = surrogate(&["inspect", "--json"]);
    assert!(output.status.success());

    let layout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(layout["name"], "Demo.TestModel$Proxy");
    assert_eq!(layout["sealed"], true);
    assert_eq!(layout["fields"][0]["name"], "_object");
    let names: Vec<&str> = layout["methods"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["name"].as_str())
        .collect();
    assert!(names.contains(&"run_proxy"));
    assert!(!names.contains(&"Run0"));
}
