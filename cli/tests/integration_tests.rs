use std::fs;
use std::path::PathBuf;
use std::process::Output;

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "params_cli_test_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Small catalog with one abstract parent and two concrete commands.
fn write_catalog(dir: &TempDir) -> PathBuf {
    let yaml = r#"version: "1.0"
commands:
  - name: image
    abstract: true
  - name: image:convert
    parent: image
    description: Convert an image
    arguments:
      - { name: color, type: integer, description: Fill color }
      - { name: shape, default: circle }
    options:
      - { name: verbose, type: boolean, aliases: [v] }
      - { name: quality, type: integer, default: 90 }
  - name: copy
    arguments:
      - { name: sources, variadic: true, required: true }
      - { name: target, required: true }
"#;
    let path = dir.join("catalog.yaml");
    fs::write(&path, yaml).expect("failed to write catalog");
    path
}

fn run(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_params-resolve"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run params-resolve")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

// ---------------------------------------------------------------------------
// check / describe
// ---------------------------------------------------------------------------

#[test]
fn check_reports_command_counts() {
    let dir = TempDir::new("check");
    let catalog = write_catalog(&dir);

    let out = run(&["check", "--catalog", catalog.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("3 command type(s) (1 abstract)"), "{stdout}");
}

#[test]
fn check_rejects_unknown_parent() {
    let dir = TempDir::new("check_parent");
    let path = dir.join("bad.yaml");
    fs::write(
        &path,
        "version: \"1.0\"\ncommands:\n  - { name: child, parent: missing }\n",
    )
    .unwrap();

    let out = run(&["check", "--catalog", path.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("command child: unknown parent missing"), "{stderr}");
}

#[test]
fn describe_prints_usage() {
    let dir = TempDir::new("describe");
    let catalog = write_catalog(&dir);

    let out = run(&[
        "describe",
        "--catalog",
        catalog.to_str().unwrap(),
        "--command",
        "image:convert",
    ]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("Usage: image:convert [OPTIONS] [COLOR] [SHAPE]\n"));
    assert!(stdout.contains("Fill color"));
    assert!(stdout.contains("-v, --verbose"));
}

#[test]
fn describe_unknown_command_fails() {
    let dir = TempDir::new("describe_unknown");
    let catalog = write_catalog(&dir);

    let out = run(&[
        "describe",
        "--catalog",
        catalog.to_str().unwrap(),
        "--command",
        "image:crop",
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Unknown command 'image:crop'"), "{stderr}");
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

#[test]
fn resolve_applies_defaults_and_aliases() {
    let dir = TempDir::new("resolve");
    let catalog = write_catalog(&dir);

    let out = run(&[
        "resolve",
        "--catalog",
        catalog.to_str().unwrap(),
        "--command",
        "image:convert",
        "--args",
        "[255]",
        "--options",
        r#"{"v": true}"#,
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let json = stdout_json(&out);
    assert_eq!(json["arguments"]["color"], 255);
    assert_eq!(json["arguments"]["shape"], "circle");
    assert_eq!(json["options"]["verbose"], true);
    assert_eq!(json["options"]["quality"], 90);
}

#[test]
fn resolve_trailing_values_fill_variadic() {
    let dir = TempDir::new("resolve_variadic");
    let catalog = write_catalog(&dir);

    let out = run(&[
        "resolve",
        "--catalog",
        catalog.to_str().unwrap(),
        "--command",
        "copy",
        "--",
        "a.txt",
        "b.txt",
        "dest",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let json = stdout_json(&out);
    assert_eq!(json["arguments"]["sources"], serde_json::json!(["a.txt", "b.txt"]));
    assert_eq!(json["arguments"]["target"], "dest");
}

#[test]
fn resolve_yaml_output() {
    let dir = TempDir::new("resolve_yaml");
    let catalog = write_catalog(&dir);

    let out = run(&[
        "resolve",
        "--catalog",
        catalog.to_str().unwrap(),
        "--command",
        "image:convert",
        "--format",
        "yaml",
    ]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("shape: circle"), "{stdout}");
    assert!(stdout.contains("quality: 90"), "{stdout}");
}

#[test]
fn resolve_reports_type_mismatch() {
    let dir = TempDir::new("resolve_mismatch");
    let catalog = write_catalog(&dir);

    let out = run(&[
        "resolve",
        "--catalog",
        catalog.to_str().unwrap(),
        "--command",
        "image:convert",
        "--args",
        r#"["red"]"#,
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains(
            "invalid argument color: expected an instance of Integer, received \"red\""
        ),
        "{stderr}"
    );
}

#[test]
fn resolve_rejects_args_and_trailing_values_together() {
    let dir = TempDir::new("resolve_both");
    let catalog = write_catalog(&dir);

    let out = run(&[
        "resolve",
        "--catalog",
        catalog.to_str().unwrap(),
        "--command",
        "copy",
        "--args",
        r#"["a", "b"]"#,
        "--",
        "c",
    ]);
    assert!(!out.status.success());
}

// ---------------------------------------------------------------------------
// batch
// ---------------------------------------------------------------------------

#[test]
fn batch_resolves_every_entry_in_order() {
    let dir = TempDir::new("batch");
    let catalog = write_catalog(&dir);
    let input = dir.join("batch.json");
    let entries = serde_json::json!([
        { "command": "image:convert", "arguments": [1] },
        { "command": "copy", "arguments": ["x", "y"] },
        { "command": "image:convert", "options": { "quality": 50 } }
    ]);
    fs::write(&input, serde_json::to_string(&entries).unwrap()).unwrap();

    let out = run(&[
        "batch",
        "--catalog",
        catalog.to_str().unwrap(),
        "--input",
        input.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let json = stdout_json(&out);
    let results = json.as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["params"]["arguments"]["color"], 1);
    assert_eq!(results[1]["params"]["arguments"]["sources"], serde_json::json!(["x"]));
    assert_eq!(results[1]["params"]["arguments"]["target"], "y");
    assert_eq!(results[2]["params"]["options"]["quality"], 50);
}

#[test]
fn batch_failures_exit_nonzero() {
    let dir = TempDir::new("batch_fail");
    let catalog = write_catalog(&dir);
    let input = dir.join("batch.json");
    let entries = serde_json::json!([
        { "command": "copy", "arguments": [] },
        { "command": "image:convert" }
    ]);
    fs::write(&input, serde_json::to_string(&entries).unwrap()).unwrap();

    let out = run(&[
        "batch",
        "--catalog",
        catalog.to_str().unwrap(),
        "--input",
        input.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    let json = stdout_json(&out);
    assert!(json[0]["error"].as_str().is_some());
    assert!(json[1]["params"].is_object());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("1 of 2 invocation(s) failed"), "{stderr}");
}
