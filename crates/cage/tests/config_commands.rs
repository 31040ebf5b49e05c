//! Integration tests for the `cage config` subcommands against real files.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct Workspace {
    home: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let home = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(home.path().join(".config/cage")).unwrap();
        fs::create_dir_all(home.path().join("work/site/.cage")).unwrap();
        Self { home }
    }

    fn global_file(&self) -> PathBuf {
        self.home.path().join(".config/cage/config.json")
    }

    fn repo_file(&self) -> PathBuf {
        self.home.path().join("work/site/.cage/config.json")
    }

    fn write_global(&self, content: &str) {
        fs::write(self.global_file(), content).expect("Failed to write global config");
    }

    fn write_repo(&self, content: &str) {
        fs::write(self.repo_file(), content).expect("Failed to write repo config");
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_cage"))
            .args(args)
            .arg("--config-dir")
            .arg(self.home.path().join(".config/cage"))
            .arg("--repo-root")
            .arg(self.home.path().join("work/site"))
            .env("HOME", self.home.path())
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("CAGE_CONFIG_DIR")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute cage")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "cage {:?} failed with exit code {:?}. stderr: {}",
            args,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

#[test]
fn test_show_without_files_is_all_default() {
    let workspace = Workspace::new();
    let stdout = workspace.run_ok(&["config", "show"]);

    assert!(stdout.contains(r#""backend": "docker", // default"#));
    assert!(stdout.contains(r#""tool": null, // default"#));
    assert!(stdout.contains(r#""repos": {}"#));
}

#[test]
fn test_show_annotates_each_value_with_its_origin() {
    let workspace = Workspace::new();
    workspace.write_global(
        r#"{
  // shared defaults
  "backend": "ssh",
  "mounts_ro": ["/a", "/b"]
}"#,
    );
    workspace.write_repo(r#"{ "mounts_ro": ["/b", "/c"] }"#);

    let stdout = workspace.run_ok(&["config", "show"]);

    assert!(stdout.contains(r#""backend": "ssh", // ~/.config/cage/config.json"#));
    assert!(stdout.contains(r#""/b", // ~/.config/cage/config.json"#));
    assert!(stdout.contains(r#""/c" // ~/work/site/.cage/config.json"#));
}

#[test]
fn test_show_json_contains_config_and_provenance() {
    let workspace = Workspace::new();
    workspace.write_global(r#"{ "tool": "claude", "env": ["TERM"] }"#);

    let stdout = workspace.run_ok(&["config", "show", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let global = workspace.global_file().display().to_string();

    assert_eq!(value["config"]["tool"], "claude");
    assert_eq!(value["config"]["env"][0], "TERM");
    assert_eq!(value["provenance"]["tool"], global.as_str());
    assert_eq!(value["provenance"]["backend"], "default");
    assert_eq!(value["provenance"]["env"][0]["value"], "TERM");
    assert_eq!(value["provenance"]["env"][0]["origin"], global.as_str());
}

#[test]
fn test_malformed_file_fails_with_empty_stdout() {
    let workspace = Workspace::new();
    workspace.write_global("{\n  \"backend\": \"ssh\",\n}\n");

    let output = workspace.run(&["config", "show"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Error: Failed to parse config file"),
        "stderr: {}",
        stderr
    );
    assert!(stderr.contains("at line 3"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_backend_fails() {
    let workspace = Workspace::new();
    workspace.write_repo(r#"{ "backend": "podman" }"#);

    let output = workspace.run(&["config", "show", "--json"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid backend 'podman'"), "stderr: {}", stderr);
}

#[test]
fn test_paths_lists_every_layer() {
    let workspace = Workspace::new();
    workspace.write_global("{}");

    let stdout = workspace.run_ok(&["config", "paths"]);
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "default  builtin  -");
    assert!(lines[1].starts_with("global   present  "));
    assert!(lines[1].ends_with("config.json"));
    assert!(lines[2].starts_with("repo     missing  "));
}

#[test]
fn test_paths_does_not_parse_files() {
    let workspace = Workspace::new();
    workspace.write_repo("not json");

    let stdout = workspace.run_ok(&["config", "paths", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(value[2]["kind"], "repo");
    assert_eq!(value[2]["status"], "present");
}

#[test]
fn test_defaults_ignore_broken_files() {
    let workspace = Workspace::new();
    workspace.write_global("{ broken");

    let stdout = workspace.run_ok(&["config", "defaults"]);
    assert!(stdout.starts_with("{\n  \"backend\": \"docker\", // default\n"));
}

#[test]
fn test_effective_uses_repo_root_name_for_overlay() {
    let workspace = Workspace::new();
    workspace.write_global(
        r#"{
  "tool": "claude",
  "env": ["TERM"],
  "tools": { "codex": { "env": ["OPENAI_API_KEY"] } }
}"#,
    );
    workspace.write_repo(r#"{ "repos": { "site": { "tool": "codex", "mounts_rw": ["/data"] } } }"#);

    let stdout = workspace.run_ok(&["config", "effective", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(value["tool"], "codex");
    assert_eq!(value["repo"], "site");
    assert_eq!(value["env"], serde_json::json!(["TERM", "OPENAI_API_KEY"]));
    assert_eq!(value["mount_paths"], serde_json::json!(["/data"]));
}

#[test]
fn test_effective_tool_flag_overrides_repo_tool() {
    let workspace = Workspace::new();
    workspace.write_repo(r#"{ "repos": { "site": { "tool": "codex" } } }"#);

    let stdout = workspace.run_ok(&["config", "effective", "--tool", "aider"]);
    assert!(stdout.starts_with("tool:    aider\nrepo:    site\n"));
}

#[test]
fn test_effective_without_tool_fails() {
    let workspace = Workspace::new();

    let output = workspace.run(&["config", "effective", "--repo", "other"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No tool selected for repository 'other'"));
}
