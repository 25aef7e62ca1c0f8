//! End-to-end tests for the ccpatch binary
//!
//! Every test points CCPATCH_HOME at a scratch directory so the real
//! configuration is never touched.

use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BUNDLE: &str = r#"function validate(name) {
  if (!name) return { valid: false, error: "Model name cannot be empty" };
  return { valid: true };
}
function warning() {
  return "Context low · Run /compact to compact & continue";
}
function remaining(pct) {
  return "Context left until auto-compact: " + pct + "%";
}
function hint(React, busy) {
  return busy ? [React.createElement(Text, null, "esc"), React.createElement(Text, null, "to interrupt")] : [];
}
"#;

const PATCHED: &str = r#"function validate(name) { return { valid: true }; }
function warning() {
  return "";
}
function remaining(pct) { return null; }
function hint(React, busy) {
  return [];
}
"#;

// ============================================================================
// Test Helpers
// ============================================================================

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("cli.js"), BUNDLE).unwrap();
        Self { dir }
    }

    fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    fn target(&self) -> PathBuf {
        self.dir.path().join("cli.js")
    }

    fn write_config(&self, content: &str) {
        fs::create_dir_all(self.home()).unwrap();
        fs::write(self.home().join("config.json"), content).unwrap();
    }

    fn backups(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.home().join("backup")) {
            Ok(entries) => entries.map(|entry| entry.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ccpatch");
        cmd.env("CCPATCH_HOME", self.home())
            .env("NO_COLOR", "1")
            .env_remove("CCPATCH_JSON")
            .env_remove("CCPATCH_LOG")
            .current_dir(self.dir.path());
        cmd
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// ============================================================================
// Applying patches
// ============================================================================

#[test]
fn test_apply_configured_patches() {
    let env = Env::new();
    env.write_config(
        r#"{"enabledPatches": ["validationPatch", "contextLowPatch", "escInterruptPatch"]}"#,
    );

    env.cmd()
        .arg("cli.js")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Using configured patches: validationPatch, contextLowPatch, escInterruptPatch",
        ))
        .stdout(predicate::str::contains("Successfully updated cli.js"));

    assert_eq!(read(&env.target()), PATCHED);
    let backups = env.backups();
    assert_eq!(backups.len(), 1);
    assert_eq!(read(&backups[0]), BUNDLE);
}

#[test]
fn test_cli_patches_override_configuration() {
    let env = Env::new();
    env.write_config(r#"{"enabledPatches": ["contextLowPatch"]}"#);

    env.cmd()
        .args(["-p", "validationPatch", "cli.js"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Using CLI-specified patches: validationPatch",
        ));

    let patched = read(&env.target());
    assert!(patched.starts_with("function validate(name) { return { valid: true }; }"));
    assert!(patched.contains("Context low"));
}

#[test]
fn test_default_path_from_configuration() {
    let env = Env::new();
    env.write_config(&format!(
        r#"{{"enabledPatches": ["contextLowPatch"], "cliPath": {}}}"#,
        serde_json::to_string(&env.target()).unwrap()
    ));

    env.cmd().assert().success();
    assert!(!read(&env.target()).contains("Context low"));
}

#[test]
fn test_second_run_changes_nothing() {
    let env = Env::new();
    fs::write(env.target(), PATCHED).unwrap();

    env.cmd()
        .args(["-p", "validationPatch,contextLowPatch,escInterruptPatch", "cli.js"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No patches were applied"));
    assert_eq!(read(&env.target()), PATCHED);
}

#[test]
fn test_dry_run_leaves_file_alone() {
    let env = Env::new();
    env.cmd()
        .args(["-p", "validationPatch", "--dry-run", "cli.js"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would be modified"));

    assert_eq!(read(&env.target()), BUNDLE);
    assert!(env.backups().is_empty());
}

#[test]
fn test_no_backup_flag() {
    let env = Env::new();
    env.cmd()
        .args(["-p", "escInterruptPatch", "--no-backup", "cli.js"])
        .assert()
        .success();

    assert_ne!(read(&env.target()), BUNDLE);
    assert!(env.backups().is_empty());
}

#[test]
fn test_json_report() {
    let env = Env::new();
    let output = env
        .cmd()
        .args(["-p", "contextLowPatch", "--json", "cli.js"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["modified"], true);
    assert_eq!(report["written"], true);
    assert_eq!(report["rules"][0]["rule"], "contextLowPatch");
    assert_eq!(report["rules"][0]["edits"], 2);
    assert!(report["backup"].is_string());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unknown_patch_name() {
    let env = Env::new();
    env.cmd()
        .args(["-p", "validationPatch,turboPatch", "cli.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("turboPatch"))
        .stderr(predicate::str::contains("available: validationPatch"));

    assert_eq!(read(&env.target()), BUNDLE);
    assert!(env.backups().is_empty());
}

#[test]
fn test_missing_file() {
    let env = Env::new();
    env.cmd()
        .args(["-p", "validationPatch", "missing.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_no_target() {
    let env = Env::new();
    env.write_config(r#"{"enabledPatches": ["validationPatch"]}"#);
    env.cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("ccpatch config"));
}

#[test]
fn test_unparseable_file() {
    let env = Env::new();
    fs::write(env.target(), ")))(((").unwrap();
    env.cmd()
        .args(["-p", "validationPatch", "cli.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cli.js"));
    assert_eq!(read(&env.target()), ")))(((");
}

#[test]
fn test_empty_selection_warns() {
    let env = Env::new();
    env.write_config(r#"{"enabledPatches": []}"#);
    env.cmd()
        .arg("cli.js")
        .assert()
        .success()
        .stdout(predicate::str::contains("No patches are enabled"));
    assert_eq!(read(&env.target()), BUNDLE);
}

#[test]
fn test_malformed_configuration() {
    let env = Env::new();
    env.write_config("{ nope");
    env.cmd()
        .arg("cli.js")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.json"));
}

// ============================================================================
// Interactive commands
// ============================================================================

#[test]
fn test_first_run_starts_wizard() {
    let env = Env::new();
    env.cmd()
        .arg("cli.js")
        .write_stdin("1,2\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("First run detected"))
        .stdout(predicate::str::contains("Setup complete"));

    let config = read(&env.home().join("config.json"));
    assert!(config.contains("validationPatch"));
    assert!(config.contains("contextLowPatch"));
    assert_eq!(read(&env.target()), BUNDLE);
}

#[test]
fn test_config_menu_saves_selection() {
    let env = Env::new();
    let script = format!("a\n2\n4\n{}\n0\n", env.target().display());
    env.cmd()
        .arg("config")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration saved"));

    let config: serde_json::Value =
        serde_json::from_str(&read(&env.home().join("config.json"))).unwrap();
    assert_eq!(
        config["enabledPatches"],
        serde_json::json!(["validationPatch", "escInterruptPatch"])
    );
    assert_eq!(config["cliPath"], env.target().display().to_string());
}

#[test]
fn test_restore_round_trip() {
    let env = Env::new();
    env.cmd()
        .args(["-p", "validationPatch", "cli.js"])
        .assert()
        .success();
    assert_ne!(read(&env.target()), BUNDLE);

    env.cmd()
        .args(["restore", "cli.js"])
        .write_stdin("1\nyes\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("File restored"));
    assert_eq!(read(&env.target()), BUNDLE);
}

#[test]
fn test_restore_declined() {
    let env = Env::new();
    env.cmd()
        .args(["-p", "validationPatch", "cli.js"])
        .assert()
        .success();
    let patched = read(&env.target());

    env.cmd()
        .args(["restore", "cli.js"])
        .write_stdin("1\nno\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Restore cancelled"));
    assert_eq!(read(&env.target()), patched);
}

#[test]
fn test_restore_without_backups() {
    let env = Env::new();
    env.cmd()
        .args(["restore", "cli.js"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found"));
}

// ============================================================================
// Informational commands
// ============================================================================

#[test]
fn test_list() {
    let env = Env::new();
    env.write_config(r#"{"enabledPatches": ["escInterruptPatch"]}"#);
    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("validationPatch"))
        .stdout(predicate::str::contains("Remove the context-low warning"))
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn test_version() {
    let env = Env::new();
    env.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_completions() {
    let env = Env::new();
    env.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ccpatch"));
}
