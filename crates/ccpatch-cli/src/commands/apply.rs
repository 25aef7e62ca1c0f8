//! Apply command - patch a bundled file in place

use crate::backup::BackupStore;
use crate::commands::configure::{self, MenuExit};
use anyhow::{bail, Context, Result};
use ccpatch_config::{ConfigStore, PatchConfig};
use ccpatch_core::{Patcher, RuleName, RuleReport};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

/// Apply command arguments
#[derive(Debug, Default)]
pub struct ApplyArgs {
    /// File to patch; falls back to the configured default path
    pub file: Option<PathBuf>,
    /// Patches named on the command line; overrides the configured selection
    pub patches: Vec<String>,
    /// Copy the file into the backup directory before writing
    pub backup: bool,
    /// Report what would change without writing
    pub dry_run: bool,
    /// Print a JSON report instead of text
    pub json: bool,
    pub verbosity: Verbosity,
}

/// Machine-readable summary of one run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplyReport {
    file: PathBuf,
    modified: bool,
    written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    backup: Option<PathBuf>,
    rules: Vec<RuleReport>,
}

/// Where the patch selection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    CommandLine,
    Configured,
}

/// Run the apply command
pub fn run(args: ApplyArgs, store: &ConfigStore) -> Result<()> {
    let loaded = store.load().with_context(|| {
        format!(
            "Failed to load configuration from {}",
            store.config_path().display()
        )
    })?;

    // Unknown names on the command line fail before anything else happens
    let cli_patcher = if args.patches.is_empty() {
        None
    } else {
        Some(Patcher::from_names(&args.patches)?)
    };

    if loaded.is_new && cli_patcher.is_none() {
        println!("{}", "First run detected, starting the configuration wizard...".cyan());
        if configure::run(store)? == MenuExit::Saved {
            println!(
                "\n{}",
                "Setup complete. Run 'ccpatch <file>' to apply patches.".green()
            );
        }
        return Ok(());
    }

    let (patcher, selection) = match cli_patcher {
        Some(patcher) => (patcher, Selection::CommandLine),
        None => (configured_patcher(&loaded.config)?, Selection::Configured),
    };

    let rules = patcher.rule_names();
    if rules.is_empty() {
        println!(
            "{}",
            "⚠ No patches are enabled. Run 'ccpatch config' or name patches with -p.".yellow()
        );
        return Ok(());
    }

    let Some(target) = args
        .file
        .clone()
        .or_else(|| loaded.config.cli_path.as_ref().map(PathBuf::from))
    else {
        bail!(
            "No file to patch. Pass a path (ccpatch <file>, ccpatch -p <patch> <file>) \
             or set a default path with 'ccpatch config'"
        );
    };
    let target = std::path::absolute(&target)
        .with_context(|| format!("Failed to resolve {}", target.display()))?;

    if !target.is_file() {
        bail!("File not found at {}", target.display());
    }

    let quiet = args.json || args.verbosity == Verbosity::Quiet;
    let names = rules.iter().map(RuleName::as_str).collect::<Vec<_>>().join(", ");
    if !quiet {
        match selection {
            Selection::CommandLine => println!("Using CLI-specified patches: {}", names.cyan()),
            Selection::Configured => println!("Using configured patches: {}", names.cyan()),
        }
    }

    let backup = if args.backup && !args.dry_run {
        let backups = BackupStore::new(store.backup_dir());
        let path = backups.create(&target)?;
        if !quiet {
            println!("{} {}", "Backup created:".dimmed(), path.display());
        }
        Some(path)
    } else {
        None
    };

    if args.verbosity == Verbosity::Verbose && !args.json {
        println!("{} {}", "Reading file:".dimmed(), target.display());
    }
    let source = fs::read_to_string(&target)
        .with_context(|| format!("Failed to read file: {}", target.display()))?;

    let outcome = patcher
        .run(&source)
        .with_context(|| format!("Failed to patch {}", target.display()))?;

    let written = outcome.was_modified && !args.dry_run;
    if written {
        write_atomically(&target, &outcome.output)?;
    }

    if args.json {
        let report = ApplyReport {
            file: target,
            modified: outcome.was_modified,
            written,
            backup,
            rules: outcome.report,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !quiet {
        for entry in &outcome.report {
            print_rule(entry, args.verbosity);
        }
    }

    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| target.display().to_string());
    if !outcome.was_modified {
        if !quiet {
            println!("No patches were applied (no modifications needed).");
        }
    } else if args.dry_run {
        if !quiet {
            println!(
                "{}",
                format!("Dry run: {file_name} would be modified; nothing written").yellow()
            );
        }
    } else if !quiet {
        println!("{}", format!("✓ Successfully updated {file_name}!").green());
    }

    Ok(())
}

/// Patcher for the stored selection; names this build does not know are skipped
fn configured_patcher(config: &PatchConfig) -> Result<Patcher> {
    let known: Vec<&str> = RuleName::ALL.iter().map(RuleName::as_str).collect();
    let unknown = config.unknown_patches(&known);
    for name in &unknown {
        tracing::warn!(patch = %name, "ignoring unknown patch in configuration");
    }
    let valid: Vec<&str> = config
        .enabled_patches
        .iter()
        .map(String::as_str)
        .filter(|name| !unknown.contains(name))
        .collect();
    Ok(Patcher::from_names(&valid)?)
}

fn print_rule(entry: &RuleReport, verbosity: Verbosity) {
    if entry.modified {
        let detail = if verbosity == Verbosity::Verbose {
            format!(" ({} edit{})", entry.edits, if entry.edits == 1 { "" } else { "s" })
        } else {
            String::new()
        };
        println!("  {} {}{}", "✓".green(), entry.rule, detail.dimmed());
    } else {
        println!("  {} {} {}", "-".dimmed(), entry.rule, "(target not found)".dimmed());
    }
}

/// Replace `target` with `content` via a sibling file and a rename
///
/// The original permissions are carried over.
fn write_atomically(target: &Path, content: &str) -> Result<()> {
    let file_name = target
        .file_name()
        .with_context(|| format!("{} has no file name", target.display()))?;
    let temp = target.with_file_name(format!(".{}.ccpatch-tmp", file_name.to_string_lossy()));

    let permissions = fs::metadata(target)
        .with_context(|| format!("Failed to read metadata of {}", target.display()))?
        .permissions();

    fs::write(&temp, content)
        .with_context(|| format!("Failed to write temporary file {}", temp.display()))?;
    let replaced = fs::set_permissions(&temp, permissions).and_then(|()| fs::rename(&temp, target));
    if let Err(e) = replaced {
        let _ = fs::remove_file(&temp);
        return Err(e).with_context(|| format!("Failed to replace {}", target.display()));
    }
    tracing::debug!(file = %target.display(), bytes = content.len(), "wrote patched file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const BUNDLE: &str = r#"function validateModel(m) {
  if (!m) return "Model name cannot be empty";
  return { valid: !!m };
}
var hint = ["esc", x.createElement("span", null, "to interrupt")];
"#;

    fn setup(enabled: &[&str]) -> (TempDir, ConfigStore, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("home"));
        store
            .save(&PatchConfig {
                enabled_patches: enabled.iter().map(|name| name.to_string()).collect(),
                cli_path: None,
            })
            .unwrap();
        let file = temp_dir.path().join("cli.js");
        fs::write(&file, BUNDLE).unwrap();
        (temp_dir, store, file)
    }

    fn args(file: &Path) -> ApplyArgs {
        ApplyArgs {
            file: Some(file.to_path_buf()),
            backup: true,
            verbosity: Verbosity::Quiet,
            ..Default::default()
        }
    }

    #[test]
    fn test_applies_configured_patches_and_backs_up() {
        let (_temp_dir, store, file) = setup(&["validationPatch"]);
        run(args(&file), &store).unwrap();

        let patched = fs::read_to_string(&file).unwrap();
        assert!(patched.starts_with("function validateModel(m) { return { valid: true }; }\n"));
        let backups = BackupStore::new(store.backup_dir()).list(&file).unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0].path).unwrap(), BUNDLE);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (_temp_dir, store, file) = setup(&["validationPatch"]);
        let request = ApplyArgs {
            dry_run: true,
            ..args(&file)
        };
        run(request, &store).unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), BUNDLE);
        assert!(!store.backup_dir().exists());
    }

    #[test]
    fn test_unknown_cli_patch_fails_before_touching_file() {
        let (_temp_dir, store, file) = setup(&[]);
        let request = ApplyArgs {
            patches: vec!["bogusPatch".into()],
            ..args(&file)
        };
        let err = run(request, &store).unwrap_err();

        assert!(err.to_string().contains("bogusPatch"));
        assert!(!store.backup_dir().exists());
    }

    #[test]
    fn test_missing_file() {
        let (temp_dir, store, _) = setup(&["validationPatch"]);
        let err = run(args(&temp_dir.path().join("nope.js")), &store).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_no_target_anywhere() {
        let (_temp_dir, store, _) = setup(&["validationPatch"]);
        let err = run(ApplyArgs::default(), &store).unwrap_err();
        assert!(err.to_string().contains("ccpatch config"));
    }

    #[test]
    fn test_configured_unknown_names_are_skipped() {
        let config = PatchConfig {
            enabled_patches: vec!["retiredPatch".into(), "contextLowPatch".into()],
            cli_path: None,
        };
        let patcher = configured_patcher(&config).unwrap();
        assert_eq!(patcher.rule_names(), vec![RuleName::ContextLowRemoval]);
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("cli.js");
        fs::write(&file, "old").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o755)).unwrap();

        write_atomically(&file, "new").unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "new");
        let mode = fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }
}
