//! Restore command - put a backup back in place

use crate::backup::{format_size, format_timestamp, BackupEntry, BackupStore};
use crate::prompt::Prompt;
use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// How the restore session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    NoBackups,
    Cancelled,
    InvalidChoice,
}

/// Interactively restore `target` on the terminal
pub fn run(backups: &BackupStore, target: &Path) -> Result<RestoreOutcome> {
    let stdin = io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), io::stdout());
    run_with(backups, target, &mut prompt)
}

pub fn run_with<R: BufRead, W: Write>(
    backups: &BackupStore,
    target: &Path,
    prompt: &mut Prompt<R, W>,
) -> Result<RestoreOutcome> {
    let out = prompt.out();
    writeln!(out, "\n{}", "━".repeat(60).cyan())?;
    writeln!(out, "{}", "  ccpatch backup restore".bold().cyan())?;
    writeln!(out, "{}", "━".repeat(60).cyan())?;
    writeln!(
        out,
        "\n{}",
        format!(
            "Looking for backups of {} in {}",
            target.display(),
            backups.dir().display()
        )
        .dimmed()
    )?;

    let entries = backups.list(target)?;
    if entries.is_empty() {
        writeln!(out, "\n{}", "⚠ No backups found".yellow())?;
        writeln!(
            out,
            "{}",
            "Backups are created automatically when 'ccpatch <file>' applies patches".dimmed()
        )?;
        return Ok(RestoreOutcome::NoBackups);
    }

    writeln!(out, "\n{}", format!("✓ Found {} backup(s)", entries.len()).green())?;
    render_backups(out, &entries)?;

    let choice = prompt
        .ask(&"Choose a backup to restore (number): ".cyan().to_string())?
        .unwrap_or_default();
    if choice == "0" || choice.eq_ignore_ascii_case("q") || choice.is_empty() {
        writeln!(prompt.out(), "\n{}", "Restore cancelled".yellow())?;
        return Ok(RestoreOutcome::Cancelled);
    }

    let Some(selected) = choice
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| entries.get(index))
    else {
        writeln!(prompt.out(), "\n{}", format!("✗ Invalid choice: {choice}").red())?;
        return Ok(RestoreOutcome::InvalidChoice);
    };

    let out = prompt.out();
    writeln!(out, "\n{}", "⚠ Confirm restore:".yellow())?;
    writeln!(out, "   Backup time: {}", format_timestamp(selected.modified))?;
    writeln!(out, "   Target file: {}", target.display())?;
    writeln!(out, "{}", "   Warning: the current file contents will be overwritten!".red())?;

    let question = "Restore this backup? (type 'yes' to confirm): ".cyan().to_string();
    if !prompt.confirm(&question, "yes")? {
        writeln!(prompt.out(), "\n{}", "Restore cancelled".yellow())?;
        return Ok(RestoreOutcome::Cancelled);
    }

    backups.restore(selected, target)?;
    tracing::info!(
        backup = %selected.path.display(),
        target = %target.display(),
        "restored backup"
    );
    writeln!(prompt.out(), "\n{}", "✓ File restored".green())?;
    Ok(RestoreOutcome::Restored)
}

fn render_backups<W: Write>(out: &mut W, entries: &[BackupEntry]) -> io::Result<()> {
    writeln!(out, "\n{}", "Available backups:".bold())?;
    writeln!(out, "{}", "─".repeat(60).dimmed())?;
    for (index, entry) in entries.iter().enumerate() {
        writeln!(
            out,
            "  {} {}",
            format!("{}.", index + 1).cyan(),
            format_timestamp(entry.modified)
        )?;
        writeln!(out, "     {}", format!("File: {}", entry.name).dimmed())?;
        writeln!(out, "     {}", format!("Size: {}", format_size(entry.size)).dimmed())?;
    }
    writeln!(out, "{}", "─".repeat(60).dimmed())?;
    writeln!(out, "  {}  - cancel\n", "0".cyan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup(with_backup: bool) -> (TempDir, BackupStore, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let backups = BackupStore::new(temp_dir.path().join("backup"));
        let target = temp_dir.path().join("cli.js");
        fs::write(&target, "original();").unwrap();
        if with_backup {
            backups.create(&target).unwrap();
        }
        fs::write(&target, "patched();").unwrap();
        (temp_dir, backups, target)
    }

    fn run_script(backups: &BackupStore, target: &Path, script: &str) -> (RestoreOutcome, String) {
        let mut prompt = Prompt::new(Cursor::new(script.to_string()), Vec::new());
        let outcome = run_with(backups, target, &mut prompt).unwrap();
        (outcome, String::from_utf8(prompt.into_output()).unwrap())
    }

    #[test]
    fn test_restore_after_confirmation() {
        let (_temp_dir, backups, target) = setup(true);
        let (outcome, output) = run_script(&backups, &target, "1\nYES\n");

        assert_eq!(outcome, RestoreOutcome::Restored);
        assert!(output.contains("Found 1 backup(s)"));
        assert!(output.contains("File: cli.js.backup."));
        assert_eq!(fs::read_to_string(&target).unwrap(), "original();");
    }

    #[rstest]
    #[case("0\n")]
    #[case("q\n")]
    #[case("")]
    #[case("1\ny\n")]
    fn test_cancel_keeps_file(#[case] script: &str) {
        let (_temp_dir, backups, target) = setup(true);
        let (outcome, _) = run_script(&backups, &target, script);
        assert_eq!(outcome, RestoreOutcome::Cancelled);
        assert_eq!(fs::read_to_string(&target).unwrap(), "patched();");
    }

    #[rstest]
    #[case("2\n")]
    #[case("abc\n")]
    fn test_invalid_choice(#[case] script: &str) {
        let (_temp_dir, backups, target) = setup(true);
        let (outcome, output) = run_script(&backups, &target, script);
        assert_eq!(outcome, RestoreOutcome::InvalidChoice);
        assert!(output.contains("Invalid choice"));
        assert_eq!(fs::read_to_string(&target).unwrap(), "patched();");
    }

    #[test]
    fn test_no_backups() {
        let (_temp_dir, backups, target) = setup(false);
        let (outcome, output) = run_script(&backups, &target, "");
        assert_eq!(outcome, RestoreOutcome::NoBackups);
        assert!(output.contains("No backups found"));
    }
}
