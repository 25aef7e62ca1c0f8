//! Interactive patch configuration menu (`ccpatch config`)

use crate::prompt::Prompt;
use anyhow::{Context, Result};
use ccpatch_config::{ConfigStore, PatchConfig};
use ccpatch_core::RuleName;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// How the menu was left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuExit {
    Saved,
    Discarded,
}

/// One parsed menu input
#[derive(Debug, Clone, PartialEq, Eq)]
enum Choice {
    Save,
    Quit,
    EnableAll,
    DisableAll,
    Invert,
    /// Comma-separated entries, each a menu number or the raw invalid token
    Entries(Vec<Result<usize, String>>),
}

fn parse_choice(input: &str) -> Choice {
    match input.trim().to_ascii_lowercase().as_str() {
        "0" => Choice::Save,
        "q" => Choice::Quit,
        "a" => Choice::EnableAll,
        "n" => Choice::DisableAll,
        "r" => Choice::Invert,
        other => Choice::Entries(
            other
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(|token| token.parse::<usize>().map_err(|_| token.to_string()))
                .collect(),
        ),
    }
}

/// Run the menu on the terminal
pub fn run(store: &ConfigStore) -> Result<MenuExit> {
    let stdin = io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), io::stdout());
    run_with(store, &mut prompt)
}

/// Run the menu against any input and output
pub fn run_with<R: BufRead, W: Write>(
    store: &ConfigStore,
    prompt: &mut Prompt<R, W>,
) -> Result<MenuExit> {
    let loaded = store.load().with_context(|| {
        format!(
            "Failed to load configuration from {}",
            store.config_path().display()
        )
    })?;
    let original = loaded.config.clone();
    let mut config = loaded.config;
    let names: Vec<&str> = RuleName::ALL.iter().map(RuleName::as_str).collect();
    let path_entry = names.len() + 1;

    render_header(prompt.out())?;
    loop {
        render_summary(prompt.out(), &config, names.len())?;
        render_patches(prompt.out(), &config)?;
        render_shortcuts(prompt.out())?;

        let question = format!("\n{}", "Choose an option (number/shortcut): ".cyan());
        let Some(input) = prompt.ask(&question)? else {
            writeln!(
                prompt.out(),
                "{}",
                "Input closed; configuration not saved".yellow()
            )?;
            return Ok(MenuExit::Discarded);
        };

        match parse_choice(&input) {
            Choice::Save => {
                store.save(&config).with_context(|| {
                    format!(
                        "Failed to save configuration to {}",
                        store.config_path().display()
                    )
                })?;
                writeln!(
                    prompt.out(),
                    "\n{}",
                    format!("✓ Configuration saved to {}", store.config_path().display()).green()
                )?;
                writeln!(prompt.out(), "{}", "Run 'ccpatch <file>' to apply patches".dimmed())?;
                return Ok(MenuExit::Saved);
            }
            Choice::Quit => {
                if config.differs_from(&original)
                    && !prompt.confirm(
                        &format!("\n{}", "Discard unsaved changes? (y/n): ".yellow()),
                        "y",
                    )?
                {
                    writeln!(prompt.out(), "{}", "Exit cancelled".dimmed())?;
                    continue;
                }
                writeln!(
                    prompt.out(),
                    "\n{}",
                    "✗ Changes discarded; configuration not saved".yellow()
                )?;
                return Ok(MenuExit::Discarded);
            }
            Choice::EnableAll => {
                config.enable_all(&names);
                writeln!(prompt.out(), "\n{}", "✓ Enabled all patches".green())?;
            }
            Choice::DisableAll => {
                config.disable_all();
                writeln!(prompt.out(), "\n{}", "✗ Disabled all patches".yellow())?;
            }
            Choice::Invert => {
                config.invert(&names);
                writeln!(prompt.out(), "\n{}", "↔ Inverted patch selection".blue())?;
            }
            Choice::Entries(entries) => {
                if entries.is_empty() {
                    writeln!(prompt.out(), "{}", "Invalid input, please try again.".red())?;
                    continue;
                }
                let mut any_valid = false;
                for entry in entries {
                    match entry {
                        Ok(number) if (1..=names.len()).contains(&number) => {
                            let name = names[number - 1];
                            let message = if config.toggle(name) {
                                format!("✓ Enabled: {name}").green()
                            } else {
                                format!("✗ Disabled: {name}").yellow()
                            };
                            writeln!(prompt.out(), "  {message}")?;
                            any_valid = true;
                        }
                        Ok(number) if number == path_entry => {
                            edit_path(prompt, &mut config)?;
                            any_valid = true;
                        }
                        Ok(number) => {
                            writeln!(prompt.out(), "{}", format!("Invalid choice: {number}").red())?
                        }
                        Err(token) => {
                            writeln!(prompt.out(), "{}", format!("Invalid choice: {token}").red())?
                        }
                    }
                }
                if !any_valid {
                    writeln!(prompt.out(), "{}", "No valid choice, please try again.".red())?;
                }
            }
        }
    }
}

/// Why a path cannot be used as the default target, if it cannot
fn path_problem(path: &str) -> Option<String> {
    match std::fs::metadata(Path::new(path)) {
        Ok(metadata) if metadata.is_file() => None,
        Ok(_) => Some("path exists but is not a file".to_string()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Some("file does not exist".to_string()),
        Err(e) => Some(format!("cannot access file: {e}")),
    }
}

fn edit_path<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    config: &mut PatchConfig,
) -> Result<()> {
    let answer = prompt
        .ask(&format!(
            "\n{}",
            "Full path of the file to patch (blank clears the current path): ".cyan()
        ))?
        .unwrap_or_default();

    if answer.is_empty() {
        config.set_cli_path(None);
        writeln!(prompt.out(), "{}", "✓ Default path cleared".yellow())?;
        return Ok(());
    }

    if let Some(problem) = path_problem(&answer) {
        writeln!(prompt.out(), "{}", format!("✗ Path check failed: {problem}").red())?;
        if !prompt.confirm(&"Save this path anyway? (y/n): ".yellow().to_string(), "y")? {
            writeln!(prompt.out(), "{}", "Path unchanged".dimmed())?;
            return Ok(());
        }
    }

    config.set_cli_path(Some(answer));
    if let Some(path) = &config.cli_path {
        writeln!(prompt.out(), "{}", format!("✓ Default path set to {path}").green())?;
    }
    Ok(())
}

fn render_header<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n{}", "━".repeat(60).cyan())?;
    writeln!(out, "{}", "  ccpatch patch configuration".bold().cyan())?;
    writeln!(out, "{}", "━".repeat(60).cyan())
}

fn render_summary<W: Write>(out: &mut W, config: &PatchConfig, total: usize) -> io::Result<()> {
    writeln!(out, "\n{}", "Current configuration:".bold())?;
    let enabled = RuleName::ALL
        .iter()
        .filter(|rule| config.is_enabled(rule.as_str()))
        .count();
    writeln!(out, "  Enabled patches: {}/{total}", enabled.to_string().green())?;
    match &config.cli_path {
        Some(path) => writeln!(out, "  Default path: {}", path.blue()),
        None => writeln!(out, "  Default path: {}", "(not set)".yellow()),
    }
}

fn render_patches<W: Write>(out: &mut W, config: &PatchConfig) -> io::Result<()> {
    writeln!(out, "\n{}", "Available patches:".bold())?;
    writeln!(out, "{}", "─".repeat(60).dimmed())?;
    for (index, rule) in RuleName::ALL.iter().enumerate() {
        let status = if config.is_enabled(rule.as_str()) {
            "✓ enabled".green()
        } else {
            "✗ disabled".dimmed()
        };
        writeln!(out, "  {} {}", format!("{}.", index + 1).cyan(), rule)?;
        writeln!(out, "     {} {}", rule.description().dimmed(), status)?;
    }
    writeln!(out, "{}", "─".repeat(60).dimmed())?;
    writeln!(
        out,
        "  {} {}",
        format!("{}.", RuleName::ALL.len() + 1).cyan(),
        "Set default file path".yellow()
    )?;
    writeln!(out, "{}", "─".repeat(60).dimmed())
}

fn render_shortcuts<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n{}", "Shortcuts:".bold())?;
    writeln!(out, "  {}     - save and exit", "0".cyan())?;
    writeln!(out, "  {}     - exit without saving", "q".cyan())?;
    writeln!(out, "  {}     - enable all", "a".cyan())?;
    writeln!(out, "  {}     - disable all", "n".cyan())?;
    writeln!(out, "  {}     - invert selection", "r".cyan())?;
    writeln!(
        out,
        "  {}",
        "Tip: enter several numbers separated by commas, e.g. 1,3".dimmed()
    )
}
