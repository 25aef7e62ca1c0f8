//! List command - show the available patches

use anyhow::{Context, Result};
use ccpatch_config::{ConfigStore, PatchConfig};
use ccpatch_core::RuleName;
use colored::Colorize;
use std::io::{self, Write};

pub fn run(store: &ConfigStore) -> Result<()> {
    let loaded = store.load().with_context(|| {
        format!(
            "Failed to load configuration from {}",
            store.config_path().display()
        )
    })?;
    render(&mut io::stdout().lock(), &loaded.config)?;
    Ok(())
}

fn render<W: Write>(out: &mut W, config: &PatchConfig) -> io::Result<()> {
    writeln!(out, "{}", "Available patches:".bold())?;
    for rule in RuleName::ALL {
        let status = if config.is_enabled(rule.as_str()) {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        writeln!(
            out,
            "  {:<20} {:<40} {}",
            rule.as_str().cyan(),
            rule.description(),
            status
        )?;
    }
    match &config.cli_path {
        Some(path) => writeln!(out, "\nDefault path: {path}"),
        None => writeln!(out, "\nDefault path: {}", "(not set)".yellow()),
    }
}
