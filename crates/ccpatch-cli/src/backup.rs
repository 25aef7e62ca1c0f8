//! Timestamped file backups
//!
//! A backup of `cli.js` is stored as `cli.js.backup.<timestamp>` in the backup
//! directory, where the timestamp is the UTC time of creation in ISO-8601 form
//! with `:` and `.` replaced by `-`.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One backup file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
}

/// Backup directory
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `file` into the backup directory and return the backup's path
    pub fn create(&self, file: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create backup directory {}", self.dir.display())
        })?;

        let base = format!("{}{}", backup_prefix(file)?, timestamp(Utc::now()));
        let mut path = self.dir.join(&base);
        let mut attempt = 1;
        while path.exists() {
            path = self.dir.join(format!("{base}-{attempt}"));
            attempt += 1;
        }

        fs::copy(file, &path).with_context(|| {
            format!(
                "Failed to back up {} to {}",
                file.display(),
                path.display()
            )
        })?;
        tracing::debug!(backup = %path.display(), "created backup");
        Ok(path)
    }

    /// Backups of `file`, newest first
    pub fn list(&self, file: &Path) -> Result<Vec<BackupEntry>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let prefix = backup_prefix(file)?;

        let mut backups = Vec::new();
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read backup directory {}", self.dir.display()))?;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(&prefix) {
                continue;
            }
            let metadata = entry
                .metadata()
                .with_context(|| format!("Failed to read metadata of {name}"))?;
            if !metadata.is_file() {
                continue;
            }
            backups.push(BackupEntry {
                path: entry.path(),
                name,
                size: metadata.len(),
                modified: metadata.modified()?,
            });
        }

        backups.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(backups)
    }

    /// Overwrite `target` with the contents of `backup`
    pub fn restore(&self, backup: &BackupEntry, target: &Path) -> Result<()> {
        fs::copy(&backup.path, target).with_context(|| {
            format!(
                "Failed to restore {} from {}",
                target.display(),
                backup.path.display()
            )
        })?;
        Ok(())
    }
}

fn backup_prefix(file: &Path) -> Result<String> {
    let name = file
        .file_name()
        .with_context(|| format!("{} has no file name", file.display()))?;
    Ok(format!("{}.backup.", name.to_string_lossy()))
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

/// Human-readable size: bytes below 1 KiB, otherwise KB or MB with two decimals
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    }
}

/// Local time as `YYYY/MM/DD HH:MM:SS`
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y/%m/%d %H:%M:%S")
        .to_string()
}
