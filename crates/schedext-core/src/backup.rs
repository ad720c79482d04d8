//! Timestamped backups of tracked files with retention
//!
//! Before a tracked file is overwritten it is copied into the backup
//! directory as `<stem>.<timestamp>.<ext>`. Pruning keeps the most recent N
//! copies per file family; a failed delete is logged and skipped so one
//! stuck file never blocks the reconciliation pass.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

use crate::Result;

/// Timestamp format shared by backup names and the revision annotation.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

pub struct BackupManager {
    dir: PathBuf,
    retention: usize,
}

impl BackupManager {
    pub fn new(dir: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            dir: dir.into(),
            retention,
        }
    }

    /// Copy `source` into the backup directory with a timestamp suffix.
    ///
    /// Returns the backup path, or `None` when the source does not exist
    /// (nothing to preserve is not an error). The backup directory is
    /// created on first use.
    pub fn snapshot(&self, source: &Path) -> Result<Option<PathBuf>> {
        if !source.exists() {
            debug!(source = %source.display(), "nothing to back up");
            return Ok(None);
        }

        fs::create_dir_all(&self.dir)
            .map_err(|e| schedext_fs::Error::io(&self.dir, e))?;

        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let dest = self.dir.join(backup_name(&file_name, &stamp));

        fs::copy(source, &dest).map_err(|e| schedext_fs::Error::io(&dest, e))?;
        debug!(backup = %dest.display(), "snapshot written");
        Ok(Some(dest))
    }

    /// Delete all but the most recent `retention` backups for each family.
    ///
    /// A family is every backup whose name starts with `<prefix>.`. Delete
    /// failures are logged and skipped; pruning never fails the pass.
    pub fn prune(&self, prefixes: &[&str]) {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            // Nothing snapshotted yet.
            Err(_) => return,
        };

        let mut families: Vec<Vec<(PathBuf, SystemTime)>> =
            vec![Vec::new(); prefixes.len()];

        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(idx) = prefixes
                .iter()
                .position(|p| name.starts_with(&format!("{p}.")))
            else {
                continue;
            };
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            families[idx].push((entry.path(), modified));
        }

        for family in &mut families {
            family.sort_by(|a, b| b.1.cmp(&a.1));
            for (path, _) in family.iter().skip(self.retention) {
                match fs::remove_file(path) {
                    Ok(()) => debug!(backup = %path.display(), "old backup removed"),
                    Err(e) => {
                        warn!(backup = %path.display(), error = %e, "failed to remove old backup");
                    }
                }
            }
        }
    }
}

/// `kube-scheduler.yaml` + `2024-01-01_00:00:00` →
/// `kube-scheduler.2024-01-01_00:00:00.yaml`
fn backup_name(file_name: &str, stamp: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}.{stamp}.{ext}"),
        None => format!("{file_name}.{stamp}"),
    }
}
