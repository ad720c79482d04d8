//! Fingerprint-gated reconciliation passes
//!
//! One pass runs to completion per timer tick: observe both tracked files,
//! bail out early when neither fingerprint moved, otherwise build the merged
//! policy document and the patched manifest fully in memory, snapshot the
//! on-disk state, write back, prune backups, and only then advance the
//! stored fingerprints. A pass that fails leaves the fingerprints untouched
//! so the next tick retries the whole pass.

use chrono::Local;
use std::fs;
use tracing::{debug, info, trace, warn};

use schedext_fs::{ReadOutcome, fingerprint_bytes, fingerprint_file, read_tracked, write_atomic};
use schedext_manifest::{PatchSpec, PodManifest};
use schedext_policy::{ExtenderEntry, PolicyDocument, merge};

use crate::backup::{BackupManager, TIMESTAMP_FORMAT};
use crate::config::Settings;
use crate::{Error, Result};

/// Watch state threaded through passes.
///
/// Never persisted: a restarted process starts from `default()` and treats
/// both files as new on its first pass.
#[derive(Debug, Clone, Default)]
pub struct ReconcileState {
    /// Fingerprint of the policy file after the last successful pass.
    pub policy_fingerprint: Option<String>,
    /// Fingerprint of the manifest after the last successful pass.
    pub manifest_fingerprint: Option<String>,
    /// The manifest as last successfully patched, used to regenerate the
    /// file if an external actor deletes it between ticks.
    pub last_manifest: Option<PodManifest>,
}

impl ReconcileState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Report from a single reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    pub policy_written: bool,
    pub manifest_written: bool,
    /// Human-readable record of what the pass did.
    pub actions: Vec<String>,
}

impl PassReport {
    /// True when the fingerprint gate short-circuited the pass.
    pub fn skipped(&self) -> bool {
        !self.policy_written && !self.manifest_written
    }

    fn record(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }
}

/// Where the manifest content for this pass comes from.
enum ManifestSource {
    OnDisk(String),
    Remembered(PodManifest),
}

pub struct Reconciler {
    settings: Settings,
    backups: BackupManager,
    template: ExtenderEntry,
    patch: PatchSpec,
}

impl Reconciler {
    pub fn new(settings: Settings) -> Self {
        let backups = BackupManager::new(settings.backup_dir(), settings.backup_retention);
        let template = settings.extender_template();
        let patch = settings.patch_spec();
        Self {
            settings,
            backups,
            template,
            patch,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Execute one reconciliation pass.
    ///
    /// # Errors
    ///
    /// Recoverable errors (I/O, unparseable policy file) abort only this
    /// pass; `state` is left as-is and the caller retries on the next tick.
    /// Fatal errors ([`Error::is_fatal`]) must terminate the process.
    pub fn run_pass(&self, state: &mut ReconcileState) -> Result<PassReport> {
        let policy_path = self.settings.policy_path();
        let manifest_path = self.settings.manifest_path();
        let mut report = PassReport::default();

        // 1. Observe the policy file.
        let (policy_changed, existing_policy) = match read_tracked(&policy_path)? {
            ReadOutcome::Present(content) => {
                let fp = fingerprint_bytes(content.as_bytes());
                if state.policy_fingerprint.as_deref() == Some(fp.as_str()) {
                    (false, None)
                } else {
                    debug!(path = %policy_path.display(), "policy file changed");
                    (true, Some(PolicyDocument::from_json(&content)?))
                }
            }
            ReadOutcome::Missing => {
                info!(path = %policy_path.display(), "policy file missing, will bootstrap");
                (true, None)
            }
            ReadOutcome::IsDirectory => {
                warn!(path = %policy_path.display(), "directory occupies policy path, removing it");
                fs::remove_dir_all(&policy_path)
                    .map_err(|e| schedext_fs::Error::io(&policy_path, e))?;
                (true, None)
            }
        };

        // 2. Observe the manifest.
        let (manifest_changed, manifest_source) = match read_tracked(&manifest_path)? {
            ReadOutcome::Present(content) => {
                let fp = fingerprint_bytes(content.as_bytes());
                let changed = state.manifest_fingerprint.as_deref() != Some(fp.as_str());
                if changed {
                    debug!(path = %manifest_path.display(), "manifest changed");
                }
                (changed, ManifestSource::OnDisk(content))
            }
            ReadOutcome::Missing | ReadOutcome::IsDirectory => match state.last_manifest.clone() {
                Some(last) => {
                    warn!(path = %manifest_path.display(), "manifest disappeared, regenerating");
                    (true, ManifestSource::Remembered(last))
                }
                None => {
                    return Err(Error::ManifestMissing {
                        path: manifest_path,
                    });
                }
            },
        };

        // 3. Fingerprint gate: no change, no write, no backup.
        if !policy_changed && !manifest_changed {
            trace!("fingerprints unchanged, skipping pass");
            return Ok(report);
        }

        // 4. Build everything in memory before touching disk, so a malformed
        //    manifest aborts with nothing written.
        let mut manifest = match manifest_source {
            ManifestSource::OnDisk(content) => PodManifest::from_yaml(&content)?,
            ManifestSource::Remembered(manifest) => manifest,
        };
        let revision = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.patch.apply_all(&mut manifest, &revision)?;
        let manifest_out = manifest.to_yaml()?;

        let policy_out = if policy_changed {
            let merged = merge(existing_policy, &self.template, &self.settings.node_ip);
            Some(merged.to_pretty_json()?)
        } else {
            None
        };

        // 5. Snapshot current on-disk state, then write back.
        self.backups.snapshot(&policy_path)?;
        self.backups.snapshot(&manifest_path)?;

        if let Some(content) = &policy_out {
            write_atomic(&policy_path, content.as_bytes())?;
            info!(path = %policy_path.display(), "policy document written");
            report.policy_written = true;
            report.record("merged extender entry into policy document");
        }

        write_atomic(&manifest_path, manifest_out.as_bytes())?;
        info!(path = %manifest_path.display(), revision, "manifest written");
        report.manifest_written = true;
        report.record("patched scheduler manifest");

        self.backups.prune(&[
            family_prefix(&self.settings.scheduler_yaml_file),
            family_prefix(&self.settings.policy_file),
        ]);

        // 6. Advance fingerprints only after a fully successful write.
        state.policy_fingerprint = fingerprint_file(&policy_path)?;
        state.manifest_fingerprint = Some(fingerprint_bytes(manifest_out.as_bytes()));
        state.last_manifest = Some(manifest);

        Ok(report)
    }
}

/// Backup family prefix of a tracked file: the name without its final
/// extension.
fn family_prefix(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
}
