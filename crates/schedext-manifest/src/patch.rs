//! Idempotent structural edits to the scheduler manifest
//!
//! Four independent patches: policy volume, policy volume mount, the
//! `--policy-config-file=` command flag, and the revision annotation.
//! Reapplying the full set to an already-patched manifest changes nothing
//! but the annotation value.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::schema::{Container, HostPathVolumeSource, PodManifest, Volume, VolumeMount};
use crate::{Error, Result};

/// Annotation key bumped on every rewrite so watchers see a revision change.
pub const REVISION_ANNOTATION: &str = "deployment.kubernetes.io/revision";

const POLICY_FLAG: &str = "--policy-config-file=";

/// Configuration for one patch pass.
#[derive(Debug, Clone)]
pub struct PatchSpec {
    /// Name of the hostPath volume carrying the policy file.
    pub volume_name: String,
    /// Absolute path of the policy file on the node.
    pub policy_path: PathBuf,
    /// First command token identifying the scheduler container.
    pub scheduler_binary: String,
}

impl PatchSpec {
    pub fn new(
        volume_name: impl Into<String>,
        policy_path: impl Into<PathBuf>,
        scheduler_binary: impl Into<String>,
    ) -> Self {
        Self {
            volume_name: volume_name.into(),
            policy_path: policy_path.into(),
            scheduler_binary: scheduler_binary.into(),
        }
    }

    /// Apply all four patches.
    ///
    /// The manifest is edited in place; on error it must be discarded, never
    /// written back.
    pub fn apply_all(&self, manifest: &mut PodManifest, revision: &str) -> Result<()> {
        self.patch_volumes(manifest);
        self.patch_volume_mounts(manifest)?;
        self.patch_command(manifest)?;
        self.patch_annotations(manifest, revision);
        Ok(())
    }

    /// The container this pass targets: first command token, space-trimmed,
    /// equals the scheduler binary name.
    fn scheduler_container<'a>(&self, manifest: &'a mut PodManifest) -> Result<&'a mut Container> {
        manifest
            .spec
            .containers
            .iter_mut()
            .find(|c| c.command.first().map(|t| t.trim()) == Some(self.scheduler_binary.as_str()))
            .ok_or_else(|| Error::SchedulerContainerNotFound {
                binary: self.scheduler_binary.clone(),
            })
    }

    /// Ensure exactly one hostPath volume with the configured name.
    pub fn patch_volumes(&self, manifest: &mut PodManifest) {
        let volumes = &mut manifest.spec.volumes;
        volumes.retain(|v| v.name != self.volume_name);
        volumes.push(Volume {
            name: self.volume_name.clone(),
            host_path: Some(HostPathVolumeSource {
                path: path_string(&self.policy_path),
                host_path_type: Some("FileOrCreate".to_string()),
            }),
            extra: Default::default(),
        });
        debug!(volume = %self.volume_name, "policy volume ensured");
    }

    /// Ensure exactly one read-only mount of the policy file in the
    /// scheduler container.
    pub fn patch_volume_mounts(&self, manifest: &mut PodManifest) -> Result<()> {
        let volume_name = self.volume_name.clone();
        let mount_path = path_string(&self.policy_path);
        let container = self.scheduler_container(manifest)?;
        container.volume_mounts.retain(|m| m.name != volume_name);
        container.volume_mounts.push(VolumeMount {
            name: volume_name,
            mount_path,
            read_only: Some(true),
            extra: Default::default(),
        });
        debug!("policy volume mount ensured");
        Ok(())
    }

    /// Ensure exactly one `--policy-config-file=` token, preserving the
    /// order of all other tokens.
    pub fn patch_command(&self, manifest: &mut PodManifest) -> Result<()> {
        let flag = format!("{}{}", POLICY_FLAG, path_string(&self.policy_path));
        let container = self.scheduler_container(manifest)?;
        container
            .command
            .retain(|token| !token.trim().starts_with(POLICY_FLAG));
        container.command.push(flag);
        debug!("policy command flag ensured");
        Ok(())
    }

    /// Stamp the revision annotation; all other annotations are preserved.
    pub fn patch_annotations(&self, manifest: &mut PodManifest, revision: &str) {
        manifest
            .metadata
            .annotations
            .insert(REVISION_ANNOTATION.to_string(), revision.to_string());
        debug!(revision, "revision annotation stamped");
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
