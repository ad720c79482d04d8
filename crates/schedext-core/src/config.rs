//! Settings for the reconciler
//!
//! Loaded from a TOML file or assembled by the CLI from flags/environment.
//! Every field has a default matching the deployed environment so a bare
//! `Settings::default()` reconciles a standard kubeadm node.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use schedext_manifest::PatchSpec;
use schedext_policy::{ExtenderEntry, ManagedResource};

use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Kubernetes config root; manifests live under `<kube_dir>/manifests`.
    #[serde(default = "default_kube_dir")]
    pub kube_dir: PathBuf,

    /// Policy file name under `kube_dir`.
    #[serde(default = "default_policy_file")]
    pub policy_file: String,

    /// Scheduler static-pod manifest file name under `<kube_dir>/manifests`.
    #[serde(default = "default_scheduler_yaml_file")]
    pub scheduler_yaml_file: String,

    /// Name of the hostPath volume carrying the policy file.
    #[serde(default = "default_volume_name")]
    pub volume_name: String,

    /// IP of this node, written into every extender URL.
    #[serde(default = "default_node_ip")]
    pub node_ip: String,

    /// Seconds between reconciliation passes.
    #[serde(default = "default_time_interval")]
    pub time_interval: u64,

    /// First command token identifying the scheduler container.
    #[serde(default = "default_scheduler_binary")]
    pub scheduler_binary: String,

    /// Backups kept per tracked-file family.
    #[serde(default = "default_backup_retention")]
    pub backup_retention: usize,

    // Extender registration fields
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,

    #[serde(default = "default_filter_verb")]
    pub filter_verb: String,

    #[serde(default = "default_bind_verb")]
    pub bind_verb: String,

    #[serde(default = "default_prioritize_verb")]
    pub prioritize_verb: String,

    #[serde(default = "default_resource_name")]
    pub resource_name: String,

    /// Extender weight; omitted from the policy document when not set.
    #[serde(default)]
    pub weight: Option<i64>,

    #[serde(default)]
    pub enable_https: bool,

    #[serde(default)]
    pub ignorable: bool,

    #[serde(default)]
    pub ignored_by_scheduler: bool,

    #[serde(default = "default_node_cache_capable")]
    pub node_cache_capable: bool,
}

fn default_kube_dir() -> PathBuf {
    PathBuf::from("/etc/kubernetes")
}

fn default_policy_file() -> String {
    "scheduler-policy-config.json".to_string()
}

fn default_scheduler_yaml_file() -> String {
    "kube-scheduler.yaml".to_string()
}

fn default_volume_name() -> String {
    "scheduler-policy-config".to_string()
}

fn default_node_ip() -> String {
    "127.0.0.1".to_string()
}

fn default_time_interval() -> u64 {
    3
}

fn default_scheduler_binary() -> String {
    "kube-scheduler".to_string()
}

fn default_backup_retention() -> usize {
    3
}

fn default_url_prefix() -> String {
    "http://127.0.0.1:32766/gpushare-scheduler".to_string()
}

fn default_filter_verb() -> String {
    "filter".to_string()
}

fn default_bind_verb() -> String {
    "bind".to_string()
}

fn default_prioritize_verb() -> String {
    "sort".to_string()
}

fn default_resource_name() -> String {
    "aliyun.com/gpu-mem".to_string()
}

fn default_node_cache_capable() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kube_dir: default_kube_dir(),
            policy_file: default_policy_file(),
            scheduler_yaml_file: default_scheduler_yaml_file(),
            volume_name: default_volume_name(),
            node_ip: default_node_ip(),
            time_interval: default_time_interval(),
            scheduler_binary: default_scheduler_binary(),
            backup_retention: default_backup_retention(),
            url_prefix: default_url_prefix(),
            filter_verb: default_filter_verb(),
            bind_verb: default_bind_verb(),
            prioritize_verb: default_prioritize_verb(),
            resource_name: default_resource_name(),
            weight: None,
            enable_https: false,
            ignorable: false,
            ignored_by_scheduler: false,
            node_cache_capable: default_node_cache_capable(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Absolute path of the policy file.
    pub fn policy_path(&self) -> PathBuf {
        self.kube_dir.join(&self.policy_file)
    }

    /// Absolute path of the scheduler static-pod manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.kube_dir.join("manifests").join(&self.scheduler_yaml_file)
    }

    /// Directory that receives timestamped backups.
    pub fn backup_dir(&self) -> PathBuf {
        self.kube_dir.join("manifests_backup")
    }

    /// The extender entry this node registers for itself.
    pub fn extender_template(&self) -> ExtenderEntry {
        ExtenderEntry {
            url_prefix: Some(self.url_prefix.clone()),
            filter_verb: Some(self.filter_verb.clone()),
            bind_verb: Some(self.bind_verb.clone()),
            prioritize_verb: Some(self.prioritize_verb.clone()),
            enable_https: Some(self.enable_https),
            ignorable: Some(self.ignorable),
            node_cache_capable: Some(self.node_cache_capable),
            managed_resources: vec![ManagedResource {
                name: self.resource_name.clone(),
                ignored_by_scheduler: Some(self.ignored_by_scheduler),
            }],
            weight: self.weight,
            extra: Default::default(),
        }
    }

    /// The manifest edits this configuration implies.
    pub fn patch_spec(&self) -> PatchSpec {
        PatchSpec::new(
            self.volume_name.clone(),
            self.policy_path(),
            self.scheduler_binary.clone(),
        )
    }
}
