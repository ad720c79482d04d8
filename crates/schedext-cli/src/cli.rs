//! CLI argument parsing using clap derive
//!
//! Every option is also settable through the environment variables the
//! original deployment images used, so the daemon drops into existing pod
//! specs unchanged.

use clap::Parser;
use std::path::PathBuf;

use schedext_core::Settings;

/// Keep a scheduler's extender policy and static-pod manifest reconciled
/// with this node's configuration.
#[derive(Parser, Debug)]
#[command(name = "schedext-reconciler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML settings file; flags and env vars override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Kubernetes config root (manifests live under <DIR>/manifests)
    #[arg(long, env = "KUBE_DIR")]
    pub kube_dir: Option<PathBuf>,

    /// Policy file name under the config root
    #[arg(long, env = "SCHEDULER_POLICY_FILE_NAME")]
    pub policy_file: Option<String>,

    /// Scheduler static-pod manifest file name
    #[arg(long, env = "SCHEDULER_DEFINE_YAML")]
    pub scheduler_yaml_file: Option<String>,

    /// Name of the hostPath volume carrying the policy file
    #[arg(long, env = "SCHEDULER_VOLUME_NAME")]
    pub volume_name: Option<String>,

    /// IP of this node, written into every extender URL
    #[arg(long, env = "NODE_IP")]
    pub node_ip: Option<String>,

    /// Seconds between reconciliation passes
    #[arg(long, env = "CHECK_FILE_INTERVAL")]
    pub time_interval: Option<u64>,

    /// First command token identifying the scheduler container
    #[arg(long, env = "SCHEDULER_BINARY")]
    pub scheduler_binary: Option<String>,

    /// Extender endpoint URL prefix
    #[arg(long, env = "URL_PREFIX")]
    pub url_prefix: Option<String>,

    /// Extender filter verb
    #[arg(long, env = "FILTER_VERB")]
    pub filter_verb: Option<String>,

    /// Extender bind verb
    #[arg(long, env = "BIND_VERB")]
    pub bind_verb: Option<String>,

    /// Extender prioritize verb
    #[arg(long, env = "PRIORITIZE_VERB")]
    pub prioritize_verb: Option<String>,

    /// Resource name the extender manages
    #[arg(long, env = "RESOURCE_NAME")]
    pub resource_name: Option<String>,

    /// Extender weight (omitted from the policy document when unset)
    #[arg(long, env = "WEIGHT")]
    pub weight: Option<i64>,

    /// Register the extender over HTTPS
    #[arg(long, env = "ENABLE_HTTPS")]
    pub enable_https: Option<bool>,

    /// Mark the extender ignorable when unreachable
    #[arg(long, env = "IGNORABLE")]
    pub ignorable: Option<bool>,

    /// Mark the managed resource ignored by the scheduler
    #[arg(long, env = "IGNORED_BY_SCHEDULER")]
    pub ignored_by_scheduler: Option<bool>,

    /// Advertise node-cache capability
    #[arg(long, env = "NODE_CACHE_CAPABLE")]
    pub node_cache_capable: Option<bool>,
}

impl Cli {
    /// Fold CLI/env overrides over base settings.
    pub fn apply_to(self, mut settings: Settings) -> Settings {
        if let Some(v) = self.kube_dir {
            settings.kube_dir = v;
        }
        if let Some(v) = self.policy_file {
            settings.policy_file = v;
        }
        if let Some(v) = self.scheduler_yaml_file {
            settings.scheduler_yaml_file = v;
        }
        if let Some(v) = self.volume_name {
            settings.volume_name = v;
        }
        if let Some(v) = self.node_ip {
            settings.node_ip = v;
        }
        if let Some(v) = self.time_interval {
            settings.time_interval = v;
        }
        if let Some(v) = self.scheduler_binary {
            settings.scheduler_binary = v;
        }
        if let Some(v) = self.url_prefix {
            settings.url_prefix = v;
        }
        if let Some(v) = self.filter_verb {
            settings.filter_verb = v;
        }
        if let Some(v) = self.bind_verb {
            settings.bind_verb = v;
        }
        if let Some(v) = self.prioritize_verb {
            settings.prioritize_verb = v;
        }
        if let Some(v) = self.resource_name {
            settings.resource_name = v;
        }
        if self.weight.is_some() {
            settings.weight = self.weight;
        }
        if let Some(v) = self.enable_https {
            settings.enable_https = v;
        }
        if let Some(v) = self.ignorable {
            settings.ignorable = v;
        }
        if let Some(v) = self.ignored_by_scheduler {
            settings.ignored_by_scheduler = v;
        }
        if let Some(v) = self.node_cache_capable {
            settings.node_cache_capable = v;
        }
        settings
    }
}
