//! Scheduler extender reconciler daemon
//!
//! Watches the extender policy file and the scheduler static-pod manifest on
//! a fixed interval and rewrites them when their content drifts from the
//! configured state. Runs until killed; a single failed pass is logged and
//! retried on the next tick, while structural manifest damage exits non-zero
//! so the orchestrator can intervene.

mod cli;
mod error;

use clap::Parser;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use cli::Cli;
use error::Result;
use schedext_core::{ReconcileState, Reconciler, Settings};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let base = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    let settings = cli.apply_to(base);

    // One logical actor; the timer is the only suspension point.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(watch(settings))
}

async fn watch(settings: Settings) -> Result<()> {
    info!(
        policy = %settings.policy_path().display(),
        manifest = %settings.manifest_path().display(),
        interval = settings.time_interval,
        node_ip = %settings.node_ip,
        "starting reconciliation loop"
    );

    let interval = Duration::from_secs(settings.time_interval.max(1));
    let reconciler = Reconciler::new(settings);
    let mut state = ReconcileState::new();

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick of a tokio interval fires immediately; consume it so
    // each pass runs after a full interval, matching the configured cadence.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match reconciler.run_pass(&mut state) {
            Ok(report) => {
                for action in &report.actions {
                    info!("{action}");
                }
            }
            Err(e) if e.is_fatal() => {
                error!("unrecoverable reconciliation failure: {e}");
                return Err(e.into());
            }
            Err(e) => {
                error!("reconciliation pass failed, will retry next tick: {e}");
            }
        }
    }
}
