//! tally-sync - reconcile a distributor sales snapshot into the local stores
//!
//! Opens `<root>/jdb/{artists,sales,reach}.jdb`, runs one reconciliation
//! pass against the snapshot file and optionally prints or re-exports
//! stores afterwards.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tally_common::config::{RootFolderInitializer, RootFolderResolver};
use tally_sync::{run_pass, ReconcileOutcome, StoreName, Stores, MODULE_NAME};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tally-sync")]
#[command(about = "Reconcile distributor sales snapshots into the Tally stores")]
#[command(version)]
struct Args {
    /// Root folder holding jdb/ and snapshot.json
    #[arg(short, long, env = "TALLY_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Snapshot file; relative paths are taken from the root folder
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Skip the reconciliation pass
    #[arg(long)]
    no_sync: bool,

    /// Print a store's table as JSON (artists, sales, reach)
    #[arg(long, value_name = "STORE")]
    show: Vec<String>,

    /// Write a store back to its file (artists, sales, reach)
    #[arg(long, value_name = "STORE")]
    export: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = RootFolderResolver::new(MODULE_NAME);
    let config = resolver.load_config();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let log_file = config
        .logging
        .open_file()
        .context("Failed to open log file")?;
    match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    info!("Starting tally-sync v{}", env!("CARGO_PKG_VERSION"));

    let root_folder = args.root_folder.unwrap_or_else(|| resolver.resolve());
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to prepare root folder")?;
    info!("Root folder: {}", initializer.root_folder().display());

    let mut stores = Stores::open(&initializer.jdb_dir())
        .await
        .context("Failed to open stores")?;

    if !args.no_sync {
        let snapshot_path = initializer
            .snapshot_path(args.snapshot.as_deref().or(config.snapshot_file.as_deref()));
        match run_pass(&mut stores, &snapshot_path).await {
            ReconcileOutcome::Applied(report) => {
                info!("✓ Reconciled to {}", report.watermark);
                info!("{}", serde_json::to_string(&report)?);
            }
            ReconcileOutcome::NoSnapshot | ReconcileOutcome::Stale { .. } => {
                info!("Stores already up to date");
            }
            ReconcileOutcome::Invalid(e) => {
                error!("Snapshot rejected: {}", e);
            }
            ReconcileOutcome::RolledBack { failures } => {
                error!("Snapshot not applied: {} lines failed validation", failures.len());
            }
            ReconcileOutcome::Unreadable(e) => {
                error!("Snapshot unreadable: {}", e);
            }
        }
    }

    for name in &args.export {
        if stores.export(name).await {
            info!("Exported {}", name);
        }
    }

    for name in &args.show {
        match name.parse::<StoreName>() {
            Ok(store) => {
                let table = stores.full_table(store);
                println!("{}", serde_json::to_string_pretty(&table)?);
            }
            Err(e) => warn!("{}", e),
        }
    }

    Ok(())
}
