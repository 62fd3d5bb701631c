//! tally-sync library - sales snapshot reconciliation
//!
//! Keeps the artist, sales and reach stores of a music business in step
//! with the sales reports a distributor publishes as `snapshot.json`.

pub mod aggregate;
pub mod models;
pub mod reconcile;
pub mod snapshot;
pub mod stores;

pub use reconcile::{run_pass, ReconcileOutcome, ReconcileReport};
pub use stores::{StoreName, Stores};

/// Module name used for the config file (`~/.config/tally/tally-sync.toml`)
pub const MODULE_NAME: &str = "tally-sync";
