//! Snapshot reconciliation
//!
//! One pass reads the snapshot, checks its watermark against the sales
//! store, inserts the lines that are new, persists the sales store and
//! re-derives the reach store from it.
//!
//! A pass is all-or-nothing for the sales store: if any line fails sale
//! validation every insert of the pass is rolled back and nothing is
//! written.

use std::path::Path;

use serde::Serialize;
use tally_common::jdb::ValidationError;
use tally_common::time;
use tracing::{debug, error, info, warn};

use crate::aggregate::{derive_reach, ReachSummary};
use crate::models::{ArtistField, ArtistStore, SalesStore};
use crate::snapshot::{parse_snapshot, read_snapshot, SaleEntry, Snapshot};
use crate::stores::Stores;

/// Result of one reconciliation pass
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// No snapshot file to read
    NoSnapshot,
    /// The snapshot file exists but could not be read
    Unreadable(String),
    /// The snapshot failed validation; nothing was touched
    Invalid(ValidationError),
    /// The store already holds data at or after the snapshot's watermark
    Stale { stored: String, snapshot: String },
    /// Some lines failed sale validation; the pass was undone
    RolledBack { failures: Vec<InsertFailure> },
    Applied(ReconcileReport),
}

/// A snapshot line the sales schema rejected
#[derive(Debug, Clone, PartialEq)]
pub struct InsertFailure {
    /// Position of the line in the snapshot
    pub line: usize,
    pub artist: String,
    pub title: String,
    pub error: ValidationError,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// Watermark the sales store was advanced to
    pub watermark: String,
    pub inserted: usize,
    pub unknown_artists: usize,
    pub skipped: usize,
    pub sales_persisted: bool,
    /// Present once the sales store was persisted
    pub reach: Option<ReachSummary>,
    pub reach_persisted: bool,
}

/// Run a full pass against `stores` with the snapshot at `snapshot_path`
pub async fn run_pass(stores: &mut Stores, snapshot_path: &Path) -> ReconcileOutcome {
    let text = match read_snapshot(snapshot_path).await {
        Ok(Some(text)) => text,
        Ok(None) => {
            info!("No snapshot file found at {}", snapshot_path.display());
            return ReconcileOutcome::NoSnapshot;
        }
        Err(e) => {
            error!("Failed to read {}: {}", snapshot_path.display(), e);
            return ReconcileOutcome::Unreadable(e.to_string());
        }
    };

    let snapshot = match parse_snapshot(&text) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to parse data! {}", e);
            return ReconcileOutcome::Invalid(e);
        }
    };

    let mut report = match apply_snapshot(&stores.artists, &mut stores.sales, &snapshot) {
        ReconcileOutcome::Applied(report) => report,
        other => return other,
    };

    report.sales_persisted = stores.sales.update_external().await;
    if !report.sales_persisted {
        error!("Failed to update the local sales save");
        return ReconcileOutcome::Applied(report);
    }
    info!("Successfully updated the local sales save");

    report.reach = Some(derive_reach(&stores.sales, &mut stores.reach));
    report.reach_persisted = stores.reach.update_external().await;
    if report.reach_persisted {
        info!("Successfully updated the local reach save");
    } else {
        error!("Failed to update the local reach save");
    }
    ReconcileOutcome::Applied(report)
}

/// Merge `snapshot` into the in-memory sales store
///
/// Returns `Applied` with the watermark advanced, or `Stale` / `RolledBack`
/// with the sales store as it was. Nothing is written to disk.
pub fn apply_snapshot(
    artists: &ArtistStore,
    sales: &mut SalesStore,
    snapshot: &Snapshot,
) -> ReconcileOutcome {
    let stored = sales
        .meta()
        .map(|meta| meta.watermark().to_string())
        .unwrap_or_default();
    info!("Snapshot data from {}", snapshot.date);
    info!("Save data from {}", stored);

    if time::is_at_or_after(&stored, &snapshot.date) {
        info!("Aborting the parsing of snapshot. Current data is of the same or newer date");
        return ReconcileOutcome::Stale {
            stored,
            snapshot: snapshot.date.clone(),
        };
    }

    let checkpoint = sales.checkpoint();
    let started_empty = sales.is_empty();
    let mut report = ReconcileReport {
        watermark: snapshot.date.clone(),
        ..Default::default()
    };
    let mut failures = Vec::new();

    for (line, entry) in snapshot.data.iter().enumerate() {
        let Some(artist) = artists.find_by(ArtistField::BandName, entry.artist.as_str()) else {
            warn!("Ignoring unknown artist: {}", entry.artist);
            report.unknown_artists += 1;
            continue;
        };

        let known = if started_empty {
            covered_by_watermark(&stored, entry)
        } else {
            is_known(sales, &snapshot.date, artist, entry)
        };
        if known {
            debug!(
                "Skipping known sale: {} / {} ({})",
                entry.artist, entry.title, entry.sale_month
            );
            report.skipped += 1;
            continue;
        }

        match sales.insert(entry.to_sale(&snapshot.date, artist)) {
            Ok(sale) => {
                debug!("New data found: {} {} {}", sale.id, entry.artist, entry.title);
                report.inserted += 1;
            }
            Err(e) => failures.push(InsertFailure {
                line,
                artist: entry.artist.clone(),
                title: entry.title.clone(),
                error: e,
            }),
        }
    }

    if !failures.is_empty() {
        for failure in &failures {
            error!(
                "Failed to insert line {} ({} / {}): {}",
                failure.line, failure.artist, failure.title, failure.error
            );
        }
        warn!("Not updating local sales file because of insert errors");
        sales.rollback(checkpoint);
        return ReconcileOutcome::RolledBack { failures };
    }

    sales.meta_mut().from = Some(snapshot.date.clone());
    info!(
        "Loaded data from {}: {} inserted, {} skipped, {} unknown artists",
        snapshot.date, report.inserted, report.skipped, report.unknown_artists
    );
    ReconcileOutcome::Applied(report)
}

/// An empty store only knows its watermark
fn covered_by_watermark(stored: &str, entry: &SaleEntry) -> bool {
    time::is_at_or_after(stored, &entry.sale_month)
        || time::is_at_or_after(stored, &entry.reporting_date)
}

/// Whether a sale from an earlier pass already covers `entry`
///
/// Sales loaded in the current pass never count: two identical lines in
/// one report are two sales.
fn is_known(sales: &SalesStore, watermark: &str, artist: &str, entry: &SaleEntry) -> bool {
    sales
        .find_through(|sale| {
            if sale.from == watermark {
                return false;
            }
            time::is_after(&sale.from, watermark)
                || time::is_after(&sale.sale_month, &entry.sale_month)
                || time::is_after(&sale.report_date, &entry.reporting_date)
                || (sale.artist == artist
                    && time::is_at_or_after(&sale.sale_month, &entry.sale_month)
                    && time::is_at_or_after(&sale.report_date, &entry.reporting_date))
        })
        .is_some()
}
