//! Reach derivation
//!
//! Every stored sale is folded into one running total per artist, in
//! first-seen order, dated with the sales store's current watermark. The
//! totals are then written into the reach store under that date. Existing
//! aggregates are set to the new totals rather than added to, so deriving
//! twice from the same sales gives the same reach store. Aggregates dated
//! with an earlier watermark are left as they were.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{NewReach, ReachStore, SalesMeta, SalesStore};

/// What a derivation changed in the reach store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReachSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Folded sales of one artist under one watermark
#[derive(Debug, Clone, PartialEq)]
pub struct ReachTotal {
    pub from_date: String,
    pub artist: String,
    pub reach: f64,
    pub income: f64,
}

/// Sum quantity and earnings of all sales per artist, in first-seen order
pub fn fold_sales(sales: &SalesStore) -> Vec<ReachTotal> {
    let watermark = sales
        .meta()
        .map_or(SalesMeta::INITIAL_WATERMARK, SalesMeta::watermark);
    let mut totals: Vec<ReachTotal> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for sale in sales.values() {
        let key = sale.artist.as_str();
        match positions.get(key) {
            Some(&i) => {
                totals[i].reach += sale.quantity;
                totals[i].income += sale.earnings;
            }
            None => {
                positions.insert(key, totals.len());
                totals.push(ReachTotal {
                    from_date: watermark.to_string(),
                    artist: sale.artist.clone(),
                    reach: sale.quantity,
                    income: sale.earnings,
                });
            }
        }
    }
    totals
}

/// Bring the reach store in line with the sales store
pub fn derive_reach(sales: &SalesStore, reach: &mut ReachStore) -> ReachSummary {
    let mut summary = ReachSummary::default();

    for total in fold_sales(sales) {
        let existing = reach
            .find_through(|r| r.from_date == total.from_date && r.artist == total.artist)
            .map(str::to_string);

        let Some(id) = existing else {
            let draft = NewReach {
                artist: total.artist.clone(),
                reach: total.reach,
                from_date: total.from_date.clone(),
                income: total.income,
            };
            match reach.insert(draft) {
                Ok(created) => {
                    debug!("Created reach {} for {} at {}", created.id, total.artist, total.from_date);
                    summary.created += 1;
                }
                Err(e) => {
                    warn!("Failed to create reach for {} at {}: {}", total.artist, total.from_date, e);
                    summary.failed += 1;
                }
            }
            continue;
        };

        if matches!(reach.retrieve(&id), Some(r) if r.reach == total.reach && r.income == total.income) {
            summary.unchanged += 1;
            continue;
        }
        match reach.update(&id, |r| {
            r.reach = total.reach;
            r.income = total.income;
        }) {
            Ok(_) => summary.updated += 1,
            Err(e) => {
                warn!("Failed to update reach {}: {}", id, e);
                summary.failed += 1;
            }
        }
    }

    debug!(
        "Reach derived: {} created, {} updated, {} unchanged, {} failed",
        summary.created, summary.updated, summary.unchanged, summary.failed
    );
    summary
}
