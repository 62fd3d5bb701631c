//! Reach aggregates: summed sales per artist per watermark period

use serde::{Deserialize, Serialize};
use tally_common::jdb::{Cell, Issue, Issues, Jdb, Record, Schema};

/// Store file name (`reach.jdb`)
pub const REACH_STORE: &str = "reach";

/// Id prefix of reach records
pub const REACH_PREFIX: &str = "RCH";

pub type ReachStore = Jdb<ReachSchema>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reach {
    pub id: String,
    /// Artist id
    pub artist: String,
    /// Summed quantity
    pub reach: f64,
    /// Watermark of the sales folded into this aggregate
    pub from_date: String,
    /// Summed earnings
    pub income: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReach {
    pub artist: String,
    pub reach: f64,
    pub from_date: String,
    pub income: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReachField {
    Artist,
    Reach,
    FromDate,
    Income,
}

impl Record for Reach {
    type Draft = NewReach;
    type Field = ReachField;

    const TABLE_TITLE: &'static str = "Artist Reach";
    const TABLE_FIELDS: &'static [ReachField] = &[
        ReachField::Artist,
        ReachField::Reach,
        ReachField::FromDate,
        ReachField::Income,
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn assemble(id: String, draft: NewReach) -> Self {
        Self {
            id,
            artist: draft.artist,
            reach: draft.reach,
            from_date: draft.from_date,
            income: draft.income,
        }
    }

    fn label(field: ReachField) -> &'static str {
        match field {
            ReachField::Artist => "Artist",
            ReachField::Reach => "Reach",
            ReachField::FromDate => "From Date",
            ReachField::Income => "Income",
        }
    }

    fn cell(&self, field: ReachField) -> Cell {
        match field {
            ReachField::Artist => Cell::from(&self.artist),
            ReachField::Reach => Cell::from(self.reach),
            ReachField::FromDate => Cell::from(&self.from_date),
            ReachField::Income => Cell::from(self.income),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReachSchema;

impl Schema for ReachSchema {
    type Record = Reach;

    fn issues(&self, reach: &Reach) -> Vec<Issue> {
        let mut issues = Issues::new();
        issues
            .check(
                reach.id.starts_with(REACH_PREFIX),
                "id",
                format!("must start with {}", REACH_PREFIX),
            )
            .non_empty("artist", &reach.artist)
            .non_empty("from_date", &reach.from_date)
            .finite("reach", reach.reach)
            .finite("income", reach.income);
        issues.into_vec()
    }
}
