//! Distributor sales snapshot
//!
//! A snapshot is a JSON document `{ "date": <watermark>, "data": [entry] }`.
//! It is checked field by field before deserialization so that every
//! problem in the file is reported at once, addressed by path
//! (`data[3].Quantity`).

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_common::jdb::{Issue, Issues, ValidationError};
use tracing::debug;

use crate::models::{NewSale, Release};

/// Shape of a watermark or reporting date (`2023-01-31`, `January-31-2023`)
static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+-[0-9]+-[0-9]+").expect("date pattern compiles"));

/// Shape of a sale month (`2023-01`, `01-2023`)
static MONTH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+-[0-9]+").expect("month pattern compiles"));

/// Plain string columns of an entry
const TEXT_FIELDS: &[&str] = &["Store", "Artist", "Title", "ISRC", "UPC", "Country of Sale"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Watermark: the data is complete up to this date
    pub date: String,
    pub data: Vec<SaleEntry>,
}

/// `Song/Album` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Song,
    Album,
}

impl From<EntryKind> for Release {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Song => Release::Single,
            EntryKind::Album => Release::Album,
        }
    }
}

/// One report line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleEntry {
    #[serde(rename = "Reporting Date")]
    pub reporting_date: String,
    #[serde(rename = "Sale Month")]
    pub sale_month: String,
    #[serde(rename = "Store")]
    pub store: String,
    #[serde(rename = "Artist")]
    pub artist: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "ISRC")]
    pub isrc: String,
    #[serde(rename = "UPC")]
    pub upc: String,
    #[serde(rename = "Quantity")]
    pub quantity: f64,
    #[serde(rename = "Song/Album")]
    pub kind: EntryKind,
    #[serde(rename = "Country of Sale")]
    pub country: String,
    #[serde(rename = "Earnings (USD)")]
    pub earnings: f64,
}

impl SaleEntry {
    /// Sale draft for this line, loaded under `watermark` for `artist_id`
    pub fn to_sale(&self, watermark: &str, artist_id: &str) -> NewSale {
        NewSale {
            from: watermark.to_string(),
            sale_month: self.sale_month.clone(),
            report_date: self.reporting_date.clone(),
            store: self.store.clone(),
            artist: artist_id.to_string(),
            title: self.title.clone(),
            quantity: self.quantity,
            album: self.kind.into(),
            country: self.country.clone(),
            earnings: self.earnings,
        }
    }
}

/// Validate and decode snapshot text
pub fn parse_snapshot(text: &str) -> Result<Snapshot, ValidationError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ValidationError {
        issues: vec![Issue::new("", format!("invalid JSON: {}", e))],
    })?;

    let mut issues = Issues::new();
    check_snapshot(&value, &mut issues);
    issues.finish()?;

    let snapshot: Snapshot = serde_json::from_value(value).map_err(|e| ValidationError {
        issues: vec![Issue::new("", e.to_string())],
    })?;
    debug!(
        "Parsed snapshot dated {} with {} entries",
        snapshot.date,
        snapshot.data.len()
    );
    Ok(snapshot)
}

/// Read the snapshot file; `None` when it does not exist
pub async fn read_snapshot(path: &Path) -> tally_common::Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn check_snapshot(value: &Value, issues: &mut Issues) {
    let Some(object) = value.as_object() else {
        issues.check(false, "", "expected an object");
        return;
    };

    check_pattern(object.get("date"), "date".to_string(), &DATE_PATTERN, issues);

    match object.get("data") {
        Some(Value::Array(entries)) => {
            for (i, entry) in entries.iter().enumerate() {
                check_entry(entry, &format!("data[{}]", i), issues);
            }
        }
        Some(_) => {
            issues.check(false, "data", "expected an array");
        }
        None => {
            issues.check(false, "data", "required");
        }
    }
}

fn check_entry(value: &Value, path: &str, issues: &mut Issues) {
    let Some(entry) = value.as_object() else {
        issues.check(false, path, "expected an object");
        return;
    };

    check_pattern(
        entry.get("Reporting Date"),
        field_path(path, "Reporting Date"),
        &DATE_PATTERN,
        issues,
    );
    check_pattern(
        entry.get("Sale Month"),
        field_path(path, "Sale Month"),
        &MONTH_PATTERN,
        issues,
    );

    for field in TEXT_FIELDS {
        if !matches!(entry.get(*field), Some(Value::String(_))) {
            issues.check(false, field_path(path, field), expectation("a string", entry.get(*field)));
        }
    }

    let quantity = entry.get("Quantity");
    if !matches!(quantity, Some(Value::Number(_))) {
        issues.check(false, field_path(path, "Quantity"), expectation("a number", quantity));
    }

    let earnings = entry.get("Earnings (USD)");
    if !matches!(earnings, Some(Value::Number(_))) {
        issues.check(false, field_path(path, "Earnings (USD)"), expectation("a number", earnings));
    }

    let kind = entry.get("Song/Album");
    if !matches!(kind.and_then(Value::as_str), Some("Song" | "Album")) {
        issues.check(
            false,
            field_path(path, "Song/Album"),
            expectation("\"Song\" or \"Album\"", kind),
        );
    }
}

fn check_pattern(value: Option<&Value>, path: String, pattern: &Regex, issues: &mut Issues) {
    match value {
        Some(Value::String(s)) => {
            issues.check(
                pattern.is_match(s),
                path,
                format!("'{}' does not match {}", s, pattern.as_str()),
            );
        }
        other => {
            issues.check(false, path, expectation("a string", other));
        }
    }
}

fn field_path(parent: &str, field: &str) -> String {
    format!("{}.{}", parent, field)
}

fn expectation(expected: &str, found: Option<&Value>) -> String {
    match found {
        None => "required".to_string(),
        Some(value) => format!("expected {}, found {}", expected, value),
    }
}
