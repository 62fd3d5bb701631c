//! Record trait and display cells
//!
//! Every stored type declares its fields as a closed `Copy` enum together
//! with a header label and a cell accessor per field. Table headers and
//! `find_by` lookups go through this table instead of deriving field names
//! from header strings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A value stored in a JDB instance
pub trait Record: Clone + Debug + Serialize + DeserializeOwned {
    /// Record contents before an id has been assigned
    type Draft;

    /// Displayable/searchable fields of this record type
    type Field: Copy + Eq + Debug + 'static;

    /// Title of the default full table
    const TABLE_TITLE: &'static str;

    /// Columns of the default full table, in display order (ID excluded)
    const TABLE_FIELDS: &'static [Self::Field];

    /// The record's own id
    fn id(&self) -> &str;

    /// Combine a draft with the id issued by the store
    fn assemble(id: String, draft: Self::Draft) -> Self;

    /// Header label of a field
    fn label(field: Self::Field) -> &'static str;

    /// Current value of a field
    fn cell(&self, field: Self::Field) -> Cell;
}

/// Scalar-or-array value of a table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    TextList(Vec<String>),
    NumberList(Vec<f64>),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&String> for Cell {
    fn from(value: &String) -> Self {
        Cell::Text(value.clone())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<Vec<String>> for Cell {
    fn from(value: Vec<String>) -> Self {
        Cell::TextList(value)
    }
}

impl From<&[String]> for Cell {
    fn from(value: &[String]) -> Self {
        Cell::TextList(value.to_vec())
    }
}

impl From<Vec<f64>> for Cell {
    fn from(value: Vec<f64>) -> Self {
        Cell::NumberList(value)
    }
}
