//! Read-only table projections for display
//!
//! A table is a plain snapshot: title, ordered headers and rows of cells
//! aligned with the headers. It is never kept in sync with the store it
//! came from; ask the store for a new one to see new data.

use serde::Serialize;

use super::record::{Cell, Record};

/// Label of the column every store projection starts with
pub const ID_HEADER: &str = "ID";

/// Title, headers and rows handed to a presenter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table
    pub fn new<I, H>(title: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: AsRef<str>,
    {
        Self {
            title: title.into(),
            headers: collect_headers(headers),
            rows: Vec::new(),
        }
    }

    /// Project `records` onto `fields`, with a leading ID column
    pub fn project<'a, R, I>(title: impl Into<String>, records: I, fields: &[R::Field]) -> Self
    where
        R: Record + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let headers = std::iter::once(ID_HEADER).chain(fields.iter().map(|f| R::label(*f)));
        let mut table = Self::new(title, headers);
        for record in records {
            let mut row = Vec::with_capacity(fields.len() + 1);
            row.push(Cell::from(record.id()));
            row.extend(fields.iter().map(|f| record.cell(*f)));
            table.add_row(row);
        }
        table
    }

    /// Append a row; arity is the caller's responsibility
    pub fn add_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Replace all headers
    pub fn set_headers<I, H>(&mut self, headers: I)
    where
        I: IntoIterator<Item = H>,
        H: AsRef<str>,
    {
        self.headers = collect_headers(headers);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn collect_headers<I, H>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = H>,
    H: AsRef<str>,
{
    headers.into_iter().map(|h| h.as_ref().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_table_rows_keep_order() {
        let mut table = Table::new("Totals", ["Store", "Quantity"]);
        table.add_row(vec![Cell::from("Spotify"), Cell::from(10i64)]);
        table.add_row(vec![Cell::from("Apple Music"), Cell::from(4i64)]);

        assert_eq!(table.title(), "Totals");
        assert_eq!(table.headers(), ["Store", "Quantity"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1][0], Cell::from("Apple Music"));
    }

    #[test]
    fn test_headers_are_kept_as_given() {
        let mut table = Table::new("t", [" band_name ", "Full Names"]);
        assert_eq!(table.headers(), [" band_name ", "Full Names"]);

        table.set_headers(["sale_month"]);
        assert_eq!(table.headers(), ["sale_month"]);
    }

    #[test]
    fn test_set_headers_replaces() {
        let mut table = Table::new("t", ["a", "b"]);
        table.set_headers(["c"]);
        assert_eq!(table.headers(), ["c"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_table_serializes_as_plain_data() {
        let mut table = Table::new("t", ["Name", "Aliases"]);
        table.add_row(vec![
            Cell::from("NF"),
            Cell::from(vec!["Nathan Feuerstein".to_string()]),
        ]);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["rows"][0][1][0], "Nathan Feuerstein");
    }
}
