//! Sale records and the sales watermark

use serde::{Deserialize, Serialize};
use tally_common::jdb::{Cell, Issue, Issues, Jdb, Record, Schema};
use tally_common::time;

/// Store file name (`sales.jdb`)
pub const SALES_STORE: &str = "sales";

/// Id prefix of sale records
pub const SALE_PREFIX: &str = "SALE";

/// Sales store, carrying the watermark in its metadata
pub type SalesStore = Jdb<SaleSchema, SalesMeta>;

/// Release kind of a sold item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Release {
    Single,
    Album,
}

impl Release {
    pub fn as_str(&self) -> &'static str {
        match self {
            Release::Single => "single",
            Release::Album => "album",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Watermark of the snapshot this sale was loaded from
    pub from: String,
    pub sale_month: String,
    pub report_date: String,
    pub store: String,
    /// Artist id
    pub artist: String,
    pub title: String,
    pub quantity: f64,
    pub album: Release,
    pub country: String,
    pub earnings: f64,
}

/// Sale before insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub from: String,
    pub sale_month: String,
    pub report_date: String,
    pub store: String,
    pub artist: String,
    pub title: String,
    pub quantity: f64,
    pub album: Release,
    pub country: String,
    pub earnings: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleField {
    From,
    SaleMonth,
    ReportDate,
    Store,
    Artist,
    Title,
    Quantity,
    Album,
    Country,
    Earnings,
}

impl Record for Sale {
    type Draft = NewSale;
    type Field = SaleField;

    const TABLE_TITLE: &'static str = "Artist Sales";
    const TABLE_FIELDS: &'static [SaleField] = &[
        SaleField::From,
        SaleField::SaleMonth,
        SaleField::ReportDate,
        SaleField::Store,
        SaleField::Artist,
        SaleField::Title,
        SaleField::Quantity,
        SaleField::Album,
        SaleField::Country,
        SaleField::Earnings,
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn assemble(id: String, draft: NewSale) -> Self {
        Self {
            id,
            from: draft.from,
            sale_month: draft.sale_month,
            report_date: draft.report_date,
            store: draft.store,
            artist: draft.artist,
            title: draft.title,
            quantity: draft.quantity,
            album: draft.album,
            country: draft.country,
            earnings: draft.earnings,
        }
    }

    fn label(field: SaleField) -> &'static str {
        match field {
            SaleField::From => "From",
            SaleField::SaleMonth => "Sale Month",
            SaleField::ReportDate => "Report Date",
            SaleField::Store => "Store",
            SaleField::Artist => "Artist",
            SaleField::Title => "Title",
            SaleField::Quantity => "Quantity",
            SaleField::Album => "Album",
            SaleField::Country => "Country",
            SaleField::Earnings => "Earnings",
        }
    }

    fn cell(&self, field: SaleField) -> Cell {
        match field {
            SaleField::From => Cell::from(&self.from),
            SaleField::SaleMonth => Cell::from(&self.sale_month),
            SaleField::ReportDate => Cell::from(&self.report_date),
            SaleField::Store => Cell::from(&self.store),
            SaleField::Artist => Cell::from(&self.artist),
            SaleField::Title => Cell::from(&self.title),
            SaleField::Quantity => Cell::from(self.quantity),
            SaleField::Album => Cell::from(self.album.as_str()),
            SaleField::Country => Cell::from(&self.country),
            SaleField::Earnings => Cell::from(self.earnings),
        }
    }
}

/// Sales validation rules
///
/// Dates must be readable so that watermark ordering works on them later.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaleSchema;

impl Schema for SaleSchema {
    type Record = Sale;

    fn issues(&self, sale: &Sale) -> Vec<Issue> {
        let mut issues = Issues::new();
        issues
            .check(
                sale.id.starts_with(SALE_PREFIX),
                "id",
                format!("must start with {}", SALE_PREFIX),
            )
            .check(
                time::parse_date(&sale.from).is_some(),
                "from",
                format!("unreadable date '{}'", sale.from),
            )
            .check(
                time::parse_month(&sale.sale_month).is_some(),
                "sale_month",
                format!("unreadable month '{}'", sale.sale_month),
            )
            .check(
                time::parse_date(&sale.report_date).is_some(),
                "report_date",
                format!("unreadable date '{}'", sale.report_date),
            )
            .non_empty("artist", &sale.artist)
            .non_empty("title", &sale.title)
            .non_empty("store", &sale.store)
            .finite("quantity", sale.quantity)
            .finite("earnings", sale.earnings);
        issues.into_vec()
    }
}

/// Metadata of the sales store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesMeta {
    /// Data is known complete up to this date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl SalesMeta {
    /// Watermark of a store that has never loaded a snapshot
    pub const INITIAL_WATERMARK: &'static str = "0-0-0";

    pub fn initial() -> Self {
        Self {
            from: Some(Self::INITIAL_WATERMARK.to_string()),
        }
    }

    pub fn watermark(&self) -> &str {
        self.from.as_deref().unwrap_or(Self::INITIAL_WATERMARK)
    }
}
