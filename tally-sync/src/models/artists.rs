//! Artist records
//!
//! Sales reference artists by id; snapshots name them by band name.

use serde::{Deserialize, Serialize};
use tally_common::jdb::{Cell, Issue, Issues, Jdb, Record, Schema};

/// Store file name (`artists.jdb`)
pub const ARTISTS_STORE: &str = "artists";

/// Id prefix of artist records
pub const ARTIST_PREFIX: &str = "ART";

/// Artist store
pub type ArtistStore = Jdb<ArtistSchema>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub band_name: String,
    pub full_names: Vec<String>,
}

/// Artist before insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtist {
    pub band_name: String,
    pub full_names: Vec<String>,
}

impl NewArtist {
    pub fn new<I, N>(band_name: impl Into<String>, full_names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            band_name: band_name.into(),
            full_names: full_names.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtistField {
    BandName,
    FullNames,
}

impl Record for Artist {
    type Draft = NewArtist;
    type Field = ArtistField;

    const TABLE_TITLE: &'static str = "Artists";
    const TABLE_FIELDS: &'static [ArtistField] = &[ArtistField::BandName, ArtistField::FullNames];

    fn id(&self) -> &str {
        &self.id
    }

    fn assemble(id: String, draft: NewArtist) -> Self {
        Self {
            id,
            band_name: draft.band_name,
            full_names: draft.full_names,
        }
    }

    fn label(field: ArtistField) -> &'static str {
        match field {
            ArtistField::BandName => "Band Name",
            ArtistField::FullNames => "Full Names",
        }
    }

    fn cell(&self, field: ArtistField) -> Cell {
        match field {
            ArtistField::BandName => Cell::from(&self.band_name),
            ArtistField::FullNames => Cell::from(self.full_names.as_slice()),
        }
    }
}

/// Artist validation rules
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtistSchema;

impl Schema for ArtistSchema {
    type Record = Artist;

    fn issues(&self, artist: &Artist) -> Vec<Issue> {
        let mut issues = Issues::new();
        issues
            .check(
                artist.id.starts_with(ARTIST_PREFIX),
                "id",
                format!("must start with {}", ARTIST_PREFIX),
            )
            .non_empty("band_name", &artist.band_name);
        for (i, name) in artist.full_names.iter().enumerate() {
            issues.non_empty(&format!("full_names[{}]", i), name);
        }
        issues.into_vec()
    }
}
