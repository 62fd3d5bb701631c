//! The three application stores, opened together

use std::path::Path;
use std::str::FromStr;

use tally_common::jdb::{Jdb, Table};
use tracing::{error, info};

use crate::models::{
    ArtistSchema, ArtistStore, ReachSchema, ReachStore, SaleSchema, SalesMeta, SalesStore,
    ARTISTS_STORE, ARTIST_PREFIX, REACH_PREFIX, REACH_STORE, SALES_STORE, SALE_PREFIX,
};

/// Store selector accepted by `--show` and `--export`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreName {
    Artists,
    Reach,
    Sales,
}

impl FromStr for StoreName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "artist" | "artists" => Ok(StoreName::Artists),
            "reach" | "reaches" => Ok(StoreName::Reach),
            "sale" | "sales" => Ok(StoreName::Sales),
            other => Err(format!("Unknown jdb: {}", other)),
        }
    }
}

pub struct Stores {
    pub artists: ArtistStore,
    pub sales: SalesStore,
    pub reach: ReachStore,
}

impl Stores {
    /// Open (and create if missing) every store under `jdb_dir`
    pub async fn open(jdb_dir: &Path) -> tally_common::Result<Self> {
        let artists: ArtistStore = Jdb::open(jdb_dir, ARTISTS_STORE, ARTIST_PREFIX, ArtistSchema).await?;
        let sales: SalesStore = Jdb::open_with_meta(
            jdb_dir,
            SALES_STORE,
            SALE_PREFIX,
            SaleSchema,
            SalesMeta::initial(),
        )
        .await?;
        let reach: ReachStore = Jdb::open(jdb_dir, REACH_STORE, REACH_PREFIX, ReachSchema).await?;

        info!(
            "Stores ready: {} artists, {} sales, {} reach records",
            artists.len(),
            sales.len(),
            reach.len()
        );
        Ok(Self {
            artists,
            sales,
            reach,
        })
    }

    /// Persist one store by name; unknown names are logged and return `false`
    pub async fn export(&self, name: &str) -> bool {
        match name.parse::<StoreName>() {
            Ok(StoreName::Artists) => self.artists.update_external().await,
            Ok(StoreName::Reach) => self.reach.update_external().await,
            Ok(StoreName::Sales) => self.sales.update_external().await,
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    /// Default table of one store by name
    pub fn full_table(&self, name: StoreName) -> Table {
        match name {
            StoreName::Artists => self.artists.full_table(),
            StoreName::Reach => self.reach.full_table(),
            StoreName::Sales => self.sales.full_table(),
        }
    }
}
