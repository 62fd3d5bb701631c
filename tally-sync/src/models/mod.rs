//! Record types of the three stores

pub mod artists;
pub mod reach;
pub mod sales;

pub use artists::{Artist, ArtistField, ArtistSchema, ArtistStore, NewArtist, ARTISTS_STORE, ARTIST_PREFIX};
pub use reach::{NewReach, Reach, ReachField, ReachSchema, ReachStore, REACH_PREFIX, REACH_STORE};
pub use sales::{
    NewSale, Release, Sale, SaleField, SaleSchema, SalesMeta, SalesStore, SALES_STORE, SALE_PREFIX,
};
