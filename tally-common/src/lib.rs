//! # Tally Common Library
//!
//! Shared code for the Tally tools including:
//! - JDB flat-file record store (ids, schemas, metadata, table projections)
//! - Configuration loading and root folder resolution
//! - Watermark and report date parsing
//! - Error types

pub mod config;
pub mod error;
pub mod jdb;
pub mod time;

pub use error::{Error, Result};
pub use jdb::{Jdb, Record, Schema};
