//! JDB: line-delimited, id-prefixed record store
//!
//! One store per `<name>.jdb` file, held fully in memory, validated by an
//! injected [`Schema`] and projected into display [`Table`]s on request.

pub mod file;
pub mod id;
pub mod meta;
pub mod record;
pub mod schema;
pub mod store;
pub mod table;

pub use id::{id_number, make_id, RecordKey, ID_WIDTH};
pub use meta::{Meta, NoMeta};
pub use record::{Cell, Record};
pub use schema::{Issue, Issues, Schema, ValidationError};
pub use store::{Checkpoint, Jdb, JDB_EXTENSION};
pub use table::{Table, ID_HEADER};
