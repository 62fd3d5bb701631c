//! JDB record store
//!
//! The in-memory map is the source of truth; `<name>.jdb` is a cache of it:
//!
//! ```text
//! @<count>[;<json-metadata>]
//! <id>;<json-record>
//! <id>;<json-record>
//! ```
//!
//! Records keep insertion order. `count` is the number of ids ever issued,
//! so the next insert gets `prefix + pad(count + 1)`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::file;
use super::id::{id_number, make_id, RecordKey};
use super::meta::{self, Meta, NoMeta};
use super::record::{Cell, Record};
use super::schema::{Issue, Schema, ValidationError};
use super::table::Table;
use crate::{Error, Result};

/// File extension of store files
pub const JDB_EXTENSION: &str = "jdb";

/// Store state captured by [`Jdb::checkpoint`]
#[derive(Debug, Clone)]
pub struct Checkpoint<M> {
    count: u64,
    len: usize,
    meta: Option<M>,
}

/// Flat-file record store generic over its schema and metadata type
pub struct Jdb<S: Schema, M = NoMeta> {
    name: String,
    file: PathBuf,
    prefix: String,
    count: u64,
    records: Vec<S::Record>,
    index: HashMap<String, usize>,
    schema: S,
    meta: Option<M>,
    default_meta: Option<M>,
}

impl<S, M> Jdb<S, M>
where
    S: Schema,
    M: Meta,
{
    /// Empty store persisted at `<dir>/<name>.jdb`; nothing is read yet
    pub fn new(dir: impl AsRef<Path>, name: &str, prefix: &str, schema: S) -> Self {
        Self {
            name: name.to_string(),
            file: dir.as_ref().join(format!("{}.{}", name, JDB_EXTENSION)),
            prefix: prefix.to_string(),
            count: 0,
            records: Vec::new(),
            index: HashMap::new(),
            schema,
            meta: None,
            default_meta: None,
        }
    }

    /// Start with `meta`; it is also restored whenever a load finds none
    pub fn with_meta(mut self, meta: M) -> Self {
        self.meta = Some(meta.clone());
        self.default_meta = Some(meta);
        self
    }

    /// Open a store, creating its directory and an empty file if missing
    pub async fn open(dir: impl AsRef<Path>, name: &str, prefix: &str, schema: S) -> Result<Self> {
        Self::new(dir, name, prefix, schema).prepare().await
    }

    /// [`Jdb::open`] with default metadata
    pub async fn open_with_meta(
        dir: impl AsRef<Path>,
        name: &str,
        prefix: &str,
        schema: S,
        meta: M,
    ) -> Result<Self> {
        Self::new(dir, name, prefix, schema).with_meta(meta).prepare().await
    }

    async fn prepare(mut self) -> Result<Self> {
        if !file::exists(&self.file).await {
            if let Some(dir) = self.file.parent() {
                file::create_dir(dir).await;
            }
            file::write_text(&self.file, "").await;
        }

        let contents = tokio::fs::read_to_string(&self.file).await?;
        self.load_str(&contents)?;
        info!(
            "Opened store '{}' ({} records, counter {}) from {}",
            self.name,
            self.records.len(),
            self.count,
            self.file.display()
        );
        Ok(self)
    }

    /// Validate and store a new record under the next id
    ///
    /// On failure nothing changes and the id is not consumed. A store
    /// whose counter is exhausted refuses every insert.
    pub fn insert(
        &mut self,
        draft: <S::Record as Record>::Draft,
    ) -> std::result::Result<&S::Record, ValidationError> {
        let Some(next) = self.count.checked_add(1) else {
            return Err(ValidationError {
                issues: vec![Issue::new("id", format!("store '{}' has no ids left", self.name))],
            });
        };
        let id = make_id(&self.prefix, next);
        let record = self.schema.safe_parse(S::Record::assemble(id.clone(), draft))?;
        debug_assert_eq!(record.id(), id);
        debug_assert!(!self.index.contains_key(&id));

        let position = self.records.len();
        self.count = next;
        self.index.insert(id, position);
        self.records.push(record);
        Ok(&self.records[position])
    }

    /// Record by full id or bare counter value
    pub fn retrieve<'k>(&self, key: impl Into<RecordKey<'k>>) -> Option<&S::Record> {
        let id = key.into().to_id(&self.prefix);
        self.index.get(&id).map(|&position| &self.records[position])
    }

    /// Whether a record exists for an id or counter value
    pub fn holds<'k>(&self, key: impl Into<RecordKey<'k>>) -> bool {
        self.index.contains_key(&key.into().to_id(&self.prefix))
    }

    /// Modify a record in place
    ///
    /// The modified copy is re-validated; it replaces the stored record only
    /// if it passes and kept its id.
    pub fn update<'k, F>(&mut self, key: impl Into<RecordKey<'k>>, f: F) -> Result<&S::Record>
    where
        F: FnOnce(&mut S::Record),
    {
        let id = key.into().to_id(&self.prefix);
        let position = *self
            .index
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("{} in store '{}'", id, self.name)))?;

        let mut candidate = self.records[position].clone();
        f(&mut candidate);
        if candidate.id() != id {
            return Err(Error::InvalidInput(format!(
                "update of {} attempted to change its id to {}",
                id,
                candidate.id()
            )));
        }

        self.records[position] = self.schema.parse(candidate)?;
        Ok(&self.records[position])
    }

    /// Id of the first record whose `field` equals `value`
    pub fn find_by(&self, field: <S::Record as Record>::Field, value: impl Into<Cell>) -> Option<&str> {
        let value = value.into();
        self.records
            .iter()
            .find(|record| record.cell(field) == value)
            .map(|record| record.id())
    }

    /// Id of the first record matching `predicate`
    pub fn find_through<P>(&self, mut predicate: P) -> Option<&str>
    where
        P: FnMut(&S::Record) -> bool,
    {
        self.records
            .iter()
            .find(|record| predicate(record))
            .map(|record| record.id())
    }

    /// `(id, record)` pairs in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &S::Record)> + '_ {
        self.records.iter().map(|record| (record.id(), record))
    }

    /// Ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(|record| record.id())
    }

    /// Records in insertion order
    pub fn values(&self) -> impl Iterator<Item = &S::Record> + '_ {
        self.records.iter()
    }

    /// Table of the given fields, with a leading ID column
    pub fn create_table(&self, title: &str, fields: &[<S::Record as Record>::Field]) -> Table {
        Table::project(title, self.records.iter(), fields)
    }

    /// Table of the record type's default columns
    pub fn full_table(&self) -> Table {
        self.create_table(
            <S::Record as Record>::TABLE_TITLE,
            <S::Record as Record>::TABLE_FIELDS,
        )
    }

    pub fn meta(&self) -> Option<&M> {
        self.meta.as_ref()
    }

    /// Metadata for modification, created from its default if absent
    pub fn meta_mut(&mut self) -> &mut M {
        self.meta.get_or_insert_with(M::default)
    }

    pub fn set_meta(&mut self, meta: Option<M>) {
        self.meta = meta;
    }

    /// Canonical metadata JSON, `""` when there is nothing to store
    pub fn stringify_meta_data(&self) -> String {
        meta::stringify(self.meta.as_ref())
    }

    /// Capture the counter, record count and metadata
    pub fn checkpoint(&self) -> Checkpoint<M> {
        Checkpoint {
            count: self.count,
            len: self.records.len(),
            meta: self.meta.clone(),
        }
    }

    /// Drop every record inserted since `checkpoint` and restore its
    /// counter and metadata
    ///
    /// In-place updates made in between are not undone.
    pub fn rollback(&mut self, checkpoint: Checkpoint<M>) {
        if checkpoint.len > self.records.len() {
            warn!(
                "Store '{}' shrank below its checkpoint ({} < {}); rollback skipped",
                self.name,
                self.records.len(),
                checkpoint.len
            );
            return;
        }
        for record in self.records.drain(checkpoint.len..) {
            self.index.remove(record.id());
        }
        self.count = checkpoint.count;
        self.meta = checkpoint.meta;
    }

    /// Persisted form of the whole store
    pub fn serialize(&self) -> Result<String> {
        let mut contents = format!("@{}", self.count);
        let meta = self.stringify_meta_data();
        if !meta.is_empty() {
            contents.push(';');
            contents.push_str(&meta);
        }
        for record in &self.records {
            contents.push('\n');
            contents.push_str(record.id());
            contents.push(';');
            contents.push_str(&serde_json::to_string(record)?);
        }
        Ok(contents)
    }

    /// Replace the in-memory state with the parsed `contents`
    ///
    /// Nothing changes if any line is malformed.
    pub fn load_str(&mut self, contents: &str) -> Result<()> {
        if contents.is_empty() {
            if self.count != 0 {
                self.count = 0;
                self.records.clear();
                self.index.clear();
                self.meta = self.default_meta.clone();
            }
            return Ok(());
        }

        let mut lines = contents.split('\n');
        let header = lines.next().unwrap_or_default().trim_end_matches('\r');
        let header = header.strip_prefix('@').ok_or_else(|| {
            Error::Format(format!("{}: header line must start with '@'", self.name))
        })?;
        let (counter, meta_json) = match header.split_once(';') {
            Some((counter, meta_json)) => (counter, Some(meta_json)),
            None => (header, None),
        };
        let meta = match meta_json {
            Some(json) if !json.trim().is_empty() => Some(serde_json::from_str::<M>(json)?),
            _ => self.default_meta.clone(),
        };

        let mut records = Vec::new();
        let mut index = HashMap::new();
        let mut highest = 0;
        for (offset, line) in lines.enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let line_no = offset + 2;
            let (id, json) = line.split_once(';').ok_or_else(|| {
                Error::Format(format!("{}: line {} has no ';' separator", self.name, line_no))
            })?;
            let record: S::Record = serde_json::from_str(json).map_err(|e| {
                Error::Format(format!("{}: line {}: {}", self.name, line_no, e))
            })?;
            if record.id() != id {
                return Err(Error::Format(format!(
                    "{}: line {} is keyed {} but holds record {}",
                    self.name,
                    line_no,
                    id,
                    record.id()
                )));
            }
            if index.contains_key(id) {
                return Err(Error::Format(format!(
                    "{}: line {} repeats id {}",
                    self.name, line_no, id
                )));
            }
            if let Some(n) = id_number(&self.prefix, id) {
                highest = highest.max(n);
            }
            index.insert(id.to_string(), records.len());
            records.push(record);
        }

        let count = match counter.trim().parse::<u64>() {
            Ok(n) if n >= highest => n,
            Ok(n) => {
                warn!(
                    "{}: header counter {} is behind id {}; using {}",
                    self.name, n, highest, highest
                );
                highest
            }
            Err(_) => {
                warn!(
                    "{}: unreadable header counter '{}'; using {}",
                    self.name, counter, highest
                );
                highest
            }
        };

        self.count = count;
        self.records = records;
        self.index = index;
        self.meta = meta;
        Ok(())
    }

    /// Write the store to its file; failures are logged and return `false`
    pub async fn update_external(&self) -> bool {
        let contents = match self.serialize() {
            Ok(contents) => contents,
            Err(e) => {
                error!("Failed to serialize store '{}': {}", self.name, e);
                return false;
            }
        };
        file::write_text(&self.file, &contents).await
    }

    /// Reload the store from its file; failures are logged and return `false`
    pub async fn update_internal(&mut self) -> bool {
        let Some(contents) = file::read_text(&self.file).await else {
            return false;
        };
        match self.load_str(&contents) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to load {}: {}", self.file.display(), e);
                false
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn filename(&self) -> &Path {
        &self.file
    }

    /// Number of ids ever issued
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jdb::schema::Issues;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Band {
        id: String,
        band_name: String,
        full_names: Vec<String>,
    }

    struct BandDraft {
        band_name: &'static str,
        full_names: &'static [&'static str],
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum BandField {
        BandName,
        FullNames,
    }

    impl Record for Band {
        type Draft = BandDraft;
        type Field = BandField;
        const TABLE_TITLE: &'static str = "Bands";
        const TABLE_FIELDS: &'static [BandField] = &[BandField::BandName, BandField::FullNames];

        fn id(&self) -> &str {
            &self.id
        }

        fn assemble(id: String, draft: BandDraft) -> Self {
            Self {
                id,
                band_name: draft.band_name.to_string(),
                full_names: draft.full_names.iter().map(|n| n.to_string()).collect(),
            }
        }

        fn label(field: BandField) -> &'static str {
            match field {
                BandField::BandName => "Band Name",
                BandField::FullNames => "Full Names",
            }
        }

        fn cell(&self, field: BandField) -> Cell {
            match field {
                BandField::BandName => Cell::from(&self.band_name),
                BandField::FullNames => Cell::from(self.full_names.clone()),
            }
        }
    }

    struct BandSchema;

    impl Schema for BandSchema {
        type Record = Band;

        fn issues(&self, band: &Band) -> Vec<Issue> {
            let mut issues = Issues::new();
            issues.non_empty("band_name", &band.band_name);
            issues.into_vec()
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Watermark {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<String>,
    }

    fn draft(band_name: &'static str, full_names: &'static [&'static str]) -> BandDraft {
        BandDraft {
            band_name,
            full_names,
        }
    }

    fn store() -> Jdb<BandSchema> {
        Jdb::new("/unused", "artists", "ART", BandSchema)
    }

    fn seeded() -> Jdb<BandSchema> {
        let mut jdb = store();
        jdb.insert(draft("NF", &["Nathan Feuerstein"])).unwrap();
        jdb.insert(draft("Eminem", &["Marshall Mathers"])).unwrap();
        jdb.insert(draft("Nach", &["Ignacio Fornés Olmo"])).unwrap();
        jdb
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut jdb = store();
        let first = jdb.insert(draft("NF", &["Nathan Feuerstein"])).unwrap().id.clone();
        let second = jdb.insert(draft("Eminem", &[])).unwrap().id.clone();
        assert_eq!(first, "ART000001");
        assert_eq!(second, "ART000002");
        assert_eq!(jdb.count(), 2);
    }

    #[test]
    fn test_kth_insert_gets_kth_id() {
        let mut jdb = store();
        for k in 1..=25u64 {
            let id = jdb.insert(draft("Band", &[])).unwrap().id.clone();
            assert_eq!(id, make_id("ART", k));
        }
    }

    #[test]
    fn test_failed_insert_leaves_store_untouched() {
        let mut jdb = seeded();
        let err = jdb.insert(draft("   ", &[])).unwrap_err();
        assert_eq!(err.issues[0].path, "band_name");
        assert_eq!(jdb.count(), 3);
        assert_eq!(jdb.len(), 3);

        // Rejected insert does not consume its number
        let id = jdb.insert(draft("Lecrae", &[])).unwrap().id.clone();
        assert_eq!(id, "ART000004");
    }

    #[test]
    fn test_retrieve_by_number_and_id() {
        let jdb = seeded();
        assert_eq!(jdb.retrieve(1u64).unwrap().band_name, "NF");
        assert_eq!(jdb.retrieve("ART000002").unwrap().band_name, "Eminem");
        assert!(jdb.retrieve(99u64).is_none());
        assert!(jdb.holds(3u64));
        assert!(!jdb.holds(0u64));
        assert!(!jdb.holds("RCH000001"));
    }

    #[test]
    fn test_find_by_first_match_in_insertion_order() {
        let mut jdb = seeded();
        jdb.insert(draft("NF", &["Someone Else"])).unwrap();

        assert_eq!(jdb.find_by(BandField::BandName, "NF"), Some("ART000001"));
        assert_eq!(jdb.find_by(BandField::BandName, "Nobody"), None);
    }

    #[test]
    fn test_find_through_predicate() {
        let jdb = seeded();
        let found = jdb.find_through(|band| band.full_names.iter().any(|n| n.starts_with("Ignacio")));
        assert_eq!(found, Some("ART000003"));
        assert_eq!(jdb.find_through(|_| false), None);
        assert_eq!(jdb.find_through(|_| true), Some("ART000001"));
    }

    #[test]
    fn test_iterators_are_restartable() {
        let jdb = seeded();
        let ids: Vec<&str> = jdb.ids().collect();
        assert_eq!(ids, vec!["ART000001", "ART000002", "ART000003"]);
        assert_eq!(jdb.ids().count(), 3);
        assert_eq!(jdb.values().nth(1).unwrap().band_name, "Eminem");
        let (id, band) = jdb.entries().last().unwrap();
        assert_eq!(id, band.id);
    }

    #[test]
    fn test_update_revalidates() {
        let mut jdb = seeded();
        jdb.update(1u64, |band| band.band_name = "NF Real Music".to_string()).unwrap();
        assert_eq!(jdb.retrieve(1u64).unwrap().band_name, "NF Real Music");

        let err = jdb.update(1u64, |band| band.band_name.clear()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(jdb.retrieve(1u64).unwrap().band_name, "NF Real Music");

        let err = jdb.update(2u64, |band| band.id = "ART000009".to_string()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(jdb.holds(2u64));

        assert!(matches!(jdb.update(42u64, |_| {}), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_create_table_prepends_id() {
        let jdb = seeded();
        let table = jdb.create_table("Artists", &[BandField::BandName]);
        assert_eq!(table.headers(), ["ID", "Band Name"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0], vec![Cell::from("ART000001"), Cell::from("NF")]);
    }

    #[test]
    fn test_full_table_uses_declared_columns() {
        let table = seeded().full_table();
        assert_eq!(table.title(), "Bands");
        assert_eq!(table.headers(), ["ID", "Band Name", "Full Names"]);
        assert_eq!(
            table.rows()[2][2],
            Cell::TextList(vec!["Ignacio Fornés Olmo".to_string()])
        );
    }

    #[test]
    fn test_serialize_format() {
        let mut jdb = store();
        jdb.insert(draft("NF", &["Nathan Feuerstein"])).unwrap();
        let text = jdb.serialize().unwrap();
        assert_eq!(
            text,
            "@1\nART000001;{\"id\":\"ART000001\",\"band_name\":\"NF\",\"full_names\":[\"Nathan Feuerstein\"]}"
        );
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_serialize_empty_store() {
        assert_eq!(store().serialize().unwrap(), "@0");
    }

    #[test]
    fn test_round_trip_with_metadata() {
        let mut original: Jdb<BandSchema, Watermark> =
            Jdb::new("/unused", "artists", "ART", BandSchema).with_meta(Watermark::default());
        original.insert(draft("NF", &["Nathan Feuerstein"])).unwrap();
        original.insert(draft("Semi;Colon", &["a;b"])).unwrap();
        original.meta_mut().from = Some("2023-01-01".to_string());

        let text = original.serialize().unwrap();
        assert!(text.starts_with("@2;{\"from\":\"2023-01-01\"}\n"));

        let mut loaded: Jdb<BandSchema, Watermark> = Jdb::new("/unused", "artists", "ART", BandSchema);
        loaded.load_str(&text).unwrap();

        assert_eq!(loaded.count(), original.count());
        assert_eq!(loaded.meta(), original.meta());
        let a: Vec<&Band> = loaded.values().collect();
        let b: Vec<&Band> = original.values().collect();
        assert_eq!(a, b);
        assert_eq!(loaded.retrieve(2u64).unwrap().band_name, "Semi;Colon");
    }

    #[test]
    fn test_load_is_idempotent() {
        let text = seeded().serialize().unwrap();
        let mut jdb = store();
        jdb.load_str(&text).unwrap();
        let first: Vec<Band> = jdb.values().cloned().collect();
        jdb.load_str(&text).unwrap();
        let second: Vec<Band> = jdb.values().cloned().collect();
        assert_eq!(first, second);
        assert_eq!(jdb.count(), 3);
    }

    #[test]
    fn test_load_empty_resets_only_nonzero_counter() {
        let mut jdb = seeded();
        jdb.load_str("").unwrap();
        assert_eq!(jdb.count(), 0);
        assert!(jdb.is_empty());

        let mut fresh = store();
        fresh.load_str("").unwrap();
        assert_eq!(fresh.count(), 0);
    }

    #[test]
    fn test_load_keeps_counter_ahead_of_records() {
        // Counter may exceed the records held; ids are never reused
        let mut jdb = store();
        jdb.load_str("@7\nART000002;{\"id\":\"ART000002\",\"band_name\":\"NF\",\"full_names\":[]}")
            .unwrap();
        assert_eq!(jdb.count(), 7);
        assert_eq!(jdb.insert(draft("Next", &[])).unwrap().id, "ART000008");
    }

    #[test]
    fn test_load_repairs_corrupt_counter() {
        let mut jdb = store();
        jdb.load_str("@x\nART000005;{\"id\":\"ART000005\",\"band_name\":\"NF\",\"full_names\":[]}")
            .unwrap();
        assert_eq!(jdb.count(), 5);

        jdb.load_str("@1\nART000004;{\"id\":\"ART000004\",\"band_name\":\"NF\",\"full_names\":[]}")
            .unwrap();
        assert_eq!(jdb.count(), 4);
    }

    #[test]
    fn test_exhausted_counter_refuses_insert() {
        let mut jdb = store();
        jdb.load_str(&format!("@{}", u64::MAX)).unwrap();

        let err = jdb.insert(draft("NF", &[])).unwrap_err();
        assert_eq!(err.issues[0].path, "id");
        assert_eq!(jdb.count(), u64::MAX);
        assert!(jdb.is_empty());
    }

    #[test]
    fn test_malformed_load_leaves_state_untouched() {
        let mut jdb = seeded();
        let before = jdb.serialize().unwrap();

        assert!(matches!(jdb.load_str("ART000001;{}"), Err(Error::Format(_))));
        assert!(jdb.load_str("@1\nART000001;{not json").is_err());
        assert!(jdb
            .load_str("@1\nART000001;{\"id\":\"ART000002\",\"band_name\":\"NF\",\"full_names\":[]}")
            .is_err());
        assert!(jdb.load_str("@1\nno separator").is_err());

        assert_eq!(jdb.serialize().unwrap(), before);
    }

    #[test]
    fn test_load_without_meta_restores_default() {
        let mut jdb: Jdb<BandSchema, Watermark> = Jdb::new("/unused", "sales", "ART", BandSchema)
            .with_meta(Watermark {
                from: Some("0-0-0".to_string()),
            });
        jdb.meta_mut().from = Some("2024-01-01".to_string());
        jdb.load_str("@0").unwrap();
        assert_eq!(jdb.meta().unwrap().from.as_deref(), Some("0-0-0"));
    }

    #[test]
    fn test_checkpoint_rollback() {
        let mut jdb: Jdb<BandSchema, Watermark> =
            Jdb::new("/unused", "artists", "ART", BandSchema).with_meta(Watermark::default());
        jdb.insert(draft("NF", &[])).unwrap();
        let checkpoint = jdb.checkpoint();

        jdb.insert(draft("Eminem", &[])).unwrap();
        jdb.meta_mut().from = Some("2023-01-01".to_string());
        jdb.rollback(checkpoint);

        assert_eq!(jdb.count(), 1);
        assert_eq!(jdb.len(), 1);
        assert!(!jdb.holds(2u64));
        assert_eq!(jdb.meta().unwrap().from, None);
        assert_eq!(jdb.insert(draft("Eminem", &[])).unwrap().id, "ART000002");
    }

    #[tokio::test]
    async fn test_open_creates_file_and_persists() {
        let dir = TempDir::new().unwrap();
        let jdb_dir = dir.path().join("jdb");

        let mut jdb = Jdb::<BandSchema>::open(&jdb_dir, "artists", "ART", BandSchema)
            .await
            .unwrap();
        assert!(jdb.filename().exists());
        assert!(jdb.is_empty());

        jdb.insert(draft("NF", &["Nathan Feuerstein"])).unwrap();
        assert!(jdb.update_external().await);

        let reopened = Jdb::<BandSchema>::open(&jdb_dir, "artists", "ART", BandSchema)
            .await
            .unwrap();
        assert_eq!(reopened.count(), 1);
        assert_eq!(reopened.retrieve(1u64).unwrap().band_name, "NF");
    }

    #[tokio::test]
    async fn test_update_internal_reports_failures() {
        let dir = TempDir::new().unwrap();
        let mut jdb = Jdb::<BandSchema>::new(dir.path().join("missing"), "artists", "ART", BandSchema);
        assert!(!jdb.update_internal().await);
        assert!(!jdb.update_external().await);

        let mut ok = Jdb::<BandSchema>::new(dir.path(), "artists", "ART", BandSchema);
        std::fs::write(ok.filename(), "@0\nbroken").unwrap();
        assert!(!ok.update_internal().await);
    }

    #[tokio::test]
    async fn test_update_internal_twice_same_state() {
        let dir = TempDir::new().unwrap();
        let mut jdb = Jdb::<BandSchema>::new(dir.path(), "artists", "ART", BandSchema);
        jdb.insert(draft("NF", &[])).unwrap();
        jdb.insert(draft("Nach", &[])).unwrap();
        assert!(jdb.update_external().await);

        assert!(jdb.update_internal().await);
        let first = jdb.serialize().unwrap();
        assert!(jdb.update_internal().await);
        assert_eq!(jdb.serialize().unwrap(), first);
    }
}
