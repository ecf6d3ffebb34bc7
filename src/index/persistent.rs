//! Persistent extent store: a primary node → extent table plus two derived
//! orderings (by start, by end) and a cached bounds/size summary.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, ReadableTableMetadata};
use serde::Serialize;

use crate::engine::operator::TemporalOperator;
use crate::engine::record_factory::RecordFactory;
use crate::engine::registry::OperatorRegistry;
use crate::format::codec::{decode, encode, millis_from_sortable, secondary_key, sortable_millis};
use crate::graph::Triple;
use crate::types::{
    Extent, ExtentType, IndexConfig, IndexType, Node, Record, TemporalError, TemporalResult,
};

use super::bounds::Bounds;
use super::range::{Range, RangeQueryIterator};
use super::tables::{Secondary, ENDS, PRIMARY, STARTS};

/// Directory created under the index root.
pub const INDEX_DIR: &str = "temporal";

/// Database file inside [`INDEX_DIR`].
pub const INDEX_FILE: &str = "index.redb";

/// Size and bounds snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub path: String,
    pub open: bool,
    pub size: u64,
    pub bounds: Option<Bounds>,
}

/// Temporal extent store backed by redb.
///
/// Writers must be serialized by the caller; each mutating call commits its
/// own transaction.
pub struct PersistentTemporalIndex {
    dir: PathBuf,
    config: IndexConfig,
    db: Option<Database>,
    bounds: Bounds,
    size: u64,
    registry: OperatorRegistry,
}

impl PersistentTemporalIndex {
    /// Create a closed index rooted at `dir`. Fails for the memory index type.
    pub fn new(dir: impl AsRef<Path>, config: IndexConfig) -> TemporalResult<Self> {
        if config.index_type == IndexType::Memory {
            return Err(TemporalError::UnsupportedIndexType("memory".to_string()));
        }
        Ok(Self {
            dir: dir.as_ref().join(INDEX_DIR),
            config,
            db: None,
            bounds: Bounds::empty(),
            size: 0,
            registry: OperatorRegistry::new(),
        })
    }

    /// Create a closed index from `indexType` / `alwaysUseFirst` style properties.
    pub fn from_properties(
        dir: impl AsRef<Path>,
        props: &HashMap<String, String>,
    ) -> TemporalResult<Self> {
        Self::new(dir, IndexConfig::from_properties(props)?)
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Directory holding the on-disk state.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    // ==================== Lifecycle ====================

    /// Open the store and seed the bounds cache. No-op when already open.
    pub fn open(&mut self) -> TemporalResult<()> {
        if self.db.is_some() {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)?;
        let db = Database::create(self.dir.join(INDEX_FILE))?;

        let tx = db.begin_write()?;
        {
            tx.open_table(PRIMARY)?;
            tx.open_table(STARTS)?;
            tx.open_table(ENDS)?;
        }
        tx.commit()?;

        let tx = db.begin_read()?;
        let primary = tx.open_table(PRIMARY)?;
        let starts = tx.open_table(STARTS)?;
        let ends = tx.open_table(ENDS)?;

        let mut bounds = Bounds::empty();
        if let Some((k, _)) = starts.first()? {
            bounds.min_start = millis_from_sortable(k.value());
        }
        if let Some((k, _)) = starts.last()? {
            bounds.max_start = millis_from_sortable(k.value());
        }
        if let Some((k, _)) = ends.first()? {
            bounds.min_end = millis_from_sortable(k.value());
        }
        if let Some((k, _)) = ends.last()? {
            bounds.max_end = millis_from_sortable(k.value());
        }
        let size = primary.len()?;
        drop((primary, starts, ends, tx));

        log::debug!(
            "opened temporal index at {} with {} records",
            self.dir.display(),
            size
        );
        self.bounds = bounds;
        self.size = size;
        self.db = Some(db);
        Ok(())
    }

    /// Close the store. No-op when already closed.
    pub fn close(&mut self) {
        if self.db.take().is_some() {
            log::debug!("closed temporal index at {}", self.dir.display());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.db.is_none()
    }

    /// Remove every record. The index must be open.
    pub fn clear(&mut self) -> TemporalResult<()> {
        let db = self.db()?;
        let tx = db.begin_write()?;
        for table in [PRIMARY, STARTS, ENDS] {
            tx.delete_table(table)?;
            tx.open_table(table)?;
        }
        tx.commit()?;
        self.bounds = Bounds::empty();
        self.size = 0;
        log::debug!("cleared temporal index at {}", self.dir.display());
        Ok(())
    }

    /// Physically remove the on-disk state. The index must be closed.
    pub fn delete(&mut self) -> TemporalResult<()> {
        if self.db.is_some() {
            return Err(TemporalError::IndexOpen);
        }
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        self.bounds = Bounds::empty();
        self.size = 0;
        log::debug!("deleted temporal index at {}", self.dir.display());
        Ok(())
    }

    fn db(&self) -> TemporalResult<&Database> {
        self.db.as_ref().ok_or(TemporalError::IndexClosed)
    }

    // ==================== Records ====================

    /// Insert or overwrite a record. Returns `false` if the identical record
    /// is already stored.
    pub fn add(&mut self, record: &Record) -> TemporalResult<bool> {
        let key = record.node.to_key()?;
        let value = encode(&record.extent);
        let db = self.db()?;

        let tx = db.begin_write()?;
        let previous = {
            let primary = tx.open_table(PRIMARY)?;
            let found = primary.get(key.as_slice())?.map(|v| v.value().to_vec());
            found
        };
        if previous.as_deref() == Some(value.as_slice()) {
            tx.abort()?;
            return Ok(false);
        }
        {
            let mut primary = tx.open_table(PRIMARY)?;
            primary.insert(key.as_slice(), value.as_slice())?;
            for index in [Secondary::Starts, Secondary::Ends] {
                let mut table = tx.open_table(index.table())?;
                if let Some(prev) = &previous {
                    table.remove(secondary_key(index.extractor(), prev, &key).as_slice())?;
                }
                table.insert(
                    secondary_key(index.extractor(), &value, &key).as_slice(),
                    value.as_slice(),
                )?;
            }
        }
        tx.commit()?;

        self.bounds.widen(&record.extent);
        if previous.is_none() {
            self.size += 1;
        }
        log::trace!("added {} -> {}", record.node, record.extent);
        Ok(true)
    }

    /// Add many records. Returns the number actually written.
    pub fn add_all<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a Record>,
    ) -> TemporalResult<usize> {
        let mut added = 0;
        for record in records {
            if self.add(record)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Remove the record stored for `record.node`. Returns whether one existed.
    pub fn remove(&mut self, record: &Record) -> TemporalResult<bool> {
        self.remove_node(&record.node)
    }

    /// Remove whatever is stored for `node`.
    pub fn remove_node(&mut self, node: &Node) -> TemporalResult<bool> {
        let key = node.to_key()?;
        let db = self.db()?;

        let tx = db.begin_write()?;
        let previous = {
            let mut primary = tx.open_table(PRIMARY)?;
            let removed = primary.remove(key.as_slice())?.map(|v| v.value().to_vec());
            removed
        };
        let Some(prev) = previous else {
            tx.abort()?;
            return Ok(false);
        };
        for index in [Secondary::Starts, Secondary::Ends] {
            let mut table = tx.open_table(index.table())?;
            table.remove(secondary_key(index.extractor(), &prev, &key).as_slice())?;
        }
        tx.commit()?;

        self.size = self.size.saturating_sub(1);
        log::trace!("removed {}", node);
        Ok(true)
    }

    /// Point lookup by node.
    pub fn find(&self, node: &Node) -> TemporalResult<Option<Record>> {
        let key = node.to_key()?;
        let tx = self.db()?.begin_read()?;
        let primary = tx.open_table(PRIMARY)?;
        let found = primary
            .get(key.as_slice())?
            .map(|v| Record::new(node.clone(), decode(v.value())));
        Ok(found)
    }

    /// Index the extent carried by a recognized temporal triple.
    pub fn add_triple(&mut self, triple: &Triple) -> TemporalResult<bool> {
        match RecordFactory::create_record(triple)? {
            Some(record) => self.add(&record),
            None => Ok(false),
        }
    }

    /// Drop the record a recognized temporal triple had produced.
    pub fn remove_triple(&mut self, triple: &Triple) -> TemporalResult<bool> {
        match RecordFactory::create_record(triple)? {
            Some(record) => self.remove(&record),
            None => Ok(false),
        }
    }

    // ==================== Queries ====================

    /// Scan every record.
    pub fn iterator(&self) -> TemporalResult<RangeQueryIterator> {
        self.range_query(Range::UNBOUNDED, ExtentType::Any)
    }

    /// Records whose extent equals `extent`.
    pub fn query(&self, extent: &Extent) -> TemporalResult<RangeQueryIterator> {
        self.range_query(Range::exact(extent), ExtentType::Any)
    }

    /// Records inside `range` whose extent is of type `filter`.
    pub fn range_query(
        &self,
        range: Range,
        filter: ExtentType,
    ) -> TemporalResult<RangeQueryIterator> {
        RangeQueryIterator::open(
            self.db()?,
            range,
            &self.bounds,
            self.config.always_use_first,
            filter,
        )
    }

    /// Upper bound on the number of records inside `range`.
    pub fn estimate(&self, range: &Range) -> TemporalResult<u64> {
        let starts = self.count_in_range(
            Secondary::Starts,
            range.start_lo,
            range.start_hi,
            (self.bounds.min_start, self.bounds.max_start),
        )?;
        if starts == 0 {
            return Ok(0);
        }
        let ends = self.count_in_range(
            Secondary::Ends,
            range.end_lo,
            range.end_hi,
            (self.bounds.min_end, self.bounds.max_end),
        )?;
        Ok(starts.min(ends))
    }

    /// Entries of `index` with endpoint in `[lo, hi]`.
    fn count_in_range(
        &self,
        index: Secondary,
        lo: i64,
        hi: i64,
        (min, max): (i64, i64),
    ) -> TemporalResult<u64> {
        let db = self.db()?;
        if self.size == 0 || lo > hi {
            return Ok(0);
        }
        if lo <= min && hi >= max {
            return Ok(self.size);
        }
        let tx = db.begin_read()?;
        let table = tx.open_table(index.table())?;
        let seek = sortable_millis(lo);
        let mut count = 0;
        for entry in table.range::<&[u8]>(seek.as_slice()..)? {
            let (k, _) = entry?;
            if millis_from_sortable(k.value()) > hi {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    /// Number of records, or 0 when closed.
    pub fn size(&self) -> u64 {
        if self.db.is_some() {
            self.size
        } else {
            0
        }
    }

    /// Cached endpoint bounds.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            path: self.dir.display().to_string(),
            open: self.db.is_some(),
            size: self.size(),
            bounds: (self.db.is_some() && !self.bounds.is_empty()).then_some(self.bounds),
        }
    }

    // ==================== Operators ====================

    /// Populate the operator registry with every known relation.
    pub fn register(&mut self) {
        self.registry.register_all();
    }

    /// Empty the operator registry.
    pub fn unregister(&mut self) {
        self.registry.clear();
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    /// Operator for a registered relation name (full IRI or local name).
    pub fn operator(&self, name: &str) -> TemporalResult<TemporalOperator<'_>> {
        let relation = self
            .registry
            .get(name)
            .ok_or_else(|| TemporalError::UnknownRelation(name.to_string()))?;
        Ok(TemporalOperator::new(relation, self))
    }
}
