//! Storage layer
//!
//! The ledger persists through a key-value [`Store`] so the durable backend
//! is interchangeable: [`RocksStore`] for production, [`MemStore`] for
//! tests.
//!
//! # Column families (RocksDB)
//!
//! - `state` - current ledger snapshot (single key)
//! - `events` - append-only event log (key: big-endian sequence number)
//!
//! Each committed operation writes its new snapshot and its events in one
//! atomic batch; the log never holds a partial operation.

use crate::{
    error::{Error, Result},
    events::EventRecord,
    state::TokenState,
    Config,
};
use parking_lot::Mutex;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Column family names
const CF_STATE: &str = "state";
const CF_EVENTS: &str = "events";

/// Snapshot key within the state column family
const STATE_KEY: &[u8] = b"ledger";

/// Durable key-value backend for the ledger
pub trait Store: Send + Sync {
    /// Load the persisted snapshot, if any
    fn load_state(&self) -> Result<Option<TokenState>>;

    /// Sequence number of the last persisted event, if any
    fn latest_seq(&self) -> Result<Option<u64>>;

    /// Get an event by sequence number
    fn get_event(&self, seq: u64) -> Result<EventRecord>;

    /// Read up to `limit` events starting at `from_seq`, in order
    fn events_from(&self, from_seq: u64, limit: usize) -> Result<Vec<EventRecord>>;

    /// Persist a committed operation: new snapshot plus its events, atomically
    fn commit(&self, state: &TokenState, records: &[EventRecord]) -> Result<()>;
}

/// RocksDB-backed store
pub struct RocksStore {
    db: Arc<DB>,
}

impl RocksStore {
    /// Open or create the database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;
        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_STATE, Self::cf_options_state()),
            ColumnFamilyDescriptor::new(CF_EVENTS, Self::cf_options_events()),
        ];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;
        tracing::info!("Opened RocksDB at {:?}", path);

        Ok(Self { db: Arc::new(db) })
    }

    fn cf_options_state() -> Options {
        let mut opts = Options::default();
        // The snapshot is rewritten on every commit, favor speed
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_options_events() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts.set_bottommost_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }
}

impl Store for RocksStore {
    fn load_state(&self) -> Result<Option<TokenState>> {
        let cf = self.cf_handle(CF_STATE)?;
        match self.db.get_cf(cf, STATE_KEY)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn latest_seq(&self) -> Result<Option<u64>> {
        let cf = self.cf_handle(CF_EVENTS)?;
        let mut iter = self.db.iterator_cf(cf, IteratorMode::End);
        match iter.next() {
            Some(item) => {
                let (key, _) = item?;
                let bytes: [u8; 8] = key
                    .as_ref()
                    .try_into()
                    .map_err(|_| Error::Storage("Malformed event key".to_string()))?;
                Ok(Some(u64::from_be_bytes(bytes)))
            }
            None => Ok(None),
        }
    }

    fn get_event(&self, seq: u64) -> Result<EventRecord> {
        let cf = self.cf_handle(CF_EVENTS)?;
        let value = self
            .db
            .get_cf(cf, seq.to_be_bytes())?
            .ok_or_else(|| Error::Storage(format!("Event {} not found", seq)))?;
        Ok(bincode::deserialize(&value)?)
    }

    fn events_from(&self, from_seq: u64, limit: usize) -> Result<Vec<EventRecord>> {
        let cf = self.cf_handle(CF_EVENTS)?;
        let start = from_seq.to_be_bytes();
        let iter = self.db.iterator_cf(
            cf,
            IteratorMode::From(&start, rocksdb::Direction::Forward),
        );

        let mut records = Vec::new();
        for item in iter.take(limit) {
            let (_, value) = item?;
            records.push(bincode::deserialize(&value)?);
        }
        Ok(records)
    }

    fn commit(&self, state: &TokenState, records: &[EventRecord]) -> Result<()> {
        let cf_state = self.cf_handle(CF_STATE)?;
        let cf_events = self.cf_handle(CF_EVENTS)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(cf_state, STATE_KEY, bincode::serialize(state)?);
        for record in records {
            batch.put_cf(cf_events, record.seq.to_be_bytes(), bincode::serialize(record)?);
        }

        self.db.write(batch)?;
        tracing::debug!(events = records.len(), "Commit persisted");
        Ok(())
    }
}

/// In-memory store for tests
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<MemInner>,
}

#[derive(Default)]
struct MemInner {
    state: Option<Vec<u8>>,
    events: BTreeMap<u64, Vec<u8>>,
}

impl MemStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemStore {
    fn load_state(&self) -> Result<Option<TokenState>> {
        let inner = self.inner.lock();
        match &inner.state {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    fn latest_seq(&self) -> Result<Option<u64>> {
        Ok(self.inner.lock().events.keys().next_back().copied())
    }

    fn get_event(&self, seq: u64) -> Result<EventRecord> {
        let inner = self.inner.lock();
        let bytes = inner
            .events
            .get(&seq)
            .ok_or_else(|| Error::Storage(format!("Event {} not found", seq)))?;
        Ok(bincode::deserialize(bytes)?)
    }

    fn events_from(&self, from_seq: u64, limit: usize) -> Result<Vec<EventRecord>> {
        let inner = self.inner.lock();
        inner
            .events
            .range(from_seq..)
            .take(limit)
            .map(|(_, bytes)| Ok(bincode::deserialize(bytes)?))
            .collect()
    }

    fn commit(&self, state: &TokenState, records: &[EventRecord]) -> Result<()> {
        // Serialize outside the lock so a failure leaves the store untouched
        let state_bytes = bincode::serialize(state)?;
        let mut record_bytes = Vec::with_capacity(records.len());
        for record in records {
            record_bytes.push((record.seq, bincode::serialize(record)?));
        }

        let mut inner = self.inner.lock();
        inner.state = Some(state_bytes);
        for (seq, bytes) in record_bytes {
            inner.events.insert(seq, bytes);
        }
        Ok(())
    }
}
