//! Record store
//!
//! The `RecordStore` owns the ordered record collection and mirrors it into
//! two durable slots:
//! - the primary slot, rewritten whole on every persist
//! - the backup slot, a verbatim copy of the primary taken right after it
//!   is written
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = RecordStore::new(Box::new(SqliteKv::open(&path)?), meter);
//! store.load()?;           // hydrate, or seed on first run
//!
//! store.append(record);
//! store.persist()?;        // caller persists after every mutation
//! ```
//!
//! A crash between the two slot writes leaves the backup one save behind.
//! There is no atomic rename or write-ahead log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::meter::{SharedMeter, Timing};
use crate::models::ContentRecord;
use crate::seed::default_records;
use crate::storage::{
    KeyValueStore, StorageError, StorageResult, BACKUP_SLOT, PRIMARY_SLOT,
};
use crate::transfer::parse_content;
use crate::DATA_VERSION;

/// What `load` found in the primary slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Records were read from the primary slot
    Loaded(usize),
    /// The primary slot was empty; the default set was written
    Seeded(usize),
}

/// Shape written into both slots
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotPayload<'a> {
    content: &'a [ContentRecord],
    version: &'static str,
    last_backup: DateTime<Utc>,
}

/// Envelope fields read back alongside the records
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SlotHeader {
    version: Option<String>,
    last_backup: Option<DateTime<Utc>>,
}

/// Ordered collection of records backed by durable slots
pub struct RecordStore {
    records: Vec<ContentRecord>,
    slots: Box<dyn KeyValueStore>,
    meter: SharedMeter,
    /// Set when the primary slot could not be parsed; persisting would
    /// overwrite the backup with the in-memory collection
    detached: bool,
    last_backup: Option<DateTime<Utc>>,
}

impl RecordStore {
    /// Create an empty store over `slots`; call [`load`](Self::load) next
    pub fn new(slots: Box<dyn KeyValueStore>, meter: SharedMeter) -> Self {
        Self {
            records: Vec::new(),
            slots,
            meter,
            detached: false,
            last_backup: None,
        }
    }

    // ==================== Durability ====================

    /// Hydrate from the primary slot, or seed the default set if it is empty
    ///
    /// If the slot holds data that cannot be parsed, the in-memory
    /// collection is left untouched and the store detaches from its slots
    /// until [`restore_backup`](Self::restore_backup) or
    /// [`reset`](Self::reset) succeeds.
    pub fn load(&mut self) -> StorageResult<LoadOutcome> {
        let _timing = Timing::start(&self.meter, "store.load");

        let Some(text) = self.slots.get(PRIMARY_SLOT)? else {
            self.records = default_records();
            self.detached = false;
            self.persist()?;
            tracing::info!(count = self.records.len(), "Seeded default records");
            return Ok(LoadOutcome::Seeded(self.records.len()));
        };

        match decode_slot(&text) {
            Ok((records, header)) => {
                if let Some(ref version) = header.version {
                    if version != DATA_VERSION {
                        tracing::warn!(
                            found = %version,
                            expected = DATA_VERSION,
                            "Slot version differs; loading as-is"
                        );
                    }
                }
                self.records = records;
                self.last_backup = header.last_backup;
                self.detached = false;
                tracing::info!(
                    count = self.records.len(),
                    location = %self.slots.location(),
                    "Loaded records"
                );
                Ok(LoadOutcome::Loaded(self.records.len()))
            }
            Err(e) => {
                self.detached = true;
                tracing::error!(error = %e, "Primary slot is unreadable; store detached");
                Err(StorageError::InvalidFormat {
                    key: PRIMARY_SLOT.to_string(),
                    details: e.to_string(),
                })
            }
        }
    }

    /// Write the collection to the primary slot, then copy it to the backup
    pub fn persist(&mut self) -> StorageResult<()> {
        let _timing = Timing::start(&self.meter, "store.persist");

        if self.detached {
            return Err(StorageError::Detached);
        }

        let now = Utc::now();
        let payload = SlotPayload {
            content: &self.records,
            version: DATA_VERSION,
            last_backup: now,
        };
        let text = serde_json::to_string(&payload)?;

        self.slots.set(PRIMARY_SLOT, &text)?;

        let written = self
            .slots
            .get(PRIMARY_SLOT)?
            .ok_or_else(|| StorageError::MissingSlot {
                key: PRIMARY_SLOT.to_string(),
            })?;
        self.slots.set(BACKUP_SLOT, &written)?;

        self.last_backup = Some(now);
        tracing::debug!(count = self.records.len(), "Persisted records");
        Ok(())
    }

    /// Replace the collection with the backup slot's content and persist it
    pub fn restore_backup(&mut self) -> StorageResult<usize> {
        let _timing = Timing::start(&self.meter, "store.restore_backup");

        let text = self
            .slots
            .get(BACKUP_SLOT)?
            .ok_or_else(|| StorageError::MissingSlot {
                key: BACKUP_SLOT.to_string(),
            })?;
        let (records, _) = decode_slot(&text).map_err(|e| StorageError::InvalidFormat {
            key: BACKUP_SLOT.to_string(),
            details: e.to_string(),
        })?;

        self.records = records;
        self.detached = false;
        self.persist()?;

        tracing::info!(count = self.records.len(), "Restored records from backup");
        Ok(self.records.len())
    }

    /// Drop both slots and start over from the default set
    pub fn reset(&mut self) -> StorageResult<usize> {
        let _timing = Timing::start(&self.meter, "store.reset");

        self.slots.remove(PRIMARY_SLOT)?;
        self.slots.remove(BACKUP_SLOT)?;
        self.records = default_records();
        self.detached = false;
        self.persist()?;

        tracing::info!(count = self.records.len(), "Reset to default records");
        Ok(self.records.len())
    }

    /// True after a failed load, until a restore or reset
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Time of the last successful persist (or the one recorded in the slot)
    pub fn last_backup(&self) -> Option<DateTime<Utc>> {
        self.last_backup
    }

    /// Where the slots live
    pub fn location(&self) -> String {
        self.slots.location()
    }

    // ==================== Collection ====================

    /// All records, in insertion order
    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record with `id`
    pub fn get(&self, id: &str) -> Option<&ContentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn append(&mut self, record: ContentRecord) {
        self.records.push(record);
    }

    /// Append many records in order; no id collision checks
    pub fn extend(&mut self, records: impl IntoIterator<Item = ContentRecord>) {
        self.records.extend(records);
    }

    /// Rewrite every record with `id` in place; returns how many were touched
    pub fn update_each(&mut self, id: &str, mut f: impl FnMut(&mut ContentRecord)) -> usize {
        let mut touched = 0;
        for record in self.records.iter_mut().filter(|r| r.id == id) {
            f(record);
            touched += 1;
        }
        touched
    }

    /// Remove every record with `id`; returns how many were removed
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        before - self.records.len()
    }
}

fn decode_slot(text: &str) -> serde_json::Result<(Vec<ContentRecord>, SlotHeader)> {
    let records = parse_content(text)?;
    let header = serde_json::from_str::<SlotHeader>(text).unwrap_or_default();
    Ok((records, header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter::{MemoryMeter, NoopMeter};
    use crate::models::{ContentType, RecordDraft};
    use crate::storage::{MemoryKv, SqliteKv};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Slot backend whose writes can be made to fail
    #[derive(Clone, Default)]
    struct FlakyKv {
        inner: Arc<Mutex<MemoryKv>>,
        fail_writes: Arc<Mutex<bool>>,
    }

    impl FlakyKv {
        fn set_failing(&self, failing: bool) {
            *self.fail_writes.lock().unwrap() = failing;
        }

        fn raw(&self, key: &str) -> Option<String> {
            self.inner.lock().unwrap().get(key).unwrap()
        }

        fn put(&self, key: &str, value: &str) {
            self.inner.lock().unwrap().set(key, value).unwrap();
        }
    }

    impl KeyValueStore for FlakyKv {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.lock().unwrap().get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
            if *self.fail_writes.lock().unwrap() {
                return Err(StorageError::DiskFull {
                    path: "flaky".into(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "No space left on device"),
                });
            }
            self.inner.lock().unwrap().set(key, value)
        }

        fn remove(&mut self, key: &str) -> StorageResult<()> {
            self.inner.lock().unwrap().remove(key)
        }

        fn location(&self) -> String {
            "flaky".to_string()
        }
    }

    fn store_over(kv: FlakyKv) -> RecordStore {
        RecordStore::new(Box::new(kv), Arc::new(NoopMeter))
    }

    fn sample(id: &str) -> ContentRecord {
        ContentRecord::from_draft(
            id.to_string(),
            ContentType::Advice,
            RecordDraft::new(
                ContentType::Advice,
                "Sleep well",
                "Adults need seven or more hours",
                "Dr. Test",
            ),
        )
    }

    #[test]
    fn test_load_seeds_empty_slots() {
        let kv = FlakyKv::default();
        let mut store = store_over(kv.clone());

        assert_eq!(store.load().unwrap(), LoadOutcome::Seeded(5));
        assert_eq!(store.len(), 5);
        assert!(kv.raw(PRIMARY_SLOT).is_some());
        assert_eq!(kv.raw(PRIMARY_SLOT), kv.raw(BACKUP_SLOT));
        assert!(store.last_backup().is_some());
    }

    #[test]
    fn test_load_reads_existing_slot() {
        let kv = FlakyKv::default();
        {
            let mut store = store_over(kv.clone());
            store.load().unwrap();
            store.append(sample("extra"));
            store.persist().unwrap();
        }

        let mut store = store_over(kv);
        assert_eq!(store.load().unwrap(), LoadOutcome::Loaded(6));
        assert_eq!(store.records().last().unwrap().id, "extra");
    }

    #[test]
    fn test_load_accepts_bare_list() {
        let kv = FlakyKv::default();
        kv.put(
            PRIMARY_SLOT,
            &serde_json::to_string(&vec![sample("a"), sample("b")]).unwrap(),
        );

        let mut store = store_over(kv);
        assert_eq!(store.load().unwrap(), LoadOutcome::Loaded(2));
        assert!(store.last_backup().is_none());
    }

    #[test]
    fn test_slot_payload_shape() {
        let kv = FlakyKv::default();
        let mut store = store_over(kv.clone());
        store.load().unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&kv.raw(PRIMARY_SLOT).unwrap()).unwrap();
        assert_eq!(value["version"], "1.0.0");
        assert!(value["lastBackup"].is_string());
        assert_eq!(value["content"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_corrupt_primary_detaches_and_keeps_backup() {
        let kv = FlakyKv::default();
        {
            let mut store = store_over(kv.clone());
            store.load().unwrap();
        }
        let good_backup = kv.raw(BACKUP_SLOT).unwrap();
        kv.put(PRIMARY_SLOT, "{not json");

        let mut store = store_over(kv.clone());
        let err = store.load().unwrap_err();
        assert!(matches!(err, StorageError::InvalidFormat { .. }));
        assert!(store.is_detached());

        store.append(sample("in-memory"));
        assert!(matches!(store.persist(), Err(StorageError::Detached)));
        assert_eq!(kv.raw(BACKUP_SLOT).unwrap(), good_backup);

        assert_eq!(store.restore_backup().unwrap(), 5);
        assert!(!store.is_detached());
        assert_eq!(kv.raw(PRIMARY_SLOT), kv.raw(BACKUP_SLOT));
    }

    #[test]
    fn test_restore_without_backup() {
        let mut store = store_over(FlakyKv::default());
        let err = store.restore_backup().unwrap_err();
        assert!(matches!(err, StorageError::MissingSlot { .. }));
    }

    #[test]
    fn test_reset_reseeds() {
        let kv = FlakyKv::default();
        let mut store = store_over(kv.clone());
        store.load().unwrap();
        store.remove("1");
        store.persist().unwrap();

        assert_eq!(store.reset().unwrap(), 5);
        assert!(store.contains("1"));
        assert_eq!(kv.raw(PRIMARY_SLOT), kv.raw(BACKUP_SLOT));
    }

    #[test]
    fn test_failed_write_leaves_memory_intact() {
        let kv = FlakyKv::default();
        let mut store = store_over(kv.clone());
        store.load().unwrap();
        let saved = kv.raw(PRIMARY_SLOT);

        kv.set_failing(true);
        store.append(sample("unsaved"));
        let err = store.persist().unwrap_err();

        assert!(matches!(err, StorageError::DiskFull { .. }));
        assert!(store.contains("unsaved"));
        assert_eq!(kv.raw(PRIMARY_SLOT), saved);
    }

    #[test]
    fn test_update_each_and_remove() {
        let mut store = store_over(FlakyKv::default());
        store.load().unwrap();

        let touched = store.update_each("3", |r| r.title = "Migraine".to_string());
        assert_eq!(touched, 1);
        assert_eq!(store.records()[2].title, "Migraine");
        assert_eq!(store.update_each("missing", |r| r.title.clear()), 0);

        store.append(sample("dup"));
        store.append(sample("dup"));
        assert_eq!(store.update_each("dup", |r| r.title = "Same".to_string()), 2);
        assert!(store
            .records()
            .iter()
            .filter(|r| r.id == "dup")
            .all(|r| r.title == "Same"));
        assert_eq!(store.remove("dup"), 2);
        assert_eq!(store.remove("dup"), 0);
    }

    #[test]
    fn test_sqlite_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dpcms.db");

        {
            let kv = SqliteKv::open(&path).unwrap();
            let mut store = RecordStore::new(Box::new(kv), Arc::new(NoopMeter));
            store.load().unwrap();
            store.extend(vec![sample("x"), sample("y")]);
            store.persist().unwrap();
        }

        let kv = SqliteKv::open(&path).unwrap();
        let mut store = RecordStore::new(Box::new(kv), Arc::new(NoopMeter));
        assert_eq!(store.load().unwrap(), LoadOutcome::Loaded(7));
        assert!(store.location().contains("dpcms.db"));
    }

    #[test]
    fn test_operations_are_metered() {
        let meter = Arc::new(MemoryMeter::new());
        let mut store = RecordStore::new(Box::new(MemoryKv::new()), meter.clone());
        store.load().unwrap();

        assert_eq!(meter.count("store.load"), 1);
        assert_eq!(meter.count("store.persist"), 1);
    }
}
