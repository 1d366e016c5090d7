//! Storage layer
//!
//! Durable key-value slots that hold the serialized record collection.
//!
//! ## Architecture
//!
//! - **`KeyValueStore`**: the slot interface the record store writes through
//! - **`SqliteKv`**: production backend, one row per slot in a SQLite file
//! - **`MemoryKv`**: process-local backend for tests and throwaway sessions
//!
//! Slot values are opaque text to this layer; the record store owns the
//! JSON shape written into them.

pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryKv;
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
pub use sqlite::SqliteKv;

/// Slot holding the live collection
pub const PRIMARY_SLOT: &str = "disease-prevention-cms";

/// Slot holding a verbatim copy of the last successful primary write
pub const BACKUP_SLOT: &str = "disease-prevention-cms-backup";

/// A local persistent key-value store
pub trait KeyValueStore: Send {
    /// Read a slot; `None` when it has never been written
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a slot, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a slot; deleting a missing slot is not an error
    fn remove(&mut self, key: &str) -> StorageResult<()>;

    /// Human-readable location, for status output
    fn location(&self) -> String;
}
