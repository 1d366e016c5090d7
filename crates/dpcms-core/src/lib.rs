//! DPCMS Core Library
//!
//! This crate provides the core functionality for DPCMS, a local content
//! repository for short medical-reference records: conditions, symptoms,
//! advice, disclaimers, treatments and prevention tips.
//!
//! # Architecture
//!
//! - **Repository**: the façade every caller goes through
//! - **RecordStore**: ordered collection mirrored into a primary and a
//!   backup durable slot
//! - **SQLite**: the slots live in a key-value table on disk
//!
//! Queries and statistics are computed from the in-memory collection.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut repo = Repository::open(&config, Arc::new(TracingMeter))?;
//!
//! // Add a record
//! let draft = RecordDraft::new(ContentType::Advice, "Rest", "Sleep at least seven hours", "Dr. A");
//! let saved = repo.add(draft)?;
//!
//! // Query records
//! repo.search("sleep");
//! let view = repo.filtered_content();
//! ```
//!
//! # Modules
//!
//! - `repository`: Façade over store, validator, queries and transfer (main entry point)
//! - `store`: Record collection and slot persistence
//! - `models`: Records, metadata facets, drafts and update requests
//! - `validation`: Hard errors and soft warnings for candidate records
//! - `query`: Search, filters, sorting and statistics
//! - `transfer`: Export artifacts and import parsing
//! - `storage`: Durable key-value slots
//! - `meter`: Operation timing
//! - `config`: Application configuration

pub mod config;
pub mod meter;
pub mod models;
pub mod query;
pub mod repository;
pub mod seed;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod validation;

/// Version tag written into slots and export artifacts
pub const DATA_VERSION: &str = "1.0.0";

pub use config::Config;
pub use meter::{Meter, MemoryMeter, NoopMeter, SharedMeter, TracingMeter};
pub use models::{
    AgeGroup, ContentRecord, ContentType, Gender, Metadata, MetadataPatch, Onset, Prevalence,
    RecordDraft, Severity, Status, UpdateRequest, Urgency,
};
pub use query::{Filter, FilterUpdate, QueryCriteria, SortKey, SortOrder, Stats};
pub use repository::{Repository, RepositoryError, Saved};
pub use storage::{KeyValueStore, MemoryKv, SqliteKv, StorageError};
pub use store::{LoadOutcome, RecordStore};
pub use transfer::{ExportArtifact, ExportFormat, TransferError};
pub use validation::{validate, Validation, ValidationError};
