//! Repository façade
//!
//! The single entry point for reading and changing content. Every mutation
//! is validated, applied to the [`RecordStore`], then persisted before the
//! call returns. Persistence failures never escape a mutation: they are
//! logged, kept in [`Repository::error`], and the in-memory collection
//! carries on.
//!
//! ## Usage
//!
//! ```ignore
//! let mut repo = Repository::open(&config, Arc::new(TracingMeter))?;
//!
//! let saved = repo.add(RecordDraft::new(ContentType::Advice, "Rest", "Sleep eight hours", "Dr. A"))?;
//! for warning in &saved.warnings {
//!     println!("warning: {}", warning);
//! }
//!
//! repo.set_filters(FilterUpdate { filter_type: Some(Filter::Only(ContentType::Advice)), ..Default::default() });
//! let view = repo.filtered_content();
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::meter::{measure, SharedMeter, Timing};
use crate::models::{ContentRecord, ContentType, RecordDraft, Status, UpdateRequest};
use crate::query::{self, FilterUpdate, QueryCriteria, SortKey, SortOrder, Stats};
use crate::storage::{KeyValueStore, SqliteKv, StorageError};
use crate::store::{LoadOutcome, RecordStore};
use crate::transfer::{self, ExportArtifact, ExportFormat, TransferError};
use crate::validation::{validate, Validation, ValidationError};

/// Title suffix given to duplicated records
pub const COPY_SUFFIX: &str = " (Copy)";

/// Errors returned by façade operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The candidate record failed hard validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No record has the given id
    #[error("Content not found: {0}")]
    NotFound(String),

    /// Export or import failed; the collection is unchanged
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Restore or reset could not complete
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A record accepted by `add`, `update` or `duplicate`
#[derive(Debug, Clone, PartialEq)]
pub struct Saved {
    pub record: ContentRecord,
    /// Soft warnings raised while validating
    pub warnings: Vec<String>,
}

/// Content repository
pub struct Repository {
    store: RecordStore,
    criteria: QueryCriteria,
    loading: bool,
    error: Option<String>,
    recovery_hint: Option<&'static str>,
    meter: SharedMeter,
    exported_by: String,
}

impl Repository {
    /// Create a repository over `slots`; nothing is read until [`load`](Self::load)
    pub fn new(slots: Box<dyn KeyValueStore>, meter: SharedMeter) -> Self {
        Self {
            store: RecordStore::new(slots, meter.clone()),
            criteria: QueryCriteria::default(),
            loading: true,
            error: None,
            recovery_hint: None,
            meter,
            exported_by: crate::config::DEFAULT_EXPORTED_BY.to_string(),
        }
    }

    /// Set the name written into export artifacts
    pub fn with_exported_by(mut self, exported_by: impl Into<String>) -> Self {
        self.exported_by = exported_by.into();
        self
    }

    /// Open the on-disk slot database named by `config` and load it
    ///
    /// A database that cannot be opened is an error. A database whose
    /// content cannot be read is not: the repository comes back with
    /// [`error`](Self::error) set.
    pub fn open(config: &Config, meter: SharedMeter) -> Result<Self> {
        let path = config.database_path();
        let slots = SqliteKv::open(&path)
            .with_context(|| format!("Failed to open content database: {:?}", path))?;

        let mut repo = Self::new(Box::new(slots), meter).with_exported_by(&config.exported_by);
        repo.load();
        Ok(repo)
    }

    // ==================== Lifecycle ====================

    /// Hydrate the collection, seeding defaults on first run
    ///
    /// Returns `None` when the slots could not be read; the reason is kept
    /// in [`error`](Self::error).
    pub fn load(&mut self) -> Option<LoadOutcome> {
        let _timing = Timing::start(&self.meter, "load");
        self.loading = true;

        let outcome = match self.store.load() {
            Ok(outcome) => {
                self.clear_error();
                Some(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, recoverable = e.is_recoverable(), "Failed to load content");
                self.record_failure("Failed to load content", &e);
                None
            }
        };

        self.loading = false;
        outcome
    }

    /// True from construction until the first `load` finishes
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last load or persistence failure, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// What the user can do about the current [`error`](Self::error)
    pub fn recovery_hint(&self) -> Option<&'static str> {
        self.recovery_hint
    }

    pub fn clear_error(&mut self) {
        self.error = None;
        self.recovery_hint = None;
    }

    /// Where the durable slots live
    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Time of the last successful save
    pub fn last_backup(&self) -> Option<DateTime<Utc>> {
        self.store.last_backup()
    }

    /// True when saves are suspended after an unreadable load
    pub fn is_detached(&self) -> bool {
        self.store.is_detached()
    }

    /// Reload the collection from the backup slot
    pub fn restore_backup(&mut self) -> Result<usize, RepositoryError> {
        let _timing = Timing::start(&self.meter, "restore_backup");
        let count = self.store.restore_backup()?;
        self.clear_error();
        Ok(count)
    }

    /// Discard both slots and re-seed the default records
    pub fn reset(&mut self) -> Result<usize, RepositoryError> {
        let _timing = Timing::start(&self.meter, "reset");
        let count = self.store.reset()?;
        self.clear_error();
        Ok(count)
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.persist() {
            tracing::error!(
                error = %e,
                recoverable = e.is_recoverable(),
                "Failed to save content; changes are in memory only"
            );
            self.record_failure("Failed to save content", &e);
        }
    }

    fn record_failure(&mut self, what: &str, e: &StorageError) {
        self.error = Some(format!("{}: {}", what, e));
        self.recovery_hint = e.recovery_suggestion();
    }

    // ==================== Mutations ====================

    /// Check a candidate without touching the collection
    pub fn validate(&self, draft: &RecordDraft) -> Validation {
        let _timing = Timing::start(&self.meter, "validate");
        validate(draft)
    }

    /// Validate and append a new record
    ///
    /// The record gets a fresh id, version 1 and the current time. Status
    /// is taken from the draft, which defaults to draft.
    pub fn add(&mut self, draft: RecordDraft) -> Result<Saved, RepositoryError> {
        let _timing = Timing::start(&self.meter, "add");

        let warnings = validate(&draft).into_result().map_err(|e| {
            tracing::warn!(error = %e, "Rejected new content");
            e
        })?;
        let Some(kind) = draft.kind else {
            return Err(ValidationError {
                errors: vec!["Content type is required".to_string()],
            }
            .into());
        };

        let mut record = ContentRecord::from_draft(self.next_id(), kind, draft);
        record.metadata.version = 1;
        record.metadata.last_updated = Utc::now();

        self.store.append(record.clone());
        self.persist();

        tracing::info!(
            id = %record.id,
            kind = %record.kind,
            warnings = warnings.len(),
            "Added content"
        );
        Ok(Saved { record, warnings })
    }

    /// Apply a typed update to an existing record
    ///
    /// The merged record is validated as a whole. On success the version
    /// goes up by one and the timestamp is refreshed.
    pub fn update(&mut self, id: &str, request: UpdateRequest) -> Result<Saved, RepositoryError> {
        let _timing = Timing::start(&self.meter, "update");

        let current = self
            .store
            .get(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        let mut merged = request.apply_to(current);

        let warnings = validate(&RecordDraft::from(&merged))
            .into_result()
            .map_err(|e| {
                tracing::warn!(id, error = %e, "Rejected content update");
                e
            })?;

        let stamp = Utc::now();
        merged.metadata.version = merged.metadata.version.saturating_add(1);
        merged.metadata.last_updated = stamp;

        // Imports may leave several records under one id; each keeps its own version
        let copies = self.store.update_each(id, |record| {
            let mut next = request.apply_to(record);
            next.metadata.version = next.metadata.version.saturating_add(1);
            next.metadata.last_updated = stamp;
            *record = next;
        });
        self.persist();

        tracing::info!(
            id,
            copies,
            version = merged.metadata.version,
            fields = ?request.touched_fields(),
            "Updated content"
        );
        Ok(Saved {
            record: merged,
            warnings,
        })
    }

    /// Remove a record; returns false when no record had `id`
    pub fn delete(&mut self, id: &str) -> bool {
        let _timing = Timing::start(&self.meter, "delete");

        let removed = self.store.remove(id);
        self.persist();

        tracing::info!(id, removed, "Deleted content");
        removed > 0
    }

    /// Copy a record into a new draft and add it
    pub fn duplicate(&mut self, id: &str) -> Result<Saved, RepositoryError> {
        let _timing = Timing::start(&self.meter, "duplicate");

        let original = self
            .store
            .get(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        let mut draft = RecordDraft::from(original);
        draft.title.push_str(COPY_SUFFIX);
        draft.metadata.status = Status::Draft;
        draft.metadata.version = 1;

        let saved = self.add(draft)?;
        tracing::debug!(source = id, id = %saved.record.id, "Duplicated content");
        Ok(saved)
    }

    fn next_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.store.contains(&id) {
                return id;
            }
        }
    }

    // ==================== Queries ====================

    /// Every record, in collection order
    pub fn records(&self) -> &[ContentRecord] {
        self.store.records()
    }

    pub fn get(&self, id: &str) -> Option<&ContentRecord> {
        self.store.get(id)
    }

    /// Records of one type, in collection order
    pub fn by_type(&self, kind: ContentType) -> Vec<&ContentRecord> {
        self.store
            .records()
            .iter()
            .filter(|r| r.kind == kind)
            .collect()
    }

    /// Set the search term
    pub fn search(&mut self, term: impl Into<String>) {
        self.criteria.search_term = term.into();
    }

    pub fn set_filters(&mut self, update: FilterUpdate) {
        self.criteria.set_filters(update);
    }

    pub fn set_sorting(&mut self, sort_by: SortKey, sort_order: SortOrder) {
        self.criteria.sort_by = sort_by;
        self.criteria.sort_order = sort_order;
    }

    /// Clear the search term and every filter; sorting is kept
    pub fn clear_filters(&mut self) {
        self.criteria.clear_filters();
    }

    pub fn criteria(&self) -> &QueryCriteria {
        &self.criteria
    }

    /// The collection under the current criteria
    pub fn filtered_content(&self) -> Vec<&ContentRecord> {
        measure(&self.meter, "filtered_content", || {
            query::run(self.store.records(), &self.criteria)
        })
    }

    /// Statistics over the whole collection
    pub fn stats(&self) -> Stats<'_> {
        measure(&self.meter, "stats", || query::stats(self.store.records()))
    }

    // ==================== Transfer ====================

    /// Snapshot the collection into an export artifact
    pub fn export(&self, format: ExportFormat) -> Result<ExportArtifact, RepositoryError> {
        let _timing = Timing::start(&self.meter, "export");

        let artifact = ExportArtifact::build(self.store.records(), format, &self.exported_by)
            .map_err(|e| {
                tracing::warn!(error = %e, "Export rejected");
                e
            })?;

        tracing::info!(
            count = artifact.metadata.total_items,
            format = %format,
            "Exported content"
        );
        Ok(artifact)
    }

    /// Export and write the artifact into `dir`
    pub async fn export_to_dir(
        &self,
        format: ExportFormat,
        dir: &Path,
    ) -> Result<PathBuf, RepositoryError> {
        let artifact = self.export(format)?;
        let path = artifact.write_to_dir(dir).await?;
        tracing::info!(path = %path.display(), "Wrote export artifact");
        Ok(path)
    }

    /// Parse an artifact and append its records
    ///
    /// Either every record is appended or none is. Ids are not checked
    /// against the existing collection.
    pub fn import_str(&mut self, text: &str) -> Result<usize, RepositoryError> {
        let _timing = Timing::start(&self.meter, "import");

        let records = transfer::parse_import(text).map_err(|e| {
            tracing::warn!(error = %e, "Import rejected");
            e
        })?;
        let count = records.len();

        self.store.extend(records);
        self.persist();

        tracing::info!(count, total = self.store.len(), "Imported content");
        Ok(count)
    }

    /// Read an artifact file and append its records
    pub async fn import_file(&mut self, path: &Path) -> Result<usize, RepositoryError> {
        let text = transfer::read_artifact(path).await?;
        self.import_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter::{MemoryMeter, NoopMeter};
    use crate::models::Urgency;
    use crate::query::Filter;
    use crate::storage::{MemoryKv, StorageResult, BACKUP_SLOT, PRIMARY_SLOT};
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn seeded() -> Repository {
        let mut repo = Repository::new(Box::new(MemoryKv::new()), Arc::new(NoopMeter));
        repo.load();
        repo
    }

    fn empty() -> Repository {
        let mut repo = seeded();
        for id in ["1", "2", "3", "4", "5"] {
            repo.delete(id);
        }
        repo
    }

    fn draft(title: &str) -> RecordDraft {
        RecordDraft::new(
            ContentType::Advice,
            title,
            "Drink water throughout the day",
            "Dr. Test",
        )
        .with_tag("hydration")
    }

    /// Slot backend that accepts reads and refuses writes
    struct ReadOnlyKv(MemoryKv);

    impl KeyValueStore for ReadOnlyKv {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::PermissionDenied {
                path: "read-only".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn remove(&mut self, _key: &str) -> StorageResult<()> {
            Ok(())
        }

        fn location(&self) -> String {
            "read-only".to_string()
        }
    }

    #[test]
    fn test_loading_flag() {
        let mut repo = Repository::new(Box::new(MemoryKv::new()), Arc::new(NoopMeter));
        assert!(repo.is_loading());

        assert_eq!(repo.load(), Some(LoadOutcome::Seeded(5)));
        assert!(!repo.is_loading());
        assert!(repo.error().is_none());
    }

    #[test]
    fn test_add_assigns_id_version_and_status() {
        let mut repo = seeded();
        let before = Utc::now();

        let saved = repo.add(draft("Stay hydrated")).unwrap();

        assert!(!saved.record.id.is_empty());
        assert_eq!(saved.record.metadata.version, 1);
        assert_eq!(saved.record.metadata.status, Status::Draft);
        assert!(saved.record.metadata.last_updated >= before);
        assert!(saved.warnings.is_empty());
        assert_eq!(repo.records().len(), 6);
        assert_eq!(repo.get(&saved.record.id), Some(&saved.record));
    }

    #[test]
    fn test_add_keeps_explicit_status() {
        let mut repo = seeded();
        let saved = repo
            .add(draft("Reviewed advice").with_status(Status::Review))
            .unwrap();
        assert_eq!(saved.record.metadata.status, Status::Review);
    }

    #[test]
    fn test_add_ids_are_unique() {
        let mut repo = seeded();
        let mut ids: HashSet<String> = repo.records().iter().map(|r| r.id.clone()).collect();

        for i in 0..50 {
            let saved = repo.add(draft(&format!("Advice {}", i))).unwrap();
            assert!(ids.insert(saved.record.id));
        }
        assert_eq!(ids.len(), 55);
    }

    #[test]
    fn test_add_rejects_invalid_without_change() {
        let mut repo = seeded();

        let cases = vec![
            RecordDraft::new(ContentType::Advice, "", "Long enough body", "Dr. Test"),
            RecordDraft::new(ContentType::Advice, "Title", "   ", "Dr. Test"),
            RecordDraft::new(ContentType::Advice, "Title", "Long enough body", ""),
            RecordDraft {
                kind: None,
                ..RecordDraft::new(ContentType::Advice, "Title", "Long enough body", "Dr. Test")
            },
        ];

        for candidate in cases {
            let err = repo.add(candidate).unwrap_err();
            match err {
                RepositoryError::Validation(e) => assert!(!e.errors.is_empty()),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
        assert_eq!(repo.records().len(), 5);
    }

    #[test]
    fn test_add_error_message_joins_errors() {
        let mut repo = seeded();
        let err = repo
            .add(RecordDraft {
                kind: None,
                ..RecordDraft::default()
            })
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Validation failed: Title is required, Content is required, Content type is required, Author is required"
        );
    }

    #[test]
    fn test_add_returns_warnings() {
        let mut repo = seeded();
        let saved = repo
            .add(RecordDraft::new(ContentType::Advice, "Hi", "Short", "Dr. Test"))
            .unwrap();

        assert_eq!(saved.warnings.len(), 3);
        assert!(repo.get(&saved.record.id).is_some());
    }

    #[test]
    fn test_update_increments_version() {
        let mut repo = seeded();
        let original = repo.get("2").unwrap().clone();

        let request = UpdateRequest {
            title: Some("Common Cold (Viral)".to_string()),
            ..Default::default()
        };
        let first = repo.update("2", request.clone()).unwrap();
        assert_eq!(first.record.metadata.version, original.metadata.version + 1);
        assert!(first.record.metadata.last_updated >= original.metadata.last_updated);
        assert_eq!(first.record.id, "2");
        assert_eq!(first.record.body, original.body);

        let second = repo.update("2", request).unwrap();
        assert_eq!(second.record.metadata.version, original.metadata.version + 2);
        assert_eq!(repo.get("2").unwrap().title, "Common Cold (Viral)");
    }

    #[test]
    fn test_update_merges_metadata() {
        let mut repo = seeded();
        let mut request = UpdateRequest::default();
        request.metadata.urgency = Some(Urgency::Immediate);

        let saved = repo.update("2", request).unwrap();
        assert_eq!(saved.record.metadata.urgency, Some(Urgency::Immediate));
        assert_eq!(saved.record.metadata.category.as_deref(), Some("respiratory"));
    }

    #[test]
    fn test_update_validates_merged_record() {
        let mut repo = seeded();
        let version = repo.get("3").unwrap().metadata.version;

        let request = UpdateRequest {
            body: Some(String::new()),
            ..Default::default()
        };
        let err = repo.update("3", request).unwrap_err();

        assert!(matches!(err, RepositoryError::Validation(_)));
        assert_eq!(repo.get("3").unwrap().metadata.version, version);
        assert!(!repo.get("3").unwrap().body.is_empty());
    }

    #[test]
    fn test_update_missing_id() {
        let mut repo = seeded();
        let err = repo.update("nope", UpdateRequest::default()).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(ref id) if id == "nope"));
    }

    #[test]
    fn test_delete() {
        let mut repo = seeded();
        assert!(repo.delete("4"));
        assert!(repo.get("4").is_none());
        assert_eq!(repo.records().len(), 4);
        assert!(!repo.delete("4"));
    }

    #[test]
    fn test_duplicate_common_cold() {
        let mut repo = seeded();
        let saved = repo.duplicate("2").unwrap();

        assert_eq!(saved.record.title, "Common Cold (Copy)");
        assert_eq!(saved.record.metadata.status, Status::Draft);
        assert_eq!(saved.record.metadata.version, 1);
        assert_ne!(saved.record.id, "2");
        assert_eq!(saved.record.kind, ContentType::Condition);
        assert_eq!(repo.records().len(), 6);
        assert_eq!(repo.get("2").unwrap().metadata.version, 2);
    }

    #[test]
    fn test_duplicate_missing_id() {
        let mut repo = seeded();
        assert!(matches!(
            repo.duplicate("99"),
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[test]
    fn test_condition_filter_scenario() {
        let mut repo = seeded();
        repo.set_filters(FilterUpdate {
            filter_type: Some(Filter::Only(ContentType::Condition)),
            ..Default::default()
        });

        let view = repo.filtered_content();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "Common Cold");
    }

    #[test]
    fn test_search_scenario() {
        let mut repo = seeded();
        repo.search("hand");

        let view = repo.filtered_content();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "Hand Hygiene Protocol");
        assert_eq!(view[0].kind, ContentType::Prevention);
    }

    #[test]
    fn test_clear_filters_matches_pristine() {
        let pristine = seeded();
        let expected: Vec<String> = pristine
            .filtered_content()
            .iter()
            .map(|r| r.id.clone())
            .collect();

        let mut repo = seeded();
        repo.search("cold");
        repo.set_filters(FilterUpdate {
            filter_type: Some(Filter::Only(ContentType::Symptom)),
            filter_urgency: Some(Filter::Only(Urgency::Moderate)),
            filter_status: Some(Filter::Only(Status::Archived)),
        });
        repo.clear_filters();

        let ids: Vec<String> = repo.filtered_content().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, expected);
        assert_eq!(repo.criteria().search_term, "");
    }

    #[test]
    fn test_urgency_sorting() {
        let mut repo = seeded();
        repo.add(draft("Call emergency services").with_urgency(Urgency::Immediate))
            .unwrap();

        repo.set_sorting(SortKey::Urgency, SortOrder::Desc);
        let desc: Vec<Option<Urgency>> = repo
            .filtered_content()
            .iter()
            .map(|r| r.metadata.urgency)
            .collect();
        assert_eq!(desc[0], Some(Urgency::Immediate));
        assert_eq!(desc[1], Some(Urgency::Moderate));
        assert_eq!(desc[2], Some(Urgency::Monitor));
        assert!(desc[3..].iter().all(Option::is_none));

        repo.set_sorting(SortKey::Urgency, SortOrder::Asc);
        let asc: Vec<Option<Urgency>> = repo
            .filtered_content()
            .iter()
            .map(|r| r.metadata.urgency)
            .collect();
        assert_eq!(asc[asc.len() - 1], Some(Urgency::Immediate));
        assert_eq!(asc[asc.len() - 2], Some(Urgency::Moderate));
        assert_eq!(asc[asc.len() - 3], Some(Urgency::Monitor));
    }

    #[test]
    fn test_by_type() {
        let mut repo = seeded();
        repo.add(draft("More advice")).unwrap();

        assert_eq!(repo.by_type(ContentType::Advice).len(), 1);
        assert_eq!(repo.by_type(ContentType::Disclaimer).len(), 1);
        assert!(repo.by_type(ContentType::Symptom).iter().all(|r| r.id == "3"));
    }

    #[test]
    fn test_stats_follow_mutations() {
        let mut repo = seeded();
        assert_eq!(repo.stats().total_content, 5);

        repo.add(draft("Pending review").with_status(Status::Review))
            .unwrap();
        let stats = repo.stats();
        assert_eq!(stats.total_content, 6);
        assert_eq!(stats.needs_review.len(), 1);
        assert_eq!(stats.recently_updated[0].title, "Pending review");
    }

    #[test]
    fn test_export_import_round_trip() {
        let source = seeded();
        let artifact = source.export(ExportFormat::Json).unwrap();
        let text = artifact.to_json().unwrap();

        let mut target = empty();
        assert_eq!(target.import_str(&text).unwrap(), 5);

        let mut expected: Vec<&ContentRecord> = source.records().iter().collect();
        let mut actual: Vec<&ContentRecord> = target.records().iter().collect();
        expected.sort_by(|a, b| a.id.cmp(&b.id));
        actual.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_import_appends_duplicates() {
        let mut repo = seeded();
        let text = repo.export(ExportFormat::Json).unwrap().to_json().unwrap();

        assert_eq!(repo.import_str(&text).unwrap(), 5);
        assert_eq!(repo.records().len(), 10);
        assert_eq!(repo.records().iter().filter(|r| r.id == "2").count(), 2);
    }

    #[test]
    fn test_update_after_reimport_touches_every_copy() {
        let mut repo = seeded();
        let text = repo.export(ExportFormat::Json).unwrap().to_json().unwrap();
        repo.import_str(&text).unwrap();
        let version = repo.get("2").unwrap().metadata.version;

        let request = UpdateRequest {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let saved = repo.update("2", request).unwrap();
        assert_eq!(saved.record.metadata.version, version + 1);

        let copies: Vec<(&str, u32)> = repo
            .records()
            .iter()
            .filter(|r| r.id == "2")
            .map(|r| (r.title.as_str(), r.metadata.version))
            .collect();
        assert_eq!(copies, vec![("Renamed", version + 1), ("Renamed", version + 1)]);

        assert!(repo.delete("2"));
        assert!(repo.get("2").is_none());
    }

    #[test]
    fn test_import_rejects_zero_version() {
        let mut repo = seeded();
        let mut records = repo.records().to_vec();
        records[1].metadata.version = 0;
        let text = serde_json::to_string(&records).unwrap();

        assert!(matches!(
            repo.import_str(&text),
            Err(RepositoryError::Transfer(TransferError::InvalidRecord { index: 1, .. }))
        ));
        assert_eq!(repo.records().len(), 5);
    }

    #[test]
    fn test_import_rejects_without_mutation() {
        let mut repo = seeded();

        assert!(matches!(
            repo.import_str("{ broken"),
            Err(RepositoryError::Transfer(TransferError::Parse(_)))
        ));

        let mut records = repo.records().to_vec();
        records[0].title.clear();
        let text = serde_json::to_string(&records).unwrap();
        assert!(matches!(
            repo.import_str(&text),
            Err(RepositoryError::Transfer(TransferError::InvalidRecord { .. }))
        ));

        assert_eq!(repo.records().len(), 5);
    }

    #[test]
    fn test_export_rejects_csv() {
        let repo = seeded();
        assert!(matches!(
            repo.export(ExportFormat::Csv),
            Err(RepositoryError::Transfer(TransferError::UnsupportedFormat(
                ExportFormat::Csv
            )))
        ));
    }

    #[test]
    fn test_export_uses_configured_name() {
        let repo = seeded().with_exported_by("Clinic Editor");
        let artifact = repo.export(ExportFormat::Json).unwrap();
        assert_eq!(artifact.metadata.exported_by, "Clinic Editor");
    }

    #[test]
    fn test_persistence_failure_degrades_to_memory() {
        let mut repo = Repository::new(Box::new(ReadOnlyKv(MemoryKv::new())), Arc::new(NoopMeter));

        assert!(repo.load().is_none());
        assert!(repo.error().unwrap().contains("Permission denied"));
        assert_eq!(repo.records().len(), 5);

        repo.clear_error();
        let saved = repo.add(draft("Kept in memory")).unwrap();
        assert!(repo.error().is_some());
        assert!(repo.get(&saved.record.id).is_some());
    }

    #[test]
    fn test_corrupt_slot_then_restore() {
        let mut kv = MemoryKv::new();
        // A valid backup next to a corrupt primary
        let backup = serde_json::json!({
            "content": crate::seed::default_records(),
            "version": "1.0.0",
            "lastBackup": Utc::now(),
        })
        .to_string();
        kv.set(BACKUP_SLOT, &backup).unwrap();
        kv.set(PRIMARY_SLOT, "[{").unwrap();

        let mut repo = Repository::new(Box::new(kv), Arc::new(NoopMeter));
        assert!(repo.load().is_none());
        assert!(repo.is_detached());
        assert!(repo.error().is_some());
        assert!(repo.recovery_hint().unwrap().contains("dpcms restore"));

        repo.delete("1");
        assert!(repo.error().unwrap().contains("Failed to save content"));
        assert!(repo.recovery_hint().unwrap().contains("dpcms reset"));

        assert_eq!(repo.restore_backup().unwrap(), 5);
        assert!(!repo.is_detached());
        assert!(repo.error().is_none());
        assert!(repo.recovery_hint().is_none());
        assert!(repo.get("5").is_some());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut repo = seeded();
        repo.delete("1");
        repo.add(draft("Temporary")).unwrap();

        assert_eq!(repo.reset().unwrap(), 5);
        assert!(repo.get("1").is_some());
        assert_eq!(repo.records().len(), 5);
    }

    #[test]
    fn test_operations_are_metered() {
        let meter = Arc::new(MemoryMeter::new());
        let mut repo = Repository::new(Box::new(MemoryKv::new()), meter.clone());
        repo.load();
        repo.duplicate("2").unwrap();
        repo.filtered_content();
        repo.stats();

        assert_eq!(meter.count("load"), 1);
        assert_eq!(meter.count("duplicate"), 1);
        assert_eq!(meter.count("add"), 1);
        assert_eq!(meter.count("filtered_content"), 1);
        assert_eq!(meter.count("stats"), 1);
    }

    #[test]
    fn test_open_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            exported_by: "Tester".to_string(),
            log_file: None,
        };

        let id = {
            let mut repo = Repository::open(&config, Arc::new(NoopMeter)).unwrap();
            assert_eq!(repo.records().len(), 5);
            repo.add(draft("Persisted")).unwrap().record.id
        };

        let repo = Repository::open(&config, Arc::new(NoopMeter)).unwrap();
        assert_eq!(repo.records().len(), 6);
        assert!(repo.get(&id).is_some());
        assert!(repo.location().contains("dpcms.db"));
        assert!(config.database_path().exists());
    }

    #[tokio::test]
    async fn test_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let source = seeded();

        let path = source
            .export_to_dir(ExportFormat::Json, temp_dir.path())
            .await
            .unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("disease-prevention-cms-"));

        let mut target = empty();
        assert_eq!(target.import_file(&path).await.unwrap(), 5);
        assert_eq!(target.records().len(), 5);
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let mut repo = seeded();
        let err = repo
            .import_file(Path::new("/does/not/exist.json"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Transfer(TransferError::Read { .. })
        ));
        assert_eq!(repo.records().len(), 5);
    }
}
