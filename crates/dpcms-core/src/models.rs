//! Data models for DPCMS
//!
//! Defines the content record and its metadata facets, the closed
//! enumerations they draw from, and the two request shapes used to
//! create (`RecordDraft`) and change (`UpdateRequest`) records.
//!
//! The JSON shape uses camelCase field names, `type` for the record kind
//! and `content` for the body text, so stored slots and exported artifacts
//! stay readable by older exports.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string does not name a variant of a closed enumeration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} '{value}' (expected one of: {})", .expected.join(", "))]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static [&'static str],
}

/// Declares a closed, lowercase string enumeration with `as_str`, `ALL`,
/// `Display` and `FromStr`.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident ($label:literal) { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire name of this variant
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $label,
                        value: s.to_string(),
                        expected: &[$($text),+],
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Kind of content a record holds
    ContentType ("content type") {
        Condition => "condition",
        Symptom => "symptom",
        Advice => "advice",
        Disclaimer => "disclaimer",
        Treatment => "treatment",
        Prevention => "prevention",
    }
}

string_enum! {
    /// How soon a reader should act on the record
    Urgency ("urgency") {
        Immediate => "immediate",
        Moderate => "moderate",
        Monitor => "monitor",
    }
}

string_enum! {
    Severity ("severity") {
        Mild => "mild",
        Moderate => "moderate",
        Severe => "severe",
        Critical => "critical",
    }
}

string_enum! {
    AgeGroup ("age group") {
        Infant => "infant",
        Child => "child",
        Teen => "teen",
        Adult => "adult",
        Elderly => "elderly",
    }
}

string_enum! {
    Gender ("gender") {
        Male => "male",
        Female => "female",
        Both => "both",
    }
}

string_enum! {
    Prevalence ("prevalence") {
        Common => "common",
        Uncommon => "uncommon",
        Rare => "rare",
    }
}

string_enum! {
    Onset ("onset") {
        Sudden => "sudden",
        Gradual => "gradual",
        Chronic => "chronic",
    }
}

string_enum! {
    /// Editorial lifecycle state
    Status ("status") {
        Draft => "draft",
        Review => "review",
        Approved => "approved",
        Archived => "archived",
    }
}

impl Urgency {
    /// Ordinal rank used for sorting: immediate=3, moderate=2, monitor=1
    pub fn rank(&self) -> u8 {
        match self {
            Urgency::Immediate => 3,
            Urgency::Moderate => 2,
            Urgency::Monitor => 1,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Draft
    }
}

fn default_version() -> u32 {
    1
}

fn default_language() -> String {
    "en".to_string()
}

/// Metadata facets attached to every record
///
/// Grouped loosely as clinical, list, demographic, temporal, provenance and
/// lifecycle facets. List facets keep insertion order and allow duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    // Clinical
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,

    // Lists
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symptoms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risk_factors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub complications: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub when_to_seek_help: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub home_remedies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medications: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lifestyle: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prevention: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,

    // Demographics
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub age_groups: BTreeSet<AgeGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevalence: Option<Prevalence>,

    // Temporal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onset: Option<Onset>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,

    // Provenance
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub medically_reviewed: bool,

    // Lifecycle
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub status: Status,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            urgency: None,
            severity: None,
            category: None,
            subcategory: None,
            tags: Vec::new(),
            symptoms: Vec::new(),
            related_conditions: Vec::new(),
            risk_factors: Vec::new(),
            complications: Vec::new(),
            when_to_seek_help: Vec::new(),
            home_remedies: Vec::new(),
            medications: Vec::new(),
            lifestyle: Vec::new(),
            prevention: Vec::new(),
            sources: Vec::new(),
            age_groups: BTreeSet::new(),
            gender: None,
            prevalence: None,
            duration: None,
            onset: None,
            triggers: Vec::new(),
            follow_up: None,
            author: String::new(),
            reviewed_by: None,
            medically_reviewed: false,
            version: default_version(),
            status: Status::default(),
            language: default_language(),
            region: None,
            last_updated: Utc::now(),
        }
    }
}

impl Metadata {
    /// Create metadata carrying only an author; everything else is default
    pub fn with_author(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            ..Self::default()
        }
    }
}

/// A stored content record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    /// Unique identifier, never changed after creation
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "content", default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    pub metadata: Metadata,
}

impl ContentRecord {
    /// Build a record from a draft whose kind has already been checked
    pub(crate) fn from_draft(id: String, kind: ContentType, draft: RecordDraft) -> Self {
        Self {
            id,
            kind,
            title: draft.title,
            body: draft.body,
            short_description: draft.short_description,
            detailed_description: draft.detailed_description,
            metadata: draft.metadata,
        }
    }
}

/// A candidate record that has not been accepted into the store yet
///
/// Mirrors `ContentRecord` without an id and with an optional kind, so the
/// validator can report a missing type instead of failing to deserialize.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContentType>,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "content", default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl RecordDraft {
    /// Create a draft with the fields every record needs
    pub fn new(
        kind: ContentType,
        title: impl Into<String>,
        body: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            kind: Some(kind),
            title: title.into(),
            body: body.into(),
            short_description: None,
            detailed_description: None,
            metadata: Metadata::with_author(author),
        }
    }

    /// Append a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.metadata.tags.push(tag.into());
        self
    }

    /// Set the urgency facet
    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.metadata.urgency = Some(urgency);
        self
    }

    /// Set the category facet
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.metadata.category = Some(category.into());
        self
    }

    /// Set the lifecycle status
    pub fn with_status(mut self, status: Status) -> Self {
        self.metadata.status = status;
        self
    }
}

impl From<&ContentRecord> for RecordDraft {
    fn from(record: &ContentRecord) -> Self {
        Self {
            kind: Some(record.kind),
            title: record.title.clone(),
            body: record.body.clone(),
            short_description: record.short_description.clone(),
            detailed_description: record.detailed_description.clone(),
            metadata: record.metadata.clone(),
        }
    }
}

/// Typed partial update for an existing record
///
/// Only fields that may change are present; `None` keeps the current value.
/// The id, version and last-updated timestamp are owned by the repository.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateRequest {
    #[serde(rename = "type")]
    pub kind: Option<ContentType>,
    pub title: Option<String>,
    #[serde(rename = "content")]
    pub body: Option<String>,
    pub short_description: Option<String>,
    pub detailed_description: Option<String>,
    pub metadata: MetadataPatch,
}

impl UpdateRequest {
    /// Return a copy of `record` with this request's fields applied
    pub fn apply_to(&self, record: &ContentRecord) -> ContentRecord {
        let mut merged = record.clone();
        if let Some(kind) = self.kind {
            merged.kind = kind;
        }
        if let Some(ref title) = self.title {
            merged.title = title.clone();
        }
        if let Some(ref body) = self.body {
            merged.body = body.clone();
        }
        if let Some(ref short) = self.short_description {
            merged.short_description = Some(short.clone());
        }
        if let Some(ref detailed) = self.detailed_description {
            merged.detailed_description = Some(detailed.clone());
        }
        self.metadata.apply(&mut merged.metadata);
        merged
    }

    /// Names of the top-level fields this request touches, for logging
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.kind.is_some() {
            fields.push("type");
        }
        if self.title.is_some() {
            fields.push("title");
        }
        if self.body.is_some() {
            fields.push("content");
        }
        if self.short_description.is_some() {
            fields.push("shortDescription");
        }
        if self.detailed_description.is_some() {
            fields.push("detailedDescription");
        }
        if self.metadata != MetadataPatch::default() {
            fields.push("metadata");
        }
        fields
    }
}

/// Changeable metadata facets; every field except version and last-updated
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataPatch {
    pub urgency: Option<Urgency>,
    pub severity: Option<Severity>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub tags: Option<Vec<String>>,
    pub symptoms: Option<Vec<String>>,
    pub related_conditions: Option<Vec<String>>,
    pub risk_factors: Option<Vec<String>>,
    pub complications: Option<Vec<String>>,
    pub when_to_seek_help: Option<Vec<String>>,
    pub home_remedies: Option<Vec<String>>,
    pub medications: Option<Vec<String>>,
    pub lifestyle: Option<Vec<String>>,
    pub prevention: Option<Vec<String>>,
    pub sources: Option<Vec<String>>,
    pub age_groups: Option<BTreeSet<AgeGroup>>,
    pub gender: Option<Gender>,
    pub prevalence: Option<Prevalence>,
    pub duration: Option<String>,
    pub onset: Option<Onset>,
    pub triggers: Option<Vec<String>>,
    pub follow_up: Option<String>,
    pub author: Option<String>,
    pub reviewed_by: Option<String>,
    pub medically_reviewed: Option<bool>,
    pub status: Option<Status>,
    pub language: Option<String>,
    pub region: Option<String>,
}

impl MetadataPatch {
    /// Shallow-merge supplied facets into `meta`
    pub fn apply(&self, meta: &mut Metadata) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set_opt(&mut meta.urgency, &self.urgency);
        set_opt(&mut meta.severity, &self.severity);
        set_opt(&mut meta.category, &self.category);
        set_opt(&mut meta.subcategory, &self.subcategory);
        set(&mut meta.tags, &self.tags);
        set(&mut meta.symptoms, &self.symptoms);
        set(&mut meta.related_conditions, &self.related_conditions);
        set(&mut meta.risk_factors, &self.risk_factors);
        set(&mut meta.complications, &self.complications);
        set(&mut meta.when_to_seek_help, &self.when_to_seek_help);
        set(&mut meta.home_remedies, &self.home_remedies);
        set(&mut meta.medications, &self.medications);
        set(&mut meta.lifestyle, &self.lifestyle);
        set(&mut meta.prevention, &self.prevention);
        set(&mut meta.sources, &self.sources);
        set(&mut meta.age_groups, &self.age_groups);
        set_opt(&mut meta.gender, &self.gender);
        set_opt(&mut meta.prevalence, &self.prevalence);
        set_opt(&mut meta.duration, &self.duration);
        set_opt(&mut meta.onset, &self.onset);
        set(&mut meta.triggers, &self.triggers);
        set_opt(&mut meta.follow_up, &self.follow_up);
        set(&mut meta.author, &self.author);
        set_opt(&mut meta.reviewed_by, &self.reviewed_by);
        set(&mut meta.medically_reviewed, &self.medically_reviewed);
        set(&mut meta.status, &self.status);
        set(&mut meta.language, &self.language);
        set_opt(&mut meta.region, &self.region);
    }
}
