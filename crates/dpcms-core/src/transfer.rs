//! Bulk export and import
//!
//! Export snapshots the whole collection into a JSON artifact named
//! `disease-prevention-cms-<date>.json`. Import parses an artifact (either a
//! bare list of records or an object with a `content` list) and hands the
//! records back for appending. Nothing here touches the store directly.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::fs;

use crate::models::{ContentRecord, ParseEnumError, RecordDraft};
use crate::validation::{validate, ValidationError};
use crate::DATA_VERSION;

/// Prefix of exported artifact file names
pub const ARTIFACT_PREFIX: &str = "disease-prevention-cms";

/// Errors from export or import
#[derive(Error, Debug)]
pub enum TransferError {
    /// Only JSON artifacts are produced
    #[error("Unsupported export format '{0}': only json is supported")]
    UnsupportedFormat(ExportFormat),

    /// Artifact is not valid JSON or has the wrong shape
    #[error("Failed to parse artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// An imported record fails hard validation
    #[error("Imported record #{index} (id '{id}') is invalid: {source}")]
    InvalidRecord {
        index: usize,
        id: String,
        #[source]
        source: ValidationError,
    },

    /// Failed to read artifact file
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write artifact file
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Artifact formats callers may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Xml,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "xml" => Ok(ExportFormat::Xml),
            _ => Err(ParseEnumError {
                kind: "export format",
                value: s.to_string(),
                expected: &["json", "csv", "xml"],
            }),
        }
    }
}

/// Descriptive block carried inside every artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub total_items: usize,
    pub exported_by: String,
    pub format: ExportFormat,
}

/// A full snapshot of the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    pub content: Vec<ContentRecord>,
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub metadata: ExportMetadata,
}

impl ExportArtifact {
    /// Snapshot `records`; fails for any format other than JSON
    pub fn build(
        records: &[ContentRecord],
        format: ExportFormat,
        exported_by: &str,
    ) -> Result<Self, TransferError> {
        if format != ExportFormat::Json {
            return Err(TransferError::UnsupportedFormat(format));
        }

        Ok(Self {
            content: records.to_vec(),
            export_date: Utc::now(),
            version: DATA_VERSION.to_string(),
            metadata: ExportMetadata {
                total_items: records.len(),
                exported_by: exported_by.to_string(),
                format,
            },
        })
    }

    /// File name for this artifact: `disease-prevention-cms-YYYY-MM-DD.json`
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.json",
            ARTIFACT_PREFIX,
            self.export_date.format("%Y-%m-%d")
        )
    }

    /// Pretty-printed JSON text
    pub fn to_json(&self) -> Result<String, TransferError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the artifact into `dir` under its file name
    pub async fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, TransferError> {
        let path = dir.join(self.file_name());
        let json = self.to_json()?;

        fs::create_dir_all(dir)
            .await
            .map_err(|source| TransferError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        fs::write(&path, json)
            .await
            .map_err(|source| TransferError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

/// Extract the record list from a bare array or a `{content: [...]}` wrapper
pub fn parse_content(text: &str) -> serde_json::Result<Vec<ContentRecord>> {
    let value: Value = serde_json::from_str(text)?;
    let list = match value {
        Value::Object(mut map) => map
            .remove("content")
            .ok_or_else(|| serde_json::Error::missing_field("content"))?,
        other => other,
    };
    serde_json::from_value(list)
}

/// Parse an import artifact and check every record against the validator
///
/// Stored versions must be positive; a zero version is a hard error.
///
/// Records are returned in artifact order. Ids are not checked for
/// collisions with each other or with the store.
pub fn parse_import(text: &str) -> Result<Vec<ContentRecord>, TransferError> {
    let records = parse_content(text)?;

    for (index, record) in records.iter().enumerate() {
        let mut report = validate(&RecordDraft::from(record));
        if record.metadata.version == 0 {
            report
                .errors
                .push("Version must be a positive integer".to_string());
        }
        report
            .into_result()
            .map_err(|source| TransferError::InvalidRecord {
                index,
                id: record.id.clone(),
                source,
            })?;
    }

    Ok(records)
}

/// Read an artifact file into memory
pub async fn read_artifact(path: &Path) -> Result<String, TransferError> {
    fs::read_to_string(path)
        .await
        .map_err(|source| TransferError::Read {
            path: path.to_path_buf(),
            source,
        })
}
