//! Query engine
//!
//! Derives a filtered, sorted view of the record collection from a set of
//! criteria, and aggregate statistics over the whole collection. Both are
//! pure functions of their inputs.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::models::{ContentRecord, ContentType, ParseEnumError, Status, Urgency};

/// How many records `Stats::recently_updated` holds
pub const RECENT_LIMIT: usize = 5;

/// Exact-match filter on one field; `All` disables it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::All
    }
}

impl<T: PartialEq> Filter<T> {
    /// Check a field value against the filter; absent values only pass `All`
    pub fn matches(&self, value: Option<&T>) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => value == Some(expected),
        }
    }
}

impl<T: FromStr> FromStr for Filter<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Filter::All)
        } else {
            s.parse().map(Filter::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Only(value) => write!(f, "{}", value),
        }
    }
}

/// Field the filtered view is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Title,
    #[default]
    LastUpdated,
    Urgency,
    Category,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::LastUpdated => "lastUpdated",
            SortKey::Urgency => "urgency",
            SortKey::Category => "category",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "title" => Ok(SortKey::Title),
            "lastupdated" | "updated" => Ok(SortKey::LastUpdated),
            "urgency" => Ok(SortKey::Urgency),
            "category" => Ok(SortKey::Category),
            _ => Err(ParseEnumError {
                kind: "sort key",
                value: s.to_string(),
                expected: &["title", "lastUpdated", "urgency", "category"],
            }),
        }
    }
}

/// Direction applied to the sort key's comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(ParseEnumError {
                kind: "sort order",
                value: s.to_string(),
                expected: &["asc", "desc"],
            }),
        }
    }
}

/// Current search, filter and sort settings
///
/// The default is no search, no filters, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryCriteria {
    pub search_term: String,
    pub filter_type: Filter<ContentType>,
    pub filter_urgency: Filter<Urgency>,
    pub filter_status: Filter<Status>,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

/// A partial change to the three field filters; `None` leaves a filter alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterUpdate {
    pub filter_type: Option<Filter<ContentType>>,
    pub filter_urgency: Option<Filter<Urgency>>,
    pub filter_status: Option<Filter<Status>>,
}

impl QueryCriteria {
    /// Apply a partial filter change
    pub fn set_filters(&mut self, update: FilterUpdate) {
        if let Some(filter) = update.filter_type {
            self.filter_type = filter;
        }
        if let Some(filter) = update.filter_urgency {
            self.filter_urgency = filter;
        }
        if let Some(filter) = update.filter_status {
            self.filter_status = filter;
        }
    }

    /// Reset the search term and all field filters; sorting is kept
    pub fn clear_filters(&mut self) {
        self.search_term.clear();
        self.filter_type = Filter::All;
        self.filter_urgency = Filter::All;
        self.filter_status = Filter::All;
    }

    /// Check a record against the search term and field filters
    pub fn matches(&self, record: &ContentRecord) -> bool {
        matches_search(record, &self.search_term)
            && self.filter_type.matches(Some(&record.kind))
            && self.filter_urgency.matches(record.metadata.urgency.as_ref())
            && self.filter_status.matches(Some(&record.metadata.status))
    }
}

/// Case-insensitive substring match on title, body, tags or category
///
/// An empty term matches everything.
pub fn matches_search(record: &ContentRecord, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();

    record.title.to_lowercase().contains(&needle)
        || record.body.to_lowercase().contains(&needle)
        || record
            .metadata
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
        || record
            .metadata
            .category
            .as_ref()
            .is_some_and(|category| category.to_lowercase().contains(&needle))
}

/// Compare two records by a sort key, ascending
pub fn compare(a: &ContentRecord, b: &ContentRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::LastUpdated => a.metadata.last_updated.cmp(&b.metadata.last_updated),
        SortKey::Urgency => urgency_rank(a).cmp(&urgency_rank(b)),
        SortKey::Category => category_key(a).cmp(&category_key(b)),
    }
}

fn urgency_rank(record: &ContentRecord) -> u8 {
    record.metadata.urgency.map(|u| u.rank()).unwrap_or(0)
}

fn category_key(record: &ContentRecord) -> String {
    record
        .metadata
        .category
        .as_deref()
        .unwrap_or("")
        .to_lowercase()
}

/// Produce the filtered, sorted view
///
/// The sort is stable: records with equal keys keep their collection order
/// in both directions.
pub fn run<'a>(records: &'a [ContentRecord], criteria: &QueryCriteria) -> Vec<&'a ContentRecord> {
    let mut view: Vec<&ContentRecord> = records
        .iter()
        .filter(|record| criteria.matches(record))
        .collect();

    view.sort_by(|a, b| {
        let ordering = compare(a, b, criteria.sort_by);
        match criteria.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    view
}

/// Aggregate statistics over the full collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats<'a> {
    pub total_content: usize,
    pub by_type: BTreeMap<ContentType, usize>,
    /// Keyed by urgency name, with `none` for records without one
    pub by_urgency: BTreeMap<&'static str, usize>,
    pub by_status: BTreeMap<Status, usize>,
    pub recently_updated: Vec<&'a ContentRecord>,
    pub needs_review: Vec<&'a ContentRecord>,
}

/// Compute statistics; ignores the current criteria
pub fn stats(records: &[ContentRecord]) -> Stats<'_> {
    let mut by_type = BTreeMap::new();
    let mut by_urgency = BTreeMap::new();
    let mut by_status = BTreeMap::new();

    for record in records {
        *by_type.entry(record.kind).or_insert(0) += 1;
        let urgency = record
            .metadata
            .urgency
            .map(|u| u.as_str())
            .unwrap_or("none");
        *by_urgency.entry(urgency).or_insert(0) += 1;
        *by_status.entry(record.metadata.status).or_insert(0) += 1;
    }

    let mut recently_updated: Vec<&ContentRecord> = records.iter().collect();
    recently_updated.sort_by(|a, b| b.metadata.last_updated.cmp(&a.metadata.last_updated));
    recently_updated.truncate(RECENT_LIMIT);

    let needs_review = records
        .iter()
        .filter(|record| record.metadata.status == Status::Review)
        .collect();

    Stats {
        total_content: records.len(),
        by_type,
        by_urgency,
        by_status,
        recently_updated,
        needs_review,
    }
}
