//! Record data structures for folio
//!
//! A record is the unit being migrated: title, content, tags, timestamps and
//! deletion state. Records past the cleaner boundary are always well-typed;
//! raw input stays as `serde_json::Value` until [`crate::clean`] sees it.

pub mod time;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of generated record ids
pub const ID_PREFIX: &str = "rec-";

/// Title given to records that arrive without one
pub const DEFAULT_TITLE: &str = "untitled";

/// A structured note record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Create a new active record stamped with the current time
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = time::now_millis();
        Record {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            is_deleted: false,
            deleted_at: None,
        }
    }

    /// Add tags
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set both timestamps
    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// Mark the record as deleted at the given time
    pub fn deleted(mut self, at: DateTime<Utc>) -> Self {
        self.is_deleted = true;
        self.deleted_at = Some(at);
        self
    }

    /// Which target location the record belongs to
    pub fn set(&self) -> RecordSet {
        if self.is_deleted {
            RecordSet::Trash
        } else {
            RecordSet::Active
        }
    }
}

/// Partition of a collection by deletion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSet {
    Active,
    Trash,
}

impl fmt::Display for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSet::Active => write!(f, "active"),
            RecordSet::Trash => write!(f, "trash"),
        }
    }
}

/// Split records into (active, trash), preserving order
pub fn partition(records: &[Record]) -> (Vec<&Record>, Vec<&Record>) {
    records.iter().partition(|r| !r.is_deleted)
}

/// Generate a fresh, unique record id
pub fn generate_id() -> String {
    format!("{}{}", ID_PREFIX, ulid::Ulid::new().to_string().to_lowercase())
}
