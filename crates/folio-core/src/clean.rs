//! Record normalization
//!
//! The cleaner is the single typing boundary: raw records arrive as untyped
//! JSON and leave as well-formed [`Record`]s. Every coercion is reported as a
//! fix string; nothing about field content is ever an error.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{FolioError, Result};
use crate::record::time::{now_millis, timestamp_from_value, truncate_millis};
use crate::record::{generate_id, Record, DEFAULT_TITLE};

/// A normalized record and the fixes applied to it
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub record: Record,
    pub fixes: Vec<String>,
}

/// Outcome of cleaning a whole collection
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanReport {
    pub original_count: usize,
    pub cleaned_count: usize,
    pub fixed_issues: Vec<String>,
    pub unfixable_issues: Vec<String>,
    pub cleaned_records: Vec<Record>,
}

/// Normalizes raw and typed records
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordCleaner;

impl RecordCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw record; fails only when the input is not an object.
    pub fn try_clean(&self, raw: &Value) -> Result<CleanedRecord> {
        let obj = raw.as_object().ok_or_else(|| {
            FolioError::invalid_value("record", format!("expected an object, found {}", kind(raw)))
        })?;
        Ok(self.clean_object(obj))
    }

    /// Clean a raw record, never failing.
    ///
    /// Input that is not an object yields a default record.
    pub fn clean(&self, raw: &Value) -> CleanedRecord {
        match raw.as_object() {
            Some(obj) => self.clean_object(obj),
            None => {
                let mut cleaned = self.clean_object(&Map::new());
                cleaned
                    .fixes
                    .insert(0, format!("record was {}, replaced with an empty record", kind(raw)));
                cleaned
            }
        }
    }

    fn clean_object(&self, obj: &Map<String, Value>) -> CleanedRecord {
        let mut fixes = Vec::new();

        let id = match field(obj, &["id"]) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            other => {
                let id = generate_id();
                fixes.push(format!("id: {} replaced with generated id {}", describe(other), id));
                id
            }
        };

        let title = match field(obj, &["title"]) {
            Some(Value::String(s)) => s.clone(),
            other => {
                fixes.push(format!("title: {} replaced with \"{}\"", describe(other), DEFAULT_TITLE));
                DEFAULT_TITLE.to_string()
            }
        };

        let content = clean_content(field(obj, &["content"]), &mut fixes);
        let tags = clean_tags(field(obj, &["tags"]), &mut fixes);

        let now = now_millis();
        let created_at = timestamp_field(obj, &["createdAt", "created_at"], "createdAt", &mut fixes)
            .unwrap_or(now);
        let updated_at = timestamp_field(obj, &["updatedAt", "updated_at"], "updatedAt", &mut fixes)
            .unwrap_or(now);

        let is_deleted = match field(obj, &["isDeleted", "is_deleted"]) {
            None | Some(Value::Null) => false,
            Some(value) => match deleted_flag(value) {
                Some(flag) => flag,
                None => {
                    fixes.push(format!("isDeleted: {} treated as false", describe(Some(value))));
                    false
                }
            },
        };

        let deleted_at = match field(obj, &["deletedAt", "deleted_at"]) {
            None | Some(Value::Null) => None,
            Some(value) => {
                let parsed = timestamp_from_value(value);
                if parsed.is_none() {
                    fixes.push(format!("deletedAt: unparsable {} dropped", describe(Some(value))));
                }
                parsed
            }
        };

        let record = Record {
            id,
            title,
            content,
            tags,
            created_at,
            updated_at,
            is_deleted,
            deleted_at,
        };

        let mut cleaned = self.normalize(record);
        fixes.append(&mut cleaned.fixes);
        cleaned.fixes = fixes;
        cleaned
    }

    /// Enforce record invariants on an already typed record
    pub fn normalize(&self, mut record: Record) -> CleanedRecord {
        let mut fixes = Vec::new();

        if record.id.trim().is_empty() {
            record.id = generate_id();
            fixes.push(format!("id: empty, replaced with generated id {}", record.id));
        }

        if record.title.trim().is_empty() {
            fixes.push(format!("title: empty, replaced with \"{}\"", DEFAULT_TITLE));
            record.title = DEFAULT_TITLE.to_string();
        } else if record.title.contains(['\n', '\r']) {
            record.title = single_line(&record.title);
            fixes.push("title: line breaks replaced with spaces".to_string());
        }

        let before = record.tags.len();
        let mut trimmed_any = false;
        record.tags = record
            .tags
            .into_iter()
            .filter_map(|tag| {
                let trimmed = tag.trim();
                if trimmed.len() != tag.len() {
                    trimmed_any = true;
                }
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect();
        if record.tags.len() != before {
            fixes.push(format!("tags: dropped {} empty entries", before - record.tags.len()));
        }
        if trimmed_any {
            fixes.push("tags: surrounding whitespace trimmed".to_string());
        }

        record.created_at = truncate_millis(record.created_at);
        record.updated_at = truncate_millis(record.updated_at);
        record.deleted_at = record.deleted_at.map(truncate_millis);

        if record.updated_at < record.created_at {
            fixes.push("updatedAt: earlier than createdAt, set to createdAt".to_string());
            record.updated_at = record.created_at;
        }

        if !record.is_deleted && record.deleted_at.is_some() {
            fixes.push("deletedAt: dropped because the record is not deleted".to_string());
            record.deleted_at = None;
        }
        if record.is_deleted && record.deleted_at.is_none() {
            fixes.push("deletedAt: missing on a deleted record, set to updatedAt".to_string());
            record.deleted_at = Some(record.updated_at);
        }

        CleanedRecord { record, fixes }
    }

    /// Clean every entry of a collection.
    ///
    /// Entries that cannot be cleaned at all are reported as unfixable and
    /// left out; everything else is kept.
    #[tracing::instrument(skip_all, fields(count = raw.len()))]
    pub fn clean_collection(&self, raw: &[Value]) -> CleanReport {
        let mut fixed_issues = Vec::new();
        let mut unfixable_issues = Vec::new();
        let mut cleaned_records = Vec::with_capacity(raw.len());

        for (index, value) in raw.iter().enumerate() {
            match self.try_clean(value) {
                Ok(cleaned) => {
                    for fix in cleaned.fixes {
                        tracing::debug!(id = %cleaned.record.id, fix = %fix, "record fixed");
                        fixed_issues.push(format!("{}: {}", cleaned.record.id, fix));
                    }
                    cleaned_records.push(cleaned.record);
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "record cannot be cleaned");
                    unfixable_issues.push(format!("entry {}: {}", index, e));
                }
            }
        }

        CleanReport {
            original_count: raw.len(),
            cleaned_count: cleaned_records.len(),
            fixed_issues,
            unfixable_issues,
            cleaned_records,
        }
    }
}

/// Drop records whose id was already seen; the first occurrence wins
pub fn remove_duplicates(records: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect()
}

/// Most recently updated first; ties keep their input order
pub fn sort_by_updated_desc(records: &mut [Record]) {
    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| obj.get(*name))
}

fn clean_content(value: Option<&Value>, fixes: &mut Vec<String>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        None => String::new(),
        Some(Value::Null) => {
            fixes.push("content: null replaced with empty text".to_string());
            String::new()
        }
        Some(other) => {
            fixes.push(format!("content: {} converted to text", kind(other)));
            other.to_string()
        }
    }
}

fn clean_tags(value: Option<&Value>, fixes: &mut Vec<String>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let strings: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            if strings.len() != items.len() {
                fixes.push(format!(
                    "tags: dropped {} non-text entries",
                    items.len() - strings.len()
                ));
            }
            strings
        }
        Some(other) => {
            fixes.push(format!("tags: {} replaced with an empty list", kind(other)));
            Vec::new()
        }
    }
}

fn timestamp_field(
    obj: &Map<String, Value>,
    names: &[&str],
    label: &str,
    fixes: &mut Vec<String>,
) -> Option<DateTime<Utc>> {
    let value = field(obj, names);
    let parsed = value.and_then(timestamp_from_value);
    if parsed.is_none() {
        fixes.push(format!("{}: {} replaced with the current time", label, describe(value)));
    }
    parsed
}

fn deleted_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn single_line(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "missing".to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => "empty".to_string(),
        Some(Value::String(s)) => format!("\"{}\"", s),
        Some(other) => kind(other).to_string(),
    }
}
