//! Record ⇄ document conversion
//!
//! A document is `---\n<frontmatter>---\n\n<body>`. The body is the record's
//! content, prefixed with a `# <title>` heading unless the content already
//! opens with exactly that line. Parsing strips the heading back off only
//! when it matches exactly, so user text is never lost to a near miss.

mod filename;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::clean::RecordCleaner;
use crate::error::{FolioError, Result};
use crate::frontmatter::{decode, encode, Frontmatter, FrontmatterValue};
use crate::record::time::{format_timestamp, timestamp_from_value};
use crate::record::Record;

pub use filename::{disambiguate, generate_file_name};

const DELIMITER: &str = "---\n";

/// Frontmatter keys, in document order
pub mod keys {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const TAGS: &str = "tags";
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
    pub const IS_DELETED: &str = "isDeleted";
    pub const DELETED_AT: &str = "deletedAt";
}

/// A document read back into a record
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub record: Record,
    /// The decoded frontmatter, before any coercion
    pub frontmatter: Frontmatter,
    /// Fixes the cleaner applied while typing the frontmatter
    pub fixes: Vec<String>,
}

/// Result of a structural document check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatCheck {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FormatCheck {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }
}

/// Converts records to documents and back
#[derive(Debug, Clone, Default)]
pub struct DocumentConverter {
    cleaner: RecordCleaner,
}

impl DocumentConverter {
    pub fn new(cleaner: RecordCleaner) -> Self {
        Self { cleaner }
    }

    /// Render a record as document text
    pub fn to_document(&self, record: &Record) -> String {
        let record = self.cleaner.normalize(record.clone()).record;
        let frontmatter = self.frontmatter_for(&record);
        let body = render_body(&record.title, &record.content);
        format!("{}{}{}\n{}", DELIMITER, encode(&frontmatter), DELIMITER, body)
    }

    /// The frontmatter mapping a record is written with
    pub fn frontmatter_for(&self, record: &Record) -> Frontmatter {
        let mut fm = Frontmatter::new()
            .with(keys::ID, record.id.as_str())
            .with(keys::TITLE, record.title.as_str())
            .with(keys::TAGS, record.tags.clone())
            .with(keys::CREATED, format_timestamp(&record.created_at))
            .with(keys::UPDATED, format_timestamp(&record.updated_at));
        if record.is_deleted {
            fm.insert(keys::IS_DELETED, true);
        }
        fm.insert_opt(keys::DELETED_AT, record.deleted_at.as_ref().map(format_timestamp));
        fm
    }

    /// Parse document text, keeping the decoded frontmatter alongside the
    /// record. `name` identifies the document in errors.
    pub fn parse_document(&self, name: &str, text: &str) -> Result<ParsedDocument> {
        let (fm_text, body) = split_document(text)
            .ok_or_else(|| FolioError::parse(name, "missing frontmatter delimiters"))?;
        let frontmatter = decode(fm_text);

        let cleaned = self.cleaner.clean(&Value::Object(raw_fields(&frontmatter)));
        let mut record = cleaned.record;
        record.content = strip_title_heading(body, &record.title)
            .unwrap_or(body)
            .to_string();

        Ok(ParsedDocument {
            record,
            frontmatter,
            fixes: cleaned.fixes,
        })
    }

    /// Parse document text into a record
    pub fn from_document(&self, text: &str) -> Result<Record> {
        self.parse_document("document", text).map(|parsed| parsed.record)
    }

    /// Check that a document has delimiters and the required, well-formed
    /// fields
    pub fn validate_document_format(&self, text: &str) -> FormatCheck {
        let Some((fm_text, _)) = split_document(text) else {
            return FormatCheck::invalid("missing frontmatter delimiters");
        };
        let fm = decode(fm_text);

        for key in [keys::ID, keys::TITLE, keys::CREATED, keys::UPDATED] {
            let present = fm
                .get(key)
                .and_then(scalar_text)
                .is_some_and(|s| !s.trim().is_empty());
            if !present {
                return FormatCheck::invalid(format!("missing required field: {}", key));
            }
        }

        for key in [keys::CREATED, keys::UPDATED] {
            if frontmatter_timestamp(&fm, key).is_none() {
                return FormatCheck::invalid(format!("{} is not a valid date", key));
            }
        }

        FormatCheck::valid()
    }
}

/// A frontmatter timestamp as written, without cleaner defaults. Text is
/// parsed, bare numbers are epoch milliseconds.
pub fn frontmatter_timestamp(fm: &Frontmatter, key: &str) -> Option<DateTime<Utc>> {
    fm.get(key).and_then(|value| timestamp_from_value(&value.to_json()))
}

/// Split document text into its frontmatter block and body.
///
/// The body loses the single blank line that separates it from the closing
/// delimiter.
pub fn split_document(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text.strip_prefix(DELIMITER)?;

    let (fm, body) = if let Some(body) = rest.strip_prefix(DELIMITER) {
        ("", body)
    } else if rest == "---" {
        ("", "")
    } else if let Some(idx) = rest.find("\n---\n") {
        (&rest[..=idx], &rest[idx + 5..])
    } else if rest.ends_with("\n---") {
        (&rest[..rest.len() - 3], "")
    } else {
        return None;
    };

    Some((fm, body.strip_prefix('\n').unwrap_or(body)))
}

/// Remove a leading `# <title>` line (and one blank line after it) from a
/// body. Returns `None` unless the first line matches exactly.
pub fn strip_title_heading<'a>(body: &'a str, title: &str) -> Option<&'a str> {
    let heading = format!("# {}", title);
    let rest = body.strip_prefix(heading.as_str())?;
    if rest.is_empty() {
        return Some(rest);
    }
    let rest = rest.strip_prefix('\n')?;
    Some(rest.strip_prefix('\n').unwrap_or(rest))
}

fn render_body(title: &str, content: &str) -> String {
    let heading = format!("# {}", title);
    if content.is_empty() {
        format!("{}\n", heading)
    } else if content.split('\n').next() == Some(heading.as_str()) {
        content.to_string()
    } else {
        format!("{}\n\n{}", heading, content)
    }
}

/// Map decoded frontmatter onto the raw record shape the cleaner reads
fn raw_fields(fm: &Frontmatter) -> Map<String, Value> {
    let mut raw = Map::new();
    let mappings = [
        (keys::ID, "id"),
        (keys::TITLE, "title"),
        (keys::TAGS, "tags"),
        (keys::CREATED, "createdAt"),
        (keys::UPDATED, "updatedAt"),
        (keys::IS_DELETED, "isDeleted"),
        (keys::DELETED_AT, "deletedAt"),
    ];
    for (key, field) in mappings {
        let Some(value) = fm.get(key) else {
            continue;
        };
        let json = match key {
            // Written by hand without quotes, `id: 42` is still text
            keys::ID | keys::TITLE => scalar_text(value).map(Value::String).unwrap_or(Value::Null),
            _ => value.to_json(),
        };
        raw.insert(field.to_string(), json);
    }
    raw.insert("content".to_string(), Value::String(String::new()));
    raw
}

fn scalar_text(value: &FrontmatterValue) -> Option<String> {
    match value {
        FrontmatterValue::String(s) => Some(s.clone()),
        FrontmatterValue::Integer(_) | FrontmatterValue::Float(_) | FrontmatterValue::Bool(_) => {
            Some(value.to_string())
        }
        FrontmatterValue::List(_) | FrontmatterValue::Null => None,
    }
}

#[cfg(test)]
mod tests;
