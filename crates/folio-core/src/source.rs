//! Source collections
//!
//! The pipeline reads its input once, through [`RecordSource`]. Records come
//! back untyped; [`crate::clean`] turns them into [`Record`]s.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{FolioError, Result};
use crate::record::Record;

/// Anything the pipeline can load a raw collection from
pub trait RecordSource {
    fn load_records(&self) -> Result<Vec<Value>>;

    /// Human-readable location, for logs and errors
    fn describe(&self) -> String {
        "records".to_string()
    }
}

impl RecordSource for Vec<Value> {
    fn load_records(&self) -> Result<Vec<Value>> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory records", self.len())
    }
}

/// A collection kept in a single JSON file.
///
/// Reads a plain array, a snapshot (`{"records": [...]}`) or a
/// `{"notes": [...], "trash": [...]}` export.
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, reason: impl ToString) -> FolioError {
        FolioError::SourceUnavailable {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Replace the file contents with `records`
    #[tracing::instrument(skip(self, records), fields(path = %self.path.display(), count = records.len()))]
    pub fn save_records(&self, records: &[Record]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "records.json".to_string());
        let tmp_path = self
            .path
            .with_file_name(format!(".{}.{}.tmp", file_name, ulid::Ulid::new()));
        fs::write(&tmp_path, json)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Add `records` to the stored collection; stored records win on id
    /// conflicts. Returns how many were added.
    pub fn merge_records(&self, records: &[Record]) -> Result<usize> {
        let mut existing: Vec<Record> = if self.path.exists() {
            self.load_records()?
                .into_iter()
                .map(serde_json::from_value)
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| self.unavailable(format!("existing records are not well-formed: {}", e)))?
        } else {
            Vec::new()
        };

        let mut ids: HashSet<String> = existing.iter().map(|r| r.id.clone()).collect();
        let before = existing.len();
        existing.extend(records.iter().filter(|r| ids.insert(r.id.clone())).cloned());
        let added = existing.len() - before;

        self.save_records(&existing)?;
        Ok(added)
    }
}

impl RecordSource for JsonRecordStore {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn load_records(&self) -> Result<Vec<Value>> {
        let text = fs::read_to_string(&self.path).map_err(|e| self.unavailable(e))?;
        let value: Value = serde_json::from_str(&text).map_err(|e| self.unavailable(e))?;

        let records = match value {
            Value::Array(items) => items,
            Value::Object(mut obj) => {
                if let Some(Value::Array(items)) = obj.remove("records") {
                    items
                } else if let Some(Value::Array(notes)) = obj.remove("notes") {
                    let mut items = notes;
                    if let Some(Value::Array(trash)) = obj.remove("trash") {
                        items.extend(trash.into_iter().map(mark_deleted));
                    }
                    items
                } else {
                    return Err(self.unavailable(
                        "expected an array, a \"records\" array or a \"notes\" array",
                    ));
                }
            }
            _ => return Err(self.unavailable("expected a JSON array or object")),
        };

        tracing::debug!(count = records.len(), "source records loaded");
        Ok(records)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Entries from a trash list are deleted unless they say otherwise
fn mark_deleted(mut value: Value) -> Value {
    if let Value::Object(obj) = &mut value {
        obj.entry("isDeleted").or_insert(Value::Bool(true));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_load_plain_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");
        fs::write(&path, r#"[{"id": "a"}, {"id": "b"}]"#).unwrap();

        let records = JsonRecordStore::new(&path).load_records().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_load_notes_and_trash() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("export.json");
        fs::write(
            &path,
            r#"{"notes": [{"id": "a"}], "trash": [{"id": "b"}, {"id": "c", "isDeleted": false}]}"#,
        )
        .unwrap();

        let records = JsonRecordStore::new(&path).load_records().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1]["isDeleted"], json!(true));
        assert_eq!(records[2]["isDeleted"], json!(false));
    }

    #[test]
    fn test_load_snapshot_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        fs::write(&path, r#"{"version": "1.0", "records": [{"id": "a"}]}"#).unwrap();
        assert_eq!(JsonRecordStore::new(&path).load_records().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_or_malformed_is_unavailable() {
        let dir = tempdir().unwrap();
        let missing = JsonRecordStore::new(dir.path().join("missing.json"));
        assert!(matches!(
            missing.load_records(),
            Err(FolioError::SourceUnavailable { .. })
        ));

        let path = dir.path().join("bad.json");
        fs::write(&path, "42").unwrap();
        assert!(JsonRecordStore::new(&path).load_records().is_err());
    }

    #[test]
    fn test_save_then_merge_keeps_existing() {
        let dir = tempdir().unwrap();
        let store = JsonRecordStore::new(dir.path().join("out.json"));

        store.save_records(&[Record::new("a", "Original", "")]).unwrap();
        let added = store
            .merge_records(&[Record::new("a", "Replacement", ""), Record::new("b", "New", "")])
            .unwrap();
        assert_eq!(added, 1);

        let loaded = store.load_records().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0]["title"], json!("Original"));
    }
}
