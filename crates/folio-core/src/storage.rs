//! Storage primitives
//!
//! The pipeline never touches a filesystem directly; it reads and writes
//! through [`StorageBackend`]. Calls are blocking and the pipeline issues
//! them one at a time.

mod fs;
mod memory;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{StorageError, StorageErrorCode, StorageResult};

pub use fs::FsBackend;
pub use memory::MemoryBackend;

/// A directory known to a backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirHandle {
    path: PathBuf,
}

impl DirHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Handle for a child directory (not created)
    pub fn child(&self, name: &str) -> DirHandle {
        DirHandle::new(self.path.join(name))
    }

    /// Handle for a file in this directory (not created)
    pub fn file(&self, name: &str) -> FileHandle {
        FileHandle::new(self.path.join(name))
    }
}

impl fmt::Display for DirHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A file known to a backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileHandle {
    path: PathBuf,
}

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// What a backend reports about a stored file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    pub name: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Raw storage I/O consumed by the migration pipeline.
///
/// Every failure carries one of the stable [`StorageErrorCode`]s.
pub trait StorageBackend {
    /// The root directory the backend operates in
    fn select_root(&self) -> StorageResult<DirHandle>;

    /// Regular files directly inside `dir`, sorted by name
    fn list_entries(&self, dir: &DirHandle) -> StorageResult<Vec<FileHandle>>;

    fn read_entry(&self, file: &FileHandle) -> StorageResult<String>;

    /// Write `text` to `dir/name`.
    ///
    /// With `create = false` the entry must already exist.
    fn write_entry(
        &self,
        dir: &DirHandle,
        name: &str,
        text: &str,
        create: bool,
    ) -> StorageResult<FileHandle>;

    fn entry_exists(&self, dir: &DirHandle, name: &str) -> StorageResult<bool>;

    /// Create `dir/name` if needed; succeeds when it already exists
    fn create_subdirectory(&self, dir: &DirHandle, name: &str) -> StorageResult<DirHandle>;

    fn entry_metadata(&self, file: &FileHandle) -> StorageResult<EntryMetadata>;

    /// Remove a file or an empty directory. Optional capability.
    fn remove_entry(&self, dir: &DirHandle, name: &str) -> StorageResult<()> {
        Err(StorageError::not_supported("remove_entry").with_target(dir.file(name)))
    }
}

/// Reject names that would escape the directory they are resolved in
pub(crate) fn check_name(dir: &DirHandle, name: &str) -> StorageResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StorageError::new(
            StorageErrorCode::WriteFailed,
            format!("invalid entry name {:?}", name),
        )
        .with_target(dir));
    }
    Ok(())
}
